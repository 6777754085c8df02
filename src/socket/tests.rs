//! Unit tests for the `socket` module.
//! `socket` 模块的单元测试。

use super::{DatagramChannel, Received, UdpChannel, recv_ack_until};
use crate::{
    error::Error,
    packet::{AckPacket, HEADER_SIZE, encode_data_packet},
    testing::ScriptedPeer,
};
use bytes::BytesMut;
use std::{net::SocketAddr, time::Duration};
use tokio::{net::UdpSocket, time::Instant};

#[tokio::test(start_paused = true)]
async fn test_recv_times_out_at_deadline() {
    let peer = ScriptedPeer::new(Duration::from_millis(10));
    let mut buf = [0u8; 100];
    let start = Instant::now();
    let deadline = start + Duration::from_millis(250);

    let received = recv_ack_until(&*peer, &mut buf, deadline).await.unwrap();
    assert_eq!(received, Received::Timeout);
    let now = Instant::now();
    assert!(now >= deadline && now < deadline + Duration::from_millis(2));
}

#[tokio::test(start_paused = true)]
async fn test_recv_classifies_ack_and_garbage() {
    let peer = ScriptedPeer::new(Duration::from_millis(10));
    peer.inject(vec![0xAA; 5], Duration::from_millis(1));
    peer.inject_ack(42, Duration::from_millis(2));
    let mut buf = [0u8; 100];
    let deadline = Instant::now() + Duration::from_secs(1);

    let first = recv_ack_until(&*peer, &mut buf, deadline).await.unwrap();
    assert_eq!(first, Received::Malformed { len: 5 });

    let second = recv_ack_until(&*peer, &mut buf, deadline).await.unwrap();
    let Received::Ack(ack) = second else {
        panic!("expected an ACK, got {second:?}");
    };
    assert_eq!(ack.ackno, 42);
}

#[tokio::test(start_paused = true)]
async fn test_queued_ack_wins_over_expired_deadline() {
    let peer = ScriptedPeer::new(Duration::from_millis(10));
    peer.inject_ack(7, Duration::ZERO);
    let mut buf = [0u8; 100];

    let received = recv_ack_until(&*peer, &mut buf, Instant::now()).await.unwrap();
    assert!(matches!(received, Received::Ack(AckPacket { ackno: 7, .. })));
}

#[tokio::test]
async fn test_udp_channel_loopback() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let server_addr = server.local_addr().unwrap();
    let channel = UdpChannel::open(server_addr).await.unwrap();
    assert_eq!(channel.remote_addr(), server_addr);

    let datagram = encode_data_packet(0xBAAD_CAFE, 3, b"payload");
    channel.send(&datagram).await.unwrap();

    let mut buf = [0u8; 64];
    let (len, from) = server.recv_from(&mut buf).await.unwrap();
    assert_eq!(&buf[..len], datagram.as_ref());
    assert_eq!(&buf[HEADER_SIZE..len], b"payload");

    let mut ack = BytesMut::new();
    AckPacket {
        marker: 0xBAAD_CAFE,
        ackno: 3,
    }
    .encode(&mut ack);
    server.send_to(&ack, from).await.unwrap();

    let mut buf = [0u8; 100];
    let deadline = Instant::now() + Duration::from_secs(5);
    let received = recv_ack_until(&channel, &mut buf, deadline).await.unwrap();
    assert!(matches!(received, Received::Ack(AckPacket { ackno: 3, .. })));
}

#[tokio::test]
async fn test_bind_failure_is_channel_unavailable() {
    // TEST-NET-1 is never assigned to a local interface.
    let local: SocketAddr = "192.0.2.1:0".parse().unwrap();
    let remote: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let result = UdpChannel::bind(local, remote).await;
    assert!(matches!(result, Err(Error::ChannelUnavailable(_))));
}

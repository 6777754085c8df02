//! tests/common/harness.rs
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tahoe_udp::packet::{AckPacket, DataHeader};
use bytes::BytesMut;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "tahoe_udp=debug,loopback=info".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// A receiver on a real loopback UDP socket that ACKs every data packet
/// unless told to drop it.
pub struct AckServer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<u32>>>,
    task: JoinHandle<()>,
}

impl AckServer {
    /// Starts a server that acknowledges everything.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| false).await
    }

    /// Starts a server that swallows a packet whenever `should_drop` returns true.
    pub async fn spawn_with(mut should_drop: impl FnMut(u32) -> bool + Send + 'static) -> Self {
        init_tracing();
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 2048];
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    return;
                };
                let mut cursor = &buf[..len];
                let Some(header) = DataHeader::decode(&mut cursor) else {
                    continue;
                };
                log.lock().unwrap().push(header.seqno);
                if should_drop(header.seqno) {
                    tracing::info!(seqno = header.seqno, "[Server] Dropping packet");
                    continue;
                }

                let mut ack = BytesMut::new();
                AckPacket {
                    marker: header.marker,
                    ackno: header.seqno,
                }
                .encode(&mut ack);
                let _ = socket.send_to(&ack, from).await;
            }
        });

        Self {
            addr,
            received,
            task,
        }
    }

    /// Sequence numbers received so far, in arrival order.
    pub fn received(&self) -> Vec<u32> {
        self.received.lock().unwrap().clone()
    }

    /// Waits up to `limit` for at least `count` packets to have arrived.
    pub async fn wait_for(&self, count: usize, limit: Duration) -> Vec<u32> {
        let deadline = tokio::time::Instant::now() + limit;
        while self.received().len() < count && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.received()
    }
}

impl Drop for AckServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! TCP connect probes

use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Answers a single question: does anything accept a TCP connection on `addr`?
#[async_trait]
pub trait PortProber: Send + Sync {
    /// Returns `true` if the connection was accepted.
    ///
    /// Timeouts, refusals and unreachable networks all yield `false`.
    async fn probe(&self, addr: SocketAddr) -> bool;
}

/// Connect-only prober with a fixed per-attempt timeout
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PortProber for TcpProber {
    async fn probe(&self, addr: SocketAddr) -> bool {
        let start_time = Instant::now();
        let open = connect_within(addr, self.timeout, TcpStream::connect(addr)).await;

        log::trace!(
            "probe {} -> {} [{}ms]",
            addr,
            if open { "open" } else { "closed" },
            start_time.elapsed().as_millis()
        );
        open
    }
}

/// Drive a pending connection for at most `limit`
async fn connect_within<F, S>(addr: SocketAddr, limit: Duration, connect: F) -> bool
where
    F: Future<Output = io::Result<S>>,
{
    match tokio::time::timeout(limit, connect).await {
        Ok(Ok(stream)) => {
            // Liveness only, nothing is written
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            log::trace!("{} refused: {}", addr, e);
            false
        }
        Err(_) => {
            log::trace!("{} timed out after {}ms", addr, limit.as_millis());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let prober = TcpProber::new(Duration::from_millis(1000));
        assert!(prober.probe(addr).await);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let prober = TcpProber::new(Duration::from_millis(1000));
        assert!(!prober.probe(addr).await);
    }

    #[tokio::test]
    async fn test_stalled_connect_times_out() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 80);
        let stalled = futures::future::pending::<io::Result<TcpStream>>();

        let start = Instant::now();
        assert!(!connect_within(addr, Duration::from_millis(100), stalled).await);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(90));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_connect_error_counts_as_closed() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 80);
        let refused = async { Err::<TcpStream, _>(io::Error::from(io::ErrorKind::ConnectionRefused)) };
        assert!(!connect_within(addr, Duration::from_millis(100), refused).await);
    }
}

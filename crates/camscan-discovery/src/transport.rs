//! Network transport used by the prober and fingerprinter
//!
//! The pipeline never touches sockets directly; it goes through
//! [`CameraTransport`] so the probing and fingerprinting logic can be driven
//! by a scripted transport in tests.

use async_trait::async_trait;
use camscan_core::{Credentials, FingerprintError};
use reqwest::header::{HeaderName, CONTENT_TYPE, SERVER};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Headers of interest from an HTTP probe response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpProbeResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub server: Option<String>,
}

/// Socket-level primitives needed for discovery
#[async_trait]
pub trait CameraTransport: Send + Sync {
    /// Open a TCP connection and close it again without exchanging data
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> io::Result<()>;

    /// Connect and send an RTSP OPTIONS request for `url`
    ///
    /// Succeeds once the connection has been accepted; the response is not
    /// inspected.
    async fn rtsp_options(
        &self,
        addr: SocketAddr,
        url: &str,
        timeout: Duration,
    ) -> Result<(), FingerprintError>;

    /// Issue a basic-auth GET for `url`, accepting any status code
    async fn http_get(
        &self,
        url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<HttpProbeResponse, FingerprintError>;
}

/// Transport backed by tokio sockets and reqwest
pub struct NetTransport {
    client: reqwest::Client,
}

impl NetTransport {
    pub fn new() -> anyhow::Result<Self> {
        // Idle connections would outlive the probe that opened them, and a
        // proxy cannot reach devices on the local subnet
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;

        Ok(Self { client })
    }
}

async fn connect_with_timeout(addr: SocketAddr, duration: Duration) -> io::Result<TcpStream> {
    match timeout(duration, TcpStream::connect(addr)).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
    }
}

#[async_trait]
impl CameraTransport for NetTransport {
    async fn connect(&self, addr: SocketAddr, duration: Duration) -> io::Result<()> {
        let stream = connect_with_timeout(addr, duration).await?;
        drop(stream);
        Ok(())
    }

    async fn rtsp_options(
        &self,
        addr: SocketAddr,
        url: &str,
        duration: Duration,
    ) -> Result<(), FingerprintError> {
        let mut stream = connect_with_timeout(addr, duration)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::TimedOut => FingerprintError::Timeout,
                _ => FingerprintError::Io(e),
            })?;

        let request = format!(
            "OPTIONS {} RTSP/1.0\r\nCSeq: 1\r\nUser-Agent: camscan/{}\r\n\r\n",
            url,
            env!("CARGO_PKG_VERSION")
        );

        // An accepted connection is the confirmation; a failed write is not
        match timeout(duration, stream.write_all(request.as_bytes())).await {
            Ok(Ok(())) => trace!(url = %url, "Sent RTSP OPTIONS"),
            Ok(Err(e)) => trace!(url = %url, error = %e, "RTSP OPTIONS write failed"),
            Err(_) => trace!(url = %url, "RTSP OPTIONS write timed out"),
        }

        Ok(())
    }

    async fn http_get(
        &self,
        url: &str,
        credentials: &Credentials,
        duration: Duration,
    ) -> Result<HttpProbeResponse, FingerprintError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .timeout(duration)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FingerprintError::Timeout
                } else {
                    FingerprintError::Http(e.to_string())
                }
            })?;

        // Only headers are read; the body may be an endless MJPEG stream
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(HttpProbeResponse {
            status: response.status().as_u16(),
            content_type: header(CONTENT_TYPE),
            server: header(SERVER),
        })
    }
}

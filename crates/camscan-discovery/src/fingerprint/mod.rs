//! Protocol fingerprinting of open ports
//!
//! An open port is classified by trying RTSP and HTTP candidate sequences.
//! Which protocol goes first depends on the port; the other protocol is a
//! fallback. The first confirmed candidate wins and nothing further is tried.

pub mod candidates;
pub mod http;
pub mod rtsp;

use camscan_core::{CameraRecord, Protocol, ScanTarget};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub use candidates::CandidateConfig;
pub use http::{is_camera_response, probe_http, DEFAULT_HTTP_TIMEOUT_MS};
pub use rtsp::{probe_rtsp, DEFAULT_RTSP_TIMEOUT_MS};

use crate::transport::CameraTransport;

/// Classifies open ports as cameras
pub struct Fingerprinter {
    transport: Arc<dyn CameraTransport>,
    candidates: CandidateConfig,
    rtsp_ports: Vec<u16>,
    http_ports: Vec<u16>,
    rtsp_timeout: Duration,
    http_timeout: Duration,
}

impl Fingerprinter {
    pub fn new(
        transport: Arc<dyn CameraTransport>,
        candidates: CandidateConfig,
        rtsp_ports: Vec<u16>,
        http_ports: Vec<u16>,
        rtsp_timeout: Duration,
        http_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            candidates,
            rtsp_ports,
            http_ports,
            rtsp_timeout,
            http_timeout,
        }
    }

    /// Protocols to try for `port`, in order
    ///
    /// RTSP ports try RTSP then HTTP, HTTP ports try HTTP then RTSP, and any
    /// other open port only gets the RTSP probe.
    pub fn protocol_order(&self, port: u16) -> &'static [Protocol] {
        if self.rtsp_ports.contains(&port) {
            &[Protocol::Rtsp, Protocol::Http]
        } else if self.http_ports.contains(&port) {
            &[Protocol::Http, Protocol::Rtsp]
        } else {
            &[Protocol::Rtsp]
        }
    }

    /// Identify the camera behind an open port, if any
    pub async fn identify(&self, target: ScanTarget) -> Option<CameraRecord> {
        for &protocol in self.protocol_order(target.port) {
            let record = match protocol {
                Protocol::Rtsp => {
                    probe_rtsp(
                        self.transport.as_ref(),
                        target,
                        &self.candidates,
                        self.rtsp_timeout,
                    )
                    .await
                }
                Protocol::Http => {
                    probe_http(
                        self.transport.as_ref(),
                        target,
                        &self.candidates,
                        self.http_timeout,
                    )
                    .await
                }
            };

            if record.is_some() {
                return record;
            }
            debug!(target = %target, protocol = %protocol, "No match");
        }

        None
    }
}

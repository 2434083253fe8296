//! RTSP OPTIONS fingerprinting

use camscan_core::{CameraRecord, Protocol, ScanTarget};
use std::time::Duration;
use tracing::trace;

use super::candidates::{CandidateConfig, UNKNOWN_MODEL};
use crate::transport::CameraTransport;

/// RTSP candidate timeout in milliseconds
pub const DEFAULT_RTSP_TIMEOUT_MS: u64 = 1000;

/// Try each RTSP candidate URL in order; the first accepted connection wins
///
/// Acceptance alone confirms the candidate. The OPTIONS response is never
/// inspected, so any port that accepts a connection matches here.
pub async fn probe_rtsp(
    transport: &dyn CameraTransport,
    target: ScanTarget,
    candidates: &CandidateConfig,
    timeout: Duration,
) -> Option<CameraRecord> {
    let addr = target.socket_addr();

    for url in candidates.rtsp_urls(target) {
        match transport.rtsp_options(addr, &url, timeout).await {
            Ok(()) => {
                return Some(CameraRecord::new(
                    target.address,
                    target.port,
                    Protocol::Rtsp,
                    candidates.rtsp_brand.clone(),
                    UNKNOWN_MODEL,
                    url,
                ));
            }
            Err(e) => trace!(url = %url, error = %e, "RTSP candidate failed"),
        }
    }

    None
}

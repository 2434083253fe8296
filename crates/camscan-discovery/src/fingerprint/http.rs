//! HTTP snapshot/stream fingerprinting

use camscan_core::{CameraRecord, Protocol, ScanTarget};
use std::time::Duration;
use tracing::trace;

use super::candidates::{CandidateConfig, UNKNOWN_MODEL};
use crate::transport::{CameraTransport, HttpProbeResponse};

/// HTTP candidate timeout in milliseconds
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 2000;

/// Whether response headers look like a camera
///
/// JPEG snapshots (including the non-standard `image/jpg`), multipart
/// (MJPEG) streams, or a server banner naming a camera all qualify. The
/// status code is ignored.
pub fn is_camera_response(response: &HttpProbeResponse) -> bool {
    let content_type = response
        .content_type
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let is_jpeg = content_type.contains("image/jpeg") || content_type.contains("image/jpg");
    if is_jpeg || content_type.contains("multipart/x-mixed-replace") {
        return true;
    }

    let server = response
        .server
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    server.contains("camera") || server.contains("ipcam")
}

/// Try each HTTP candidate URL in order; the first camera-like response wins
pub async fn probe_http(
    transport: &dyn CameraTransport,
    target: ScanTarget,
    candidates: &CandidateConfig,
    timeout: Duration,
) -> Option<CameraRecord> {
    for url in candidates.http_urls(target) {
        match transport
            .http_get(&url, &candidates.http_credentials, timeout)
            .await
        {
            Ok(response) if is_camera_response(&response) => {
                let model = response
                    .server
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_MODEL.to_string());
                return Some(CameraRecord::new(
                    target.address,
                    target.port,
                    Protocol::Http,
                    candidates.http_brand.clone(),
                    model,
                    url,
                ));
            }
            Ok(response) => trace!(
                url = %url,
                status = response.status,
                content_type = ?response.content_type,
                server = ?response.server,
                "HTTP candidate does not look like a camera"
            ),
            Err(e) => trace!(url = %url, error = %e, "HTTP candidate failed"),
        }
    }

    None
}

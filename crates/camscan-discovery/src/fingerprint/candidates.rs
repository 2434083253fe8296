//! Ordered candidate lists for RTSP and HTTP fingerprinting
//!
//! Brand signatures are data: adding a credential guess or a resource path
//! only means extending these lists.

use camscan_core::{Credentials, ScanTarget};
use serde::{Deserialize, Serialize};

/// Brand reported for RTSP confirmations
pub const DEFAULT_RTSP_BRAND: &str = "FNK Vision";

/// Brand reported for HTTP confirmations
pub const DEFAULT_HTTP_BRAND: &str = "Generic/FNK Vision";

/// Model reported when the device does not identify itself
pub const UNKNOWN_MODEL: &str = "Unknown FNK Vision";

/// Candidate credentials and resource paths, tried in list order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub rtsp_brand: String,
    pub http_brand: String,
    /// RTSP paths with `{user}` and `{password}` placeholders
    pub rtsp_path_templates: Vec<String>,
    /// Generic RTSP paths tried after every templated candidate
    pub rtsp_fallback_paths: Vec<String>,
    /// HTTP snapshot/video paths
    pub http_paths: Vec<String>,
    /// Credentials substituted into each RTSP path template
    pub rtsp_credentials: Vec<Credentials>,
    /// Basic-auth credentials for HTTP probes
    pub http_credentials: Credentials,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            rtsp_brand: DEFAULT_RTSP_BRAND.to_string(),
            http_brand: DEFAULT_HTTP_BRAND.to_string(),
            rtsp_path_templates: vec![
                "/user={user}_password={password}_channel=1_stream=0.sdp".to_string(),
                "/user={user}_password={password}_channel=1_stream=1.sdp".to_string(),
            ],
            rtsp_fallback_paths: vec![
                "/live".to_string(),
                "/stream1".to_string(),
                "/".to_string(),
            ],
            http_paths: vec![
                "/snapshot.jpg".to_string(),
                "/cgi-bin/snapshot.cgi".to_string(),
                "/video.mjpg".to_string(),
                "/mjpeg".to_string(),
                "/image.jpg".to_string(),
                "/".to_string(),
            ],
            rtsp_credentials: vec![
                Credentials::new("admin", "admin"),
                Credentials::new("admin", "password"),
                Credentials::new("admin", ""),
            ],
            http_credentials: Credentials::new("admin", "admin"),
        }
    }
}

impl CandidateConfig {
    /// RTSP URLs for `target`: every template per credential, then the fallbacks
    ///
    /// Credential values are percent-encoded so they cannot break the URL or
    /// the request line it is sent in.
    pub fn rtsp_urls(&self, target: ScanTarget) -> Vec<String> {
        let templated = self.rtsp_credentials.iter().flat_map(|creds| {
            let user = urlencoding::encode(&creds.username);
            let password = urlencoding::encode(&creds.password);
            self.rtsp_path_templates.iter().map(move |template| {
                template
                    .replace("{user}", &user)
                    .replace("{password}", &password)
            })
        });
        let paths = templated.chain(self.rtsp_fallback_paths.iter().cloned());

        unique_urls(paths.map(|path| build_url("rtsp", target, &path)))
    }

    /// HTTP URLs for `target`, in path order
    pub fn http_urls(&self, target: ScanTarget) -> Vec<String> {
        unique_urls(
            self.http_paths
                .iter()
                .map(|path| build_url("http", target, path)),
        )
    }
}

fn build_url(scheme: &str, target: ScanTarget, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}://{}:{}{}", scheme, target.address, target.port, path)
    } else {
        format!("{}://{}:{}/{}", scheme, target.address, target.port, path)
    }
}

fn unique_urls(urls: impl Iterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for url in urls {
        if !unique.contains(&url) {
            unique.push(url);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn target(port: u16) -> ScanTarget {
        ScanTarget::new(Ipv4Addr::new(10, 0, 0, 5), port)
    }

    #[test]
    fn test_rtsp_urls_order() {
        let urls = CandidateConfig::default().rtsp_urls(target(554));
        assert_eq!(urls.len(), 3 * 2 + 3);
        assert_eq!(
            urls[0],
            "rtsp://10.0.0.5:554/user=admin_password=admin_channel=1_stream=0.sdp"
        );
        assert_eq!(
            urls[1],
            "rtsp://10.0.0.5:554/user=admin_password=admin_channel=1_stream=1.sdp"
        );
        assert_eq!(
            urls[2],
            "rtsp://10.0.0.5:554/user=admin_password=password_channel=1_stream=0.sdp"
        );
        assert_eq!(urls[6], "rtsp://10.0.0.5:554/live");
        assert_eq!(urls[7], "rtsp://10.0.0.5:554/stream1");
        assert_eq!(urls[8], "rtsp://10.0.0.5:554/");
    }

    #[test]
    fn test_http_urls() {
        let urls = CandidateConfig::default().http_urls(target(8080));
        assert_eq!(urls[0], "http://10.0.0.5:8080/snapshot.jpg");
        assert_eq!(urls.last().unwrap(), "http://10.0.0.5:8080/");
    }

    #[test]
    fn test_credentials_are_percent_encoded() {
        let config = CandidateConfig {
            rtsp_credentials: vec![Credentials::new("ad min", "p@ss word\r\nCSeq: 9")],
            rtsp_path_templates: vec!["/user={user}_password={password}.sdp".to_string()],
            rtsp_fallback_paths: Vec::new(),
            ..CandidateConfig::default()
        };
        let urls = config.rtsp_urls(target(554));
        assert_eq!(urls.len(), 1);
        let url = &urls[0];
        assert!(url.starts_with("rtsp://10.0.0.5:554/user=ad%20min_password=p%40ss%20word"));
        assert!(!url.contains(' '));
        assert!(!url.contains('\r'));
        assert!(!url.contains('\n'));
        assert!(!url.contains('@'));
    }

    #[test]
    fn test_template_without_placeholders_is_not_repeated() {
        let config = CandidateConfig {
            rtsp_path_templates: vec!["h264".to_string()],
            rtsp_fallback_paths: vec!["/h264".to_string()],
            ..CandidateConfig::default()
        };
        let urls = config.rtsp_urls(target(554));
        assert_eq!(urls, vec!["rtsp://10.0.0.5:554/h264".to_string()]);
    }
}

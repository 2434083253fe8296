//! Camera types produced by protocol fingerprinting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Control-plane protocol a camera was confirmed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Real Time Streaming Protocol
    Rtsp,
    /// Plain HTTP snapshot/video endpoint
    Http,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rtsp => write!(f, "RTSP"),
            Self::Http => write!(f, "HTTP"),
        }
    }
}

/// A username/password pair guessed during fingerprinting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A camera confirmed at a specific address and port
///
/// Records are only created after a protocol-level confirmation and are
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecord {
    /// IPv4 address of the device
    pub address: Ipv4Addr,
    /// Port the camera answered on
    pub port: u16,
    /// Model description (best effort)
    pub model: String,
    /// Brand the matching signature belongs to
    pub brand: String,
    /// URL of the confirmed stream or snapshot endpoint
    pub stream_endpoint: String,
    /// Protocol the camera was confirmed with
    pub protocol: Protocol,
    /// When the camera was confirmed
    pub discovered_at: DateTime<Utc>,
}

impl CameraRecord {
    /// Create a record for a confirmed camera
    pub fn new(
        address: Ipv4Addr,
        port: u16,
        protocol: Protocol,
        brand: impl Into<String>,
        model: impl Into<String>,
        stream_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            address,
            port,
            model: model.into(),
            brand: brand.into(),
            stream_endpoint: stream_endpoint.into(),
            protocol,
            discovered_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for CameraRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} at {}:{} via {} ({})",
            self.brand, self.model, self.address, self.port, self.protocol, self.stream_endpoint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_record_creation() {
        let record = CameraRecord::new(
            Ipv4Addr::new(10, 0, 0, 5),
            554,
            Protocol::Rtsp,
            "FNK Vision",
            "Unknown FNK Vision",
            "rtsp://10.0.0.5:554/live",
        );
        assert_eq!(record.address, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(record.port, 554);
        assert_eq!(record.protocol, Protocol::Rtsp);
        assert_eq!(record.stream_endpoint, "rtsp://10.0.0.5:554/live");
    }

    #[test]
    fn test_protocol_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Protocol::Rtsp).unwrap(), "\"rtsp\"");
        assert_eq!(serde_json::to_string(&Protocol::Http).unwrap(), "\"http\"");
    }

    #[test]
    fn test_credentials_password_defaults_empty() {
        let creds: Credentials = serde_json::from_str(r#"{"username":"admin"}"#).unwrap();
        assert_eq!(creds, Credentials::new("admin", ""));
    }
}

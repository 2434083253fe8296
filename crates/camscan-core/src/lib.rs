//! camscan Core - Core types for network camera discovery
//!
//! This crate provides the foundational types for the camscan system:
//! - Scan targets and subnet prefixes for building the probe space
//! - Probe results produced by the port prober
//! - Camera records produced by protocol fingerprinting
//! - Error taxonomy shared by the discovery pipeline

pub mod camera;
pub mod error;
pub mod target;

pub use camera::{CameraRecord, Credentials, Protocol};
pub use error::{DiscoveryError, FingerprintError};
pub use target::{
    build_targets, ProbeResult, ProbeStatus, ScanTarget, SubnetPrefix, DEFAULT_CAMERA_PORTS,
    DEFAULT_FIRST_HOST, DEFAULT_LAST_HOST,
};

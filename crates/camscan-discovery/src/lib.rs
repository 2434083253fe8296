//! camscan Discovery - Network camera discovery on the local subnet
//!
//! This crate provides the discovery pipeline:
//! - Subnet resolution from the host's network interfaces
//! - Concurrent TCP port probing
//! - RTSP and HTTP fingerprinting of open ports

pub mod fingerprint;
pub mod probe;
pub mod resolver;
pub mod scanner;
pub mod transport;

pub use fingerprint::{CandidateConfig, Fingerprinter};
pub use resolver::{FixedSubnet, LocalInterfaceResolver, SubnetResolver};
pub use scanner::{discover_cameras, DiscoveryEvent, DiscoveryScanner, ScannerConfig};
pub use transport::{CameraTransport, HttpProbeResponse, NetTransport};

//! Error types for the discovery pipeline

use thiserror::Error;

/// Run-level failures that abort a discovery scan
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No non-loopback IPv4 network interface found")]
    NoNetworkInterface,
    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),
}

/// Failure of a single fingerprint candidate attempt
///
/// These never leave the fingerprinter; they only advance it to the next
/// candidate.
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Timed out")]
    Timeout,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
}

//! Scan target space: subnet prefixes, targets, and probe results

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::DiscoveryError;

/// Common RTSP and HTTP camera ports, in probe order
pub const DEFAULT_CAMERA_PORTS: [u16; 4] = [554, 80, 8080, 8000];

/// First host suffix scanned in a /24
pub const DEFAULT_FIRST_HOST: u8 = 1;

/// Last host suffix scanned in a /24
pub const DEFAULT_LAST_HOST: u8 = 254;

/// The first three octets of a /24 network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubnetPrefix([u8; 3]);

impl SubnetPrefix {
    pub fn new(a: u8, b: u8, c: u8) -> Self {
        Self([a, b, c])
    }

    /// Prefix of the /24 containing `ip`
    pub fn of(ip: Ipv4Addr) -> Self {
        let [a, b, c, _] = ip.octets();
        Self([a, b, c])
    }

    /// Address of host `suffix` within this prefix
    pub fn host(&self, suffix: u8) -> Ipv4Addr {
        let [a, b, c] = self.0;
        Ipv4Addr::new(a, b, c, suffix)
    }

    pub fn octets(&self) -> [u8; 3] {
        self.0
    }
}

impl std::fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{}.{}.{}.", a, b, c)
    }
}

impl FromStr for SubnetPrefix {
    type Err = DiscoveryError;

    /// Accepts "192.168.1.", "192.168.1", "192.168.1.20" or "192.168.1.0/24"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DiscoveryError::InvalidSubnet(s.to_string());

        let base = s.trim().split('/').next().unwrap_or_default();
        let base = base.strip_suffix('.').unwrap_or(base);

        let octets = base
            .split('.')
            .map(|part| part.parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<u8>, _>>()?;

        match octets.as_slice() {
            [a, b, c] | [a, b, c, _] => Ok(Self([*a, *b, *c])),
            _ => Err(invalid()),
        }
    }
}

/// One (address, port) pair to probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    pub address: Ipv4Addr,
    pub port: u16,
}

impl ScanTarget {
    pub fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }
}

impl std::fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Reachability of a probed target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// TCP connect succeeded
    Open,
    /// Refused, timed out, or otherwise unreachable
    Closed,
}

/// Outcome of probing a single target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub target: ScanTarget,
    pub status: ProbeStatus,
}

impl ProbeResult {
    pub fn is_open(&self) -> bool {
        self.status == ProbeStatus::Open
    }
}

/// Build the candidate target set: every host suffix crossed with every port
///
/// Targets are ordered host-major. Repeated ports are only used once, so the
/// result never contains duplicate targets.
pub fn build_targets(
    prefix: SubnetPrefix,
    hosts: RangeInclusive<u8>,
    ports: &[u16],
) -> Vec<ScanTarget> {
    let mut unique_ports: Vec<u16> = Vec::with_capacity(ports.len());
    for &port in ports {
        if !unique_ports.contains(&port) {
            unique_ports.push(port);
        }
    }

    hosts
        .flat_map(|suffix| {
            let address = prefix.host(suffix);
            unique_ports
                .iter()
                .map(move |&port| ScanTarget::new(address, port))
        })
        .collect()
}

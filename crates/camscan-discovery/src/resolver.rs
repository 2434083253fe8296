//! Local subnet resolution from host network interfaces

use camscan_core::{DiscoveryError, SubnetPrefix};
use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};
use std::net::Ipv4Addr;
use tracing::{debug, warn};

/// Source of the /24 prefix to scan
pub trait SubnetResolver: Send + Sync {
    fn resolve(&self) -> Result<SubnetPrefix, DiscoveryError>;
}

/// Resolves the prefix of the first non-loopback IPv4 interface
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalInterfaceResolver;

impl SubnetResolver for LocalInterfaceResolver {
    fn resolve(&self) -> Result<SubnetPrefix, DiscoveryError> {
        let interfaces = NetworkInterface::show().map_err(|e| {
            warn!(error = %e, "Failed to enumerate network interfaces");
            DiscoveryError::NoNetworkInterface
        })?;

        let addrs = interfaces.iter().flat_map(|iface| {
            iface.addr.iter().filter_map(move |addr| match addr {
                Addr::V4(v4) => Some((iface.name.as_str(), v4.ip)),
                Addr::V6(_) => None,
            })
        });

        first_external_prefix(addrs)
    }
}

/// Always resolves to a configured prefix
#[derive(Debug, Clone, Copy)]
pub struct FixedSubnet(pub SubnetPrefix);

impl SubnetResolver for FixedSubnet {
    fn resolve(&self) -> Result<SubnetPrefix, DiscoveryError> {
        Ok(self.0)
    }
}

/// Pick the prefix of the first non-loopback address
pub fn first_external_prefix<'a>(
    addrs: impl IntoIterator<Item = (&'a str, Ipv4Addr)>,
) -> Result<SubnetPrefix, DiscoveryError> {
    addrs
        .into_iter()
        .find(|(_, ip)| !ip.is_loopback())
        .map(|(name, ip)| {
            let prefix = SubnetPrefix::of(ip);
            debug!(interface = %name, ip = %ip, prefix = %prefix, "Using interface for scan range");
            prefix
        })
        .ok_or(DiscoveryError::NoNetworkInterface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_external_skips_loopback() {
        let addrs = [
            ("lo", Ipv4Addr::new(127, 0, 0, 1)),
            ("eth0", Ipv4Addr::new(192, 168, 1, 42)),
            ("wlan0", Ipv4Addr::new(10, 1, 2, 3)),
        ];
        let prefix = first_external_prefix(addrs).unwrap();
        assert_eq!(prefix.to_string(), "192.168.1.");
    }

    #[test]
    fn test_only_loopback_is_no_interface() {
        let addrs = [("lo", Ipv4Addr::new(127, 0, 0, 1))];
        assert!(matches!(
            first_external_prefix(addrs),
            Err(DiscoveryError::NoNetworkInterface)
        ));
    }

    #[test]
    fn test_no_addresses_is_no_interface() {
        let addrs: [(&str, Ipv4Addr); 0] = [];
        assert!(matches!(
            first_external_prefix(addrs),
            Err(DiscoveryError::NoNetworkInterface)
        ));
    }

    #[test]
    fn test_fixed_subnet() {
        let resolver = FixedSubnet(SubnetPrefix::new(10, 0, 0));
        assert_eq!(resolver.resolve().unwrap().to_string(), "10.0.0.");
    }
}

//! Discovery scanner that drives the whole camera discovery pipeline

use anyhow::Result;
use camscan_core::{
    build_targets, CameraRecord, DiscoveryError, ScanTarget, SubnetPrefix, DEFAULT_CAMERA_PORTS,
    DEFAULT_FIRST_HOST, DEFAULT_LAST_HOST,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::fingerprint::{
    CandidateConfig, Fingerprinter, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_RTSP_TIMEOUT_MS,
};
use crate::probe::{probe_targets, DEFAULT_PROBE_TIMEOUT_MS};
use crate::resolver::{FixedSubnet, LocalInterfaceResolver, SubnetResolver};
use crate::transport::{CameraTransport, NetTransport};

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Subnet prefix to scan (e.g., "192.168.1."); detected from the host when unset
    pub subnet: Option<String>,
    /// First host suffix to scan
    pub first_host: u8,
    /// Last host suffix to scan
    pub last_host: u8,
    /// Ports probed on every host
    pub ports: Vec<u16>,
    /// Ports fingerprinted RTSP-first
    pub rtsp_ports: Vec<u16>,
    /// Ports fingerprinted HTTP-first
    pub http_ports: Vec<u16>,
    /// TCP connect timeout for port probes
    pub probe_timeout_ms: u64,
    /// Timeout per RTSP candidate
    pub rtsp_timeout_ms: u64,
    /// Timeout per HTTP candidate
    pub http_timeout_ms: u64,
    /// Cap on simultaneous port probes (None probes everything at once)
    pub max_concurrent_probes: Option<usize>,
    /// Fingerprint candidates
    pub candidates: CandidateConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            subnet: None,
            first_host: DEFAULT_FIRST_HOST,
            last_host: DEFAULT_LAST_HOST,
            ports: DEFAULT_CAMERA_PORTS.to_vec(),
            rtsp_ports: vec![554],
            http_ports: vec![80, 8080, 8000],
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            rtsp_timeout_ms: DEFAULT_RTSP_TIMEOUT_MS,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            max_concurrent_probes: None,
            candidates: CandidateConfig::default(),
        }
    }
}

/// Discovery event emitted at scan checkpoints
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// Scan started
    ScanStarted,
    /// Subnet resolved and targets built
    RangeResolved { prefix: SubnetPrefix, targets: usize },
    /// Subnet could not be resolved; the scan ends here
    RangeUnavailable { reason: String },
    /// Every port probe has finished
    ProbesCompleted { open: usize, total: usize },
    /// A camera was confirmed
    CameraFound(CameraRecord),
    /// Scan completed
    ScanCompleted { found: usize },
}

/// Discovery scanner service
pub struct DiscoveryScanner {
    config: ScannerConfig,
    resolver: Arc<dyn SubnetResolver>,
    transport: Arc<dyn CameraTransport>,
    fingerprinter: Fingerprinter,
    event_tx: broadcast::Sender<DiscoveryEvent>,
}

impl DiscoveryScanner {
    /// Create a scanner using the host's interfaces and real sockets
    pub fn new(config: ScannerConfig) -> Result<Self> {
        let resolver: Arc<dyn SubnetResolver> = match &config.subnet {
            Some(subnet) => Arc::new(FixedSubnet(subnet.parse::<SubnetPrefix>()?)),
            None => Arc::new(LocalInterfaceResolver),
        };
        let transport = Arc::new(NetTransport::new()?);

        Ok(Self::with_parts(config, resolver, transport))
    }

    /// Create a scanner from explicit resolver and transport implementations
    pub fn with_parts(
        config: ScannerConfig,
        resolver: Arc<dyn SubnetResolver>,
        transport: Arc<dyn CameraTransport>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let fingerprinter = Fingerprinter::new(
            Arc::clone(&transport),
            config.candidates.clone(),
            config.rtsp_ports.clone(),
            config.http_ports.clone(),
            Duration::from_millis(config.rtsp_timeout_ms),
            Duration::from_millis(config.http_timeout_ms),
        );

        Self {
            config,
            resolver,
            transport,
            fingerprinter,
            event_tx,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Subscribe to discovery events
    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.event_tx.subscribe()
    }

    /// Run a discovery scan, returning every confirmed camera
    ///
    /// Never fails: if the subnet cannot be resolved the failure is logged
    /// and an empty list is returned.
    pub async fn discover(&self) -> Vec<CameraRecord> {
        self.try_discover().await.unwrap_or_default()
    }

    /// Run a discovery scan, surfacing subnet resolution failure
    ///
    /// Probe and fingerprint failures never surface here; they only mean
    /// "no camera at that target".
    pub async fn try_discover(&self) -> Result<Vec<CameraRecord>, DiscoveryError> {
        let _ = self.event_tx.send(DiscoveryEvent::ScanStarted);

        // Step 1: Resolve the subnet
        let prefix = match self.resolver.resolve() {
            Ok(prefix) => prefix,
            Err(e) => {
                warn!(error = %e, "Could not determine network range, is this machine connected to a network?");
                let _ = self.event_tx.send(DiscoveryEvent::RangeUnavailable {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        // Step 2: Build the target set
        let targets = build_targets(
            prefix,
            self.config.first_host..=self.config.last_host,
            &self.config.ports,
        );

        info!(
            prefix = %prefix,
            targets = targets.len(),
            "Starting discovery scan"
        );
        let _ = self.event_tx.send(DiscoveryEvent::RangeResolved {
            prefix,
            targets: targets.len(),
        });

        // Step 3: Probe everything and wait for the whole batch
        let results = probe_targets(
            Arc::clone(&self.transport),
            &targets,
            Duration::from_millis(self.config.probe_timeout_ms),
            self.config.max_concurrent_probes,
        )
        .await;

        // Step 4: Keep open ports
        let open: Vec<ScanTarget> = results
            .iter()
            .filter(|r| r.is_open())
            .map(|r| r.target)
            .collect();

        info!(open = open.len(), total = results.len(), "Port probes complete");
        let _ = self.event_tx.send(DiscoveryEvent::ProbesCompleted {
            open: open.len(),
            total: results.len(),
        });

        // Step 5: Fingerprint one target at a time
        let mut cameras = Vec::new();
        for target in open {
            match self.fingerprinter.identify(target).await {
                Some(camera) => {
                    info!(
                        ip = %camera.address,
                        port = camera.port,
                        protocol = %camera.protocol,
                        endpoint = %camera.stream_endpoint,
                        "Found camera"
                    );
                    let _ = self
                        .event_tx
                        .send(DiscoveryEvent::CameraFound(camera.clone()));
                    cameras.push(camera);
                }
                None => debug!(target = %target, "Open port is not a recognised camera"),
            }
        }

        let _ = self.event_tx.send(DiscoveryEvent::ScanCompleted {
            found: cameras.len(),
        });
        info!("Scan complete: {} cameras found", cameras.len());

        Ok(cameras)
    }
}

/// Discover cameras on the local subnet with the default configuration
pub async fn discover_cameras() -> Vec<CameraRecord> {
    match DiscoveryScanner::new(ScannerConfig::default()) {
        Ok(scanner) => scanner.discover().await,
        Err(e) => {
            warn!(error = %e, "Failed to create discovery scanner");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use camscan_core::Protocol;
    use std::net::Ipv4Addr;

    struct NoInterfaces;

    impl SubnetResolver for NoInterfaces {
        fn resolve(&self) -> Result<SubnetPrefix, DiscoveryError> {
            Err(DiscoveryError::NoNetworkInterface)
        }
    }

    fn ten_net() -> Arc<dyn SubnetResolver> {
        Arc::new(FixedSubnet(SubnetPrefix::new(10, 0, 0)))
    }

    fn drain(rx: &mut broadcast::Receiver<DiscoveryEvent>) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_single_rtsp_camera() {
        let first = CandidateConfig::default()
            .rtsp_urls(ScanTarget::new(Ipv4Addr::new(10, 0, 0, 5), 554))
            .remove(0);
        let transport = Arc::new(
            MockTransport::new()
                .with_open("10.0.0.5:554")
                .accept_rtsp(&first),
        );
        let scanner =
            DiscoveryScanner::with_parts(ScannerConfig::default(), ten_net(), transport.clone());

        let cameras = scanner.discover().await;

        assert_eq!(cameras.len(), 1);
        let camera = &cameras[0];
        assert_eq!(camera.address, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(camera.port, 554);
        assert_eq!(camera.protocol, Protocol::Rtsp);
        assert_eq!(camera.stream_endpoint, first);
        assert_eq!(transport.connect_count(), 254 * 4);
        assert_eq!(transport.rtsp_calls(), vec![first]);
    }

    #[tokio::test]
    async fn test_no_open_ports() {
        let transport = Arc::new(MockTransport::new());
        let scanner =
            DiscoveryScanner::with_parts(ScannerConfig::default(), ten_net(), transport.clone());
        let mut rx = scanner.subscribe();

        let cameras = scanner.try_discover().await.unwrap();

        assert!(cameras.is_empty());
        assert_eq!(transport.connect_count(), 254 * 4);
        assert!(transport.rtsp_calls().is_empty());
        assert!(transport.http_calls().is_empty());

        let events = drain(&mut rx);
        assert!(matches!(events[0], DiscoveryEvent::ScanStarted));
        assert!(matches!(
            events[1],
            DiscoveryEvent::RangeResolved { targets: 1016, .. }
        ));
        assert!(matches!(
            events[2],
            DiscoveryEvent::ProbesCompleted { open: 0, total: 1016 }
        ));
        assert!(matches!(events[3], DiscoveryEvent::ScanCompleted { found: 0 }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, DiscoveryEvent::RangeUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_no_interface_issues_no_probes() {
        let transport = Arc::new(MockTransport::new().with_open("10.0.0.5:554"));
        let scanner = DiscoveryScanner::with_parts(
            ScannerConfig::default(),
            Arc::new(NoInterfaces),
            transport.clone(),
        );
        let mut rx = scanner.subscribe();

        assert!(scanner.discover().await.is_empty());
        assert!(matches!(
            scanner.try_discover().await,
            Err(DiscoveryError::NoNetworkInterface)
        ));
        assert!(transport.calls().is_empty());

        let events = drain(&mut rx);
        assert!(matches!(
            events[1],
            DiscoveryEvent::RangeUnavailable { .. }
        ));
        assert!(!events
            .iter()
            .any(|e| matches!(e, DiscoveryEvent::ScanCompleted { .. })));
    }

    #[tokio::test]
    async fn test_unidentified_http_port_is_excluded() {
        let transport = Arc::new(MockTransport::new().with_open("10.0.0.9:80"));
        let scanner =
            DiscoveryScanner::with_parts(ScannerConfig::default(), ten_net(), transport.clone());

        let cameras = scanner.discover().await;

        assert!(cameras.is_empty());
        let target = ScanTarget::new(Ipv4Addr::new(10, 0, 0, 9), 80);
        let candidates = CandidateConfig::default();
        assert_eq!(transport.http_calls(), candidates.http_urls(target));
        assert_eq!(transport.rtsp_calls(), candidates.rtsp_urls(target));
    }

    #[tokio::test]
    async fn test_every_open_port_is_fingerprinted() {
        let transport = Arc::new(
            MockTransport::new()
                .with_open("10.0.0.5:554")
                .with_open("10.0.0.9:80")
                .with_open("10.0.0.20:8080")
                .accept_rtsp("rtsp://10.0.0.5:554/live")
                .http_response(
                    "http://10.0.0.20:8080/snapshot.jpg",
                    crate::transport::HttpProbeResponse {
                        status: 200,
                        content_type: Some("image/jpeg".to_string()),
                        server: None,
                    },
                ),
        );
        let config = ScannerConfig {
            max_concurrent_probes: Some(16),
            ..ScannerConfig::default()
        };
        let scanner = DiscoveryScanner::with_parts(config, ten_net(), transport.clone());
        let mut rx = scanner.subscribe();

        let cameras = scanner.discover().await;

        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].address, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(cameras[0].protocol, Protocol::Rtsp);
        assert_eq!(cameras[1].address, Ipv4Addr::new(10, 0, 0, 20));
        assert_eq!(cameras[1].protocol, Protocol::Http);

        let found = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, DiscoveryEvent::CameraFound(_)))
            .count();
        assert_eq!(found, 2);
    }

    #[tokio::test]
    async fn test_fingerprinting_waits_for_all_probes() {
        let transport = Arc::new(MockTransport::new().with_open("10.0.0.1:554").accept_all_rtsp());
        let scanner =
            DiscoveryScanner::with_parts(ScannerConfig::default(), ten_net(), transport.clone());

        scanner.discover().await;

        let calls = transport.calls();
        let first_rtsp = calls
            .iter()
            .position(|c| matches!(c, crate::transport::mock::Call::Rtsp(_)))
            .unwrap();
        assert_eq!(first_rtsp, 254 * 4);
    }

    #[tokio::test]
    async fn test_configured_subnet() {
        let config = ScannerConfig {
            subnet: Some("192.168.50.0/24".to_string()),
            ..ScannerConfig::default()
        };
        let scanner = DiscoveryScanner::new(config).unwrap();
        assert_eq!(
            scanner.resolver.resolve().unwrap(),
            SubnetPrefix::new(192, 168, 50)
        );
    }

    #[test]
    fn test_invalid_configured_subnet() {
        let config = ScannerConfig {
            subnet: Some("not-a-subnet".to_string()),
            ..ScannerConfig::default()
        };
        assert!(DiscoveryScanner::new(config).is_err());
    }
}

//! Configuration loading and validation

use anyhow::Result;
use camscan_discovery::{CandidateConfig, ScannerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub candidates: CandidateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Subnet prefix to scan (detected from the host when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// First host suffix to scan
    #[serde(default = "default_first_host")]
    pub first_host: u8,
    /// Last host suffix to scan
    #[serde(default = "default_last_host")]
    pub last_host: u8,
    /// Ports probed on every host
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,
    /// Ports fingerprinted RTSP-first
    #[serde(default = "default_rtsp_ports")]
    pub rtsp_ports: Vec<u16>,
    /// Ports fingerprinted HTTP-first
    #[serde(default = "default_http_ports")]
    pub http_ports: Vec<u16>,
    /// TCP connect timeout for port probes
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// Timeout per RTSP candidate
    #[serde(default = "default_rtsp_timeout")]
    pub rtsp_timeout_ms: u64,
    /// Timeout per HTTP candidate
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,
    /// Cap on simultaneous port probes (unset probes everything at once)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_probes: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            subnet: None,
            first_host: default_first_host(),
            last_host: default_last_host(),
            ports: default_ports(),
            rtsp_ports: default_rtsp_ports(),
            http_ports: default_http_ports(),
            probe_timeout_ms: default_probe_timeout(),
            rtsp_timeout_ms: default_rtsp_timeout(),
            http_timeout_ms: default_http_timeout(),
            max_concurrent_probes: None,
        }
    }
}

fn default_first_host() -> u8 {
    ScannerConfig::default().first_host
}

fn default_last_host() -> u8 {
    ScannerConfig::default().last_host
}

fn default_ports() -> Vec<u16> {
    ScannerConfig::default().ports
}

fn default_rtsp_ports() -> Vec<u16> {
    ScannerConfig::default().rtsp_ports
}

fn default_http_ports() -> Vec<u16> {
    ScannerConfig::default().http_ports
}

fn default_probe_timeout() -> u64 {
    ScannerConfig::default().probe_timeout_ms
}

fn default_rtsp_timeout() -> u64 {
    ScannerConfig::default().rtsp_timeout_ms
}

fn default_http_timeout() -> u64 {
    ScannerConfig::default().http_timeout_ms
}

impl Config {
    /// Convert to ScannerConfig
    pub fn to_scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            subnet: self.discovery.subnet.clone(),
            first_host: self.discovery.first_host,
            last_host: self.discovery.last_host,
            ports: self.discovery.ports.clone(),
            rtsp_ports: self.discovery.rtsp_ports.clone(),
            http_ports: self.discovery.http_ports.clone(),
            probe_timeout_ms: self.discovery.probe_timeout_ms,
            rtsp_timeout_ms: self.discovery.rtsp_timeout_ms,
            http_timeout_ms: self.discovery.http_timeout_ms,
            max_concurrent_probes: self.discovery.max_concurrent_probes,
            candidates: self.candidates.clone(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

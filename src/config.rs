//! Application configuration
//!
//! The whole tool is driven by one TOML file: global identity fields and
//! key-size/validity defaults, the master node and worker nodes whose
//! addresses become SANs, extra certificate entries, and the certificate
//! authority section. Loaded once and passed by reference into every
//! component; there is no process-wide mutable state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::san::SubjectAltNames;
use crate::subject::SubjectFields;

/// One reachable host: an alias plus its raw address strings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Host {
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl Host {
    /// Classify this host's addresses into a SAN set
    pub fn sans(&self) -> SubjectAltNames {
        SubjectAltNames::from_addresses(&self.addresses)
    }
}

/// Configuration for one additional certificate beyond the standard roles
#[derive(Debug, Clone, Deserialize)]
pub struct ExtraCertConfig {
    pub name: String,

    /// Identity-field overrides merged over the global common fields
    #[serde(default)]
    pub common_fields: SubjectFields,

    /// Per-entry key size; falls back to the global default
    #[serde(default)]
    pub key_size: Option<u32>,
    /// Per-entry validity; falls back to the global default
    #[serde(default)]
    pub validity_days: Option<u32>,

    #[serde(default)]
    pub host: Host,
}

/// Certificate authority section
#[derive(Debug, Clone, Deserialize)]
pub struct CaConfig {
    #[serde(default = "default_ca_root_dir")]
    pub root_dir: PathBuf,

    /// The CA's own subject fields
    #[serde(default)]
    pub common_fields: SubjectFields,

    #[serde(default)]
    pub key_size: Option<u32>,
    #[serde(default)]
    pub validity_days: Option<u32>,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            root_dir: default_ca_root_dir(),
            common_fields: SubjectFields::default(),
            key_size: None,
            validity_days: None,
        }
    }
}

fn default_ca_root_dir() -> PathBuf {
    PathBuf::from("ca")
}

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Identity fields applied to every generated subject
    #[serde(default)]
    pub common_fields: SubjectFields,

    /// Whether existing non-empty output files are replaced
    #[serde(default)]
    pub overwrite_files: bool,

    #[serde(default = "default_key_size")]
    pub key_size: u32,
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,

    /// Primary API endpoint; its addresses become the SANs of the
    /// `kubernetes` role certificate
    #[serde(default)]
    pub master_node: Host,

    #[serde(default)]
    pub worker_nodes: Vec<Host>,

    #[serde(default)]
    pub extra_certs: Vec<ExtraCertConfig>,

    #[serde(default)]
    pub ca: CaConfig,
}

fn default_key_size() -> u32 {
    2048
}

fn default_validity_days() -> u32 {
    365
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config =
            toml::from_str(&config_str).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Key size for the CA itself, falling back to the global default
    pub fn ca_key_size(&self) -> u32 {
        self.ca.key_size.unwrap_or(self.key_size)
    }

    /// Validity for the CA itself, falling back to the global default
    pub fn ca_validity_days(&self) -> u32 {
        self.ca.validity_days.unwrap_or(self.validity_days)
    }
}

//! Certificate parameter assembly
//!
//! A [`CertParams`] value is the unit of work for one certificate-to-be:
//! key size, validity period, subject fields, and SAN set, fully resolved
//! and validated before any cryptographic operation happens. The same value
//! can drive a self-signed CA, a CSR, or a leaf template.

use std::fmt;

use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;

use crate::config::{Config, ExtraCertConfig, Host};
use crate::error::{Error, Result};
use crate::san::SubjectAltNames;
use crate::subject::SubjectFields;

/// Common-name prefix for worker-node subjects
const NODE_CN_PREFIX: &str = "system:node";
/// Organization identifying the worker-node class
const NODE_ORGANIZATION: &str = "system:nodes";

/// Fixed parameters for one of the standard cluster roles
#[derive(Debug, Clone, Copy)]
pub struct RolePreset {
    /// Base name of the emitted key/CSR pair
    pub file_name: &'static str,
    pub common_name: &'static str,
    pub organization: &'static str,
    /// Whether the master node's addresses become this role's SANs
    pub include_master_sans: bool,
    /// Additional DNS names appended after the master SANs
    pub extra_dns_names: &'static [&'static str],
}

impl fmt::Display for RolePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File: {}, CN={}, O={}{}",
            self.file_name,
            self.common_name,
            self.organization,
            if self.include_master_sans { " with SANs" } else { "" }
        )
    }
}

/// The standard roles every cluster bootstrap emits, in batch order
pub const STANDARD_ROLES: &[RolePreset] = &[
    RolePreset {
        file_name: "admin",
        common_name: "admin",
        organization: "system:masters",
        include_master_sans: false,
        extra_dns_names: &[],
    },
    RolePreset {
        file_name: "kube-controller-manager",
        common_name: "system:kube-controller-manager",
        organization: "system:kube-controller-manager",
        include_master_sans: false,
        extra_dns_names: &[],
    },
    RolePreset {
        file_name: "kube-proxy",
        common_name: "system:kube-proxy",
        organization: "system:node-proxier",
        include_master_sans: false,
        extra_dns_names: &[],
    },
    RolePreset {
        file_name: "kubernetes",
        common_name: "kubernetes",
        organization: "kubernetes",
        include_master_sans: true,
        extra_dns_names: &[
            "kubernetes",
            "kubernetes.default",
            "kubernetes.default.svc",
            "kubernetes.default.svc.cluster.local",
        ],
    },
    RolePreset {
        file_name: "kube-scheduler",
        common_name: "system:kube-scheduler",
        organization: "system:kube-scheduler",
        include_master_sans: false,
        extra_dns_names: &[],
    },
    RolePreset {
        file_name: "service-accounts",
        common_name: "service-accounts",
        organization: "Kubernetes",
        include_master_sans: false,
        extra_dns_names: &[],
    },
];

/// Fully resolved parameters for one certificate
///
/// Immutable once built; the builder rejects zero key size or validity so
/// no template is ever derived from unusable numbers.
#[derive(Debug, Clone)]
pub struct CertParams {
    pub key_bits: u32,
    pub validity_days: u32,
    pub subject: SubjectFields,
    pub sans: SubjectAltNames,
}

impl CertParams {
    pub fn new(
        key_bits: u32,
        validity_days: u32,
        subject: SubjectFields,
        sans: SubjectAltNames,
    ) -> Result<Self> {
        if key_bits == 0 {
            return Err(Error::config("key size must be positive"));
        }
        if validity_days == 0 {
            return Err(Error::config("validity period must be positive"));
        }
        Ok(Self {
            key_bits,
            validity_days,
            subject,
            sans,
        })
    }

    /// Parameters for one of the standard roles
    ///
    /// Starts from the global identity fields, then applies the role's fixed
    /// common-name/organization pair. Only the `kubernetes` role carries
    /// SANs: the master node's addresses plus the in-cluster service names.
    pub fn for_role(cfg: &Config, role: &RolePreset) -> Result<Self> {
        let mut subject = cfg.common_fields.clone();
        subject.common_name = role.common_name.to_string();
        subject.organization = vec![role.organization.to_string()];

        let mut sans = if role.include_master_sans {
            cfg.master_node.sans()
        } else {
            SubjectAltNames::default()
        };
        sans.dns_names
            .extend(role.extra_dns_names.iter().map(|s| s.to_string()));

        Self::new(cfg.key_size, cfg.validity_days, subject, sans)
    }

    /// Parameters for one worker node
    pub fn for_node(cfg: &Config, node: &Host) -> Result<Self> {
        let mut subject = cfg.common_fields.clone();
        subject.common_name = format!("{}:{}", NODE_CN_PREFIX, node.alias);
        subject.organization = vec![NODE_ORGANIZATION.to_string()];

        Self::new(cfg.key_size, cfg.validity_days, subject, node.sans())
    }

    /// Parameters for one extra certificate entry
    ///
    /// Global identity fields with the entry's non-empty overrides merged in,
    /// the entry's own SAN set, and per-entry key-size/validity overrides
    /// falling back to the global defaults.
    pub fn for_extra(cfg: &Config, extra: &ExtraCertConfig) -> Result<Self> {
        let mut subject = cfg.common_fields.clone();
        subject.merge_overrides(&extra.common_fields);
        if !extra.common_fields.common_name.is_empty() {
            subject.common_name = extra.common_fields.common_name.clone();
        }

        Self::new(
            extra.key_size.unwrap_or(cfg.key_size),
            extra.validity_days.unwrap_or(cfg.validity_days),
            subject,
            extra.host.sans(),
        )
    }

    /// Parameters for the certificate authority itself
    pub fn for_ca(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.ca_key_size(),
            cfg.ca_validity_days(),
            cfg.ca.common_fields.clone(),
            SubjectAltNames::default(),
        )
    }

    /// Generate an RSA key pair of the configured size
    pub fn generate_key(&self) -> Result<PKey<Private>> {
        let rsa = Rsa::generate(self.key_bits)?;
        Ok(PKey::from_rsa(rsa)?)
    }
}

//! kube-pki - Cluster PKI bootstrap
//!
//! Bootstraps a small X.509 public-key infrastructure for a cluster: a
//! single self-signed root certificate authority, key/CSR pairs for the
//! standard cluster roles plus configured worker nodes and extra
//! certificates, and a signing path that turns CSRs into chained
//! certificates.
//!
//! # Pipeline
//!
//! ```text
//! config ─→ CertParams ─→ template ─→ key + CSR         (gen-csr)
//!                     └─→ CA template ─→ self-signed CA  (init-ca)
//! CSR + Authority ─→ signer ─→ chained certificate      (sign)
//! ```
//!
//! # Module Overview
//!
//! - [`san`]: classifies raw address strings (DNS, IP, email, URI) into a
//!   subject-alternative-name set
//! - [`subject`]: X.509 identity fields and the override merge
//! - [`params`]: validated per-certificate parameter assembly, including
//!   the fixed standard-role table
//! - [`template`]: CA / CSR / leaf template shapes from one parameter set
//! - [`authority`]: root CA generation, persistence, and loading
//! - [`signer`]: CSR verification and signing
//! - [`batch`]: fail-fast orchestration of the three commands
//! - [`config`]: the TOML configuration schema
//! - [`output`]: the create-or-overwrite output-file policy
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use kube_pki::batch;
//! use kube_pki::config::Config;
//!
//! fn bootstrap() -> anyhow::Result<()> {
//!     let cfg = Config::from_file(Path::new("config.toml"))?;
//!
//!     batch::init_ca(&cfg, "root")?;
//!     batch::generate_csrs(&cfg, Path::new("cert"))?;
//!
//!     Ok(())
//! }
//! ```
//!
//! All certificates are RSA with SHA-256 signatures; serial numbers are
//! random 128-bit draws, so uniqueness is probabilistic rather than
//! ledger-backed. The tool is an offline, re-runnable batch: there is no
//! retry logic, and the first error aborts the remaining entries.

pub mod authority;
pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod params;
pub mod san;
pub mod signer;
pub mod subject;
pub mod template;

pub use error::{Error, Result};

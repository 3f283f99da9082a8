//! Certificate authority identity
//!
//! A single self-signed root: a key pair plus its certificate, persisted
//! under a root directory as `<name>.key` (PKCS#8 PEM) and `<name>.crt`
//! (PEM). The private key is held in memory as DER inside a
//! [`secrecy::Secret`] so it is zeroized on drop and never appears in debug
//! output; the signing engine reconstructs a `PKey` from it only for the
//! duration of one signing operation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use secrecy::{ExposeSecret, Secret, Zeroize};

use crate::error::{Error, Result};
use crate::output;
use crate::params::CertParams;
use crate::template;

/// DER-encoded private key material that zeroizes on drop
#[derive(Clone)]
struct KeyMaterial {
    der_bytes: Vec<u8>,
}

impl Zeroize for KeyMaterial {
    fn zeroize(&mut self) {
        self.der_bytes.zeroize();
    }
}

/// A materialized certificate authority
///
/// Owns its private key exclusively; signing borrows it read-only, nothing
/// here is mutated after construction.
pub struct Authority {
    name: String,
    key: Secret<KeyMaterial>,
    cert: X509,
}

impl Authority {
    fn new(name: &str, key: &PKey<Private>, cert: X509) -> Result<Self> {
        let der_bytes = key.private_key_to_der()?;
        Ok(Self {
            name: name.to_string(),
            key: Secret::new(KeyMaterial { der_bytes }),
            cert,
        })
    }

    /// Generate and persist a new self-signed root authority
    ///
    /// Generates a key pair of the configured size, derives the CA template
    /// from `params`, self-signs it (issuer = subject), and writes the key
    /// and certificate under `root_dir` through the overwrite policy.
    pub fn init(root_dir: &Path, name: &str, params: &CertParams, overwrite: bool) -> Result<Self> {
        let key = params.generate_key()?;

        let mut builder = template::ca_builder(params)?;
        builder.set_pubkey(&key)?;
        builder.sign(&key, MessageDigest::sha256())?;
        let cert = builder.build();

        fs::create_dir_all(root_dir)?;
        output::write_file(
            &key_path(root_dir, name),
            &key.private_key_to_pem_pkcs8()?,
            overwrite,
        )?;
        output::write_file(&cert_path(root_dir, name), &cert.to_pem()?, overwrite)?;

        Self::new(name, &key, cert)
    }

    /// Load a previously initialized authority from disk
    pub fn load(root_dir: &Path, name: &str) -> Result<Self> {
        let key_pem = fs::read(key_path(root_dir, name))?;
        let key = PKey::private_key_from_pem(&key_pem)
            .map_err(|e| Error::parse(format!("CA private key for '{}'", name), e))?;

        let cert_pem = fs::read(cert_path(root_dir, name))?;
        let cert = X509::from_pem(&cert_pem)
            .map_err(|e| Error::parse(format!("CA certificate for '{}'", name), e))?;

        Self::new(name, &key, cert)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn certificate(&self) -> &X509 {
        &self.cert
    }

    /// Reconstruct the private key for one signing operation
    pub fn signing_key(&self) -> Result<PKey<Private>> {
        Ok(PKey::private_key_from_der(
            &self.key.expose_secret().der_bytes,
        )?)
    }
}

impl fmt::Debug for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authority")
            .field("name", &self.name)
            .field("key", &"<securely stored>")
            .finish()
    }
}

fn key_path(root_dir: &Path, name: &str) -> PathBuf {
    root_dir.join(format!("{}.key", name))
}

fn cert_path(root_dir: &Path, name: &str) -> PathBuf {
    root_dir.join(format!("{}.crt", name))
}

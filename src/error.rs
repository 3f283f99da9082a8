//! Error types for certificate generation and signing
//!
//! Every core component returns a typed error; the batch layer wraps these
//! with `anyhow` context naming the entry being processed. There is no retry
//! logic anywhere: the tool is an idempotent, re-runnable offline batch, so
//! cryptographic and filesystem failures abort the run.

use std::io;

use thiserror::Error;

/// Result alias used throughout the core modules
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration value (zero key size, zero validity)
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed PEM or CSR structure
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: openssl::error::ErrorStack,
    },

    /// CSR self-signature did not verify against its embedded public key
    #[error("CSR signature verification failed for {0}")]
    Signature(String),

    /// Key generation or signing failure from the OpenSSL primitives
    #[error("crypto operation failed: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    /// File create/read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn parse(what: impl Into<String>, source: openssl::error::ErrorStack) -> Self {
        Error::Parse {
            what: what.into(),
            source,
        }
    }
}

//! CSR signing against a materialized authority
//!
//! The signing path: parse a PEM-encoded request, verify its self-signature
//! against its own embedded public key, draw a fresh random serial, and
//! build the chained certificate: subject and SANs from the request, issuer
//! and signature from the authority, validity window from the configuration
//! at signing time. The authority is never mutated; no state is carried
//! between invocations.
//!
//! Issued certificates get extended key usage serverAuth AND clientAuth.
//! Cluster node certificates are dual-use (a kubelet is both a TLS server
//! and an API client), so one certificate covers both directions.

use std::fs;
use std::path::Path;

use openssl::asn1::{Asn1Integer, Asn1Time};
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::x509::extension::{BasicConstraints, ExtendedKeyUsage, KeyUsage};
use openssl::x509::{X509, X509Req};

use crate::authority::Authority;
use crate::error::{Error, Result};

// X509 version 3 is represented by 2
const X509_VERSION_3: i32 = 2;
const SERIAL_BITS: i32 = 128;

/// Draw a fresh random serial number
///
/// 128 bits of CSPRNG output; uniqueness is probabilistic, no ledger of
/// issued serials is kept.
pub fn random_serial() -> Result<Asn1Integer> {
    let mut serial = BigNum::new()?;
    serial.rand(SERIAL_BITS, MsbOption::MAYBE_ZERO, false)?;
    Ok(serial.to_asn1_integer()?)
}

/// Read and parse a PEM-encoded certificate signing request
pub fn load_csr(path: &Path) -> Result<X509Req> {
    let pem = fs::read(path)?;
    X509Req::from_pem(&pem).map_err(|e| Error::parse(format!("CSR file {}", path.display()), e))
}

/// Sign a verified request with the authority's key
///
/// Fails with [`Error::Signature`] if the request's self-signature does not
/// verify against its embedded public key. The request's SAN extension is
/// carried over verbatim; key usage and extended key usage are assigned
/// here, not taken from the request.
pub fn sign_csr(authority: &Authority, csr: &X509Req, validity_days: u32) -> Result<X509> {
    let csr_pubkey = csr.public_key()?;
    if !csr.verify(&csr_pubkey)? {
        return Err(Error::Signature(subject_label(csr)));
    }

    let mut builder = X509::builder()?;
    builder.set_version(X509_VERSION_3)?;
    let serial = random_serial()?;
    builder.set_serial_number(&serial)?;

    builder.set_subject_name(csr.subject_name())?;
    builder.set_issuer_name(authority.certificate().subject_name())?;

    let not_before = Asn1Time::days_from_now(0)?;
    builder.set_not_before(&not_before)?;
    let not_after = Asn1Time::days_from_now(validity_days)?;
    builder.set_not_after(&not_after)?;

    builder.set_pubkey(&csr_pubkey)?;

    let bc = BasicConstraints::new().critical().build()?;
    builder.append_extension(bc)?;

    let ku = KeyUsage::new()
        .critical()
        .digital_signature()
        .key_encipherment()
        .build()?;
    builder.append_extension(ku)?;

    let eku = ExtendedKeyUsage::new().server_auth().client_auth().build()?;
    builder.append_extension(eku)?;

    // carry over the requested extensions; a request without attributes has
    // no extension stack at all, which is not an error
    if let Ok(requested) = csr.extensions() {
        for ext in requested.iter() {
            builder.append_extension2(ext)?;
        }
    }

    let signing_key = authority.signing_key()?;
    builder.sign(&signing_key, MessageDigest::sha256())?;

    Ok(builder.build())
}

fn subject_label(csr: &X509Req) -> String {
    csr.subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .and_then(|e| e.data().as_utf8().ok().map(|s| s.to_string()))
        .unwrap_or_else(|| "request".to_string())
}

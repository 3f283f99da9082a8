//! Certificate template construction
//!
//! Turns one [`CertParams`] value into one of three template shapes:
//!
//! - a self-signed CA template ([`ca_builder`])
//! - a certificate signing request ([`csr_request`])
//! - a leaf certificate template ([`leaf_builder`])
//!
//! Splitting template shape from parameter assembly lets the same parameter
//! set drive either a self-signed authority or an external CSR without
//! duplicating subject/SAN logic. The CA and leaf builders return a
//! configured `X509Builder`; the caller sets the public key and signs, so
//! serial assignment stays with the signing side everywhere except the
//! self-signed root, which carries a fixed placeholder serial.

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::{X509, X509Builder, X509Extension, X509Req, X509ReqBuilder, X509v3Context};

use crate::error::Result;
use crate::params::CertParams;
use crate::san::SubjectAltNames;

// X509 version 3 is represented by 2
const X509_VERSION_3: i32 = 2;
// CSRs are version 1, represented by 0
const CSR_VERSION_1: i32 = 0;

/// Placeholder serial for the self-signed root; every issued certificate
/// gets a random serial from the signing engine instead
const ROOT_SERIAL: u32 = 1;

fn san_extension(sans: &SubjectAltNames, ctx: &X509v3Context<'_>) -> Result<X509Extension> {
    let mut san = SubjectAlternativeName::new();
    for dns in &sans.dns_names {
        san.dns(dns);
    }
    for email in &sans.email_addresses {
        san.email(email);
    }
    for ip in &sans.ip_addresses {
        san.ip(&ip.to_string());
    }
    for uri in &sans.uris {
        san.uri(uri.as_str());
    }
    Ok(san.build(ctx)?)
}

/// Configure a self-signed CA certificate template
///
/// Serial = placeholder, NotBefore = now, NotAfter = now + validity,
/// BasicConstraints CA (critical), key usage digitalSignature +
/// keyCertSign + keyEncipherment (critical), subject = issuer = the
/// parameter set's identity fields. The caller sets the public key and
/// signs with the matching private key.
pub fn ca_builder(params: &CertParams) -> Result<X509Builder> {
    let mut builder = X509::builder()?;
    builder.set_version(X509_VERSION_3)?;

    let serial = BigNum::from_u32(ROOT_SERIAL)?.to_asn1_integer()?;
    builder.set_serial_number(&serial)?;

    let name = params.subject.to_x509_name()?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;

    let not_before = Asn1Time::days_from_now(0)?;
    builder.set_not_before(&not_before)?;
    let not_after = Asn1Time::days_from_now(params.validity_days)?;
    builder.set_not_after(&not_after)?;

    let bc = BasicConstraints::new().critical().ca().build()?;
    builder.append_extension(bc)?;

    let ku = KeyUsage::new()
        .critical()
        .digital_signature()
        .key_cert_sign()
        .key_encipherment()
        .build()?;
    builder.append_extension(ku)?;

    Ok(builder)
}

/// Build and sign a certificate signing request
///
/// Subject from the identity fields, SAN extension carrying the parameter
/// set's four sequences verbatim, no validity window. The request is signed
/// with the subject's own key at creation.
pub fn csr_request(params: &CertParams, key: &PKey<Private>) -> Result<X509Req> {
    let mut builder = X509ReqBuilder::new()?;
    builder.set_version(CSR_VERSION_1)?;

    let name = params.subject.to_x509_name()?;
    builder.set_subject_name(&name)?;
    builder.set_pubkey(key)?;

    if !params.sans.is_empty() {
        let ext = {
            let ctx = builder.x509v3_context(None);
            san_extension(&params.sans, &ctx)?
        };
        let mut extensions = Stack::new()?;
        extensions.push(ext)?;
        builder.add_extensions(&extensions)?;
    }

    builder.sign(key, MessageDigest::sha256())?;
    Ok(builder.build())
}

/// Configure a leaf (end-entity) certificate template
///
/// NotBefore = now, NotAfter = now + validity; a zero validity collapses the
/// window to the issuing instant and is only reachable from diagnostic
/// callers, the parameter builder rejects it for issued certificates. Key
/// usage keyEncipherment + digitalSignature (critical); extended key usage
/// serverAuth, or clientAuth instead when `client_only` is set. Serial and
/// public key are left to the signing side.
pub fn leaf_builder(params: &CertParams, client_only: bool) -> Result<X509Builder> {
    let mut builder = X509::builder()?;
    builder.set_version(X509_VERSION_3)?;

    let name = params.subject.to_x509_name()?;
    builder.set_subject_name(&name)?;

    let not_before = Asn1Time::days_from_now(0)?;
    builder.set_not_before(&not_before)?;
    let not_after = Asn1Time::days_from_now(params.validity_days)?;
    builder.set_not_after(&not_after)?;

    let bc = BasicConstraints::new().critical().build()?;
    builder.append_extension(bc)?;

    let ku = KeyUsage::new()
        .critical()
        .key_encipherment()
        .digital_signature()
        .build()?;
    builder.append_extension(ku)?;

    let mut eku = ExtendedKeyUsage::new();
    if client_only {
        eku.client_auth();
    } else {
        eku.server_auth();
    }
    builder.append_extension(eku.build()?)?;

    if !params.sans.is_empty() {
        let ext = {
            let ctx = builder.x509v3_context(None, None);
            san_extension(&params.sans, &ctx)?
        };
        builder.append_extension(ext)?;
    }

    Ok(builder)
}

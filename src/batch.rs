//! Batch orchestration
//!
//! Drives the three top-level operations: initializing the root authority,
//! generating the key/CSR pairs for every configured entity, and signing a
//! list of CSR files. Entries are processed in a fixed order (standard
//! roles, then worker nodes, then extra certificates) and the batch is
//! fail-fast: the first error aborts the remainder, annotated with the
//! entry that was being processed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use openssl::pkey::{PKey, Private};

use crate::authority::Authority;
use crate::config::Config;
use crate::output;
use crate::params::{CertParams, STANDARD_ROLES};
use crate::signer;
use crate::template;

/// Initialize the root certificate authority
pub fn init_ca(cfg: &Config, ca_name: &str) -> Result<()> {
    println!(
        "Initialize certificate authority at {}",
        cfg.ca.root_dir.join(ca_name).display()
    );

    let params = CertParams::for_ca(cfg).context("Invalid CA configuration")?;
    Authority::init(&cfg.ca.root_dir, ca_name, &params, cfg.overwrite_files)
        .context("Failed to generate root CA")?;

    println!("✓ CA key and self-signed certificate written");
    Ok(())
}

/// Generate key/CSR pairs for every configured entity
pub fn generate_csrs(cfg: &Config, out_dir: &Path) -> Result<()> {
    println!("Generate pairs of private keys and certificate signing requests");
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output dir {}", out_dir.display()))?;

    println!("Generate standard role csr-key pairs");
    for role in STANDARD_ROLES {
        println!("{}", role);
        let params = CertParams::for_role(cfg, role)
            .with_context(|| format!("Invalid parameters for role {}", role.file_name))?;
        write_key_csr(out_dir, role.file_name, cfg.overwrite_files, &params)
            .with_context(|| format!("Failed to generate role {}", role.file_name))?;
    }

    println!("Generate node certificates");
    for node in &cfg.worker_nodes {
        println!("Node: {}, Addresses: {:?}", node.alias, node.addresses);
        let params = CertParams::for_node(cfg, node)
            .with_context(|| format!("Invalid parameters for node {}", node.alias))?;
        write_key_csr(out_dir, &node.alias, cfg.overwrite_files, &params)
            .with_context(|| format!("Failed to generate node {}", node.alias))?;
    }

    println!("Generate extra certs");
    for extra in &cfg.extra_certs {
        println!(
            "Name: {}, Host: {}, Addresses: {:?}",
            extra.name, extra.host.alias, extra.host.addresses
        );
        let params = CertParams::for_extra(cfg, extra)
            .with_context(|| format!("Invalid parameters for extra cert {}", extra.name))?;
        write_key_csr(out_dir, &extra.name, cfg.overwrite_files, &params)
            .with_context(|| format!("Failed to generate extra cert {}", extra.name))?;
    }

    Ok(())
}

/// Sign a list of PEM CSR files against a loaded authority
pub fn sign_files(cfg: &Config, ca_name: &str, files: &[impl AsRef<Path>], out_dir: &Path) -> Result<()> {
    let authority = Authority::load(&cfg.ca.root_dir, ca_name)
        .with_context(|| format!("Failed to load certificate authority '{}'", ca_name))?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output dir {}", out_dir.display()))?;

    for file in files {
        let file = file.as_ref();
        println!("Signing {}", file.display());

        let csr = signer::load_csr(file)
            .with_context(|| format!("Failed to load CSR {}", file.display()))?;
        let cert = signer::sign_csr(&authority, &csr, cfg.validity_days)
            .with_context(|| format!("Failed to sign {}", file.display()))?;

        let base = file
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("CSR path has no usable base name: {}", file.display()))?;
        let cert_path = out_dir.join(format!("{}.crt", base));
        output::write_file(&cert_path, &cert.to_pem()?, cfg.overwrite_files)
            .with_context(|| format!("Failed to write {}", cert_path.display()))?;
        println!("CRT file: {}", cert_path.display());
    }

    Ok(())
}

fn write_key_csr(
    out_dir: &Path,
    file_name: &str,
    overwrite: bool,
    params: &CertParams,
) -> Result<()> {
    let key: PKey<Private> = params.generate_key()?;
    let csr = template::csr_request(params, &key)?;

    let key_path = out_dir.join(format!("{}.key", file_name));
    output::write_file(&key_path, &key.private_key_to_pem_pkcs8()?, overwrite)?;
    println!("KEY file: {}", key_path.display());

    let csr_path = out_dir.join(format!("{}.csr", file_name));
    output::write_file(&csr_path, &csr.to_pem()?, overwrite)?;
    println!("CSR file: {}", csr_path.display());
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn full_config(overwrite: bool) -> Config {
        let toml_str = format!(
            r#"
            overwrite_files = {}
            key_size = 2048
            validity_days = 365

            [common_fields]
            country = ["US"]
            organization = ["Example Corp"]

            [master_node]
            alias = "master"
            addresses = ["10.0.0.1", "kube.example.com"]

            [[worker_nodes]]
            alias = "node1"
            addresses = ["10.0.0.11", "node1.example.com"]

            [[extra_certs]]
            name = "etcd"
            [extra_certs.common_fields]
            common_name = "etcd"
            organization = ["etcd-cluster"]
            [extra_certs.host]
            alias = "etcd"
            addresses = ["10.0.1.1"]

            [ca.common_fields]
            common_name = "Example Root CA"
            "#,
            overwrite
        );
        toml::from_str(&toml_str).unwrap()
    }

    fn dir_entries(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_generate_csrs_emits_all_entries() {
        let dir = tempdir().unwrap();
        let cfg = full_config(false);

        generate_csrs(&cfg, dir.path()).unwrap();

        let entries = dir_entries(dir.path());
        for name in [
            "admin",
            "kube-controller-manager",
            "kube-proxy",
            "kubernetes",
            "kube-scheduler",
            "service-accounts",
            "node1",
            "etcd",
        ] {
            assert!(entries.contains(&format!("{}.key", name)), "missing {}.key", name);
            assert!(entries.contains(&format!("{}.csr", name)), "missing {}.csr", name);
        }
    }

    #[test]
    fn test_rerun_is_structurally_idempotent() {
        let dir = tempdir().unwrap();
        let cfg = full_config(true);

        generate_csrs(&cfg, dir.path()).unwrap();
        let first = dir_entries(dir.path());

        generate_csrs(&cfg, dir.path()).unwrap();
        let second = dir_entries(dir.path());

        assert_eq!(first, second);
    }

    #[test]
    fn test_end_to_end_init_generate_sign() {
        let work = tempdir().unwrap();
        let mut cfg = full_config(false);
        cfg.ca.root_dir = work.path().join("ca");
        let csr_dir = work.path().join("csr");
        let crt_dir = work.path().join("crt");

        init_ca(&cfg, "root").unwrap();
        generate_csrs(&cfg, &csr_dir).unwrap();

        let csr_files: Vec<_> = ["node1", "kubernetes"]
            .iter()
            .map(|n| csr_dir.join(format!("{}.csr", n)))
            .collect();
        sign_files(&cfg, "root", &csr_files, &crt_dir).unwrap();

        let authority = Authority::load(&cfg.ca.root_dir, "root").unwrap();
        let ca_pubkey = authority.certificate().public_key().unwrap();
        for name in ["node1", "kubernetes"] {
            let pem = fs::read(crt_dir.join(format!("{}.crt", name))).unwrap();
            let cert = openssl::x509::X509::from_pem(&pem).unwrap();
            assert!(cert.verify(&ca_pubkey).unwrap());
        }
    }

    #[test]
    fn test_sign_unknown_authority_fails() {
        let work = tempdir().unwrap();
        let mut cfg = full_config(false);
        cfg.ca.root_dir = work.path().join("ca");

        let files: Vec<std::path::PathBuf> = vec![];
        let err = sign_files(&cfg, "root", &files, work.path()).unwrap_err();
        assert!(err.to_string().contains("certificate authority"));
    }

    #[test]
    fn test_batch_aborts_on_invalid_entry() {
        let dir = tempdir().unwrap();
        let mut cfg = full_config(false);
        // zero key size on the extra entry makes the last batch stage fail
        cfg.extra_certs[0].key_size = Some(0);

        let err = generate_csrs(&cfg, dir.path()).unwrap_err();
        assert!(err.to_string().contains("etcd"));

        // earlier entries were still produced, nothing after the failure
        let entries = dir_entries(dir.path());
        assert!(entries.contains("admin.key"));
        assert!(!entries.contains("etcd.key"));
    }
}

//! Address classification and subject-alternative-name assembly
//!
//! Cluster config lists reachable identities as raw strings: hostnames, IP
//! literals, emails, URLs. Each address is classified into exactly one of the
//! four SAN buckets; nothing is rejected, unclassifiable input lands in the
//! DNS-name bucket.
//!
//! Classification order (first match wins):
//! 1. contains `@` → email address
//! 2. IPv4/IPv6 literal → IP address
//! 3. absolute URI with a scheme (`scheme://...`) → URI
//! 4. everything else → DNS name

use std::net::IpAddr;

use url::Url;

/// One classified address
#[derive(Debug, Clone, PartialEq)]
pub enum Address {
    Dns(String),
    Email(String),
    Ip(IpAddr),
    Uri(Url),
}

/// Classify a single raw address string
///
/// Pure function; the input is never mutated. The URI branch requires the
/// string to contain `://` so that `host:port` strings fall through to the
/// DNS bucket instead of being read as a one-letter-scheme URI.
pub fn classify(addr: &str) -> Address {
    if addr.contains('@') {
        return Address::Email(addr.to_string());
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return Address::Ip(ip);
    }
    if addr.contains("://") {
        if let Ok(url) = Url::parse(addr) {
            return Address::Uri(url);
        }
    }
    Address::Dns(addr.to_string())
}

/// Subject alternative names for one certificate
///
/// Four disjoint sequences; order within each sequence is the insertion
/// order of the source address list.
#[derive(Debug, Clone, Default)]
pub struct SubjectAltNames {
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub uris: Vec<Url>,
}

impl SubjectAltNames {
    /// Build a SAN set by classifying a list of addresses in source order
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Self {
        let mut sans = SubjectAltNames::default();
        for addr in addresses {
            match classify(addr.as_ref()) {
                Address::Dns(name) => sans.dns_names.push(name),
                Address::Email(email) => sans.email_addresses.push(email),
                Address::Ip(ip) => sans.ip_addresses.push(ip),
                Address::Uri(url) => sans.uris.push(url),
            }
        }
        sans
    }

    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty()
            && self.email_addresses.is_empty()
            && self.ip_addresses.is_empty()
            && self.uris.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_email() {
        assert_eq!(
            classify("admin@example.com"),
            Address::Email("admin@example.com".to_string())
        );
    }

    #[test]
    fn test_classify_ipv4() {
        assert_eq!(classify("10.0.0.1"), Address::Ip("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_classify_ipv6() {
        assert_eq!(classify("fd00::1"), Address::Ip("fd00::1".parse().unwrap()));
    }

    #[test]
    fn test_classify_uri() {
        match classify("https://kube.example.com:6443/api") {
            Address::Uri(url) => assert_eq!(url.scheme(), "https"),
            other => panic!("expected URI, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_dns_default() {
        assert_eq!(
            classify("node1.example.com"),
            Address::Dns("node1.example.com".to_string())
        );
    }

    #[test]
    fn test_host_port_is_not_uri() {
        // "localhost:8080" parses as a URL with scheme "localhost"; the `://`
        // guard keeps it in the DNS bucket
        assert_eq!(
            classify("localhost:8080"),
            Address::Dns("localhost:8080".to_string())
        );
    }

    #[test]
    fn test_san_set_from_mixed_addresses() {
        let addrs = ["10.0.0.1", "node1.example.com", "admin@example.com"];
        let sans = SubjectAltNames::from_addresses(&addrs);

        assert_eq!(sans.ip_addresses, vec!["10.0.0.1".parse::<IpAddr>().unwrap()]);
        assert_eq!(sans.dns_names, vec!["node1.example.com".to_string()]);
        assert_eq!(sans.email_addresses, vec!["admin@example.com".to_string()]);
        assert!(sans.uris.is_empty());
    }

    #[test]
    fn test_san_set_preserves_insertion_order() {
        let addrs = ["b.example.com", "a.example.com", "192.168.0.2", "192.168.0.1"];
        let sans = SubjectAltNames::from_addresses(&addrs);

        assert_eq!(sans.dns_names, vec!["b.example.com", "a.example.com"]);
        assert_eq!(
            sans.ip_addresses,
            vec![
                "192.168.0.2".parse::<IpAddr>().unwrap(),
                "192.168.0.1".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[test]
    fn test_empty_san_set() {
        let sans = SubjectAltNames::from_addresses::<&str>(&[]);
        assert!(sans.is_empty());
    }
}

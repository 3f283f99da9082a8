//! X.509 subject identity fields
//!
//! Organizational/identity attributes shared by the CA's own subject and
//! every leaf subject. Deserialized straight from the TOML config; converted
//! to an `X509Name` when a template is built. Empty fields are skipped, so a
//! sparse config produces a sparse distinguished name rather than empty RDN
//! entries.

use openssl::nid::Nid;
use openssl::x509::{X509Name, X509NameBuilder};
use serde::Deserialize;

use crate::error::Result;

/// Subject distinguished-name fields
///
/// Common name is scalar; every other field is a sequence, matching how
/// X.509 allows repeated RDN attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectFields {
    #[serde(default)]
    pub common_name: String,

    #[serde(default)]
    pub country: Vec<String>,
    #[serde(default)]
    pub organization: Vec<String>,
    #[serde(default)]
    pub organizational_unit: Vec<String>,

    #[serde(default)]
    pub locality: Vec<String>,
    #[serde(default)]
    pub province: Vec<String>,

    #[serde(default)]
    pub street_address: Vec<String>,
    #[serde(default)]
    pub postal_code: Vec<String>,
}

impl SubjectFields {
    /// Overlay non-empty override sequences onto this value, field by field
    ///
    /// Common name is excluded from the merge: role and entry constructors
    /// assign it directly. An empty override sequence never clobbers a
    /// non-empty base sequence.
    pub fn merge_overrides(&mut self, overrides: &SubjectFields) {
        if !overrides.country.is_empty() {
            self.country = overrides.country.clone();
        }
        if !overrides.organization.is_empty() {
            self.organization = overrides.organization.clone();
        }
        if !overrides.organizational_unit.is_empty() {
            self.organizational_unit = overrides.organizational_unit.clone();
        }
        if !overrides.locality.is_empty() {
            self.locality = overrides.locality.clone();
        }
        if !overrides.province.is_empty() {
            self.province = overrides.province.clone();
        }
        if !overrides.street_address.is_empty() {
            self.street_address = overrides.street_address.clone();
        }
        if !overrides.postal_code.is_empty() {
            self.postal_code = overrides.postal_code.clone();
        }
    }

    /// Build an `X509Name` from the non-empty fields
    pub fn to_x509_name(&self) -> Result<X509Name> {
        let mut builder = X509NameBuilder::new()?;

        if !self.common_name.is_empty() {
            builder.append_entry_by_nid(Nid::COMMONNAME, &self.common_name)?;
        }
        for country in &self.country {
            builder.append_entry_by_nid(Nid::COUNTRYNAME, country)?;
        }
        for org in &self.organization {
            builder.append_entry_by_nid(Nid::ORGANIZATIONNAME, org)?;
        }
        for ou in &self.organizational_unit {
            builder.append_entry_by_nid(Nid::ORGANIZATIONALUNITNAME, ou)?;
        }
        for locality in &self.locality {
            builder.append_entry_by_nid(Nid::LOCALITYNAME, locality)?;
        }
        for province in &self.province {
            builder.append_entry_by_nid(Nid::STATEORPROVINCENAME, province)?;
        }
        for street in &self.street_address {
            builder.append_entry_by_nid(Nid::STREETADDRESS, street)?;
        }
        for postal in &self.postal_code {
            builder.append_entry_by_nid(Nid::POSTALCODE, postal)?;
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_override_keeps_base() {
        let mut base = SubjectFields {
            organization: vec!["base-org".to_string()],
            country: vec![],
            ..Default::default()
        };
        let overrides = SubjectFields {
            organization: vec![],
            country: vec!["US".to_string()],
            ..Default::default()
        };

        base.merge_overrides(&overrides);

        assert_eq!(base.organization, vec!["base-org".to_string()]);
        assert_eq!(base.country, vec!["US".to_string()]);
    }

    #[test]
    fn test_non_empty_override_replaces_base() {
        let mut base = SubjectFields {
            locality: vec!["Sao Jose dos Campos".to_string()],
            province: vec!["SP".to_string()],
            ..Default::default()
        };
        let overrides = SubjectFields {
            locality: vec!["Campinas".to_string()],
            ..Default::default()
        };

        base.merge_overrides(&overrides);

        assert_eq!(base.locality, vec!["Campinas".to_string()]);
        assert_eq!(base.province, vec!["SP".to_string()]);
    }

    #[test]
    fn test_common_name_not_merged() {
        let mut base = SubjectFields {
            common_name: "keep-me".to_string(),
            ..Default::default()
        };
        let overrides = SubjectFields {
            common_name: "clobber".to_string(),
            ..Default::default()
        };

        base.merge_overrides(&overrides);

        assert_eq!(base.common_name, "keep-me");
    }

    #[test]
    fn test_to_x509_name_skips_empty_fields() {
        let fields = SubjectFields {
            common_name: "admin".to_string(),
            organization: vec!["system:masters".to_string()],
            ..Default::default()
        };

        let name = fields.to_x509_name().unwrap();

        let cn = name
            .entries_by_nid(Nid::COMMONNAME)
            .next()
            .expect("CN entry");
        assert_eq!(cn.data().as_utf8().unwrap().to_string(), "admin");
        assert!(name.entries_by_nid(Nid::COUNTRYNAME).next().is_none());
    }

    #[test]
    fn test_to_x509_name_repeated_entries() {
        let fields = SubjectFields {
            common_name: "multi".to_string(),
            organizational_unit: vec!["ops".to_string(), "infra".to_string()],
            ..Default::default()
        };

        let name = fields.to_x509_name().unwrap();
        let ous: Vec<String> = name
            .entries_by_nid(Nid::ORGANIZATIONALUNITNAME)
            .map(|e| e.data().as_utf8().unwrap().to_string())
            .collect();
        assert_eq!(ous, vec!["ops".to_string(), "infra".to_string()]);
    }
}

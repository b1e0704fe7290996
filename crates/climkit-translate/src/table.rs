//! Bidirectional vendor/domain translation tables

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use thiserror::Error;

/// Error constructing a table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableBuildError {
    #[error("table '{table}' maps vendor value {value} twice")]
    DuplicateVendorValue { table: String, value: String },

    #[error("table '{table}' declares two canonical vendor values for domain value {value}")]
    DuplicateDomainValue { table: String, value: String },
}

/// Error translating a value
///
/// A gap in either direction is a defect (missing table entry or a
/// capability mismatch), never something to paper over with a default. The
/// message carries the table name and the offending value; callers add the
/// device id when logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("no domain mapping for vendor value {value} in table '{table}'")]
    UnknownVendorValue { table: String, value: String },

    #[error("domain value {value} has no vendor mapping in table '{table}'")]
    UnsupportedDomainValue { table: String, value: String },
}

/// A fixed, per-vendor mapping between domain values and vendor-native values
///
/// `entry` pairs are bidirectional. `alias` pairs are forward-only: they
/// fold an additional vendor value onto an already-representable domain
/// value (e.g. a vendor's "autoHeat"/"autoCool" both rendering as `Auto`)
/// and make the table non-invertible. Immutable after construction.
#[derive(Debug, Clone)]
pub struct TranslationTable<D, V> {
    name: String,
    forward: HashMap<V, D>,
    reverse: HashMap<D, V>,
    domain_order: Vec<D>,
    invertible: bool,
}

impl<D, V> TranslationTable<D, V>
where
    D: Copy + Eq + Hash + fmt::Debug,
    V: Clone + Eq + Hash + fmt::Debug,
{
    /// Start building a table; the name shows up in every error it produces
    pub fn builder(name: impl Into<String>) -> TranslationTableBuilder<D, V> {
        TranslationTableBuilder {
            name: name.into(),
            pairs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translate a vendor-native value into the domain vocabulary
    pub fn to_domain(&self, vendor: &V) -> Result<D, TranslationError> {
        self.forward
            .get(vendor)
            .copied()
            .ok_or_else(|| TranslationError::UnknownVendorValue {
                table: self.name.clone(),
                value: format!("{vendor:?}"),
            })
    }

    /// Translate a domain value into the vendor's native vocabulary
    pub fn to_vendor(&self, domain: D) -> Result<&V, TranslationError> {
        self.reverse
            .get(&domain)
            .ok_or_else(|| TranslationError::UnsupportedDomainValue {
                table: self.name.clone(),
                value: format!("{domain:?}"),
            })
    }

    /// Whether `to_vendor(to_domain(v)) == v` holds for every mapped vendor value
    ///
    /// False as soon as one `alias` fold exists.
    pub fn is_invertible(&self) -> bool {
        self.invertible
    }

    /// Domain values with a canonical vendor mapping, in declaration order
    pub fn domain_values(&self) -> &[D] {
        &self.domain_order
    }

    /// Every vendor value the table understands
    pub fn vendor_values(&self) -> impl Iterator<Item = &V> {
        self.forward.keys()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

enum PairKind {
    Entry,
    Alias,
}

/// Builder for [`TranslationTable`]
pub struct TranslationTableBuilder<D, V> {
    name: String,
    pairs: Vec<(V, D, PairKind)>,
}

impl<D, V> TranslationTableBuilder<D, V>
where
    D: Copy + Eq + Hash + fmt::Debug,
    V: Clone + Eq + Hash + fmt::Debug,
{
    /// Add a bidirectional vendor ↔ domain pair
    pub fn entry(mut self, vendor: V, domain: D) -> Self {
        self.pairs.push((vendor, domain, PairKind::Entry));
        self
    }

    /// Add a forward-only vendor → domain fold
    ///
    /// Use for vendor values that render as a domain value another vendor
    /// value already canonically maps to. Marks the table non-invertible.
    pub fn alias(mut self, vendor: V, domain: D) -> Self {
        self.pairs.push((vendor, domain, PairKind::Alias));
        self
    }

    /// Validate and freeze the table
    pub fn build(self) -> Result<TranslationTable<D, V>, TableBuildError> {
        let mut forward = HashMap::with_capacity(self.pairs.len());
        let mut reverse = HashMap::new();
        let mut domain_order = Vec::new();
        let mut invertible = true;

        for (vendor, domain, kind) in self.pairs {
            if forward.insert(vendor.clone(), domain).is_some() {
                return Err(TableBuildError::DuplicateVendorValue {
                    table: self.name,
                    value: format!("{vendor:?}"),
                });
            }
            match kind {
                PairKind::Entry => {
                    if reverse.insert(domain, vendor).is_some() {
                        return Err(TableBuildError::DuplicateDomainValue {
                            table: self.name,
                            value: format!("{domain:?}"),
                        });
                    }
                    domain_order.push(domain);
                }
                PairKind::Alias => {
                    invertible = false;
                }
            }
        }

        Ok(TranslationTable {
            name: self.name,
            forward,
            reverse,
            domain_order,
            invertible,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climkit_core::{FanMode, HvacMode};

    fn string_mode_table() -> TranslationTable<HvacMode, String> {
        TranslationTable::builder("hvac_mode")
            .entry("hot".to_string(), HvacMode::Heat)
            .entry("cool".to_string(), HvacMode::Cool)
            .entry("auto".to_string(), HvacMode::Auto)
            .alias("autoHeat".to_string(), HvacMode::Auto)
            .alias("autoCool".to_string(), HvacMode::Auto)
            .build()
            .unwrap()
    }

    #[test]
    fn test_forward_and_reverse() {
        let table = string_mode_table();
        assert_eq!(table.to_domain(&"hot".to_string()).unwrap(), HvacMode::Heat);
        assert_eq!(table.to_vendor(HvacMode::Heat).unwrap(), "hot");
    }

    #[test]
    fn test_unknown_vendor_value_fails_loudly() {
        let table: TranslationTable<FanMode, String> = TranslationTable::builder("fan_mode")
            .entry("low".to_string(), FanMode::Low)
            .entry("high".to_string(), FanMode::High)
            .build()
            .unwrap();

        let err = table.to_domain(&"Powerful".to_string()).unwrap_err();
        assert_eq!(
            err,
            TranslationError::UnknownVendorValue {
                table: "fan_mode".to_string(),
                value: "\"Powerful\"".to_string(),
            }
        );
    }

    #[test]
    fn test_unsupported_domain_value() {
        let table = string_mode_table();
        let err = table.to_vendor(HvacMode::Dry).unwrap_err();
        assert!(matches!(
            err,
            TranslationError::UnsupportedDomainValue { .. }
        ));
    }

    #[test]
    fn test_alias_folds_forward_only() {
        let table = string_mode_table();
        // Both vendor spellings fold onto Auto...
        assert_eq!(
            table.to_domain(&"autoHeat".to_string()).unwrap(),
            HvacMode::Auto
        );
        assert_eq!(
            table.to_domain(&"autoCool".to_string()).unwrap(),
            HvacMode::Auto
        );
        // ...and the reverse direction picks the canonical entry.
        assert_eq!(table.to_vendor(HvacMode::Auto).unwrap(), "auto");
    }

    #[test]
    fn test_invertibility_flags() {
        let folded = string_mode_table();
        assert!(!folded.is_invertible());

        let exact: TranslationTable<HvacMode, u8> = TranslationTable::builder("mode_code")
            .entry(1, HvacMode::Heat)
            .entry(2, HvacMode::Cool)
            .build()
            .unwrap();
        assert!(exact.is_invertible());

        // Round-trip holds for every vendor value of an invertible table
        for code in exact.vendor_values() {
            let domain = exact.to_domain(code).unwrap();
            assert_eq!(exact.to_vendor(domain).unwrap(), code);
        }
    }

    #[test]
    fn test_duplicate_vendor_value_rejected() {
        let result: Result<TranslationTable<HvacMode, u8>, _> = TranslationTable::builder("dup")
            .entry(1, HvacMode::Heat)
            .entry(1, HvacMode::Cool)
            .build();
        assert!(matches!(
            result,
            Err(TableBuildError::DuplicateVendorValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_domain_entry_rejected() {
        // Two canonical spellings for one domain value is ambiguous; the
        // second must be declared as an alias instead.
        let result: Result<TranslationTable<HvacMode, u8>, _> = TranslationTable::builder("dup")
            .entry(1, HvacMode::Heat)
            .entry(2, HvacMode::Heat)
            .build();
        assert!(matches!(
            result,
            Err(TableBuildError::DuplicateDomainValue { .. })
        ));
    }

    #[test]
    fn test_domain_values_declaration_order() {
        let table = string_mode_table();
        assert_eq!(
            table.domain_values(),
            &[HvacMode::Heat, HvacMode::Cool, HvacMode::Auto]
        );
    }
}

//! Vendor-to-domain value translation for climkit
//!
//! This crate provides the translation layer between a vendor's native
//! vocabulary (strings, integer codes, serde-derived enums) and the domain
//! vocabulary in `climkit-core`. Tables are built once per vendor at setup
//! and shared read-only by every entity of that vendor; lookups are pure
//! functions with no I/O and no shared mutable state.

mod table;
mod translator;

pub use table::{TableBuildError, TranslationError, TranslationTable, TranslationTableBuilder};
pub use translator::ClimateTranslator;

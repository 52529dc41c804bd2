//! Per-language line sets the typing banner cycles through.
//!
//! A catalog is immutable once built. Lookups for codes it doesn't know fall
//! back to the configured fallback language so the banner always has text.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Language code such as `en` or `ge`
///
/// Codes are kept verbatim (no case folding) so that switching to an unknown
/// code still counts as a change even though it animates the fallback lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Built-in English lines
pub const DEFAULT_EN: &[&str] = &["Hello, I am Shota", "DevOps Engineer in Progress..."];

/// Built-in Georgian lines
pub const DEFAULT_GE: &[&str] = &[
    "გამარჯობა, მე ვარ შოთა",
    "DevOps ინჟინერი განვითარების პროცესში...",
];

/// Language used when nothing is stored and for unknown codes
pub const FALLBACK_LANGUAGE: &str = "en";

/// Mapping of language code -> ordered lines
#[derive(Debug, Clone)]
pub struct Catalog {
    languages: BTreeMap<LanguageCode, Vec<String>>,
    fallback: LanguageCode,
}

impl Catalog {
    /// Build a catalog, rejecting empty line sets and a missing fallback
    pub fn new(
        languages: BTreeMap<LanguageCode, Vec<String>>,
        fallback: LanguageCode,
    ) -> Result<Self> {
        for (code, lines) in &languages {
            if lines.is_empty() {
                bail!("Language '{}' has no lines", code);
            }
        }
        if !languages.contains_key(&fallback) {
            bail!("Fallback language '{}' is not in the catalog", fallback);
        }

        Ok(Self {
            languages,
            fallback,
        })
    }

    /// Lines for `code`, or the fallback set if the code is unknown
    pub fn lines_for(&self, code: &LanguageCode) -> &[String] {
        self.languages
            .get(code)
            .or_else(|| self.languages.get(&self.fallback))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, code: &LanguageCode) -> bool {
        self.languages.contains_key(code)
    }

    /// Known codes in sorted order (drives the language bar)
    pub fn codes(&self) -> impl Iterator<Item = &LanguageCode> {
        self.languages.keys()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let mut languages = BTreeMap::new();
        languages.insert(
            LanguageCode::from("en"),
            DEFAULT_EN.iter().map(|s| s.to_string()).collect(),
        );
        languages.insert(
            LanguageCode::from("ge"),
            DEFAULT_GE.iter().map(|s| s.to_string()).collect(),
        );
        Self {
            languages,
            fallback: LanguageCode::from(FALLBACK_LANGUAGE),
        }
    }
}

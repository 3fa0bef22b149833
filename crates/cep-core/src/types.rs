//! Canonical CEP codes and the normalized address record they resolve to.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of digits in a canonical CEP.
pub const CEP_LEN: usize = 8;

/// Rejection raised when an input does not normalize to an 8-digit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("CEP must contain exactly 8 digits, found {digits}")]
pub struct InvalidCep {
    /// Number of digits left after stripping non-digit characters.
    pub digits: usize,
}

/// A canonical CEP: exactly 8 decimal digits, leading zeros preserved.
///
/// Produced by [`Cep::parse`] from arbitrary user input and immutable
/// afterwards. Used as the cache key (prefixed) and as the path parameter of
/// the upstream call. Serializes as a plain digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Normalizes raw input into a canonical code.
    ///
    /// Every character outside `0-9` is stripped; the result is accepted iff
    /// exactly 8 digits remain. Pure, no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCep`] when the digit-stripped input is not exactly
    /// 8 characters long (empty input and punctuation-only input included).
    pub fn parse(raw: &str) -> Result<Self, InvalidCep> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == CEP_LEN {
            Ok(Self(digits))
        } else {
            Err(InvalidCep { digits: digits.len() })
        }
    }

    /// Returns the 8-digit code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the cache key for this code (`"cep_"` prefix).
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("cep_{}", self.0)
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Cep {
    type Error = InvalidCep;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cep> for String {
    fn from(cep: Cep) -> Self {
        cep.0
    }
}

/// Provenance tag: where a record was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Served from the cache store.
    Cache,
    /// Freshly fetched from the ViaCEP API.
    Viacep,
}

/// Normalized address data for one CEP.
///
/// Constructed once per successful fetch, either by the response mapper or by
/// deserializing a cache entry. Never mutated afterwards except for the
/// [`Source`] tag, which is rewritten to [`Source::Cache`] when the record is
/// read back from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// The canonical code that was looked up.
    pub cep: Cep,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Provenance of this record.
    pub service: Source,
}

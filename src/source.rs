//! Registry of supported search providers.
//!
//! - `arxiv` - preprints from arxiv.org
//! - `base` - scientific papers from base-search.net

use crate::error::{PubcountError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported publication search provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Arxiv,
    Base,
}

const SOURCES: &[Source] = &[Source::Arxiv, Source::Base];

/// All providers this crate knows how to query.
pub fn list_sources() -> &'static [Source] {
    SOURCES
}

/// Case-insensitive membership test against [`list_sources`].
///
/// # Errors
///
/// Returns `InvalidInput` for an empty name. Unknown names are `Ok(false)`.
pub fn is_allowed_source(name: &str) -> Result<bool> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PubcountError::InvalidInput(
            "source name must be given".to_string(),
        ));
    }
    Ok(SOURCES
        .iter()
        .any(|s| s.as_str().eq_ignore_ascii_case(name)))
}

impl Source {
    /// Canonical lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Arxiv => "arxiv",
            Source::Base => "base",
        }
    }

    /// Parse a provider name, ignoring case
    pub fn from_name(name: &str) -> Result<Self> {
        if !is_allowed_source(name)? {
            return Err(PubcountError::InvalidInput(format!(
                "source '{}' must be one of: {}",
                name,
                SOURCES
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        let name = name.trim();
        SOURCES
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| PubcountError::InvalidInput(format!("unknown source '{}'", name)))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = PubcountError;

    fn from_str(s: &str) -> Result<Self> {
        Source::from_name(s)
    }
}

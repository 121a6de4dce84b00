//! Lookup tables used by the cleaning stage.
//!
//! - [`MakeAliases`] folds the many spellings of a vehicle make into one
//!   canonical value. Loaded from `references/make.csv`.
//! - [`ViolationTable`] maps a violation code to its canonical description.
//!   Built in, optionally extended from a `code,description` CSV.

use crate::violation_codes::BUILTIN_VIOLATIONS;
use citemake_core::error::{CitemakeError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Alias → canonical make.
#[derive(Debug, Clone, Default)]
pub struct MakeAliases {
    aliases: HashMap<String, String>,
}

impl MakeAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the alias table from a CSV with `make` and `alias` columns.
    ///
    /// `alias` holds a comma-separated list of spellings, so the field is
    /// normally quoted: `TOYT,"TOYO,TOYOTA"`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CitemakeError::not_found(format!(
                "make alias table {}",
                path.display()
            )));
        }
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let headers = reader.headers()?.clone();
        let make_idx = column_index(&headers, "make", path)?;
        let alias_idx = column_index(&headers, "alias", path)?;

        let mut table = Self::new();
        for record in reader.records() {
            let record = record?;
            let make = record.get(make_idx).unwrap_or_default();
            let aliases = record.get(alias_idx).unwrap_or_default();
            if make.is_empty() {
                continue;
            }
            for alias in aliases.split(',') {
                table.insert(alias, make)?;
            }
        }
        tracing::debug!(path = %path.display(), aliases = table.len(), "Loaded make aliases");
        Ok(table)
    }

    /// Build a table from `(canonical, [aliases])` pairs.
    pub fn from_pairs<'a, I, A>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, A)>,
        A: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        for (make, aliases) in pairs {
            for alias in aliases {
                table.insert(alias, make)?;
            }
        }
        Ok(table)
    }

    fn insert(&mut self, alias: &str, make: &str) -> Result<()> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Ok(());
        }
        match self.aliases.get(alias) {
            Some(existing) if existing != make => Err(CitemakeError::invalid_input(format!(
                "alias {alias:?} maps to both {existing:?} and {make:?}"
            ))),
            _ => {
                self.aliases.insert(alias.to_string(), make.to_string());
                Ok(())
            }
        }
    }

    /// Canonical make for `value`, if `value` is a known alias.
    pub fn canonical(&self, value: &str) -> Option<&str> {
        self.aliases.get(value).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Violation code → canonical description.
#[derive(Debug, Clone, Default)]
pub struct ViolationTable {
    descriptions: HashMap<String, String>,
}

impl ViolationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table of LA violation codes.
    pub fn builtin() -> Self {
        let descriptions = BUILTIN_VIOLATIONS
            .iter()
            .map(|(code, desc)| (code.to_string(), desc.to_string()))
            .collect();
        Self { descriptions }
    }

    /// Layer `code,description` rows from a CSV over this table.
    ///
    /// Rows for codes already present replace the existing description.
    pub fn extend_from_csv(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Err(CitemakeError::not_found(format!(
                "violation table {}",
                path.display()
            )));
        }
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let headers = reader.headers()?.clone();
        let code_idx = column_index(&headers, "code", path)?;
        let desc_idx = column_index(&headers, "description", path)?;

        let mut added = 0;
        for record in reader.records() {
            let record = record?;
            let code = record.get(code_idx).unwrap_or_default();
            let desc = record.get(desc_idx).unwrap_or_default();
            if code.is_empty() || desc.is_empty() {
                continue;
            }
            self.descriptions.insert(code.to_string(), desc.to_string());
            added += 1;
        }
        Ok(added)
    }

    pub fn insert(&mut self, code: impl Into<String>, description: impl Into<String>) {
        self.descriptions.insert(code.into(), description.into());
    }

    pub fn description(&self, code: &str) -> Option<&str> {
        self.descriptions.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

pub(crate) fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        CitemakeError::dataset(format!(
            "{} is missing required column {name:?}",
            path.display()
        ))
    })
}

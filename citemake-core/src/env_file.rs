//! `.env` file discovery and key updates.
//!
//! The pipeline remembers the last downloaded raw file by writing
//! `RAW_DATA_FILEPATH` into the project's `.env`, so later `sample` runs can
//! find it without re-downloading.

use crate::error::{CitemakeError, Result};
use crate::persistence::atomic_write;
use std::path::{Path, PathBuf};

/// Key under which the path of the most recent raw download is stored.
pub const RAW_DATA_FILEPATH: &str = "RAW_DATA_FILEPATH";

/// Walk from `start` up through its ancestors and return the first `.env` found.
pub fn find_env_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

/// Read a single key from a `.env` file.
///
/// Returns `Ok(None)` when the file or the key is absent.
pub fn get_key(path: &Path, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| CitemakeError::config(format!("{}: {e}", path.display())))?;
    for item in iter {
        let (k, v) = item.map_err(|e| CitemakeError::config(format!("{}: {e}", path.display())))?;
        if k == key {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

/// Set `key` to `value` in a `.env` file, creating the file if needed.
///
/// An existing assignment of the same key is replaced in place; every other
/// line (comments, blank lines, other keys) is preserved verbatim.
pub fn set_key(path: &Path, key: &str, value: &str) -> Result<()> {
    if key.is_empty() || key.contains(['=', ' ', '\n']) {
        return Err(CitemakeError::invalid_input(format!(
            "invalid .env key: {key:?}"
        )));
    }

    let existing = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let assignment = format!("{key}={}", quote(value));
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if !replaced && line_key(line) == Some(key) {
                replaced = true;
                assignment.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(assignment);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    atomic_write(path, out.as_bytes())?;
    tracing::debug!(path = %path.display(), key, "Updated .env key");
    Ok(())
}

/// Key of an assignment line, `None` for comments and blank lines.
fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, _) = trimmed.split_once('=')?;
    Some(key.trim())
}

/// Quote `value` so `dotenvy` reads it back unchanged.
///
/// Single quotes are literal to dotenvy and cannot contain `'`, so such
/// values fall back to double quotes, where `\`, `"` and `$` are escaped.
fn quote(value: &str) -> String {
    if !value.contains(['\'', '\n']) {
        return format!("'{value}'");
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

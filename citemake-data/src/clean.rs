//! Cleaning of a sampled dataset.
//!
//! The city's export has three recurring defects this stage repairs:
//! vehicle makes spelled many ways, violation codes and descriptions that
//! landed in each other's columns, and many spellings of the same
//! description. The output keeps `make` and a canonical
//! `violation_description`, numbered by a fresh `index` column.

use crate::aliases::{MakeAliases, ViolationTable, column_index};
use citemake_core::error::{CitemakeError, Result};
use citemake_core::persistence::{commit_partial, partial_path};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Violation code the city uses when the real code was entered as the description.
pub const PLACEHOLDER_CODE: &str = "000";

/// Header of the processed dataset.
pub const PROCESSED_COLUMNS: [&str; 3] = ["index", "make", "violation_description"];

/// One sampled citation. Empty CSV fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationRow {
    pub make: Option<String>,
    pub violation_code: Option<String>,
    pub violation_description: Option<String>,
}

impl CitationRow {
    pub fn new(make: &str, code: &str, description: &str) -> Self {
        Self {
            make: non_empty(make),
            violation_code: non_empty(code),
            violation_description: non_empty(description),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// What the cleaning stage changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub makes_normalized: usize,
    pub codes_swapped: usize,
    pub rows_dropped: usize,
    pub descriptions_canonicalized: usize,
    pub rows_out: usize,
}

/// Result of a cleaning run.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub path: PathBuf,
    pub report: CleanReport,
}

/// Output name for a cleaned file: `_raw` becomes `_processed` in the stem.
pub fn processed_file_name(stem: &str) -> String {
    format!("{}.csv", stem.replace("_raw", "_processed"))
}

/// Apply the cleaning rules to `rows` in place.
pub fn clean_rows(
    rows: &mut Vec<CitationRow>,
    makes: &MakeAliases,
    violations: &ViolationTable,
) -> CleanReport {
    let mut report = CleanReport {
        rows_in: rows.len(),
        ..CleanReport::default()
    };

    for row in rows.iter_mut() {
        if let Some(canonical) = row.make.as_deref().and_then(|m| makes.canonical(m)) {
            if row.make.as_deref() != Some(canonical) {
                row.make = Some(canonical.to_string());
                report.makes_normalized += 1;
            }
        }
    }

    // Values seen both as a code and as a description mean the description
    // column holds a code on those rows.
    let codes: HashSet<&str> = rows
        .iter()
        .filter_map(|r| r.violation_code.as_deref())
        .collect();
    let swapped_values: HashSet<String> = rows
        .iter()
        .filter_map(|r| r.violation_description.as_deref())
        .filter(|d| codes.contains(d))
        .map(str::to_string)
        .collect();

    for row in rows.iter_mut() {
        let desc_is_code = row
            .violation_description
            .as_deref()
            .is_some_and(|d| swapped_values.contains(d));
        let placeholder = row.violation_code.as_deref() == Some(PLACEHOLDER_CODE);
        if desc_is_code || placeholder {
            row.violation_code = row.violation_description.take();
            report.codes_swapped += 1;
        }
    }

    let before = rows.len();
    rows.retain(|r| r.violation_code.is_some() || r.violation_description.is_some());
    report.rows_dropped = before - rows.len();

    for row in rows.iter_mut() {
        let Some(canonical) = row.violation_code.as_deref().and_then(|c| violations.description(c))
        else {
            continue;
        };
        if row.violation_description.as_deref() != Some(canonical) {
            row.violation_description = Some(canonical.to_string());
            report.descriptions_canonicalized += 1;
        }
    }

    report.rows_out = rows.len();
    report
}

/// Read a sampled CSV (`make,violation_code,violation_description`).
pub fn read_sample(path: &Path) -> Result<Vec<CitationRow>> {
    if !path.is_file() {
        return Err(CitemakeError::not_found(format!(
            "sampled dataset {}",
            path.display()
        )));
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let make_idx = column_index(&headers, "make", path)?;
    let code_idx = column_index(&headers, "violation_code", path)?;
    let desc_idx = column_index(&headers, "violation_description", path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(CitationRow::new(
            record.get(make_idx).unwrap_or_default(),
            record.get(code_idx).unwrap_or_default(),
            record.get(desc_idx).unwrap_or_default(),
        ));
    }
    Ok(rows)
}

/// Write cleaned rows as `index,make,violation_description`, every field quoted.
pub fn write_processed(path: &Path, rows: &[CitationRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)?;
    writer.write_record(PROCESSED_COLUMNS)?;
    for (index, row) in rows.iter().enumerate() {
        let index = index.to_string();
        writer.write_record([
            index.as_str(),
            row.make.as_deref().unwrap_or_default(),
            row.violation_description.as_deref().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Clean the sampled file `target` into `output_dir`.
pub fn clean(
    target: &Path,
    output_dir: &Path,
    makes: &MakeAliases,
    violations: &ViolationTable,
) -> Result<CleanOutcome> {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| CitemakeError::invalid_input(format!("not a file: {}", target.display())))?;

    tracing::info!(input = %target.display(), "Cleaning dataset");
    let mut rows = read_sample(target)?;
    let report = clean_rows(&mut rows, makes, violations);

    std::fs::create_dir_all(output_dir)?;
    let output = output_dir.join(processed_file_name(&stem));
    if output == target {
        return Err(CitemakeError::invalid_input(format!(
            "cleaning {} would overwrite its input",
            target.display()
        )));
    }
    let tmp = partial_path(&output);
    if let Err(e) = write_processed(&tmp, &rows) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    commit_partial(&tmp, &output)?;

    tracing::info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        swapped = report.codes_swapped,
        dropped = report.rows_dropped,
        path = %output.display(),
        "Finished cleaning"
    );
    Ok(CleanOutcome {
        path: output,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn makes() -> MakeAliases {
        MakeAliases::from_pairs([("TOYT", vec!["TOYO", "TOYOTA"]), ("HOND", vec!["HONDA"])])
            .unwrap()
    }

    fn violations() -> ViolationTable {
        let mut table = ViolationTable::empty();
        table.insert("80.69BS", "NO PARK/STREET CLEAN");
        table.insert("80.56E4+", "RED ZONE");
        table
    }

    #[test]
    fn test_make_aliases_are_folded() {
        let mut rows = vec![
            CitationRow::new("TOYOTA", "80.69BS", "x"),
            CitationRow::new("TOYT", "80.69BS", "x"),
            CitationRow::new("HONDA", "80.69BS", "x"),
            CitationRow::new("FORD", "80.69BS", "x"),
        ];
        let report = clean_rows(&mut rows, &makes(), &violations());
        let out: Vec<_> = rows.iter().map(|r| r.make.as_deref().unwrap()).collect();
        assert_eq!(out, vec!["TOYT", "TOYT", "HOND", "FORD"]);
        assert_eq!(report.makes_normalized, 2);
    }

    #[test]
    fn test_description_holding_code_is_swapped() {
        let mut rows = vec![
            // "80.56E4+" appears as a code elsewhere, so this description is a code.
            CitationRow::new("TOYT", "21", "80.56E4+"),
            CitationRow::new("HOND", "80.56E4+", "RED ZONE"),
        ];
        let report = clean_rows(&mut rows, &makes(), &violations());

        assert_eq!(report.codes_swapped, 1);
        assert_eq!(rows[0].violation_code.as_deref(), Some("80.56E4+"));
        assert_eq!(rows[0].violation_description.as_deref(), Some("RED ZONE"));
        assert_eq!(report.descriptions_canonicalized, 1);
    }

    #[test]
    fn test_placeholder_code_is_swapped() {
        let mut rows = vec![CitationRow::new("TOYT", "000", "80.69BS")];
        let report = clean_rows(&mut rows, &makes(), &violations());
        assert_eq!(report.codes_swapped, 1);
        assert_eq!(
            rows[0],
            CitationRow::new("TOYT", "80.69BS", "NO PARK/STREET CLEAN")
        );
    }

    #[test]
    fn test_placeholder_without_description_is_dropped() {
        let mut rows = vec![
            CitationRow::new("TOYT", "000", ""),
            CitationRow::new("HOND", "", ""),
            CitationRow::new("FORD", "", "METER EXP."),
        ];
        let report = clean_rows(&mut rows, &makes(), &violations());
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(report.rows_out, 1);
        assert_eq!(rows[0].make.as_deref(), Some("FORD"));
    }

    #[test]
    fn test_unknown_code_keeps_description() {
        let mut rows = vec![CitationRow::new("TOYT", "ZZZ", "SOMETHING")];
        let report = clean_rows(&mut rows, &makes(), &violations());
        assert_eq!(report.descriptions_canonicalized, 0);
        assert_eq!(rows[0].violation_description.as_deref(), Some("SOMETHING"));
    }

    #[test]
    fn test_processed_file_name() {
        assert_eq!(
            processed_file_name("2024-01-01_raw_01samp"),
            "2024-01-01_processed_01samp.csv"
        );
        assert_eq!(processed_file_name("export"), "export.csv");
    }

    #[test]
    fn test_clean_file_end_to_end() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("2024-01-01_raw_10samp.csv");
        std::fs::write(
            &input,
            "make,violation_code,violation_description\n\
             TOYOTA,80.69BS,NO PARK/STRT CLEAN\n\
             HOND,000,\n\
             ,000,80.56E4+\n",
        )
        .unwrap();
        let out_dir = dir.path().join("processed");

        let outcome = clean(&input, &out_dir, &makes(), &violations()).unwrap();
        assert_eq!(outcome.path, out_dir.join("2024-01-01_processed_10samp.csv"));
        assert_eq!(outcome.report.rows_in, 3);
        assert_eq!(outcome.report.rows_out, 2);

        let content = std::fs::read_to_string(&outcome.path).unwrap();
        assert_eq!(
            content,
            "\"index\",\"make\",\"violation_description\"\n\
             \"0\",\"TOYT\",\"NO PARK/STREET CLEAN\"\n\
             \"1\",\"\",\"RED ZONE\"\n"
        );
    }

    #[test]
    fn test_clean_requires_sample_columns() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad_raw.csv");
        std::fs::write(&input, "Make,Violation code\nTOYT,1\n").unwrap();
        let err = clean(&input, dir.path(), &makes(), &violations()).unwrap_err();
        assert!(matches!(err, CitemakeError::Dataset(_)));
    }
}

//! Random row sampling of the raw export.
//!
//! Each data row is kept independently with probability `frac`, so the
//! sample size is only approximately `frac * rows`. Rows are streamed; the
//! raw export never has to fit in memory.

use crate::aliases::column_index;
use citemake_core::error::{CitemakeError, Result};
use citemake_core::persistence::{commit_partial, partial_path};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Raw export columns the sample keeps, paired with their sampled names.
pub const SAMPLE_COLUMNS: [(&str, &str); 3] = [
    ("Make", "make"),
    ("Violation code", "violation_code"),
    ("Violation Description", "violation_description"),
];

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    pub frac: f64,
    pub seed: Option<u64>,
}

impl SampleOptions {
    pub fn new(frac: f64) -> Self {
        Self { frac, seed: None }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Result of a sampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_kept: usize,
}

/// Reject fractions outside `(0, 1]` (and NaN).
pub fn validate_frac(frac: f64) -> Result<()> {
    if frac > 0.0 && frac <= 1.0 {
        Ok(())
    } else {
        Err(CitemakeError::invalid_input(format!(
            "sample fraction must be in (0, 1], got {frac}"
        )))
    }
}

/// Digits of `frac` with the decimal point removed: `0.1 -> "01"`, `0.25 -> "025"`.
///
/// Very small fractions keep the scientific form with a two-digit
/// exponent: `0.00001 -> "1e-05"`.
pub fn frac_digits(frac: f64) -> String {
    float_repr(frac).replace('.', "")
}

/// Shortest round-trip form of `frac`, exponent padded to two digits.
fn float_repr(frac: f64) -> String {
    let repr = format!("{frac:?}");
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// `{stem}_{digits}samp.csv`
pub fn sample_file_name(stem: &str, frac: f64) -> String {
    format!("{stem}_{}samp.csv", frac_digits(frac))
}

/// Sample `target` into `output_dir`.
pub fn create_sample(
    target: &Path,
    output_dir: &Path,
    options: &SampleOptions,
) -> Result<SampleOutcome> {
    validate_frac(options.frac)?;
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| CitemakeError::invalid_input(format!("not a file: {}", target.display())))?;
    if !target.is_file() {
        return Err(CitemakeError::not_found(format!(
            "raw dataset {}",
            target.display()
        )));
    }

    std::fs::create_dir_all(output_dir)?;
    let output = output_dir.join(sample_file_name(&stem, options.frac));
    let tmp = partial_path(&output);

    tracing::info!(
        input = %target.display(),
        frac = options.frac,
        seed = ?options.seed,
        "Creating sample"
    );

    let result = write_sample(target, &tmp, options);
    let (rows_read, rows_kept) = match result {
        Ok(counts) => counts,
        Err(e) => {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
    };
    commit_partial(&tmp, &output)?;

    tracing::info!(rows_read, rows_kept, path = %output.display(), "Sample complete");
    Ok(SampleOutcome {
        path: output,
        rows_read,
        rows_kept,
    })
}

fn write_sample(target: &Path, dest: &Path, options: &SampleOptions) -> Result<(usize, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(target)?;
    let headers = reader.headers()?.clone();
    let indices = SAMPLE_COLUMNS
        .iter()
        .map(|(raw, _)| column_index(&headers, raw, target))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = csv::Writer::from_path(dest)?;
    writer.write_record(SAMPLE_COLUMNS.iter().map(|(_, renamed)| *renamed))?;

    let mut rng = options.rng();
    let mut record = csv::StringRecord::new();
    let mut rows_read = 0;
    let mut rows_kept = 0;
    while reader.read_record(&mut record)? {
        rows_read += 1;
        if !rng.gen_bool(options.frac) {
            continue;
        }
        writer.write_record(indices.iter().map(|&i| record.get(i).unwrap_or_default()))?;
        rows_kept += 1;
    }
    writer.flush()?;
    Ok((rows_read, rows_kept))
}

//! # citemake-data
//!
//! The parking-citation dataset pipeline:
//!
//! 1. **download** the raw export from the open-data portal ([`source`])
//! 2. **sample** a random fraction of its rows ([`sample`])
//! 3. **clean** the sample into the processed dataset ([`clean`], [`aliases`])
//!
//! Every produced file is recorded in a JSON manifest with its hash and
//! lineage ([`manifest`], [`lineage`]). [`pipeline::Pipeline`] ties the
//! steps to a project directory and its configuration.

pub mod aliases;
pub mod clean;
pub mod lineage;
pub mod manifest;
pub mod pipeline;
pub mod sample;
pub mod source;
mod violation_codes;

pub use aliases::{MakeAliases, ViolationTable};
pub use clean::{CitationRow, CleanOutcome, CleanReport, clean, clean_rows};
pub use lineage::{DataLineage, PipelineStep, StepRecord};
pub use manifest::{DatasetEntry, DatasetRegistry, Stage, StageReport};
pub use pipeline::{DataRun, Pipeline, SampleRun};
pub use sample::{SampleOptions, SampleOutcome, create_sample};
pub use source::{DownloadOutcome, FileSource, HttpSource, RawSource, download_raw};

//! # citemake-core
//!
//! Shared foundation for the citemake workspace: layered configuration,
//! the common error type, atomic file persistence, `.env` handling and the
//! project data layout.

pub mod config;
pub mod env_file;
pub mod error;
pub mod layout;
pub mod persistence;

pub use config::{CitemakeConfig, ConfigOverrides, load_config};
pub use error::{CitemakeError, Result};
pub use layout::{LayoutReport, ensure_layout};

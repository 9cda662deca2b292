//! CLI command implementations

pub mod cleanup;
pub mod config;
pub mod run;

use anyhow::{bail, Result};
use catsync_core::config::ValidationError;

use crate::output::OutputFormatter;

/// Prints every validation problem and fails when there is at least one
pub(crate) fn refuse_invalid(formatter: &dyn OutputFormatter, errors: &[ValidationError]) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    for e in errors {
        formatter.error(&format!("{}: {}", e.field, e.message));
    }
    bail!(
        "Configuration has {} problem(s); run `catsync config validate` for details",
        errors.len()
    )
}

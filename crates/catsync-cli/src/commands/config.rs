//! Config command - inspect and validate catsync configuration
//!
//! Provides the `catsync config` CLI command which:
//! 1. Shows the effective configuration (file plus environment) with secrets masked
//! 2. Validates it and reports every problem

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use catsync_core::config::Config;

use crate::output::{get_formatter, OutputFormat};

const MASK: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(config, path, format),
            ConfigCommand::Validate => execute_validate(config, path, format),
        }
    }
}

fn execute_show(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let masked = masked(config);

    if format == OutputFormat::Json {
        let json = serde_json::to_value(&masked).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    formatter.success(&format!("Configuration ({})", path.display()));
    formatter.info("");
    let yaml = serde_yaml::to_string(&masked).context("Failed to serialize configuration to YAML")?;
    for line in yaml.lines() {
        formatter.info(line);
    }
    Ok(())
}

fn execute_validate(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let errors = config.validate();

    if format == OutputFormat::Json {
        let problems: Vec<serde_json::Value> = errors
            .iter()
            .map(|e| serde_json::json!({"field": e.field, "message": e.message}))
            .collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": path.display().to_string(),
            "errors": problems,
        }));
    } else if errors.is_empty() {
        formatter.success(&format!("Configuration is valid ({})", path.display()));
    } else {
        formatter.error(&format!("Configuration has {} problem(s)", errors.len()));
        for e in &errors {
            formatter.info(&format!("{}: {}", e.field, e.message));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Invalid configuration")
    }
}

/// A copy of `config` with credentials replaced by a mask
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    for secret in [
        &mut config.commerce.api_key,
        &mut config.storage.access_key_id,
        &mut config.storage.secret_access_key,
    ] {
        if !secret.is_empty() {
            *secret = MASK.to_string();
        }
    }
    config
}

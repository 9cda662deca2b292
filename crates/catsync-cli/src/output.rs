use catsync_core::domain::{BatchReport, RowEntry, WriteBackStatus};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output with status marks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {message}");
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {message}");
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {message}");
    }
    fn info(&self, message: &str) {
        println!("  {message}");
    }
    fn print_json(&self, _value: &serde_json::Value) {}
}

/// One JSON document per message on stdout, errors on stderr
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!("{}", serde_json::json!({"success": true, "message": message}));
    }
    fn error(&self, message: &str) {
        eprintln!("{}", serde_json::json!({"success": false, "error": message}));
    }
    fn warn(&self, message: &str) {
        eprintln!("{}", serde_json::json!({"level": "warning", "message": message}));
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Prints a batch report in the selected format
pub fn print_report(formatter: &dyn OutputFormatter, format: OutputFormat, report: &BatchReport) {
    if format == OutputFormat::Json {
        formatter.print_json(&serde_json::to_value(report).unwrap_or_default());
        return;
    }

    let verb = if report.dry_run { "would update" } else { "updated" };
    let changed = if report.dry_run {
        report
            .entries
            .iter()
            .filter(|e| e.result.as_ref().is_ok_and(|o| !o.patch.is_empty()))
            .count()
    } else {
        report.updated()
    };

    formatter.success(&format!(
        "Sync {} finished: {} rows, {changed} {verb}, {} failed",
        report.run_id,
        report.entries.len(),
        report.failed()
    ));
    formatter.info(&format!(
        "Rows read: {} ({} dropped without SKU or title)",
        report.rows_read, report.rows_dropped
    ));
    formatter.info(&format!("Images uploaded: {}", report.images_uploaded()));
    formatter.info(&format!(
        "Inventory: {} applied, {} skipped",
        report.inventory_applied(),
        report.inventory_skipped()
    ));
    formatter.info(&format!("Warnings: {}", report.warnings()));

    for entry in &report.entries {
        print_entry(formatter, entry);
    }

    match &report.write_back {
        WriteBackStatus::Skipped => formatter.info("Sheet write-back: skipped"),
        WriteBackStatus::Written { cells } => {
            formatter.info(&format!("Sheet write-back: {cells} cells"))
        }
        WriteBackStatus::Failed {
            error,
            uncleared_restock_skus,
        } => {
            formatter.error(&format!("Sheet write-back failed: {error}"));
            if !uncleared_restock_skus.is_empty() {
                formatter.warn(&format!(
                    "Restock applied but not cleared in the sheet, zero these by hand: {}",
                    uncleared_restock_skus.join(", ")
                ));
            }
        }
    }
}

fn print_entry(formatter: &dyn OutputFormatter, entry: &RowEntry) {
    match &entry.result {
        Err(e) => formatter.warn(&format!("Row {} ({}): {e}", entry.row, entry.sku)),
        Ok(outcome) => {
            if let Some(error) = &outcome.inventory_error {
                formatter.warn(&format!(
                    "Row {} ({}): inventory failed: {error}",
                    entry.row, entry.sku
                ));
            }
            if !outcome.missing_mandatory.is_empty() {
                let fields: Vec<String> = outcome
                    .missing_mandatory
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                formatter.info(&format!(
                    "Row {} ({}): empty mandatory fields kept: {}",
                    entry.row,
                    entry.sku,
                    fields.join(", ")
                ));
            }
        }
    }
}

//! Spreadsheet port (driven/secondary port)

use serde::{Deserialize, Serialize};

/// A single-cell write in A1 notation, e.g. `Products!G7`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWrite {
    pub range: String,
    pub value: String,
}

impl CellWrite {
    pub fn new(range: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            value: value.into(),
        }
    }
}

/// Formats a tab name for A1 notation, quoting it when needed
///
/// Names made only of ASCII letters, digits and underscores are used as is;
/// anything else is wrapped in single quotes with embedded quotes doubled.
pub fn quote_tab(tab: &str) -> String {
    if !tab.is_empty() && tab.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    }
}

/// Builds a single-cell A1 reference such as `Products!G7`
pub fn cell_ref(tab: &str, column: char, row: u32) -> String {
    format!("{}!{}{}", quote_tab(tab), column, row)
}

/// Port trait for the spreadsheet that is the source of truth
#[async_trait::async_trait]
pub trait ISheetSource: Send + Sync {
    /// Reads a rectangular range as rows of formatted cell strings
    ///
    /// Trailing empty cells of a row may be omitted by the service, so rows
    /// can be shorter than the requested range.
    async fn read_range(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>>;

    /// Submits all cell writes in a single request
    async fn batch_write(&self, writes: &[CellWrite]) -> anyhow::Result<()>;
}

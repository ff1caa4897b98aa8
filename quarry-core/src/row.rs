use std::sync::Arc;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;

/// A result row with its corresponding column labels. Values are the text
/// form produced by the backend; an absent value is SQL NULL.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Box<[Option<String>]>,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Box<[Option<String>]>) -> Self {
        Self { labels, values }
    }

    /// Value of the named column; `None` when the column is missing or NULL.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .position(|label| label == name)
            .and_then(|i| self.values[i].as_deref())
    }
}

/// Outcome of one executed statement batch: the total affected or matched
/// row count, and any returned rows.
#[derive(Default, Debug, Clone)]
pub struct QueryOutcome {
    pub row_count: u64,
    pub rows: Vec<RowLabeled>,
}

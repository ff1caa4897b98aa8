use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Like,
}

/// One filter condition: `column <op> value`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub op: Comparison,
    pub value: Value,
}

#[derive(Default, Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of rows to return. A limit of exactly one collapses
    /// the result to a bare single value.
    pub limit: Option<u32>,
    /// Resolve with the matching row count instead of the rows.
    pub count: bool,
}

/// Caller supplied descriptor of one CRUD operation: the target table,
/// filter conditions and options. The adapter borrows it for a single call
/// and never mutates the caller visible fields.
#[derive(Debug, Clone)]
pub struct Query {
    pub table: String,
    pub conditions: Vec<Condition>,
    pub opts: QueryOptions,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
            opts: QueryOptions::default(),
        }
    }

    pub fn condition(mut self, column: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.opts.limit = Some(limit);
        self
    }

    pub fn count(mut self) -> Self {
        self.opts.count = true;
        self
    }
}

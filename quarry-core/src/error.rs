use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// A usable client could not be obtained, either from the pool or from the
/// adapter's persistent connection.
#[derive(Debug, Error)]
#[error("could not acquire a database connection: {0}")]
pub struct ConnectionError(#[source] pub Source);

impl ConnectionError {
    pub fn new(source: impl Into<Source>) -> Self {
        Self(source.into())
    }
}

/// The statement builder was handed inputs it cannot turn into SQL.
/// Never retried.
#[derive(Debug, Error)]
#[error("could not generate the statement: {0}")]
pub struct StatementError(pub String);

/// The backend rejected or failed the dispatched statement. The underlying
/// cause is preserved so callers can branch on backend specific codes.
#[derive(Debug, Error)]
#[error("the statement failed: {0}")]
pub struct ExecutionError(#[source] pub Source);

impl ExecutionError {
    pub fn new(source: impl Into<Source>) -> Self {
        Self(source.into())
    }
}

/// A named filter matched none of the built-ins and no context capability.
#[derive(Debug, Error)]
#[error("unknown filter: `{0}`")]
pub struct UnknownFilterError(pub String);

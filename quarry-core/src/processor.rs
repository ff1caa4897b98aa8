use crate::{Entity, ExecutionError, Query, QueryOutcome, Result, RowLabeled};
use tokio::sync::oneshot;

/// Rows shaped by a completed load: the plain collection, or the collapsed
/// single value when the query was limited to exactly one row.
#[derive(Debug)]
pub enum Fetched {
    Rows(Vec<RowLabeled>),
    One(Option<RowLabeled>),
}

/// Feeding side of the row processing hookup, handed to the executing task.
pub struct RowSink {
    tx: oneshot::Sender<Result<QueryOutcome>>,
}

impl RowSink {
    /// Consume the outcome of the in-flight execution.
    pub fn process(self, outcome: Result<QueryOutcome>) {
        // The caller may have dropped the handle without completing it.
        let _ = self.tx.send(outcome);
    }
}

/// Handle returned to the caller before any data has arrived. Completing it
/// waits for the execution task and shapes the rows.
#[derive(Debug)]
pub struct RowProcessor {
    collapse: bool,
    rx: oneshot::Receiver<Result<QueryOutcome>>,
}

impl RowProcessor {
    /// Build the hookup for one query descriptor.
    pub fn channel(query: &Query) -> (RowSink, RowProcessor) {
        let (tx, rx) = oneshot::channel();
        (
            RowSink { tx },
            RowProcessor {
                collapse: query.opts.limit == Some(1),
                rx,
            },
        )
    }

    pub async fn complete(self) -> Result<Fetched> {
        let RowProcessor { collapse, rx } = self;
        let outcome = rx
            .await
            .map_err(|_| ExecutionError::new("the execution task went away before completing"))??;
        Ok(if collapse {
            Fetched::One(outcome.rows.into_iter().next())
        } else {
            Fetched::Rows(outcome.rows)
        })
    }

    /// Complete and shape every row into an entity.
    pub async fn entities<E: Entity>(self) -> Result<Vec<E>> {
        match self.complete().await? {
            Fetched::Rows(rows) => rows.iter().map(E::from_row).collect(),
            Fetched::One(row) => row.iter().map(E::from_row).collect(),
        }
    }
}

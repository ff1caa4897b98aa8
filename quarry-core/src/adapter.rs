use crate::{
    Entity, ExecutionError, Fetched, Query, QueryOutcome, Result, RowLabeled, RowProcessor,
    StatementBuilder, StatementError, TableSpec, Value, apply_filters,
};
use log::{error, info};
use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::{spawn, task::yield_now};

/// Monotonic per-adapter statement sequence. Strictly increasing for the
/// life of the instance, never reused, never reset.
#[derive(Default, Debug)]
pub struct QueryCounter(AtomicU64);

impl QueryCounter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Next sequence number, starting from 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count of sequence numbers handed out so far.
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// An owned client acquisition. Dropping the lease performs whatever
/// check-in the acquisition strategy requires: a pooled lease returns its
/// connection to the pool exactly once, on every exit path; pinned and
/// persistent leases release nothing.
pub trait Lease: Send + Sync {
    /// Tag of the transaction the underlying client is pinned inside, if any.
    fn transaction_tag(&self) -> Option<&str> {
        None
    }
}

/// Result of a [`Adapter::load`]: a bare count, or the processing handle
/// the rows will arrive through.
#[derive(Debug)]
pub enum Loaded {
    Count(u64),
    Rows(RowProcessor),
}

/// A backend binding. The concrete type holds configuration and connection
/// state; the required methods provision clients and dispatch SQL text; the
/// provided methods implement the instrumented execution and CRUD surface
/// shared by every backend.
///
/// Adapters are cheap to clone: every clone shares the same pool, the same
/// persistent client and the same statement sequence.
pub trait Adapter: Clone + Send + Sync + Sized + 'static {
    /// Caller-pinnable client handle, forwarded untouched to [`Adapter::acquire`].
    type Pinned: Clone + Send + Sync + 'static;
    type Lease: Lease + 'static;

    fn name(&self) -> &'static str;
    fn builder(&self) -> &dyn StatementBuilder;
    /// The backend generates identifiers without an explicit value.
    fn autoincrement(&self) -> bool;
    /// Per-statement logging enabled.
    fn debug(&self) -> bool;
    fn counter(&self) -> &QueryCounter;

    /// Provision a client: the pinned one when supplied, a pool checkout
    /// when pooling is configured, the persistent client otherwise. May
    /// suspend arbitrarily long while a connection becomes available; fails
    /// with [`ConnectionError`](crate::ConnectionError).
    fn acquire(
        &self,
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<Self::Lease>> + Send;

    /// Run SQL text on the leased client and collect the raw outcome.
    fn dispatch(
        &self,
        lease: &Self::Lease,
        sql: &str,
    ) -> impl Future<Output = Result<QueryOutcome>> + Send;

    /// Instrumented execution on a fresh acquisition. The sequence number is
    /// assigned before the client is provisioned; a provisioning failure
    /// fails the call without performing any query.
    fn exec(
        &self,
        sql: &str,
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<QueryOutcome>> + Send {
        async move {
            let id = self.counter().next();
            let lease = self.acquire(pinned).await?;
            let outcome = run_instrumented(self, id, sql, &lease).await;
            drop(lease);
            outcome
        }
    }

    /// Instrumented execution on an already acquired lease. The lease is not
    /// released here; that belongs to the acquiring scope.
    fn exec_on(
        &self,
        sql: &str,
        lease: &Self::Lease,
    ) -> impl Future<Output = Result<QueryOutcome>> + Send {
        async move {
            let id = self.counter().next();
            run_instrumented(self, id, sql, lease).await
        }
    }

    /// Build and run the SELECT described by `query`.
    ///
    /// With the count option set, resolves with the bare matching row count.
    /// Otherwise the execution is scheduled on the runtime, yielding control
    /// at least once before dispatch, and the returned [`RowProcessor`] is
    /// usable immediately even though data arrives later.
    fn load(
        &self,
        query: &Query,
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<Loaded>> + Send {
        async move {
            let sql = self.builder().select(query)?;
            if query.opts.count {
                let outcome = self.exec(&sql, pinned).await?;
                return Ok(Loaded::Count(extract_count(&outcome)?));
            }
            let (sink, processor) = RowProcessor::channel(query);
            let lease = self.acquire(pinned).await?;
            let adapter = self.clone();
            spawn(async move {
                // Give the caller the chance to hold the processor before
                // anything arrives.
                yield_now().await;
                let outcome = adapter.exec_on(&sql, &lease).await;
                drop(lease);
                sink.process(outcome);
            });
            Ok(Loaded::Rows(processor))
        }
    }

    /// Fetch the first matching row.
    fn first(
        &self,
        query: &Query,
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<Option<RowLabeled>>> + Send {
        async move {
            let mut query = query.clone().limit(1);
            query.opts.count = false;
            match self.load(&query, pinned).await? {
                Loaded::Rows(processor) => match processor.complete().await? {
                    Fetched::One(row) => Ok(row),
                    Fetched::Rows(rows) => Ok(rows.into_iter().next()),
                },
                Loaded::Count(..) => unreachable!("count mode is disabled for first"),
            }
        }
    }

    /// Persist a batch of items of one entity type in a single execution.
    ///
    /// Every generated statement is rewritten to request the generated
    /// identifier back; on success the identifiers are written onto the
    /// items positionally and each item is marked persisted. On failure no
    /// item is touched. The batch is not transactionally safe: the backend
    /// may have applied earlier statements unless the pinned client is
    /// already inside an application level transaction.
    fn insert<E: Entity>(
        &self,
        items: &mut [E],
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            if items.is_empty() {
                return Ok(());
            }
            let autoincrement = self.autoincrement();
            let mut sql = String::with_capacity(items.len() * 128);
            for item in items.iter() {
                let row = filtered_row(item)?;
                let statement = self.builder().insert(item.table(), &row, autoincrement)?;
                sql.push_str(&returning_id(statement)?);
            }
            let outcome = self.exec(&sql, pinned).await?;
            if outcome.rows.len() < items.len() {
                return Err(ExecutionError::new(format!(
                    "the backend returned {} identifiers for {} inserted items",
                    outcome.rows.len(),
                    items.len()
                ))
                .into());
            }
            let ids = outcome
                .rows
                .iter()
                .take(items.len())
                .map(returned_id)
                .collect::<Result<Vec<_>>>()?;
            for (item, id) in items.iter_mut().zip(ids) {
                item.set_id(id);
                item.mark_persisted();
            }
            Ok(())
        }
    }

    /// Update the rows matched by `query` with the values of `data`.
    fn update<E: Entity + Sync>(
        &self,
        data: &E,
        query: &Query,
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let row = filtered_row(data)?;
            let sql = self.builder().update(&row, query)?;
            self.exec(&sql, pinned).await?;
            Ok(())
        }
    }

    /// Delete the rows matched by `query`. The removed row count is not
    /// reported.
    fn remove(
        &self,
        query: &Query,
        pinned: Option<Self::Pinned>,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let sql = self.builder().delete(query)?;
            self.exec(&sql, pinned).await?;
            Ok(())
        }
    }

    fn create_table(&self, tables: &[TableSpec]) -> impl Future<Output = Result<QueryOutcome>> + Send {
        async move {
            let sql = self.builder().create_table(tables)?;
            self.exec(&sql, None).await
        }
    }

    fn drop_table(&self, names: &[&str]) -> impl Future<Output = Result<QueryOutcome>> + Send {
        async move {
            let sql = self.builder().drop_table(names)?;
            self.exec(&sql, None).await
        }
    }
}

/// Shared instrumentation: debug-gated start and outcome lines around one
/// dispatch. Logging never alters the outcome delivered to the caller.
async fn run_instrumented<A: Adapter>(
    adapter: &A,
    id: u64,
    sql: &str,
    lease: &A::Lease,
) -> Result<QueryOutcome> {
    let tag = lease.transaction_tag().unwrap_or_default();
    if adapter.debug() {
        info!("{} > query #{} [{}]: {}", adapter.name(), id, tag, sql);
    }
    match adapter.dispatch(lease, sql).await {
        Ok(outcome) => {
            if adapter.debug() {
                info!(
                    "{} < ok #{} [{}]: {} rows",
                    adapter.name(),
                    id,
                    tag,
                    outcome.row_count
                );
            }
            Ok(outcome)
        }
        Err(e) => {
            if adapter.debug() {
                error!("{} < fail #{} [{}]: {:#}", adapter.name(), id, tag, e);
            }
            Err(e)
        }
    }
}

/// Run every value of the item through its column's filter chain, with the
/// item itself as the filter context.
fn filtered_row<E: Entity>(item: &E) -> Result<Vec<(String, Value)>> {
    item.row()
        .into_iter()
        .map(|(column, value)| {
            let value = apply_filters(&value, item.filters(&column), item)?;
            Ok((column, value))
        })
        .collect()
}

/// Rewrite the plain trailing terminator of an insert statement into an
/// identifier returning one. The builder guarantees the statement ends with
/// `;` and nothing after it.
fn returning_id(statement: String) -> Result<String> {
    let body = statement.strip_suffix(';').ok_or_else(|| {
        StatementError("the insert statement does not end with a plain terminator".into())
    })?;
    Ok(format!("{} RETURNING id;", body))
}

fn returned_id(row: &RowLabeled) -> Result<i64> {
    row.get("id")
        .ok_or_else(|| ExecutionError::new("the insert returned a row without an identifier"))?
        .parse()
        .map_err(|e| {
            ExecutionError::new(format!("could not read the returned identifier: {}", e)).into()
        })
}

fn extract_count(outcome: &QueryOutcome) -> Result<u64> {
    outcome
        .rows
        .first()
        .and_then(|row| row.get("count"))
        .ok_or_else(|| ExecutionError::new("the count query returned no count column"))?
        .parse()
        .map_err(|e| ExecutionError::new(format!("could not read the returned count: {}", e)).into())
}

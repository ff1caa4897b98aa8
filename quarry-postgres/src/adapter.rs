use crate::{PostgresConfig, PostgresStatementBuilder, util::outcome_from_messages};
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use quarry_core::{
    Adapter, ConnectionError, ExecutionError, Lease, QueryCounter, QueryOutcome, Result,
    StatementBuilder,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::spawn;
use tokio_postgres::{Client, NoTls};

type Manager = PostgresConnectionManager<NoTls>;

/// A client the caller pinned for a sequence of statements, typically one
/// opened inside an application level transaction. The adapter never
/// releases it.
#[derive(Clone)]
pub struct PinnedClient {
    client: Arc<Client>,
    transaction_tag: Option<String>,
}

impl PinnedClient {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            transaction_tag: None,
        }
    }

    /// Pin a client carrying the tag of the transaction it runs inside; the
    /// tag shows up in the statement log lines.
    pub fn with_transaction_tag(client: Client, tag: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            transaction_tag: Some(tag.into()),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// One provisioned client. The pooled variant checks its connection back in
/// when dropped.
pub enum PgLease {
    Pinned(PinnedClient),
    Pooled(bb8::PooledConnection<'static, Manager>),
    Persistent(Arc<Client>),
}

impl PgLease {
    pub(crate) fn client(&self) -> &Client {
        match self {
            PgLease::Pinned(pinned) => pinned.client(),
            PgLease::Pooled(conn) => &**conn,
            PgLease::Persistent(client) => client,
        }
    }
}

impl Lease for PgLease {
    fn transaction_tag(&self) -> Option<&str> {
        match self {
            PgLease::Pinned(pinned) => pinned.transaction_tag.as_deref(),
            _ => None,
        }
    }
}

struct Inner {
    config: PostgresConfig,
    builder: PostgresStatementBuilder,
    counter: QueryCounter,
    pool: Option<Pool<Manager>>,
    client: Mutex<Option<Arc<Client>>>,
}

/// Postgres binding of the execution core. Cheap to clone; every clone
/// shares the same pool, persistent client and statement sequence.
#[derive(Clone)]
pub struct PostgresAdapter {
    inner: Arc<Inner>,
}

impl PostgresAdapter {
    /// Establish the persistent client and, when pooling is enabled, the
    /// connection pool.
    pub async fn connect(config: PostgresConfig) -> Result<Self> {
        let pg = config.pg_config();
        let pool = if config.pool_size > 0 {
            let manager = PostgresConnectionManager::new(pg.clone(), NoTls);
            let pool = Pool::builder()
                .max_size(config.pool_size)
                .idle_timeout(Some(config.pool_idle_timeout))
                .build(manager)
                .await
                .map_err(ConnectionError::new)?;
            Some(pool)
        } else {
            None
        };
        let client = connect_client(&pg).await?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                builder: PostgresStatementBuilder::new(),
                counter: QueryCounter::new(),
                pool,
                client: Mutex::new(Some(Arc::new(client))),
            }),
        })
    }

    pub fn config(&self) -> &PostgresConfig {
        &self.inner.config
    }

    /// Tear down the persistent client. Unpooled, unpinned execution is
    /// unusable afterwards; pooled checkouts keep their own lifecycle.
    pub fn disconnect(&self) -> Result<()> {
        let client = self
            .inner
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match client {
            // Dropping the handle terminates the connection task.
            Some(..) => Ok(()),
            None => Err(ConnectionError::new("the adapter is already disconnected").into()),
        }
    }
}

impl Adapter for PostgresAdapter {
    type Pinned = PinnedClient;
    type Lease = PgLease;

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn builder(&self) -> &dyn StatementBuilder {
        &self.inner.builder
    }

    fn autoincrement(&self) -> bool {
        self.inner.config.autoincrement
    }

    fn debug(&self) -> bool {
        self.inner.config.debug
    }

    fn counter(&self) -> &QueryCounter {
        &self.inner.counter
    }

    async fn acquire(&self, pinned: Option<PinnedClient>) -> Result<PgLease> {
        if let Some(pinned) = pinned {
            return Ok(PgLease::Pinned(pinned));
        }
        if let Some(pool) = &self.inner.pool {
            let conn = pool.get_owned().await.map_err(ConnectionError::new)?;
            return Ok(PgLease::Pooled(conn));
        }
        let client = self
            .inner
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match client {
            Some(client) => Ok(PgLease::Persistent(client)),
            None => Err(ConnectionError::new("the adapter is disconnected").into()),
        }
    }

    async fn dispatch(&self, lease: &PgLease, sql: &str) -> Result<QueryOutcome> {
        let messages = lease
            .client()
            .simple_query(sql)
            .await
            .map_err(ExecutionError::new)?;
        Ok(outcome_from_messages(messages))
    }
}

async fn connect_client(config: &tokio_postgres::Config) -> Result<Client> {
    let (client, connection) = config.connect(NoTls).await.map_err(ConnectionError::new)?;
    spawn(async move {
        if let Err(e) = connection.await {
            if !e.is_closed() {
                log::error!("postgres connection error: {:#}", e);
            }
        }
    });
    Ok(client)
}

use std::{env, time::Duration};

/// Connection and behavior configuration for the postgres adapter.
///
/// Loaded once, at adapter construction; the execution core never reads the
/// process environment itself.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub host: String,
    pub port: u16,
    /// The backend generates identifiers; inserts leave the id column out.
    pub autoincrement: bool,
    /// Maximum pooled connections. 0 disables pooling: every unpinned
    /// execution then runs on the persistent client.
    pub pool_size: u32,
    /// How long an idle pooled connection is kept before it is closed.
    pub pool_idle_timeout: Duration,
    /// Emit per-statement log lines.
    pub debug: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: None,
            database: String::new(),
            host: "localhost".into(),
            port: 5432,
            autoincrement: false,
            pool_size: 20,
            pool_idle_timeout: Duration::from_secs(30),
            debug: false,
        }
    }
}

impl PostgresConfig {
    /// Defaults with user and database taken from the process user, the way
    /// the stock postgres tooling resolves them.
    pub fn from_env() -> Self {
        let user = env::var("USER").unwrap_or_default();
        Self {
            database: user.clone(),
            user,
            ..Self::default()
        }
    }

    pub(crate) fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .user(&self.user)
            .dbname(&self.database)
            .host(&self.host)
            .port(self.port);
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use quarry_postgres::PostgresConfig;
    use std::{env, time::Duration};

    #[test]
    fn fixed_defaults() {
        let config = PostgresConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.pool_size, 20);
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(30));
        assert!(!config.autoincrement);
        assert!(!config.debug);
        assert!(config.password.is_none());
    }

    #[test]
    fn environment_fallback_for_user_and_database() {
        unsafe {
            env::set_var("USER", "quarry_test");
        }
        let config = PostgresConfig::from_env();
        assert_eq!(config.user, "quarry_test");
        assert_eq!(config.database, "quarry_test");
        assert_eq!(config.port, 5432);
    }
}

//! Backend selection and connection settings shared by all commands

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use itemctl_server::db::{
    create_pool, HostedConfig, HostedItemStore, MemoryItemStore, PgItemStore, PoolConfig,
};
use itemctl_server::models::TableName;
use itemctl_server::ItemStore;

/// Which `ItemStore` implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Direct pooled SQL connection
    Postgres,
    /// Hosted PostgREST endpoint (SUPABASE_URL / SUPABASE_KEY)
    Hosted,
    /// In-process store, data is lost on exit
    Memory,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend
    #[arg(long, env = "ITEMS_BACKEND", value_enum, default_value = "postgres")]
    pub backend: Backend,

    /// Items table name
    #[arg(long, env = "ITEMS_TABLE", default_value = "items")]
    pub table: String,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "items")]
    pub db_name: String,

    /// Maximum pooled connections
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub db_pool_size: u32,

    /// Hosted project URL (required for --backend hosted)
    #[arg(long, env = "SUPABASE_URL")]
    pub hosted_url: Option<String>,

    /// Hosted API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub hosted_key: Option<String>,

    /// Per-request timeout for the hosted backend, in seconds
    #[arg(long, default_value_t = 10)]
    pub hosted_timeout_secs: u64,
}

impl StoreArgs {
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            max_connections: self.db_pool_size,
            ..Default::default()
        }
    }

    pub fn hosted_config(&self) -> Result<HostedConfig> {
        let Some(url) = self.hosted_url.as_deref().filter(|u| !u.is_empty()) else {
            bail!("SUPABASE_URL not set. Set via --hosted-url or SUPABASE_URL env");
        };

        Ok(HostedConfig {
            url: url.to_string(),
            api_key: self.hosted_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(self.hosted_timeout_secs),
        })
    }

    /// Build the configured store. Nothing here touches the network.
    pub fn build_store(&self) -> Result<Arc<dyn ItemStore>> {
        let table = TableName::new(&self.table).context("Invalid --table")?;

        let store: Arc<dyn ItemStore> = match self.backend {
            Backend::Postgres => {
                let config = self.pool_config();
                tracing::info!(
                    host = %config.host,
                    port = config.port,
                    database = %config.database,
                    pool_size = config.max_connections,
                    %table,
                    "using postgres backend"
                );
                Arc::new(PgItemStore::new(create_pool(&config), table))
            }
            Backend::Hosted => {
                let config = self.hosted_config()?;
                let store = HostedItemStore::new(&config, table)
                    .context("Failed to build hosted client")?;
                tracing::info!(endpoint = store.endpoint(), "using hosted backend");
                Arc::new(store)
            }
            Backend::Memory => {
                tracing::warn!("using in-memory backend, data will not persist");
                Arc::new(MemoryItemStore::new())
            }
        };

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        store: StoreArgs,
    }

    fn parse(args: &[&str]) -> StoreArgs {
        TestCli::parse_from(std::iter::once("test").chain(args.iter().copied())).store
    }

    #[test]
    fn pool_config_from_flags() {
        let args = parse(&["--db-host", "db.internal", "--db-pool-size", "4"]);
        let config = args.pool_config();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn hosted_requires_url() {
        let args = parse(&["--backend", "hosted", "--hosted-url", ""]);
        assert!(args.hosted_config().is_err());
    }

    #[test]
    fn rejects_bad_table_name() {
        let args = parse(&["--backend", "memory", "--table", "items;drop"]);
        assert!(args.build_store().is_err());
    }

    #[test]
    fn memory_backend_builds() {
        let args = parse(&["--backend", "memory", "--table", "android"]);
        let store = args.build_store().unwrap();
        assert_eq!(store.backend(), "memory");
    }
}

//! HTTP server command
//!
//! Runs the items API together with the database health monitor. The
//! monitor ends the process with exit code 1 after five consecutive failed
//! probes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use itemctl_server::monitor::{MonitorConfig, ProcessExit, DEFAULT_MAX_FAILURES};
use itemctl_server::ServerConfig;

use crate::config::StoreArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Seconds between database health probes
    #[arg(
        long,
        env = "HEALTH_CHECK_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub health_interval_secs: u64,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.bind, self.port),
            cors_permissive: self.cors_permissive,
        }
    }

    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.health_interval_secs),
            max_failures: DEFAULT_MAX_FAILURES,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let store = args.store.build_store()?;
    let server = args.server_config();

    tracing::info!("Starting itemctl server on {}", server.bind_addr);

    // Run server (blocks until shutdown)
    itemctl_server::serve(store, server, args.monitor_config(), Arc::new(ProcessExit))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let args = ServeArgs::parse_from(["serve", "--backend", "memory"]);
        let config = args.server_config();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn monitor_uses_fixed_failure_limit() {
        let args = ServeArgs::parse_from(["serve", "--health-interval-secs", "5"]);
        let config = args.monitor_config();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.max_failures, 5);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(ServeArgs::try_parse_from(["serve", "--health-interval-secs", "0"]).is_err());
    }
}

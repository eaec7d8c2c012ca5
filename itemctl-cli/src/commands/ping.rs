//! One-shot database probe
//!
//! Same round-trip the health monitor uses, run once. Exits non-zero when
//! the database cannot be reached.

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::config::StoreArgs;

/// Arguments for the ping command
#[derive(Parser, Debug)]
pub struct PingArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub async fn run_ping(args: PingArgs) -> Result<()> {
    let store = args.store.build_store()?;

    match store.ping().await {
        Ok(latency) => {
            let latency_ms = latency.as_secs_f64() * 1000.0;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "connected",
                        "backend": store.backend(),
                        "latency_ms": latency_ms,
                    })
                );
            } else {
                println!("connected ({}) in {:.1}ms", store.backend(), latency_ms);
            }
            Ok(())
        }
        Err(e) => Err(anyhow!("database unreachable ({}): {}", store.backend(), e)),
    }
}

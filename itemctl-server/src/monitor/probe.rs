//! Periodic connection probe
//!
//! State machine over `Connected`/`Disconnected` plus a consecutive-failure
//! counter. The counter resets on any successful probe; reaching
//! `max_failures` hands exit code 1 to the exit handler and ends the loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::exit::{ExitHandler, EXIT_DATABASE_UNREACHABLE};
use crate::db::ItemStore;

/// Consecutive failed probes before the process is terminated
pub const DEFAULT_MAX_FAILURES: u32 = 5;

/// Default delay between probes
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(60);

/// `tokio::time::interval` rejects a zero period
const MIN_PROBE_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Snapshot of what the monitor last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorState {
    pub state: ConnectionState,
    pub consecutive_failures: u32,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            consecutive_failures: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub max_failures: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROBE_INTERVAL,
            max_failures: DEFAULT_MAX_FAILURES,
        }
    }
}

/// Result of a single probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Success after being disconnected (or on the first probe)
    Connected { latency: Duration },
    /// Success while already connected
    Healthy { latency: Duration },
    /// Failure below the limit
    Failed { attempt: u32, reason: String },
    /// Failure that reached the limit; the exit handler has been called
    Exhausted { attempts: u32, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("database unreachable after {attempts} consecutive failed probes")]
    Exhausted { attempts: u32 },
}

/// Connection health monitor.
///
/// Owns its state; other components read it through the `watch::Receiver`
/// returned by [`HealthMonitor::new`].
pub struct HealthMonitor {
    store: Arc<dyn ItemStore>,
    config: MonitorConfig,
    exit: Arc<dyn ExitHandler>,
    current: MonitorState,
    tx: watch::Sender<MonitorState>,
}

impl HealthMonitor {
    pub fn new(
        store: Arc<dyn ItemStore>,
        config: MonitorConfig,
        exit: Arc<dyn ExitHandler>,
    ) -> (Self, watch::Receiver<MonitorState>) {
        let (tx, rx) = watch::channel(MonitorState::default());
        let monitor = Self {
            store,
            config,
            exit,
            current: MonitorState::default(),
            tx,
        };
        (monitor, rx)
    }

    pub fn state(&self) -> MonitorState {
        self.current
    }

    /// Run one probe and apply the resulting transition.
    pub async fn probe_once(&mut self) -> ProbeOutcome {
        let backend = self.store.backend();

        match self.store.ping().await {
            Ok(latency) => {
                let was = self.current.state;
                self.publish(MonitorState {
                    state: ConnectionState::Connected,
                    consecutive_failures: 0,
                });

                let latency_ms = latency.as_millis() as u64;
                if was == ConnectionState::Connected {
                    tracing::debug!(backend, latency_ms, "database probe ok");
                    ProbeOutcome::Healthy { latency }
                } else {
                    tracing::info!(backend, latency_ms, "database connected");
                    ProbeOutcome::Connected { latency }
                }
            }
            Err(e) => {
                if self.current.state == ConnectionState::Connected {
                    tracing::warn!(backend, "database connection lost");
                }

                let attempt = self.current.consecutive_failures.saturating_add(1);
                self.publish(MonitorState {
                    state: ConnectionState::Disconnected,
                    consecutive_failures: attempt,
                });

                let reason = e.to_string();
                tracing::error!(
                    backend,
                    attempt,
                    max = self.config.max_failures,
                    error = %reason,
                    "database probe failed ({}/{})",
                    attempt,
                    self.config.max_failures
                );

                if attempt >= self.config.max_failures {
                    tracing::error!(
                        backend,
                        attempts = attempt,
                        "giving up on database, check connection settings and restart"
                    );
                    self.exit.exit(EXIT_DATABASE_UNREACHABLE);
                    ProbeOutcome::Exhausted {
                        attempts: attempt,
                        reason,
                    }
                } else {
                    ProbeOutcome::Failed { attempt, reason }
                }
            }
        }
    }

    /// Probe immediately, then once per interval, until the failure limit.
    pub async fn run(mut self) -> MonitorError {
        let period = self.config.interval.max(MIN_PROBE_INTERVAL);
        tracing::info!(
            backend = self.store.backend(),
            interval_secs = period.as_secs_f64(),
            max_failures = self.config.max_failures,
            "health monitor started"
        );

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let ProbeOutcome::Exhausted { attempts, .. } = self.probe_once().await {
                return MonitorError::Exhausted { attempts };
            }
        }
    }

    /// Run on a background task.
    pub fn spawn(self) -> JoinHandle<MonitorError> {
        tokio::spawn(self.run())
    }

    fn publish(&mut self, next: MonitorState) {
        self.current = next;
        // Receivers may all be gone; the monitor keeps going regardless
        self.tx.send_replace(next);
    }
}

//! Database health monitor
//!
//! Probes the shared `ItemStore` on a timer, logs state transitions and
//! terminates the process after too many consecutive failures.

pub mod exit;
pub mod probe;

pub use exit::{ExitHandler, ProcessExit, RecordingExit, EXIT_DATABASE_UNREACHABLE};
pub use probe::{
    ConnectionState, HealthMonitor, MonitorConfig, MonitorError, MonitorState, ProbeOutcome,
    DEFAULT_MAX_FAILURES, DEFAULT_PROBE_INTERVAL,
};

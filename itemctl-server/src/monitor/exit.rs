//! Process exit seam
//!
//! The monitor never calls `std::process::exit` directly; it goes through an
//! `ExitHandler` so tests can observe the decision and keep running.

use std::sync::Mutex;

/// Exit code used when the monitor gives up on the database
pub const EXIT_DATABASE_UNREACHABLE: i32 = 1;

/// Trait for terminating the process (testable)
pub trait ExitHandler: Send + Sync {
    fn exit(&self, code: i32);
}

/// Real handler: ends the process immediately
pub struct ProcessExit;

impl ExitHandler for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Recording handler for tests
#[derive(Default)]
pub struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordingExit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit codes requested so far, oldest first
    pub fn codes(&self) -> Vec<i32> {
        match self.codes.lock() {
            Ok(codes) => codes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ExitHandler for RecordingExit {
    fn exit(&self, code: i32) {
        match self.codes.lock() {
            Ok(mut codes) => codes.push(code),
            Err(poisoned) => poisoned.into_inner().push(code),
        }
    }
}

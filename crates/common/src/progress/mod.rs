//! Mock progress reporting
//!
//! Not connected to any upload or job: each report is an independent,
//! uniformly random pick from a fixed list of status messages.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The only message that marks the work as finished
pub const TERMINAL_MESSAGE: &str = "Finalizing output...";

/// Status messages, in pipeline order. The last entry is terminal.
pub const STATUS_MESSAGES: [&str; 5] = [
    "Gathering data...",
    "Analyzing trends...",
    "Calculating results...",
    "Generating report...",
    TERMINAL_MESSAGE,
];

/// A single progress report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub message: String,
    pub finished: bool,
}

impl ProgressReport {
    fn from_message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            finished: message == TERMINAL_MESSAGE,
        }
    }
}

/// Pick a status message uniformly at random.
pub fn pick_report<R: Rng + ?Sized>(rng: &mut R) -> ProgressReport {
    // STATUS_MESSAGES is non-empty, so choose always yields a message
    let message = STATUS_MESSAGES.choose(rng).copied().unwrap_or(TERMINAL_MESSAGE);
    ProgressReport::from_message(message)
}

/// Pick a report using the thread-local generator.
pub fn random_report() -> ProgressReport {
    pick_report(&mut rand::thread_rng())
}

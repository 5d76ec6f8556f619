//! Driver configuration: candidate delivery, timeout and call budget.

use std::time::Duration;

use log::warn;

/// Environment variable overriding the per-call validator timeout, in
/// milliseconds.  Accepted range is `1..=60000`; anything else keeps
/// the default.
pub const TIMEOUT_ENV: &str = "REPAIR_VALIDATOR_TIMEOUT_MS";

const TIMEOUT_DEFAULT_MS: u64 = 1000;
const TIMEOUT_SERVER_DEFAULT_MS: u64 = 250;
const TIMEOUT_MAX_MS: u64 = 60_000;

/// How a candidate reaches the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Write the candidate to a fresh temp file and pass its path as
    /// `argv[1]`.  The default, since many validators expect a
    /// filename.
    #[default]
    TempFile,
    /// Pipe the candidate to the child's standard input.
    Stdin,
}

/// Configuration for one oracle instance.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub delivery: Delivery,
    /// Wall-clock budget per validator run.
    pub timeout: Duration,
    /// Total call cap; once reached every further `ask` returns
    /// [`Verdict::Err`](crate::Verdict::Err) without running anything.
    pub max_calls: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            delivery: Delivery::TempFile,
            timeout: Duration::from_millis(TIMEOUT_DEFAULT_MS),
            max_calls: u64::MAX,
        }
    }
}

impl OracleConfig {
    /// Default configuration with the timeout taken from the
    /// environment.
    pub fn from_env() -> Self {
        Self {
            timeout: timeout_from(
                std::env::var(TIMEOUT_ENV).ok().as_deref(),
                TIMEOUT_DEFAULT_MS,
            ),
            ..Self::default()
        }
    }

    /// Configuration for the persistent-server mode, where round trips
    /// are cheap and the timeout defaults lower.
    pub fn server_from_env() -> Self {
        Self {
            timeout: timeout_from(
                std::env::var(TIMEOUT_ENV).ok().as_deref(),
                TIMEOUT_SERVER_DEFAULT_MS,
            ),
            ..Self::default()
        }
    }
}

fn timeout_from(raw: Option<&str>, default_ms: u64) -> Duration {
    let ms = match raw {
        None => default_ms,
        Some(text) => match text.parse::<u64>() {
            Ok(v) if (1..=TIMEOUT_MAX_MS).contains(&v) => v,
            _ => {
                warn!("ignoring {TIMEOUT_ENV}={text:?}: expected 1..={TIMEOUT_MAX_MS}");
                default_ms
            }
        },
    };
    Duration::from_millis(ms)
}

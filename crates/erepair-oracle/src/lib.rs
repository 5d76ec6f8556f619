//! Validator process supervision for black-box string repair.
//!
//! A **validator** is an external program that classifies a byte string
//! by exit code: `0` accepted, `1` rejected, `255` parsed up to a
//! truncation point, anything else (including death by signal) an
//! error.  This crate wraps such programs behind one narrow trait:
//!
//! ```text
//! ask(&[u8]) -> Verdict { Ok | Err | Inc }
//! ```
//!
//! Three implementations are provided:
//!
//! - [`CommandOracle`] — spawns the validator once per query, feeding
//!   the candidate through a fresh temp file (path as `argv[1]`) or the
//!   child's stdin, with a hard per-call timeout.
//! - [`ServerOracle`] — one long-lived validator child spoken to over a
//!   `DATA`/`OK`/`REJECT`/`QUIT` line protocol on its stdio pipes.
//! - [`FnOracle`] — an in-process closure, for tests and embedding.
//!
//! [`CachedOracle`] wraps any of them with candidate deduplication.
//!
//! # Failure semantics
//!
//! Nothing escapes the driver boundary: spawn failures, pipe errors,
//! timeouts and signal deaths are all collapsed to [`Verdict::Err`] and
//! counted.  A configurable total call cap makes the search wind down
//! naturally once the oracle budget is spent.
//!
//! # Process discipline
//!
//! Children are spawned directly (no shell), their stdout/stderr are
//! discarded, timed-out children are SIGKILLed and reaped, temp files
//! are removed on every exit path, and `SIGPIPE` is ignored
//! process-wide so a dying child cannot take the repairer with it.

mod cache;
mod config;
mod driver;
mod server;
mod verdict;

pub use cache::CachedOracle;
pub use config::{Delivery, OracleConfig, TIMEOUT_ENV};
pub use driver::{ignore_sigpipe, CommandOracle};
pub use server::ServerOracle;
pub use verdict::{predicate_oracle, FnOracle, Oracle, OracleStats, Verdict};

use thiserror::Error;

/// Errors surfaced at oracle *construction* time.  Per-query failures
/// never surface as errors; they become [`Verdict::Err`].
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to spawn validator server: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("validator server closed its pipes during startup")]
    Startup,

    #[error("failed to configure validator server pipes: {0}")]
    Pipe(#[source] std::io::Error),
}

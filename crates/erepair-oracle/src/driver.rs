//! One-shot validator driver: spawn per query, feed the candidate,
//! enforce the timeout, map the exit status.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::config::{Delivery, OracleConfig};
use crate::verdict::{Oracle, OracleStats, Verdict};

/// How often a live child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Ignore `SIGPIPE` process-wide, once.  A validator that dies while we
/// are writing to its stdin must surface as a write error, not kill the
/// repairer.
pub fn ignore_sigpipe() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    });
}

/// Spawns the validator once per query.
///
/// The child is executed directly with no shell, its stdout and stderr
/// are discarded, and it is hard-killed and reaped if it outlives the
/// per-call timeout.  Every failure on the way to an exit status is
/// collapsed to [`Verdict::Err`].
pub struct CommandOracle {
    program: PathBuf,
    config: OracleConfig,
    stats: OracleStats,
}

impl CommandOracle {
    /// Driver for `program` with the default configuration.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_config(program, OracleConfig::default())
    }

    pub fn with_config(program: impl Into<PathBuf>, config: OracleConfig) -> Self {
        ignore_sigpipe();
        Self {
            program: program.into(),
            config,
            stats: OracleStats::default(),
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn run_once(&self, candidate: &[u8]) -> Verdict {
        match self.config.delivery {
            Delivery::TempFile => self.run_with_temp_file(candidate),
            Delivery::Stdin => self.run_with_stdin(candidate),
        }
    }

    fn run_with_temp_file(&self, candidate: &[u8]) -> Verdict {
        // NamedTempFile unlinks on drop, covering every exit path
        // below, timeout and spawn failure included.
        let mut file = match NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => {
                warn!("temp file creation failed: {e}");
                return Verdict::Err;
            }
        };
        if file.write_all(candidate).and_then(|_| file.flush()).is_err() {
            return Verdict::Err;
        }

        let child = Command::new(&self.program)
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match child {
            Ok(child) => self.reap(child),
            Err(e) => {
                warn!("failed to spawn validator {:?}: {e}", self.program);
                Verdict::Err
            }
        }
    }

    fn run_with_stdin(&self, candidate: &[u8]) -> Verdict {
        let child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to spawn validator {:?}: {e}", self.program);
                return Verdict::Err;
            }
        };

        // A validator may stop reading early and exit with a verdict;
        // with SIGPIPE ignored the write merely errors, and the exit
        // status still decides.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(candidate) {
                debug!("short write to validator stdin: {e}");
            }
        }

        self.reap(child)
    }

    /// Wait for the child within the timeout, killing and reaping it on
    /// expiry, and map its exit status to a verdict.
    fn reap(&self, mut child: Child) -> Verdict {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return map_status(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        debug!(
                            "validator timed out after {:?}",
                            self.config.timeout
                        );
                        return Verdict::Err;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("waiting on validator failed: {e}");
                    return Verdict::Err;
                }
            }
        }
    }
}

/// Map a validator exit status to a verdict: 0 accepted, 1 rejected,
/// 255 incomplete, anything else (other exits, signals) an error.
fn map_status(status: ExitStatus) -> Verdict {
    match status.code() {
        Some(0) => Verdict::Ok,
        Some(1) => Verdict::Err,
        Some(255) => Verdict::Inc,
        _ => Verdict::Err,
    }
}

impl Oracle for CommandOracle {
    fn ask(&mut self, candidate: &[u8]) -> Verdict {
        if self.stats.total >= self.config.max_calls {
            return Verdict::Err;
        }
        // Counted before the run so the cap holds across failures.
        self.stats.total += 1;

        let verdict = self.run_once(candidate);
        self.stats.record(verdict);
        verdict
    }

    fn stats(&self) -> OracleStats {
        self.stats
    }
}

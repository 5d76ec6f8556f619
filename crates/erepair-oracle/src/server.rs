//! Persistent validator server: one long-lived child, queried over its
//! stdio pipes with a line protocol.
//!
//! Request:  `DATA <n>\n` followed by `<n>` raw bytes and `\n`.
//! Reply:    `OK\n` or `REJECT\n`.
//! Shutdown: `QUIT\n`.

use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::OracleConfig;
use crate::driver::ignore_sigpipe;
use crate::verdict::{Oracle, OracleStats, Verdict};
use crate::OracleError;

/// How long shutdown waits for a clean exit before killing.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// A validator server spawned once and queried for the life of the
/// repair.
///
/// Timeout, counters and SIGPIPE handling match
/// [`CommandOracle`](crate::CommandOracle); the one difference is that
/// a timed-out or disconnected server is not respawned — the oracle
/// goes dead and every further query reports [`Verdict::Err`].
pub struct ServerOracle {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    /// Bytes read from the child but not yet consumed as a reply line.
    pending: Vec<u8>,
    dead: bool,
    config: OracleConfig,
    stats: OracleStats,
}

impl ServerOracle {
    /// Spawn the server.  Construction failures are real errors;
    /// everything after this point is demoted to verdicts.
    pub fn spawn<S: AsRef<OsStr>>(
        program: impl Into<PathBuf>,
        args: &[S],
        config: OracleConfig,
    ) -> Result<Self, OracleError> {
        ignore_sigpipe();

        let program = program.into();
        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(OracleError::Spawn)?;

        let stdin = child.stdin.take().ok_or(OracleError::Startup)?;
        let stdout = child.stdout.take().ok_or(OracleError::Startup)?;
        set_nonblocking(&stdout).map_err(OracleError::Pipe)?;

        debug!("validator server {program:?} up (pid {})", child.id());
        Ok(Self {
            child,
            stdin,
            stdout,
            pending: Vec::new(),
            dead: false,
            config,
            stats: OracleStats::default(),
        })
    }

    /// Send `QUIT` and reap the child.  Also performed on drop.
    pub fn shutdown(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;

        let _ = self.stdin.write_all(b"QUIT\n");
        let _ = self.stdin.flush();

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5))
                }
                _ => break,
            }
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    /// Kill the child and mark the oracle dead after a protocol
    /// failure.
    fn abandon(&mut self, reason: &str) {
        warn!("validator server abandoned: {reason}");
        self.dead = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn exchange(&mut self, candidate: &[u8]) -> Verdict {
        if self.stdin.write_all(&request_frame(candidate)).is_err()
            || self.stdin.flush().is_err()
        {
            self.abandon("request write failed");
            return Verdict::Err;
        }

        let deadline = Instant::now() + self.config.timeout;
        match self.read_reply(deadline) {
            Some(reply) => match reply.as_str() {
                "OK" => Verdict::Ok,
                "REJECT" => Verdict::Err,
                other => {
                    self.abandon(&format!("unexpected reply {other:?}"));
                    Verdict::Err
                }
            },
            None => {
                self.abandon("no reply within timeout");
                Verdict::Err
            }
        }
    }

    /// Read one `\n`-terminated line, polling the nonblocking pipe
    /// until the deadline.  `None` on timeout, EOF or read error.
    fn read_reply(&mut self, deadline: Instant) -> Option<String> {
        let mut chunk = [0u8; 256];
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                let mut line = String::from_utf8_lossy(&line[..pos]).into_owned();
                if line.ends_with('\r') {
                    line.pop();
                }
                return Some(line);
            }
            if Instant::now() >= deadline {
                return None;
            }
            match self.stdout.read(&mut chunk) {
                Ok(0) => return None,
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(1))
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return None,
            }
        }
    }
}

impl Oracle for ServerOracle {
    fn ask(&mut self, candidate: &[u8]) -> Verdict {
        if self.dead || self.stats.total >= self.config.max_calls {
            return Verdict::Err;
        }
        self.stats.total += 1;

        let verdict = self.exchange(candidate);
        self.stats.record(verdict);
        verdict
    }

    fn stats(&self) -> OracleStats {
        self.stats
    }
}

impl Drop for ServerOracle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Frame one candidate as a `DATA` request.
fn request_frame(candidate: &[u8]) -> Vec<u8> {
    let header = format!("DATA {}\n", candidate.len());
    let mut frame = Vec::with_capacity(header.len() + candidate.len() + 1);
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(candidate);
    frame.push(b'\n');
    frame
}

fn set_nonblocking(stdout: &ChildStdout) -> io::Result<()> {
    let fd = stdout.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

//! [`Formatter`] backed by an external program.
//!
//! The program runs once, in the repository root, as
//! `<command> <args...> <path1> <path2> ...`. Its exit code is classified
//! against two configured lists:
//!
//! | Exit code                       | Result                                  |
//! |---------------------------------|-----------------------------------------|
//! | in `success_exit_codes`         | success (failure lines still recorded)  |
//! | in `partial_failure_exit_codes` | per-file failures, if any were parsed   |
//! | anything else, signal, timeout  | [`InvokeError`] (fatal)                 |
//!
//! Per-file failures are parsed from stderr then stdout with a regex carrying
//! `path` and `reason` named groups.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

use sweep_core::config::FormatterConfig;
use sweep_core::ConfigError;

use crate::error::InvokeError;
use crate::formatter::{Formatter, FormatterRun};

/// Upper bound on captured stdout/stderr per stream.
const OUTPUT_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Stderr tail kept in fatal error messages.
const STDERR_TAIL_CHARS: usize = 2000;

/// External formatter program.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    failure_pattern: Regex,
    success_exit_codes: Vec<i32>,
    partial_failure_exit_codes: Vec<i32>,
}

impl CommandFormatter {
    /// Build from config, validating the command and the failure pattern.
    pub fn from_config(config: &FormatterConfig) -> Result<Self, ConfigError> {
        if config.command.trim().is_empty() {
            return Err(ConfigError::EmptyFormatterCommand);
        }
        let failure_pattern = compile_failure_pattern(&config.failure_pattern)?;
        Ok(Self {
            program: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            failure_pattern,
            success_exit_codes: config.success_exit_codes.clone(),
            partial_failure_exit_codes: config.partial_failure_exit_codes.clone(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Extract `path → reason` for paths in `batch` from tool output.
    fn parse_failures(
        &self,
        root: &Path,
        outputs: &[&str],
        batch: &HashSet<&str>,
    ) -> BTreeMap<String, String> {
        let mut failures = BTreeMap::new();
        for text in outputs {
            for caps in self.failure_pattern.captures_iter(text) {
                let (Some(path), Some(reason)) = (caps.name("path"), caps.name("reason")) else {
                    continue;
                };
                let path = normalize_reported_path(root, path.as_str().trim());
                if !batch.contains(path.as_str()) {
                    debug!(path = %path, "ignoring failure for path outside batch");
                    continue;
                }
                failures
                    .entry(path)
                    .or_insert_with(|| reason.as_str().trim().to_string());
            }
        }
        failures
    }

    fn stderr_tail(stderr: &str) -> String {
        let trimmed = stderr.trim();
        let count = trimmed.chars().count();
        if count <= STDERR_TAIL_CHARS {
            return trimmed.to_string();
        }
        trimmed.chars().skip(count - STDERR_TAIL_CHARS).collect()
    }
}

impl Formatter for CommandFormatter {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip_all, fields(program = %self.program, files = paths.len()))]
    fn format(&self, root: &Path, paths: &[String]) -> Result<FormatterRun, InvokeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(paths).current_dir(root);

        let output = run_with_timeout(cmd, &self.program, self.timeout)?;
        if output.timed_out {
            return Err(InvokeError::TimedOut {
                program: self.program.clone(),
                timeout_secs: self.timeout.as_secs(),
            });
        }
        let Some(code) = output.status.code() else {
            return Err(InvokeError::Terminated {
                program: self.program.clone(),
            });
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let batch: HashSet<&str> = paths.iter().map(String::as_str).collect();
        let failures = self.parse_failures(root, &[&*stderr, &*stdout], &batch);

        if self.success_exit_codes.contains(&code) {
            debug!(code, failures = failures.len(), "formatter succeeded");
            return Ok(FormatterRun { failures });
        }
        if self.partial_failure_exit_codes.contains(&code) && !failures.is_empty() {
            warn!(code, failures = failures.len(), "formatter reported per-file failures");
            return Ok(FormatterRun { failures });
        }

        Err(InvokeError::ExitStatus {
            program: self.program.clone(),
            code,
            stderr: Self::stderr_tail(&stderr),
        })
    }
}

fn compile_failure_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    let re = Regex::new(pattern).map_err(|e| ConfigError::InvalidFailurePattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    let names: HashSet<&str> = re.capture_names().flatten().collect();
    if !names.contains("path") || !names.contains("reason") {
        return Err(ConfigError::MissingCaptureGroups {
            pattern: pattern.to_string(),
        });
    }
    Ok(re)
}

/// Map a tool-reported path back to the repository-relative form.
fn normalize_reported_path(root: &Path, reported: &str) -> String {
    let reported_path = Path::new(reported);
    let rel = reported_path.strip_prefix(root).unwrap_or(reported_path);
    let s = rel.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").map(str::to_string).unwrap_or(s)
}

// ---------------------------------------------------------------------------
// Child process plumbing
// ---------------------------------------------------------------------------

/// Captured child process output.
#[derive(Debug)]
struct CommandOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    timed_out: bool,
}

/// Extra wait for the output pipes to close once the formatter has exited
/// or been killed.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

type Chunk = (Stream, std::io::Result<Vec<u8>>);

/// Run a command with a timeout, draining stdout/stderr on helper threads so
/// the child never blocks on a full pipe.
///
/// On unix the child leads its own process group. A timeout kills the whole
/// group, so helpers the formatter forked cannot keep the pipes open.
fn run_with_timeout(
    mut cmd: Command,
    program: &str,
    timeout: Duration,
) -> Result<CommandOutput, InvokeError> {
    let io = |source: std::io::Error| InvokeError::Io {
        program: program.to_string(),
        source,
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    debug!("spawning formatter");
    let started = Instant::now();
    let mut child = cmd.spawn().map_err(|source| InvokeError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let pgid = child.id();

    let (tx, rx) = mpsc::channel();
    spawn_reader(Stream::Stdout, child.stdout.take(), tx.clone());
    spawn_reader(Stream::Stderr, child.stderr.take(), tx);

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).map_err(io)? {
        Some(status) => status,
        None => {
            warn!(timeout_secs = timeout.as_secs(), "formatter timed out, killing");
            timed_out = true;
            kill_process_group(pgid);
            child.kill().map_err(io)?;
            child.wait().map_err(io)?
        }
    };

    let drain_until = if timed_out {
        Instant::now() + DRAIN_GRACE
    } else {
        (started + timeout).max(Instant::now() + DRAIN_GRACE)
    };
    let (stdout, stderr) = match drain(&rx, drain_until).map_err(io)? {
        Some(captured) => captured,
        None => {
            warn!(pgid, "output pipes still open after formatter exited, killing leftovers");
            kill_process_group(pgid);
            drain(&rx, Instant::now() + DRAIN_GRACE)
                .map_err(io)?
                .unwrap_or_default()
        }
    };

    debug!(exit_code = ?status.code(), timed_out, "formatter finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(stream: Stream, reader: Option<R>, tx: Sender<Chunk>) {
    thread::spawn(move || {
        // The receiver is gone only when the caller stopped waiting.
        let _ = tx.send((stream, read_limited(reader)));
    });
}

/// Collect both streams, or `None` if `until` passes first.
fn drain(
    rx: &Receiver<Chunk>,
    until: Instant,
) -> std::io::Result<Option<(Vec<u8>, Vec<u8>)>> {
    let mut stdout = None;
    let mut stderr = None;
    while stdout.is_none() || stderr.is_none() {
        let left = until.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok((Stream::Stdout, bytes)) => stdout = Some(bytes?),
            Ok((Stream::Stderr, bytes)) => stderr = Some(bytes?),
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(std::io::Error::other("output reader thread panicked"))
            }
        }
    }
    Ok(stdout.zip(stderr))
}

fn read_limited<R: Read>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let Some(mut stream) = stream else {
        return Ok(Vec::new());
    };
    let mut kept = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let room = OUTPUT_LIMIT_BYTES.saturating_sub(kept.len());
        kept.extend_from_slice(&buf[..n.min(room)]);
    }
    Ok(kept)
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(pgid, error = %err, "failed to kill formatter process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

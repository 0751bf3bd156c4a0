//! Subprocess runner with a hard timeout.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use writerdeck_types::error::{Result, WriterdeckError};

/// Exit code reported when the child had to be killed.
pub const EXIT_TIMEOUT: i32 = 124;
/// Exit code reported when the program does not exist.
pub const EXIT_NOT_FOUND: i32 = 127;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of running an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub code: i32,
    /// stdout followed by stderr, lossily decoded.
    pub output: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn timed_out(&self) -> bool {
        self.code == EXIT_TIMEOUT
    }
}

/// Run `program` with `args`, capturing output, killing it after `timeout`.
///
/// A missing program yields [`EXIT_NOT_FOUND`] and an expired timeout
/// [`EXIT_TIMEOUT`]; any other spawn failure is an error. A child killed by
/// a signal reports `128 + signal`.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<ToolOutput> {
    let spawned = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ToolOutput {
                code: EXIT_NOT_FOUND,
                output: String::new(),
            });
        },
        Err(e) => {
            return Err(WriterdeckError::Platform(format!("spawn {program}: {e}")));
        },
    };

    // Drain both pipes on their own threads so a chatty child cannot fill a
    // pipe buffer and stall before exiting.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            log::debug!("{program}: timed out after {timeout:?}, killing");
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let mut output = join_drain(stdout);
    output.push_str(&join_drain(stderr));

    let code = match status {
        None => EXIT_TIMEOUT,
        Some(s) => s.code().unwrap_or_else(|| {
            use std::os::unix::process::ExitStatusExt;
            128 + s.signal().unwrap_or(0)
        }),
    };
    Ok(ToolOutput { code, output })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Locate `program` on `PATH`. Names containing `/` are checked as given.
pub fn which(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

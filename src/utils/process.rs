//! Staged, time-bounded subprocess execution for external tools.
//!
//! Input is written into a private temporary directory that is removed when
//! the [`StagingArea`] drops, on every exit path. Child stdout is redirected
//! to a file inside that directory so a chatty tool can never block on a full
//! pipe while we poll for completion.

use crate::errors::BackendError;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const STDOUT_FILE: &str = "stdout.capture";

/// A scoped temporary directory for one tool invocation.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    pub fn new() -> Result<Self, BackendError> {
        let dir = tempfile::Builder::new()
            .prefix("ostia-")
            .tempdir()
            .map_err(BackendError::Stage)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the staging directory.
    pub fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf, BackendError> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).map_err(BackendError::Stage)?;
        Ok(path)
    }

    /// Run `program` with `args`, working directory set to the staging area.
    ///
    /// Returns captured stdout on a zero exit. On timeout the child is killed,
    /// reaped, and whatever it wrote is dropped.
    pub fn run<I, S>(&self, program: &OsStr, args: I, timeout: Duration) -> Result<Vec<u8>, BackendError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let label = program.to_string_lossy().into_owned();
        let capture_path = self.dir.path().join(STDOUT_FILE);
        let capture = File::create(&capture_path).map_err(BackendError::Stage)?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(self.dir.path())
            .stdin(Stdio::null())
            .stdout(capture)
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: label.clone(),
                source,
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= timeout => {
                    // Kill can fail if the child exited in between; reap either way.
                    let _ = child.kill();
                    let _ = child.wait();
                    log::warn!("{label} killed after {}s", timeout.as_secs());
                    return Err(BackendError::Timeout {
                        program: label,
                        after: timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BackendError::Spawn { program: label, source });
                }
            }
        };

        if !status.success() {
            return Err(BackendError::ExitStatus {
                program: label,
                status: status.to_string(),
            });
        }

        let mut out = Vec::new();
        File::open(&capture_path)
            .and_then(|mut f| f.read_to_end(&mut out))
            .map_err(BackendError::Stage)?;
        Ok(out)
    }
}

/// Resolve `program` to an executable path.
///
/// Names containing a path separator are checked directly; bare names are
/// searched for on `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

//! Duplicate-instance detection.
//!
//! # Responsibilities
//! - Refuse to start a second server of the same application type
//! - Hold the exclusion for as long as the process runs
//!
//! # Design Decisions
//! - Default strategy is an exclusive advisory lock per application type
//! - The `ps -ef` scan is kept as an opt-in; it is point-in-time and racy

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tokio::process::Command;

use crate::collaborator::AppType;
use crate::config::{InstanceConfig, InstanceStrategy};

/// Result of a duplicate-instance check.
#[derive(Debug)]
pub enum InstanceCheck {
    /// No other instance; keep the guard alive until exit.
    Clear(InstanceGuard),
    /// Another instance of the same type is active.
    AlreadyRunning,
}

/// Keeps whatever exclusion the strategy acquired.
#[derive(Debug)]
pub struct InstanceGuard {
    _lock: Option<InstanceLock>,
}

/// Check whether another instance of `app_type` is running.
pub async fn check_already_running(
    app_type: AppType,
    config: &InstanceConfig,
) -> io::Result<InstanceCheck> {
    match config.strategy {
        InstanceStrategy::Lock => {
            let check = match InstanceLock::try_acquire(&config.lock_dir(), app_type)? {
                Some(lock) => InstanceCheck::Clear(InstanceGuard { _lock: Some(lock) }),
                None => InstanceCheck::AlreadyRunning,
            };
            Ok(check)
        }
        InstanceStrategy::ProcessScan => {
            let listing = process_listing().await?;
            if listing_has_instance(&listing, std::process::id(), &config.process_marker, app_type.tag()) {
                Ok(InstanceCheck::AlreadyRunning)
            } else {
                Ok(InstanceCheck::Clear(InstanceGuard { _lock: None }))
            }
        }
    }
}

/// Exclusive lock file for one application type.
///
/// The lock is released when the value is dropped or the process exits.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Lock file location for `app_type` under `dir`.
    pub fn lock_path(dir: &Path, app_type: AppType) -> PathBuf {
        dir.join(format!("presenter_server_{}.lock", app_type.tag()))
    }

    /// Try to take the lock without blocking. `Ok(None)` means it is held elsewhere.
    pub fn try_acquire(dir: &Path, app_type: AppType) -> io::Result<Option<Self>> {
        fs::create_dir_all(dir)?;
        let path = Self::lock_path(dir, app_type);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                tracing::debug!(path = %path.display(), "Instance lock held by another process");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        // Owner pid, for operators inspecting the file.
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        tracing::debug!(path = %path.display(), "Instance lock acquired");
        Ok(Some(Self { file, path }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

async fn process_listing() -> io::Result<String> {
    let output = Command::new("ps").arg("-ef").output().await?;
    if !output.status.success() {
        return Err(io::Error::other(format!("ps -ef exited with {}", output.status)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether a process listing shows another instance.
///
/// Lines naming `own_pid` (as PID or PPID) are skipped. A remaining line
/// matches when it contains `marker` as a whole word and `tag` anywhere.
pub fn listing_has_instance(listing: &str, own_pid: u32, marker: &str, tag: &str) -> bool {
    let pid = own_pid.to_string();
    listing
        .lines()
        .filter(|line| !line.split_whitespace().any(|token| token == pid))
        .any(|line| contains_word(line, marker) && line.contains(tag))
}

fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

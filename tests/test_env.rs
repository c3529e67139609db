// Shared HOME isolation for CLI tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

pub fn lock_test_env() -> MutexGuard<'static, ()> {
    static TEST_ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    TEST_ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Temp HOME with `~/.leadpipe/rc` pointing at a fresh database.
/// `extra_rc` lines are appended to the rc file.
pub fn setup_test_env(extra_rc: &str) -> (TempDir, MutexGuard<'static, ()>) {
    let guard = lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".leadpipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n{}", db_path(&temp_dir).display(), extra_rc),
    )
    .unwrap();
    (temp_dir, guard)
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("leads.db")
}

pub fn leadpipe_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("leadpipe").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

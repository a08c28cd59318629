use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use crate::app_dirs::AppDirs;

pub const LOG_ENV: &str = "REFLEX_LOG";

/// Route `log` output to the state-dir log file, filtered by `REFLEX_LOG`
/// (default `info`). Returns an error only if the file cannot be opened.
pub fn init() -> io::Result<()> {
    match AppDirs::log_path() {
        Some(path) => init_with_path(&path),
        None => Ok(()),
    }
}

pub fn init_with_path(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // a second init in the same process (tests) is harmless
    let _ = Builder::from_env(Env::new().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    Ok(())
}

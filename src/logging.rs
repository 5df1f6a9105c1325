use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens `<name>.log` for a run, or nothing when no log name was given.
pub fn open_run_log(name: Option<&str>) -> Result<Option<File>> {
    match name {
        Some(name) => {
            let path = format!("{name}.log");
            let file = File::create(Path::new(&path)).with_context(|| format!("create {path}"))?;
            Ok(Some(file))
        }
        None => Ok(None),
    }
}

pub fn log_line(log: &mut Option<File>, message: &str) -> Result<()> {
    info!("{message}");
    if let Some(file) = log.as_mut() {
        writeln!(file, "{message}")?;
    }
    Ok(())
}

pub fn warn_line(log: &mut Option<File>, message: &str) -> Result<()> {
    warn!("{message}");
    if let Some(file) = log.as_mut() {
        writeln!(file, "{message}")?;
    }
    Ok(())
}

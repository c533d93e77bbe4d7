use anyhow::{anyhow, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Send tracing output to `<data dir>/restyle/restyle.log`
///
/// stderr belongs to the terminal UI, so nothing is logged there. `RUST_LOG`
/// wins over `level` when set.
pub fn init(level: &str) -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("restyle");
    fs::create_dir_all(&dir)?;

    let path = dir.join("restyle.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Could not install logger: {}", e))?;

    Ok(path)
}

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a snapshot as compact UTF-8 JSON, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))?;
        }
    }
    let f = File::create(path).with_context(|| format!("create snapshot {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(f), value)
        .with_context(|| format!("write snapshot {}", path.display()))?;
    Ok(())
}

/// Load a JSON snapshot. A missing or corrupt file fails only the stage
/// that asked for it; callers decide whether that is fatal.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open snapshot {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    Ok(value)
}

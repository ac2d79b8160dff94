//! Durable checkpoint persistence.
//!
//! The ledger's full output sets live in memory; what survives a restart
//! is the [`EconomyCheckpoint`]: the aggregate counters that keep the
//! issuance schedule, stats, and difficulty continuous. The checkpoint is
//! a small JSON file in the data directory, written via a temp file plus
//! rename so a crash mid-write never leaves a torn checkpoint behind.

use std::fs;
use std::path::{Path, PathBuf};

use webcash_ledger::EconomyCheckpoint;

use crate::NodeError;

const CHECKPOINT_FILE: &str = "checkpoint.json";

pub fn checkpoint_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CHECKPOINT_FILE)
}

/// Read the checkpoint from `data_dir`, if one exists.
///
/// A missing file is a fresh start, not an error. A file that exists but
/// does not parse is an error: silently discarding it would reset the
/// issuance schedule.
pub fn load_checkpoint(data_dir: &Path) -> Result<Option<EconomyCheckpoint>, NodeError> {
    let path = checkpoint_path(data_dir);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let checkpoint = serde_json::from_str(&content)
        .map_err(|err| NodeError::Checkpoint(format!("{}: {err}", path.display())))?;
    Ok(Some(checkpoint))
}

/// Write the checkpoint to `data_dir`, creating the directory if needed.
pub fn save_checkpoint(data_dir: &Path, checkpoint: &EconomyCheckpoint) -> Result<(), NodeError> {
    fs::create_dir_all(data_dir)?;
    let path = checkpoint_path(data_dir);
    let tmp = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(checkpoint)
        .map_err(|err| NodeError::Checkpoint(err.to_string()))?;
    fs::write(&tmp, content)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("parent directory missing or not writable: {0}")]
    ParentDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory that will hold `target` exists; create if missing.
pub fn ensure_parent_dir(target: &Path) -> Result<(), PersistError> {
    let Some(dir) = parent_dir(target) else {
        return Ok(());
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::ParentDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ParentDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::ParentDir(e.to_string()))?;
    }
    Ok(())
}

/// Write `content` to `target` by writing a sibling temp file then renaming it
/// over the target. Readers see either the old or the new content, never a
/// partial write.
pub fn write_atomically(target: &Path, content: &str) -> Result<(), PersistError> {
    ensure_parent_dir(target)?;

    let dir = parent_dir(target).unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

fn parent_dir(target: &Path) -> Option<&Path> {
    target.parent().filter(|dir| !dir.as_os_str().is_empty())
}

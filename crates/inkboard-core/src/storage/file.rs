//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode, encode};
use crate::snapshot::Snapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extension of stored drawings.
const DRAWING_EXTENSION: &str = "png";

/// Extension of a drawing being written; renamed into place when complete.
const PARTIAL_EXTENSION: &str = "png.part";

/// One PNG file per drawing in a base directory.
///
/// Saves write to a `.png.part` file first and rename it over the old
/// drawing, so a crash mid-save never leaves a truncated PNG behind.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a drawing directory.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Io(format!(
                "Failed to create drawing directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(Self { base_path })
    }

    /// Open the per-user drawing directory.
    ///
    /// On Unix: `~/.local/share/inkboard/drawings/`
    /// On Windows: `%LOCALAPPDATA%\inkboard\drawings\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("inkboard").join("drawings"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn drawing_path(&self, id: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", file_stem(id), DRAWING_EXTENSION))
    }
}

/// Map a drawing id onto a file name stem. Anything outside
/// `[A-Za-z0-9_-]` becomes `_`, so ids cannot leave the base directory.
fn file_stem(id: &str) -> String {
    if id.is_empty() {
        return "_".to_string();
    }
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn write_atomically(path: &Path, data: &[u8]) -> StorageResult<()> {
    let partial = path.with_extension(PARTIAL_EXTENSION);
    fs::write(&partial, data)
        .and_then(|()| fs::rename(&partial, path))
        .map_err(|e| {
            let _ = fs::remove_file(&partial);
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
}

impl Storage for FileStorage {
    fn save(&self, id: &str, drawing: &Snapshot) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.drawing_path(id);
        let data = encode(drawing);
        Box::pin(async move {
            write_atomically(&path, &data?)?;
            log::info!("Saved drawing to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Snapshot>> {
        let path = self.drawing_path(id);
        let id = id.to_string();
        Box::pin(async move {
            let data = fs::read(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(id.clone()),
                _ => StorageError::Io(format!("Failed to read {}: {}", path.display(), e)),
            })?;
            decode(&id, &data)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.drawing_path(id);
        Box::pin(async move {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(StorageError::Io(format!(
                    "Failed to delete {}: {}",
                    path.display(),
                    e
                ))),
                _ => Ok(()),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            let entries = match fs::read_dir(&base) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => {
                    return Err(StorageError::Io(format!(
                        "Failed to read {}: {}",
                        base.display(),
                        e
                    )));
                }
            };
            let ids = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == DRAWING_EXTENSION))
                .filter_map(|path| Some(path.file_stem()?.to_string_lossy().into_owned()))
                .collect();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.drawing_path(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}

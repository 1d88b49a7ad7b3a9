//! services/api/src/adapters/file_store.rs
//!
//! A `SessionStore` that keeps every slot as a JSON file in one directory.
//! Writes go to a temporary file first and are renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.

use async_trait::async_trait;
use climatech_core::ports::{PortError, PortResult, SessionStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Clone, Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PortResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PortError::Unexpected(format!("invalid slot name '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn save(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

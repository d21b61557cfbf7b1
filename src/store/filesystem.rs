use std::fs;
use std::path::{Path, PathBuf};

use super::{query, BoardState, StateStore};
use crate::error::Result;

/// Board state persisted as a query string in a single file.
///
/// The file holds exactly what would follow `?` in a shareable link, so it can
/// be pasted into a browser address or copied from one.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw query string on disk, empty if the file does not exist yet.
    pub fn raw_query(&self) -> Result<String> {
        if self.path.exists() {
            Ok(fs::read_to_string(&self.path)?.trim().to_string())
        } else {
            Ok(String::new())
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStore {
    fn read(&self) -> Result<BoardState> {
        Ok(query::decode(&self.raw_query()?))
    }

    fn write(&self, state: &BoardState) -> Result<()> {
        let encoded = query::encode(&self.raw_query()?, state)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling temp file, then rename over the original.
        let temp_path = self.temp_path();
        fs::write(&temp_path, &encoded)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("wrote board state to {:?}", self.path);
        Ok(())
    }
}

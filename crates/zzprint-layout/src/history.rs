//! Print history
//!
//! Remembers which invoices were already printed by the MD5 of their file
//! content, so a renamed or moved file is still recognised. The history is
//! stored as a JSON array of hex digests.

use crate::constants::HASH_CHUNK_SIZE;
use crate::types::*;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintHistory {
    path: PathBuf,
    hashes: Vec<String>,
}

impl PrintHistory {
    /// Empty history stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hashes: Vec::new(),
        }
    }

    /// Load the history at `path`.
    ///
    /// A missing file yields an empty history. So does a corrupt one, with
    /// a warning; the next save overwrites it.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new(path)),
            Err(e) => return Err(e.into()),
        };

        let hashes = match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(hashes) => hashes,
            Err(e) => {
                log::warn!("Ignoring unreadable print history {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Ok(Self {
            path: path.to_owned(),
            hashes,
        })
    }

    /// Write the history back to its file, creating parent directories
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.hashes)
            .map_err(|e| LayoutError::History(format!("Failed to serialize history: {}", e)))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Hex MD5 of a file's content, read in fixed-size chunks
    pub async fn hash_file(path: impl AsRef<Path>) -> Result<String> {
        let mut file = tokio::fs::File::open(path.as_ref()).await?;
        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            context.consume(&buffer[..read]);
        }

        Ok(format!("{:x}", context.compute()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.iter().any(|h| h == hash)
    }

    /// Whether the file's current content was printed before
    pub async fn was_printed(&self, path: impl AsRef<Path>) -> Result<bool> {
        Ok(self.contains(&Self::hash_file(path).await?))
    }

    /// Add a digest; returns false if it was already present
    pub fn record(&mut self, hash: impl Into<String>) -> bool {
        let hash = hash.into();
        if self.contains(&hash) {
            return false;
        }
        self.hashes.push(hash);
        true
    }

    /// Hash a file and record it
    pub async fn record_file(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let hash = Self::hash_file(path).await?;
        Ok(self.record(hash))
    }

    /// Remove a digest; returns false if it was not present
    pub fn forget(&mut self, hash: &str) -> bool {
        let before = self.hashes.len();
        self.hashes.retain(|h| h != hash);
        self.hashes.len() != before
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Digests in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hashes.iter().map(String::as_str)
    }
}

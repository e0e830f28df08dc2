// Directory-backed storage.
// One file per key, written atomically, under the platform cache directory by default.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::Result;

use super::Storage;

const EXTENSION: &str = "json";

/// On-disk record: the key travels with its value since file names are digests.
#[derive(Debug, Serialize, Deserialize)]
struct StoredFile {
    key: String,
    value: String,
}

/// Storage that persists each key as a file inside a directory.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Open (creating if needed) a storage rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Get the default storage directory (~/.cache/webstash on Linux).
    pub fn default_location() -> Option<PathBuf> {
        ProjectDirs::from("", "", "webstash").map(|dirs| dirs.cache_dir().join("store"))
    }

    /// Open storage at the default location.
    pub fn open_default() -> Result<Self> {
        let root = Self::default_location().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no home directory to place the store in",
            )
        })?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names are the SHA-256 of the key, so every key fits the file
    /// system's name limit no matter its length.
    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            hex::encode(Sha256::digest(key.as_bytes())),
            EXTENSION
        ))
    }

    fn read_file(path: &Path) -> Result<StoredFile> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl Storage for DirStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let stored = Self::read_file(&path)?;
        if stored.key != key {
            warn!(key, path = %path.display(), "Storage file belongs to another key");
            return Ok(None);
        }
        Ok(Some(stored.value))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let stored = StoredFile {
            key: key.to_string(),
            value: value.to_string(),
        };

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(serde_json::to_string(&stored)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Self::read_file(&path) {
                Ok(stored) => keys.push(stored.key),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable storage file");
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

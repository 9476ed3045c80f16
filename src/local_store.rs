//! File-backed key/value store, the offline fallback for when no document
//! backend is available. One JSON blob per key; every write fully serializes
//! and overwrites the blob.
//!
//! Timestamp revival is schema-driven: the target type declares which fields
//! are dates (chrono via serde), so stored strings are never pattern-matched
//! into dates by accident.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Storage(format!("cannot open local store: {e}")))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns `default` when the key is absent or the stored blob fails to
    /// decode; never an error to the caller.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("local store read failed for {key}: {err}");
                }
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("local store decode failed for {key}: {err}");
                default
            }
        }
    }

    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let blob = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::Storage(format!("cannot encode {key}: {e}")))?;
        fs::write(self.path_for(key), blob)
            .map_err(|e| AppError::Storage(format!("cannot write {key}: {e}")))
    }
}

// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Keeps the last applied address across runs. The binary is started by a
// scheduler, runs one cycle and exits, so this file is the only memory
// between runs.
//
// ## Crash Safety
//
// - Atomic writes: new value written to `<path>.tmp`, fsynced, then renamed
//   over the state file; the directory is fsynced after the rename
// - A crash before the rename leaves the previous value in place; the next
//   cycle then re-issues an update, which is harmless
//
// ## File Format
//
// The address string and nothing else:
//
// ```text
// 203.0.113.5
// ```
//
// Surrounding whitespace is ignored when reading, so a hand-edited file
// with a trailing newline still compares equal.

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::address::Address;
use crate::traits::state_store::StateStore;
use crate::Error;

/// File-based state store
///
/// The file is read on every [`StateStore::read_last_address`] call; nothing
/// is cached, so deleting the file between runs is seen as "no prior state".
///
/// # Example
///
/// ```rust,no_run
/// use cfddns_core::state::FileStateStore;
/// use cfddns_core::traits::StateStore;
/// use cfddns_core::Address;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/cfddns/current_ip.txt").await?;
///
///     store.write_last_address(&Address::from("203.0.113.5")).await?;
///
///     let last = store.read_last_address().await?;
///     assert_eq!(last, Some(Address::from("203.0.113.5")));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a file state store
    ///
    /// Creates the parent directory if needed. The state file itself is not
    /// created until the first successful update.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(Self { path })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    ///
    /// `.tmp` is appended to the full file name, so `state.tmp` and a
    /// sibling `current_ip.tmp` are never reused as scratch files.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Flush the directory entry so the rename survives a power loss
    #[cfg(unix)]
    async fn sync_parent_dir(&self) -> Result<(), Error> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let dir = fs::File::open(parent).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to open state directory {}: {}",
                parent.display(),
                e
            ))
        })?;
        dir.sync_all().await.map_err(|e| {
            Error::state_store(format!(
                "Failed to sync state directory {}: {}",
                parent.display(),
                e
            ))
        })
    }

    #[cfg(not(unix))]
    async fn sync_parent_dir(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read_last_address(&self) -> Result<Option<Address>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("State file does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::state_store(format!(
                    "Failed to read state file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let value = content.trim();
        if value.is_empty() {
            tracing::debug!("State file is empty: {}", self.path.display());
            return Ok(None);
        }

        Ok(Some(Address::new(value)))
    }

    async fn write_last_address(&self, address: &Address) -> Result<(), Error> {
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(address.as_str().as_bytes())
                .await
                .map_err(|e| {
                    Error::state_store(format!(
                        "Failed to write to temp file {}: {}",
                        temp_path.display(),
                        e
                    ))
                })?;

            file.sync_all().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;
        self.sync_parent_dir().await?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

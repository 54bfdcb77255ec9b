use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::store::{parse_id, ContactId};

#[derive(Debug, Error)]
#[error("failed to write selection slot {}", path.display())]
pub struct SlotError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Hand-off of the "currently selected contact" between screens.
///
/// Implementations do not check that the id still exists in the store.
pub trait SelectionSlot {
    fn read(&self) -> Option<ContactId>;
    fn write(&mut self, id: Option<ContactId>) -> Result<(), SlotError>;
}

/// Slot persisted as a file holding either the decimal id or nothing.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionSlot for FileSlot {
    fn read(&self) -> Option<ContactId> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_id(&raw),
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %err, "selection slot unreadable");
                }
                None
            }
        }
    }

    fn write(&mut self, id: Option<ContactId>) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SlotError {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let content = id.map(|id| id.to_string()).unwrap_or_default();
        fs::write(&self.path, content).map_err(|source| SlotError {
            path: self.path.clone(),
            source,
        })
    }
}

/// Slot kept in process memory; nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    current: Option<ContactId>,
}

impl SelectionSlot for MemorySlot {
    fn read(&self) -> Option<ContactId> {
        self.current
    }

    fn write(&mut self, id: Option<ContactId>) -> Result<(), SlotError> {
        self.current = id;
        Ok(())
    }
}

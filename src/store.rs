use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub type ContactId = u64;

const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open contact table {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read contact table {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write contact table {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to replace contact table {}", path.display())]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no contact ids left in {}", path.display())]
    IdSpaceExhausted { path: PathBuf },
}

/// Flat CSV table of contacts, one `id,name,phone,email` row per record.
///
/// Every mutation rewrites the whole file. A missing file is an empty table.
#[derive(Debug, Clone)]
pub struct ContactStore {
    path: PathBuf,
}

impl ContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> Result<Vec<Contact>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Open {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut contacts = Vec::new();
        let mut seen = HashSet::new();
        for record in reader.records() {
            let record = record.map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);

            let Some(contact) = parse_record(&record) else {
                warn!(
                    path = %self.path.display(),
                    line,
                    fields = record.len(),
                    "skipping malformed contact row"
                );
                continue;
            };

            if !seen.insert(contact.id) {
                warn!(
                    path = %self.path.display(),
                    line,
                    id = contact.id,
                    "skipping contact row with duplicate id"
                );
                continue;
            }
            contacts.push(contact);
        }

        Ok(contacts)
    }

    pub fn load_by_id(&self, id: ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|contact| contact.id == id))
    }

    /// Overwrite the row for `id` in place, or append a new row with a fresh
    /// id when `id` is `None` or unknown. Returns the id of the written row.
    pub fn upsert(
        &self,
        id: Option<ContactId>,
        name: &str,
        phone: &str,
        email: &str,
    ) -> Result<ContactId, StoreError> {
        let mut contacts = self.load_all()?;

        let position = id.and_then(|id| contacts.iter().position(|contact| contact.id == id));
        let id = match position {
            Some(index) => {
                let contact = &mut contacts[index];
                contact.name = name.to_string();
                contact.phone = phone.to_string();
                contact.email = email.to_string();
                contact.id
            }
            None => {
                let id = next_id(&contacts).ok_or_else(|| StoreError::IdSpaceExhausted {
                    path: self.path.clone(),
                })?;
                contacts.push(Contact {
                    id,
                    name: name.to_string(),
                    phone: phone.to_string(),
                    email: email.to_string(),
                });
                id
            }
        };

        self.write_all(&contacts)?;
        Ok(id)
    }

    pub fn delete(&self, id: ContactId) -> Result<(), StoreError> {
        let mut contacts = self.load_all()?;
        let before = contacts.len();
        contacts.retain(|contact| contact.id != id);
        if contacts.len() == before {
            debug!(id, "delete of unknown contact id");
        }
        self.write_all(&contacts)
    }

    fn write_all(&self, contacts: &[Contact]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Replace {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        // Stage next to the target so the rename stays on one filesystem.
        let temp_path = self.temp_path();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&temp_path)
            .map_err(|source| StoreError::Write {
                path: temp_path.clone(),
                source,
            })?;

        for contact in contacts {
            writer.serialize(contact).map_err(|source| StoreError::Write {
                path: temp_path.clone(),
                source,
            })?;
        }
        writer.flush().map_err(|source| StoreError::Replace {
            path: temp_path.clone(),
            source,
        })?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Replace {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            rows = contacts.len(),
            "rewrote contact table"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "contacts".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }
}

/// `None` once the highest id is `ContactId::MAX`.
fn next_id(contacts: &[Contact]) -> Option<ContactId> {
    contacts
        .iter()
        .map(|contact| contact.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
}

fn parse_record(record: &csv::StringRecord) -> Option<Contact> {
    if record.len() != FIELD_COUNT {
        return None;
    }
    let id = parse_id(&record[0])?;
    Some(Contact {
        id,
        name: record[1].to_string(),
        phone: record[2].to_string(),
        email: record[3].to_string(),
    })
}

/// Ids are plain decimal digits; signs, blanks and zero are rejected.
pub fn parse_id(raw: &str) -> Option<ContactId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<ContactId>().ok().filter(|id| *id > 0)
}

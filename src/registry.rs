use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// One row of the user registry. Created on the first /start of a user and
/// never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub joined: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to serialize user registry: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to persist user registry: {0}")]
    Flush(#[source] std::io::Error),
}

/// The durable collection of users who have ever started the quiz, backed
/// by a flat JSON file that is rewritten in full on every mutation.
pub struct UserRegistry {
    path: PathBuf,
    users: Mutex<Vec<UserRecord>>,
}

impl UserRegistry {
    /// Loads the registry from disk. A missing or unreadable file starts
    /// the registry empty rather than failing the boot.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let users = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(users) => users,
                Err(e) => {
                    log::warn!(
                        "user registry {} is malformed, starting empty: {e}",
                        path.display()
                    );
                    Vec::new()
                }
            },
            Err(e) => {
                log::info!(
                    "user registry {} not readable, starting empty: {e}",
                    path.display()
                );
                Vec::new()
            }
        };

        Self {
            path,
            users: Mutex::new(users),
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.id == id)
    }

    /// Inserts the record unless the id is already known; returns whether an
    /// insertion happened. When the flush fails the in-memory insertion is
    /// kept (memory stays authoritative for the rest of the process) and the
    /// error is returned for the caller to log.
    pub fn add_if_absent(&self, record: UserRecord) -> Result<bool, RegistryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id == record.id) {
            return Ok(false);
        }

        users.push(record);
        self.flush(&users)?;
        Ok(true)
    }

    /// The last `n` registered users, in insertion order.
    pub fn list_recent(&self, n: usize) -> Vec<UserRecord> {
        let users = self.users.lock().unwrap();
        let skip = users.len().saturating_sub(n);
        users[skip..].to_vec()
    }

    /// Every registered user, in insertion order.
    pub fn snapshot(&self) -> Vec<UserRecord> {
        self.users.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn flush(&self, users: &[UserRecord]) -> Result<(), RegistryError> {
        let raw = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.path, raw).map_err(RegistryError::Flush)
    }
}

//! The locally persisted "who is logged in" slot.
//!
//! # Design
//! `SessionStore` owns the only copy of the session state and writes it
//! through a `SessionStorage` backend under the `user` key. The store is
//! created once by the composition root and mutated through `&mut self`, so
//! there is exactly one writer. Nothing here touches the network.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aventura_core::User;
use tracing::{debug, info, warn};

use crate::error::SessionError;

/// Storage key holding the serialized current user.
pub const USER_KEY: &str = "user";

/// Key/value string storage that survives restarts.
pub trait SessionStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
    /// Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform data dir>/aventura`, or `./aventura` when the platform has none.
    pub fn default_location() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aventura")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(User),
}

#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    session: Session,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Load the persisted user, if any. A corrupt or unreadable entry is
    /// dropped and the store starts anonymous.
    pub fn restore(mut storage: S) -> Self {
        let session = match storage.get(USER_KEY) {
            Ok(None) => Session::Anonymous,
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    debug!(user_id = user.id, "restored session");
                    Session::Authenticated(user)
                }
                Err(e) => {
                    warn!(error = %e, "discarding malformed session entry");
                    discard(&mut storage);
                    Session::Anonymous
                }
            },
            Err(e) => {
                warn!(error = %e, "discarding unreadable session entry");
                discard(&mut storage);
                Session::Anonymous
            }
        };
        Self { storage, session }
    }

    /// Persist `user`, then mark the session authenticated. On a storage
    /// failure the state is left unchanged.
    pub fn login(&mut self, user: User) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&user)?;
        self.storage.set(USER_KEY, &raw)?;
        info!(user_id = user.id, "logged in");
        self.session = Session::Authenticated(user);
        Ok(())
    }

    /// Forget the user. The in-memory state is anonymous afterwards even if
    /// the storage removal fails; that failure is still returned.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let removed = self.storage.remove(USER_KEY);
        if let Session::Authenticated(user) = &self.session {
            info!(user_id = user.id, "logged out");
        }
        self.session = Session::Anonymous;
        removed.map_err(SessionError::from)
    }

    pub fn current(&self) -> Option<&User> {
        match &self.session {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn discard<S: SessionStorage>(storage: &mut S) {
    if let Err(e) = storage.remove(USER_KEY) {
        warn!(error = %e, "failed to remove session entry");
    }
}

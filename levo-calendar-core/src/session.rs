//! The locally stored identity.
//!
//! Being "logged in" means a serialized `User` record exists under the
//! `user` storage key. There is no token and no expiry: login writes the
//! record, logout removes it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::constants::USER_STORAGE_KEY;
use crate::error::{CalResult, CalendarError};
use crate::model::User;

/// Raw storage for the serialized identity record.
pub trait IdentityStore: Send + Sync {
    fn read(&self) -> CalResult<Option<String>>;
    fn write(&self, contents: &str) -> CalResult<()>;
    fn remove(&self) -> CalResult<()>;
}

/// Stores the record as `<dir>/user.json`.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(dir: &Path) -> Self {
        FileIdentityStore {
            path: dir.join(format!("{}.json", USER_STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn read(&self) -> CalResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn write(&self, contents: &str) -> CalResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> CalResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the record in memory only.
#[derive(Default)]
pub struct MemoryIdentityStore {
    record: Mutex<Option<String>>,
}

impl IdentityStore for MemoryIdentityStore {
    fn read(&self) -> CalResult<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, contents: &str) -> CalResult<()> {
        *self.lock()? = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> CalResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}

impl MemoryIdentityStore {
    fn lock(&self) -> CalResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.record
            .lock()
            .map_err(|_| CalendarError::Io(std::io::Error::other("identity store lock poisoned")))
    }
}

/// The one entry point for reading, writing and clearing the local identity.
///
/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn IdentityStore>,
}

impl Session {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Session { store }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Session::new(Arc::new(FileIdentityStore::new(dir)))
    }

    pub fn in_memory() -> Self {
        Session::new(Arc::new(MemoryIdentityStore::default()))
    }

    /// The stored user, if any. A record that no longer parses is an error,
    /// not an absent user.
    pub fn get_local_user(&self) -> CalResult<Option<User>> {
        match self.store.read()? {
            Some(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            None => Ok(None),
        }
    }

    pub fn set_local_user(&self, user: &User) -> CalResult<()> {
        let contents = serde_json::to_string(user)?;
        self.store.write(&contents)
    }

    pub fn clear(&self) -> CalResult<()> {
        self.store.remove()
    }

    /// Id sent with mutating event calls.
    pub fn user_id(&self) -> CalResult<Option<i64>> {
        Ok(self.get_local_user()?.map(|u| u.id))
    }

    pub fn require_user(&self) -> CalResult<User> {
        self.get_local_user()?.ok_or(CalendarError::NotLoggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User {
            id: 42,
            email: "ada@example.com".into(),
            events: Vec::new(),
        }
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::in_dir(dir.path());

        assert_eq!(session.get_local_user().unwrap(), None);

        session.set_local_user(&ada()).unwrap();
        assert!(dir.path().join("user.json").exists());
        assert_eq!(session.get_local_user().unwrap(), Some(ada()));
        assert_eq!(session.user_id().unwrap(), Some(42));

        session.clear().unwrap();
        assert_eq!(session.get_local_user().unwrap(), None);
        assert!(!dir.path().join("user.json").exists());
    }

    #[test]
    fn clear_without_record_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::in_dir(&dir.path().join("missing"));
        session.clear().unwrap();
    }

    #[test]
    fn malformed_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user.json"), "{not json").unwrap();

        let session = Session::in_dir(dir.path());
        let err = session.get_local_user().unwrap_err();
        assert!(matches!(err, CalendarError::Serialization(_)));
    }

    #[test]
    fn clones_share_the_store() {
        let session = Session::in_memory();
        let other = session.clone();

        session.set_local_user(&ada()).unwrap();
        assert_eq!(other.user_id().unwrap(), Some(42));

        other.clear().unwrap();
        assert!(matches!(session.require_user(), Err(CalendarError::NotLoggedIn)));
    }
}

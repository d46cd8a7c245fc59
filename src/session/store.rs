use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, watch};

use super::storage::{Storage, StorageError, StorageEvent, TOKEN_KEY, USER_KEY};
use crate::models::{Profile, Session};

/// Owner of the client session. Persists token and profile under two fixed
/// keys and publishes the current profile to subscribers.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    user: RwLock<Option<Profile>>,
    changes: watch::Sender<Option<Profile>>,
}

impl SessionStore {
    /// Restore from storage. The profile is only loaded when a token sits next to it.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let user = match (storage.get(TOKEN_KEY), storage.get(USER_KEY)) {
            (Ok(Some(_)), Ok(Some(raw))) => match serde_json::from_str::<Profile>(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("discarding unreadable stored profile: {}", e);
                    None
                }
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("could not read stored session: {}", e);
                None
            }
            _ => None,
        };

        let (changes, _) = watch::channel(user.clone());
        Self {
            storage,
            user: RwLock::new(user),
            changes,
        }
    }

    /// Replace token and profile in one step.
    pub fn set(&self, token: &str, user: Profile) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&user)?;
        self.storage
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, raw.as_str())])?;

        *self.user.write().map_err(|_| StorageError::Poisoned)? = Some(user.clone());
        self.changes.send_replace(Some(user));
        tracing::info!("session stored");
        Ok(())
    }

    /// Remove both keys and notify subscribers with `None`.
    pub fn clear(&self) -> Result<(), StorageError> {
        let result = self.storage.remove_many(&[TOKEN_KEY, USER_KEY]);

        // Memory state goes even if the durable write failed, so nothing keeps using it.
        if let Ok(mut user) = self.user.write() {
            *user = None;
        }
        self.changes.send_replace(None);
        tracing::info!("session cleared");
        result
    }

    pub fn get(&self) -> Session {
        Session {
            token: self.token(),
            user: self.current_user(),
        }
    }

    /// Current token as persisted; re-read every call so external edits are visible.
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("could not read token: {}", e);
                None
            }
        }
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.user.read().ok().and_then(|user| user.clone())
    }

    /// Local check only: a token exists. Says nothing about backend acceptance.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Profile updates. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.changes.subscribe()
    }

    /// External storage mutations, for the session monitor.
    pub fn storage_events(&self) -> broadcast::Receiver<StorageEvent> {
        self.storage.subscribe()
    }
}

/// Shallow validity check: present and non-empty. No signature or expiry check.
pub fn is_token_valid(token: Option<&str>) -> bool {
    matches!(token, Some(t) if !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;

    fn profile() -> Profile {
        Profile {
            id: 1,
            full_name: "Ana Pérez".into(),
            email: "ana@example.com".into(),
        }
    }

    #[test]
    fn test_set_and_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        assert!(!store.is_authenticated());

        store.set("tok", profile()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.get(), Session::new("tok", profile()));
        assert!(storage.get(USER_KEY).unwrap().unwrap().contains("fullName"));

        store.clear().unwrap();
        assert_eq!(store.get(), Session::default());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_authentication_is_token_presence() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        // Any token counts, even one the backend would reject.
        storage.set(TOKEN_KEY, "definitely-expired").unwrap();
        assert!(store.is_authenticated());
        assert!(store.current_user().is_none());

        storage.silent_remove(TOKEN_KEY).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_restore_requires_token_and_profile() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(USER_KEY, &serde_json::to_string(&profile()).unwrap())
            .unwrap();
        assert!(SessionStore::new(storage.clone()).current_user().is_none());

        storage.set(TOKEN_KEY, "tok").unwrap();
        assert_eq!(SessionStore::new(storage).current_user(), Some(profile()));
    }

    #[test]
    fn test_subscribers_see_login_and_clear() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let rx = store.subscribe();
        assert!(rx.borrow().is_none());

        store.set("tok", profile()).unwrap();
        assert_eq!(*rx.borrow(), Some(profile()));

        store.clear().unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_token_validity_is_shallow() {
        assert!(!is_token_valid(None));
        assert!(!is_token_valid(Some("")));
        assert!(is_token_valid(Some("x")));
    }
}

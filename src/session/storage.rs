use notify::{Event, PollWatcher, RecursiveMode, Watcher};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Key holding the serialized profile.
pub const USER_KEY: &str = "current_user";

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A mutation made by someone other than this process (another CLI
/// invocation, a user editing the file by hand).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// Durable string key/value storage for client session state.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Write several entries in one step.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Notifications for external mutations only; own writes are not echoed.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// In-process storage. `external_set`/`external_remove` stand in for a
/// second client touching the same storage.
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    pub fn external_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set(key, value)?;
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    pub fn external_remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove(key)?;
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            new_value: None,
        });
        Ok(())
    }

    /// Mutate without any notification, like a write the platform never reports.
    pub fn silent_remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove(key)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in items {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

type Snapshot = BTreeMap<String, String>;

/// JSON file storage (`session.json`). A poll watcher on the parent
/// directory turns changes made by other processes into [`StorageEvent`]s.
pub struct FileStorage {
    path: PathBuf,
    // Last contents this process wrote or observed; used to tell own writes from external ones.
    known: Arc<Mutex<Snapshot>>,
    events: broadcast::Sender<StorageEvent>,
    watcher: Mutex<Option<PollWatcher>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let known = Arc::new(Mutex::new(read_snapshot(&path)?));
        Ok(Self {
            path,
            known,
            events,
            watcher: Mutex::new(None),
        })
    }

    /// Open and start watching the file for external changes.
    pub fn open_watched(path: impl Into<PathBuf>, poll_interval: Duration) -> Result<Self, StorageError> {
        let storage = Self::open(path)?;
        let watch_dir = storage
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&watch_dir)?;

        let file = storage.path.clone();
        let known = Arc::clone(&storage.known);
        let events = storage.events.clone();

        let config = notify::Config::default().with_poll_interval(poll_interval);
        let mut watcher = PollWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) if event.paths.iter().any(|p| p == &file) => {
                    if let Err(e) = publish_external_changes(&file, &known, &events) {
                        tracing::warn!("failed to reload {}: {}", file.display(), e);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("session file watch error: {}", e),
            },
            config,
        )?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        *storage.watcher.lock().map_err(|_| StorageError::Poisoned)? = Some(watcher);
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut known = self.known.lock().map_err(|_| StorageError::Poisoned)?;
        let mut current = read_snapshot(&self.path)?;
        mutate(&mut current);
        write_snapshot(&self.path, &current)?;
        *known = current;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(read_snapshot(&self.path)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn set_many(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|entries| {
            for (key, value) in items {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot, StorageError> {
    if !path.exists() {
        return Ok(Snapshot::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Snapshot::new());
    }

    match serde_json::from_str(&content) {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => {
            // A hand-mangled file reads as empty storage rather than a hard failure.
            tracing::warn!("ignoring unreadable session file {}: {}", path.display(), e);
            Ok(Snapshot::new())
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn publish_external_changes(
    path: &Path,
    known: &Mutex<Snapshot>,
    events: &broadcast::Sender<StorageEvent>,
) -> Result<(), StorageError> {
    // Hold the lock across the read so an own write cannot land in between.
    let mut known = known.lock().map_err(|_| StorageError::Poisoned)?;
    let current = read_snapshot(path)?;

    for change in diff_snapshots(&known, &current) {
        tracing::debug!("external change to '{}'", change.key);
        let _ = events.send(change);
    }

    *known = current;
    Ok(())
}

fn diff_snapshots(before: &Snapshot, after: &Snapshot) -> Vec<StorageEvent> {
    let mut changes = Vec::new();

    for (key, old) in before {
        match after.get(key) {
            Some(new) if new == old => {}
            new => changes.push(StorageEvent {
                key: key.clone(),
                new_value: new.cloned(),
            }),
        }
    }
    for (key, new) in after {
        if !before.contains_key(key) {
            changes.push(StorageEvent {
                key: key.clone(),
                new_value: Some(new.clone()),
            });
        }
    }

    changes
}

pub mod guard;
pub mod monitor;
pub mod storage;
pub mod store;

pub use guard::GuardDecision;
pub use monitor::{InvalidationCause, SessionMonitor};
pub use storage::{
    FileStorage, MemoryStorage, Storage, StorageError, StorageEvent, TOKEN_KEY, USER_KEY,
};
pub use store::{is_token_valid, SessionStore};

//! Authentication and session management

pub mod models;
pub mod session;
pub mod storage;

pub use models::{roles, Credentials, LoginResponse, Profile, SessionEvent};
pub use session::{AuthBackend, SessionSnapshot, SessionStore, SubscriptionId};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};

use crate::config::{SessionConfig, StorageKind};

/// Build the session store described by the `[session]` config section
pub fn open_session_store(config: &SessionConfig) -> SessionStore {
    match config.storage {
        StorageKind::File => {
            let path = config.resolved_path();
            tracing::debug!(path = %path.display(), "Using file session storage");
            SessionStore::new(FileStorage::new(path))
        }
        StorageKind::Memory => SessionStore::new(MemoryStorage::new()),
    }
}

//! Save/load persistence
//!
//! A single JSON blob under one key. Reads never fail the game: a missing or
//! corrupt blob falls back to defaults with a warning.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// LocalStorage key for the saved game
pub const STORAGE_KEY: &str = "fob_arena";

/// Persistent key-value capability (one blob)
pub trait Store {
    /// Previously saved blob, if any
    fn load(&self) -> Option<String>;

    fn save(&mut self, blob: &str);
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
    /// Number of saves so far
    pub writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            writes: 0,
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Option<String> {
        self.blob.clone()
    }

    fn save(&mut self, blob: &str) {
        self.blob = Some(blob.to_string());
        self.writes += 1;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{STORAGE_KEY, Store};

    /// Browser LocalStorage
    #[derive(Debug, Clone, Default)]
    pub struct LocalStore;

    impl LocalStore {
        fn storage() -> Option<web_sys::Storage> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
        }
    }

    impl Store for LocalStore {
        fn load(&self) -> Option<String> {
            Self::storage()?.get_item(STORAGE_KEY).ok().flatten()
        }

        fn save(&mut self, blob: &str) {
            if let Some(storage) = Self::storage() {
                if storage.set_item(STORAGE_KEY, blob).is_err() {
                    log::warn!("LocalStorage write failed");
                }
            }
        }
    }
}

/// Persistence failure
#[derive(Debug)]
pub enum PersistError {
    Json(serde_json::Error),
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for PersistError {}

/// Decode the stored blob.
///
/// `Ok(None)` when nothing (or JSON `null`) was saved.
pub fn read<T: DeserializeOwned, S: Store + ?Sized>(store: &S) -> Result<Option<T>, PersistError> {
    let Some(json) = store.load() else {
        return Ok(None);
    };
    Ok(serde_json::from_str::<Option<T>>(&json)?)
}

/// Decode the stored blob, falling back to the default on any problem
pub fn read_or_default<T: DeserializeOwned + Default, S: Store + ?Sized>(store: &S) -> T {
    match read(store) {
        Ok(Some(value)) => value,
        Ok(None) => {
            log::info!("No saved game found, starting fresh");
            T::default()
        }
        Err(e) => {
            log::warn!("Discarding unreadable save: {}", e);
            T::default()
        }
    }
}

pub fn write<T: Serialize, S: Store + ?Sized>(store: &mut S, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    store.save(&json);
    Ok(())
}

//! Persistence seam and the typed state stored behind it.
//!
//! Planner state lives under four keys, each a JSON document. Reads are
//! forgiving: a value that is missing or does not parse is treated as absent
//! and the caller gets the default.

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

use crate::database::DatabaseError;
use crate::models::{DailyLogEntry, Task, View};

pub const TASKS_KEY: &str = "tasks";
pub const SESSION_DATE_KEY: &str = "session_date";
pub const VIEW_KEY: &str = "view";
pub const LOGS_KEY: &str = "logs";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous load/save by key
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// Volatile store, used in tests and for `--ephemeral` runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load and decode a JSON value, `None` when absent or unreadable
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted value, using default");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding malformed persisted value");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &raw)
}

/// Everything read at startup, already defaulted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub tasks: Vec<Task>,
    pub session_date: Option<NaiveDate>,
    pub view: Option<View>,
    pub logs: Vec<DailyLogEntry>,
}

impl PersistedState {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let session_date = load_json::<String>(store, SESSION_DATE_KEY).and_then(|s| {
            crate::time::parse_date(&s)
                .map_err(|e| tracing::warn!(value = %s, error = %e, "discarding malformed session date"))
                .ok()
        });

        Self {
            tasks: load_json(store, TASKS_KEY).unwrap_or_default(),
            session_date,
            view: load_json(store, VIEW_KEY),
            logs: load_json(store, LOGS_KEY).unwrap_or_default(),
        }
    }
}

pub fn save_tasks(store: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<(), StorageError> {
    save_json(store, TASKS_KEY, tasks)
}

pub fn save_session_date(store: &mut dyn KeyValueStore, date: NaiveDate) -> Result<(), StorageError> {
    save_json(store, SESSION_DATE_KEY, &crate::time::date_string(date))
}

pub fn save_view(store: &mut dyn KeyValueStore, view: View) -> Result<(), StorageError> {
    save_json(store, VIEW_KEY, &view)
}

pub fn save_logs(store: &mut dyn KeyValueStore, logs: &[DailyLogEntry]) -> Result<(), StorageError> {
    save_json(store, LOGS_KEY, logs)
}

//! Session store: the signed-in user record mirrored to local storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the route guard and the session coordinator. Loaded once at
//! startup and mutated only through `set` and `clear`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::storage::{Storage, StorageError};
use crate::net::types::User;

/// Local storage key holding the serialized record.
pub const SESSION_KEY: &str = "user";

/// Client-held representation of the authenticated user.
///
/// Opaque JSON object; only `id` carries meaning here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord(Map<String, Value>);

impl SessionRecord {
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the record carries a truthy identifier.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        self.id().is_some_and(is_truthy)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Error returned when a non-object value is offered as a session record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("session record must be a JSON object")]
pub struct NotAnObject;

impl TryFrom<Value> for SessionRecord {
    type Error = NotAnObject;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(NotAnObject),
        }
    }
}

impl From<Map<String, Value>> for SessionRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<&User> for SessionRecord {
    fn from(user: &User) -> Self {
        let mut map = Map::new();
        map.insert("id".to_owned(), Value::from(user.id));
        map.insert("username".to_owned(), Value::from(user.username.clone()));
        map.insert("email".to_owned(), Value::from(user.email.clone()));
        map.insert("created_at".to_owned(), user.created_at.clone().map_or(Value::Null, Value::from));
        Self(map)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Shared handle to the session record. Clones observe the same record.
#[derive(Clone)]
pub struct SessionStore {
    record: Arc<RwLock<SessionRecord>>,
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Rehydrate from `storage`. Missing, unreadable, or malformed entries
    /// start an empty session.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let record = match storage.get_item(SESSION_KEY) {
            Ok(Some(raw)) => parse_record(&raw),
            Ok(None) => SessionRecord::default(),
            Err(error) => {
                tracing::warn!(%error, "session storage unreadable; starting signed out");
                SessionRecord::default()
            }
        };
        Self { record: Arc::new(RwLock::new(record)), storage }
    }

    /// Snapshot of the current record.
    #[must_use]
    pub fn user(&self) -> SessionRecord {
        self.record.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the record and persist it.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the record cannot be persisted. The
    /// in-memory record is replaced regardless.
    pub fn set(&self, record: SessionRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&record)?;
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = record;
        self.storage.set_item(SESSION_KEY, &raw)
    }

    /// Reset to an empty record and drop the persisted copy.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the persisted copy cannot be removed.
    /// The in-memory record is cleared regardless.
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = SessionRecord::default();
        self.storage.remove_item(SESSION_KEY)
    }

    /// Whether a signed-in user is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.record.read().unwrap_or_else(PoisonError::into_inner).has_identity()
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

fn parse_record(raw: &str) -> SessionRecord {
    match serde_json::from_str::<Value>(raw).map(SessionRecord::try_from) {
        Ok(Ok(record)) => record,
        Ok(Err(NotAnObject)) => {
            tracing::warn!("persisted session is not an object; starting signed out");
            SessionRecord::default()
        }
        Err(error) => {
            tracing::warn!(%error, "persisted session is malformed; starting signed out");
            SessionRecord::default()
        }
    }
}

//! Client-held state and its local persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` is the `localStorage` stand-in; `session` is the only state
//! that lives in it.

pub mod session;
pub mod storage;

pub use session::{SESSION_KEY, SessionRecord, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

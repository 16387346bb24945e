//! Client layer for the address book service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` wraps the REST API behind one interceptor-equipped client, `state`
//! holds the session record and its local persistence, `router` guards
//! navigation on session state, and `session` ties the three together.

pub mod config;
pub mod net;
pub mod notify;
pub mod router;
pub mod session;
pub mod state;

pub use config::{ClientConfig, ConfigError};
pub use net::{ApiClient, ApiError, HttpTransport, Transport};
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use router::{Location, Navigation, Route, Router};
pub use session::{Session, SessionError};
pub use state::{FileStorage, MemoryStorage, SessionRecord, SessionStore, Storage, StorageError};

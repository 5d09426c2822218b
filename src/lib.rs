//! JSON-file-backed record store for a small salon booking backend, plus the
//! REST API that sits on top of it.
//!
//! The whole datastore is one JSON document with three collections
//! (`services`, `appointments`, `users`). [`RecordStore`] loads it once,
//! serves reads from memory and rewrites the file after every mutation.
//!
//! ```rust,no_run
//! use salon_store::RecordStore;
//! use serde_json::{json, Map, Value};
//!
//! let store = RecordStore::open("db.json").unwrap();
//! let fields: Map<String, Value> = json!({"service": 1, "date": "2024-05-01"})
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//! let appt = store.create_appointment(fields).unwrap();
//! assert!(appt.id().is_some());
//! ```
//!
//! **Single-process only.** Mutations within one process are serialized, but
//! two processes pointed at the same file will overwrite each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod logging;
pub mod lookup;
pub mod persist;
pub mod serializer;
pub mod store;

pub use auth::{AuthConfig, TokenIssuer};
pub use document::{Appointment, Document, Record, Service, User, UserView};
pub use error::{Error, Result};
pub use store::{RecordStore, RecordStoreBuilder, Session};

//! Core store type and builder.

use crate::auth::{self, AuthConfig, TokenIssuer};
use crate::document::{Appointment, Document, Record, Service, User, UserView, CREATED_AT, ID};
use crate::error::{Error, Result};
use crate::lookup::loose_eq;
use crate::persist::{atomic_write, load_or_empty};
use crate::serializer::{JsonSerializer, Serializer};
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Role given to self-registered users.
pub const DEFAULT_ROLE: &str = "customer";

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// The authenticated user, password left out.
    pub user: UserView,
    /// Session token for the user.
    pub token: String,
}

/// JSON-file-backed record store for services, appointments and users.
///
/// Loads the backing file once, serves reads from memory, and rewrites the
/// whole file after every mutation. One mutex guards the document for the
/// full append-serialize-write sequence, so concurrent mutations can neither
/// lose an append in memory nor clobber each other's write on disk.
///
/// A mutation whose write fails is **not** rolled back: the record stays in
/// memory and the caller gets [`Error::Persistence`].
pub struct RecordStore {
    doc: Mutex<Document>,
    path: PathBuf,
    serializer: JsonSerializer,
    auth: AuthConfig,
    tokens: TokenIssuer,
}

impl RecordStore {
    /// Open the store at `path` with pretty output and default credentials.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a new store. Call [`.build()`](RecordStoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> RecordStoreBuilder {
        RecordStoreBuilder::new(path)
    }

    // ---- reads ----

    /// All services, in file order.
    #[must_use]
    pub fn list_services(&self) -> Vec<Service> {
        self.doc.lock().services.clone()
    }

    /// The first service whose `id` loosely equals `id`.
    pub fn get_service(&self, id: &str) -> Result<Service> {
        self.doc
            .lock()
            .services
            .iter()
            .find(|s| s.id().is_some_and(|v| loose_eq(v, id)))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                collection: "services",
                id: id.to_owned(),
            })
    }

    /// Number of services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.doc.lock().services.len()
    }

    /// All appointments, oldest first.
    #[must_use]
    pub fn list_appointments(&self) -> Vec<Appointment> {
        self.doc.lock().appointments.clone()
    }

    /// All users, oldest first. Passwords included, as stored.
    #[must_use]
    pub fn list_users(&self) -> Vec<User> {
        self.doc.lock().users.clone()
    }

    /// Copy of the whole in-memory document.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.doc.lock().clone()
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---- writes ----

    /// Append an appointment built from `fields` and persist.
    ///
    /// `id` and `createdAt` are always store-assigned; caller values for
    /// either are overwritten.
    #[instrument(skip(self, fields), fields(path = %self.path.display()))]
    pub fn create_appointment(&self, fields: Map<String, Value>) -> Result<Appointment> {
        let record = stamp(fields);
        let mut doc = self.doc.lock();
        doc.appointments.push(record.clone());
        self.write_locked(&doc)?;
        info!(id = %id_of(&record), "appointment_created");
        Ok(record)
    }

    /// Append a user built from `fields` and persist. No uniqueness check and
    /// no password handling: the fields are stored as given.
    #[instrument(skip(self, fields), fields(path = %self.path.display()))]
    pub fn create_user(&self, fields: Map<String, Value>) -> Result<User> {
        let record = stamp(fields);
        let mut doc = self.doc.lock();
        doc.users.push(record.clone());
        self.write_locked(&doc)?;
        info!(id = %id_of(&record), "user_created");
        Ok(record)
    }

    /// Register a customer. Fails with [`Error::Conflict`] if any user already
    /// has exactly this `email`.
    #[instrument(skip(self, name, email, password), fields(email = %email))]
    pub fn register_user(&self, name: &str, email: &str, password: &str) -> Result<UserView> {
        let stored_password = auth::store_password(&self.auth, password)?;

        let mut fields = Map::new();
        fields.insert("name".into(), name.into());
        fields.insert("email".into(), email.into());
        fields.insert("password".into(), stored_password.into());
        fields.insert("role".into(), DEFAULT_ROLE.into());
        let record = stamp(fields);

        let mut doc = self.doc.lock();
        if doc.users.iter().any(|u| u.str_field("email") == Some(email)) {
            debug!("email already registered");
            return Err(Error::Conflict {
                email: email.to_owned(),
            });
        }
        doc.users.push(record.clone());
        self.write_locked(&doc)?;
        info!(id = %id_of(&record), "user_registered");
        Ok(UserView::from(&record))
    }

    /// Log in with an exact email and password match.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        // Hash verification is slow; check candidates outside the lock.
        let candidates: Vec<User> = self
            .doc
            .lock()
            .users
            .iter()
            .filter(|u| u.str_field("email") == Some(email))
            .cloned()
            .collect();
        let user = candidates
            .iter()
            .find(|u| {
                u.str_field("password")
                    .is_some_and(|stored| auth::verify_password(stored, password))
            })
            .map(UserView::from)
            .ok_or(Error::Unauthorized)?;
        let token = self.tokens.issue(&user)?;
        debug!(id = %user.id_text(), "login_succeeded");
        Ok(Session { user, token })
    }

    /// The issuer used for login tokens.
    #[must_use]
    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }

    // ---- persistence ----

    /// Rewrite the backing file from the current document.
    pub fn flush(&self) -> Result<()> {
        let doc = self.doc.lock();
        self.write_locked(&doc)
    }

    // ---- internal ----

    fn write_locked(&self, doc: &Document) -> Result<()> {
        let result = self
            .serializer
            .serialize(doc)
            .and_then(|bytes| atomic_write(&self.path, &bytes));
        match &result {
            Ok(()) => debug!(path = %self.path.display(), "document_persisted"),
            Err(e) => error!(
                path = %self.path.display(),
                error = %e,
                "document write failed; in-memory state is ahead of disk"
            ),
        }
        result
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("serializer", &self.serializer)
            .finish_non_exhaustive()
    }
}

/// Fresh record laid out as `{id, ...fields, createdAt}`. Caller values under
/// `id` or `createdAt` are dropped in favour of the store's.
fn stamp(fields: Map<String, Value>) -> Record {
    let mut out = Map::with_capacity(fields.len() + 2);
    out.insert(ID.into(), uuid::Uuid::new_v4().to_string().into());
    for (k, v) in fields {
        if k != ID && k != CREATED_AT {
            out.insert(k, v);
        }
    }
    out.insert(CREATED_AT.into(), now_iso().into());
    Record::new(out)
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn id_of(record: &Record) -> String {
    record.id().map(Value::to_string).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`RecordStore`].
///
/// ```rust,no_run
/// use salon_store::RecordStore;
///
/// let store = RecordStore::builder("db.json")
///     .pretty(true)
///     .build()
///     .unwrap();
/// println!("{} services", store.service_count());
/// ```
#[derive(Debug)]
pub struct RecordStoreBuilder {
    path: PathBuf,
    pretty: bool,
    auth: AuthConfig,
}

impl RecordStoreBuilder {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: true,
            auth: AuthConfig::default(),
        }
    }

    /// Write human-readable JSON with 2-space indentation (default: `true`).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Password hashing and token settings.
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Load the backing file and return the store.
    ///
    /// A file that is missing, unreadable or not a valid document leaves the
    /// store empty; that is logged, not returned. Only configuration problems
    /// are errors.
    pub fn build(self) -> Result<RecordStore> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Config("store path is empty".into()));
        }
        if self.auth.jwt_secret.is_some() && self.auth.token_ttl_hours <= 0 {
            return Err(Error::Config("token ttl must be positive".into()));
        }

        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::compact()
        };

        let (doc, load_error) = load_or_empty(&self.path, &serializer);
        match load_error {
            Some(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "could not load document; starting with an empty one"
            ),
            None => info!(
                path = %self.path.display(),
                services = doc.services.len(),
                appointments = doc.appointments.len(),
                users = doc.users.len(),
                "document loaded"
            ),
        }

        let tokens = TokenIssuer::from_config(&self.auth);
        Ok(RecordStore {
            doc: Mutex::new(doc),
            path: self.path,
            serializer,
            auth: self.auth,
            tokens,
        })
    }
}

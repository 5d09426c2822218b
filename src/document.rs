//! The persisted document and the records it holds.
//!
//! Records are open JSON objects: apart from the fields the store assigns
//! (`id`, `createdAt`) and the handful that registration and login read
//! (`email`, `password`, `name`, `role`), whatever the caller sends is kept
//! as-is, in the order it was sent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Field holding a record's store-assigned id.
pub const ID: &str = "id";
/// Field holding a record's creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Root object of the backing file.
///
/// Missing or `null` collections deserialize as empty, and collection entries
/// that are not JSON objects are skipped. Top-level keys other than the three
/// collections are carried in `extra` so a rewrite never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Catalogue of salon services. Read-only through the store.
    #[serde(default, deserialize_with = "collection")]
    pub services: Vec<Service>,
    /// Booked appointments.
    #[serde(default, deserialize_with = "collection")]
    pub appointments: Vec<Appointment>,
    /// Registered users.
    #[serde(default, deserialize_with = "collection")]
    pub users: Vec<User>,
    /// Any other top-level keys found in the file.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single JSON object stored in one of the collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

/// Entry of the `services` collection.
pub type Service = Record;
/// Entry of the `appointments` collection.
pub type Appointment = Record;
/// Entry of the `users` collection.
pub type User = Record;

impl Record {
    /// Wrap an existing JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The record's `id`, if it has one. May be a string or a number.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID)
    }

    /// The record's `createdAt` timestamp, if present and a string.
    #[must_use]
    pub fn created_at(&self) -> Option<&str> {
        self.str_field(CREATED_AT)
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of `key` when it is a JSON string.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Borrow the underlying object.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn collection<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(Record(fields)),
            _ => None,
        })
        .collect())
}

/// A user with the password left out. This is the only shape of a user
/// that registration and login ever hand back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    /// Store-assigned id.
    pub id: Value,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role, `"customer"` for self-registered users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().cloned().unwrap_or(Value::Null),
            name: user.str_field("name").map(str::to_owned),
            email: user.str_field("email").map(str::to_owned),
            role: user.str_field("role").map(str::to_owned),
        }
    }
}

impl UserView {
    /// The id rendered as plain text (`"42"` rather than `42` or `"\"42\""`).
    #[must_use]
    pub fn id_text(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

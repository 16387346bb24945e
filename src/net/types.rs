//! Wire DTOs for the address book REST API.
//!
//! DESIGN
//! ======
//! Field names mirror the server's JSON so serde round-trips stay lossless.
//! Response envelopes keep the optional `message` the server attaches to
//! mutations; callers that only want the payload use the accessor methods.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier for users, contacts, and contact methods.
pub type Id = i64;

/// An account as returned by the `/auth/*` endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    /// ISO 8601 creation timestamp, if the server recorded one.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A contact owned by the current user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Contact methods; the server omits these on some summary views.
    #[serde(default)]
    pub methods: Vec<ContactMethod>,
}

/// One way of reaching a contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMethod {
    pub id: Id,
    pub contact_id: Id,
    #[serde(rename = "type")]
    pub kind: MethodKind,
    pub value: String,
}

/// Contact method categories accepted by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Phone,
    Email,
    Address,
    Social,
}

impl MethodKind {
    pub const ALL: [Self; 4] = [Self::Phone, Self::Email, Self::Address, Self::Social];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::Social => "social",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown contact method type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid contact method type '{0}' (expected phone, email, address, or social)")]
pub struct UnknownMethodKind(pub String);

impl FromStr for MethodKind {
    type Err = UnknownMethodKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownMethodKind(raw.to_owned()))
    }
}

// =============================================================================
// REQUEST PAYLOADS
// =============================================================================

/// Body for `POST /contacts`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewContact {
    pub name: String,
    pub is_favorite: bool,
    pub methods: Vec<NewContactMethod>,
}

/// Body for `PUT /contacts/{id}`. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Body for `POST /contacts/{id}/methods`, also embedded in [`NewContact`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewContactMethod {
    #[serde(rename = "type")]
    pub kind: MethodKind,
    pub value: String,
}

/// Filters for `GET /contacts`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactQuery {
    /// Only return favorites.
    pub favorite: bool,
    /// Case-insensitive name substring.
    pub search: Option<String>,
}

impl ContactQuery {
    /// Query-string pairs in the form the server reads them.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.favorite {
            pairs.push(("favorite".to_owned(), "true".to_owned()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search".to_owned(), search.to_owned()));
        }
        pairs
    }
}

/// Body for `POST /auth/login`. `username` also accepts an email address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A file to upload through `POST /import`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// RESPONSE ENVELOPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub contact: Contact,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub method: ContactMethod,
    pub contact: Contact,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Binary spreadsheet returned by `GET /export`, held as one buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    /// Filename suggested by `Content-Disposition`, if any.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Extract the `filename` parameter from a `Content-Disposition` header.
///
/// Prefers the RFC 5987 `filename*=UTF-8''...` form when present.
#[must_use]
pub fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    for param in disposition_params(header) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value.split_once("''").map_or(value, |(_, rest)| rest);
                if let Some(decoded) = extended_value(encoded) {
                    return Some(decoded);
                }
            }
            "filename" => plain = Some(unquote(value)),
            _ => {}
        }
    }
    plain.filter(|name| !name.is_empty())
}

/// Split header parameters on `;` outside quoted strings.
fn disposition_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(header[start..].trim());
    params
}

fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return value.to_owned();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Decode an RFC 5987 value. Malformed escapes or non-UTF-8 bytes yield `None`.
fn extended_value(encoded: &str) -> Option<String> {
    let well_formed = encoded
        .split('%')
        .skip(1)
        .all(|chunk| chunk.get(..2).is_some_and(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit())));
    if !well_formed {
        return None;
    }
    urlencoding::decode(encoded).ok().map(Cow::into_owned).filter(|s| !s.is_empty())
}

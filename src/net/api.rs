//! Typed wrappers for every address book endpoint.
//!
//! Request construction is kept in plain functions so paths and methods can
//! be checked without a transport; the async methods on `ApiClient` only
//! send and decode.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{ApiRequest, Transport};
use super::types::{
    AuthEnvelope, ContactEnvelope, ContactList, ContactQuery, ContactUpdate, Credentials, ExportFile, Health, Id,
    ImportFile, ImportSummary, MessageEnvelope, MethodEnvelope, NewContact, NewContactMethod, Registration, User,
    disposition_filename,
};

/// Multipart field the server reads the uploaded spreadsheet from.
pub const IMPORT_FIELD: &str = "file";

fn contact_path(id: Id) -> String {
    format!("/contacts/{id}")
}

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

pub fn list_contacts_request(query: &ContactQuery) -> ApiRequest {
    ApiRequest::get("/contacts").with_query(query.to_pairs())
}

/// # Errors
///
/// Returns [`ApiError::Encode`] if the payload cannot be serialized.
pub fn create_contact_request(contact: &NewContact) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("/contacts").with_json(contact)
}

pub fn get_contact_request(id: Id) -> ApiRequest {
    ApiRequest::get(contact_path(id))
}

/// # Errors
///
/// Returns [`ApiError::Encode`] if the payload cannot be serialized.
pub fn update_contact_request(id: Id, update: &ContactUpdate) -> Result<ApiRequest, ApiError> {
    ApiRequest::put(contact_path(id)).with_json(update)
}

pub fn delete_contact_request(id: Id) -> ApiRequest {
    ApiRequest::delete(contact_path(id))
}

pub fn toggle_favorite_request(id: Id) -> ApiRequest {
    ApiRequest::post(format!("/contacts/{id}/favorite"))
}

/// # Errors
///
/// Returns [`ApiError::Encode`] if the payload cannot be serialized.
pub fn add_contact_method_request(id: Id, method: &NewContactMethod) -> Result<ApiRequest, ApiError> {
    ApiRequest::post(format!("/contacts/{id}/methods")).with_json(method)
}

pub fn delete_contact_method_request(contact_id: Id, method_id: Id) -> ApiRequest {
    ApiRequest::delete(format!("/contacts/{contact_id}/methods/{method_id}"))
}

pub fn export_contacts_request() -> ApiRequest {
    ApiRequest::get("/export")
}

pub fn import_contacts_request(file: ImportFile) -> ApiRequest {
    ApiRequest::post("/import").with_file(IMPORT_FIELD, file)
}

/// # Errors
///
/// Returns [`ApiError::Encode`] if the payload cannot be serialized.
pub fn register_request(registration: &Registration) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("/auth/register").with_json(registration)
}

/// # Errors
///
/// Returns [`ApiError::Encode`] if the payload cannot be serialized.
pub fn login_request(credentials: &Credentials) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("/auth/login").with_json(credentials)
}

pub fn current_user_request() -> ApiRequest {
    ApiRequest::get("/auth/me")
}

pub fn logout_request() -> ApiRequest {
    ApiRequest::post("/auth/logout")
}

pub fn health_request() -> ApiRequest {
    ApiRequest::get("/health")
}

// =============================================================================
// CALLS
// =============================================================================

#[derive(serde::Deserialize)]
struct UserEnvelope {
    user: User,
}

/// All calls return the classified [`ApiError`] on failure, already notified.
impl<T: Transport> ApiClient<T> {
    fn built(&self, request: Result<ApiRequest, ApiError>) -> Result<ApiRequest, ApiError> {
        request.map_err(|error| self.reject(error))
    }

    pub async fn list_contacts(&self, query: &ContactQuery) -> Result<ContactList, ApiError> {
        self.json(list_contacts_request(query)).await
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<ContactEnvelope, ApiError> {
        let request = self.built(create_contact_request(contact))?;
        self.json(request).await
    }

    pub async fn get_contact(&self, id: Id) -> Result<ContactEnvelope, ApiError> {
        self.json(get_contact_request(id)).await
    }

    pub async fn update_contact(&self, id: Id, update: &ContactUpdate) -> Result<ContactEnvelope, ApiError> {
        let request = self.built(update_contact_request(id, update))?;
        self.json(request).await
    }

    pub async fn delete_contact(&self, id: Id) -> Result<MessageEnvelope, ApiError> {
        self.json(delete_contact_request(id)).await
    }

    pub async fn toggle_favorite(&self, id: Id) -> Result<ContactEnvelope, ApiError> {
        self.json(toggle_favorite_request(id)).await
    }

    pub async fn add_contact_method(&self, id: Id, method: &NewContactMethod) -> Result<MethodEnvelope, ApiError> {
        let request = self.built(add_contact_method_request(id, method))?;
        self.json(request).await
    }

    pub async fn delete_contact_method(&self, contact_id: Id, method_id: Id) -> Result<ContactEnvelope, ApiError> {
        self.json(delete_contact_method_request(contact_id, method_id)).await
    }

    /// Download the export spreadsheet as a single buffer.
    pub async fn export_contacts(&self) -> Result<ExportFile, ApiError> {
        let response = self.execute(export_contacts_request()).await?;
        Ok(ExportFile {
            filename: response.content_disposition.as_deref().and_then(disposition_filename),
            content_type: response.content_type,
            bytes: response.body,
        })
    }

    pub async fn import_contacts(&self, file: ImportFile) -> Result<ImportSummary, ApiError> {
        self.json(import_contacts_request(file)).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthEnvelope, ApiError> {
        let request = self.built(register_request(registration))?;
        self.json(request).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthEnvelope, ApiError> {
        let request = self.built(login_request(credentials))?;
        self.json(request).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.json(current_user_request()).await?;
        Ok(envelope.user)
    }

    pub async fn logout(&self) -> Result<MessageEnvelope, ApiError> {
        self.json(logout_request()).await
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.json(health_request()).await
    }
}

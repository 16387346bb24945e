//! Session coordination between the API client, store, and router.
//!
//! ARCHITECTURE
//! ============
//! The HTTP layer reports authentication failure as a typed error and stops
//! there. `Session` is the one place that reacts to it: it clears the store
//! and sends the router to `/login`, whatever route issued the call.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::ApiClient;
use crate::net::error::ApiError;
use crate::net::transport::Transport;
use crate::net::types::{Credentials, Registration, User};
use crate::router::{Location, Route, Router};
use crate::state::session::{SessionRecord, SessionStore};
use crate::state::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Explicitly constructed session context. Owns the router and a handle to
/// the session store; pass it to whatever needs either.
pub struct Session {
    store: SessionStore,
    router: Router,
}

impl Session {
    pub fn new(store: SessionStore) -> Self {
        Self { store, router: Router::new() }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Navigate to `path` through the route guard.
    pub fn navigate(&mut self, path: &str) -> Location {
        let authenticated = self.store.is_authenticated();
        self.router.navigate(path, authenticated).clone()
    }

    /// Pass an API result through, invalidating the session on a 401.
    ///
    /// # Errors
    ///
    /// Returns the original error unchanged.
    pub fn settle<R>(&mut self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        if let Err(error) = &result
            && error.is_unauthorized()
        {
            self.invalidate();
        }
        result
    }

    fn invalidate(&mut self) {
        if let Err(error) = self.store.clear() {
            tracing::warn!(%error, "failed to remove persisted session");
        }
        tracing::info!("session invalidated; redirecting to login");
        self.navigate(Route::Login.path());
    }

    fn sign_in(&mut self, user: &User) -> Result<(), StorageError> {
        self.store.set(SessionRecord::from(user))?;
        tracing::info!(user_id = user.id, username = %user.username, "signed in");
        self.navigate(Route::Home.path());
        Ok(())
    }

    /// Log in and store the returned user as the session record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the server rejects the login and
    /// [`SessionError::Storage`] if the session cannot be persisted.
    pub async fn login<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        credentials: &Credentials,
    ) -> Result<User, SessionError> {
        let envelope = self.settle(api.login(credentials).await)?;
        self.sign_in(&envelope.user)?;
        Ok(envelope.user)
    }

    /// Register a new account; the server signs it in immediately.
    ///
    /// # Errors
    ///
    /// As [`Session::login`].
    pub async fn register<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        registration: &Registration,
    ) -> Result<User, SessionError> {
        let envelope = self.settle(api.register(registration).await)?;
        self.sign_in(&envelope.user)?;
        Ok(envelope.user)
    }

    /// Re-read the signed-in user from the server and refresh the record.
    ///
    /// # Errors
    ///
    /// As [`Session::login`]; a 401 also invalidates the session.
    pub async fn refresh<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<User, SessionError> {
        let user = self.settle(api.current_user().await)?;
        self.store.set(SessionRecord::from(&user))?;
        Ok(user)
    }

    /// Log out on the server and always clear the local session.
    ///
    /// # Errors
    ///
    /// Returns the server error, if any, after the local session has been
    /// cleared, or a [`StorageError`] if the persisted copy cannot be removed.
    pub async fn logout<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<(), SessionError> {
        let result = self.settle(api.logout().await);
        self.store.clear()?;
        tracing::info!("signed out");
        self.navigate(Route::Login.path());
        result?;
        Ok(())
    }
}

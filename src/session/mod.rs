//! The signed-in session: access/refresh credential pair plus who the viewer is.
//!
//! A [`Session`] is owned by the [`ApiClient`](crate::api::ApiClient) that uses it.
//! It is the only writer of the credential pair. Renewals are serialised so that
//! requests failing together with the same stale token trigger one refresh call
//! between them.

pub mod store;

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::ApiError;
use crate::models::{AuthResponse, TokenPair};
use crate::policy::ViewerRole;

pub use store::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl From<TokenPair> for Credentials {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: i64,
    pub name: String,
    pub role: ViewerRole,
}

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub credentials: Credentials,
    pub viewer: Option<Viewer>,
}

/// Exchanges a refresh token for a new credential pair.
#[async_trait]
pub trait TokenRenewer: Send + Sync {
    async fn renew(&self, refresh_token: &str) -> Result<TokenPair, ApiError>;
}

fn storage_error(e: anyhow::Error) -> ApiError {
    ApiError::Storage(format!("{e:#}"))
}

pub struct Session {
    store: Box<dyn CredentialStore>,
    current: RwLock<Option<StoredSession>>,
    renewal: Mutex<()>,
}

impl Session {
    pub fn new(store: Box<dyn CredentialStore>) -> Result<Self, ApiError> {
        let current = store.load().map_err(storage_error)?;
        Ok(Self {
            store,
            current: RwLock::new(current),
            renewal: Mutex::new(()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryCredentialStore::new()),
            current: RwLock::new(None),
            renewal: Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Option<StoredSession> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, session: Option<StoredSession>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn access_token(&self) -> Option<String> {
        self.snapshot().map(|s| s.credentials.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.snapshot().map(|s| s.credentials.refresh_token)
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.snapshot().and_then(|s| s.viewer)
    }

    pub fn role(&self) -> Option<ViewerRole> {
        self.viewer().map(|v| v.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stores the pair and viewer returned by a login-style endpoint.
    pub fn establish(&self, auth: &AuthResponse) -> Result<(), ApiError> {
        let viewer = auth.user.as_ref().and_then(|user| {
            user.role().map(|role| Viewer {
                user_id: user.user_id,
                name: user.name.clone(),
                role,
            })
        });
        let session = StoredSession {
            credentials: auth.tokens.clone().into(),
            viewer,
        };
        self.store.save(&session).map_err(storage_error)?;
        tracing::info!(
            role = session.viewer.as_ref().map(|v| v.role.as_str()),
            "session established"
        );
        self.set(Some(session));
        Ok(())
    }

    /// Swaps in a renewed pair, keeping the viewer.
    pub fn replace_tokens(&self, tokens: TokenPair) -> Result<(), ApiError> {
        let viewer = self.viewer();
        let session = StoredSession {
            credentials: tokens.into(),
            viewer,
        };
        self.store.save(&session).map_err(storage_error)?;
        self.set(Some(session));
        Ok(())
    }

    /// Drops the credentials locally and in the store.
    pub fn clear(&self) -> Result<(), ApiError> {
        self.set(None);
        self.store.clear().map_err(storage_error)
    }

    /// Renews the pair after a request failed with `stale` as its access token.
    ///
    /// Returns the access token to retry with. If another caller already
    /// replaced `stale`, its result is reused without a refresh call. A failed
    /// renewal clears the session and yields [`ApiError::SessionExpired`].
    pub async fn renew(
        &self,
        stale: Option<&str>,
        renewer: &dyn TokenRenewer,
    ) -> Result<String, ApiError> {
        let _guard = self.renewal.lock().await;

        let Some(current) = self.snapshot() else {
            return Err(ApiError::SessionExpired);
        };

        if stale != Some(current.credentials.access_token.as_str()) {
            tracing::debug!("credentials already renewed by a concurrent request");
            return Ok(current.credentials.access_token);
        }

        match renewer.renew(&current.credentials.refresh_token).await {
            Ok(tokens) => {
                let access = tokens.access_token.clone();
                self.replace_tokens(tokens)?;
                tracing::info!("access credential renewed");
                Ok(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "credential renewal failed, clearing session");
                if let Err(clear_err) = self.clear() {
                    tracing::error!(error = %clear_err, "failed to clear stored credentials");
                }
                Err(ApiError::SessionExpired)
            }
        }
    }
}

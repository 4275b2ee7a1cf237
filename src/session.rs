//! Session context carrying the bearer credential
//!
//! A `Session` is created once per console instance and handed to every
//! component that talks to the backend. It is cheap to clone; all clones share
//! the same credential, so ending the session in one place ends it everywhere.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{AppError, AppResult};

/// Lifecycle of the credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No credential has been provided yet
    Anonymous,
    Active,
    /// The user logged out
    LoggedOut,
    /// The backend rejected the credential
    Expired { reason: String },
}

#[derive(Debug)]
struct SessionInner {
    token: Option<String>,
    state: SessionState,
}

#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                token: None,
                state: SessionState::Anonymous,
            })),
        }
    }

    /// Create a session that is already logged in
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    /// Install a credential obtained at login
    pub fn login(&self, token: impl Into<String>) {
        let token = token.into();
        let mut inner = self.write();
        if token.trim().is_empty() {
            inner.token = None;
            inner.state = SessionState::Anonymous;
            return;
        }
        inner.token = Some(token);
        inner.state = SessionState::Active;
    }

    pub fn logout(&self) {
        let mut inner = self.write();
        inner.token = None;
        inner.state = SessionState::LoggedOut;
        tracing::info!("Session closed by user");
    }

    /// Drop the credential after the backend refused it
    pub fn expire(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut inner = self.write();
        inner.token = None;
        tracing::warn!(reason = %reason, "Session expired");
        inner.state = SessionState::Expired { reason };
    }

    pub fn state(&self) -> SessionState {
        self.read().state.clone()
    }

    pub fn is_active(&self) -> bool {
        self.read().state == SessionState::Active
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> AppResult<String> {
        self.read()
            .token
            .as_ref()
            .map(|token| format!("Bearer {}", token))
            .ok_or_else(|| AppError::Authentication("No active session".to_string()))
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

//! Session context
//!
//! Holds the token pair, the current user and the intended-destination
//! marker. One `Session` is created at app start, shared as `Arc<Session>`
//! with every component that issues requests, and cleared at logout.

use shared::client::{TokenPair, UserProfile};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct SessionState {
    tokens: Option<TokenPair>,
    user: Option<UserProfile>,
    /// Bumped whenever the credentials change (login, refresh, clear)
    generation: u64,
    /// Where to send the user after the next successful login
    return_to: Option<String>,
}

/// Credentials captured for one request
#[derive(Debug, Clone)]
pub(crate) struct Credential {
    pub(crate) access: Option<String>,
    pub(crate) generation: u64,
}

/// Explicitly passed session/auth context
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
    /// Single-flight guard for token refresh
    refresh_lock: tokio::sync::Mutex<()>,
}

impl Session {
    /// Creates a new empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty session ready to be shared.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a fresh token pair (login or refresh).
    pub fn set_tokens(&self, tokens: TokenPair) {
        let mut state = self.write();
        state.tokens = Some(tokens);
        state.generation += 1;
    }

    /// Caches the current user's profile.
    pub fn set_user(&self, user: UserProfile) {
        self.write().user = Some(user);
    }

    /// Drops tokens and user (logout, failed refresh, failed login).
    pub fn clear(&self) {
        let mut state = self.write();
        state.tokens = None;
        state.user = None;
        state.generation += 1;
    }

    /// Returns the access token if available.
    pub fn access_token(&self) -> Option<String> {
        self.read().tokens.as_ref().map(|t| t.access.clone())
    }

    /// Returns the refresh token if available.
    pub fn refresh_token(&self) -> Option<String> {
        self.read().tokens.as_ref().map(|t| t.refresh.clone())
    }

    /// Returns the current user if available.
    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().tokens.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Records where to return after re-authentication.
    pub fn remember_destination(&self, path: impl Into<String>) {
        self.write().return_to = Some(path.into());
    }

    /// Takes the recorded destination, leaving none behind.
    pub fn take_destination(&self) -> Option<String> {
        self.write().return_to.take()
    }

    pub(crate) fn credential(&self) -> Credential {
        let state = self.read();
        Credential {
            access: state.tokens.as_ref().map(|t| t.access.clone()),
            generation: state.generation,
        }
    }

    pub(crate) fn refresh_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.refresh_lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u32) -> TokenPair {
        TokenPair {
            access: format!("access-{n}"),
            refresh: format!("refresh-{n}"),
        }
    }

    #[test]
    fn test_generation_tracks_credential_changes() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.generation(), 0);

        session.set_tokens(tokens(1));
        assert_eq!(session.generation(), 1);
        assert_eq!(session.access_token().as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));

        session.clear();
        assert_eq!(session.generation(), 2);
        assert!(session.access_token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_destination_is_taken_once() {
        let session = Session::new();
        session.remember_destination("/sales/orders/create");
        assert_eq!(
            session.take_destination().as_deref(),
            Some("/sales/orders/create")
        );
        assert!(session.take_destination().is_none());
    }

    #[test]
    fn test_destination_survives_clear() {
        let session = Session::new();
        session.set_tokens(tokens(1));
        session.remember_destination("/sales/orders");
        session.clear();
        assert_eq!(session.take_destination().as_deref(), Some("/sales/orders"));
    }
}

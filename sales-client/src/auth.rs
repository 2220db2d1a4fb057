//! Auth service
//!
//! Login, start-up restore, profile maintenance and logout on top of the
//! shared [`Session`](crate::Session).

use crate::{ClientError, ClientResult, HttpClient, endpoints};
use shared::client::{LoginRequest, ProfileUpdate, TokenPair, UserProfile};

/// Authentication operations for the current session
#[derive(Debug, Clone)]
pub struct AuthService {
    http: HttpClient,
}

impl AuthService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Client bound to this service's session
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Logs in and loads the profile.
    ///
    /// On any failure both tokens are dropped so no half-initialised
    /// session survives.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<UserProfile> {
        let session = self.http.session();
        let result = async {
            let tokens: TokenPair = self
                .http
                .post_anonymous(endpoints::LOGIN, credentials)
                .await?;
            session.set_tokens(tokens);
            self.http.get::<UserProfile>(endpoints::PROFILE).await
        }
        .await;

        match result {
            Ok(profile) => {
                tracing::info!(username = %profile.username, role = ?profile.role, "Logged in");
                tracing::info!(target: "audit", user = %profile.username, action = "login", resource = "session");
                session.set_user(profile.clone());
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(username = %credentials.username, error = %e, "Login failed");
                session.clear();
                Err(e)
            }
        }
    }

    /// Re-fetches the profile when a token is already present.
    ///
    /// Returns `Ok(None)` when there is no usable session.
    pub async fn restore(&self) -> ClientResult<Option<UserProfile>> {
        let session = self.http.session();
        if !session.is_authenticated() {
            return Ok(None);
        }

        match self.http.get::<UserProfile>(endpoints::PROFILE).await {
            Ok(profile) => {
                session.set_user(profile.clone());
                Ok(Some(profile))
            }
            Err(e) if e.is_auth_failure() => {
                tracing::warn!(error = %e, "Auth check failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Updates profile fields and caches the returned profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        let profile: UserProfile = self.http.patch(endpoints::PROFILE, update).await?;
        self.http.session().set_user(profile.clone());
        Ok(profile)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.http.session().user()
    }

    /// Returns the current user, or records `return_to` and fails with
    /// [`ClientError::Unauthenticated`].
    pub fn require_auth(&self, return_to: &str) -> ClientResult<UserProfile> {
        let session = self.http.session();
        match session.user() {
            Some(user) => Ok(user),
            None => {
                session.remember_destination(return_to);
                Err(ClientError::Unauthenticated)
            }
        }
    }

    /// Clears the session, optionally remembering where to come back to.
    pub fn logout(&self, return_to: Option<&str>) {
        let session = self.http.session();
        if let Some(user) = session.user() {
            tracing::info!(target: "audit", user = %user.username, action = "logout", resource = "session");
        }
        session.clear();
        if let Some(path) = return_to {
            session.remember_destination(path);
        }
    }
}

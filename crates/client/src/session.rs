//! Auth session management.
//!
//! The session is two durable entries (`authToken`, `user`) behind a
//! [`KvStore`], an in-memory signed-in flag, and a broadcast channel of
//! [`AuthEvent`]s so UI components can react to sign-outs no matter
//! where they originate: explicit logout, a failed current-user
//! refresh, or a 401 on an unrelated content call.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

use gambit_core::ContentRecord;
use gambit_store::KvStore;

use crate::error::Error;
use crate::{GambitClient, Query};

/// Store key holding the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Store key holding the JSON-serialized user record.
pub const USER_KEY: &str = "user";

/// Channel capacity for auth notifications. Signals are rare; a small
/// buffer only matters to catch up a briefly-busy listener.
const EVENT_CAPACITY: usize = 16;

/// Process-wide auth notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Some HTTP call was rejected with 401; the stored session has
    /// been cleared.
    AuthorizationError,
    /// The user explicitly signed out.
    SessionEnded,
}

/// Result of a successful register/login/reset-password call.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// The authenticated user record.
    pub user: ContentRecord,
    /// The bearer token. Absent when the CMS defers the session, e.g.
    /// registration pending email confirmation.
    pub token: Option<String>,
}

/// Shared session state: the persistence port plus the notification
/// channel.
///
/// Held by the client (whose HTTP layer needs the token and the 401
/// hook) and by the [`SessionManager`] (which owns the auth flows).
#[derive(Clone)]
pub struct SessionHandle {
    store: Arc<dyn KvStore>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("listeners", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Create a handle over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    /// Subscribe to auth notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// The stored bearer token, if a user session is active.
    pub async fn token(&self) -> Result<Option<String>, Error> {
        Ok(self.store.get(TOKEN_KEY).await?)
    }

    /// The persisted user record. A corrupt entry reads as `None`.
    pub async fn stored_user(&self) -> Result<Option<ContentRecord>, Error> {
        match self.store.get(USER_KEY).await? {
            Some(text) => Ok(serde_json::from_str(&text).ok()),
            None => Ok(None),
        }
    }

    pub(crate) async fn persist(&self, token: &str, user: &Value) -> Result<(), Error> {
        self.store.set(TOKEN_KEY, token).await?;
        self.persist_user(user).await
    }

    pub(crate) async fn persist_user(&self, user: &Value) -> Result<(), Error> {
        let text = serde_json::to_string(user)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        self.store.set(USER_KEY, &text).await?;
        Ok(())
    }

    pub(crate) async fn clear(&self) -> Result<(), Error> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await?;
        Ok(())
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    /// Global 401 hook: clear the stored session and notify listeners.
    pub(crate) async fn handle_unauthorized(&self) {
        warn!("authorization rejected; clearing stored session");
        if let Err(e) = self.clear().await {
            warn!(error = %e, "failed to clear stored session");
        }
        self.emit(AuthEvent::AuthorizationError);
    }
}

#[derive(Debug, Default)]
struct SessionState {
    signed_in: bool,
    user: Option<ContentRecord>,
}

/// Auth flows over the content API's local auth endpoints.
///
/// State machine: SignedOut → login/register/reset success →
/// SignedIn(token, user) → (logout | 401 detected | current-user
/// refresh failure) → SignedOut. There is no token refresh; expiry is
/// only ever observed reactively through a 401.
#[derive(Debug, Clone)]
pub struct SessionManager {
    client: GambitClient,
    state: Arc<RwLock<SessionState>>,
}

impl SessionManager {
    /// Create a manager over the given client.
    #[must_use]
    pub fn new(client: GambitClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &GambitClient {
        &self.client
    }

    /// Subscribe to auth notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.client.session().subscribe()
    }

    /// Initialize the session: restore any persisted user, verify the
    /// stored token against the API (an invalid token signs the user
    /// back out), and start the listener that resets in-memory state on
    /// auth notifications.
    ///
    /// Returns the listener task handle; it runs until the manager and
    /// all client clones are dropped.
    pub async fn start(&self) -> Result<tokio::task::JoinHandle<()>, Error> {
        if self.is_authenticated().await? {
            if let Some(user) = self.stored_user().await? {
                {
                    let mut state = self.state.write().await;
                    state.signed_in = true;
                    state.user = Some(user);
                }
                self.current_user().await?;
            }
        }

        let mut rx = self.client.session().subscribe();
        let state = Arc::clone(&self.state);
        Ok(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(AuthEvent::AuthorizationError | AuthEvent::SessionEnded) => {
                        let mut state = state.write().await;
                        state.signed_in = false;
                        state.user = None;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }

    /// Register a new user.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, Error> {
        let body = json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let value = self.client.post_json("/auth/local/register", &body).await?;
        self.complete_sign_in(value).await
    }

    /// Sign in with an email address or username.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse, Error> {
        let body = json!({
            "identifier": identifier,
            "password": password,
        });
        let value = self.client.post_json("/auth/local", &body).await?;
        self.complete_sign_in(value).await
    }

    /// Sign out: clear the stored session and broadcast
    /// [`AuthEvent::SessionEnded`].
    pub async fn logout(&self) -> Result<(), Error> {
        self.client.session().clear().await?;
        {
            let mut state = self.state.write().await;
            state.signed_in = false;
            state.user = None;
        }
        self.client.session().emit(AuthEvent::SessionEnded);
        Ok(())
    }

    /// Re-fetch the user record with the stored token.
    ///
    /// Any failure signs the user out and yields `Ok(None)`; this is
    /// the one place the session recovers automatically.
    pub async fn current_user(&self) -> Result<Option<ContentRecord>, Error> {
        match self.client.get_json("/users/me", &Query::new()).await {
            Ok(value) => {
                self.client.session().persist_user(&value).await?;
                let user: ContentRecord = serde_json::from_value(value)
                    .map_err(|e| Error::Deserialization(e.to_string()))?;
                let mut state = self.state.write().await;
                state.signed_in = true;
                state.user = Some(user.clone());
                Ok(Some(user))
            }
            Err(e) => {
                debug!(error = %e, "current-user refresh failed; signing out");
                self.logout().await?;
                Ok(None)
            }
        }
    }

    /// Whether a bearer token is stored.
    pub async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(self.client.session().token().await?.is_some())
    }

    /// The persisted user record, if any.
    pub async fn stored_user(&self) -> Result<Option<ContentRecord>, Error> {
        self.client.session().stored_user().await
    }

    /// In-memory signed-in flag, as a menu component would render it.
    pub async fn signed_in(&self) -> bool {
        self.state.read().await.signed_in
    }

    /// In-memory user record.
    pub async fn user(&self) -> Option<ContentRecord> {
        self.state.read().await.user.clone()
    }

    /// Change the signed-in user's password.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        password_confirmation: &str,
    ) -> Result<Value, Error> {
        let body = json!({
            "currentPassword": current_password,
            "password": new_password,
            "passwordConfirmation": password_confirmation,
        });
        self.client.post_json("/auth/change-password", &body).await
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<Value, Error> {
        let body = json!({ "email": email });
        self.client.post_json("/auth/forgot-password", &body).await
    }

    /// Complete a reset with the emailed code. Signs the user in on
    /// success.
    pub async fn reset_password(
        &self,
        code: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<AuthResponse, Error> {
        let body = json!({
            "code": code,
            "password": password,
            "passwordConfirmation": password_confirmation,
        });
        let value = self.client.post_json("/auth/reset-password", &body).await?;
        self.complete_sign_in(value).await
    }

    /// Persist and record a `{ jwt, user }` auth payload. The session
    /// only becomes active when a token was actually issued.
    async fn complete_sign_in(&self, value: Value) -> Result<AuthResponse, Error> {
        let token = value
            .get("jwt")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let user_value = value
            .get("user")
            .cloned()
            .ok_or_else(|| Error::Deserialization("auth response missing user".to_owned()))?;

        if let Some(token) = &token {
            self.client.session().persist(token, &user_value).await?;
        }

        let user: ContentRecord = serde_json::from_value(user_value)
            .map_err(|e| Error::Deserialization(e.to_string()))?;

        if token.is_some() {
            let mut state = self.state.write().await;
            state.signed_in = true;
            state.user = Some(user.clone());
        }

        Ok(AuthResponse { user, token })
    }
}

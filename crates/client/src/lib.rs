//! Gambit CMS client
//!
//! A native Rust client for the Pawns Gambit community site's content
//! API. Wraps the CMS's REST surface: envelope-normalized content
//! fetches (events, podcasts, community members, news, about-page
//! entities), the auth endpoints, and a persisted user session.
//!
//! # Quick Start
//!
//! ```no_run
//! use gambit_client::{EventQuery, GambitClient, GambitConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gambit_client::Error> {
//!     let client = GambitClient::new(GambitConfig::from_env());
//!
//!     let events = client.fetch_events(&EventQuery::default()).await?;
//!     for event in events {
//!         println!("{} on {} at {}", event.title, event.date, event.time);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sessions
//!
//! User auth goes through [`SessionManager`], which persists the bearer
//! token and cached user record in a [`gambit_store::KvStore`] backend
//! and broadcasts [`AuthEvent`]s when the session ends. Any HTTP 401,
//! from any call, clears the stored session and notifies listeners:
//!
//! ```no_run
//! use gambit_client::{AuthEvent, GambitClient, GambitConfig, SessionManager};
//!
//! # async fn example() -> Result<(), gambit_client::Error> {
//! let client = GambitClient::new(GambitConfig::from_env());
//! let mut auth_events = client.subscribe_auth_events();
//!
//! let session = SessionManager::new(client);
//! session.start().await?;
//! session.login("magnus@example.com", "hunter2").await?;
//! assert!(session.is_authenticated().await?);
//!
//! if let Ok(AuthEvent::AuthorizationError) = auth_events.recv().await {
//!     // token expired mid-session; render the signed-out menu
//! }
//! # Ok(())
//! # }
//! ```

mod about;
mod community;
mod config;
mod error;
mod events;
mod news;
mod podcasts;
mod query;
mod session;

pub use about::AboutPage;
pub use community::{CommunityStats, MemberQuery};
pub use config::{DEFAULT_API_URL, DEFAULT_TIMEOUT, GambitConfig};
pub use error::Error;
pub use events::EventQuery;
pub use news::NewsQuery;
pub use podcasts::EpisodeQuery;
pub use query::{FilterOp, Query};
pub use session::{AuthEvent, AuthResponse, SessionHandle, SessionManager, TOKEN_KEY, USER_KEY};

// Re-export core types so callers don't need a direct `gambit_core`
// dependency.
pub use gambit_core::{ContentRecord, Event, MediaResolver, Normalized, RecordId};

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use gambit_core::normalize_response;
use gambit_store::KvStore;
use gambit_store_memory::MemoryKvStore;

use crate::error::ErrorBody;

/// HTTP client for the content API.
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// session handle.
#[derive(Debug, Clone)]
pub struct GambitClient {
    client: reqwest::Client,
    config: GambitConfig,
    media: MediaResolver,
    session: SessionHandle,
}

/// Builder for configuring a [`GambitClient`].
pub struct GambitClientBuilder {
    config: GambitConfig,
    store: Option<Arc<dyn KvStore>>,
    client: Option<reqwest::Client>,
}

impl std::fmt::Debug for GambitClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GambitClientBuilder")
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .field("client", &self.client)
            .finish()
    }
}

impl GambitClientBuilder {
    /// Create a new builder with the given configuration.
    #[must_use]
    pub fn new(config: GambitConfig) -> Self {
        Self {
            config,
            store: None,
            client: None,
        }
    }

    /// Use a specific session store backend.
    ///
    /// Defaults to an in-memory store; pass a file store to keep the
    /// user signed in across process restarts.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GambitClient, Error> {
        let client = match self.client {
            Some(c) => c,
            None => reqwest::Client::builder()
                .timeout(self.config.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryKvStore::new()));
        let media = MediaResolver::new(&self.config.media_base_url);

        Ok(GambitClient {
            client,
            media,
            session: SessionHandle::new(store),
            config: self.config,
        })
    }
}

impl GambitClient {
    /// Create a new client with default store and HTTP settings.
    pub fn new(config: GambitConfig) -> Self {
        GambitClientBuilder::new(config)
            .build()
            .expect("default client configuration should not fail")
    }

    /// Create a builder for advanced configuration.
    #[must_use]
    pub fn builder(config: GambitConfig) -> GambitClientBuilder {
        GambitClientBuilder::new(config)
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GambitConfig {
        &self.config
    }

    /// The media URL resolver derived from the configuration.
    #[must_use]
    pub fn media(&self) -> &MediaResolver {
        &self.media
    }

    /// The shared session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Subscribe to process-wide auth notifications.
    #[must_use]
    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.session.subscribe()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url)
    }

    /// Attach the bearer token. The signed-in user's token takes
    /// precedence over the static site token.
    async fn authorize(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let token = self
            .session
            .token()
            .await?
            .or_else(|| self.config.site_token.clone());
        Ok(match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    /// Send a request, routing any 401 through the global auth hook
    /// before the caller sees the response.
    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let response = req
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.session.handle_unauthorized().await;
        }
        Ok(response)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, Error> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| Error::Deserialization(e.to_string()));
        }
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(Error::Api {
                status: body.error.status.unwrap_or_else(|| status.as_u16()),
                name: body.error.name.unwrap_or_else(|| "Error".to_owned()),
                message: body
                    .error
                    .message
                    .unwrap_or_else(|| status.to_string()),
            }),
            Err(_) => Err(Error::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned(),
            }),
        }
    }

    pub(crate) async fn get_json(&self, path: &str, query: &Query) -> Result<Value, Error> {
        debug!(path, "GET");
        let mut req = self.client.get(self.endpoint(path));
        if !query.is_empty() {
            req = req.query(&query.to_pairs());
        }
        let req = self.authorize(req).await?;
        let response = self.execute(req).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> Result<Value, Error> {
        debug!(path, "POST");
        let req = self.client.post(self.endpoint(path)).json(body);
        let req = self.authorize(req).await?;
        let response = self.execute(req).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn put_json(&self, path: &str, body: &Value) -> Result<Value, Error> {
        debug!(path, "PUT");
        let req = self.client.put(self.endpoint(path)).json(body);
        let req = self.authorize(req).await?;
        let response = self.execute(req).await?;
        Self::read_json(response).await
    }

    /// GET a collection endpoint and normalize to flat records.
    pub(crate) async fn fetch_records(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<Vec<ContentRecord>, Error> {
        let body = self.get_json(path, query).await?;
        Ok(normalize_response(&body, &self.media).into_records())
    }

    /// GET a single-record endpoint and normalize.
    pub(crate) async fn fetch_record(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<Option<ContentRecord>, Error> {
        let body = self.get_json(path, query).await?;
        Ok(normalize_response(&body, &self.media).into_record())
    }

    /// GET a collection endpoint and take the first record.
    pub(crate) async fn fetch_first(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<Option<ContentRecord>, Error> {
        let body = self.get_json(path, query).await?;
        Ok(normalize_response(&body, &self.media).into_first())
    }
}

//! services/client/src/adapters/http.rs
//!
//! This module contains the REST adapter, the concrete implementation of the
//! `AuthService`, `CatalogService` and `FavoritesService` ports. It talks JSON
//! to the trek backend using `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{AuthScheme, Config};
use trek_sync_core::domain::{
    Credentials, FavoriteId, Registration, Trek, TrekId, UserId,
};
use trek_sync_core::payload::{AuthPayload, FavoriteEntry, ProfilePayload};
use trek_sync_core::ports::{
    AuthService, CatalogService, FavoritesService, PortError, PortResult,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter for the trek backend.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
    auth_scheme: AuthScheme,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` around an existing client.
    pub fn new(http: Client, base_url: impl Into<String>, auth_scheme: AuthScheme) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_scheme,
        }
    }

    /// Builds the HTTP client from configuration. Without a configured timeout
    /// the transport default applies.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(
            builder.build()?,
            config.api_base_url.clone(),
            config.auth_scheme,
        ))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.header(
                reqwest::header::AUTHORIZATION,
                self.auth_scheme.header_value(token),
            ),
            None => request,
        }
    }

    /// Sends a request and decodes a JSON body from a 2xx response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        failure: &str,
    ) -> PortResult<T> {
        let response = self.send(request, failure).await?;
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| PortError::Decode(e.to_string()))
    }

    /// Sends a request and ignores the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder, failure: &str) -> PortResult<()> {
        self.send(request, failure).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder, failure: &str) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let default = if failure.is_empty() {
            format!("HTTP error! status: {}", status.as_u16())
        } else {
            failure.to_string()
        };
        Err(PortError::Http {
            status: status.as_u16(),
            message: server_message(&body).unwrap_or(default),
        })
    }
}

/// Pulls a human readable message out of an error body.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthService for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthPayload> {
        let request = self.http.post(self.url("/login/")).json(credentials);
        self.fetch(request, "Login failed").await
    }

    async fn signup(&self, registration: &Registration) -> PortResult<AuthPayload> {
        let request = self.http.post(self.url("/signup/")).json(registration);
        self.fetch(request, "Registration failed").await
    }

    async fn verify_token(&self, token: &str) -> PortResult<()> {
        let request = self.authorized(self.http.get(self.url("/verify-token")), Some(token));
        self.execute(request, "").await
    }

    async fn update_interests(
        &self,
        token: &str,
        user_id: UserId,
        interests: &[String],
    ) -> PortResult<ProfilePayload> {
        let body = json!({ "profile": { "interests": interests } });
        let request = self.authorized(
            self.http
                .patch(self.url(&format!("/users/{}/", user_id)))
                .json(&body),
            Some(token),
        );
        self.fetch(request, "Failed to update interests").await
    }
}

#[async_trait]
impl CatalogService for HttpBackend {
    async fn list_treks(&self) -> PortResult<Vec<Trek>> {
        self.fetch(self.http.get(self.url("/treks/")), "").await
    }

    async fn get_trek(&self, id: TrekId) -> PortResult<Trek> {
        self.fetch(self.http.get(self.url(&format!("/treks/{}/", id))), "")
            .await
    }

    async fn list_recommendations(&self, token: Option<&str>) -> PortResult<Vec<Trek>> {
        let request = self.authorized(self.http.get(self.url("/recommendations/")), token);
        self.fetch(request, "").await
    }
}

#[async_trait]
impl FavoritesService for HttpBackend {
    async fn list_favorites(&self, token: Option<&str>) -> PortResult<Vec<FavoriteEntry>> {
        let request = self.authorized(self.http.get(self.url("/favorites/")), token);
        self.fetch(request, "").await
    }

    async fn create_favorite(
        &self,
        token: Option<&str>,
        user_id: UserId,
        trek_id: TrekId,
    ) -> PortResult<()> {
        let body = json!({ "user": user_id, "trek": trek_id });
        let request = self.authorized(self.http.post(self.url("/favorites/")).json(&body), token);
        self.execute(request, "").await
    }

    async fn delete_favorite(&self, token: Option<&str>, record_id: FavoriteId) -> PortResult<()> {
        let request = self.authorized(
            self.http.delete(self.url(&format!("/favorites/{}/", record_id))),
            token,
        );
        self.execute(request, "").await
    }
}

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{normalize, ApiError};
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// HTTP client for the personas backend. Every request goes through the
/// request authenticator (bearer token in, 401 teardown out) and failures are
/// reshaped by the error normalizer.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        store: Arc<SessionStore>,
        navigator: Arc<Navigator>,
    ) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid API base URL '{}': {}", base_url, e))?;
        if parsed.cannot_be_a_base() {
            return Err(anyhow::anyhow!("invalid API base URL '{}'", base_url));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let token = self.store.token();
        let builder = match token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = response.json::<Value>().await.ok();

        if status == reqwest::StatusCode::UNAUTHORIZED && token.is_some() {
            self.reject_session();
        }

        let error = normalize(status.as_u16(), body.as_ref());
        tracing::debug!("request failed with {}: {}", status, error);
        Err(error)
    }

    /// The one place a rejected token turns into session teardown.
    fn reject_session(&self) {
        tracing::warn!("token rejected by backend, clearing session");
        if let Err(e) = self.store.clear() {
            tracing::error!("failed to clear session: {}", e);
        }
        self.navigator.redirect_to_login();
    }
}

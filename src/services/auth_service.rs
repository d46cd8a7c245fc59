use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, AuthResponse, LoginRequest, Profile, RegisterRequest, Session,
};
use crate::session::{is_token_valid, SessionStore};

const AUTH_PATH: &str = "/api/auth";

/// Login, registration, logout and profile lookups against `/api/auth`.
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn store(&self) -> &SessionStore {
        self.client.store()
    }

    /// Create an account. Never touches the session.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<ApiResponse<Profile>, ApiError> {
        let request = RegisterRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: ApiResponse<Profile> = self
            .client
            .post(&format!("{}/register", AUTH_PATH), &request)
            .await?;

        if !response.success {
            return Err(ApiError::Rejected(response.failure_message()));
        }

        tracing::info!("registered {}", email);
        Ok(response)
    }

    /// Sign in and store token + profile together. On failure the store is untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: AuthResponse = self
            .client
            .post(&format!("{}/login", AUTH_PATH), &request)
            .await?;

        let data = match response.data {
            Some(data) if response.success => data,
            _ => return Err(ApiError::Rejected(response.failure_message())),
        };

        self.store().set(&data.token.value, data.user.clone())?;
        tracing::info!("logged in as {}", data.user.email);
        Ok(Session::new(data.token.value, data.user))
    }

    /// Ask the backend to revoke the token, then clear the local session no
    /// matter what the backend said.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result: Result<Value, ApiError> = self
            .client
            .post(&format!("{}/logout", AUTH_PATH), &json!({}))
            .await;

        if let Err(e) = &result {
            tracing::warn!("logout request failed, clearing session anyway: {}", e);
        }

        self.store().clear()?;
        self.client.navigator().redirect_to_login();
        Ok(())
    }

    /// Fetch the profile for the current token. A 401 here tears the session down.
    pub async fn me(&self) -> Result<Profile, ApiError> {
        let response: ApiResponse<Profile> =
            self.client.get(&format!("{}/me", AUTH_PATH)).await?;

        match response.data {
            Some(profile) if response.success => Ok(profile),
            _ => Err(ApiError::Rejected(response.failure_message())),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().is_authenticated()
    }

    pub fn is_token_valid(&self, token: &str) -> bool {
        is_token_valid(Some(token))
    }

    pub fn token(&self) -> Option<String> {
        self.store().token()
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.store().current_user()
    }
}

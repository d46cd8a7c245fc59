use serde::{Deserialize, Serialize};

/// Snapshot of the signed-in user, cached next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

/// Client-held pairing of bearer token and profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<Profile>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Profile) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    pub user: Profile,
    pub token: TokenInfo,
}

/// Standard `{success, message, data?, error?}` envelope returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Message to show when the backend answered 2xx but reported `success: false`.
    pub fn failure_message(&self) -> String {
        if !self.message.is_empty() {
            self.message.clone()
        } else {
            self.error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string())
        }
    }
}

pub type AuthResponse = ApiResponse<AuthData>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_parses_token_and_user() {
        let body = json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "user": {"id": 7, "fullName": "Ana Pérez", "email": "ana@example.com"},
                "token": {"type": "bearer", "value": "oat_abc"}
            }
        });

        let response: AuthResponse = serde_json::from_value(body).unwrap();
        let data = response.data.unwrap();
        assert_eq!(data.user.full_name, "Ana Pérez");
        assert_eq!(data.token.kind, "bearer");
        assert_eq!(data.token.value, "oat_abc");
    }

    #[test]
    fn test_envelope_without_data() {
        let response: ApiResponse<Profile> =
            serde_json::from_value(json!({"success": true, "message": "Logged out"})).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.failure_message(), "Logged out");
    }

    #[test]
    fn test_session_authentication_follows_token() {
        assert!(!Session::default().is_authenticated());
        let profile = Profile {
            id: 1,
            full_name: "A".into(),
            email: "a@b.c".into(),
        };
        assert!(Session::new("t", profile).is_authenticated());
    }
}

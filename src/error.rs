// Client-side API error types and the response error normalizer
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::session::StorageError;

pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Stable display shape every failed backend call is reduced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub success: bool,
    #[serde(rename = "formattedErrors", skip_serializing_if = "Option::is_none")]
    pub formatted_errors: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            formatted_errors: None,
        }
    }

    /// Formatted validation errors first, then the backend message, then the default.
    pub fn display_message(&self) -> &str {
        match self.formatted_errors.as_deref() {
            Some(formatted) if !formatted.is_empty() => formatted,
            _ if !self.message.is_empty() => &self.message,
            _ => DEFAULT_ERROR_MESSAGE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // status 0
    #[error("{}", .0.display_message())]
    Network(ErrorBody),

    // 401
    #[error("{}", .0.display_message())]
    Unauthorized(ErrorBody),

    // 403
    #[error("{}", .0.display_message())]
    Forbidden(ErrorBody),

    // 404
    #[error("{}", .0.display_message())]
    NotFound(ErrorBody),

    // 422
    #[error("{}", .0.display_message())]
    Validation(ErrorBody),

    // >= 500
    #[error("{}", .body.display_message())]
    Server { status: u16, body: ErrorBody },

    #[error("{}", .body.display_message())]
    Unknown { status: u16, body: ErrorBody },

    // 2xx with `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status the error was built from; 0 for transport and local failures.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Network(_) => 0,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Validation(_) => 422,
            ApiError::Server { status, .. } => *status,
            ApiError::Unknown { status, .. } => *status,
            ApiError::Rejected(_) => 200,
            ApiError::Decode(_) | ApiError::Storage(_) => 0,
        }
    }

    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Network(body)
            | ApiError::Unauthorized(body)
            | ApiError::Forbidden(body)
            | ApiError::NotFound(body)
            | ApiError::Validation(body)
            | ApiError::Server { body, .. }
            | ApiError::Unknown { body, .. } => Some(body),
            ApiError::Rejected(_) | ApiError::Decode(_) | ApiError::Storage(_) => None,
        }
    }

    pub fn formatted_errors(&self) -> Option<&str> {
        self.body().and_then(|body| body.formatted_errors.as_deref())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_UNREACHABLE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Server { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::Unknown { .. } => "UNKNOWN",
            ApiError::Rejected(_) => "REJECTED",
            ApiError::Decode(_) => "INVALID_RESPONSE",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        match self.body() {
            Some(body) => {
                let mut response = json!({
                    "success": false,
                    "message": body.message,
                    "code": self.error_code(),
                    "status": self.status_code(),
                });
                if let Some(formatted) = &body.formatted_errors {
                    response["formattedErrors"] = json!(formatted);
                }
                response
            }
            None => json!({
                "success": false,
                "message": self.to_string(),
                "code": self.error_code(),
            }),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        tracing::debug!("transport error: {}", err);
        normalize(0, None)
    }
}

/// Fallback message for a status when the backend did not send one.
pub fn default_message(status: u16) -> &'static str {
    match status {
        0 => "Could not connect to the server",
        s if s >= 500 => "Internal server error",
        404 => "Resource not found",
        403 => "Access denied",
        401 => "Invalid or expired token",
        422 => "Validation failed",
        _ => DEFAULT_ERROR_MESSAGE,
    }
}

/// Reshape a failed response into an [`ApiError`]. Pure: session teardown on 401
/// belongs to the request authenticator, not here.
pub fn normalize(status: u16, body: Option<&Value>) -> ApiError {
    let message = body
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_message(status).to_string());

    let formatted_errors = body
        .and_then(|b| b.get("errors"))
        .and_then(format_validation_errors);

    let body = ErrorBody {
        message,
        success: false,
        formatted_errors,
    };

    match status {
        0 => ApiError::Network(body),
        401 => ApiError::Unauthorized(body),
        403 => ApiError::Forbidden(body),
        404 => ApiError::NotFound(body),
        422 => ApiError::Validation(body),
        s if s >= 500 => ApiError::Server { status: s, body },
        s => ApiError::Unknown { status: s, body },
    }
}

/// Flatten a validation payload into one line.
///
/// List shape `[{field, message}]` joins `"field: message"` pairs with `", "`.
/// Map shape `{field: [messages]}` joins a field's messages with `", "` and
/// fields with `"; "`.
pub fn format_validation_errors(errors: &Value) -> Option<String> {
    let formatted = match errors {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let field = item
                    .get("field")
                    .filter(|v| !v.is_null())
                    .map(value_text)
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| "Field".to_string());
                let message = item
                    .get("message")
                    .or_else(|| item.get("rule"))
                    .filter(|v| !v.is_null())
                    .map(value_text)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "invalid".to_string());
                format!("{}: {}", field, message)
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(fields) => fields
            .iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    Value::Array(list) => list.iter().map(value_text).collect::<Vec<_>>(),
                    other => vec![value_text(other)],
                };
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };

    if formatted.is_empty() {
        None
    } else {
        Some(formatted)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

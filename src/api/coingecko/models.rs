use serde::{Deserialize, Serialize};

/// Error body shapes returned by the markets API
///
/// Either `{"error": "..."}` or `{"status": {"error_code": 429, "error_message": "..."}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub status: Option<ErrorStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorStatus {
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl ErrorResponse {
    /// Best human-readable message from an error body, falling back to the raw text
    pub fn message_from(body_text: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body_text) {
            Ok(ErrorResponse { error: Some(msg), .. }) => msg,
            Ok(ErrorResponse {
                status: Some(ErrorStatus { error_message: Some(msg), .. }),
                ..
            }) => msg,
            _ => body_text.to_string(),
        }
    }
}

/// Comprehensive error type for market data API operations
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 403 Forbidden
    Forbidden(String),
    /// 404 Not Found (unknown coin id)
    NotFound(String),
    /// 429 Too Many Requests
    RateLimited { retry_after: i64 },
    /// 5xx Server Error
    ServerError(i32, String),
    /// Other HTTP errors
    HttpError(i32, String),
    /// Network/request error
    RequestError(String),
    /// Deserialization error
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::RateLimited { retry_after } => {
                write!(f, "Rate Limited. Retry after {} ms", retry_after)
            }
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_error_field() {
        assert_eq!(
            ErrorResponse::message_from(r#"{"error":"coin not found"}"#),
            "coin not found"
        );
    }

    #[test]
    fn test_message_from_status_block() {
        let body = r#"{"status":{"error_code":429,"error_message":"You've exceeded the Rate Limit."}}"#;
        assert_eq!(ErrorResponse::message_from(body), "You've exceeded the Rate Limit.");
    }

    #[test]
    fn test_message_from_plain_text() {
        assert_eq!(ErrorResponse::message_from("Bad Gateway"), "Bad Gateway");
    }
}

//! Mapping of backend responses onto `LuminError`

use common::LuminError;
use reqwest::Response;

use crate::models::ErrorBody;

/// Longest slice of a raw error body carried into an error message
const MAX_BODY_IN_MESSAGE: usize = 200;

/// Pass successful responses through; turn anything else into an error
pub async fn ensure_success(response: Response) -> Result<Response, LuminError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(rejection(status.as_u16(), &body))
}

/// Error for a non-success status and its body
pub fn rejection(status: u16, body: &str) -> LuminError {
    match status {
        401 | 403 => LuminError::AuthenticationRequired,
        _ => LuminError::RemoteRejected {
            status,
            message: error_message(body),
        },
    }
}

/// Human-readable message out of a backend error body
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| body.trim().chars().take(MAX_BODY_IN_MESSAGE).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_authentication_required() {
        assert!(matches!(
            rejection(401, "{}"),
            LuminError::AuthenticationRequired
        ));
        assert!(matches!(
            rejection(403, ""),
            LuminError::AuthenticationRequired
        ));
    }

    #[test]
    fn test_message_prefers_specific_fields() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body), "Invalid login credentials");

        let body = r#"{"code":"23505","message":"duplicate key value"}"#;
        match rejection(409, body) {
            LuminError::RemoteRejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key value");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_body_is_truncated() {
        let body = "x".repeat(500);
        assert_eq!(error_message(&body).len(), MAX_BODY_IN_MESSAGE);
    }
}

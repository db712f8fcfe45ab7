//! Custom error types for the Lumin client
//!
//! Every crate in the workspace reports failures through [`LuminError`]. The
//! first five variants are the kinds a caller is expected to branch on; the
//! rest cover local concerns (input validation, session storage, config).

use thiserror::Error;

/// Error type shared by the gateway, auth, media and feed crates
#[derive(Error, Debug)]
pub enum LuminError {
    /// The backend could not be reached (DNS, connect, timeout)
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The backend answered with a body we could not decode
    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    /// The backend answered with a non-success status code
    #[error("Request rejected with status {status}: {message}")]
    RemoteRejected { status: u16, message: String },

    /// The operation needs a signed-in user or a valid session
    #[error("Authentication required")]
    AuthenticationRequired,

    /// A photo could not be stored
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record is not present locally or remotely
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation collides with one already in progress
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The local key-value store failed
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LuminError {
    /// Short message suitable for showing to the user as-is
    pub fn user_message(&self) -> String {
        match self {
            LuminError::NetworkUnavailable(_) => "No connection to the server".to_string(),
            LuminError::InvalidResponseShape(_) => "Unexpected response from the server".to_string(),
            LuminError::RemoteRejected { status, .. } => format!("Server error ({})", status),
            LuminError::AuthenticationRequired => "Please sign in to continue".to_string(),
            LuminError::UploadFailed(_) => "Could not upload the photo".to_string(),
            LuminError::Validation(msg) => msg.clone(),
            LuminError::NotFound(_) => "This outfit is no longer available".to_string(),
            LuminError::Conflict(_) => "Please wait for the previous action to finish".to_string(),
            LuminError::Storage(_) => "Could not save data on this device".to_string(),
            LuminError::Configuration(_) => "The app is not configured correctly".to_string(),
        }
    }

    /// Whether the failure came from the transport rather than the backend's answer
    pub fn is_network(&self) -> bool {
        matches!(self, LuminError::NetworkUnavailable(_))
    }
}

impl From<reqwest::Error> for LuminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LuminError::InvalidResponseShape(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => LuminError::AuthenticationRequired,
                code => LuminError::RemoteRejected {
                    status: code,
                    message: err.to_string(),
                },
            }
        } else {
            LuminError::NetworkUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LuminError {
    fn from(err: serde_json::Error) -> Self {
        LuminError::InvalidResponseShape(err.to_string())
    }
}

impl From<redis::RedisError> for LuminError {
    fn from(err: redis::RedisError) -> Self {
        LuminError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for LuminError {
    fn from(err: std::io::Error) -> Self {
        LuminError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for LuminError {
    fn from(err: config::ConfigError) -> Self {
        LuminError::Configuration(err.to_string())
    }
}

/// Type alias for Result with LuminError
pub type LuminResult<T> = Result<T, LuminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_rejected_carries_status() {
        let err = LuminError::RemoteRejected {
            status: 409,
            message: "duplicate key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request rejected with status 409: duplicate key"
        );
        assert_eq!(err.user_message(), "Server error (409)");
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = LuminError::Validation("Add at least one photo".to_string());
        assert_eq!(err.user_message(), "Add at least one photo");
    }

    #[test]
    fn test_json_errors_become_invalid_shape() {
        let err: LuminError = serde_json::from_str::<Vec<u32>>("{").unwrap_err().into();
        assert!(matches!(err, LuminError::InvalidResponseShape(_)));
        assert!(!err.is_network());
    }
}

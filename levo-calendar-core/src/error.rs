//! Error types for levo-calendar.

use thiserror::Error;

/// Errors that can occur in levo-calendar operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Malformed {payload} response: {reason}")]
    MalformedResponse { payload: &'static str, reason: String },

    #[error("Unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Holiday entries cannot be edited")]
    NotEditable,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalendarError {
    /// Text shown to the user in a blocking alert.
    ///
    /// Backend failures carry the server's own message; everything else
    /// falls back to the error's display form.
    pub fn alert_message(&self) -> String {
        match self {
            CalendarError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CalendarError::Decode(err.to_string())
        } else {
            CalendarError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CalendarError {
    fn from(err: serde_json::Error) -> Self {
        CalendarError::Serialization(err.to_string())
    }
}

/// Result type alias for levo-calendar operations.
pub type CalResult<T> = Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_message_uses_backend_text() {
        let err = CalendarError::Api {
            status: 400,
            message: "End time must be after start time".into(),
        };
        assert_eq!(err.alert_message(), "End time must be after start time");
    }

    #[test]
    fn alert_message_falls_back_to_display() {
        let err = CalendarError::Transport("connection refused".into());
        assert_eq!(err.alert_message(), "Request failed: connection refused");
    }
}

use thiserror::Error;

/// Message shown when the backend gives no usable reason.
pub const FALLBACK_MESSAGE: &str = "Failed to fetch weather data";

/// Message shown when the backend sends the request to its login page.
pub const LOGIN_REQUIRED_MESSAGE: &str =
    "Not logged in to the weather service. Configure credentials and try again.";

/// Failure of a single weather request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (connection, timeout, ...).
    #[error("request to weather backend failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("weather backend returned HTTP {status}")]
    Status {
        status: u16,
        /// The `error` field of the response body, if it had one.
        message: Option<String>,
    },

    /// A success response whose body is not a weather payload.
    #[error("failed to parse weather response: {0}")]
    Parse(String),

    /// The backend redirected to its login page; there is no valid session.
    #[error("weather backend requires a login session")]
    LoginRequired,

    /// The login form came back instead of the redirect that grants a session.
    #[error("login rejected, check username and password")]
    LoginRejected,
}

impl FetchError {
    /// Text for the error banner: the backend's own message when it sent one,
    /// a login hint when the session is missing, otherwise `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            FetchError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => message,
            FetchError::LoginRequired => LOGIN_REQUIRED_MESSAGE,
            _ => fallback,
        }
    }
}

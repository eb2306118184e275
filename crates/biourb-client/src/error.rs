use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("not logged in")]
    NoSession,

    #[error("only the registrant or an administrator may change this record")]
    Forbidden,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The notification a page shows when `action` fails. Form validation
    /// problems are shown as-is; every other failure gets the same generic line.
    pub fn toast(&self, action: &str) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            _ => format!("Failed to {}. Please try again.", action),
        }
    }
}

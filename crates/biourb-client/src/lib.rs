//! Client side of the registry: a typed HTTP client, the login session, and
//! the view-models behind the Home, Trees, Areas and Contact pages.

pub mod api;
pub mod areas;
pub mod contact;
pub mod error;
pub mod home;
pub mod session;
pub mod trees;

pub use api::ApiClient;
pub use error::ClientError;
pub use session::{Session, SessionContext};

/// Trimmed form input, or `None` when the field was left blank.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

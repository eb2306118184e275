use chrono::{DateTime, Utc};
use tracing::info;

use biourb_types::api::{LoginResponse, UserProfile};

use crate::api::ApiClient;
use crate::error::ClientError;

/// An authenticated user, valid until `expires_at`.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the edit/delete controls of a record are offered to this user:
    /// its registrant and administrators only. The server does not repeat
    /// this check.
    pub fn can_modify(&self, registrant_id: i64) -> bool {
        self.user.is_admin || self.user.id == registrant_id
    }
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self {
            user: resp.user,
            token: resp.token,
            expires_at: resp.expires_at,
        }
    }
}

/// Owns the optional login session and the client every page talks through.
/// Created logged-out; `login` starts a session, `logout` or token expiry
/// ends it.
#[derive(Debug)]
pub struct SessionContext {
    client: ApiClient,
    session: Option<Session>,
}

impl SessionContext {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            session: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ClientError> {
        let resp = self.client.login(email, password).await?;
        info!("Session started for user {}", resp.user.id);
        Ok(&*self.session.insert(Session::from(resp)))
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Session ended for user {}", session.user.id);
        }
    }

    /// The live session, if any. An expired session is discarded here.
    pub fn current(&mut self) -> Option<&Session> {
        self.current_at(Utc::now())
    }

    pub fn current_at(&mut self, now: DateTime<Utc>) -> Option<&Session> {
        if self.session.as_ref().is_some_and(|s| s.is_expired_at(now)) {
            self.logout();
        }
        self.session.as_ref()
    }

    /// Like `current`, but a missing session is an error.
    pub fn require(&mut self) -> Result<&Session, ClientError> {
        self.current().ok_or(ClientError::NoSession)
    }

    /// Install a session obtained elsewhere, e.g. restored from disk.
    pub fn resume(&mut self, session: Session) {
        self.session = Some(session);
    }
}

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use biourb_types::api::{
    AreaRequest, AreaResponse, CreatedResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, StatsResponse, TreeRequest, TreeResponse,
};

use crate::error::ClientError;
use crate::session::Session;

/// Typed client for the registry REST API. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: Option<&Session>,
    ) -> Result<T, ClientError> {
        let request = match session {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        };

        let resp = request.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json().await?);
        }

        // Error bodies carry `msg` for client errors and `error` for server errors.
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let message = body
            .get("msg")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
            .to_string();

        warn!("{} -> {}: {}", self.base_url, status, message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // -- Auth --

    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ClientError> {
        self.send(self.http.post(self.url("/register")).json(req), None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        debug!("Logging in as {}", email);
        self.send(self.http.post(self.url("/login")).json(&req), None).await
    }

    // -- Stats --

    pub async fn stats(&self) -> Result<StatsResponse, ClientError> {
        self.send(self.http.get(self.url("/stats")), None).await
    }

    // -- Trees --

    pub async fn list_trees(&self) -> Result<Vec<TreeResponse>, ClientError> {
        self.send(self.http.get(self.url("/trees")), None).await
    }

    pub async fn create_tree(
        &self,
        session: Option<&Session>,
        req: &TreeRequest,
    ) -> Result<CreatedResponse, ClientError> {
        self.send(self.http.post(self.url("/trees")).json(req), session).await
    }

    pub async fn update_tree(
        &self,
        session: Option<&Session>,
        id: i64,
        req: &TreeRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.http.put(self.url(&format!("/trees/{}", id))).json(req), session)
            .await
    }

    pub async fn delete_tree(
        &self,
        session: Option<&Session>,
        id: i64,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.http.delete(self.url(&format!("/trees/{}", id))), session)
            .await
    }

    // -- Green areas --

    pub async fn list_areas(&self) -> Result<Vec<AreaResponse>, ClientError> {
        self.send(self.http.get(self.url("/areas")), None).await
    }

    pub async fn create_area(
        &self,
        session: Option<&Session>,
        req: &AreaRequest,
    ) -> Result<CreatedResponse, ClientError> {
        self.send(self.http.post(self.url("/areas")).json(req), session).await
    }

    pub async fn update_area(
        &self,
        session: Option<&Session>,
        id: i64,
        req: &AreaRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.http.put(self.url(&format!("/areas/{}", id))).json(req), session)
            .await
    }

    pub async fn delete_area(
        &self,
        session: Option<&Session>,
        id: i64,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.http.delete(self.url(&format!("/areas/{}", id))), session)
            .await
    }
}

//! HTTP client for the admin API.
//!
//! Authentication state lives in an explicit [`Session`] value that callers
//! pass to every request. A 401 from the server purges the session, both in
//! memory and on disk, so the next call has to log in again.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    dashboard::{CountSnapshot, CountSource},
    dto::{admin::DashboardSummary, auth::LoginResponse},
    models::User,
    response::ApiResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Session expired, log in again")]
    AuthExpired,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: User,
}

/// Signed-in state for one API user, optionally backed by a file.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
    path: Option<PathBuf>,
}

impl Session {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restores a session persisted by [`Session::persist`]. A missing file
    /// yields an empty session bound to that path.
    pub async fn rehydrate(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let stored = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(serde_json::from_slice::<StoredSession>(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        Ok(match stored {
            Some(StoredSession { token, user }) => Self {
                token: Some(token),
                user: Some(user),
                path: Some(path),
            },
            None => Self {
                path: Some(path),
                ..Self::default()
            },
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub async fn sign_in(&mut self, token: String, user: User) -> Result<(), ClientError> {
        self.token = Some(token);
        self.user = Some(user);
        self.persist().await
    }

    pub async fn persist(&self) -> Result<(), ClientError> {
        let (Some(path), Some(token), Some(user)) = (&self.path, &self.token, &self.user) else {
            return Ok(());
        };
        let stored = StoredSession {
            token: token.clone(),
            user: user.clone(),
        };
        tokio::fs::write(path, serde_json::to_vec_pretty(&stored)?).await?;
        Ok(())
    }

    /// Clears the credential from memory and removes the backing file.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.token = None;
        self.user = None;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<User, ClientError> {
        let request = self
            .request(Method::POST, "/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response = request.send().await?;

        // A 401 here means bad credentials, not an expired session.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Self::api_error(response).await);
        }
        let LoginResponse { token, user } = Self::parse(response).await?;
        session.sign_in(token, user.clone()).await?;
        tracing::debug!(user_id = %user.id, "signed in");
        Ok(user)
    }

    pub async fn me(&self, session: &mut Session) -> Result<User, ClientError> {
        self.authed(session, Method::GET, "/api/auth/me").await
    }

    pub async fn dashboard(&self, session: &mut Session) -> Result<DashboardSummary, ClientError> {
        self.authed(session, Method::GET, "/api/admin/dashboard").await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn authed<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        method: Method,
        path: &str,
    ) -> Result<T, ClientError> {
        let token = session.token().ok_or(ClientError::NotLoggedIn)?;
        let response = self.request(method, path).bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "token rejected, clearing session");
            session.logout().await?;
            return Err(ClientError::AuthExpired);
        }
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let status = response.status().as_u16();
        let envelope = response.json::<ApiResponse<T>>().await?;
        envelope.data.ok_or(ClientError::Api {
            status,
            message: format!("response had no data: {}", envelope.message),
        })
    }

    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<ErrorBody>>(&text)
            .ok()
            .and_then(|envelope| {
                envelope
                    .data
                    .and_then(|body| body.error)
                    .or(Some(envelope.message))
            })
            .unwrap_or(text);
        ClientError::Api { status, message }
    }
}

impl From<&DashboardSummary> for CountSnapshot {
    fn from(summary: &DashboardSummary) -> Self {
        Self {
            quotes: summary.total_quotes,
            users: summary.total_users,
            enquiries: summary.total_enquiries,
            contacts: summary.total_contacts,
        }
    }
}

/// Dashboard counts read over HTTP. Logs in whenever the session is empty,
/// which includes right after a 401 purged it.
pub struct AdminFeed {
    client: ApiClient,
    session: Session,
    email: String,
    password: String,
}

impl AdminFeed {
    pub fn new(client: ApiClient, session: Session, email: String, password: String) -> Self {
        Self {
            client,
            session,
            email,
            password,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl CountSource for AdminFeed {
    async fn fetch_counts(&mut self) -> anyhow::Result<CountSnapshot> {
        if !self.session.is_authenticated() {
            self.client
                .login(&mut self.session, &self.email, &self.password)
                .await?;
        }
        let summary = self.client.dashboard(&mut self.session).await?;
        Ok(CountSnapshot::from(&summary))
    }
}

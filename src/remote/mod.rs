//! HTTP client for the remote directory store.
//!
//! All requests and responses use JSON bodies. Non-2xx responses carry an
//! optional structured `{"error": "..."}` message. Transient transport
//! errors are retried a fixed number of times with linear backoff; HTTP
//! errors are never retried.

use std::time::Duration;

use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{
    AppData, Credentials, Professor, ProfessorPayload, RegisterRequest, UserAccount,
};

/// Error body shape used by the remote store on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the remote directory store.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl RemoteClient {
    /// Build a client for the given API base URL. The optional token is
    /// attached to every request as a bearer credential.
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<&str>,
        retry_attempts: u32,
        retry_backoff: Duration,
    ) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(token) = api_token {
            let mut headers = header::HeaderMap::new();
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Internal(format!("Invalid API token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_attempts: retry_attempts.max(1),
            retry_backoff,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, retrying transport failures with linear backoff
    /// (attempt N sleeps N * base before retrying). An HTTP response of any
    /// status ends the retry loop; only failures to get a response at all
    /// are considered transient.
    async fn send_with_retry<F>(&self, name: &str, build: F) -> Result<reqwest::Response, AppError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            if attempt > 1 {
                tracing::debug!(request = name, attempt, "Retrying remote request");
            }

            match build(&self.http).send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.retry_attempts => {
                    let backoff = self.retry_backoff * attempt;
                    tracing::warn!(
                        request = name,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Transport error, will retry: {}",
                        err
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    tracing::warn!(
                        request = name,
                        attempt,
                        "Transport error, retries exhausted: {}",
                        err
                    );
                    return Err(err.into());
                }
            }
        }
    }

    /// Turn a response into a decoded body or an [`AppError::Remote`].
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| {
                AppError::MalformedPayload(format!("Unexpected response body: {}", e))
            })
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            Err(AppError::Remote {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Like [`Self::decode`] but for endpoints with no meaningful body.
    async fn expect_success(response: reqwest::Response) -> Result<(), AppError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            Err(AppError::Remote {
                status: status.as_u16(),
                message,
            })
        }
    }

    // ==================== DIRECTORY OPERATIONS ====================

    /// GET /directory - Fetch the full aggregate.
    pub async fn fetch_directory(&self) -> Result<AppData, AppError> {
        let url = self.url("/directory");
        let response = self
            .send_with_retry("fetch_directory", |http| http.get(&url))
            .await?;
        Self::decode(response).await
    }

    /// POST /professors - Create a professor record; the server assigns the
    /// identifier.
    pub async fn create_professor(
        &self,
        payload: &ProfessorPayload,
    ) -> Result<Professor, AppError> {
        let url = self.url("/professors");
        let response = self
            .send_with_retry("create_professor", |http| http.post(&url).json(payload))
            .await?;
        Self::decode(response).await
    }

    /// PUT /professors/:id - Update a professor record.
    pub async fn update_professor(
        &self,
        id: &str,
        payload: &ProfessorPayload,
    ) -> Result<Professor, AppError> {
        let url = self.url(&format!("/professors/{}", id));
        let response = self
            .send_with_retry("update_professor", |http| http.put(&url).json(payload))
            .await?;
        Self::decode(response).await
    }

    /// DELETE /professors/:id - Delete a professor record.
    pub async fn delete_professor(&self, id: &str) -> Result<(), AppError> {
        let url = self.url(&format!("/professors/{}", id));
        let response = self
            .send_with_retry("delete_professor", |http| http.delete(&url))
            .await?;
        Self::expect_success(response).await
    }

    /// DELETE /departments/:id - Delete a department.
    pub async fn delete_department(&self, id: &str) -> Result<(), AppError> {
        let url = self.url(&format!("/departments/{}", id));
        let response = self
            .send_with_retry("delete_department", |http| http.delete(&url))
            .await?;
        Self::expect_success(response).await
    }

    // ==================== AUTH OPERATIONS ====================

    /// POST /auth/register - Register a new account.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserAccount, AppError> {
        let url = self.url("/auth/register");
        let response = self
            .send_with_retry("register", |http| http.post(&url).json(request))
            .await?;
        Self::decode(response).await
    }

    /// POST /auth/login - Authenticate and return the account.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserAccount, AppError> {
        let url = self.url("/auth/login");
        let response = self
            .send_with_retry("login", |http| http.post(&url).json(credentials))
            .await?;
        Self::decode(response).await
    }

    /// POST /auth/logout - End the server-side session.
    pub async fn logout(&self) -> Result<(), AppError> {
        let url = self.url("/auth/logout");
        let response = self
            .send_with_retry("logout", |http| http.post(&url))
            .await?;
        Self::expect_success(response).await
    }

    /// GET /auth/me - Look up the currently authenticated account.
    pub async fn current_user(&self) -> Result<UserAccount, AppError> {
        let url = self.url("/auth/me");
        let response = self
            .send_with_retry("current_user", |http| http.get(&url))
            .await?;
        Self::decode(response).await
    }
}

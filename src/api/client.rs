use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Invalid response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(body),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            _ => ApiError::Server(format!("{}: {}", status, body)),
        }
    }
}

/// HTTP client for the portal backend. Cheap to clone; clones share the
/// bearer token slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    base_url: String,
    api_key: String,
    client: Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        // On wasm, we can't use timeout
        #[cfg(target_arch = "wasm32")]
        let client = Client::new();

        #[cfg(not(target_arch = "wasm32"))]
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        ApiClient {
            inner: Arc::new(ApiClientInner {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
                client,
                token: RwLock::new(None),
            }),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.inner.token.write() {
            *guard = token;
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.inner.token.read().ok().and_then(|t| t.clone())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Attach the api key and, when signed in, the bearer token. Requests made
    /// before sign-in authenticate with the api key alone.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.get_token().unwrap_or_else(|| self.inner.api_key.clone());
        let request = request.header("apikey", &self.inner.api_key);
        if bearer.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", bearer))
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url(path))
            .header("Accept", "application/json");

        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.url(path)).json(body);

        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// POST without a body, ignoring any response payload.
    pub async fn post_no_response(&self, path: &str) -> Result<(), ApiError> {
        let request = self.inner.client.post(self.url(path));

        let response = self.authorize(request).send().await?;
        self.handle_empty_response(response).await
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, text))
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => {
                response.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::from_status(status, text))
            }
        }
    }
}

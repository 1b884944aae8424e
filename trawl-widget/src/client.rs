use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::auth::{AuthError, Session};
use crate::query::{SearchRequest, SearchResponse, Suggestion};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pinned protocol version of the query API. Bootstrap selects this once;
/// it becomes a path segment of every endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    #[default]
    V1,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("v1"),
        }
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("query endpoint returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("failed to decode query response: {0}")]
    Decode(String),
}

/// Transport to the backend query service.
///
/// The search, ranking, and suggestion engines live behind this seam; the
/// widgets only ever see the wire contract.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, QueryError>;

    async fn suggest(
        &self,
        query: &str,
        search_application_id: &str,
    ) -> Result<Vec<Suggestion>, QueryError>;
}

/// HTTP implementation of [`QueryClient`] against a query API base URL.
pub struct HttpQueryClient {
    http: reqwest::Client,
    base_url: String,
    api_version: ApiVersion,
    session: Arc<Session>,
}

impl HttpQueryClient {
    pub fn new(base_url: &str, api_version: ApiVersion, session: Arc<Session>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        HttpQueryClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, path)
    }

    async fn call<B, T>(&self, path: &str, body: &B) -> Result<T, QueryError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let bearer = self.session.bearer()?;
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| QueryError::Decode(e.to_string()))
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, QueryError> {
        self.call("query/search", &request).await
    }

    async fn suggest(
        &self,
        query: &str,
        search_application_id: &str,
    ) -> Result<Vec<Suggestion>, QueryError> {
        let body = serde_json::json!({
            "query": query,
            "searchApplicationId": search_application_id,
        });
        let response: SuggestResponse = self.call("query/suggest", &body).await?;
        Ok(response.suggestions)
    }
}

use std::sync::RwLock;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// OAuth scope granting read access to the query API.
pub const QUERY_SCOPE: &str = "search.query";

/// Client identity presented to the auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub scope: String,
}

impl Credentials {
    /// Credentials for the fixed read-query scope.
    pub fn query(client_id: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            scope: QUERY_SCOPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("session is not authenticated")]
    NotAuthenticated,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("failed to decode token response: {0}")]
    Decode(String),
}

/// Shared auth session.
///
/// Created empty during bootstrap and filled in by [`Session::init`], which
/// runs as the last initialization step. A query issued before the token is
/// installed fails with [`AuthError::NotAuthenticated`] rather than going
/// out unsigned. The token-granting flow behind the endpoint is the
/// backend's concern; only the init call and the bearer handoff live here.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<AccessToken>>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Request a token for `credentials` and install it in the session.
    pub async fn init(
        &self,
        http: &reqwest::Client,
        token_url: &str,
        credentials: &Credentials,
    ) -> Result<(), AuthError> {
        let response = http
            .post(token_url)
            .json(&serde_json::json!({
                "clientId": credentials.client_id,
                "scope": credentials.scope,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status {
                code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let token: AccessToken =
            serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))?;
        info!(scope = %credentials.scope, "auth session initialized");
        self.install(token);
        Ok(())
    }

    /// Install an externally obtained token.
    pub fn install(&self, token: AccessToken) {
        *self.token.write().unwrap() = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap().is_some()
    }

    /// The current bearer token, or [`AuthError::NotAuthenticated`] if
    /// [`Session::init`] has not completed.
    pub fn bearer(&self) -> Result<String, AuthError> {
        self.token
            .read()
            .unwrap()
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(AuthError::NotAuthenticated)
    }
}

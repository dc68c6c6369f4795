//! Map-service access token.

use serde::Deserialize;
use strum_macros::{AsRefStr, Display};

use crate::{BackendConfig, BackendError, check_status};

/// Edge function that hands out map tokens.
pub const TOKEN_FUNCTION: &str = "get-map-token";

/// Issues bearer tokens for map tiles and geocoding.
#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Requests a token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the service is unreachable or refuses.
    async fn fetch_token(&self) -> Result<String, BackendError>;
}

/// Calls the token edge function.
pub struct HttpTokenService {
    client: reqwest::Client,
    url: String,
    anon_key: String,
}

impl HttpTokenService {
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.function_url(TOKEN_FUNCTION),
            anon_key: config.anon_key.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[async_trait::async_trait]
impl TokenService for HttpTokenService {
    async fn fetch_token(&self) -> Result<String, BackendError> {
        let resp = self
            .client
            .post(&self.url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;
        let resp = check_status(resp, TOKEN_FUNCTION).await?;

        let body: TokenResponse = resp.json().await?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BackendError::Service {
                message: format!("{TOKEN_FUNCTION} response has no token"),
            })
    }
}

/// A token service with a fixed answer.
pub struct StaticTokenService {
    token: Option<String>,
}

impl StaticTokenService {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A service whose every request fails.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { token: None }
    }
}

#[async_trait::async_trait]
impl TokenService for StaticTokenService {
    async fn fetch_token(&self) -> Result<String, BackendError> {
        self.token.clone().ok_or_else(|| BackendError::Service {
            message: "token service unavailable".to_string(),
        })
    }
}

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TokenSource {
    Service,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub source: TokenSource,
}

/// Fetches a token, substituting `fallback` if the service fails.
///
/// Never fails. The fallback is logged at `warn` so a degraded map can be
/// traced back to the token service.
pub async fn resolve_token(service: &dyn TokenService, fallback: &str) -> ResolvedToken {
    match service.fetch_token().await {
        Ok(token) => ResolvedToken {
            token,
            source: TokenSource::Service,
        },
        Err(e) => {
            log::warn!("Map token request failed ({e}); using fallback token");
            ResolvedToken {
                token: fallback.to_string(),
                source: TokenSource::Fallback,
            }
        }
    }
}

//! Backend connection settings read from the environment.

use crate::BackendError;

/// Base URL of the hosted backend (REST tables and edge functions).
pub const BACKEND_URL_VAR: &str = "COWORK_MAP_BACKEND_URL";
/// Public (anonymous) API key sent with every request.
pub const ANON_KEY_VAR: &str = "COWORK_MAP_ANON_KEY";
/// Optional override for the boundary dataset location.
pub const BOUNDARIES_URL_VAR: &str = "COWORK_MAP_BOUNDARIES_URL";
/// Token used when the token service is unavailable.
pub const FALLBACK_TOKEN_VAR: &str = "COWORK_MAP_FALLBACK_TOKEN";

/// Path of the province boundary dataset relative to the backend URL.
pub const DEFAULT_BOUNDARIES_PATH: &str = "/storage/v1/object/public/geo/bulgaria-provinces.geojson";

/// Placeholder fallback token compiled in when none is configured.
///
/// It authorizes nothing; a map rendered with it shows no tiles.
pub const PLACEHOLDER_FALLBACK_TOKEN: &str = "pk.cowork-map-placeholder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub backend_url: String,
    pub anon_key: String,
    pub boundaries_url: String,
    pub fallback_token: String,
}

impl BackendConfig {
    /// Reads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if `COWORK_MAP_BACKEND_URL` is not
    /// set.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if the backend URL is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BackendError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = get(BACKEND_URL_VAR)
            .ok_or_else(|| BackendError::Config {
                message: format!("{BACKEND_URL_VAR} environment variable not set"),
            })?
            .trim_end_matches('/')
            .to_string();

        let anon_key = get(ANON_KEY_VAR).unwrap_or_else(|| {
            log::warn!("{ANON_KEY_VAR} not set; backend requests will be anonymous");
            String::new()
        });

        let boundaries_url = get(BOUNDARIES_URL_VAR)
            .unwrap_or_else(|| format!("{backend_url}{DEFAULT_BOUNDARIES_PATH}"));

        let fallback_token = get(FALLBACK_TOKEN_VAR).unwrap_or_else(|| {
            log::warn!(
                "{FALLBACK_TOKEN_VAR} not set; a token service failure will fall back to a placeholder token"
            );
            PLACEHOLDER_FALLBACK_TOKEN.to_string()
        });

        Ok(Self {
            backend_url,
            anon_key,
            boundaries_url,
            fallback_token,
        })
    }

    /// URL of an edge function.
    #[must_use]
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{name}", self.backend_url)
    }

    /// URL of a REST table endpoint, `query` without the leading `?`.
    #[must_use]
    pub fn table_url(&self, table: &str, query: &str) -> String {
        format!("{}/rest/v1/{table}?{query}", self.backend_url)
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Clients for the hosted backend the map reads from.
//!
//! Three collaborators are fetched once when the map mounts: the province
//! boundary dataset, a map-service access token, and the approved location
//! listings. Each sits behind an async trait with an HTTP implementation
//! and an in-memory one.

pub mod boundary;
pub mod config;
pub mod locations;
pub mod token;

pub use config::BackendConfig;

use cowork_map_province::ProvinceError;
use thiserror::Error;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Boundary dataset could not be loaded.
    #[error("Boundary error: {0}")]
    Boundary(#[from] ProvinceError),

    /// The backend answered with an error.
    #[error("Service error: {message}")]
    Service {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// Turns a non-success response into [`BackendError::Service`].
pub(crate) async fn check_status(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Service {
        message: format!("{what} returned HTTP {status}: {body}"),
    })
}

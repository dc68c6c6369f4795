//! Province boundary dataset sources.

use std::path::PathBuf;

use cowork_map_province::fetch::{fetch_boundaries, read_boundaries};
use geojson::FeatureCollection;

use crate::BackendError;

/// Supplies the raw province boundary dataset.
#[async_trait::async_trait]
pub trait BoundarySource: Send + Sync {
    /// Fetches the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the dataset cannot be loaded.
    async fn fetch_boundaries(&self) -> Result<FeatureCollection, BackendError>;
}

/// Downloads the dataset from a static URL.
pub struct HttpBoundarySource {
    client: reqwest::Client,
    url: String,
}

impl HttpBoundarySource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl BoundarySource for HttpBoundarySource {
    async fn fetch_boundaries(&self) -> Result<FeatureCollection, BackendError> {
        Ok(fetch_boundaries(&self.client, &self.url).await?)
    }
}

/// Reads the dataset from a local `GeoJSON` file.
pub struct FileBoundarySource {
    path: PathBuf,
}

impl FileBoundarySource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl BoundarySource for FileBoundarySource {
    async fn fetch_boundaries(&self) -> Result<FeatureCollection, BackendError> {
        log::info!("Reading boundaries from {}", self.path.display());
        Ok(read_boundaries(&self.path)?)
    }
}

/// Serves a dataset held in memory, or always fails when built with
/// [`StaticBoundarySource::unavailable`].
pub struct StaticBoundarySource {
    data: Option<FeatureCollection>,
}

impl StaticBoundarySource {
    #[must_use]
    pub const fn new(data: FeatureCollection) -> Self {
        Self { data: Some(data) }
    }

    #[must_use]
    pub const fn unavailable() -> Self {
        Self { data: None }
    }
}

#[async_trait::async_trait]
impl BoundarySource for StaticBoundarySource {
    async fn fetch_boundaries(&self) -> Result<FeatureCollection, BackendError> {
        self.data.clone().ok_or_else(|| BackendError::Service {
            message: "boundary dataset unavailable".to_string(),
        })
    }
}

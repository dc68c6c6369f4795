//! Loads the raw province boundary dataset.
//!
//! The dataset is a static `GeoJSON` `FeatureCollection`, fetched once from
//! a URL or read from a local file.

use std::path::Path;

use geojson::{FeatureCollection, GeoJson};

use crate::ProvinceError;

/// Fetches the boundary `FeatureCollection` from a URL.
///
/// # Errors
///
/// Returns [`ProvinceError`] if the request fails, the server answers with
/// a non-success status, or the body is not a `FeatureCollection`.
pub async fn fetch_boundaries(
    client: &reqwest::Client,
    url: &str,
) -> Result<FeatureCollection, ProvinceError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(ProvinceError::Conversion {
            message: format!("Boundary request failed with status {}", resp.status()),
        });
    }
    let body = resp.text().await?;

    let collection = parse_boundaries(&body)?;
    log::info!(
        "Fetched {} boundary features from {url}",
        collection.features.len()
    );

    Ok(collection)
}

/// Reads the boundary `FeatureCollection` from a local file.
///
/// # Errors
///
/// Returns [`ProvinceError`] if the file cannot be read or does not hold a
/// `FeatureCollection`.
pub fn read_boundaries(path: &Path) -> Result<FeatureCollection, ProvinceError> {
    let body = std::fs::read_to_string(path)?;
    parse_boundaries(&body)
}

/// Parses a `GeoJSON` document that must be a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`ProvinceError`] if the text is not JSON or is some other kind
/// of `GeoJSON` object.
pub fn parse_boundaries(body: &str) -> Result<FeatureCollection, ProvinceError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let geojson = GeoJson::from_json_value(value).map_err(|e| ProvinceError::Conversion {
        message: format!("Failed to parse boundary GeoJSON: {e}"),
    })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(ProvinceError::Conversion {
            message: "Boundary GeoJSON is not a FeatureCollection".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_collection() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name": "Варна", "name_en": "Varna" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[27,43],[28,43],[28,44],[27,44],[27,43]]]
                }
            }]
        }"#;
        let collection = parse_boundaries(body).unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn rejects_bare_geometry() {
        let body = r#"{ "type": "Point", "coordinates": [1, 2] }"#;
        assert!(matches!(
            parse_boundaries(body),
            Err(ProvinceError::Conversion { .. })
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_boundaries("{ not json"),
            Err(ProvinceError::Json(_))
        ));
    }

    #[test]
    fn reading_missing_file_is_io_error() {
        assert!(matches!(
            read_boundaries(Path::new("/nonexistent/provinces.geojson")),
            Err(ProvinceError::Io(_))
        ));
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Province boundary handling for the drill-down map.
//!
//! Loads the province boundary dataset once, repairs it into a clean
//! feature collection, derives the "donut" mask that darkens everything
//! outside the active selection, and answers point-in-province queries for
//! map clicks. Province name aliases are defined as TOML files embedded at
//! compile time.

pub mod fetch;
pub mod index;
pub mod mask;
pub mod normalize;
pub mod registry;

use cowork_map_province_models::{ProvinceCollection, ProvinceFeature};
use geo::{BoundingRect, Centroid, Coord, MultiPolygon, Rect};
use thiserror::Error;

/// Errors that can occur while loading province data.
#[derive(Debug, Error)]
pub enum ProvinceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local boundary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A registry TOML document failed to parse.
    #[error("Registry error: {0}")]
    Registry(#[from] toml::de::Error),

    /// Data conversion or shape error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Bounding box of every feature in the collection.
///
/// Returns `None` for an empty collection.
#[must_use]
pub fn collection_bounds(collection: &ProvinceCollection) -> Option<Rect<f64>> {
    collection
        .features
        .iter()
        .filter_map(|f| f.boundary.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                },
            )
        })
}

/// Centroid of the province named `raw`, as `[lng, lat]`.
///
/// Prefers a precomputed centroid carried by the dataset. Otherwise
/// computes the area-weighted centroid over every feature with that name.
#[must_use]
pub fn province_centroid(collection: &ProvinceCollection, raw: &str) -> Option<[f64; 2]> {
    let features: Vec<&ProvinceFeature> = collection.named(raw).collect();

    if let Some(hint) = features.iter().find_map(|f| f.centroid_hint) {
        return Some(hint);
    }

    let merged = MultiPolygon(
        features
            .iter()
            .flat_map(|f| f.boundary.0.iter().cloned())
            .collect(),
    );
    merged.centroid().map(|p| [p.x(), p.y()])
}

#[cfg(test)]
pub(crate) mod test_support {
    use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

    /// Builds a square polygon feature with a `name`/`name_en` pair.
    pub fn square_feature(name: &str, name_en: &str, x: f64, y: f64, size: f64) -> Feature {
        let ring = vec![
            vec![x, y],
            vec![x + size, y],
            vec![x + size, y + size],
            vec![x, y + size],
            vec![x, y],
        ];
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), name.into());
        properties.insert("name_en".to_string(), name_en.into());
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    pub fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::test_support::{collection, square_feature};

    #[test]
    fn bounds_cover_all_features() {
        let clean = normalize(&collection(vec![
            square_feature("Варна", "Varna", 27.0, 43.0, 1.0),
            square_feature("Бургас", "Burgas", 26.5, 42.0, 1.0),
        ]));
        let rect = collection_bounds(&clean).unwrap();
        assert!((rect.min().x - 26.5).abs() < 1e-9);
        assert!((rect.min().y - 42.0).abs() < 1e-9);
        assert!((rect.max().x - 28.0).abs() < 1e-9);
        assert!((rect.max().y - 44.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_of_empty_collection() {
        assert!(collection_bounds(&ProvinceCollection::default()).is_none());
    }

    #[test]
    fn centroid_falls_back_to_geometry() {
        let clean = normalize(&collection(vec![square_feature(
            "Варна", "Varna", 27.0, 43.0, 1.0,
        )]));
        let [lng, lat] = province_centroid(&clean, "Varna").unwrap();
        assert!((lng - 27.5).abs() < 1e-9);
        assert!((lat - 43.5).abs() < 1e-9);
    }

    #[test]
    fn centroid_prefers_dataset_hint() {
        let mut feature = square_feature("Варна", "Varna", 27.0, 43.0, 1.0);
        feature
            .properties
            .as_mut()
            .unwrap()
            .insert("centroid".to_string(), serde_json::json!([27.9, 43.2]));
        let clean = normalize(&collection(vec![feature]));
        assert_eq!(province_centroid(&clean, "varna"), Some([27.9, 43.2]));
    }

    #[test]
    fn centroid_of_unknown_province() {
        let clean = normalize(&collection(vec![square_feature(
            "Варна", "Varna", 27.0, 43.0, 1.0,
        )]));
        assert!(province_centroid(&clean, "Atlantis").is_none());
    }
}

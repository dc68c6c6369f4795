//! Repairs a raw province boundary dataset into a [`ProvinceCollection`].
//!
//! Keeps only polygon and multi-polygon features, removes consecutive
//! duplicate coordinates, closes rings, drops rings that cannot be repaired
//! (too few points, zero area, non-finite coordinates), drops polygons that
//! are still invalid afterwards (self-intersections) and rewinds the
//! result so exteriors are counter-clockwise and holes clockwise. Name
//! properties are resolved once here so downstream code never has to know
//! which key a dataset used.

use cowork_map_province_models::{ProvinceCollection, ProvinceFeature};
use geo::orient::{Direction, Orient};
use geo::{Area, Coord, LineString, MultiPolygon, Polygon, Validation};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value};

/// Property keys checked, in order, for the display name.
const DISPLAY_NAME_KEYS: &[&str] = &["name", "NAME_1", "name_bg"];

/// Property keys checked, in order, for the English match name.
const MATCH_NAME_KEYS: &[&str] = &["name_en", "NAME_EN", "name:en"];

/// Property holding a precomputed `[lng, lat]` centroid.
const CENTROID_KEY: &str = "centroid";

/// A closed ring needs three distinct points plus the closing point.
const MIN_RING_COORDS: usize = 4;

/// Normalizes a raw boundary feature collection.
///
/// Never fails: features that cannot be repaired are dropped and logged at
/// debug level. The input is not modified.
#[must_use]
pub fn normalize(raw: &FeatureCollection) -> ProvinceCollection {
    let features: Vec<ProvinceFeature> = raw
        .features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| normalize_feature(index, feature))
        .collect();

    log::debug!(
        "Normalized {} of {} boundary features",
        features.len(),
        raw.features.len()
    );

    ProvinceCollection { features }
}

/// Converts a clean collection back into `GeoJSON`, writing the canonical
/// `name`/`name_en`/`centroid` properties.
///
/// Normalizing the output again yields an identical collection.
#[must_use]
pub fn to_feature_collection(collection: &ProvinceCollection) -> FeatureCollection {
    let features = collection
        .features
        .iter()
        .map(|feature| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), feature.display_name.clone().into());
            properties.insert("name_en".to_string(), feature.match_name.clone().into());
            if let Some([lng, lat]) = feature.centroid_hint {
                properties.insert(CENTROID_KEY.to_string(), serde_json::json!([lng, lat]));
            }

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&feature.boundary))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn normalize_feature(index: usize, feature: &Feature) -> Option<ProvinceFeature> {
    let geometry = feature.geometry.as_ref()?;

    let repaired: Vec<Polygon<f64>> = match &geometry.value {
        Value::Polygon(rings) => build_polygon(rings).into_iter().collect(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| build_polygon(rings))
            .collect(),
        _ => return None,
    };

    let repaired_count = repaired.len();
    let polygons: Vec<Polygon<f64>> = repaired.into_iter().filter(Validation::is_valid).collect();
    if polygons.len() < repaired_count {
        log::debug!(
            "Boundary feature {index}: dropped {} invalid polygon(s)",
            repaired_count - polygons.len()
        );
    }

    if polygons.is_empty() {
        log::debug!("Dropping boundary feature {index}: no repairable polygon");
        return None;
    }

    let boundary = MultiPolygon(polygons).orient(Direction::Default);

    let empty = JsonObject::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);
    let display = first_string(properties, DISPLAY_NAME_KEYS);
    let english = first_string(properties, MATCH_NAME_KEYS);

    let display_name = display.clone().or_else(|| english.clone()).unwrap_or_default();
    let match_name = english.or(display).unwrap_or_default();

    if match_name.is_empty() {
        log::debug!("Boundary feature {index} has no name; it will not be selectable");
    }

    Some(ProvinceFeature {
        display_name,
        match_name,
        boundary,
        centroid_hint: centroid_hint(properties),
    })
}

fn build_polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| clean_ring(ring));
    let exterior = rings.next()??;
    let interiors: Vec<LineString<f64>> = rings.flatten().collect();
    Some(Polygon::new(exterior, interiors))
}

fn clean_ring(positions: &[Position]) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = positions
        .iter()
        .filter_map(|position| match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect();

    coords.dedup();

    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            coords.push(first);
        }
    }

    if coords.len() < MIN_RING_COORDS {
        return None;
    }

    let ring = LineString(coords);
    if Polygon::new(ring.clone(), vec![]).unsigned_area() == 0.0 {
        return None;
    }

    Some(ring)
}

fn first_string(properties: &JsonObject, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        properties
            .get(*key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    })
}

fn centroid_hint(properties: &JsonObject) -> Option<[f64; 2]> {
    let values = properties.get(CENTROID_KEY)?.as_array()?;
    match values.as_slice() {
        [lng, lat] => {
            let lng = lng.as_f64()?;
            let lat = lat.as_f64()?;
            (lng.is_finite() && lat.is_finite()).then_some([lng, lat])
        }
        _ => None,
    }
}

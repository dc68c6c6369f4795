//! Builds the "donut" mask polygon that darkens everything outside the
//! active selection.
//!
//! The mask's exterior is always the fixed world rectangle. With nothing
//! selected the holes are the dissolved outline of every province (so the
//! whole country stays lit); with a province selected they are the
//! dissolved outline of just that province.

use cowork_map_province_models::{ProvinceCollection, ProvinceFeature};
use geo::orient::{Direction, Orient};
use geo::{BooleanOps, LineString, MultiPolygon, Polygon, Validation, coord};

/// World extent covered by the mask, as `[min_lng, min_lat, max_lng, max_lat]`.
pub const WORLD_EXTENT: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

/// The closed, counter-clockwise world rectangle ring.
#[must_use]
pub fn world_ring() -> LineString<f64> {
    let [min_x, min_y, max_x, max_y] = WORLD_EXTENT;
    LineString::new(vec![
        coord! { x: min_x, y: min_y },
        coord! { x: max_x, y: min_y },
        coord! { x: max_x, y: max_y },
        coord! { x: min_x, y: max_y },
        coord! { x: min_x, y: min_y },
    ])
}

/// Builds the mask for the current selection.
///
/// `selected_raw_name` is matched against both names of each feature; a
/// province split across several features is dissolved into one outline.
/// Never fails: when the dissolve cannot run on the selected geometry the
/// un-dissolved exteriors are used as holes instead.
#[must_use]
pub fn build_mask(features: &ProvinceCollection, selected_raw_name: Option<&str>) -> Polygon<f64> {
    let dissolved = match selected_raw_name {
        Some(raw) => dissolve(features.named(raw)),
        None => dissolve(features.features.iter()),
    };

    let holes: Vec<LineString<f64>> = dissolved.0.into_iter().map(|p| p.into_inner().0).collect();

    log::debug!(
        "Built mask for {:?} with {} hole(s)",
        selected_raw_name,
        holes.len()
    );

    Polygon::new(world_ring(), holes).orient(Direction::Default)
}

/// Dissolves (unions) the given features into one multi-polygon.
///
/// If any input polygon fails validation (self-intersection, degenerate
/// rings) the union is skipped and the input polygons are returned as-is.
#[must_use]
pub fn dissolve<'a>(features: impl Iterator<Item = &'a ProvinceFeature>) -> MultiPolygon<f64> {
    let polygons: Vec<Polygon<f64>> = features
        .flat_map(|f| f.boundary.0.iter().cloned())
        .collect();

    if polygons.is_empty() {
        return MultiPolygon(vec![]);
    }

    if let Some(invalid) = polygons.iter().position(|p| !p.is_valid()) {
        log::warn!("Skipping dissolve: polygon {invalid} is not valid geometry");
        return MultiPolygon(polygons);
    }

    polygons
        .iter()
        .fold(MultiPolygon(vec![]), |acc, polygon| acc.union(polygon))
        .orient(Direction::Default)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Plain data exchanged between the drill-down logic and a map surface.
//!
//! Markers are described declaratively: the synchronizer produces a list of
//! [`MarkerDescriptor`]s and the surface decides how to draw them. Camera
//! changes are expressed as [`CameraTarget`]s (what to look at) that a
//! session resolves into [`CameraMove`]s (how to get there).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
}

impl LngLat {
    /// Creates a position.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl GeoBounds {
    /// Creates a bounding box, ordering each axis.
    #[must_use]
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west: west.min(east),
            south: south.min(north),
            east: west.max(east),
            north: south.max(north),
        }
    }

    /// Longitude span.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> LngLat {
        LngLat::new(
            f64::midpoint(self.west, self.east),
            f64::midpoint(self.south, self.north),
        )
    }

    /// Grows the box by `ratio` of its span on every side, clamped to the
    /// valid coordinate range.
    #[must_use]
    pub fn padded(&self, ratio: f64) -> Self {
        let dx = self.width() * ratio;
        let dy = self.height() * ratio;
        Self {
            west: (self.west - dx).max(-180.0),
            south: (self.south - dy).max(-90.0),
            east: (self.east + dx).min(180.0),
            north: (self.north + dy).min(90.0),
        }
    }

    /// Returns `true` if `p` lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, p: LngLat) -> bool {
        (self.west..=self.east).contains(&p.lng) && (self.south..=self.north).contains(&p.lat)
    }

    /// Moves `p` to the nearest point inside the box.
    #[must_use]
    pub fn clamp(&self, p: LngLat) -> LngLat {
        LngLat::new(
            p.lng.clamp(self.west, self.east),
            p.lat.clamp(self.south, self.north),
        )
    }
}

/// A point in screen pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the map viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either side has no extent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Where the camera is looking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Geographic center of the viewport.
    pub center: LngLat,
    /// Web-Mercator zoom level (0 = whole world in one 256 px tile).
    pub zoom: f64,
    /// Tilt in degrees.
    pub pitch: f64,
    /// Rotation in degrees clockwise from north.
    pub bearing: f64,
}

/// What the camera should show for a drill-down level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraTarget {
    /// Fit a bounding box into the viewport.
    Fit {
        /// Box to fit.
        bounds: GeoBounds,
    },
    /// Center on a point at a fixed zoom.
    Center {
        /// Point to center on.
        center: LngLat,
        /// Target zoom.
        zoom: f64,
    },
    /// Leave the camera where it is.
    Keep,
}

/// A camera change issued to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraMove {
    /// Move instantly.
    Jump {
        /// Destination.
        pose: CameraPose,
    },
    /// Animate over a fixed duration. A new move interrupts a running one.
    Fly {
        /// Destination.
        pose: CameraPose,
        /// Animation length in milliseconds.
        duration_ms: u64,
    },
}

impl CameraMove {
    /// Destination pose.
    #[must_use]
    pub const fn pose(&self) -> &CameraPose {
        match self {
            Self::Jump { pose } | Self::Fly { pose, .. } => pose,
        }
    }

    /// Returns `true` for animated moves.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        matches!(self, Self::Fly { .. })
    }
}

/// Visual style of a marker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarkerVariant {
    /// Per-province location count at the top level.
    ProvinceDot,
    /// Per-city aggregate within a province, sized by member count.
    CityAggregate,
    /// A single location.
    LocationPin,
    /// The location whose detail panel is open.
    SelectedPin,
}

/// What clicking a marker selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerTarget {
    /// A province, by registry name.
    Province {
        name: String,
    },
    /// A city aggregate, by display name.
    City {
        name: String,
    },
    /// A location, by record id.
    Location {
        id: String,
    },
}

/// A declarative marker: position, text, style, and click target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDescriptor {
    /// Stable identity used for hover tracking (e.g., `"city:варна"`).
    pub id: String,
    /// Anchor position.
    pub position: LngLat,
    /// Short badge text drawn on the marker.
    pub label: String,
    /// Longer text shown in the hover tooltip.
    pub title: String,
    /// Number of locations represented. Drives the marker size.
    pub weight: usize,
    pub variant: MarkerVariant,
    pub target: MarkerTarget,
}

/// Handle of a marker placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(pub u64);

/// Something under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HoverTarget {
    /// A province fill feature, by index in the boundary collection.
    Province {
        feature_index: usize,
    },
    /// A marker, by descriptor id.
    Marker {
        id: String,
    },
}

/// A transient tooltip anchored at the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub target: HoverTarget,
    pub text: String,
    pub anchor: ScreenPoint,
}

/// Geometry kind of a style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    Fill,
    Line,
}

/// A style layer drawing a named source.
///
/// When `hover_opacity` is set the surface uses it instead of `opacity` for
/// features whose `hover` feature-state flag is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    /// CSS color (e.g., `"#000000"`).
    pub color: String,
    pub opacity: f64,
    pub hover_opacity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_order_their_axes() {
        let b = GeoBounds::new(28.0, 44.0, 22.0, 41.0);
        assert_eq!(b, GeoBounds::new(22.0, 41.0, 28.0, 44.0));
        assert!((b.width() - 6.0).abs() < f64::EPSILON);
        assert!((b.height() - 3.0).abs() < f64::EPSILON);
        assert_eq!(b.center(), LngLat::new(25.0, 42.5));
    }

    #[test]
    fn padding_grows_and_clamps() {
        let b = GeoBounds::new(22.0, 41.0, 28.0, 44.0).padded(0.1);
        assert!((b.west - 21.4).abs() < 1e-9);
        assert!((b.north - 44.3).abs() < 1e-9);

        let world = GeoBounds::new(-180.0, -90.0, 180.0, 90.0).padded(0.5);
        assert_eq!(world, GeoBounds::new(-180.0, -90.0, 180.0, 90.0));
    }

    #[test]
    fn clamps_points_into_bounds() {
        let b = GeoBounds::new(22.0, 41.0, 28.0, 44.0);
        assert!(b.contains(LngLat::new(25.0, 42.0)));
        assert!(!b.contains(LngLat::new(30.0, 42.0)));
        assert_eq!(b.clamp(LngLat::new(30.0, 40.0)), LngLat::new(28.0, 41.0));
    }

    #[test]
    fn camera_move_exposes_destination() {
        let pose = CameraPose {
            center: LngLat::new(27.9, 43.2),
            zoom: 8.0,
            pitch: 0.0,
            bearing: 0.0,
        };
        let fly = CameraMove::Fly {
            pose,
            duration_ms: 1200,
        };
        assert!(fly.is_animated());
        assert_eq!(fly.pose(), &pose);
        assert!(!CameraMove::Jump { pose }.is_animated());
    }

    #[test]
    fn marker_serializes_with_tagged_target() {
        let marker = MarkerDescriptor {
            id: "city:варна".to_string(),
            position: LngLat::new(27.91, 43.21),
            label: "1".to_string(),
            title: "Варна".to_string(),
            weight: 1,
            variant: MarkerVariant::CityAggregate,
            target: MarkerTarget::City {
                name: "Варна".to_string(),
            },
        };
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["variant"], "city_aggregate");
        assert_eq!(json["target"]["type"], "city");
        assert_eq!(json["target"]["name"], "Варна");
    }
}

//! Viewport tuning.

use serde::{Deserialize, Serialize};

/// Default map style.
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/light-v11";

/// Camera and interaction constants for the drill-down map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Style loaded when the session opens.
    pub style_url: String,
    /// Zoom used when a province is selected.
    pub province_zoom: f64,
    /// Zoom used when a city is selected.
    pub city_zoom: f64,
    /// Length of every animated camera move.
    pub flight_duration_ms: u64,
    /// Pixels kept free around a fitted bounding box.
    pub fit_padding: f64,
    pub pitch: f64,
    pub bearing: f64,
    /// Fraction of the province-set span added around the pan bounds.
    pub pan_padding_ratio: f64,
    /// Pointer distance in pixels within which a marker counts as hit.
    pub marker_hit_radius: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            style_url: DEFAULT_STYLE_URL.to_string(),
            province_zoom: 8.0,
            city_zoom: 12.0,
            flight_duration_ms: 1200,
            fit_padding: 40.0,
            pitch: 0.0,
            bearing: 0.0,
            pan_padding_ratio: 0.1,
            marker_hit_radius: 12.0,
        }
    }
}

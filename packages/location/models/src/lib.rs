#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Workspace listing records as read from the backend.
//!
//! Records are read-only to the map. Coordinates arrive either as numbers
//! or as numeric strings depending on how the listing was entered, so they
//! are kept raw and parsed on demand.

use serde::{Deserialize, Serialize};

/// A latitude or longitude as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    /// Stored as a JSON number.
    Number(f64),
    /// Stored as text (e.g., `"43.21"`).
    Text(String),
}

impl RawCoordinate {
    /// Parses the coordinate, returning `None` unless it is a finite number.
    #[must_use]
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawCoordinate {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawCoordinate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Display fields of the company that owns a location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanySummary {
    /// Company name.
    pub name: String,
    /// Public URL of the company logo, if uploaded.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A rentable workspace listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Backend row identifier.
    pub id: String,
    /// Listing name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Free-text city as typed by the host (e.g., `"Варна"`,
    /// `"Sofia, Bulgaria"`, `"Пловдив област"`).
    #[serde(default)]
    pub city: Option<String>,
    /// Latitude, possibly as text.
    #[serde(default)]
    pub latitude: Option<RawCoordinate>,
    /// Longitude, possibly as text.
    #[serde(default)]
    pub longitude: Option<RawCoordinate>,
    /// Price per month in the listing currency.
    #[serde(default)]
    pub price: Option<f64>,
    /// Average rating (0-5).
    #[serde(default)]
    pub rating: Option<f64>,
    /// Amenity tags (e.g., `"wifi"`, `"parking"`).
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Owning company row identifier.
    #[serde(default)]
    pub company_id: Option<String>,
    /// Denormalized company display fields.
    #[serde(default)]
    pub company: Option<CompanySummary>,
}

impl LocationRecord {
    /// Returns `[lng, lat]` if both coordinates parse to finite numbers.
    ///
    /// Records without a position are never placed on the map.
    #[must_use]
    pub fn position(&self) -> Option<[f64; 2]> {
        let lat = self.latitude.as_ref()?.parse()?;
        let lng = self.longitude.as_ref()?.parse()?;
        Some([lng, lat])
    }

    /// Returns `true` if the record can be placed on the map.
    #[must_use]
    pub fn is_mappable(&self) -> bool {
        self.position().is_some()
    }

    /// The city string, if present and not blank.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Drill-down selection state, events, and derived city aggregates.
//!
//! The selection is a cursor over four levels: nothing selected, a
//! province, a city within it, and a single location within that city.
//! [`SelectionState`] is an enum so that a deeper level always carries
//! every shallower identity and never anything deeper.

use cowork_map_location_models::LocationRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Depth of the drill-down cursor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DrillLevel {
    /// Nothing selected; the whole country is in view.
    None,
    /// A province is selected.
    Province,
    /// A city within the selected province is selected.
    City,
    /// A single location is selected and its detail panel is open.
    Location,
}

/// The drill-down cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum SelectionState {
    /// Nothing selected.
    #[default]
    None,
    /// A province is selected.
    Province {
        /// Registry name of the selected province.
        province: String,
    },
    /// A city is selected.
    City {
        /// Registry name of the selected province.
        province: String,
        /// Display name of the selected city aggregate.
        city: String,
    },
    /// A location is selected.
    Location {
        /// Registry name of the selected province.
        province: String,
        /// Display name of the selected city aggregate.
        city: String,
        /// Identifier of the selected location record.
        location_id: String,
    },
}

impl SelectionState {
    /// The drill-down level of this state.
    #[must_use]
    pub const fn level(&self) -> DrillLevel {
        match self {
            Self::None => DrillLevel::None,
            Self::Province { .. } => DrillLevel::Province,
            Self::City { .. } => DrillLevel::City,
            Self::Location { .. } => DrillLevel::Location,
        }
    }

    /// The selected province, set at every level below `None`.
    #[must_use]
    pub fn province_name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Province { province }
            | Self::City { province, .. }
            | Self::Location { province, .. } => Some(province),
        }
    }

    /// The selected city, set at `City` and `Location`.
    #[must_use]
    pub fn city_name(&self) -> Option<&str> {
        match self {
            Self::None | Self::Province { .. } => None,
            Self::City { city, .. } | Self::Location { city, .. } => Some(city),
        }
    }

    /// The selected location, set only at `Location`.
    #[must_use]
    pub fn location_id(&self) -> Option<&str> {
        match self {
            Self::Location { location_id, .. } => Some(location_id),
            _ => None,
        }
    }
}

/// A user interaction routed into the selection machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// A province feature was clicked. Carries the feature's raw name.
    ClickProvince {
        /// Name read from the clicked feature.
        name: String,
    },
    /// A city aggregate marker was clicked.
    ClickCity {
        /// Display name of the city aggregate.
        name: String,
    },
    /// A location pin was clicked.
    ClickLocation {
        /// Identifier of the location record.
        id: String,
    },
    /// The detail panel's close control was used.
    ClosePanel,
    /// The explicit reset control was used.
    Reset,
}

/// Outcome of feeding an event to the selection machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed.
    Applied {
        /// Level before the event.
        from: DrillLevel,
        /// Level after the event.
        to: DrillLevel,
    },
    /// The event does not apply to the current state; nothing changed.
    Ignored,
}

impl Transition {
    /// Returns `true` if the state changed.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Locations within a selected province that share a cleaned city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    /// Title-cased display name (e.g., `"Стара Загора"`).
    pub name: String,
    /// Cleaned, lower-case grouping key.
    pub key: String,
    /// Mean `[lng, lat]` of the members.
    pub centroid: [f64; 2],
    /// Member locations. Every member has a valid position.
    pub members: Vec<LocationRecord>,
}

impl CityAggregate {
    /// Number of member locations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

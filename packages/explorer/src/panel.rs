//! Side-panel models derived from the selection.

use cowork_map_location_models::LocationRecord;
use cowork_map_selection::SelectionMachine;
use cowork_map_selection_models::DrillLevel;
use serde::Serialize;

/// Detail panel for the selected location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPanel {
    /// Location id.
    pub id: String,
    /// Listing title.
    pub name: String,
    /// Street address as listed.
    pub address: String,
    /// Free-text city, if the listing has one.
    pub city: Option<String>,
    /// Price per period, when listed.
    pub price: Option<f64>,
    /// Average rating, when rated.
    pub rating: Option<f64>,
    /// Amenity labels.
    pub amenities: Vec<String>,
    /// Operating company, if known.
    pub company_name: Option<String>,
    /// Logo of the operating company.
    pub company_logo_url: Option<String>,
}

impl From<&LocationRecord> for DetailPanel {
    fn from(record: &LocationRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            address: record.address.clone(),
            city: record.city().map(ToString::to_string),
            price: record.price,
            rating: record.rating,
            amenities: record.amenities.clone(),
            company_name: record.company.as_ref().map(|c| c.name.clone()),
            company_logo_url: record.company.as_ref().and_then(|c| c.logo_url.clone()),
        }
    }
}

/// One step of the breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub label: String,
    /// Level the user returns to by following this crumb.
    pub level: DrillLevel,
}

pub const ROOT_CRUMB_LABEL: &str = "All provinces";

/// Breadcrumb trail from the country down to the current selection.
#[must_use]
pub fn breadcrumb(machine: &SelectionMachine) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: ROOT_CRUMB_LABEL.to_string(),
        level: DrillLevel::None,
    }];

    if let Some(province) = machine.province() {
        crumbs.push(Crumb {
            label: province.native_name.clone(),
            level: DrillLevel::Province,
        });
    }
    if let Some(city) = machine.state().city_name() {
        crumbs.push(Crumb {
            label: city.to_string(),
            level: DrillLevel::City,
        });
    }
    if let Some(location) = machine.selected_location() {
        crumbs.push(Crumb {
            label: location.name.clone(),
            level: DrillLevel::Location,
        });
    }

    crumbs
}

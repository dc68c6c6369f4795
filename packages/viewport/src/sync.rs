//! Derives what the map should show from the selection.

use cowork_map_location_models::LocationRecord;
use cowork_map_province::{collection_bounds, mask::build_mask, province_centroid};
use cowork_map_province_models::ProvinceCollection;
use cowork_map_selection::{SelectionMachine, aggregate::count_by_province};
use cowork_map_selection_models::{CityAggregate, DrillLevel};
use cowork_map_viewport_models::{
    CameraTarget, GeoBounds, LngLat, MarkerDescriptor, MarkerTarget, MarkerVariant,
};
use geo::Polygon;

use crate::config::ViewportConfig;

/// The camera, markers, and mask for one selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewFrame {
    /// Where the camera flies.
    pub camera: CameraTarget,
    /// Full marker set; replaces whatever was drawn before.
    pub markers: Vec<MarkerDescriptor>,
    /// World rectangle with the lit area cut out.
    pub mask: Polygon<f64>,
}

/// Maps selection states to view frames.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    config: ViewportConfig,
}

impl Synchronizer {
    #[must_use]
    pub const fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Builds the frame for the machine's current state.
    ///
    /// `click` is where the user clicked to select a province. It is used
    /// as the camera target when the province has no computable centroid.
    #[must_use]
    pub fn frame(
        &self,
        machine: &SelectionMachine,
        provinces: &ProvinceCollection,
        click: Option<LngLat>,
    ) -> ViewFrame {
        let raw_name = machine.province().map(|def| {
            machine
                .registry()
                .raw_name_in(def, provinces)
                .unwrap_or(def.name.as_str())
        });

        let mask = build_mask(provinces, raw_name);

        let (camera, markers) = match machine.state().level() {
            DrillLevel::None => (
                collection_bounds(provinces).map_or(CameraTarget::Keep, |rect| CameraTarget::Fit {
                    bounds: GeoBounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
                }),
                province_dots(machine, provinces),
            ),
            DrillLevel::Province => {
                let center = raw_name
                    .and_then(|raw| province_centroid(provinces, raw))
                    .map(LngLat::from)
                    .or(click);
                (
                    center.map_or(CameraTarget::Keep, |center| CameraTarget::Center {
                        center,
                        zoom: self.config.province_zoom,
                    }),
                    machine.aggregates().iter().map(city_marker).collect(),
                )
            }
            DrillLevel::City => (
                machine
                    .city()
                    .map_or(CameraTarget::Keep, |city| CameraTarget::Center {
                        center: city.centroid.into(),
                        zoom: self.config.city_zoom,
                    }),
                location_pins(machine),
            ),
            DrillLevel::Location => (CameraTarget::Keep, location_pins(machine)),
        };

        log::debug!(
            "Frame for {}: camera {:?}, {} marker(s), {} mask hole(s)",
            machine.state().level(),
            camera,
            markers.len(),
            mask.interiors().len()
        );

        ViewFrame {
            camera,
            markers,
            mask,
        }
    }
}

fn province_dots(machine: &SelectionMachine, provinces: &ProvinceCollection) -> Vec<MarkerDescriptor> {
    let registry = machine.registry();
    count_by_province(machine.records(), registry.definitions())
        .into_iter()
        .filter_map(|(def, count)| {
            let raw = registry.raw_name_in(def, provinces)?;
            let Some(position) = province_centroid(provinces, raw) else {
                log::debug!("No centroid for {}; skipping its dot", def.name);
                return None;
            };
            Some(MarkerDescriptor {
                id: format!("province:{}", def.name),
                position: position.into(),
                label: count.to_string(),
                title: format!("{} ({count})", def.native_name),
                weight: count,
                variant: MarkerVariant::ProvinceDot,
                target: MarkerTarget::Province {
                    name: def.name.clone(),
                },
            })
        })
        .collect()
}

fn city_marker(city: &CityAggregate) -> MarkerDescriptor {
    MarkerDescriptor {
        id: format!("city:{}", city.key),
        position: city.centroid.into(),
        label: city.count().to_string(),
        title: city.name.clone(),
        weight: city.count(),
        variant: MarkerVariant::CityAggregate,
        target: MarkerTarget::City {
            name: city.name.clone(),
        },
    }
}

fn location_pins(machine: &SelectionMachine) -> Vec<MarkerDescriptor> {
    let selected = machine.state().location_id();
    machine
        .members()
        .iter()
        .filter_map(|record| {
            let variant = if selected == Some(record.id.as_str()) {
                MarkerVariant::SelectedPin
            } else {
                MarkerVariant::LocationPin
            };
            location_pin(record, variant)
        })
        .collect()
}

fn location_pin(record: &LocationRecord, variant: MarkerVariant) -> Option<MarkerDescriptor> {
    Some(MarkerDescriptor {
        id: format!("location:{}", record.id),
        position: record.position()?.into(),
        label: record.price.map(|p| format!("{p:.0}")).unwrap_or_default(),
        title: record.name.clone(),
        weight: 1,
        variant,
        target: MarkerTarget::Location {
            id: record.id.clone(),
        },
    })
}

//! The drill-down selection state machine.
//!
//! | From     | Event                      | To       |
//! |----------|----------------------------|----------|
//! | None     | click province             | Province |
//! | Province | click same province        | None     |
//! | Province | click other province       | Province |
//! | Province | click city aggregate       | City     |
//! | City     | click same city            | Province |
//! | City     | click other city           | City     |
//! | City     | click member location      | Location |
//! | Location | click other member         | Location |
//! | Location | close panel                | City     |
//! | any      | reset                      | None     |
//!
//! Every other pair is ignored and leaves the state untouched.

use cowork_map_location_models::LocationRecord;
use cowork_map_province::registry::ProvinceRegistry;
use cowork_map_province_models::ProvinceDefinition;
use cowork_map_selection_models::{CityAggregate, SelectionEvent, SelectionState, Transition};

use crate::{aggregate::compute_city_aggregates, matching::clean_city};

/// Owns the selection state and the data derived from it.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    registry: ProvinceRegistry,
    records: Vec<LocationRecord>,
    state: SelectionState,
    aggregates: Vec<CityAggregate>,
    members: Vec<LocationRecord>,
}

impl SelectionMachine {
    /// Creates a machine at the `None` level.
    #[must_use]
    pub const fn new(registry: ProvinceRegistry, records: Vec<LocationRecord>) -> Self {
        Self {
            registry,
            records,
            state: SelectionState::None,
            aggregates: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Current selection.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The province lookup table.
    #[must_use]
    pub const fn registry(&self) -> &ProvinceRegistry {
        &self.registry
    }

    /// Every location record held in memory.
    #[must_use]
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    /// City aggregates of the selected province. Empty at `None`.
    #[must_use]
    pub fn aggregates(&self) -> &[CityAggregate] {
        &self.aggregates
    }

    /// Members of the selected city. Empty above `City`.
    #[must_use]
    pub fn members(&self) -> &[LocationRecord] {
        &self.members
    }

    /// Registry entry of the selected province.
    #[must_use]
    pub fn province(&self) -> Option<&ProvinceDefinition> {
        self.state
            .province_name()
            .and_then(|name| self.registry.resolve(name))
    }

    /// The aggregate of the selected city.
    #[must_use]
    pub fn city(&self) -> Option<&CityAggregate> {
        let name = self.state.city_name()?;
        self.aggregates.iter().find(|a| a.name == name)
    }

    /// The selected location record.
    #[must_use]
    pub fn selected_location(&self) -> Option<&LocationRecord> {
        let id = self.state.location_id()?;
        self.members.iter().find(|r| r.id == id)
    }

    /// Number of mappable locations in the selected province.
    #[must_use]
    pub fn province_member_count(&self) -> usize {
        self.aggregates.iter().map(CityAggregate::count).sum()
    }

    /// Replaces the in-memory location records (e.g., when the location
    /// query resolves after mount).
    ///
    /// Aggregates are recomputed at the `Province` level only; a member list
    /// that is already fixed by a city selection is left as it is.
    pub fn set_records(&mut self, records: Vec<LocationRecord>) {
        self.records = records;
        if let SelectionState::Province { province } = &self.state {
            if let Some(def) = self.registry.resolve(province) {
                self.aggregates = compute_city_aggregates(&self.records, def);
            }
        }
    }

    /// Feeds an event to the machine.
    pub fn apply(&mut self, event: &SelectionEvent) -> Transition {
        let from = self.state.level();

        let next = match event {
            SelectionEvent::ClickProvince { name } => self.on_province(name),
            SelectionEvent::ClickCity { name } => self.on_city(name),
            SelectionEvent::ClickLocation { id } => self.on_location(id),
            SelectionEvent::ClosePanel => self.on_close(),
            SelectionEvent::Reset => self.on_reset(),
        };

        let Some(next) = next else {
            log::debug!("Ignored {event:?} at {from} level");
            return Transition::Ignored;
        };

        self.state = next;
        let to = self.state.level();
        log::debug!("Selection {from} -> {to} on {event:?}");

        Transition::Applied { from, to }
    }

    fn on_province(&mut self, raw: &str) -> Option<SelectionState> {
        let Some(def) = self.registry.resolve(raw) else {
            log::debug!("Province click on unresolvable name {raw:?}");
            return None;
        };

        match &self.state {
            SelectionState::Province { province } if *province == def.name => {
                self.aggregates.clear();
                Some(SelectionState::None)
            }
            SelectionState::None | SelectionState::Province { .. } => {
                let province = def.name.clone();
                self.aggregates = compute_city_aggregates(&self.records, def);
                Some(SelectionState::Province { province })
            }
            SelectionState::City { .. } | SelectionState::Location { .. } => None,
        }
    }

    fn on_city(&mut self, name: &str) -> Option<SelectionState> {
        let (province, current) = match &self.state {
            SelectionState::Province { province } => (province.clone(), None),
            SelectionState::City { province, city } => (province.clone(), Some(city.as_str())),
            SelectionState::None | SelectionState::Location { .. } => return None,
        };

        let key = clean_city(name);
        let aggregate = self
            .aggregates
            .iter()
            .find(|a| a.name == name || a.key == key)?;

        if current == Some(aggregate.name.as_str()) {
            self.members.clear();
            return Some(SelectionState::Province { province });
        }

        let city = aggregate.name.clone();
        self.members = aggregate.members.clone();
        Some(SelectionState::City { province, city })
    }

    fn on_location(&self, id: &str) -> Option<SelectionState> {
        let (province, city) = match &self.state {
            SelectionState::City { province, city } => (province, city),
            SelectionState::Location {
                province,
                city,
                location_id,
            } if location_id != id => (province, city),
            _ => return None,
        };

        self.members
            .iter()
            .any(|r| r.id == id)
            .then(|| SelectionState::Location {
                province: province.clone(),
                city: city.clone(),
                location_id: id.to_string(),
            })
    }

    fn on_close(&self) -> Option<SelectionState> {
        match &self.state {
            SelectionState::Location { province, city, .. } => Some(SelectionState::City {
                province: province.clone(),
                city: city.clone(),
            }),
            _ => None,
        }
    }

    fn on_reset(&mut self) -> Option<SelectionState> {
        if self.state == SelectionState::None {
            return None;
        }
        self.aggregates.clear();
        self.members.clear();
        Some(SelectionState::None)
    }
}

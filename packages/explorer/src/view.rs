//! The mounted drill-down map.
//!
//! Routes pointer input into the selection machine and pushes each accepted
//! transition back out to the map session as a fresh view frame.

use cowork_map_backend::token::ResolvedToken;
use cowork_map_location_models::LocationRecord;
use cowork_map_province::{index::ProvinceIndex, normalize::normalize, registry::ProvinceRegistry};
use cowork_map_province_models::ProvinceCollection;
use cowork_map_selection::SelectionMachine;
use cowork_map_selection_models::{SelectionEvent, SelectionState, Transition};
use cowork_map_viewport::{
    MapSession, MapSurface, ViewportConfig, hover::HoverTracker, sync::Synchronizer,
};
use cowork_map_viewport_models::{
    HoverTarget, LngLat, MarkerTarget, ScreenPoint, Tooltip,
};

use crate::{
    MountData,
    panel::{Crumb, DetailPanel, breadcrumb},
};

/// An open map and the selection that drives it.
pub struct DrillView<S: MapSurface> {
    provinces: ProvinceCollection,
    index: ProvinceIndex,
    machine: SelectionMachine,
    sync: Synchronizer,
    session: MapSession<S>,
    hover: HoverTracker,
    token: ResolvedToken,
}

impl<S: MapSurface> DrillView<S> {
    /// Normalizes the boundary data, opens the session, and shows the
    /// whole province set.
    pub fn open(
        surface: S,
        registry: ProvinceRegistry,
        config: ViewportConfig,
        data: MountData,
    ) -> Self {
        let provinces = normalize(&data.boundaries);
        let index = ProvinceIndex::build(&provinces);
        let machine = SelectionMachine::new(registry, data.records);
        let sync = Synchronizer::new(config.clone());
        let session = MapSession::open(surface, config, &data.token.token, &provinces);

        log::info!(
            "Drill-down ready: {} province feature(s), {} location(s), token from {}",
            provinces.len(),
            machine.records().len(),
            data.token.source
        );

        let mut view = Self {
            provinces,
            index,
            machine,
            sync,
            session,
            hover: HoverTracker::default(),
            token: data.token,
        };
        view.render(None);
        view
    }

    fn render(&mut self, click: Option<LngLat>) {
        let frame = self.sync.frame(&self.machine, &self.provinces, click);
        self.session.render(&frame);
    }

    /// Feeds an event to the machine and re-renders on change.
    pub fn apply(&mut self, event: &SelectionEvent) -> Transition {
        self.apply_at(event, None)
    }

    fn apply_at(&mut self, event: &SelectionEvent, click: Option<LngLat>) -> Transition {
        let change = self.hover.clear();
        self.session.apply_hover(&change);

        let transition = self.machine.apply(event);
        if transition.is_applied() {
            self.render(click);
        }
        transition
    }

    /// Handles a click at a screen point. Markers take precedence over the
    /// province fill underneath them.
    pub fn on_click(&mut self, point: ScreenPoint) -> Transition {
        if let Some(marker) = self.session.marker_at(point) {
            let event = match &marker.target {
                MarkerTarget::Province { name } => SelectionEvent::ClickProvince { name: name.clone() },
                MarkerTarget::City { name } => SelectionEvent::ClickCity { name: name.clone() },
                MarkerTarget::Location { id } => SelectionEvent::ClickLocation { id: id.clone() },
            };
            let position = marker.position;
            return self.apply_at(&event, Some(position));
        }

        let at = self.session.unproject(point);
        let Some(feature_index) = self.index.locate(at.lng, at.lat) else {
            log::debug!("Click at {at:?} hit no province");
            let change = self.hover.clear();
            self.session.apply_hover(&change);
            return Transition::Ignored;
        };

        let feature = &self.provinces.features[feature_index];
        let name = self
            .machine
            .registry()
            .resolve_feature(feature)
            .map_or_else(|| feature.match_name.clone(), |def| def.name.clone());

        self.apply_at(&SelectionEvent::ClickProvince { name }, Some(at))
    }

    /// Tracks the pointer. Returns the tooltip to show, if any.
    pub fn on_hover(&mut self, point: ScreenPoint) -> Option<&Tooltip> {
        let hit = self.hit(point);
        let change = self.hover.update(hit, point);
        if !change.is_empty() {
            self.session.apply_hover(&change);
        }
        self.hover.tooltip()
    }

    fn hit(&self, point: ScreenPoint) -> Option<(HoverTarget, String)> {
        if let Some(marker) = self.session.marker_at(point) {
            return Some((
                HoverTarget::Marker {
                    id: marker.id.clone(),
                },
                marker.title.clone(),
            ));
        }

        let at = self.session.unproject(point);
        let feature_index = self.index.locate(at.lng, at.lat)?;
        let feature = &self.provinces.features[feature_index];
        let text = self
            .machine
            .registry()
            .resolve_feature(feature)
            .map_or_else(|| feature.display_name.clone(), |def| def.native_name.clone());

        (!text.is_empty()).then_some((HoverTarget::Province { feature_index }, text))
    }

    /// Re-clamps pan bounds after the host resized the map.
    pub fn on_resize(&mut self) {
        self.session.clamp_pan();
    }

    /// Re-clamps pan bounds after a zoom change.
    pub fn on_zoom(&mut self) {
        self.session.clamp_pan();
    }

    pub fn close_panel(&mut self) -> Transition {
        self.apply(&SelectionEvent::ClosePanel)
    }

    pub fn reset(&mut self) -> Transition {
        self.apply(&SelectionEvent::Reset)
    }

    /// Replaces the location records (e.g., when the listing query
    /// resolves late) and redraws.
    pub fn set_records(&mut self, records: Vec<LocationRecord>) {
        self.machine.set_records(records);
        self.render(None);
    }

    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        self.machine.state()
    }

    #[must_use]
    pub const fn machine(&self) -> &SelectionMachine {
        &self.machine
    }

    #[must_use]
    pub const fn provinces(&self) -> &ProvinceCollection {
        &self.provinces
    }

    #[must_use]
    pub const fn session(&self) -> &MapSession<S> {
        &self.session
    }

    /// Mutable access to the surface for host-driven changes. Follow with
    /// [`Self::on_resize`] or [`Self::on_zoom`].
    pub const fn surface_mut(&mut self) -> &mut S {
        self.session.surface_mut()
    }

    #[must_use]
    pub const fn token(&self) -> &ResolvedToken {
        &self.token
    }

    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.hover.tooltip()
    }

    /// Detail panel for the selected location, open only at the location
    /// level.
    #[must_use]
    pub fn detail_panel(&self) -> Option<DetailPanel> {
        self.machine.selected_location().map(DetailPanel::from)
    }

    #[must_use]
    pub fn breadcrumb(&self) -> Vec<Crumb> {
        breadcrumb(&self.machine)
    }

    /// Tears the map down and returns the surface.
    pub fn close(self) -> S {
        self.session.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{boundaries, records};
    use cowork_map_backend::token::TokenSource;
    use cowork_map_viewport::{
        headless::{HeadlessSurface, SurfaceCommand},
        session::PROVINCE_SOURCE,
    };
    use cowork_map_viewport_models::{CameraMove, MarkerVariant, ScreenSize};

    fn view_with(records: Vec<LocationRecord>) -> DrillView<HeadlessSurface> {
        DrillView::open(
            HeadlessSurface::new(ScreenSize::new(1024.0, 768.0)),
            ProvinceRegistry::bulgaria(),
            ViewportConfig::default(),
            MountData {
                boundaries: boundaries(),
                token: ResolvedToken {
                    token: "pk.test".to_string(),
                    source: TokenSource::Service,
                },
                records,
            },
        )
    }

    fn view() -> DrillView<HeadlessSurface> {
        view_with(records())
    }

    fn camera_moves(view: &DrillView<HeadlessSurface>) -> Vec<CameraMove> {
        view.session()
            .surface()
            .commands()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::MoveCamera(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    fn marker_point(view: &DrillView<HeadlessSurface>, id: &str) -> ScreenPoint {
        let marker = view
            .session()
            .markers()
            .find(|m| m.id == id)
            .unwrap_or_else(|| panic!("no marker {id}"));
        view.session().project(marker.position)
    }

    /// A point inside the Sofia square, away from its dot.
    fn sofia_fill(view: &DrillView<HeadlessSurface>) -> ScreenPoint {
        view.session().project(LngLat::new(22.9, 42.3))
    }

    #[test]
    fn opens_with_instant_camera_then_flies() {
        let mut v = view();
        let moves = camera_moves(&v);
        assert_eq!(moves.len(), 1);
        assert!(!moves[0].is_animated());

        let point = sofia_fill(&v);
        assert!(v.on_click(point).is_applied());
        assert_eq!(
            v.state(),
            &SelectionState::Province {
                province: "Sofia".to_string()
            }
        );

        let moves = camera_moves(&v);
        assert_eq!(moves.len(), 2);
        assert!(moves[1].is_animated());
    }

    #[test]
    fn province_dot_click_selects_its_province() {
        let mut v = view();
        let point = marker_point(&v, "province:Varna");
        assert!(v.on_click(point).is_applied());
        assert_eq!(v.machine().province().map(|p| p.name.as_str()), Some("Varna"));
        assert!(
            v.session()
                .markers()
                .all(|m| m.variant == MarkerVariant::CityAggregate)
        );
    }

    #[test]
    fn click_outside_every_province_is_ignored() {
        let mut v = view();
        let point = v.session().project(LngLat::new(10.0, 50.0));
        assert_eq!(v.on_click(point), Transition::Ignored);
        assert_eq!(v.state(), &SelectionState::None);
    }

    #[test]
    fn drills_to_location_and_back_through_markers() {
        let mut v = view();
        let point = sofia_fill(&v);
        v.on_click(point);

        let point = marker_point(&v, "city:sofia");
        assert!(v.on_click(point).is_applied());
        assert_eq!(v.state().level(), cowork_map_selection_models::DrillLevel::City);
        assert!(v.detail_panel().is_none());

        let point = marker_point(&v, "location:sofia-2");
        assert!(v.on_click(point).is_applied());
        let panel = v.detail_panel().unwrap();
        assert_eq!(panel.id, "sofia-2");
        assert_eq!(v.breadcrumb().len(), 4);

        let before = camera_moves(&v).len();
        assert!(v.close_panel().is_applied());
        assert!(v.detail_panel().is_none());
        assert_eq!(v.state().level(), cowork_map_selection_models::DrillLevel::City);
        assert_eq!(camera_moves(&v).len(), before + 1);

        assert!(v.reset().is_applied());
        assert_eq!(v.state(), &SelectionState::None);
        assert_eq!(v.breadcrumb().len(), 1);
    }

    #[test]
    fn hover_shows_tooltip_and_click_clears_it() {
        let mut v = view();
        let point = sofia_fill(&v);
        let text = v.on_hover(point).map(|t| t.text.clone());
        assert_eq!(text.as_deref(), Some("София"));
        assert!(v.session().surface().commands().iter().any(|c| matches!(
            c,
            SurfaceCommand::FeatureHover { source, hover: true, .. } if source == PROVINCE_SOURCE
        )));

        let dot = marker_point(&v, "province:Sofia");
        let text = v.on_hover(dot).map(|t| t.text.clone());
        assert_eq!(text.as_deref(), Some("София (2)"));

        v.on_click(dot);
        assert!(v.tooltip().is_none());
    }

    #[test]
    fn resize_recomputes_pan_bounds() {
        let mut v = view();
        let point = sofia_fill(&v);
        v.on_click(point);

        v.surface_mut().resize(ScreenSize::new(4000.0, 3000.0));
        v.on_resize();
        assert!(v.session().max_bounds().is_none());

        v.surface_mut().resize(ScreenSize::new(400.0, 300.0));
        v.on_resize();
        assert!(v.session().max_bounds().is_some());
    }

    #[test]
    fn late_records_populate_dots() {
        let mut v = view_with(vec![]);
        assert_eq!(v.session().markers().count(), 0);

        v.set_records(records());
        let mut ids: Vec<&str> = v.session().markers().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["province:Sofia", "province:Varna"]);
    }
}

//! An in-memory [`MapSurface`] that records every command it receives.
//!
//! Camera moves complete instantly (animations are recorded with their
//! duration but not played). Used by the CLI explorer and by tests.

use std::collections::{BTreeMap, BTreeSet};

use cowork_map_viewport_models::{
    CameraMove, CameraPose, GeoBounds, LayerSpec, LngLat, MarkerDescriptor, MarkerHandle,
    ScreenSize,
};
use geojson::GeoJson;

use crate::surface::MapSurface;

/// A command received by a [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    SetAccessToken(String),
    SetStyle(String),
    SetSource(String),
    AddLayer(String),
    FeatureHover {
        source: String,
        feature_index: usize,
        hover: bool,
    },
    AddMarker(MarkerHandle),
    RemoveMarker(MarkerHandle),
    MoveCamera(CameraMove),
    SetMaxBounds(Option<GeoBounds>),
    Destroy,
}

/// Headless map surface.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: ScreenSize,
    camera: CameraPose,
    access_token: Option<String>,
    style: Option<String>,
    sources: BTreeMap<String, GeoJson>,
    layers: Vec<LayerSpec>,
    hovered: BTreeSet<(String, usize)>,
    markers: BTreeMap<MarkerHandle, MarkerDescriptor>,
    next_handle: u64,
    max_bounds: Option<GeoBounds>,
    destroyed: bool,
    commands: Vec<SurfaceCommand>,
}

impl HeadlessSurface {
    /// Creates a surface showing the whole world.
    #[must_use]
    pub const fn new(size: ScreenSize) -> Self {
        Self {
            size,
            camera: CameraPose {
                center: LngLat::new(0.0, 0.0),
                zoom: 0.0,
                pitch: 0.0,
                bearing: 0.0,
            },
            access_token: None,
            style: None,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            hovered: BTreeSet::new(),
            markers: BTreeMap::new(),
            next_handle: 0,
            max_bounds: None,
            destroyed: false,
            commands: Vec::new(),
        }
    }

    /// Simulates the host resizing the viewport.
    pub const fn resize(&mut self, size: ScreenSize) {
        self.size = size;
    }

    /// Simulates a user zoom gesture around the current center.
    pub const fn zoom_to(&mut self, zoom: f64) {
        self.camera.zoom = zoom;
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    #[must_use]
    pub fn source(&self, id: &str) -> Option<&GeoJson> {
        self.sources.get(id)
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Returns `true` if the feature's `hover` flag is on.
    #[must_use]
    pub fn is_hovered(&self, source: &str, feature_index: usize) -> bool {
        self.hovered.contains(&(source.to_string(), feature_index))
    }

    /// Markers currently on the map, in placement order.
    pub fn markers(&self) -> impl Iterator<Item = &MarkerDescriptor> {
        self.markers.values()
    }

    #[must_use]
    pub const fn max_bounds(&self) -> Option<GeoBounds> {
        self.max_bounds
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Drains the command log.
    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl MapSurface for HeadlessSurface {
    fn set_access_token(&mut self, token: &str) {
        self.access_token = Some(token.to_string());
        self.commands
            .push(SurfaceCommand::SetAccessToken(token.to_string()));
    }

    fn set_style(&mut self, style_url: &str) {
        self.style = Some(style_url.to_string());
        self.commands
            .push(SurfaceCommand::SetStyle(style_url.to_string()));
    }

    fn set_source(&mut self, id: &str, data: GeoJson) {
        self.sources.insert(id.to_string(), data);
        self.commands.push(SurfaceCommand::SetSource(id.to_string()));
    }

    fn add_layer(&mut self, layer: LayerSpec) {
        self.commands.push(SurfaceCommand::AddLayer(layer.id.clone()));
        self.layers.push(layer);
    }

    fn set_feature_hover(&mut self, source: &str, feature_index: usize, hover: bool) {
        let key = (source.to_string(), feature_index);
        if hover {
            self.hovered.insert(key);
        } else {
            self.hovered.remove(&key);
        }
        self.commands.push(SurfaceCommand::FeatureHover {
            source: source.to_string(),
            feature_index,
            hover,
        });
    }

    fn add_marker(&mut self, marker: &MarkerDescriptor) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(handle, marker.clone());
        self.commands.push(SurfaceCommand::AddMarker(handle));
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
        self.commands.push(SurfaceCommand::RemoveMarker(handle));
    }

    fn move_camera(&mut self, movement: CameraMove) {
        let mut pose = *movement.pose();
        if let Some(bounds) = self.max_bounds {
            pose.center = bounds.clamp(pose.center);
        }
        self.camera = pose;
        self.commands.push(SurfaceCommand::MoveCamera(movement));
    }

    fn camera(&self) -> CameraPose {
        self.camera
    }

    fn size(&self) -> ScreenSize {
        self.size
    }

    fn set_max_bounds(&mut self, bounds: Option<GeoBounds>) {
        self.max_bounds = bounds;
        self.commands.push(SurfaceCommand::SetMaxBounds(bounds));
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.sources.clear();
        self.layers.clear();
        self.hovered.clear();
        self.destroyed = true;
        self.commands.push(SurfaceCommand::Destroy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cowork_map_viewport_models::{MarkerTarget, MarkerVariant};

    fn marker(id: &str) -> MarkerDescriptor {
        MarkerDescriptor {
            id: id.to_string(),
            position: LngLat::new(27.9, 43.2),
            label: String::new(),
            title: id.to_string(),
            weight: 1,
            variant: MarkerVariant::LocationPin,
            target: MarkerTarget::Location { id: id.to_string() },
        }
    }

    #[test]
    fn handles_are_unique_and_removable() {
        let mut surface = HeadlessSurface::new(ScreenSize::new(800.0, 600.0));
        let a = surface.add_marker(&marker("a"));
        let b = surface.add_marker(&marker("b"));
        assert_ne!(a, b);

        surface.remove_marker(a);
        let ids: Vec<&str> = surface.markers().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn camera_center_respects_max_bounds() {
        let mut surface = HeadlessSurface::new(ScreenSize::new(800.0, 600.0));
        surface.set_max_bounds(Some(GeoBounds::new(22.0, 41.0, 29.0, 44.5)));
        surface.move_camera(CameraMove::Jump {
            pose: CameraPose {
                center: LngLat::new(0.0, 0.0),
                zoom: 8.0,
                pitch: 0.0,
                bearing: 0.0,
            },
        });
        assert_eq!(surface.camera().center, LngLat::new(22.0, 41.0));
    }

    #[test]
    fn destroy_releases_everything() {
        let mut surface = HeadlessSurface::new(ScreenSize::new(800.0, 600.0));
        surface.add_marker(&marker("a"));
        surface.set_feature_hover("provinces", 3, true);
        surface.destroy();

        assert!(surface.is_destroyed());
        assert_eq!(surface.markers().count(), 0);
        assert!(!surface.is_hovered("provinces", 3));
        assert_eq!(surface.commands().last(), Some(&SurfaceCommand::Destroy));
    }
}

//! The capability set the drill-down map needs from a map engine.

use cowork_map_viewport_models::{
    CameraMove, CameraPose, GeoBounds, LayerSpec, LngLat, MarkerDescriptor, MarkerHandle,
    ScreenPoint, ScreenSize,
};
use geojson::GeoJson;

use crate::mercator;

/// A map rendering and interaction surface.
///
/// Implementations wrap a concrete map engine. Pointer input flows the other
/// way: the host forwards clicks, pointer moves, resizes, and zoom changes to
/// the component that owns the session.
///
/// Projection defaults assume a north-up, untilted Web-Mercator camera.
/// Engines with their own projection should override them.
pub trait MapSurface {
    /// Sets the bearer token used for tile and geocoding requests.
    fn set_access_token(&mut self, token: &str);

    /// Loads a vector or raster style.
    fn set_style(&mut self, style_url: &str);

    /// Adds a named `GeoJSON` source, replacing its data if it exists.
    fn set_source(&mut self, id: &str, data: GeoJson);

    /// Adds a style layer on top of the existing ones.
    fn add_layer(&mut self, layer: LayerSpec);

    /// Sets or clears the `hover` feature-state flag of one feature.
    fn set_feature_hover(&mut self, source: &str, feature_index: usize, hover: bool);

    /// Places a marker and returns its handle.
    fn add_marker(&mut self, marker: &MarkerDescriptor) -> MarkerHandle;

    /// Removes a marker. Unknown handles are ignored.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Moves the camera, interrupting any running animation.
    fn move_camera(&mut self, movement: CameraMove);

    /// Current camera pose.
    fn camera(&self) -> CameraPose;

    /// Current viewport size.
    fn size(&self) -> ScreenSize;

    /// Restricts panning to `bounds`, or lifts the restriction.
    fn set_max_bounds(&mut self, bounds: Option<GeoBounds>);

    /// Releases every engine resource. The surface is unusable afterwards.
    fn destroy(&mut self);

    /// Pose that fits `bounds` with `padding` pixels to spare.
    fn camera_for_bounds(&self, bounds: &GeoBounds, padding: f64) -> CameraPose {
        let camera = self.camera();
        mercator::camera_for_bounds(bounds, self.size(), padding, camera.pitch, camera.bearing)
    }

    fn project(&self, p: LngLat) -> ScreenPoint {
        mercator::project(p, &self.camera(), self.size())
    }

    fn unproject(&self, p: ScreenPoint) -> LngLat {
        mercator::unproject(p, &self.camera(), self.size())
    }
}

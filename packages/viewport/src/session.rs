//! The owned map session.
//!
//! A [`MapSession`] is created when the map mounts and consumed when it
//! unmounts. It is the only thing that touches the surface: markers, the
//! camera, and layer state change exclusively through it, synchronously, in
//! response to a new [`ViewFrame`] or a pointer event.

use cowork_map_province::{collection_bounds, normalize::to_feature_collection};
use cowork_map_province_models::ProvinceCollection;
use cowork_map_viewport_models::{
    CameraMove, CameraPose, CameraTarget, GeoBounds, HoverTarget, LayerKind, LayerSpec, LngLat,
    MarkerDescriptor, MarkerHandle, ScreenPoint, ScreenSize,
};
use geo::Polygon;
use geojson::{GeoJson, Geometry, Value};

use crate::{
    clamp::pan_bounds, config::ViewportConfig, hover::HoverChange, surface::MapSurface,
    sync::ViewFrame,
};

pub const PROVINCE_SOURCE: &str = "provinces";
pub const MASK_SOURCE: &str = "mask";

/// An open map session over a surface.
#[derive(Debug)]
pub struct MapSession<S: MapSurface> {
    surface: S,
    config: ViewportConfig,
    markers: Vec<(MarkerHandle, MarkerDescriptor)>,
    mask: Option<Polygon<f64>>,
    pan_area: Option<GeoBounds>,
    max_bounds: Option<GeoBounds>,
    rendered: bool,
}

impl<S: MapSurface> MapSession<S> {
    /// Opens a session: authorizes the surface, then loads the style, the
    /// province source, and the province and mask layers.
    pub fn open(
        mut surface: S,
        config: ViewportConfig,
        token: &str,
        provinces: &ProvinceCollection,
    ) -> Self {
        surface.set_access_token(token);
        surface.set_style(&config.style_url);
        surface.set_source(
            PROVINCE_SOURCE,
            GeoJson::FeatureCollection(to_feature_collection(provinces)),
        );
        surface.add_layer(LayerSpec {
            id: "province-fill".to_string(),
            source: PROVINCE_SOURCE.to_string(),
            kind: LayerKind::Fill,
            color: "#3b82f6".to_string(),
            opacity: 0.1,
            hover_opacity: Some(0.35),
        });
        surface.add_layer(LayerSpec {
            id: "province-outline".to_string(),
            source: PROVINCE_SOURCE.to_string(),
            kind: LayerKind::Line,
            color: "#1e3a8a".to_string(),
            opacity: 0.8,
            hover_opacity: None,
        });
        surface.add_layer(LayerSpec {
            id: "mask-fill".to_string(),
            source: MASK_SOURCE.to_string(),
            kind: LayerKind::Fill,
            color: "#000000".to_string(),
            opacity: 0.6,
            hover_opacity: None,
        });

        let pan_area = collection_bounds(provinces)
            .map(|r| GeoBounds::new(r.min().x, r.min().y, r.max().x, r.max().y));

        log::info!(
            "Opened map session with {} province feature(s)",
            provinces.len()
        );

        Self {
            surface,
            config,
            markers: Vec::new(),
            mask: None,
            pan_area,
            max_bounds: None,
            rendered: false,
        }
    }

    /// Applies a frame: mask, then marker teardown and rebuild, then camera.
    ///
    /// The first frame after opening moves the camera instantly; every
    /// later move is animated.
    pub fn render(&mut self, frame: &ViewFrame) {
        if self.mask.as_ref() != Some(&frame.mask) {
            self.surface.set_source(
                MASK_SOURCE,
                GeoJson::Geometry(Geometry::new(Value::from(&frame.mask))),
            );
            self.mask = Some(frame.mask.clone());
        }

        self.replace_markers(&frame.markers);

        if let Some(pose) = self.resolve(frame.camera) {
            let movement = if self.rendered {
                CameraMove::Fly {
                    pose,
                    duration_ms: self.config.flight_duration_ms,
                }
            } else {
                CameraMove::Jump { pose }
            };
            self.surface.move_camera(movement);
        }
        self.rendered = true;

        self.clamp_pan();
    }

    fn replace_markers(&mut self, markers: &[MarkerDescriptor]) {
        for (handle, _) in self.markers.drain(..) {
            self.surface.remove_marker(handle);
        }
        for marker in markers {
            let handle = self.surface.add_marker(marker);
            self.markers.push((handle, marker.clone()));
        }
    }

    fn resolve(&self, target: CameraTarget) -> Option<CameraPose> {
        match target {
            CameraTarget::Fit { bounds } => Some(CameraPose {
                pitch: self.config.pitch,
                bearing: self.config.bearing,
                ..self.surface.camera_for_bounds(&bounds, self.config.fit_padding)
            }),
            CameraTarget::Center { center, zoom } => Some(CameraPose {
                center,
                zoom,
                pitch: self.config.pitch,
                bearing: self.config.bearing,
            }),
            CameraTarget::Keep => None,
        }
    }

    /// Recomputes pan bounds for the current zoom and viewport size. Call
    /// after every resize and zoom change.
    pub fn clamp_pan(&mut self) {
        let Some(area) = self.pan_area else {
            return;
        };
        let bounds = pan_bounds(
            &area,
            self.surface.camera().zoom,
            self.surface.size(),
            self.config.pan_padding_ratio,
        );
        if bounds != self.max_bounds {
            log::debug!("Pan bounds now {bounds:?}");
            self.surface.set_max_bounds(bounds);
            self.max_bounds = bounds;
        }
    }

    /// Mirrors a hover change onto the province layer's feature state.
    pub fn apply_hover(&mut self, change: &HoverChange) {
        if let Some(HoverTarget::Province { feature_index }) = &change.left {
            self.surface
                .set_feature_hover(PROVINCE_SOURCE, *feature_index, false);
        }
        if let Some(HoverTarget::Province { feature_index }) = &change.entered {
            self.surface
                .set_feature_hover(PROVINCE_SOURCE, *feature_index, true);
        }
    }

    /// The marker closest to `point` within the hit radius.
    #[must_use]
    pub fn marker_at(&self, point: ScreenPoint) -> Option<&MarkerDescriptor> {
        let radius = self.config.marker_hit_radius;
        self.markers
            .iter()
            .map(|(_, marker)| {
                let p = self.surface.project(marker.position);
                ((p.x - point.x).hypot(p.y - point.y), marker)
            })
            .filter(|(distance, _)| *distance <= radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, marker)| marker)
    }

    /// Markers currently placed, in placement order.
    pub fn markers(&self) -> impl Iterator<Item = &MarkerDescriptor> {
        self.markers.iter().map(|(_, m)| m)
    }

    #[must_use]
    pub fn camera(&self) -> CameraPose {
        self.surface.camera()
    }

    #[must_use]
    pub fn size(&self) -> ScreenSize {
        self.surface.size()
    }

    #[must_use]
    pub const fn max_bounds(&self) -> Option<GeoBounds> {
        self.max_bounds
    }

    #[must_use]
    pub const fn config(&self) -> &ViewportConfig {
        &self.config
    }

    #[must_use]
    pub fn unproject(&self, point: ScreenPoint) -> LngLat {
        self.surface.unproject(point)
    }

    #[must_use]
    pub fn project(&self, p: LngLat) -> ScreenPoint {
        self.surface.project(p)
    }

    /// Read-only view of the surface, for inspection.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for host-driven changes (resize, user zoom) that
    /// happen outside the session. Follow with [`Self::clamp_pan`].
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Tears the session down: removes every marker, destroys the surface,
    /// and hands it back.
    pub fn close(mut self) -> S {
        self.replace_markers(&[]);
        self.surface.destroy();
        log::info!("Closed map session");
        self.surface
    }
}

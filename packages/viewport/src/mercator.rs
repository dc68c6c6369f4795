//! Web-Mercator projection for a north-up, untilted camera.
//!
//! World pixel coordinates grow right and down from the top-left corner of
//! the world at the given zoom, which is `TILE_SIZE * 2^zoom` pixels wide.

use std::f64::consts::PI;

use cowork_map_viewport_models::{CameraPose, GeoBounds, LngLat, ScreenPoint, ScreenSize};

pub const TILE_SIZE: f64 = 256.0;

/// Latitude at which the Mercator world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

pub const MAX_ZOOM: f64 = 22.0;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

#[must_use]
pub fn lng_to_x(lng: f64, zoom: f64) -> f64 {
    (lng + 180.0) / 360.0 * world_size(zoom)
}

#[must_use]
pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world_size(zoom)
}

#[must_use]
pub fn x_to_lng(x: f64, zoom: f64) -> f64 {
    x / world_size(zoom) * 360.0 - 180.0
}

#[must_use]
pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
    let n = PI - 2.0 * PI * y / world_size(zoom);
    n.sinh().atan().to_degrees()
}

/// Projects a geographic point to viewport pixels.
#[must_use]
pub fn project(p: LngLat, camera: &CameraPose, size: ScreenSize) -> ScreenPoint {
    let z = camera.zoom;
    ScreenPoint::new(
        lng_to_x(p.lng, z) - lng_to_x(camera.center.lng, z) + size.width / 2.0,
        lat_to_y(p.lat, z) - lat_to_y(camera.center.lat, z) + size.height / 2.0,
    )
}

/// Inverse of [`project`].
#[must_use]
pub fn unproject(p: ScreenPoint, camera: &CameraPose, size: ScreenSize) -> LngLat {
    let z = camera.zoom;
    let x = lng_to_x(camera.center.lng, z) + p.x - size.width / 2.0;
    let y = lat_to_y(camera.center.lat, z) + p.y - size.height / 2.0;
    LngLat::new(x_to_lng(x, z), y_to_lat(y, z))
}

/// On-screen size of `bounds` at `zoom`.
#[must_use]
pub fn projected_extent(bounds: &GeoBounds, zoom: f64) -> ScreenSize {
    ScreenSize::new(
        lng_to_x(bounds.east, zoom) - lng_to_x(bounds.west, zoom),
        lat_to_y(bounds.south, zoom) - lat_to_y(bounds.north, zoom),
    )
}

/// Largest zoom at which `bounds` fits into `size` minus `padding` on every
/// side. Degenerate boxes (a single point) get [`MAX_ZOOM`].
#[must_use]
pub fn zoom_for_bounds(bounds: &GeoBounds, size: ScreenSize, padding: f64) -> f64 {
    let available_w = (size.width - 2.0 * padding).max(1.0);
    let available_h = (size.height - 2.0 * padding).max(1.0);
    let extent = projected_extent(bounds, 0.0);

    let zoom_x = if extent.width > 0.0 {
        (available_w / extent.width).log2()
    } else {
        MAX_ZOOM
    };
    let zoom_y = if extent.height > 0.0 {
        (available_h / extent.height).log2()
    } else {
        MAX_ZOOM
    };

    zoom_x.min(zoom_y).clamp(0.0, MAX_ZOOM)
}

/// Camera pose that fits `bounds` into the viewport.
///
/// The center is taken in projected space, so it sits slightly north of the
/// arithmetic mean latitude.
#[must_use]
pub fn camera_for_bounds(
    bounds: &GeoBounds,
    size: ScreenSize,
    padding: f64,
    pitch: f64,
    bearing: f64,
) -> CameraPose {
    let mid_x = f64::midpoint(lng_to_x(bounds.west, 0.0), lng_to_x(bounds.east, 0.0));
    let mid_y = f64::midpoint(lat_to_y(bounds.north, 0.0), lat_to_y(bounds.south, 0.0));

    CameraPose {
        center: LngLat::new(x_to_lng(mid_x, 0.0), y_to_lat(mid_y, 0.0)),
        zoom: zoom_for_bounds(bounds, size, padding),
        pitch,
        bearing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulgaria() -> GeoBounds {
        GeoBounds::new(22.36, 41.24, 28.61, 44.22)
    }

    fn pose(lng: f64, lat: f64, zoom: f64) -> CameraPose {
        CameraPose {
            center: LngLat::new(lng, lat),
            zoom,
            pitch: 0.0,
            bearing: 0.0,
        }
    }

    #[test]
    fn world_corners_at_zoom_zero() {
        assert!((lng_to_x(-180.0, 0.0)).abs() < 1e-9);
        assert!((lng_to_x(180.0, 0.0) - TILE_SIZE).abs() < 1e-9);
        assert!((lat_to_y(0.0, 0.0) - TILE_SIZE / 2.0).abs() < 1e-9);
        assert!(lat_to_y(MAX_LATITUDE, 0.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_functions_agree() {
        for (lng, lat) in [(27.91, 43.21), (-73.98, 40.75), (0.0, 0.0), (151.2, -33.87)] {
            for zoom in [0.0, 5.5, 12.0] {
                assert!((x_to_lng(lng_to_x(lng, zoom), zoom) - lng).abs() < 1e-9);
                assert!((y_to_lat(lat_to_y(lat, zoom), zoom) - lat).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn camera_center_projects_to_viewport_center() {
        let size = ScreenSize::new(800.0, 600.0);
        let camera = pose(25.0, 42.7, 7.0);
        let p = project(camera.center, &camera, size);
        assert!((p.x - 400.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);

        let back = unproject(ScreenPoint::new(123.0, 456.0), &camera, size);
        let again = project(back, &camera, size);
        assert!((again.x - 123.0).abs() < 1e-6);
        assert!((again.y - 456.0).abs() < 1e-6);
    }

    #[test]
    fn fitted_bounds_stay_inside_padded_viewport() {
        let size = ScreenSize::new(1024.0, 768.0);
        let padding = 40.0;
        let camera = camera_for_bounds(&bulgaria(), size, padding, 0.0, 0.0);

        let nw = project(LngLat::new(bulgaria().west, bulgaria().north), &camera, size);
        let se = project(LngLat::new(bulgaria().east, bulgaria().south), &camera, size);

        assert!(nw.x >= padding - 1e-6 && nw.y >= padding - 1e-6, "{nw:?}");
        assert!(
            se.x <= size.width - padding + 1e-6 && se.y <= size.height - padding + 1e-6,
            "{se:?}"
        );
        // One axis touches the padding exactly.
        let touches_x = (nw.x - padding).abs() < 1e-6;
        let touches_y = (nw.y - padding).abs() < 1e-6;
        assert!(touches_x || touches_y);
    }

    #[test]
    fn point_bounds_use_max_zoom() {
        let b = GeoBounds::new(27.9, 43.2, 27.9, 43.2);
        assert!((zoom_for_bounds(&b, ScreenSize::new(800.0, 600.0), 40.0) - MAX_ZOOM).abs() < 1e-9);
    }

    #[test]
    fn extent_doubles_per_zoom_level() {
        let a = projected_extent(&bulgaria(), 6.0);
        let b = projected_extent(&bulgaria(), 7.0);
        assert!((b.width - 2.0 * a.width).abs() < 1e-9);
        assert!((b.height - 2.0 * a.height).abs() < 1e-9);
    }
}

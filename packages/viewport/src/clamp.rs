//! Pan-bound clamping.
//!
//! Keeps the whole province set reachable without forcing a zoom level.
//! When the set is larger on screen than the viewport, panning is limited
//! to its padded bounding box. When it already fits, the limit is lifted so
//! the engine does not zoom in to satisfy it.

use cowork_map_viewport_models::{GeoBounds, ScreenSize};

use crate::mercator::projected_extent;

/// Pan bounds for the current zoom and viewport size.
#[must_use]
pub fn pan_bounds(
    area: &GeoBounds,
    zoom: f64,
    size: ScreenSize,
    padding_ratio: f64,
) -> Option<GeoBounds> {
    let extent = projected_extent(area, zoom);
    (extent.width > size.width || extent.height > size.height).then(|| area.padded(padding_ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulgaria() -> GeoBounds {
        GeoBounds::new(22.36, 41.24, 28.61, 44.22)
    }

    #[test]
    fn tightens_when_area_overflows_viewport() {
        let bounds = pan_bounds(&bulgaria(), 8.0, ScreenSize::new(1024.0, 768.0), 0.1);
        assert_eq!(bounds, Some(bulgaria().padded(0.1)));
    }

    #[test]
    fn relaxes_when_area_fits() {
        assert!(pan_bounds(&bulgaria(), 5.0, ScreenSize::new(1024.0, 768.0), 0.1).is_none());
    }

    #[test]
    fn resizing_can_flip_the_decision() {
        let zoom = 7.0;
        let small = pan_bounds(&bulgaria(), zoom, ScreenSize::new(400.0, 300.0), 0.1);
        let large = pan_bounds(&bulgaria(), zoom, ScreenSize::new(2560.0, 1440.0), 0.1);
        assert!(small.is_some());
        assert!(large.is_none());
    }
}

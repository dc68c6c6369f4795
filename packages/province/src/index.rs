//! Point-in-province lookup for map clicks and hovers.
//!
//! Builds an R-tree over province bounding boxes once at load time and
//! confirms candidates with an exact point-in-polygon test.

use cowork_map_province_models::ProvinceCollection;
use geo::{BoundingRect, Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};

/// A province polygon stored in the R-tree with its collection position.
struct ProvinceEntry {
    feature_index: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for ProvinceEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over a [`ProvinceCollection`].
pub struct ProvinceIndex {
    tree: RTree<ProvinceEntry>,
}

impl ProvinceIndex {
    /// Builds the index. Features without a bounding box (empty geometry)
    /// are skipped.
    #[must_use]
    pub fn build(collection: &ProvinceCollection) -> Self {
        let entries: Vec<ProvinceEntry> = collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(feature_index, feature)| {
                let rect = feature.boundary.bounding_rect()?;
                Some(ProvinceEntry {
                    feature_index,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    polygon: feature.boundary.clone(),
                })
            })
            .collect();

        log::debug!("Indexed {} province features", entries.len());

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Returns the collection index of the feature containing the point.
    ///
    /// Provinces tile without overlap, so the lowest matching index wins
    /// for points that sit exactly on a shared edge.
    #[must_use]
    pub fn locate(&self, lng: f64, lat: f64) -> Option<usize> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.feature_index)
            .min()
    }

    /// Number of indexed features.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tree.size()
    }
}

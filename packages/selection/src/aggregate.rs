//! Groups a province's locations into city aggregates.

use std::collections::BTreeMap;

use cowork_map_location_models::LocationRecord;
use cowork_map_province_models::ProvinceDefinition;
use cowork_map_selection_models::CityAggregate;

use crate::matching::{clean_city, record_in_province, title_case};

/// Computes one aggregate per distinct cleaned city among the records that
/// match `province`.
///
/// Records without a valid position are skipped, so a city whose members
/// all lack coordinates does not appear at all. Aggregates are ordered by
/// member count (largest first), then by name.
#[must_use]
pub fn compute_city_aggregates(
    records: &[LocationRecord],
    province: &ProvinceDefinition,
) -> Vec<CityAggregate> {
    let mut groups: BTreeMap<String, Vec<(&LocationRecord, [f64; 2])>> = BTreeMap::new();
    let mut unmappable = 0usize;

    for record in records.iter().filter(|r| record_in_province(r, province)) {
        let Some(position) = record.position() else {
            unmappable += 1;
            continue;
        };
        let Some(city) = record.city() else {
            continue;
        };
        groups
            .entry(clean_city(city))
            .or_default()
            .push((record, position));
    }

    if unmappable > 0 {
        log::debug!(
            "{}: skipped {unmappable} matched location(s) without valid coordinates",
            province.name
        );
    }

    let mut aggregates: Vec<CityAggregate> = groups
        .into_iter()
        .map(|(key, members)| {
            #[allow(clippy::cast_precision_loss)]
            let n = members.len() as f64;
            let (sum_lng, sum_lat) = members
                .iter()
                .fold((0.0, 0.0), |(lng, lat), (_, [x, y])| (lng + x, lat + y));

            CityAggregate {
                name: title_case(&key),
                key,
                centroid: [sum_lng / n, sum_lat / n],
                members: members.into_iter().map(|(r, _)| r.clone()).collect(),
            }
        })
        .collect();

    aggregates.sort_by(|a, b| b.count().cmp(&a.count()).then_with(|| a.name.cmp(&b.name)));

    log::debug!(
        "{}: {} city aggregate(s) from {} location(s)",
        province.name,
        aggregates.len(),
        records.len()
    );

    aggregates
}

/// Counts mappable locations per province, in registry order.
///
/// Provinces with no mappable location are omitted.
#[must_use]
pub fn count_by_province<'a>(
    records: &[LocationRecord],
    provinces: &'a [ProvinceDefinition],
) -> Vec<(&'a ProvinceDefinition, usize)> {
    provinces
        .iter()
        .map(|province| {
            let count = records
                .iter()
                .filter(|r| r.is_mappable() && record_in_province(r, province))
                .count();
            (province, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

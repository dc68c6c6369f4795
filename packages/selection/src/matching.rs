//! City-string matching heuristic.
//!
//! Hosts type city names inconsistently ("Варна", "Varna, Bulgaria",
//! "Пловдив област"). A record belongs to a province when its cleaned city
//! contains, or is contained by, one of the province's aliases. False
//! positives are accepted; records with no city never match.

use cowork_map_location_models::LocationRecord;
use cowork_map_province_models::ProvinceDefinition;

/// Trailing words removed from a city string before matching.
const CITY_SUFFIXES: &[&str] = &["област", "region"];

/// Cleans a free-text city: lower-cases it, drops everything after the
/// first comma, strips trailing region suffixes and collapses whitespace.
#[must_use]
pub fn clean_city(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let head = lowered.split(',').next().unwrap_or_default();

    let mut words: Vec<&str> = head.split_whitespace().collect();
    while let Some(last) = words.last() {
        if CITY_SUFFIXES.contains(last) {
            words.pop();
        } else {
            break;
        }
    }

    words.join(" ")
}

/// Title-cases a cleaned city for display (`"стара загора"` →
/// `"Стара Загора"`).
#[must_use]
pub fn title_case(cleaned: &str) -> String {
    cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `true` if a cleaned city matches one of the aliases.
#[must_use]
pub fn matches_aliases(cleaned: &str, aliases: &[String]) -> bool {
    if cleaned.is_empty() {
        return false;
    }
    aliases
        .iter()
        .map(|alias| alias.trim())
        .filter(|alias| !alias.is_empty())
        .any(|alias| cleaned.contains(alias) || alias.contains(cleaned))
}

/// Returns `true` if the record's city matches the province.
#[must_use]
pub fn record_in_province(record: &LocationRecord, province: &ProvinceDefinition) -> bool {
    record
        .city()
        .is_some_and(|city| matches_aliases(&clean_city(city), &province.aliases))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varna() -> ProvinceDefinition {
        ProvinceDefinition {
            name: "Varna".to_string(),
            native_name: "Варна".to_string(),
            aliases: vec!["варна".to_string(), "белослав".to_string()],
        }
    }

    fn record(city: Option<&str>) -> LocationRecord {
        LocationRecord {
            id: "1".to_string(),
            city: city.map(ToString::to_string),
            ..LocationRecord::default()
        }
    }

    #[test]
    fn cleans_case_comma_and_suffix() {
        assert_eq!(clean_city("Варна"), "варна");
        assert_eq!(clean_city("Varna, Bulgaria"), "varna");
        assert_eq!(clean_city("Пловдив област"), "пловдив");
        assert_eq!(clean_city("Stara  Zagora Region"), "stara zagora");
        assert_eq!(clean_city("  "), "");
    }

    #[test]
    fn title_cases_each_word() {
        assert_eq!(title_case("стара загора"), "Стара Загора");
        assert_eq!(title_case("varna"), "Varna");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn matches_in_both_directions() {
        let aliases = vec!["велико търново".to_string()];
        assert!(matches_aliases("велико търново", &aliases));
        assert!(matches_aliases("гр. велико търново", &aliases));
        assert!(matches_aliases("търново", &aliases));
        assert!(!matches_aliases("бургас", &aliases));
    }

    #[test]
    fn empty_city_never_matches() {
        assert!(!matches_aliases("", &["варна".to_string()]));
        assert!(!record_in_province(&record(None), &varna()));
        assert!(!record_in_province(&record(Some("")), &varna()));
        assert!(!record_in_province(&record(Some(" , ")), &varna()));
    }

    #[test]
    fn record_matching_uses_aliases() {
        assert!(record_in_province(&record(Some("Варна")), &varna()));
        assert!(record_in_province(&record(Some("Белослав")), &varna()));
        assert!(record_in_province(&record(Some("Варна област")), &varna()));
        assert!(!record_in_province(&record(Some("Бургас")), &varna()));
    }
}

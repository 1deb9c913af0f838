//! Alert Relevance Filtering
//!
//! Weather providers report alerts for broad regions; only those naming the
//! district's area should reach the agents. Non-relevant alerts are dropped
//! entirely, never surfaced.

use tracing::debug;

use crate::types::{DistrictLocation, WeatherAlert};

/// Keep alerts whose free-text `areas` field names the district.
///
/// Matching is case-folded substring search against the county name, the
/// city name, `"{city}, {state}"`, and `"{county} county"`. Source order
/// is preserved.
pub fn filter_relevant_alerts(
    alerts: &[WeatherAlert],
    location: &DistrictLocation,
) -> Vec<WeatherAlert> {
    let needles = [
        location.county.to_lowercase(),
        location.city.to_lowercase(),
        format!("{}, {}", location.city, location.state).to_lowercase(),
        format!("{} county", location.county).to_lowercase(),
    ];

    alerts
        .iter()
        .filter(|alert| {
            let areas = alert.areas.to_lowercase();
            let relevant = needles.iter().any(|needle| areas.contains(needle));
            if !relevant {
                debug!(headline = %alert.headline, "Dropping alert outside district area");
            }
            relevant
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(areas: &str) -> WeatherAlert {
        WeatherAlert {
            headline: "Winter Storm Warning".to_string(),
            severity: "Severe".to_string(),
            certainty: "Likely".to_string(),
            urgency: "Expected".to_string(),
            category: "Met".to_string(),
            areas: areas.to_string(),
            effective_time: "2026-01-14T18:00:00-05:00".to_string(),
            expires_time: "2026-01-15T12:00:00-05:00".to_string(),
            description: "Heavy snow expected.".to_string(),
        }
    }

    fn district(city: &str, county: &str, state: &str) -> DistrictLocation {
        DistrictLocation {
            city: city.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_county_match() {
        let alerts = vec![alert("Kent County; Ottawa County")];

        let kent = filter_relevant_alerts(&alerts, &district("Rockford", "Kent", "MI"));
        assert_eq!(kent.len(), 1);

        let wayne = filter_relevant_alerts(&alerts, &district("Detroit", "Wayne", "MI"));
        assert!(wayne.is_empty());
    }

    #[test]
    fn test_city_state_match() {
        let alerts = vec![alert("Including the cities of Rockford, MI and Cedar Springs")];
        let relevant = filter_relevant_alerts(&alerts, &district("Rockford", "Kent", "MI"));
        assert_eq!(relevant.len(), 1);
    }

    #[test]
    fn test_case_insensitive() {
        let alerts = vec![alert("KENT COUNTY")];
        let relevant = filter_relevant_alerts(&alerts, &district("Rockford", "kent", "MI"));
        assert_eq!(relevant.len(), 1);
    }

    #[test]
    fn test_source_order_preserved() {
        let mut first = alert("Kent County");
        first.headline = "First".to_string();
        let mut skipped = alert("Wayne County");
        skipped.headline = "Skipped".to_string();
        let mut second = alert("City of Rockford");
        second.headline = "Second".to_string();

        let relevant = filter_relevant_alerts(
            &[first, skipped, second],
            &district("Rockford", "Kent", "MI"),
        );
        assert_eq!(relevant.len(), 2);
        assert_eq!(relevant[0].headline, "First");
        assert_eq!(relevant[1].headline, "Second");
    }
}

//! Seed Briefing
//!
//! Formats the extracted weather features into the single user message every
//! conversation starts from. District criteria and settings ride in the
//! decision agents' instructions instead, so the seed stays a pure weather
//! briefing.

use crate::types::Result;
use crate::weather::WeatherFeatureSet;

/// Build the seed prompt from the extracted feature set.
pub fn build_seed_prompt(features: &WeatherFeatureSet) -> Result<String> {
    let weather_data = serde_json::to_string_pretty(features)?;

    Ok(format!(
        "Please provide a detailed weather report for the following data.\n\n\
         Weather Data: {}\n\n\
         Focus ONLY on reporting the weather conditions. DO NOT make any \
         predictions or analysis about snow days.",
        weather_data
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DistrictLocation, Forecast, ForecastDay, HourSample};
    use crate::weather::extract_features;

    fn flat_hour(hour_of_day: u8) -> HourSample {
        HourSample {
            hour_of_day,
            temp_f: 28.0,
            feelslike_f: 22.0,
            windchill_f: 21.0,
            chance_of_snow: 40.0,
            chance_of_rain: 0.0,
            snow_cm: 1.0,
            precip_mm: 0.5,
            wind_mph: 12.0,
            gust_mph: 18.0,
            wind_dir: "NW".to_string(),
            visibility_miles: 5.0,
            cloud_pct: 90.0,
            condition_text: "Light snow".to_string(),
            humidity_pct: 85.0,
            pressure_in: 29.9,
            dewpoint_f: 24.0,
            uv_index: 0.0,
            will_it_snow: true,
            will_it_rain: false,
        }
    }

    fn location() -> DistrictLocation {
        DistrictLocation {
            city: "Grand Rapids".to_string(),
            county: "Kent".to_string(),
            state: "MI".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_seed_prompt_carries_features_and_guardrail() {
        let forecast = Forecast {
            today: ForecastDay {
                date: "2026-01-14".to_string(),
                hours: (0..24).map(flat_hour).collect(),
            },
            tomorrow: ForecastDay {
                date: "2026-01-15".to_string(),
                hours: (0..24).map(flat_hour).collect(),
            },
            alerts: Vec::new(),
        };

        let features = extract_features(&forecast, &location()).unwrap();
        let prompt = build_seed_prompt(&features).unwrap();

        assert!(prompt.contains("hour_19"));
        assert!(prompt.contains("average_snow_probability"));
        assert!(prompt.contains("DO NOT make any predictions"));
    }
}

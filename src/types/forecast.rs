//! Forecast Domain Types
//!
//! Parsed weather data as consumed by feature extraction. A `Forecast` is
//! immutable once fetched: two consecutive days of hourly samples plus any
//! alerts the provider attached.

use serde::{Deserialize, Serialize};

/// One hour of forecast metrics.
///
/// Field set mirrors what the weather provider reports per hour; every metric
/// is surfaced to the agents alongside the derived factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSample {
    /// Hour of day, 0-23
    pub hour_of_day: u8,
    pub temp_f: f64,
    pub feelslike_f: f64,
    pub windchill_f: f64,
    /// Probability of snow, 0-100
    pub chance_of_snow: f64,
    /// Probability of rain, 0-100
    pub chance_of_rain: f64,
    /// Expected snowfall in centimeters
    pub snow_cm: f64,
    /// Expected precipitation in millimeters
    pub precip_mm: f64,
    pub wind_mph: f64,
    pub gust_mph: f64,
    /// Compass direction, e.g. "NNW"
    pub wind_dir: String,
    pub visibility_miles: f64,
    /// Cloud cover percentage, 0-100
    pub cloud_pct: f64,
    /// Human-readable condition, e.g. "Heavy snow"
    pub condition_text: String,
    pub humidity_pct: f64,
    pub pressure_in: f64,
    pub dewpoint_f: f64,
    pub uv_index: f64,
    pub will_it_snow: bool,
    pub will_it_rain: bool,
}

/// Ordered hourly samples for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date as reported by the provider, e.g. "2026-01-14"
    pub date: String,
    /// Hourly samples in chronological order
    pub hours: Vec<HourSample>,
}

impl ForecastDay {
    /// Look up the sample for a specific hour of day.
    pub fn hour(&self, hour_of_day: u8) -> Option<&HourSample> {
        self.hours.iter().find(|h| h.hour_of_day == hour_of_day)
    }
}

/// Two consecutive forecast days plus alerts. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub today: ForecastDay,
    pub tomorrow: ForecastDay,
    /// Raw alerts as reported; relevance filtering happens downstream
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

/// A weather alert as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub headline: String,
    pub severity: String,
    pub certainty: String,
    pub urgency: String,
    pub category: String,
    /// Free-text region list, e.g. "Kent County; Ottawa County"
    pub areas: String,
    pub effective_time: String,
    pub expires_time: String,
    pub description: String,
}

/// Static district location used for alert relevance and weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictLocation {
    pub city: String,
    pub county: String,
    /// Two-letter state code, e.g. "MI"
    pub state: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_hour(hour_of_day: u8) -> HourSample {
        HourSample {
            hour_of_day,
            temp_f: 25.0,
            feelslike_f: 18.0,
            windchill_f: 17.0,
            chance_of_snow: 60.0,
            chance_of_rain: 5.0,
            snow_cm: 1.2,
            precip_mm: 0.8,
            wind_mph: 12.0,
            gust_mph: 20.0,
            wind_dir: "NW".to_string(),
            visibility_miles: 4.0,
            cloud_pct: 95.0,
            condition_text: "Light snow".to_string(),
            humidity_pct: 88.0,
            pressure_in: 29.8,
            dewpoint_f: 22.0,
            uv_index: 0.0,
            will_it_snow: true,
            will_it_rain: false,
        }
    }

    #[test]
    fn test_day_hour_lookup() {
        let day = ForecastDay {
            date: "2026-01-14".to_string(),
            hours: (19..24).map(sample_hour).collect(),
        };

        assert!(day.hour(21).is_some());
        assert_eq!(day.hour(21).unwrap().hour_of_day, 21);
        assert!(day.hour(3).is_none());
    }

    #[test]
    fn test_forecast_round_trip() {
        let forecast = Forecast {
            today: ForecastDay {
                date: "2026-01-14".to_string(),
                hours: vec![sample_hour(19)],
            },
            tomorrow: ForecastDay {
                date: "2026-01-15".to_string(),
                hours: vec![sample_hour(0)],
            },
            alerts: vec![],
        };

        let json = serde_json::to_string(&forecast).unwrap();
        let back: Forecast = serde_json::from_str(&json).unwrap();
        assert_eq!(forecast, back);
    }
}

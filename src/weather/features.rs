//! Weather Feature Extraction
//!
//! Converts a raw two-day hourly forecast into a fixed-shape set of derived
//! signals for the overnight window (7 PM through 8 AM next day): per-hour
//! closure probabilities, trend summaries, aggregates, and relevant alerts.
//!
//! Extraction is pure and idempotent: the same forecast always produces an
//! identical feature set.

use serde::{Deserialize, Serialize};

use crate::constants::{scoring, window};
use crate::types::{BlizzardError, DistrictLocation, Forecast, HourSample, Result, WeatherAlert};
use crate::weather::alerts::filter_relevant_alerts;

/// Direction of change across the overnight window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Steady,
    SlightlyIncreasing,
    Increasing,
    SlightlyDecreasing,
    Decreasing,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Steady => write!(f, "steady"),
            Trend::SlightlyIncreasing => write!(f, "slightly increasing"),
            Trend::Increasing => write!(f, "increasing"),
            Trend::SlightlyDecreasing => write!(f, "slightly decreasing"),
            Trend::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Derived signals for a single hour of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourFeatures {
    /// Stable label, e.g. "hour_19" (evening) or "hour_6" (next morning)
    pub label: String,
    /// Weighted closure probability for this hour, 0-100, two decimals
    pub probability: f64,
    pub snow_factor: f64,
    pub temp_factor: f64,
    pub wind_factor: f64,
    pub vis_factor: f64,
    /// Every raw metric for this hour, surfaced to the agents unchanged
    pub sample: HourSample,
}

/// Output of feature extraction. Created once per run, read-only afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeatureSet {
    /// One entry per window hour, in chronological order (19..23, then 0..7)
    pub hours: Vec<HourFeatures>,

    pub temp_trend: Trend,
    pub wind_trend: Trend,
    pub precip_trend: Trend,
    pub visibility_trend: Trend,

    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_peak: f64,
    /// Total precipitation across the window (mm)
    pub total_precip: f64,
    /// Mean hourly probability, 0-100, two decimals
    pub average_snow_probability: f64,
    /// Highest hourly probability, 0-100, two decimals
    pub max_hour_probability: f64,

    /// Alerts relevant to the district, in source order
    pub relevant_alerts: Vec<WeatherAlert>,
    pub alert_count: usize,
}

/// Extract the overnight feature set from a two-day forecast.
///
/// Today must supply hours 19-23 and tomorrow hours 0-7; a missing hour
/// fails with [`BlizzardError::IncompleteForecast`].
pub fn extract_features(
    forecast: &Forecast,
    location: &DistrictLocation,
) -> Result<WeatherFeatureSet> {
    let samples = collect_window_samples(forecast)?;

    let hours: Vec<HourFeatures> = samples.iter().map(|s| score_hour(s)).collect();

    let probabilities: Vec<f64> = hours.iter().map(|h| h.probability / 100.0).collect();
    let average = probabilities.iter().sum::<f64>() / probabilities.len() as f64;
    let max = probabilities.iter().cloned().fold(0.0, f64::max);

    let temps: Vec<f64> = samples.iter().map(|s| s.temp_f).collect();
    let winds: Vec<f64> = samples.iter().map(|s| s.wind_mph).collect();
    let precips: Vec<f64> = samples.iter().map(|s| s.precip_mm).collect();
    let visibilities: Vec<f64> = samples.iter().map(|s| s.visibility_miles).collect();

    let relevant_alerts = filter_relevant_alerts(&forecast.alerts, location);
    let alert_count = relevant_alerts.len();

    Ok(WeatherFeatureSet {
        hours,
        temp_trend: calculate_trend(&temps),
        wind_trend: calculate_trend(&winds),
        precip_trend: calculate_trend(&precips),
        visibility_trend: calculate_trend(&visibilities),
        temp_min: temps.iter().cloned().fold(f64::INFINITY, f64::min),
        temp_max: temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        wind_peak: winds.iter().cloned().fold(0.0, f64::max),
        total_precip: precips.iter().sum(),
        average_snow_probability: round2(average * 100.0),
        max_hour_probability: round2(max * 100.0),
        relevant_alerts,
        alert_count,
    })
}

/// Gather window samples in chronological order, validating completeness.
fn collect_window_samples(forecast: &Forecast) -> Result<Vec<HourSample>> {
    let mut samples =
        Vec::with_capacity((window::EVENING_END_HOUR - window::EVENING_START_HOUR) as usize
            + (window::MORNING_END_HOUR - window::MORNING_START_HOUR) as usize);

    for hour in window::EVENING_START_HOUR..window::EVENING_END_HOUR {
        let sample = forecast
            .today
            .hour(hour)
            .ok_or_else(|| BlizzardError::incomplete_forecast("today", hour))?;
        samples.push(sample.clone());
    }

    for hour in window::MORNING_START_HOUR..window::MORNING_END_HOUR {
        let sample = forecast
            .tomorrow
            .hour(hour)
            .ok_or_else(|| BlizzardError::incomplete_forecast("tomorrow", hour))?;
        samples.push(sample.clone());
    }

    Ok(samples)
}

/// Score one hour into bounded factors and a weighted probability.
fn score_hour(sample: &HourSample) -> HourFeatures {
    let snow_factor = snow_factor(sample.chance_of_snow, sample.snow_cm);
    let temp_factor = temp_factor(sample.temp_f);
    let wind_factor = wind_factor(sample.wind_mph);
    let vis_factor = vis_factor(sample.visibility_miles);

    // Weights sum to 0.90; the remaining 0.10 is reserved for ground
    // conditions, which no upstream source supplies yet.
    let probability = scoring::SNOW_WEIGHT * snow_factor
        + scoring::TEMP_WEIGHT * temp_factor
        + scoring::WIND_WEIGHT * wind_factor
        + scoring::VIS_WEIGHT * vis_factor;

    HourFeatures {
        label: format!("hour_{}", sample.hour_of_day),
        probability: round2(probability * 100.0),
        snow_factor,
        temp_factor,
        wind_factor,
        vis_factor,
        sample: sample.clone(),
    }
}

/// Snow probability and depth combined; saturates at 3 inches/hr equivalent.
fn snow_factor(chance_of_snow: f64, snow_cm: f64) -> f64 {
    let inches = snow_cm / scoring::CM_PER_INCH;
    ((chance_of_snow / 100.0) * inches / scoring::SNOW_SATURATION_INCHES).clamp(0.0, 1.0)
}

/// Full weight below 20F, linear decay to zero at 32F.
fn temp_factor(temp_f: f64) -> f64 {
    if temp_f < scoring::FULL_WEIGHT_TEMP_F {
        1.0
    } else {
        ((scoring::FREEZING_TEMP_F - temp_f) / scoring::TEMP_DECAY_RANGE_F).clamp(0.0, 1.0)
    }
}

fn wind_factor(wind_mph: f64) -> f64 {
    (wind_mph / scoring::WIND_SATURATION_MPH).clamp(0.0, 1.0)
}

fn vis_factor(visibility_miles: f64) -> f64 {
    (1.0 - visibility_miles / scoring::CLEAR_VISIBILITY_MILES).clamp(0.0, 1.0)
}

/// Classify an ordered series by comparing half averages.
///
/// Fewer than 2 samples classify as steady.
fn calculate_trend(series: &[f64]) -> Trend {
    if series.len() < 2 {
        return Trend::Steady;
    }

    let mid = series.len() / 2;
    let first_avg = series[..mid].iter().sum::<f64>() / mid as f64;
    let second_avg = series[mid..].iter().sum::<f64>() / (series.len() - mid) as f64;
    let delta = second_avg - first_avg;

    if delta.abs() < scoring::TREND_STEADY_BAND {
        Trend::Steady
    } else if delta > 0.0 {
        if delta > scoring::TREND_STRONG_DELTA {
            Trend::Increasing
        } else {
            Trend::SlightlyIncreasing
        }
    } else if delta.abs() > scoring::TREND_STRONG_DELTA {
        Trend::Decreasing
    } else {
        Trend::SlightlyDecreasing
    }
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::ForecastDay;

    fn district() -> DistrictLocation {
        DistrictLocation {
            city: "Rockford".to_string(),
            county: "Kent".to_string(),
            state: "MI".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn hour_with(hour_of_day: u8, f: impl Fn(&mut HourSample)) -> HourSample {
        let mut sample = HourSample {
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
        };
        f(&mut sample);
        sample
    }

    fn uniform_forecast(f: impl Fn(&mut HourSample) + Copy) -> Forecast {
        Forecast {
            today: ForecastDay {
                date: "2026-01-14".to_string(),
                hours: (19..24).map(|h| hour_with(h, f)).collect(),
            },
            tomorrow: ForecastDay {
                date: "2026-01-15".to_string(),
                hours: (0..8).map(|h| hour_with(h, f)).collect(),
            },
            alerts: vec![],
        }
    }

    #[test]
    fn test_temp_factor_anchors() {
        assert_eq!(temp_factor(10.0), 1.0);
        assert_eq!(temp_factor(32.0), 0.0);
        assert!((temp_factor(26.0) - 0.5).abs() < 1e-9);
        assert_eq!(temp_factor(40.0), 0.0);
    }

    #[test]
    fn test_wind_factor_clamps() {
        assert_eq!(wind_factor(35.0), 1.0);
        assert_eq!(wind_factor(70.0), 1.0);
        assert_eq!(wind_factor(0.0), 0.0);
    }

    #[test]
    fn test_snow_factor_saturates() {
        // 100% chance, 3 inches/hr equivalent -> exactly 1.0
        assert!((snow_factor(100.0, 3.0 * 2.54) - 1.0).abs() < 1e-9);
        assert_eq!(snow_factor(100.0, 25.0), 1.0);
        assert_eq!(snow_factor(0.0, 25.0), 0.0);
    }

    #[test]
    fn test_vis_factor() {
        assert_eq!(vis_factor(10.0), 0.0);
        assert_eq!(vis_factor(15.0), 0.0);
        assert!((vis_factor(1.0) - 0.9).abs() < 1e-9);
        assert_eq!(vis_factor(0.0), 1.0);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(calculate_trend(&[10.0, 10.0, 10.0, 10.0]), Trend::Steady);
        assert_eq!(calculate_trend(&[10.0, 10.0, 20.0, 20.0]), Trend::Increasing);
        assert_eq!(
            calculate_trend(&[10.0, 10.0, 11.0, 11.0]),
            Trend::SlightlyIncreasing
        );
        assert_eq!(calculate_trend(&[20.0, 20.0, 10.0, 10.0]), Trend::Decreasing);
        assert_eq!(
            calculate_trend(&[11.0, 11.0, 10.0, 10.0]),
            Trend::SlightlyDecreasing
        );
        assert_eq!(calculate_trend(&[10.0]), Trend::Steady);
        assert_eq!(calculate_trend(&[]), Trend::Steady);
    }

    #[test]
    fn test_window_shape_and_order() {
        let set = extract_features(&uniform_forecast(|_| {}), &district()).unwrap();

        assert_eq!(set.hours.len(), 13);
        assert_eq!(set.hours[0].label, "hour_19");
        assert_eq!(set.hours[4].label, "hour_23");
        assert_eq!(set.hours[5].label, "hour_0");
        assert_eq!(set.hours[12].label, "hour_7");
    }

    #[test]
    fn test_missing_hour_fails() {
        let mut forecast = uniform_forecast(|_| {});
        forecast.tomorrow.hours.retain(|h| h.hour_of_day != 6);

        let err = extract_features(&forecast, &district()).unwrap_err();
        match err {
            BlizzardError::IncompleteForecast { day, hour } => {
                assert_eq!(day, "tomorrow");
                assert_eq!(hour, 6);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_severe_forecast_scores_high() {
        // Blizzard conditions: saturated snowfall, deep cold, high wind,
        // near-zero visibility.
        let set = extract_features(
            &uniform_forecast(|s| {
                s.chance_of_snow = 90.0;
                s.snow_cm = 10.0;
                s.temp_f = 15.0;
                s.wind_mph = 40.0;
                s.visibility_miles = 1.0;
            }),
            &district(),
        )
        .unwrap();

        assert!(set.average_snow_probability > 80.0);
        assert_eq!(set.average_snow_probability, set.max_hour_probability);
    }

    #[test]
    fn test_spec_scenario_bounds() {
        let set = extract_features(
            &uniform_forecast(|s| {
                s.chance_of_snow = 90.0;
                s.snow_cm = 5.0;
                s.temp_f = 15.0;
                s.wind_mph = 40.0;
                s.visibility_miles = 1.0;
            }),
            &district(),
        )
        .unwrap();

        // snow 0.59, temp 1.0, wind 1.0 (clamped), vis 0.9 -> 74.17
        assert!(set.average_snow_probability > 70.0);
        assert!(set.average_snow_probability < 90.0);
        assert_eq!(set.temp_min, 15.0);
        assert_eq!(set.wind_peak, 40.0);
    }

    #[test]
    fn test_aggregates() {
        let set = extract_features(&uniform_forecast(|_| {}), &district()).unwrap();

        assert_eq!(set.temp_min, 25.0);
        assert_eq!(set.temp_max, 25.0);
        assert_eq!(set.wind_peak, 12.0);
        assert!((set.total_precip - 0.8 * 13.0).abs() < 1e-9);
        assert_eq!(set.temp_trend, Trend::Steady);
        assert_eq!(set.alert_count, 0);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let forecast = uniform_forecast(|s| s.chance_of_snow = 75.0);
        let a = extract_features(&forecast, &district()).unwrap();
        let b = extract_features(&forecast, &district()).unwrap();
        assert_eq!(a, b);

        let json_a = serde_json::to_string(&a).unwrap();
        let json_b = serde_json::to_string(&b).unwrap();
        assert_eq!(json_a, json_b);
    }

    proptest! {
        #[test]
        fn prop_factors_bounded(
            chance in 0.0f64..=100.0,
            snow in 0.0f64..=50.0,
            temp in -40.0f64..=60.0,
            wind in 0.0f64..=120.0,
            vis in 0.0f64..=20.0,
        ) {
            for factor in [
                snow_factor(chance, snow),
                temp_factor(temp),
                wind_factor(wind),
                vis_factor(vis),
            ] {
                prop_assert!((0.0..=1.0).contains(&factor));
            }
        }
    }
}

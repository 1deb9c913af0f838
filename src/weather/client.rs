//! Weather Provider Client
//!
//! Fetches the two-day hourly forecast (alerts included) from the WeatherAPI
//! service and deserializes it into the domain [`Forecast`]. Transport
//! failures and empty payloads surface as `WeatherUnavailable`, deadline
//! overruns as `Timeout`; either way the run aborts before any agent is
//! invoked.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;
use crate::types::{BlizzardError, Forecast, ForecastDay, HourSample, Result, WeatherAlert};

const FORECAST_DAYS: &str = "2";

/// WeatherAPI client with secure API key handling.
pub struct WeatherClient {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    zip_code: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("zip_code", &self.zip_code)
            .finish()
    }
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("WEATHER_API_KEY").ok())
            .ok_or_else(|| {
                BlizzardError::Config(
                    "Weather API key not found. Set WEATHER_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BlizzardError::WeatherUnavailable(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base: config.api_base.clone(),
            zip_code: config.zip_code.clone(),
            timeout,
            client,
        })
    }

    /// Fetch today's and tomorrow's hourly forecast plus alerts.
    pub async fn fetch_forecast(&self) -> Result<Forecast> {
        let url = url::Url::parse_with_params(
            &format!("{}/forecast.json", self.api_base),
            &[
                ("key", self.api_key.expose_secret()),
                ("q", self.zip_code.as_str()),
                ("days", FORECAST_DAYS),
                ("aqi", "no"),
                ("alerts", "yes"),
            ],
        )
        .map_err(|e| BlizzardError::WeatherUnavailable(format!("invalid forecast URL: {}", e)))?;

        debug!(zip = %self.zip_code, "Requesting two-day forecast");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                BlizzardError::timeout("weather forecast request", self.timeout)
            } else {
                BlizzardError::WeatherUnavailable(format!("forecast request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BlizzardError::WeatherUnavailable(format!(
                "forecast request returned {}: {}",
                status, body
            )));
        }

        let payload: ForecastPayload = response.json().await.map_err(|e| {
            BlizzardError::WeatherUnavailable(format!("failed to parse forecast payload: {}", e))
        })?;

        let forecast = payload.into_domain()?;
        info!(
            today = %forecast.today.date,
            tomorrow = %forecast.tomorrow.date,
            alerts = forecast.alerts.len(),
            "Fetched forecast"
        );
        Ok(forecast)
    }

    /// Check that the weather service is reachable and the key is accepted.
    pub async fn health_check(&self) -> Result<bool> {
        let url = url::Url::parse_with_params(
            &format!("{}/current.json", self.api_base),
            &[
                ("key", self.api_key.expose_secret()),
                ("q", self.zip_code.as_str()),
            ],
        )
        .map_err(|e| BlizzardError::WeatherUnavailable(format!("invalid URL: {}", e)))?;

        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!("Weather API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Weather API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Wire types (WeatherAPI response shape)

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    forecast: ForecastSection,
    #[serde(default)]
    alerts: Option<AlertSection>,
}

#[derive(Debug, Deserialize)]
struct ForecastSection {
    #[serde(rename = "forecastday")]
    forecast_days: Vec<WireForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WireForecastDay {
    date: String,
    hour: Vec<WireHour>,
}

#[derive(Debug, Deserialize)]
struct WireHour {
    /// "YYYY-MM-DD HH:MM"
    time: String,
    temp_f: f64,
    feelslike_f: f64,
    windchill_f: f64,
    #[serde(default)]
    chance_of_snow: f64,
    #[serde(default)]
    chance_of_rain: f64,
    #[serde(default)]
    snow_cm: f64,
    #[serde(default)]
    precip_mm: f64,
    wind_mph: f64,
    gust_mph: f64,
    wind_dir: String,
    vis_miles: f64,
    cloud: f64,
    condition: WireCondition,
    humidity: f64,
    pressure_in: f64,
    dewpoint_f: f64,
    uv: f64,
    #[serde(default)]
    will_it_snow: u8,
    #[serde(default)]
    will_it_rain: u8,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AlertSection {
    #[serde(default)]
    alert: Vec<WireAlert>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WireAlert {
    headline: String,
    severity: String,
    certainty: String,
    urgency: String,
    category: String,
    areas: String,
    effective: String,
    expires: String,
    desc: String,
}

impl ForecastPayload {
    fn into_domain(self) -> Result<Forecast> {
        let mut days = self.forecast.forecast_days.into_iter();
        let today = days.next().ok_or_else(|| {
            BlizzardError::WeatherUnavailable("forecast payload has no days".to_string())
        })?;
        let tomorrow = days.next().ok_or_else(|| {
            BlizzardError::WeatherUnavailable("forecast payload has only one day".to_string())
        })?;

        let alerts = self
            .alerts
            .map(|section| section.alert.into_iter().map(WireAlert::into_domain).collect())
            .unwrap_or_default();

        Ok(Forecast {
            today: today.into_domain()?,
            tomorrow: tomorrow.into_domain()?,
            alerts,
        })
    }
}

impl WireForecastDay {
    fn into_domain(self) -> Result<ForecastDay> {
        let hours = self
            .hour
            .into_iter()
            .map(WireHour::into_domain)
            .collect::<Result<Vec<_>>>()?;
        Ok(ForecastDay {
            date: self.date,
            hours,
        })
    }
}

impl WireHour {
    fn into_domain(self) -> Result<HourSample> {
        let hour_of_day = parse_hour_of_day(&self.time)?;
        Ok(HourSample {
            hour_of_day,
            temp_f: self.temp_f,
            feelslike_f: self.feelslike_f,
            windchill_f: self.windchill_f,
            chance_of_snow: self.chance_of_snow,
            chance_of_rain: self.chance_of_rain,
            snow_cm: self.snow_cm,
            precip_mm: self.precip_mm,
            wind_mph: self.wind_mph,
            gust_mph: self.gust_mph,
            wind_dir: self.wind_dir,
            visibility_miles: self.vis_miles,
            cloud_pct: self.cloud,
            condition_text: self.condition.text,
            humidity_pct: self.humidity,
            pressure_in: self.pressure_in,
            dewpoint_f: self.dewpoint_f,
            uv_index: self.uv,
            will_it_snow: self.will_it_snow != 0,
            will_it_rain: self.will_it_rain != 0,
        })
    }
}

impl WireAlert {
    fn into_domain(self) -> WeatherAlert {
        WeatherAlert {
            headline: self.headline,
            severity: self.severity,
            certainty: self.certainty,
            urgency: self.urgency,
            category: self.category,
            areas: self.areas,
            effective_time: self.effective,
            expires_time: self.expires,
            description: self.desc,
        }
    }
}

/// Extract the hour of day from the provider's "YYYY-MM-DD HH:MM" stamp.
fn parse_hour_of_day(time: &str) -> Result<u8> {
    time.split_whitespace()
        .nth(1)
        .and_then(|clock| clock.split(':').next())
        .and_then(|hh| hh.parse::<u8>().ok())
        .filter(|h| *h < 24)
        .ok_or_else(|| {
            BlizzardError::WeatherUnavailable(format!("unparseable hour timestamp: {:?}", time))
        })
}

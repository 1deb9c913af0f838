//! Weather Domain
//!
//! Forecast retrieval, overnight feature extraction, and district alert
//! filtering. Everything downstream of the agents sees only the structured
//! [`WeatherFeatureSet`] built here.

pub mod alerts;
pub mod client;
pub mod features;

pub use alerts::filter_relevant_alerts;
pub use client::WeatherClient;
pub use features::{extract_features, HourFeatures, Trend, WeatherFeatureSet};

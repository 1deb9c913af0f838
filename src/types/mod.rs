pub mod conversation;
pub mod error;
pub mod forecast;

pub use conversation::{
    AgentRole, Conversation, Message, MessageRole, PredictionResult, SEED_AUTHOR,
};
pub use error::{BlizzardError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use forecast::{DistrictLocation, Forecast, ForecastDay, HourSample, WeatherAlert};

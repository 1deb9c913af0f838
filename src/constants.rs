//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Overnight analysis window constants
pub mod window {
    /// First hour of the evening segment (7 PM, inclusive)
    pub const EVENING_START_HOUR: u8 = 19;

    /// End of the evening segment (midnight, exclusive)
    pub const EVENING_END_HOUR: u8 = 24;

    /// First hour of the morning segment (midnight, inclusive)
    pub const MORNING_START_HOUR: u8 = 0;

    /// End of the morning segment (8 AM, exclusive)
    pub const MORNING_END_HOUR: u8 = 8;
}

/// Hourly probability scoring constants
pub mod scoring {
    /// Weight of the snow factor in the hourly probability
    pub const SNOW_WEIGHT: f64 = 0.35;

    /// Weight of the temperature factor
    pub const TEMP_WEIGHT: f64 = 0.20;

    /// Weight of the wind factor
    pub const WIND_WEIGHT: f64 = 0.20;

    /// Weight of the visibility factor
    pub const VIS_WEIGHT: f64 = 0.15;

    /// Snowfall rate at which the snow factor saturates (inches per hour)
    pub const SNOW_SATURATION_INCHES: f64 = 3.0;

    /// Centimeters per inch, for snow depth conversion
    pub const CM_PER_INCH: f64 = 2.54;

    /// Temperatures below this carry full weight (degrees Fahrenheit)
    pub const FULL_WEIGHT_TEMP_F: f64 = 20.0;

    /// Freezing point; the temperature factor decays to zero here
    pub const FREEZING_TEMP_F: f64 = 32.0;

    /// Width of the linear decay band between full weight and zero
    pub const TEMP_DECAY_RANGE_F: f64 = 12.0;

    /// Wind speed at which the wind factor saturates (mph)
    pub const WIND_SATURATION_MPH: f64 = 35.0;

    /// Visibility at or above which the visibility factor is zero (miles)
    pub const CLEAR_VISIBILITY_MILES: f64 = 10.0;

    /// Half-average deltas inside this band classify as steady
    pub const TREND_STEADY_BAND: f64 = 0.5;

    /// Half-average deltas beyond this magnitude drop the "slightly" qualifier
    pub const TREND_STRONG_DELTA: f64 = 2.0;
}

/// Group chat constants
pub mod chat {
    /// Hard ceiling on produced messages per prediction run
    pub const MAX_ITERATIONS: usize = 20;

    /// Marker the verdict reporter must include in its final statement
    pub const VERDICT_MARKER: &str = "SNOW DAY VERDICT";

    /// Delegate reply that ends the discussion
    pub const TERMINATE_TOKEN: &str = "TERMINATE";

    /// Token a reviewing agent includes once it concurs with the lead
    pub const AGREEMENT_TOKEN: &str = "AGREE";
}

/// Invocation retry constants
pub mod retry {
    /// Maximum attempts per agent invocation
    pub const MAX_ATTEMPTS: u32 = 5;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1000;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Minimum spacing between outbound requests (milliseconds)
    pub const MIN_REQUEST_INTERVAL_MS: u64 = 2000;
}

/// Network constants
pub mod network {
    /// Default timeout for LLM API requests (seconds)
    pub const LLM_TIMEOUT_SECS: u64 = 120;

    /// Default timeout for weather API requests (seconds)
    pub const WEATHER_TIMEOUT_SECS: u64 = 30;
}

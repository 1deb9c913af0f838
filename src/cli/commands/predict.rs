//! Predict Command
//!
//! Runs one full prediction: fetch the forecast, extract overnight features,
//! hold the agent discussion, and persist the transcript plus verdict.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::ai::{create_provider, RetryingProvider, SharedProvider};
use crate::chat::{
    build_roster, build_seed_prompt, ConversationController, DelegatedSelection,
    DelegatedTermination, RuleBasedSelection, RuleBasedTermination, TerminationPolicy,
    TurnSelectionPolicy,
};
use crate::cli::Output;
use crate::config::{Config, ConfigLoader, DistrictProfile};
use crate::output::ResultSink;
use crate::types::{BlizzardError, Result};
use crate::weather::{extract_features, WeatherClient};

/// How the selection and termination policies are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyStrategy {
    /// Deterministic turn pipeline, no delegate calls
    #[default]
    Rule,
    /// Ask the chat provider who speaks next and when to stop
    Delegated,
}

impl std::str::FromStr for PolicyStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule" => Ok(PolicyStrategy::Rule),
            "delegated" => Ok(PolicyStrategy::Delegated),
            _ => Err(format!(
                "Unknown strategy: {}. Valid values: rule, delegated",
                s
            )),
        }
    }
}

#[derive(Debug, Default)]
pub struct PredictOptions {
    /// Load configuration from this file instead of the layered chain
    pub config_file: Option<PathBuf>,
    /// Model override
    pub model: Option<String>,
    /// ZIP code override
    pub zip_code: Option<String>,
    pub strategy: PolicyStrategy,
    /// Extract and print features, skip the discussion
    pub dry_run: bool,
}

pub fn run(options: PredictOptions) -> Result<()> {
    let mut config = match &options.config_file {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(model) = &options.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(zip) = &options.zip_code {
        config.weather.zip_code = zip.clone();
    }

    let rt = Runtime::new()
        .map_err(|e| BlizzardError::Config(format!("failed to create async runtime: {}", e)))?;
    rt.block_on(run_prediction(config, &options))
}

async fn run_prediction(config: Config, options: &PredictOptions) -> Result<()> {
    let out = Output::new();
    let profile = DistrictProfile::load(&config.district)?;

    out.section(&format!(
        "Snow day prediction for {} ({} County, {})",
        config.district.name, profile.location.county, profile.location.state
    ));

    // Weather first: the run aborts here if the forecast is unavailable
    let weather = WeatherClient::new(&config.weather)?;
    let forecast = weather.fetch_forecast().await?;
    let features = extract_features(&forecast, &profile.location)?;

    out.info(&format!(
        "Overnight window scored: avg probability {:.1}%, peak {:.1}%, {} relevant alert(s)",
        features.average_snow_probability, features.max_hour_probability, features.alert_count
    ));

    if options.dry_run {
        out.header("Extracted features");
        println!("{}", serde_json::to_string_pretty(&features)?);
        return Ok(());
    }

    let provider: SharedProvider = Arc::new(RetryingProvider::new(
        create_provider(&config.llm)?,
        config.retry.to_policy(),
    ));

    let (selection, termination): (Box<dyn TurnSelectionPolicy>, Box<dyn TerminationPolicy>) =
        match options.strategy {
            PolicyStrategy::Rule => (Box::new(RuleBasedSelection), Box::new(RuleBasedTermination)),
            PolicyStrategy::Delegated => (
                Box::new(DelegatedSelection::new(provider.clone())),
                Box::new(DelegatedTermination::new(provider.clone())),
            ),
        };

    let controller = ConversationController::new(
        provider,
        build_roster(&profile),
        selection,
        termination,
        config.chat.max_iterations,
    );

    let seed = build_seed_prompt(&features)?;
    let result = controller.run(seed).await?;

    out.header("Transcript");
    for message in result.conversation.iter().skip(1) {
        out.turn(&message.name, &message.content);
    }

    match &result.decision {
        Some(decision) => out.success(&format!("Verdict: {}", decision)),
        None => out.warning("Discussion ended without an explicit verdict"),
    }

    let sink = ResultSink::new(config.output.clone());
    sink.write(&result)?;
    out.success(&format!(
        "Saved prediction to {}",
        config.output.data_path().display()
    ));

    Ok(())
}

//! Check Command
//!
//! Verify the environment before a scheduled run: configuration validity,
//! district documents, and reachability of both external services.

use tokio::runtime::Runtime;

use crate::ai::create_provider;
use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::{BlizzardError, Result};
use crate::weather::WeatherClient;

pub fn run(skip_network: bool) -> Result<()> {
    let out = Output::new();
    out.section("Environment check");

    let config = match ConfigLoader::load() {
        Ok(config) => {
            out.success("Configuration loads and validates");
            config
        }
        Err(e) => {
            out.error(&format!("Configuration invalid: {}", e));
            return Err(e);
        }
    };

    if config.district.criteria_path.exists() {
        out.success(&format!(
            "Closure criteria found: {}",
            config.district.criteria_path.display()
        ));
    } else {
        out.warning(&format!(
            "No closure criteria at {} (default criteria will be used)",
            config.district.criteria_path.display()
        ));
    }

    if config.district.settings_path.exists() {
        out.success(&format!(
            "District settings found: {}",
            config.district.settings_path.display()
        ));
    } else {
        out.warning(&format!(
            "No district settings at {}",
            config.district.settings_path.display()
        ));
    }

    if skip_network {
        out.info("Skipping network checks");
        return Ok(());
    }

    let rt = Runtime::new()
        .map_err(|e| BlizzardError::Config(format!("failed to create async runtime: {}", e)))?;
    let mut healthy = true;

    let weather = WeatherClient::new(&config.weather);
    let provider = create_provider(&config.llm);

    // Probe both services concurrently; neither depends on the other
    let (weather_ok, llm_ok) = rt.block_on(async {
        futures::join!(
            async {
                match &weather {
                    Ok(client) => client.health_check().await.unwrap_or(false),
                    Err(_) => false,
                }
            },
            async {
                match &provider {
                    Ok(provider) => provider.health_check().await.unwrap_or(false),
                    Err(_) => false,
                }
            }
        )
    });

    if let Err(e) = &weather {
        out.error(&format!("Weather client: {}", e));
        healthy = false;
    } else if weather_ok {
        out.success("Weather API reachable");
    } else {
        out.error("Weather API unreachable or key rejected");
        healthy = false;
    }

    match &provider {
        Ok(provider) if llm_ok => {
            out.success(&format!("LLM provider reachable ({})", provider.model()));
        }
        Ok(_) => {
            out.error("LLM provider unreachable or key rejected");
            healthy = false;
        }
        Err(e) => {
            out.error(&format!("LLM provider: {}", e));
            healthy = false;
        }
    }

    if healthy {
        Ok(())
    } else {
        Err(BlizzardError::Config(
            "One or more checks failed".to_string(),
        ))
    }
}

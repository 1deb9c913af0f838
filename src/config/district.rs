//! District Documents
//!
//! Loads the district's closure criteria text and its settings YAML, and
//! renders both into the plain-text context block the agents receive.
//! Missing documents degrade to placeholder text rather than aborting a run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::types::DistrictConfig;
use crate::types::{DistrictLocation, Result};

const DEFAULT_CRITERIA: &str = "Default School Closure Criteria:\n\
- Closure is considered when overnight snowfall exceeds 6 inches\n\
- Closure is considered when wind chill falls below -20F\n\
- Closure is considered when road conditions prevent safe bus travel\n\n\
Replace this with your district's specific criteria in \
config/district/closure_criteria.txt";

/// District settings read from YAML. Every section is optional so a partial
/// file still renders a useful context block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictSettings {
    pub snow_days: SnowDaySettings,
    pub community: CommunitySettings,
    pub current: CurrentConditions,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowDaySettings {
    pub allotted: Option<u32>,
    pub used: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunitySettings {
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub community_type: Option<String>,
    pub winter_experience: Option<String>,
    pub bus_dependent_percentage: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub hype_level: Option<u32>,
    pub nearby_closures: Option<String>,
    pub social_media_buzz: Option<String>,
}

/// The district documents resolved and rendered for agent consumption
#[derive(Debug, Clone)]
pub struct DistrictProfile {
    pub location: DistrictLocation,
    pub criteria: String,
    pub settings_summary: String,
}

impl DistrictProfile {
    /// Resolve the district's documents from configured paths.
    pub fn load(config: &DistrictConfig) -> Result<Self> {
        let criteria = load_criteria(&config.criteria_path);
        let settings_summary = match load_settings(&config.settings_path) {
            Some(settings) => format_settings(&settings),
            None => "No district settings available.".to_string(),
        };

        Ok(Self {
            location: DistrictLocation {
                city: config.city.clone(),
                county: config.county.clone(),
                state: config.state.clone(),
                latitude: None,
                longitude: None,
            },
            criteria,
            settings_summary,
        })
    }
}

fn load_criteria(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            info!("Loaded district criteria from {}", path.display());
            text
        }
        Ok(_) => {
            warn!(
                "District criteria file {} is empty, using default criteria",
                path.display()
            );
            DEFAULT_CRITERIA.to_string()
        }
        Err(_) => {
            warn!(
                "No district criteria file at {}, using default criteria",
                path.display()
            );
            DEFAULT_CRITERIA.to_string()
        }
    }
}

fn load_settings(path: &Path) -> Option<DistrictSettings> {
    let text = fs::read_to_string(path)
        .map_err(|e| warn!("Failed to read district settings {}: {}", path.display(), e))
        .ok()?;
    serde_yaml::from_str(&text)
        .map_err(|e| warn!("Failed to parse district settings: {}", e))
        .ok()
}

/// Render settings as the plain-text block agents see.
fn format_settings(settings: &DistrictSettings) -> String {
    fn show<T: std::fmt::Display>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    let mut out = String::from("DISTRICT CONTEXT AND SETTINGS:\n\n");

    out.push_str("Snow Day Status:\n");
    out.push_str(&format!(
        "- Allotted snow days: {}\n",
        show(&settings.snow_days.allotted)
    ));
    out.push_str(&format!(
        "- Used snow days: {}\n\n",
        show(&settings.snow_days.used)
    ));

    out.push_str("Community Context:\n");
    out.push_str(&format!("- State: {}\n", show(&settings.community.state)));
    out.push_str(&format!(
        "- Community type: {}\n",
        show(&settings.community.community_type)
    ));
    out.push_str(&format!(
        "- Winter experience: {}\n",
        show(&settings.community.winter_experience)
    ));
    out.push_str(&format!(
        "- Bus dependent students: {}%\n\n",
        show(&settings.community.bus_dependent_percentage)
    ));

    out.push_str("Current Conditions:\n");
    out.push_str(&format!(
        "- Community hype level: {}/10\n",
        show(&settings.current.hype_level)
    ));
    out.push_str(&format!(
        "- Nearby district closures: {}\n",
        show(&settings.current.nearby_closures)
    ));
    out.push_str(&format!(
        "- Social media activity: {}\n",
        show(&settings.current.social_media_buzz)
    ));

    if !settings.notes.is_empty() {
        out.push_str("\nImportant Community Notes:\n");
        for note in &settings.notes {
            out.push_str(&format!("- {}\n", note));
        }
    }

    out
}

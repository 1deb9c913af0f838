//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/blizzard/config.toml)
//! 3. Local config (.blizzard/config.toml)
//! 4. Environment variables (BLIZZARD_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{BlizzardError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → local → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge local config
        let local_path = Self::local_config_path();
        if local_path.exists() {
            debug!("Loading local config from: {}", local_path.display());
            figment = figment.merge(Toml::file(&local_path));
        }

        // Merge environment variables (e.g., BLIZZARD_LLM_MODEL -> llm.model)
        figment = figment.merge(Env::prefixed("BLIZZARD_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| BlizzardError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| BlizzardError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/blizzard/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("blizzard"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".blizzard/config.toml")
    }

    /// Get local data directory
    pub fn local_dir() -> PathBuf {
        PathBuf::from(".blizzard")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global: {} {}", exists, global.display());
        } else {
            println!("  Global: (not available)");
        }

        let local = Self::local_config_path();
        let exists = if local.exists() { "✓" } else { "✗" };
        println!("  Local:  {} {}", exists, local.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config)
                    .map_err(|e| BlizzardError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    /// Edit config file with default editor
    pub fn edit_config(global: bool) -> Result<()> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                BlizzardError::Config("Cannot determine global config path".to_string())
            })?
        } else {
            Self::local_config_path()
        };

        if !path.exists() {
            println!("Config file does not exist: {}", path.display());
            println!(
                "Run: blizzard config init {}",
                if global { "--global" } else { "" }
            );
            return Ok(());
        }

        let editor = env::var("EDITOR").unwrap_or_else(|_| {
            if cfg!(target_os = "macos") {
                "open".to_string()
            } else if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        });

        let status = std::process::Command::new(&editor)
            .arg(&path)
            .status()
            .map_err(|e| {
                BlizzardError::Config(format!("Failed to launch editor {}: {}", editor, e))
            })?;

        if !status.success() {
            return Err(BlizzardError::Config("Editor exited with error".to_string()));
        }

        println!("Config saved: {}", path.display());
        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            BlizzardError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_global_config())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    /// Initialize local configuration and district document stubs
    pub fn init_local(district_name: Option<&str>) -> Result<PathBuf> {
        let local_dir = Self::local_dir();

        fs::create_dir_all(&local_dir)?;
        fs::create_dir_all("config/district")?;
        fs::create_dir_all("static")?;

        let config_path = local_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, Self::default_local_config(district_name))?;
            info!("Created local config: {}", config_path.display());
        }

        Ok(local_dir)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default global config content (TOML)
    fn default_global_config() -> String {
        r#"# Blizzard Global Configuration
# User-wide defaults. Settings in .blizzard/config.toml override these.

version = "1.0"

# LLM settings (for the agent conversation)
[llm]
provider = "openai"
model = "gpt-4o-mini"
timeout_secs = 120
temperature = 0.4

# Retry and pacing
[retry]
max_attempts = 5
min_request_interval_ms = 2000
"#
        .to_string()
    }

    /// Generate default local config content (TOML)
    fn default_local_config(district_name: Option<&str>) -> String {
        let name = district_name.unwrap_or("Example Public Schools");
        format!(
            r#"# Blizzard Local Configuration
# District-specific settings that override global defaults.

version = "1.0"

[district]
name = "{}"
city = "Grand Rapids"
county = "Kent"
state = "MI"
criteria_path = "config/district/closure_criteria.txt"
settings_path = "config/district/settings.yaml"

[weather]
zip_code = "49503"

[output]
data_dir = "static"
environment = "development"
"#,
            name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let config = ConfigLoader::load().unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[district]
county = "Ottawa"

[weather]
zip_code = "49423"

[chat]
max_iterations = 12
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.district.county, "Ottawa");
        assert_eq!(config.weather.zip_code, "49423");
        assert_eq!(config.chat.max_iterations, 12);
        // Untouched sections keep their defaults
        assert_eq!(config.output.environment, "development");
    }

    #[test]
    fn test_env_override() {
        // SAFETY: This test runs in isolation
        unsafe {
            std::env::set_var("BLIZZARD_LLM_MODEL", "test-model");
        }
        let config = ConfigLoader::load().unwrap();
        assert_eq!(config.llm.model.as_deref(), Some("test-model"));
        unsafe {
            std::env::remove_var("BLIZZARD_LLM_MODEL");
        }
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nmax_iterations = 0\n").unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }
}

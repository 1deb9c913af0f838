//! Config Command
//!
//! Manage Blizzard configuration.
//!
//! Usage:
//!   blizzard config show [-f json]
//!   blizzard config path
//!   blizzard config edit [-g]
//!   blizzard config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show configuration
pub fn show(global: bool, format: &str) -> Result<()> {
    let as_json = format == "json";

    if global {
        if let Some(global_path) = ConfigLoader::global_config_path() {
            if global_path.exists() {
                let content = std::fs::read_to_string(&global_path)?;
                println!("# Global Config: {}\n", global_path.display());
                println!("{}", content);
            } else {
                println!("No global config found.");
                println!("Run 'blizzard config init --global' to create one.");
            }
        } else {
            println!("Cannot determine global config directory.");
        }
    } else {
        // Show merged effective config
        ConfigLoader::show_config(as_json)?;
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Edit configuration file
pub fn edit(global: bool) -> Result<()> {
    ConfigLoader::edit_config(global)
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let dir = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Directory: {}", dir.display());
    if let Some(config_path) = ConfigLoader::global_config_path() {
        println!("  Config:    {}", config_path.display());
    }
    Ok(())
}

/// Initialize local configuration and district document stubs
pub fn init_local(district: Option<&str>) -> Result<()> {
    let dir = ConfigLoader::init_local(district)?;
    println!("✓ Initialized local configuration");
    println!("  Directory: {}", dir.display());
    println!(
        "  Config:    {}",
        ConfigLoader::local_config_path().display()
    );
    println!();
    println!("Next steps:");
    println!("  1. Put your district's closure criteria in config/district/closure_criteria.txt");
    println!("  2. Set WEATHER_API_KEY and OPENAI_API_KEY in the environment");
    println!("  3. Run 'blizzard predict'");
    Ok(())
}

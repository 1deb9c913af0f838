use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blizzard::cli::commands::predict::{PolicyStrategy, PredictOptions};

/// Parse policy strategy from string
fn parse_strategy(s: &str) -> Result<PolicyStrategy, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "blizzard")]
#[command(
    version,
    about = "Multi-agent snow day prediction for school districts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a prediction and publish the transcript and verdict
    Predict {
        #[arg(long, short, help = "Load configuration from a specific file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
        #[arg(long, help = "ZIP code override for the forecast query")]
        zip: Option<String>,
        #[arg(long, value_parser = parse_strategy, default_value = "rule",
              help = "Policy strategy: rule, delegated")]
        strategy: PolicyStrategy,
        #[arg(long = "dry-run", help = "Extract and print weather features only")]
        dry_run: bool,
    },

    /// Show past predictions
    History {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(short = 'n', long, default_value = "10", help = "Entries to show")]
        limit: usize,
    },

    /// Verify configuration and external service reachability
    Check {
        #[arg(long, help = "Skip weather and LLM reachability checks")]
        offline: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Edit configuration file with $EDITOR
    Edit {
        #[arg(long, short, help = "Edit global config")]
        global: bool,
    },
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
        #[arg(long, help = "District name for the local config")]
        district: Option<String>,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Predict {
            config,
            model,
            zip,
            strategy,
            dry_run,
        } => {
            blizzard::cli::commands::predict::run(PredictOptions {
                config_file: config,
                model,
                zip_code: zip,
                strategy,
                dry_run,
            })?;
        }
        Commands::History { format, limit } => {
            blizzard::cli::commands::history::run(&format, limit)?;
        }
        Commands::Check { offline } => {
            blizzard::cli::commands::check::run(offline)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                blizzard::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                blizzard::cli::commands::config::path()?;
            }
            ConfigAction::Edit { global } => {
                blizzard::cli::commands::config::edit(global)?;
            }
            ConfigAction::Init {
                global,
                force,
                district,
            } => {
                if global {
                    blizzard::cli::commands::config::init_global(force)?;
                } else {
                    blizzard::cli::commands::config::init_local(district.as_deref())?;
                }
            }
        },
    }

    Ok(())
}

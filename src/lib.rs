//! Blizzard - Multi-Agent Snow Day Prediction
//!
//! Predicts whether a school district will close for snow by orchestrating
//! role-playing language-model agents in a turn-based discussion, seeded
//! with extracted overnight weather features and the district's own closure
//! criteria.
//!
//! ## Pipeline
//!
//! 1. Fetch a two-day hourly forecast and filter alerts to the district
//! 2. Score the 7 PM - 8 AM window into bounded probability features
//! 3. Seed a four-agent discussion (weather report, analysis, review, verdict)
//! 4. Drive turns through selection/termination policies under an iteration cap
//! 5. Persist the transcript and verdict for the web page
//!
//! ## Quick Start
//!
//! ```ignore
//! use blizzard::chat::{build_roster, build_seed_prompt, ConversationController,
//!     RuleBasedSelection, RuleBasedTermination};
//! use blizzard::weather::extract_features;
//!
//! let features = extract_features(&forecast, &profile.location)?;
//! let controller = ConversationController::new(
//!     provider,
//!     build_roster(&profile),
//!     Box::new(RuleBasedSelection),
//!     Box::new(RuleBasedTermination),
//!     20,
//! );
//! let result = controller.run(build_seed_prompt(&features)?).await?;
//! ```
//!
//! ## Modules
//!
//! - [`weather`]: forecast retrieval, feature extraction, alert filtering
//! - [`chat`]: agents, turn selection, termination, the controller loop
//! - [`ai`]: chat provider abstraction with retry and pacing
//! - [`config`]: layered TOML config plus district documents
//! - [`output`]: prediction persistence for the web page

pub mod ai;
pub mod chat;
pub mod cli;
pub mod config;
pub mod constants;
pub mod output;
pub mod types;
pub mod weather;

pub use types::{BlizzardError, Result};

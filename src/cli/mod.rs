//! CLI command implementations.
//!
//! Each command takes a [`PatrolApp`] (stores, state and services wired
//! from configuration) and writes its output to a caller-supplied writer.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the snapshot and folder index loops until Ctrl-C |
//! | `export` | Fetch one snapshot and write the disposition CSV |
//! | `folders` | Build the folder index once and list it |
//! | `files` | Locate evidence files for a candidate |
//! | `pending` | Answered/unanswered split for a reviewer |
//! | `submit` | Record a disposition |
//! | `show` | Candidate detail with reviewer names |
//! | `glossary` | Search disposition abbreviations |
//!
//! # Example Usage
//!
//! ```bash
//! # Keep the views fresh
//! planet-patrol serve
//!
//! # Export every candidate
//! planet-patrol export --all --output ./exports
//!
//! # What is left for a reviewer
//! planet-patrol pending --reviewer user:ada@example.org
//! ```

mod app;
mod export;
mod folders;
mod glossary;
mod review;
mod serve;

pub use app::{AppReviewService, ConfiguredGroupPolicy, PatrolApp};
pub use export::cmd_export;
pub use folders::{cmd_files, cmd_folders};
pub use glossary::cmd_glossary;
pub use review::{cmd_pending, cmd_show, cmd_submit};
pub use serve::{cmd_serve, ctrl_c};

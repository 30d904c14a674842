//! TGAM Score - Session scoring engine for TGAM attention/meditation recordings
//!
//! TGAM Score reduces a recorded session of paired attention/meditation readings
//! (one per second) into summary statistics through a deterministic pipeline:
//! CSV ingestion → session validation → scoring → report encoding.
//!
//! ## Modules
//!
//! - **Scoring**: mean, population deviation, cumulative sums and effective learning time
//! - **Classification**: per-sample `Above`/`Below` labels shared by scoring and charts
//! - **Rendering** (feature `tui`): interactive terminal chart of a session

pub mod chart;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod types;

#[cfg(feature = "tui")]
pub mod render;

pub use config::{EffectiveTimeMode, ScorerConfig, DEFAULT_THRESHOLD};
pub use error::{ComputeError, InvalidSession};
pub use pipeline::{score_file, score_reader, score_session, ScoredSession};
pub use scorer::{classify, summarize, summarize_scores, SessionScorer};
pub use types::{AttentionLabel, Channel, Sample, ScoreRange, Session, SessionSummary};

/// Crate version embedded in all reports
pub const SCORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "tgam-score";

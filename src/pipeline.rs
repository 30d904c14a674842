//! Pipeline orchestration
//!
//! Wires ingestion, scoring and classification together for callers that start
//! from a recording on disk.

use crate::chart::ChartModel;
use crate::config::ScorerConfig;
use crate::error::ComputeError;
use crate::ingest::SessionReader;
use crate::report::{ReportEncoder, SessionReport};
use crate::scorer::SessionScorer;
use crate::types::{AttentionLabel, Session, SessionSummary};
use log::{debug, info};
use std::io::Read;
use std::path::Path;

/// A session together with everything derived from it
#[derive(Debug, Clone)]
pub struct ScoredSession {
    pub session: Session,
    pub summary: SessionSummary,
    pub labels: Vec<AttentionLabel>,
    pub config: ScorerConfig,
}

impl ScoredSession {
    /// Chart model sharing this session's labels
    pub fn chart(&self) -> ChartModel {
        ChartModel::with_labels(&self.session, self.labels.clone())
    }

    /// Build a report for this session
    pub fn report(
        &self,
        encoder: &ReportEncoder,
        source: &str,
        include_labels: bool,
    ) -> SessionReport {
        let labels = include_labels.then_some(self.labels.as_slice());
        encoder.encode(&self.summary, &self.config, source, labels)
    }
}

/// Score an already-built session with the given configuration.
///
/// The configured threshold replaces whatever threshold the session carried.
pub fn score_session(
    session: Session,
    config: &ScorerConfig,
) -> Result<ScoredSession, ComputeError> {
    config.validate()?;
    let session = session.with_threshold(config.threshold)?;

    let summary = SessionScorer::summarize(&session);
    let labels = SessionScorer::classify(&session, config.threshold)?;
    debug!(
        "scored {} samples: effective learning time {} s",
        summary.session_duration, summary.effective_learning_time
    );

    Ok(ScoredSession {
        session,
        summary,
        labels,
        config: *config,
    })
}

/// Read a CSV recording and score it
pub fn score_file(
    path: impl AsRef<Path>,
    config: &ScorerConfig,
) -> Result<ScoredSession, ComputeError> {
    let path = path.as_ref();
    config.validate()?;
    let session = SessionReader::from_path(path)?;
    info!("loaded {} samples from {}", session.len(), path.display());
    score_session(session, config)
}

/// Read a CSV recording from any reader and score it
pub fn score_reader<R: Read>(
    reader: R,
    config: &ScorerConfig,
) -> Result<ScoredSession, ComputeError> {
    config.validate()?;
    let session = SessionReader::from_reader(reader)?;
    score_session(session, config)
}

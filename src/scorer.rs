//! Session scoring
//!
//! This module reduces a session into its summary statistics:
//! - Mean and population standard deviation per channel
//! - Inclusive cumulative sums per channel
//! - Effective learning time (attention strictly above the threshold)
//!
//! Everything here is pure: no I/O, no shared state, inputs are never mutated.

use crate::config::validate_threshold;
use crate::error::ComputeError;
use crate::types::{AttentionLabel, ScoreRange, Session, SessionSummary};

/// Scorer for computing session summaries
pub struct SessionScorer;

impl SessionScorer {
    /// Summarize a session using its own threshold
    pub fn summarize(session: &Session) -> SessionSummary {
        let threshold = session.threshold();
        let attention = channel_stats(session.attention());
        let meditation = channel_stats(session.meditation());
        let (effective_learning_time, effective_attention_total) =
            effective_learning(session.attention(), threshold);

        SessionSummary {
            session_duration: session.len(),
            threshold,
            average_attention: attention.mean,
            average_meditation: meditation.mean,
            attention_deviation: attention.deviation,
            meditation_deviation: meditation.deviation,
            attention_range: attention.range,
            meditation_range: meditation.range,
            cumulative_attention: attention.cumulative,
            cumulative_meditation: meditation.cumulative,
            effective_learning_time,
            effective_attention_total,
        }
    }

    /// Label every attention sample against `threshold`
    pub fn classify(
        session: &Session,
        threshold: f64,
    ) -> Result<Vec<AttentionLabel>, ComputeError> {
        let threshold = validate_threshold(threshold)?;
        Ok(label_series(session.attention(), threshold))
    }
}

/// Summarize a session. See [`SessionScorer::summarize`].
pub fn summarize(session: &Session) -> SessionSummary {
    SessionScorer::summarize(session)
}

/// Classify attention samples. See [`SessionScorer::classify`].
pub fn classify(session: &Session, threshold: f64) -> Result<Vec<AttentionLabel>, ComputeError> {
    SessionScorer::classify(session, threshold)
}

/// Build a session from raw series and summarize it in one step.
///
/// All-or-nothing: any invalid series or threshold yields an error and no summary.
pub fn summarize_scores(
    attention: &[f64],
    meditation: &[f64],
    threshold: f64,
) -> Result<SessionSummary, ComputeError> {
    let session = Session::new(attention.to_vec(), meditation.to_vec())?.with_threshold(threshold)?;
    Ok(SessionScorer::summarize(&session))
}

pub(crate) fn label_series(scores: &[f64], threshold: f64) -> Vec<AttentionLabel> {
    scores
        .iter()
        .map(|&score| AttentionLabel::of(score, threshold))
        .collect()
}

struct ChannelStats {
    mean: f64,
    deviation: f64,
    range: ScoreRange,
    cumulative: Vec<f64>,
}

/// Compute mean, population deviation, range and prefix sums for one channel.
///
/// Callers guarantee a non-empty slice of finite scores.
fn channel_stats(scores: &[f64]) -> ChannelStats {
    let mut cumulative = Vec::with_capacity(scores.len());
    let mut running = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for &score in scores {
        running += score;
        cumulative.push(running);
        min = min.min(score);
        max = max.max(score);
    }

    let n = scores.len() as f64;
    // Rounding can push the mean a hair outside the observed range
    let mean = (running / n).clamp(min, max);

    let deviation = if min == max {
        0.0
    } else {
        population_deviation(scores, mean, min.abs().max(max.abs()))
    };

    ChannelStats {
        mean,
        deviation,
        range: ScoreRange { min, max },
        cumulative,
    }
}

/// Population standard deviation around `mean`.
///
/// Squared deviations of scores near `f64::MAX` overflow even when the deviation
/// itself is representable; those are recomputed on values divided by `scale`.
fn population_deviation(scores: &[f64], mean: f64, scale: f64) -> f64 {
    let n = scores.len() as f64;
    let variance = scores.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return variance.sqrt();
    }

    let scaled_mean = mean / scale;
    let variance = scores
        .iter()
        .map(|x| (x / scale - scaled_mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt() * scale
}

/// Count attention samples above the threshold and total their scores
fn effective_learning(attention: &[f64], threshold: f64) -> (usize, f64) {
    attention
        .iter()
        .filter(|&&score| AttentionLabel::of(score, threshold).is_above())
        .fold((0, 0.0), |(count, total), &score| (count + 1, total + score))
}

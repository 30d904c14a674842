//! Core types for TGAM Score
//!
//! This module defines the session data that flows through the scoring pipeline:
//! raw samples, the validated session, per-sample labels and the derived summary.

use crate::config::{validate_threshold, EffectiveTimeMode, DEFAULT_THRESHOLD};
use crate::error::{ComputeError, InvalidSession};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score channel reported by the TGAM chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Attention,
    Meditation,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Attention => "attention",
            Channel::Meditation => "meditation",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading, taken roughly once per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub attention: f64,
    pub meditation: f64,
}

/// Classification of an attention sample against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionLabel {
    Above,
    Below,
}

impl AttentionLabel {
    /// Label a single attention score.
    ///
    /// Strictly greater than the threshold counts as `Above`. Every consumer
    /// (effective learning time, classification, chart colors) goes through here.
    #[inline]
    pub fn of(score: f64, threshold: f64) -> Self {
        if score > threshold {
            AttentionLabel::Above
        } else {
            AttentionLabel::Below
        }
    }

    pub fn is_above(&self) -> bool {
        matches!(self, AttentionLabel::Above)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionLabel::Above => "above",
            AttentionLabel::Below => "below",
        }
    }
}

/// A complete recording session.
///
/// Attention and meditation series always have the same non-zero length and
/// hold only finite scores. Index order is the time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    attention: Vec<f64>,
    meditation: Vec<f64>,
    threshold: f64,
}

impl Session {
    /// Build a session from the two score series, using the default threshold
    pub fn new(attention: Vec<f64>, meditation: Vec<f64>) -> Result<Self, ComputeError> {
        if attention.len() != meditation.len() {
            return Err(InvalidSession::LengthMismatch {
                attention: attention.len(),
                meditation: meditation.len(),
            }
            .into());
        }
        if attention.is_empty() {
            return Err(InvalidSession::Empty.into());
        }
        check_finite(&attention, Channel::Attention)?;
        check_finite(&meditation, Channel::Meditation)?;
        check_sum(&attention, Channel::Attention)?;
        check_sum(&meditation, Channel::Meditation)?;

        Ok(Self {
            attention,
            meditation,
            threshold: DEFAULT_THRESHOLD,
        })
    }

    /// Build a session from paired samples
    pub fn from_samples(samples: &[Sample]) -> Result<Self, ComputeError> {
        let (attention, meditation): (Vec<f64>, Vec<f64>) = samples
            .iter()
            .map(|s| (s.attention, s.meditation))
            .unzip();
        Self::new(attention, meditation)
    }

    /// Replace the effective-learning threshold
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ComputeError> {
        self.threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    pub fn attention(&self) -> &[f64] {
        &self.attention
    }

    pub fn meditation(&self) -> &[f64] {
        &self.meditation
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of samples (elapsed seconds)
    pub fn len(&self) -> usize {
        self.attention.len()
    }

    /// Always false for a constructed session
    pub fn is_empty(&self) -> bool {
        self.attention.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.attention
            .iter()
            .zip(&self.meditation)
            .map(|(&attention, &meditation)| Sample {
                attention,
                meditation,
            })
    }
}

fn check_finite(scores: &[f64], channel: Channel) -> Result<(), InvalidSession> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(InvalidSession::NonFiniteScore { channel, index }),
        None => Ok(()),
    }
}

/// Cumulative sums and the effective attention total must stay finite.
///
/// The sum of magnitudes bounds every prefix sum and every subset sum.
fn check_sum(scores: &[f64], channel: Channel) -> Result<(), InvalidSession> {
    if scores.iter().map(|s| s.abs()).sum::<f64>().is_finite() {
        Ok(())
    } else {
        Err(InvalidSession::SumOverflow { channel })
    }
}

/// Lowest and highest score seen on a channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Summary statistics for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Number of samples, one per second
    pub session_duration: usize,
    /// Threshold used for effective learning time
    pub threshold: f64,
    pub average_attention: f64,
    pub average_meditation: f64,
    /// Population standard deviation of attention
    pub attention_deviation: f64,
    /// Population standard deviation of meditation
    pub meditation_deviation: f64,
    pub attention_range: ScoreRange,
    pub meditation_range: ScoreRange,
    /// Inclusive prefix sums of attention
    pub cumulative_attention: Vec<f64>,
    /// Inclusive prefix sums of meditation
    pub cumulative_meditation: Vec<f64>,
    /// Seconds with attention strictly above the threshold
    pub effective_learning_time: usize,
    /// Sum of the attention scores counted in `effective_learning_time`
    pub effective_attention_total: f64,
}

impl SessionSummary {
    /// Final cumulative attention score
    pub fn total_attention(&self) -> f64 {
        self.cumulative_attention.last().copied().unwrap_or(0.0)
    }

    /// Final cumulative meditation score
    pub fn total_meditation(&self) -> f64 {
        self.cumulative_meditation.last().copied().unwrap_or(0.0)
    }

    /// Effective learning figure for the requested aggregation
    pub fn effective_metric(&self, mode: EffectiveTimeMode) -> f64 {
        match mode {
            EffectiveTimeMode::Count => self.effective_learning_time as f64,
            EffectiveTimeMode::ValueSum => self.effective_attention_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_rejects_length_mismatch() {
        let err = Session::new(vec![1.0; 5], vec![1.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::LengthMismatch {
                attention: 5,
                meditation: 4
            })
        ));
    }

    #[test]
    fn test_session_rejects_empty() {
        let err = Session::new(vec![], vec![]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::Empty)
        ));
    }

    #[test]
    fn test_session_rejects_nan_score() {
        let err = Session::new(vec![10.0, 20.0], vec![5.0, f64::NAN]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::NonFiniteScore {
                channel: Channel::Meditation,
                index: 1
            })
        ));

        let err = Session::new(vec![f64::INFINITY], vec![5.0]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::NonFiniteScore {
                channel: Channel::Attention,
                index: 0
            })
        ));
    }

    #[test]
    fn test_session_rejects_overflowing_sum() {
        let err = Session::new(vec![1e308, 1.7e308], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::SumOverflow {
                channel: Channel::Attention
            })
        ));

        let err = Session::new(vec![0.0, 0.0], vec![-f64::MAX, -f64::MAX]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::SumOverflow {
                channel: Channel::Meditation
            })
        ));

        let err = Session::new(vec![f64::MAX, -f64::MAX], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::SumOverflow { .. })
        ));

        assert!(Session::new(vec![f64::MAX / 2.0, -f64::MAX / 2.0], vec![0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_session_threshold() {
        let session = Session::new(vec![1.0], vec![2.0]).unwrap();
        assert_eq!(session.threshold(), DEFAULT_THRESHOLD);

        let session = session.with_threshold(50.0).unwrap();
        assert_eq!(session.threshold(), 50.0);

        let err = session.with_threshold(f64::NAN).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidThreshold(t) if t.is_nan()));
    }

    #[test]
    fn test_from_samples_keeps_order() {
        let samples = [
            Sample { attention: 1.0, meditation: 4.0 },
            Sample { attention: 2.0, meditation: 5.0 },
            Sample { attention: 3.0, meditation: 6.0 },
        ];
        let session = Session::from_samples(&samples).unwrap();

        assert_eq!(session.attention(), &[1.0, 2.0, 3.0]);
        assert_eq!(session.meditation(), &[4.0, 5.0, 6.0]);
        assert_eq!(session.samples().collect::<Vec<_>>(), samples.to_vec());
    }

    #[test]
    fn test_label_is_strict() {
        assert_eq!(AttentionLabel::of(70.0, 70.0), AttentionLabel::Below);
        assert_eq!(AttentionLabel::of(70.5, 70.0), AttentionLabel::Above);
        assert_eq!(AttentionLabel::of(-1.0, 0.0), AttentionLabel::Below);
    }

    #[test]
    fn test_invalid_session_messages() {
        let err = ComputeError::from(InvalidSession::LengthMismatch {
            attention: 5,
            meditation: 4,
        });
        assert_eq!(
            err.to_string(),
            "Invalid session: attention has 5 samples but meditation has 4"
        );

        let err = ComputeError::from(InvalidSession::NonFiniteScore {
            channel: Channel::Attention,
            index: 3,
        });
        assert_eq!(
            err.to_string(),
            "Invalid session: attention score at index 3 is not a finite number"
        );
    }
}

//! Chart model
//!
//! Turns a session into plot-ready series. Attention is split into runs of
//! line segments sharing a label so a renderer can color them; meditation is a
//! single uniform series. Building the model has no side effects.

use crate::scorer::label_series;
use crate::types::{AttentionLabel, Session};
use serde::{Deserialize, Serialize};

/// Padding added above and below the score extremes
pub const Y_PADDING: f64 = 5.0;

/// Consecutive attention segments sharing one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRun {
    pub label: AttentionLabel,
    /// (elapsed seconds, score) points, including the closing point of the last segment
    pub points: Vec<(f64, f64)>,
}

/// Everything a renderer needs to draw a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartModel {
    pub session_duration: usize,
    pub threshold: f64,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub attention_runs: Vec<SegmentRun>,
    pub meditation: Vec<(f64, f64)>,
    pub labels: Vec<AttentionLabel>,
}

impl ChartModel {
    /// Build the chart model for a session using its threshold
    pub fn build(session: &Session) -> Self {
        let labels = label_series(session.attention(), session.threshold());
        Self::with_labels(session, labels)
    }

    /// Build the chart model from precomputed labels
    pub fn with_labels(session: &Session, labels: Vec<AttentionLabel>) -> Self {
        let attention = points(session.attention());
        let meditation = points(session.meditation());

        let (lo, hi) = session
            .attention()
            .iter()
            .chain(session.meditation())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });

        ChartModel {
            session_duration: session.len(),
            threshold: session.threshold(),
            x_bounds: [0.0, session.len() as f64],
            y_bounds: [lo - Y_PADDING, hi + Y_PADDING],
            attention_runs: segment_runs(&attention, &labels, session.threshold()),
            meditation,
            labels,
        }
    }
}

fn points(scores: &[f64]) -> Vec<(f64, f64)> {
    scores
        .iter()
        .enumerate()
        .map(|(t, &score)| (t as f64, score))
        .collect()
}

/// Group segments `i -> i+1` by the label of sample `i`
fn segment_runs(
    points: &[(f64, f64)],
    labels: &[AttentionLabel],
    threshold: f64,
) -> Vec<SegmentRun> {
    let label_at = |i: usize| {
        labels
            .get(i)
            .copied()
            .unwrap_or_else(|| AttentionLabel::of(points[i].1, threshold))
    };

    if points.len() == 1 {
        return vec![SegmentRun {
            label: label_at(0),
            points: points.to_vec(),
        }];
    }

    let mut runs: Vec<SegmentRun> = Vec::new();
    for (i, segment) in points.windows(2).enumerate() {
        let label = label_at(i);
        match runs.last_mut() {
            Some(run) if run.label == label => run.points.push(segment[1]),
            _ => runs.push(SegmentRun {
                label,
                points: segment.to_vec(),
            }),
        }
    }
    runs
}

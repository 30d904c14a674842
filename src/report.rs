//! Report encoding
//!
//! This module wraps a session summary with producer and provenance metadata
//! and renders it either as JSON or as a plain-text reflection summary.

use crate::config::{EffectiveTimeMode, ScorerConfig};
use crate::error::ComputeError;
use crate::types::{AttentionLabel, SessionSummary};
use crate::{PRODUCER_NAME, SCORE_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where the session came from and when it was scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source: String,
    pub computed_at_utc: String,
}

/// Headline effective learning figure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveMetric {
    pub mode: EffectiveTimeMode,
    pub value: f64,
}

/// Scored session ready for output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub config: ScorerConfig,
    pub effective_metric: EffectiveMetric,
    pub summary: SessionSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<AttentionLabel>>,
}

/// Encoder for session reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build a report for a summary
    pub fn encode(
        &self,
        summary: &SessionSummary,
        config: &ScorerConfig,
        source: &str,
        labels: Option<&[AttentionLabel]>,
    ) -> SessionReport {
        SessionReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: SCORE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                source: source.to_string(),
                computed_at_utc: Utc::now().to_rfc3339(),
            },
            config: *config,
            effective_metric: EffectiveMetric {
                mode: config.mode,
                value: summary.effective_metric(config.mode),
            },
            summary: summary.clone(),
            labels: labels.map(<[AttentionLabel]>::to_vec),
        }
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(
        &self,
        summary: &SessionSummary,
        config: &ScorerConfig,
        source: &str,
    ) -> Result<String, ComputeError> {
        let report = self.encode(summary, config, source, None);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}

/// Render a report as human-readable text
pub fn render_text(report: &SessionReport) -> String {
    let s = &report.summary;
    let mut lines = vec![
        "Session Report".to_string(),
        "==============".to_string(),
        format!("Source:            {}", report.provenance.source),
        format!("Duration:          {} s", s.session_duration),
        format!("Threshold:         {}", s.threshold),
        String::new(),
        format!(
            "Attention:         avg {:.2}  sd {:.2}  min {}  max {}",
            s.average_attention, s.attention_deviation, s.attention_range.min, s.attention_range.max
        ),
        format!(
            "Meditation:        avg {:.2}  sd {:.2}  min {}  max {}",
            s.average_meditation,
            s.meditation_deviation,
            s.meditation_range.min,
            s.meditation_range.max
        ),
        format!("Total attention:   {}", s.total_attention()),
        format!("Total meditation:  {}", s.total_meditation()),
        String::new(),
        format!("Effective learning time: {} s", s.effective_learning_time),
    ];
    if report.effective_metric.mode == EffectiveTimeMode::ValueSum {
        lines.push(format!(
            "Effective attention total: {}",
            report.effective_metric.value
        ));
    }
    lines.push(String::new());
    lines.push("Cumulative attention:".to_string());
    lines.push(format!("  {}", join(&s.cumulative_attention)));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::summarize_scores;

    fn sample_summary() -> SessionSummary {
        summarize_scores(&[10.0, 80.0, 90.0, 20.0], &[40.0, 50.0, 60.0, 50.0], 70.0).unwrap()
    }

    #[test]
    fn test_encode_count_mode() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&sample_summary(), &ScorerConfig::default(), "session.csv", None);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.provenance.source, "session.csv");
        assert_eq!(report.effective_metric.mode, EffectiveTimeMode::Count);
        assert_eq!(report.effective_metric.value, 2.0);
        assert!(report.labels.is_none());
    }

    #[test]
    fn test_encode_value_sum_mode() {
        let encoder = ReportEncoder::new();
        let config = ScorerConfig::default().with_mode(EffectiveTimeMode::ValueSum);
        let report = encoder.encode(&sample_summary(), &config, "session.csv", None);

        assert_eq!(report.effective_metric.value, 170.0);
        assert_eq!(report.summary.effective_learning_time, 2);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(&sample_summary(), &ScorerConfig::default(), "session.csv")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["session_duration"], 4);
        assert_eq!(value["summary"]["effective_learning_time"], 2);
        assert_eq!(value["summary"]["average_attention"], 50.0);
        assert_eq!(value["effective_metric"]["mode"], "count");
        assert_eq!(value["config"]["threshold"], 70.0);
        assert!(value.get("labels").is_none());
        assert!(value["producer"]["instance_id"].as_str().is_some());
    }

    #[test]
    fn test_labels_included_when_requested() {
        let labels = [AttentionLabel::Below, AttentionLabel::Above];
        let report = ReportEncoder::new().encode(
            &sample_summary(),
            &ScorerConfig::default(),
            "-",
            Some(&labels),
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["labels"], serde_json::json!(["below", "above"]));
    }

    #[test]
    fn test_render_text() {
        let report =
            ReportEncoder::new().encode(&sample_summary(), &ScorerConfig::default(), "s.csv", None);
        let text = render_text(&report);

        assert!(text.contains("Duration:          4 s"));
        assert!(text.contains("Effective learning time: 2 s"));
        assert!(text.contains("10 90 180 200"));
        assert!(!text.contains("Effective attention total"));
    }

    #[test]
    fn test_render_text_value_sum() {
        let config = ScorerConfig::default().with_mode(EffectiveTimeMode::ValueSum);
        let report = ReportEncoder::new().encode(&sample_summary(), &config, "s.csv", None);
        let text = render_text(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Session Report");
        assert!(lines.contains(&"Effective attention total: 170"));
        assert_eq!(lines.last(), Some(&"  10 90 180 200"));
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
    }
}

//! Step outcomes and the merged report record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use finsight_model::SynthesisResult;

use crate::financial::Row;

/// Outcome of one report step.
///
/// Empty and failed are distinct states: empty is a valid answer
/// ("nothing there"), failed means the step could not run to completion.
/// Neither is an error to the report's caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum StepOutcome<T> {
    /// The step ran and produced a payload.
    Success(T),
    /// The step ran and found nothing.
    Empty {
        /// Why the step came back empty.
        reason: String,
    },
    /// The step could not complete.
    Failed {
        /// A description of the failure.
        error: String,
    },
}

impl<T> StepOutcome<T> {
    /// The payload, when the step succeeded.
    pub fn success(&self) -> Option<&T> {
        match self {
            StepOutcome::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// Whether the step succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }
}

/// One generated research report.
///
/// Built fresh per request and returned to the caller; never persisted.
/// Each section is present only when its step was requested and actually
/// ran; a step skipped for missing inputs is absent, same as one that
/// was never requested. The merge is a keyed record, so step completion
/// order cannot affect the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// Answer synthesized from indexed document content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical: Option<StepOutcome<SynthesisResult>>,

    /// Quarterly metric rows from the financial store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_summary: Option<StepOutcome<Vec<Row>>>,

    /// Pre-rendered chart image from the financial store, passed through
    /// untouched (base64 on the wire).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::financial::base64_bytes"
    )]
    pub financial_chart: Option<Vec<u8>>,

    /// Live web search result records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<StepOutcome<Vec<Value>>>,

    /// Request problems that degraded rather than failed, e.g. an
    /// unrecognized agent name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcomes_tag_their_status() {
        let success: StepOutcome<Vec<Row>> = StepOutcome::Success(vec![]);
        assert_eq!(
            serde_json::to_value(&success).unwrap(),
            json!({"status": "success", "data": []})
        );

        let failed: StepOutcome<Vec<Row>> =
            StepOutcome::Failed { error: "credentials missing".into() };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "failed", "data": {"error": "credentials missing"}})
        );
    }

    #[test]
    fn absent_sections_are_omitted_from_the_wire_shape() {
        let report = Report::default();
        assert_eq!(serde_json::to_value(&report).unwrap(), json!({}));
    }

    #[test]
    fn chart_bytes_round_trip_as_base64() {
        let report = Report { financial_chart: Some(vec![0x89, 0x50, 0x4e, 0x47]), ..Default::default() };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["financial_chart"], json!("iVBORw=="));

        let parsed: Report = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.financial_chart, Some(vec![0x89, 0x50, 0x4e, 0x47]));
    }
}

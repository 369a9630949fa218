//! assessment.rs: Structures for scout findings, per-source outcomes and the final verdict.
//!
//! The JSON shapes here are the public contract of the risk-assessment endpoint:
//! `AssessmentResult` on success, `NoSourcesReport` when nothing matches the context.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScoutError;

/// Severity of one operational finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Case-insensitive; anything unrecognized counts as `Low`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Self::High,
            "MEDIUM" => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Small closed taxonomy the scout tags each finding with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Metric,
    Quote,
    #[default]
    Status,
}

impl Category {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "METRIC" => Self::Metric,
            "QUOTE" => Self::Quote,
            _ => Self::Status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationalStatus {
    Normal,
    Disrupted,
    #[default]
    Unknown,
}

impl OperationalStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Self::Normal,
            "DISRUPTED" => Self::Disrupted,
            _ => Self::Unknown,
        }
    }
}

/// One discrete finding extracted by a scout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub summary: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub category: Category,
}

impl Signal {
    pub fn new(summary: impl Into<String>, severity: Severity, category: Category) -> Self {
        Self {
            summary: summary.into(),
            severity,
            date: None,
            category,
        }
    }

    pub fn dated(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Lenient conversion from one element of the agent's `signals` array.
    /// Returns `None` for elements that are not objects.
    fn from_value(value: Value) -> Option<Self> {
        #[derive(Deserialize)]
        struct Raw {
            summary: Option<Value>,
            severity: Option<Value>,
            date: Option<Value>,
            category: Option<Value>,
        }

        let raw: Raw = serde_json::from_value(value).ok()?;
        let summary = match raw.summary {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let date = raw
            .date
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Some(Self {
            summary,
            severity: raw
                .severity
                .as_ref()
                .and_then(Value::as_str)
                .map(Severity::parse)
                .unwrap_or_default(),
            date,
            category: raw
                .category
                .as_ref()
                .and_then(Value::as_str)
                .map(Category::parse)
                .unwrap_or_default(),
        })
    }
}

/// Structured payload a scout reports in its `final_result` frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Findings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_status: Option<String>,
    #[serde(default)]
    pub operational_status: OperationalStatus,
    /// `None` when the agent reported no `signals` collection at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<Signal>>,
}

impl Findings {
    pub fn with_signals(signals: Vec<Signal>) -> Self {
        Self {
            scan_status: Some("completed".to_string()),
            operational_status: OperationalStatus::Unknown,
            signals: Some(signals),
        }
    }

    /// Interpret a decoded `final_result` value.
    ///
    /// Accepts an object, or a string holding a serialized object. Anything else
    /// is `MalformedPayload`; the dispatcher records that as an empty scan
    /// ("Verified" placeholder), not as a failed one.
    pub fn from_payload(payload: Value) -> Result<Self, ScoutError> {
        let payload = match payload {
            Value::String(s) => serde_json::from_str::<Value>(&s)
                .map_err(|_| ScoutError::MalformedPayload(preview(&s)))?,
            other => other,
        };

        let mut obj = match payload {
            Value::Object(obj) => obj,
            other => return Err(ScoutError::MalformedPayload(preview(&other.to_string()))),
        };

        let scan_status = obj
            .get("scan_status")
            .and_then(Value::as_str)
            .map(str::to_string);
        let operational_status = obj
            .get("operational_status")
            .and_then(Value::as_str)
            .map(OperationalStatus::parse)
            .unwrap_or_default();
        let signals = match obj.remove("signals") {
            Some(Value::Array(items)) => {
                Some(items.into_iter().filter_map(Signal::from_value).collect())
            }
            _ => None,
        };

        Ok(Self {
            scan_status,
            operational_status,
            signals,
        })
    }

    /// True when there is at least one signal to display.
    pub fn has_signals(&self) -> bool {
        self.signals.as_ref().is_some_and(|s| !s.is_empty())
    }
}

fn preview(s: &str) -> String {
    const MAX: usize = 80;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(MAX).collect();
        out.push_str("...");
        out
    }
}

/// What one scouting task produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoutReport {
    Findings(Findings),
    /// Short diagnostic (timeout, launch failure, missing payload, ...).
    Failed(String),
    /// Neither findings nor an error; read as "verified normal".
    Empty,
}

/// Per-source result, one per dispatched source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutOutcome {
    pub source: String,
    pub report: ScoutReport,
}

impl ScoutOutcome {
    pub fn found(source: impl Into<String>, findings: Findings) -> Self {
        Self {
            source: source.into(),
            report: ScoutReport::Findings(findings),
        }
    }

    pub fn failed(source: impl Into<String>, error: &ScoutError) -> Self {
        Self {
            source: source.into(),
            report: ScoutReport::Failed(error.to_string()),
        }
    }

    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            report: ScoutReport::Empty,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.report {
            ScoutReport::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn findings(&self) -> Option<&Findings> {
        match &self.report {
            ScoutReport::Findings(f) => Some(f),
            _ => None,
        }
    }
}

/// Human-facing projection of a signal, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySignal {
    pub source: String,
    pub signal: String,
    pub date: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Root-cause category inferred from signal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CauseTag {
    Congestion,
    Labor,
    Weather,
    Technical,
}

impl CauseTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Congestion => "CONGESTION",
            Self::Labor => "LABOR",
            Self::Weather => "WEATHER",
            Self::Technical => "TECHNICAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub delay_risk: RiskLevel,
    pub primary_cause: String,
    /// Always within `[0.0, 0.99]`.
    pub confidence: f32,
}

/// The shipment being assessed. `origin_port` and `carrier` are validated non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentContext {
    pub origin_port: String,
    pub carrier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ShipmentContext {
    pub fn new(origin_port: impl Into<String>, carrier: impl Into<String>) -> Self {
        Self {
            origin_port: origin_port.into(),
            carrier: carrier.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Final pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub shipment_context: ShipmentContext,
    pub risk_assessment: RiskAssessment,
    pub signals_detected: Vec<DisplaySignal>,
    pub recommended_action: String,
}

/// Informational payload when the context resolves to zero sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoSourcesReport {
    pub error: String,
    pub supported_origins: Vec<String>,
    pub supported_carriers: Vec<String>,
}

/// Either a completed assessment or the "no sources" report; both are normal responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Assessment {
    Completed(AssessmentResult),
    NoSources(NoSourcesReport),
}

impl Assessment {
    pub fn completed(&self) -> Option<&AssessmentResult> {
        match self {
            Self::Completed(r) => Some(r),
            Self::NoSources(_) => None,
        }
    }
}

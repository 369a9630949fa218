//! # Risk Synthesizer
//! Pure, testable logic that maps `(context, outcomes)` → `AssessmentResult`.
//! No I/O, single pass over the outcomes in input order.
//!
//! Policy: every MEDIUM/HIGH signal adds to a running score and may contribute
//! cause tags; the final score picks the risk level, and `(level, causes)`
//! picks the recommended action from a fixed table.

use crate::assessment::{
    AssessmentResult, CauseTag, Category, DisplaySignal, RiskAssessment, RiskLevel, ScoutOutcome,
    ScoutReport, Severity, ShipmentContext, Signal,
};

pub const HIGH_THRESHOLD: u32 = 50;
pub const MEDIUM_THRESHOLD: u32 = 20;

pub const BASELINE_CONFIDENCE: f32 = 0.85;
pub const MAX_CONFIDENCE: f32 = 0.99;

pub const NORMAL_CAUSE: &str = "Normal Operations";
pub const SCAN_FAILED_TEXT: &str = "Connection timed out during deep scan.";
pub const VERIFIED_TEXT: &str = "Verified: No negative operational constraints found.";
const UNDATED: &str = "Just now";
const PLACEHOLDER_DATE: &str = "Now";

/// Keyword set that tags a signal with a cause. Matched on the lowercased summary.
#[derive(Debug, Clone, Copy)]
pub struct CauseRule {
    pub keywords: &'static [&'static str],
    pub tag: CauseTag,
}

pub const CAUSE_RULES: &[CauseRule] = &[
    CauseRule {
        keywords: &["congestion", "anchor", "dweel"],
        tag: CauseTag::Congestion,
    },
    CauseRule {
        keywords: &["strike", "labor", "union"],
        tag: CauseTag::Labor,
    },
    CauseRule {
        keywords: &["weather", "storm", "fog", "wind"],
        tag: CauseTag::Weather,
    },
    CauseRule {
        keywords: &["maintenance", "outage"],
        tag: CauseTag::Technical,
    },
];

/// One row of the recommendation table; `requires: None` matches any cause set.
#[derive(Debug, Clone, Copy)]
pub struct Recommendation {
    pub risk: RiskLevel,
    pub requires: Option<CauseTag>,
    pub action: &'static str,
}

/// First matching row wins.
pub const RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        risk: RiskLevel::High,
        requires: Some(CauseTag::Labor),
        action: "CRITICAL: Divert cargo immediately. Labor action confirmed.",
    },
    Recommendation {
        risk: RiskLevel::High,
        requires: Some(CauseTag::Weather),
        action: "Schedule slide inevitable. Notify customers of delay.",
    },
    Recommendation {
        risk: RiskLevel::High,
        requires: None,
        action: "High risk detected. Contact carrier representative.",
    },
    Recommendation {
        risk: RiskLevel::Medium,
        requires: Some(CauseTag::Congestion),
        action: "Anticipate 2-4 day berthing delay. Monitor vessel position.",
    },
    Recommendation {
        risk: RiskLevel::Medium,
        requires: None,
        action: "Monitor closely. Minor disruptions reported.",
    },
    Recommendation {
        risk: RiskLevel::Low,
        requires: None,
        action: "Network operating normally. Continue standard monitoring.",
    },
];

/// Insertion-ordered set of cause tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CauseSet(Vec<CauseTag>);

impl CauseSet {
    pub fn insert(&mut self, tag: CauseTag) {
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
    }

    pub fn contains(&self, tag: CauseTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tags(&self) -> &[CauseTag] {
        &self.0
    }

    /// `"A + B"`, or `"Normal Operations"` when empty.
    pub fn describe(&self) -> String {
        if self.0.is_empty() {
            return NORMAL_CAUSE.to_string();
        }
        self.0
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

pub fn severity_weight(severity: Severity) -> u32 {
    match severity {
        Severity::High => 50,
        Severity::Medium => 20,
        Severity::Low => 0,
    }
}

pub fn risk_level(score: u32) -> RiskLevel {
    if score >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Add every rule whose keywords occur in `summary`.
pub fn infer_causes(summary: &str, causes: &mut CauseSet) {
    let text = summary.to_lowercase();
    for rule in CAUSE_RULES {
        if rule.keywords.iter().any(|k| text.contains(k)) {
            causes.insert(rule.tag);
        }
    }
}

pub fn recommend(level: RiskLevel, causes: &CauseSet) -> &'static str {
    RECOMMENDATIONS
        .iter()
        .find(|r| r.risk == level && r.requires.map_or(true, |t| causes.contains(t)))
        .map(|r| r.action)
        .unwrap_or(RECOMMENDATIONS[RECOMMENDATIONS.len() - 1].action)
}

pub fn format_signal(signal: &Signal) -> String {
    match signal.category {
        Category::Metric => format!("[METRIC] {}", signal.summary),
        Category::Quote => format!("\"{}\"", signal.summary),
        Category::Status => signal.summary.clone(),
    }
}

/// Sum of severity weights across all sources and signals.
pub fn risk_score(outcomes: &[ScoutOutcome]) -> u32 {
    outcomes
        .iter()
        .filter_map(ScoutOutcome::findings)
        .filter_map(|f| f.signals.as_ref())
        .flatten()
        .map(|s| severity_weight(s.severity))
        .sum()
}

pub fn synthesize(context: &ShipmentContext, outcomes: &[ScoutOutcome]) -> AssessmentResult {
    let mut score: u32 = 0;
    let mut causes = CauseSet::default();
    let mut signals = Vec::new();

    for outcome in outcomes {
        match &outcome.report {
            ScoutReport::Findings(f) if f.has_signals() => {
                for s in f.signals.iter().flatten() {
                    signals.push(DisplaySignal {
                        source: outcome.source.clone(),
                        signal: format_signal(s),
                        date: s.date.clone().unwrap_or_else(|| UNDATED.to_string()),
                        severity: s.severity,
                    });
                    score += severity_weight(s.severity);
                    if s.severity != Severity::Low {
                        infer_causes(&s.summary, &mut causes);
                    }
                }
            }
            ScoutReport::Failed(_) => signals.push(placeholder(&outcome.source, SCAN_FAILED_TEXT)),
            ScoutReport::Findings(_) | ScoutReport::Empty => {
                signals.push(placeholder(&outcome.source, VERIFIED_TEXT))
            }
        }
    }

    let level = risk_level(score);
    AssessmentResult {
        shipment_context: context.clone(),
        risk_assessment: RiskAssessment {
            delay_risk: level,
            primary_cause: causes.describe(),
            confidence: BASELINE_CONFIDENCE.min(MAX_CONFIDENCE),
        },
        signals_detected: signals,
        recommended_action: recommend(level, &causes).to_string(),
    }
}

fn placeholder(source: &str, text: &str) -> DisplaySignal {
    DisplaySignal {
        source: source.to_string(),
        signal: text.to_string(),
        date: PLACEHOLDER_DATE.to_string(),
        severity: Severity::Low,
    }
}

//! history.rs: bounded log of completed assessments for `/debug/history`.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

use crate::assessment::{AssessmentResult, RiskLevel};

pub const MAX_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub origin_port: String,
    pub carrier: String,
    pub delay_risk: RiskLevel,
    pub primary_cause: String,
    pub sources: usize,
}

impl HistoryEntry {
    fn from_result(r: &AssessmentResult, sources: usize) -> Self {
        Self {
            ts_unix: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
            origin_port: r.shipment_context.origin_port.clone(),
            carrier: r.shipment_context.carrier.clone(),
            delay_risk: r.risk_assessment.delay_risk,
            primary_cause: r.risk_assessment.primary_cause.clone(),
            sources,
        }
    }
}

/// Oldest entries fall off the front once `cap` is reached.
#[derive(Debug)]
pub struct History {
    entries: Mutex<VecDeque<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn push(&self, r: &AssessmentResult, sources: usize) {
        let entry = HistoryEntry::from_result(r, sources);
        let mut q = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if q.len() == self.cap {
            q.pop_front();
        }
        q.push_back(entry);
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let q = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        q.iter().skip(q.len().saturating_sub(n)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{RiskAssessment, ShipmentContext};

    fn result(port: &str, risk: RiskLevel) -> AssessmentResult {
        AssessmentResult {
            shipment_context: ShipmentContext::new(port, "Maersk"),
            risk_assessment: RiskAssessment {
                delay_risk: risk,
                primary_cause: "Normal Operations".into(),
                confidence: 0.85,
            },
            signals_detected: Vec::new(),
            recommended_action: String::new(),
        }
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let h = History::with_capacity(2);
        for port in ["A", "B", "C"] {
            h.push(&result(port, RiskLevel::Low), 1);
        }
        let ports: Vec<_> = h
            .snapshot_last_n(10)
            .into_iter()
            .map(|r| r.origin_port)
            .collect();
        assert_eq!(ports, vec!["B", "C"]);
    }

    #[test]
    fn snapshot_is_bounded_by_n() {
        let h = History::with_capacity(10);
        h.push(&result("A", RiskLevel::Low), 3);
        h.push(&result("B", RiskLevel::High), 2);
        let rows = h.snapshot_last_n(1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].origin_port, "B");
        assert_eq!(rows[0].delay_risk, RiskLevel::High);
        assert_eq!(rows[0].sources, 2);
        assert!(rows[0].ts_unix > 0);
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(History::with_capacity(0).capacity(), 1);
        assert_eq!(History::with_capacity(50_000).capacity(), MAX_CAPACITY);
    }
}

//! # Assessment Engine
//! resolve → dispatch → synthesize.
//!
//! Only validation failures and internal faults come back as `Err`; a context
//! without sources is a normal `Assessment::NoSources` answer.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::info;

use crate::assessment::{Assessment, NoSourcesReport, ShipmentContext};
use crate::dispatch::ScoutDispatcher;
use crate::error::AssessError;
use crate::history::History;
use crate::metrics::ensure_metrics_described;
use crate::registry::SourceRegistry;
use crate::synth;

pub const MISSING_FIELDS_MSG: &str = "Missing required fields: origin_port, carrier";
pub const NO_SOURCES_MSG: &str = "No intelligent sources found for this context.";

pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

pub struct Assessor {
    registry: Arc<SourceRegistry>,
    dispatcher: ScoutDispatcher,
    history: Arc<History>,
}

impl Assessor {
    pub fn new(registry: Arc<SourceRegistry>, dispatcher: ScoutDispatcher) -> Self {
        Self {
            registry,
            dispatcher,
            history: Arc::new(History::with_capacity(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    pub fn with_history(mut self, history: Arc<History>) -> Self {
        self.history = history;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Completed assessments, oldest first.
    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn no_sources_report(&self) -> NoSourcesReport {
        NoSourcesReport {
            error: NO_SOURCES_MSG.to_string(),
            supported_origins: self.registry.supported_origins(),
            supported_carriers: self.registry.supported_carriers(),
        }
    }

    pub async fn assess(&self, context: &ShipmentContext) -> Result<Assessment, AssessError> {
        ensure_metrics_described();
        validate(context)?;
        let t0 = Instant::now();

        let sources = self.registry.resolve(&context.origin_port, &context.carrier);
        if sources.is_empty() {
            counter!("assessments_no_sources_total").increment(1);
            info!(
                target: "engine",
                origin_port = %context.origin_port,
                carrier = %context.carrier,
                "no sources for context"
            );
            return Ok(Assessment::NoSources(self.no_sources_report()));
        }

        info!(
            target: "engine",
            scouts = sources.len(),
            origin_port = %context.origin_port,
            carrier = %context.carrier,
            "launching scouts"
        );
        let outcomes = self.dispatcher.dispatch_all(&sources).await;
        if outcomes.len() != sources.len() {
            return Err(AssessError::Internal(format!(
                "dispatcher returned {} outcomes for {} sources",
                outcomes.len(),
                sources.len()
            )));
        }

        let result = synth::synthesize(context, &outcomes);
        let level = result.risk_assessment.delay_risk;

        self.history.push(&result, sources.len());
        counter!("assessments_total", "delay_risk" => level.as_str()).increment(1);
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("assessment_duration_ms").record(ms);
        info!(
            target: "engine",
            delay_risk = level.as_str(),
            score = synth::risk_score(&outcomes),
            primary_cause = %result.risk_assessment.primary_cause,
            elapsed_ms = ms as u64,
            "assessment complete"
        );

        Ok(Assessment::Completed(result))
    }
}

/// `origin_port` and `carrier` must be present and non-blank.
pub fn validate(context: &ShipmentContext) -> Result<(), AssessError> {
    if context.origin_port.trim().is_empty() || context.carrier.trim().is_empty() {
        return Err(AssessError::Validation(MISSING_FIELDS_MSG.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scout::FixtureScout;

    fn assessor(scout: Arc<FixtureScout>) -> Assessor {
        Assessor::new(
            Arc::new(SourceRegistry::default_seed()),
            ScoutDispatcher::new(scout),
        )
    }

    #[tokio::test]
    async fn blank_fields_fail_validation_without_dispatch() {
        let scout = Arc::new(FixtureScout::all_clear());
        let a = assessor(scout.clone());
        let err = a
            .assess(&ShipmentContext::new("  ", "Maersk"))
            .await
            .unwrap_err();
        assert_eq!(err, AssessError::Validation(MISSING_FIELDS_MSG.into()));
        assert_eq!(scout.launches(), 0);
    }

    #[tokio::test]
    async fn all_clear_context_is_low_risk() {
        let scout = Arc::new(FixtureScout::all_clear());
        let a = assessor(scout.clone());
        let out = a
            .assess(&ShipmentContext::new("Shanghai", "MSC").with_mode("Sea"))
            .await
            .unwrap();
        let r = out.completed().expect("completed assessment");
        assert_eq!(scout.launches(), 2);
        assert_eq!(r.signals_detected.len(), 2);
        assert_eq!(r.risk_assessment.primary_cause, "Normal Operations");
        assert_eq!(r.shipment_context.mode.as_deref(), Some("Sea"));

        let rows = a.history().snapshot_last_n(5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sources, 2);
    }

    #[tokio::test]
    async fn unknown_context_lists_supported_keys() {
        let scout = Arc::new(FixtureScout::all_clear());
        let a = assessor(scout.clone());
        let out = a
            .assess(&ShipmentContext::new("Port of Atlantis", "Nautilus"))
            .await
            .unwrap();
        match out {
            Assessment::NoSources(r) => {
                assert_eq!(r.error, NO_SOURCES_MSG);
                assert!(r.supported_origins.contains(&"Port of Los Angeles".to_string()));
                assert!(r.supported_carriers.contains(&"Maersk".to_string()));
            }
            Assessment::Completed(_) => panic!("expected no-sources report"),
        }
        assert_eq!(scout.launches(), 0);
        assert!(a.history().snapshot_last_n(5).is_empty());
    }
}

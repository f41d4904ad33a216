use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::{
    config::PlannerConfig,
    error::{PlannerError, Result},
    pipeline::{interpret, Enricher},
    services::{prompts, GenerationSource},
    types::{Trip, TripRequest},
};

/// Runs one generation or refinement round from prompt to enriched trip.
#[derive(Debug, Clone)]
pub struct TripPlanner {
    source: Arc<dyn GenerationSource>,
    enricher: Enricher,
    timeout: Duration,
}

impl TripPlanner {
    pub fn new(source: Arc<dyn GenerationSource>, enricher: Enricher) -> Self {
        Self {
            source,
            enricher,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let source = Arc::new(config.generator()?);
        Ok(Self::new(source, config.enricher()).with_timeout(config.generation_timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Generate a new trip. Fails only when the generation source fails.
    pub async fn generate(&self, request: &TripRequest) -> Result<Trip> {
        info!(
            target: "trip_planner::generate",
            destination = %request.destination,
            days = request.days,
            "generating trip"
        );
        let raw = self
            .call_source(prompts::generation_messages(request))
            .await?;
        let (trip, _) = interpret(&raw, request.destination_hint());
        Ok(self.enricher.enrich(trip, request).await)
    }

    /// Replace `current` with a revision following `feedback`.
    ///
    /// The generator is told to keep the four structural fields; when it drops
    /// one anyway the default is substituted and a warning names the field.
    pub async fn refine(
        &self,
        current: &Trip,
        feedback: &str,
        request: &TripRequest,
    ) -> Result<Trip> {
        info!(target: "trip_planner::generate", feedback = %feedback, "refining trip");
        let raw = self
            .call_source(prompts::refinement_messages(current, feedback, request))
            .await?;

        let destination = current
            .destination
            .as_deref()
            .or_else(|| request.destination_hint());
        let (trip, report) = interpret(&raw, destination);
        if let Some(report) = report.filter(|report| !report.defaulted.is_empty()) {
            warn!(
                target: "trip_planner::generate",
                dropped = ?report.defaulted,
                "refinement dropped structural fields"
            );
        }

        Ok(self.enricher.enrich(trip, request).await)
    }

    async fn call_source(&self, messages: Vec<Value>) -> Result<String> {
        let outcome = timeout(self.timeout, self.source.complete(messages))
            .await
            .map_err(|_| PlannerError::Timeout("generation call timed out".to_string()))
            .and_then(|result| result);

        outcome.map_err(|err| {
            error!(target: "trip_planner::generate", error = %err, "generation source failed");
            err
        })
    }
}

//! Place name → coordinates → current conditions, plus the lookup state the
//! presentation layer renders.
//!
//! The orchestrator is the only writer of [`LookupState`]. Readers either
//! poll [`LookupOrchestrator::state`] or hold a receiver from
//! [`LookupOrchestrator::subscribe`].
//!
//! Overlapping lookups are allowed. Each one takes a generation number when
//! it starts; a lookup that completes after a newer one has started still
//! returns its result to its caller, but leaves the shared state alone.
//! A lookup future dropped before completion puts back the state it found.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    LookupError, LookupState, WeatherSnapshot,
    provider::{ConditionsSource, Geocoder, Providers},
};

#[derive(Debug, Default)]
struct Ledger {
    generation: u64,
    last_success: Option<WeatherSnapshot>,
}

/// Restores the pre-lookup state if a lookup is dropped mid-flight.
struct InFlight<'a> {
    orch: &'a LookupOrchestrator,
    generation: u64,
    previous: Option<LookupState>,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.previous = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        let ledger = self.orch.ledger.lock();
        if ledger.generation != self.generation {
            return;
        }
        // That Loading belonged to an older lookup that will no longer publish.
        let restored = match previous {
            LookupState::Loading => ledger
                .last_success
                .clone()
                .map_or(LookupState::Idle, LookupState::Success),
            other => other,
        };
        tracing::debug!(generation = self.generation, "lookup canceled; state restored");
        self.orch.state.send_replace(restored);
    }
}

#[derive(Debug)]
pub struct LookupOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    conditions: Arc<dyn ConditionsSource>,
    default_location: String,
    /// Serializes every write to `state`.
    ledger: Mutex<Ledger>,
    state: watch::Sender<LookupState>,
}

impl LookupOrchestrator {
    pub fn new(providers: Providers, default_location: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LookupState::Idle);
        Self {
            geocoder: providers.geocoder,
            conditions: providers.conditions,
            default_location: default_location.into(),
            ledger: Mutex::new(Ledger::default()),
            state,
        }
    }

    pub fn state(&self) -> LookupState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.state.subscribe()
    }

    /// Most recent successful snapshot. Survives later failures.
    pub fn last_success(&self) -> Option<WeatherSnapshot> {
        self.ledger.lock().last_success.clone()
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// Startup lookup of the configured default place.
    pub async fn load_default(&self) -> Result<WeatherSnapshot, LookupError> {
        let place = self.default_location.clone();
        self.lookup(&place).await
    }

    /// Resolve `place_name`, fetch its conditions and publish the outcome.
    ///
    /// Blank input is rejected without any request or state change.
    pub async fn lookup(&self, place_name: &str) -> Result<WeatherSnapshot, LookupError> {
        let query = place_name.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let mut guard = {
            let mut ledger = self.ledger.lock();
            ledger.generation += 1;
            InFlight {
                orch: self,
                generation: ledger.generation,
                previous: Some(self.state.send_replace(LookupState::Loading)),
            }
        };
        let generation = guard.generation;

        let result = self.run(query).await;
        guard.disarm();

        let mut ledger = self.ledger.lock();
        if ledger.generation != generation {
            tracing::debug!(query, generation, latest = ledger.generation, "superseded lookup; state left unchanged");
            return result;
        }

        match &result {
            Ok(snapshot) => {
                tracing::info!(
                    location = %snapshot.location,
                    country = %snapshot.country,
                    condition = snapshot.condition.as_str(),
                    "lookup complete"
                );
                ledger.last_success = Some(snapshot.clone());
                self.state.send_replace(LookupState::Success(snapshot.clone()));
            }
            Err(e) => {
                tracing::warn!(query, error = %e.diagnostic(), "lookup failed");
                self.state.send_replace(LookupState::Failure(e.to_string()));
            }
        }

        result
    }

    /// Look up the place from the last successful lookup again.
    pub async fn retry_last(&self) -> Result<WeatherSnapshot, LookupError> {
        let place = self
            .ledger
            .lock()
            .last_success
            .as_ref()
            .map(|s| s.location.clone())
            .ok_or(LookupError::NoPriorLookup)?;

        self.lookup(&place).await
    }

    async fn run(&self, query: &str) -> Result<WeatherSnapshot, LookupError> {
        let place = self.geocoder.resolve(query).await?;
        let snapshot = self
            .conditions
            .fetch_conditions(place.latitude, place.longitude)
            .await?;

        Ok(snapshot.with_place(&place))
    }
}

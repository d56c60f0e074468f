use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use settings::{
    DependencyRegistrar, FixupMode, GlobalSettingKind, GlobalSettings, SettingKind, SettingValue, SettingsContext,
    SettingsContextError, SettingsSnapshot,
};
use subsurface::geometry::{BoundingBox3, ValueRange};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::data::{FetchError, ProviderData, ProviderType};
use crate::state::DataProviderState;

/// The per-type behavior of a provider: which settings it has, how they
/// depend on each other, when they are valid, and how to fetch.
pub trait ProviderBehavior: Send {
    fn provider_type(&self) -> ProviderType;

    /// The settings this provider owns, in display order.
    fn settings(&self) -> Vec<(SettingKind, FixupMode)>;

    /// One-time declarative dependency registration.
    fn define_dependencies(&self, registrar: &mut DependencyRegistrar) -> Result<(), SettingsContextError>;

    /// The settings whose values key the fetch. Anything else is cosmetic
    /// and never causes a refetch.
    fn fetch_relevant_settings(&self) -> &'static [SettingKind];

    /// Global settings that key the fetch in addition to the local ones.
    fn fetch_relevant_globals(&self) -> &'static [GlobalSettingKind] {
        &[]
    }

    fn are_current_settings_valid(&self, snapshot: &SettingsSnapshot) -> bool {
        snapshot.is_complete(self.fetch_relevant_settings())
    }

    /// Structural equality over the fetch-relevant part of two snapshots.
    fn requires_refetch(&self, previous: &SettingsSnapshot, current: &SettingsSnapshot) -> bool {
        previous.restricted(self.fetch_relevant_settings()) != current.restricted(self.fetch_relevant_settings())
    }

    fn fetch(
        &self,
        snapshot: &SettingsSnapshot,
        globals: &GlobalSettings,
        cancellation: CancellationToken,
    ) -> BoxFuture<'static, Result<ProviderData, FetchError>>;
}

struct InFlightFetch {
    key: String,
    cancellation: CancellationToken,
}

struct FetchOutcome {
    key: String,
    result: Result<ProviderData, FetchError>,
}

/// A self-contained visualization data source.
pub struct DataProvider {
    id: Uuid,
    name: String,
    behavior: Box<dyn ProviderBehavior>,
    context: SettingsContext,
    state: DataProviderState,
    data: Option<ProviderData>,
    error: Option<(DateTime<Utc>, String)>,
    attempted_key: Option<String>,
    in_flight: Option<InFlightFetch>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    fetch_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    buffered_outcomes: Vec<FetchOutcome>,
    cancellation: CancellationToken,
}

impl DataProvider {
    pub fn new(
        name: impl Into<String>,
        behavior: Box<dyn ProviderBehavior>,
        globals: GlobalSettings,
    ) -> Result<Self, SettingsContextError> {
        let cancellation = CancellationToken::new();

        let mut registrar = DependencyRegistrar::new(behavior.settings());
        behavior.define_dependencies(&mut registrar)?;
        let context = registrar.finish(globals, &cancellation)?;

        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            behavior,
            context,
            state: DataProviderState::SettingsInvalid,
            data: None,
            error: None,
            attempted_key: None,
            in_flight: None,
            fetch_tx,
            fetch_rx,
            buffered_outcomes: vec![],
            cancellation,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider_type(&self) -> ProviderType {
        self.behavior.provider_type()
    }

    pub fn state(&self) -> DataProviderState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == DataProviderState::Fetching
    }

    pub fn data(&self) -> Option<&ProviderData> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&(DateTime<Utc>, String)> {
        self.error.as_ref()
    }

    /// Bounding box of the last successful fetch.
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        self.data
            .as_ref()
            .and_then(ProviderData::bounding_box)
    }

    /// Value range of the last successful fetch.
    pub fn value_range(&self) -> Option<ValueRange> {
        self.data
            .as_ref()
            .and_then(ProviderData::value_range)
    }

    pub fn context(&self) -> &SettingsContext {
        &self.context
    }

    pub fn set_setting_value(
        &mut self,
        kind: SettingKind,
        value: Option<SettingValue>,
    ) -> Result<(), SettingsContextError> {
        self.context.set_setting_value(kind, value)
    }

    pub fn set_global_settings(&mut self, globals: GlobalSettings) {
        self.context.set_global_settings(globals);
    }

    /// Whether a settings change between two snapshots invalidates fetched
    /// data, i.e. whether any fetch-relevant value differs structurally.
    pub fn settings_change_requires_refetch(&self, previous: &SettingsSnapshot, current: &SettingsSnapshot) -> bool {
        self.behavior
            .requires_refetch(previous, current)
    }

    /// One synchronous turn: evaluate the settings context, apply resolved
    /// fetch outcomes, and update the state machine accordingly.
    ///
    /// Returns true when externally visible state (state/data/error) changed.
    pub fn step(&mut self) -> bool {
        self.context.evaluate();
        let mut changed = self.apply_fetch_outcomes();
        changed |= self.sync_state();
        changed
    }

    /// Start a fetch when the state machine asks for one.
    pub fn ensure_fetch(&mut self) -> bool {
        if self.state != DataProviderState::SettingsValidNotFetched {
            return false;
        }

        let snapshot = self.context.snapshot();
        let key = self.current_fetch_key(&snapshot);

        let cancellation = self.cancellation.child_token();
        let future = self
            .behavior
            .fetch(&snapshot, self.context.global_settings(), cancellation.clone());

        debug!("Fetching provider data. provider: {}", self.name);

        let tx = self.fetch_tx.clone();
        let task_key = key.clone();
        let task_token = cancellation.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = task_token.cancelled() => return,
                result = future => result,
            };
            // A send failure just means the provider is gone.
            let _ = tx.send(FetchOutcome {
                key: task_key,
                result,
            });
        });

        self.in_flight = Some(InFlightFetch {
            key,
            cancellation,
        });
        self.state = DataProviderState::Fetching;
        true
    }

    /// Await the next helper resolution or fetch outcome.
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.context.helper_resolved() => {}
            outcome = self.fetch_rx.recv() => {
                if let Some(outcome) = outcome {
                    self.buffered_outcomes.push(outcome);
                }
            }
        }
    }

    /// Drive the provider until it settles in `Ready`, `Error` or
    /// `SettingsInvalid` with nothing in flight.
    pub async fn refresh(&mut self) -> bool {
        let mut changed = self.step();
        changed |= self.ensure_fetch();

        while self.is_busy() {
            self.wait().await;
            changed |= self.step();
            changed |= self.ensure_fetch();
        }

        changed
    }

    fn is_busy(&self) -> bool {
        self.context.has_pending_helpers() || self.in_flight.is_some()
    }

    fn current_fetch_key(&self, snapshot: &SettingsSnapshot) -> String {
        let mut key = snapshot
            .restricted(self.behavior.fetch_relevant_settings())
            .key();

        let globals = self.context.global_settings();
        for kind in self.behavior.fetch_relevant_globals() {
            let part = match kind {
                GlobalSettingKind::FieldIdentifier => serde_json::to_string(&globals.field),
                GlobalSettingKind::EnsembleSet => serde_json::to_string(&globals.ensembles),
                GlobalSettingKind::RealizationFilter => serde_json::to_string(&globals.realization_filter),
            }
            .expect("global settings serialize to JSON");
            key.push('|');
            key.push_str(part.as_str());
        }

        key
    }

    fn apply_fetch_outcomes(&mut self) -> bool {
        let mut outcomes = std::mem::take(&mut self.buffered_outcomes);
        while let Ok(outcome) = self.fetch_rx.try_recv() {
            outcomes.push(outcome);
        }

        let mut changed = false;
        for outcome in outcomes {
            let is_current = self
                .in_flight
                .as_ref()
                .map(|fetch| fetch.key == outcome.key)
                .unwrap_or(false);
            if !is_current {
                trace!("Discarding superseded fetch result. provider: {}", self.name);
                continue;
            }

            self.in_flight = None;
            self.attempted_key = Some(outcome.key);

            match outcome.result {
                Ok(data) => {
                    debug!("Provider data fetched. provider: {}", self.name);
                    self.data = Some(data);
                    self.error = None;
                    self.state = DataProviderState::Ready;
                }
                Err(error) => {
                    warn!("Provider fetch failed. provider: {}, cause: {}", self.name, error);
                    self.error = Some((Utc::now(), error.to_string()));
                    self.state = DataProviderState::Error;
                }
            }
            changed = true;
        }
        changed
    }

    fn sync_state(&mut self) -> bool {
        let previous_state = self.state;

        let snapshot = self.context.snapshot();
        let valid = self
            .behavior
            .are_current_settings_valid(&snapshot)
            && !self.context.any_helper_failed();

        if !valid {
            if let Some(fetch) = self.in_flight.take() {
                trace!(
                    "Cancelling in-flight fetch, settings no longer valid. provider: {}",
                    self.name
                );
                fetch.cancellation.cancel();
            }
            self.state = DataProviderState::SettingsInvalid;
            return self.state != previous_state;
        }

        let current_key = self.current_fetch_key(&snapshot);

        match &self.in_flight {
            Some(fetch) if fetch.key == current_key => {
                self.state = DataProviderState::Fetching;
            }
            _ => {
                // A fetch for a different key is superseded by the settings
                // change; its eventual result will be discarded by key.
                if let Some(fetch) = self.in_flight.take() {
                    trace!("Superseding in-flight fetch. provider: {}", self.name);
                    fetch.cancellation.cancel();
                }

                if self.attempted_key.as_deref() == Some(current_key.as_str()) {
                    self.state = if self.error.is_some() {
                        DataProviderState::Error
                    } else {
                        DataProviderState::Ready
                    };
                } else {
                    self.state = DataProviderState::SettingsValidNotFetched;
                }
            }
        }

        self.state != previous_state
    }
}

impl Drop for DataProvider {
    fn drop(&mut self) {
        // Cancels the in-flight fetch and, through the context's child
        // token, every in-flight helper computation.
        self.cancellation.cancel();
    }
}

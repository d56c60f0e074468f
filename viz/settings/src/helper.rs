use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use subsurface::ensemble::{EnsembleSummary, RealizationFilter};
use tokio_util::sync::CancellationToken;

use crate::error::HelperError;
use crate::kinds::{DependencyNode, GlobalSettingKind, HelperKind, SettingKind, StoredDataKind};
use crate::stored::StoredValue;
use crate::value::SettingValue;

pub type HelperFuture = BoxFuture<'static, Result<StoredValue, HelperError>>;
pub(crate) type HelperComputeFn = Arc<dyn Fn(HelperInputs, CancellationToken) -> HelperFuture + Send + Sync>;

/// The committed values of a helper dependency's declared reads, captured at
/// spawn time.
///
/// The serialized form is the helper's input key: a computation is memoized
/// per key, and a key change supersedes whatever is still in flight.
#[derive(Debug, serde::Serialize, Clone, Default)]
pub struct HelperInputs {
    locals: IndexMap<SettingKind, Option<SettingValue>>,
    globals: IndexMap<GlobalSettingKind, GlobalInput>,
    stored: IndexMap<StoredDataKind, Option<StoredValue>>,
    helpers: IndexMap<HelperKind, Option<StoredValue>>,
}

#[derive(Debug, serde::Serialize, Clone)]
pub(crate) enum GlobalInput {
    Field(Option<String>),
    Ensembles(Vec<EnsembleSummary>),
    RealizationFilter(RealizationFilter),
}

impl HelperInputs {
    pub(crate) fn insert_local(&mut self, kind: SettingKind, value: Option<SettingValue>) {
        self.locals.insert(kind, value);
    }

    pub(crate) fn insert_global(&mut self, kind: GlobalSettingKind, value: GlobalInput) {
        self.globals.insert(kind, value);
    }

    pub(crate) fn insert_stored(&mut self, kind: StoredDataKind, value: Option<StoredValue>) {
        self.stored.insert(kind, value);
    }

    pub(crate) fn insert_helper(&mut self, kind: HelperKind, value: Option<StoredValue>) {
        self.helpers.insert(kind, value);
    }

    pub fn local(&self, kind: SettingKind) -> Option<&SettingValue> {
        self.locals
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn field(&self) -> Option<&str> {
        match self.globals.get(&GlobalSettingKind::FieldIdentifier) {
            Some(GlobalInput::Field(field)) => field.as_deref(),
            _ => None,
        }
    }

    pub fn ensembles(&self) -> &[EnsembleSummary] {
        match self.globals.get(&GlobalSettingKind::EnsembleSet) {
            Some(GlobalInput::Ensembles(ensembles)) => ensembles.as_slice(),
            _ => &[],
        }
    }

    pub fn realization_filter(&self) -> &RealizationFilter {
        match self.globals.get(&GlobalSettingKind::RealizationFilter) {
            Some(GlobalInput::RealizationFilter(filter)) => filter,
            _ => &RealizationFilter::All,
        }
    }

    pub fn stored(&self, kind: StoredDataKind) -> Option<&StoredValue> {
        self.stored
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn helper(&self, kind: HelperKind) -> Option<&StoredValue> {
        self.helpers
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn key(&self) -> String {
        serde_json::to_string(self).expect("helper inputs serialize to JSON")
    }
}

/// Bookkeeping for one registered helper dependency.
///
/// The committed value itself lives with the rest of the committed context
/// state; this tracks the computation lifecycle only.
pub(crate) struct HelperTask {
    pub(crate) reads: Vec<DependencyNode>,
    pub(crate) compute: HelperComputeFn,
    pub(crate) committed_key: Option<String>,
    pub(crate) in_flight_key: Option<String>,
    pub(crate) in_flight_token: Option<CancellationToken>,
    pub(crate) failed: bool,
}

impl HelperTask {
    pub(crate) fn new(reads: Vec<DependencyNode>, compute: HelperComputeFn) -> Self {
        Self {
            reads,
            compute,
            committed_key: None,
            in_flight_key: None,
            in_flight_token: None,
            failed: false,
        }
    }

    /// The key the helper currently represents: the in-flight computation if
    /// any, otherwise the last committed one.
    pub(crate) fn current_key(&self) -> Option<&str> {
        self.in_flight_key
            .as_deref()
            .or(self.committed_key.as_deref())
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.in_flight_key.is_some()
    }
}

pub(crate) struct HelperResultMessage {
    pub(crate) kind: HelperKind,
    pub(crate) key: String,
    pub(crate) result: Result<StoredValue, HelperError>,
}

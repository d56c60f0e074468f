use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use subsurface::ensemble::{EnsembleSummary, RealizationFilter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::error::{SettingsContextError, UpdaterError};
use crate::global::GlobalSettings;
use crate::helper::{GlobalInput, HelperComputeFn, HelperFuture, HelperInputs, HelperResultMessage, HelperTask};
use crate::kinds::{DependencyNode, GlobalSettingKind, HelperKind, SettingKind, StoredDataKind};
use crate::snapshot::SettingsSnapshot;
use crate::stored::StoredValue;
use crate::value::{FixupMode, Setting, SettingValue};

type AvailableValuesFn = Box<dyn Fn(&ReaderContext<'_>) -> Result<Vec<SettingValue>, UpdaterError> + Send>;
type StoredDataFn = Box<dyn Fn(&ReaderContext<'_>) -> Option<StoredValue> + Send>;

/// Committed values only. Readers observe this, never in-flight state.
struct CommittedState {
    settings: IndexMap<SettingKind, Setting>,
    stored: HashMap<StoredDataKind, Option<StoredValue>>,
    helper_values: HashMap<HelperKind, Option<StoredValue>>,
    globals: GlobalSettings,
    declared_inputs: HashMap<DependencyNode, Vec<DependencyNode>>,
}

/// The restricted accessor view handed to synchronous readers.
///
/// Readers must use these accessors exclusively; the declared read set is
/// what drives re-evaluation, so an undeclared read would observe values
/// without ever being re-run for them. Undeclared reads trip a debug
/// assertion.
pub struct ReaderContext<'a> {
    state: &'a CommittedState,
    target: DependencyNode,
}

impl ReaderContext<'_> {
    pub fn local_setting(&self, kind: SettingKind) -> Option<&SettingValue> {
        self.assert_declared(DependencyNode::Local(kind));
        self.state
            .settings
            .get(&kind)
            .and_then(|setting| setting.value())
    }

    pub fn global_field(&self) -> Option<&str> {
        self.assert_declared(DependencyNode::Global(GlobalSettingKind::FieldIdentifier));
        self.state.globals.field.as_deref()
    }

    pub fn global_ensembles(&self) -> &[EnsembleSummary] {
        self.assert_declared(DependencyNode::Global(GlobalSettingKind::EnsembleSet));
        self.state.globals.ensembles.as_slice()
    }

    pub fn global_realization_filter(&self) -> &RealizationFilter {
        self.assert_declared(DependencyNode::Global(GlobalSettingKind::RealizationFilter));
        &self.state.globals.realization_filter
    }

    pub fn stored_data(&self, kind: StoredDataKind) -> Option<&StoredValue> {
        self.assert_declared(DependencyNode::Stored(kind));
        self.state
            .stored
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn helper_dependency(&self, kind: HelperKind) -> Option<&StoredValue> {
        self.assert_declared(DependencyNode::Helper(kind));
        self.state
            .helper_values
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    fn assert_declared(&self, read: DependencyNode) {
        debug_assert!(
            self.state
                .declared_inputs
                .get(&self.target)
                .map(|reads| reads.contains(&read))
                .unwrap_or(false),
            "undeclared read. target: {}, read: {}",
            self.target,
            read
        );
    }
}

/// One-time declarative registration of a context's settings and readers.
pub struct DependencyRegistrar {
    settings: IndexMap<SettingKind, Setting>,
    available_updaters: HashMap<SettingKind, AvailableValuesFn>,
    stored_updaters: HashMap<StoredDataKind, StoredDataFn>,
    helpers: HashMap<HelperKind, HelperTask>,
    reads: Vec<(DependencyNode, DependencyNode)>,
}

impl DependencyRegistrar {
    pub fn new<I>(settings: I) -> Self
    where
        I: IntoIterator<Item = (SettingKind, FixupMode)>,
    {
        Self {
            settings: settings
                .into_iter()
                .map(|(kind, fixup_mode)| (kind, Setting::new(kind, fixup_mode)))
                .collect(),
            available_updaters: HashMap::new(),
            stored_updaters: HashMap::new(),
            helpers: HashMap::new(),
            reads: vec![],
        }
    }

    /// Register the available-values updater for a setting.
    pub fn available_values<F>(
        &mut self,
        kind: SettingKind,
        reads: &[DependencyNode],
        updater: F,
    ) -> Result<(), SettingsContextError>
    where
        F: Fn(&ReaderContext<'_>) -> Result<Vec<SettingValue>, UpdaterError> + Send + 'static,
    {
        let target = DependencyNode::Local(kind);
        if !self.settings.contains_key(&kind) {
            return Err(SettingsContextError::UnknownSetting(kind));
        }
        if self
            .available_updaters
            .insert(kind, Box::new(updater))
            .is_some()
        {
            return Err(SettingsContextError::DuplicateRegistration(target));
        }
        self.record_reads(target, reads);
        Ok(())
    }

    /// Register the updater for a provider-private stored-data slot.
    pub fn stored_data<F>(
        &mut self,
        kind: StoredDataKind,
        reads: &[DependencyNode],
        updater: F,
    ) -> Result<(), SettingsContextError>
    where
        F: Fn(&ReaderContext<'_>) -> Option<StoredValue> + Send + 'static,
    {
        let target = DependencyNode::Stored(kind);
        if self
            .stored_updaters
            .insert(kind, Box::new(updater))
            .is_some()
        {
            return Err(SettingsContextError::DuplicateRegistration(target));
        }
        self.record_reads(target, reads);
        Ok(())
    }

    /// Register a memoized, cancellable asynchronous helper dependency.
    pub fn helper_dependency<F>(
        &mut self,
        kind: HelperKind,
        reads: &[DependencyNode],
        compute: F,
    ) -> Result<(), SettingsContextError>
    where
        F: Fn(HelperInputs, CancellationToken) -> HelperFuture + Send + Sync + 'static,
    {
        let target = DependencyNode::Helper(kind);
        let compute: HelperComputeFn = Arc::new(compute);
        if self
            .helpers
            .insert(kind, HelperTask::new(reads.to_vec(), compute))
            .is_some()
        {
            return Err(SettingsContextError::DuplicateRegistration(target));
        }
        self.record_reads(target, reads);
        Ok(())
    }

    fn record_reads(&mut self, target: DependencyNode, reads: &[DependencyNode]) {
        for read in reads {
            self.reads.push((*read, target));
        }
    }

    /// Validate the declared graph and build the context.
    ///
    /// Cyclic registrations and reads of unregistered nodes are rejected
    /// here, before anything is evaluated.
    pub fn finish(
        self,
        globals: GlobalSettings,
        parent_cancellation: &CancellationToken,
    ) -> Result<SettingsContext, SettingsContextError> {
        for (read, target) in &self.reads {
            let known = match read {
                DependencyNode::Local(kind) => self.settings.contains_key(kind),
                DependencyNode::Stored(kind) => self.stored_updaters.contains_key(kind),
                DependencyNode::Helper(kind) => self.helpers.contains_key(kind),
                DependencyNode::Global(_) => true,
            };
            if !known {
                return Err(SettingsContextError::UnknownReadTarget {
                    target: *target,
                    read: *read,
                });
            }
        }

        let topo_order = self.sorted_nodes()?;

        let mut declared_inputs: HashMap<DependencyNode, Vec<DependencyNode>> = HashMap::new();
        for (read, target) in &self.reads {
            declared_inputs
                .entry(*target)
                .or_default()
                .push(*read);
        }

        let stored = self
            .stored_updaters
            .keys()
            .map(|kind| (*kind, None))
            .collect();
        let helper_values = self
            .helpers
            .keys()
            .map(|kind| (*kind, None))
            .collect();

        let (helper_tx, helper_rx) = mpsc::unbounded_channel();

        let dirty = topo_order.iter().copied().collect();

        Ok(SettingsContext {
            state: CommittedState {
                settings: self.settings,
                stored,
                helper_values,
                globals,
                declared_inputs,
            },
            available_updaters: self.available_updaters,
            stored_updaters: self.stored_updaters,
            helpers: self.helpers,
            topo_order,
            dirty,
            evaluated_once: HashSet::new(),
            helper_tx,
            helper_rx,
            buffered_results: vec![],
            cancellation: parent_cancellation.child_token(),
        })
    }

    fn sorted_nodes(&self) -> Result<Vec<DependencyNode>, SettingsContextError> {
        let mut graph: DiGraph<DependencyNode, ()> = DiGraph::new();
        let mut indices: HashMap<DependencyNode, NodeIndex> = HashMap::new();

        let mut ensure_node = |graph: &mut DiGraph<DependencyNode, ()>, node: DependencyNode| {
            *indices
                .entry(node)
                .or_insert_with(|| graph.add_node(node))
        };

        for kind in self.settings.keys() {
            ensure_node(&mut graph, DependencyNode::Local(*kind));
        }
        for kind in self.stored_updaters.keys() {
            ensure_node(&mut graph, DependencyNode::Stored(*kind));
        }
        for kind in self.helpers.keys() {
            ensure_node(&mut graph, DependencyNode::Helper(*kind));
        }
        for (read, target) in &self.reads {
            let read_index = ensure_node(&mut graph, *read);
            let target_index = ensure_node(&mut graph, *target);
            graph.add_edge(read_index, target_index, ());
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| SettingsContextError::CyclicDependency(graph[cycle.node_id()]))?;

        Ok(order
            .into_iter()
            .map(|index| graph[index])
            .collect())
    }
}

/// Counters for one evaluation pass, mostly useful for asserting idempotence.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EvaluationPass {
    pub nodes_evaluated: usize,
    pub helpers_spawned: usize,
    pub settings_changed: usize,
}

impl EvaluationPass {
    pub fn is_noop(&self) -> bool {
        self.nodes_evaluated == 0 && self.helpers_spawned == 0
    }
}

/// The dependency graph owner for one provider's settings.
pub struct SettingsContext {
    state: CommittedState,
    available_updaters: HashMap<SettingKind, AvailableValuesFn>,
    stored_updaters: HashMap<StoredDataKind, StoredDataFn>,
    helpers: HashMap<HelperKind, HelperTask>,
    topo_order: Vec<DependencyNode>,
    dirty: HashSet<DependencyNode>,
    evaluated_once: HashSet<DependencyNode>,
    helper_tx: mpsc::UnboundedSender<HelperResultMessage>,
    helper_rx: mpsc::UnboundedReceiver<HelperResultMessage>,
    buffered_results: Vec<HelperResultMessage>,
    cancellation: CancellationToken,
}

impl SettingsContext {
    /// Re-evaluate every reader whose transitive reads changed, in
    /// dependency order, then repair any out-of-range setting values.
    ///
    /// Safe to call more often than necessary: with nothing dirty this is a
    /// no-op and in particular spawns no helper computation.
    pub fn evaluate(&mut self) -> EvaluationPass {
        let mut pass = EvaluationPass::default();

        self.commit_helper_results();

        if self.dirty.is_empty() {
            return pass;
        }
        let mut changed = std::mem::take(&mut self.dirty);

        for node in self.topo_order.clone() {
            let inputs_changed = self
                .state
                .declared_inputs
                .get(&node)
                .map(|reads| {
                    reads
                        .iter()
                        .any(|read| changed.contains(read))
                })
                .unwrap_or(false);
            let first_run = !self.evaluated_once.contains(&node);
            self.evaluated_once.insert(node);

            match node {
                DependencyNode::Local(kind) => {
                    if self.available_updaters.contains_key(&kind) && (inputs_changed || first_run) {
                        pass.nodes_evaluated += 1;
                        if self.update_available_values(kind) {
                            changed.insert(node);
                            pass.settings_changed += 1;
                        }
                    } else if changed.contains(&node) {
                        // Externally set value; repair it against the current
                        // availability without re-running the updater.
                        if let Some(setting) = self.state.settings.get_mut(&kind) {
                            setting.fixup();
                        }
                    }
                }
                DependencyNode::Stored(kind) => {
                    if inputs_changed || first_run {
                        pass.nodes_evaluated += 1;
                        if self.update_stored_data(kind) {
                            changed.insert(node);
                        }
                    }
                }
                DependencyNode::Helper(kind) => {
                    if inputs_changed || first_run {
                        pass.helpers_spawned += self.refresh_helper(kind);
                    }
                }
                DependencyNode::Global(_) => {
                    // Source-only node; dirtied externally, nothing to run.
                }
            }
        }

        pass
    }

    /// Await the next helper resolution. The result is buffered and applied
    /// by the next `evaluate` call.
    pub async fn helper_resolved(&mut self) {
        if let Some(message) = self.helper_rx.recv().await {
            self.buffered_results.push(message);
        }
    }

    pub fn has_pending_helpers(&self) -> bool {
        !self.buffered_results.is_empty()
            || self
                .helpers
                .values()
                .any(HelperTask::is_pending)
    }

    pub fn any_helper_failed(&self) -> bool {
        self.helpers
            .values()
            .any(|helper| helper.failed)
    }

    pub fn setting(&self, kind: SettingKind) -> Option<&Setting> {
        self.state.settings.get(&kind)
    }

    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.state.settings.values()
    }

    pub fn get_stored_data(&self, kind: StoredDataKind) -> Option<&StoredValue> {
        self.state
            .stored
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn helper_value(&self, kind: HelperKind) -> Option<&StoredValue> {
        self.state
            .helper_values
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.state.globals
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::new(
            self.state
                .settings
                .iter()
                .map(|(kind, setting)| (*kind, setting.value().cloned()))
                .collect(),
        )
    }

    /// Apply a user selection. The membership invariant is restored on the
    /// next `evaluate` pass.
    pub fn set_setting_value(
        &mut self,
        kind: SettingKind,
        value: Option<SettingValue>,
    ) -> Result<(), SettingsContextError> {
        let setting = self
            .state
            .settings
            .get_mut(&kind)
            .ok_or(SettingsContextError::UnknownSetting(kind))?;

        if setting.value != value {
            setting.value = value;
            self.dirty
                .insert(DependencyNode::Local(kind));
        }
        Ok(())
    }

    /// Replace the committed copy of the global settings, dirtying only the
    /// global nodes whose value actually changed.
    pub fn set_global_settings(&mut self, globals: GlobalSettings) {
        for kind in self.state.globals.changed_kinds(&globals) {
            self.dirty
                .insert(DependencyNode::Global(kind));
        }
        self.state.globals = globals;
    }

    fn update_available_values(&mut self, kind: SettingKind) -> bool {
        let updater = self
            .available_updaters
            .get(&kind)
            .expect("updater presence checked by caller");
        let reader = ReaderContext {
            state: &self.state,
            target: DependencyNode::Local(kind),
        };
        let available = match updater(&reader) {
            Ok(values) => values,
            Err(error) => {
                warn!(
                    "Available-values updater failed, treating as empty. setting: {}, cause: {}",
                    kind, error
                );
                vec![]
            }
        };

        let setting = self
            .state
            .settings
            .get_mut(&kind)
            .expect("settings are fixed at registration");
        let available_changed = setting.available != available;
        setting.available = available;
        let value_changed = setting.fixup();

        available_changed || value_changed
    }

    fn update_stored_data(&mut self, kind: StoredDataKind) -> bool {
        let updater = self
            .stored_updaters
            .get(&kind)
            .expect("updater presence implied by graph node");
        let reader = ReaderContext {
            state: &self.state,
            target: DependencyNode::Stored(kind),
        };
        let value = updater(&reader);

        let slot = self
            .state
            .stored
            .get_mut(&kind)
            .expect("slots are fixed at registration");
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Recompute a helper's input key; on change, abort whatever was in
    /// flight for the previous key and start a computation for the new one.
    ///
    /// Returns the number of computations spawned (0 or 1).
    fn refresh_helper(&mut self, kind: HelperKind) -> usize {
        let helper = self
            .helpers
            .get_mut(&kind)
            .expect("helper presence implied by graph node");

        let mut inputs = HelperInputs::default();
        for read in &helper.reads {
            match read {
                DependencyNode::Local(setting_kind) => inputs.insert_local(
                    *setting_kind,
                    self.state
                        .settings
                        .get(setting_kind)
                        .and_then(|setting| setting.value().cloned()),
                ),
                DependencyNode::Global(global_kind) => {
                    let value = match global_kind {
                        GlobalSettingKind::FieldIdentifier => GlobalInput::Field(self.state.globals.field.clone()),
                        GlobalSettingKind::EnsembleSet => GlobalInput::Ensembles(self.state.globals.ensembles.clone()),
                        GlobalSettingKind::RealizationFilter => {
                            GlobalInput::RealizationFilter(self.state.globals.realization_filter.clone())
                        }
                    };
                    inputs.insert_global(*global_kind, value);
                }
                DependencyNode::Stored(stored_kind) => inputs.insert_stored(
                    *stored_kind,
                    self.state
                        .stored
                        .get(stored_kind)
                        .cloned()
                        .flatten(),
                ),
                DependencyNode::Helper(helper_kind) => inputs.insert_helper(
                    *helper_kind,
                    self.state
                        .helper_values
                        .get(helper_kind)
                        .cloned()
                        .flatten(),
                ),
            }
        }

        let key = inputs.key();
        if helper.current_key() == Some(key.as_str()) {
            return 0;
        }

        if let Some(token) = helper.in_flight_token.take() {
            trace!("Superseding in-flight helper computation. helper: {}", kind);
            token.cancel();
        }

        let token = self.cancellation.child_token();
        let future = (helper.compute)(inputs, token.clone());
        let tx = self.helper_tx.clone();
        let task_key = key.clone();
        let task_token = token.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = task_token.cancelled() => return,
                result = future => result,
            };
            // A send failure just means the owning context is gone.
            let _ = tx.send(HelperResultMessage {
                kind,
                key: task_key,
                result,
            });
        });

        helper.in_flight_key = Some(key);
        helper.in_flight_token = Some(token);

        1
    }

    /// Apply buffered helper resolutions. Only a resolution carrying the
    /// still-current input key is committed; anything else was superseded
    /// while in flight and is discarded.
    fn commit_helper_results(&mut self) {
        let mut messages = std::mem::take(&mut self.buffered_results);
        while let Ok(message) = self.helper_rx.try_recv() {
            messages.push(message);
        }

        for message in messages {
            let Some(helper) = self.helpers.get_mut(&message.kind) else {
                continue;
            };

            if helper.in_flight_key.as_deref() != Some(message.key.as_str()) {
                trace!(
                    "Discarding superseded helper result. helper: {}",
                    message.kind
                );
                continue;
            }

            helper.in_flight_key = None;
            helper.in_flight_token = None;
            helper.committed_key = Some(message.key);

            match message.result {
                Ok(value) => {
                    helper.failed = false;
                    let slot = self
                        .state
                        .helper_values
                        .get_mut(&message.kind)
                        .expect("helper slots are fixed at registration");
                    if slot.as_ref() != Some(&value) {
                        *slot = Some(value);
                        self.dirty
                            .insert(DependencyNode::Helper(message.kind));
                    }
                }
                Err(error) => {
                    warn!(
                        "Helper dependency failed, keeping last good value. helper: {}, cause: {}",
                        message.kind, error
                    );
                    helper.failed = true;
                }
            }
        }
    }
}

impl Drop for SettingsContext {
    fn drop(&mut self) {
        // Cancels every in-flight helper computation owned by this context.
        self.cancellation.cancel();
    }
}

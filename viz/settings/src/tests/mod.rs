use std::sync::{Arc, Mutex};

use futures::FutureExt;
use itertools::Itertools;
use subsurface::ensemble::{EnsembleIdent, EnsembleSummary, RealizationNumber};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::context::{DependencyRegistrar, SettingsContext};
use crate::error::{HelperError, SettingsContextError};
use crate::global::GlobalSettings;
use crate::helper::{HelperFuture, HelperInputs};
use crate::kinds::DependencyNode::{Global, Helper, Local, Stored};
use crate::kinds::{GlobalSettingKind, HelperKind, SettingKind, StoredDataKind};
use crate::stored::StoredValue;
use crate::value::{FixupMode, SettingValue};

mod evaluation;
mod helpers;

/// A helper computation the test resolves by hand, so that resolution order
/// and cancellation can be exercised deterministically.
pub(crate) struct ScriptedHelper {
    pending: Arc<Mutex<Vec<PendingComputation>>>,
}

pub(crate) struct PendingComputation {
    pub key: String,
    pub sender: oneshot::Sender<Result<StoredValue, HelperError>>,
    pub token: CancellationToken,
}

impl ScriptedHelper {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(vec![])),
        }
    }

    /// The compute function to register; keys pending computations by the
    /// ensemble read so tests can target them.
    pub fn compute_fn(&self) -> impl Fn(HelperInputs, CancellationToken) -> HelperFuture + Send + Sync + 'static {
        let pending = self.pending.clone();

        move |inputs, token| {
            let (sender, receiver) = oneshot::channel();
            let key = inputs
                .local(SettingKind::Ensemble)
                .map(|value| value.to_string())
                .unwrap_or_default();

            pending
                .lock()
                .unwrap()
                .push(PendingComputation {
                    key,
                    sender,
                    token,
                });

            async move {
                receiver
                    .await
                    .unwrap_or(Err(HelperError::Cancelled))
            }
            .boxed()
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn resolve(&self, key: &str, result: Result<StoredValue, HelperError>) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(index) = pending
            .iter()
            .position(|computation| computation.key == key)
        else {
            return false;
        };

        let computation = pending.remove(index);
        computation.sender.send(result).is_ok()
    }

    pub fn is_cancelled(&self, key: &str) -> bool {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .find(|computation| computation.key == key)
            .map(|computation| computation.token.is_cancelled())
            .unwrap_or(false)
    }
}

pub(crate) fn ensemble(name: &str, realizations: &[u32]) -> EnsembleSummary {
    EnsembleSummary {
        ident: EnsembleIdent::new("case", name),
        realizations: realizations
            .iter()
            .map(|realization| RealizationNumber(*realization))
            .collect(),
    }
}

pub(crate) fn globals_with(ensembles: Vec<EnsembleSummary>) -> GlobalSettings {
    GlobalSettings {
        field: Some("DROGON".to_string()),
        ensembles,
        ..Default::default()
    }
}

pub(crate) fn surface_meta(name: &str, attribute: &str) -> subsurface::surface::SurfaceMeta {
    subsurface::surface::SurfaceMeta {
        name: name.to_string(),
        attribute: attribute.to_string(),
        time: subsurface::surface::TimeOrInterval::NoTime,
    }
}

/// A context shaped like the realization-surface provider: ensemble and
/// realization resolved from globals, attribute from an async directory.
pub(crate) fn build_surface_context(
    scripted: &ScriptedHelper,
    globals: GlobalSettings,
) -> Result<SettingsContext, SettingsContextError> {
    let mut registrar = DependencyRegistrar::new([
        (SettingKind::Ensemble, FixupMode::FirstAvailable),
        (SettingKind::Realization, FixupMode::FirstAvailable),
        (SettingKind::Attribute, FixupMode::FirstAvailable),
    ]);

    registrar.available_values(SettingKind::Ensemble, &[Global(GlobalSettingKind::EnsembleSet)], |ctx| {
        Ok(ctx
            .global_ensembles()
            .iter()
            .map(|summary| SettingValue::Ensemble(summary.ident.clone()))
            .collect())
    })?;

    registrar.stored_data(
        StoredDataKind::FilteredRealizations,
        &[
            Local(SettingKind::Ensemble),
            Global(GlobalSettingKind::EnsembleSet),
            Global(GlobalSettingKind::RealizationFilter),
        ],
        |ctx| {
            let ensemble = ctx
                .local_setting(SettingKind::Ensemble)?
                .as_ensemble()?
                .clone();
            let summary = ctx
                .global_ensembles()
                .iter()
                .find(|summary| summary.ident == ensemble)?;

            Some(StoredValue::Realizations(
                ctx.global_realization_filter()
                    .apply(&summary.realizations),
            ))
        },
    )?;

    registrar.available_values(
        SettingKind::Realization,
        &[Stored(StoredDataKind::FilteredRealizations)],
        |ctx| {
            Ok(ctx
                .stored_data(StoredDataKind::FilteredRealizations)
                .and_then(StoredValue::as_realizations)
                .map(|realizations| {
                    realizations
                        .iter()
                        .map(|realization| SettingValue::Realization(*realization))
                        .collect()
                })
                .unwrap_or_default())
        },
    )?;

    registrar.helper_dependency(
        HelperKind::SurfaceDirectory,
        &[Local(SettingKind::Ensemble)],
        scripted.compute_fn(),
    )?;

    registrar.available_values(
        SettingKind::Attribute,
        &[Helper(HelperKind::SurfaceDirectory)],
        |ctx| {
            Ok(ctx
                .helper_dependency(HelperKind::SurfaceDirectory)
                .and_then(StoredValue::as_surface_directory)
                .map(|directory| {
                    directory
                        .iter()
                        .map(|meta| meta.attribute.clone())
                        .unique()
                        .map(SettingValue::Text)
                        .collect()
                })
                .unwrap_or_default())
        },
    )?;

    registrar.finish(globals, &CancellationToken::new())
}

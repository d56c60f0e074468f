use futures::future::BoxFuture;
use futures::FutureExt;
use itertools::Itertools;
use settings::DependencyNode::{Global, Helper, Local, Stored};
use settings::{
    DependencyRegistrar, FixupMode, GlobalSettingKind, GlobalSettings, HelperError, HelperKind, SettingKind,
    SettingValue, SettingsContextError, SettingsSnapshot, StoredDataKind, StoredValue,
};
use stores::{SeismicSliceAddress, StoreBundle};
use tokio_util::sync::CancellationToken;

use crate::behaviors::{color_scale_values, require_setting};
use crate::data::{FetchError, ProviderData, ProviderType};
use crate::provider::ProviderBehavior;

/// A horizontal slice through one realization's seismic cube. The available
/// slice depths derive from the cube directory's depth range.
pub struct SeismicDepthSliceBehavior {
    stores: StoreBundle,
}

impl SeismicDepthSliceBehavior {
    pub fn new(stores: StoreBundle) -> Self {
        Self {
            stores,
        }
    }
}

impl ProviderBehavior for SeismicDepthSliceBehavior {
    fn provider_type(&self) -> ProviderType {
        ProviderType::SeismicDepthSlice
    }

    fn settings(&self) -> Vec<(SettingKind, FixupMode)> {
        vec![
            (SettingKind::Ensemble, FixupMode::FirstAvailable),
            (SettingKind::Realization, FixupMode::FirstAvailable),
            (SettingKind::SeismicAttribute, FixupMode::FirstAvailable),
            (SettingKind::TimeOrInterval, FixupMode::FirstAvailable),
            (SettingKind::DepthSlice, FixupMode::FirstAvailable),
            (SettingKind::ColorScale, FixupMode::FirstAvailable),
        ]
    }

    fn define_dependencies(&self, registrar: &mut DependencyRegistrar) -> Result<(), SettingsContextError> {
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

        let seismic = self.stores.seismic.clone();
        registrar.helper_dependency(
            HelperKind::SeismicDirectory,
            &[Local(SettingKind::Ensemble)],
            move |inputs, cancellation| {
                let seismic = seismic.clone();
                async move {
                    let Some(ensemble) = inputs
                        .local(SettingKind::Ensemble)
                        .and_then(SettingValue::as_ensemble)
                        .cloned()
                    else {
                        return Ok(StoredValue::SeismicDirectory(vec![]));
                    };

                    let directory = seismic
                        .seismic_directory(&ensemble, cancellation)
                        .await
                        .map_err(|error| HelperError::Failed(error.to_string()))?;
                    Ok(StoredValue::SeismicDirectory(directory))
                }
                .boxed()
            },
        )?;

        registrar.available_values(
            SettingKind::SeismicAttribute,
            &[Helper(HelperKind::SeismicDirectory)],
            |ctx| {
                Ok(ctx
                    .helper_dependency(HelperKind::SeismicDirectory)
                    .and_then(StoredValue::as_seismic_directory)
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

        registrar.available_values(
            SettingKind::TimeOrInterval,
            &[Helper(HelperKind::SeismicDirectory), Local(SettingKind::SeismicAttribute)],
            |ctx| {
                let attribute = ctx
                    .local_setting(SettingKind::SeismicAttribute)
                    .and_then(SettingValue::as_text)
                    .map(str::to_string);

                Ok(ctx
                    .helper_dependency(HelperKind::SeismicDirectory)
                    .and_then(StoredValue::as_seismic_directory)
                    .map(|directory| {
                        directory
                            .iter()
                            .filter(|meta| Some(&meta.attribute) == attribute.as_ref())
                            .map(|meta| meta.time)
                            .unique()
                            .map(SettingValue::TimeOrInterval)
                            .collect()
                    })
                    .unwrap_or_default())
            },
        )?;

        registrar.available_values(
            SettingKind::DepthSlice,
            &[
                Helper(HelperKind::SeismicDirectory),
                Local(SettingKind::SeismicAttribute),
                Local(SettingKind::TimeOrInterval),
            ],
            |ctx| {
                let attribute = ctx
                    .local_setting(SettingKind::SeismicAttribute)
                    .and_then(SettingValue::as_text)
                    .map(str::to_string);
                let time = ctx
                    .local_setting(SettingKind::TimeOrInterval)
                    .and_then(SettingValue::as_time_or_interval);

                Ok(ctx
                    .helper_dependency(HelperKind::SeismicDirectory)
                    .and_then(StoredValue::as_seismic_directory)
                    .and_then(|directory| {
                        directory
                            .iter()
                            .find(|meta| Some(&meta.attribute) == attribute.as_ref() && Some(meta.time) == time)
                    })
                    .map(|meta| {
                        meta.slice_depths()
                            .into_iter()
                            .map(SettingValue::Number)
                            .collect()
                    })
                    .unwrap_or_default())
            },
        )?;

        registrar.available_values(SettingKind::ColorScale, &[], |_ctx| Ok(color_scale_values()))?;

        Ok(())
    }

    fn fetch_relevant_settings(&self) -> &'static [SettingKind] {
        &[
            SettingKind::Ensemble,
            SettingKind::Realization,
            SettingKind::SeismicAttribute,
            SettingKind::TimeOrInterval,
            SettingKind::DepthSlice,
        ]
    }

    fn fetch(
        &self,
        snapshot: &SettingsSnapshot,
        _globals: &GlobalSettings,
        cancellation: CancellationToken,
    ) -> BoxFuture<'static, Result<ProviderData, FetchError>> {
        let address = match build_address(snapshot) {
            Ok(address) => address,
            Err(error) => return futures::future::ready(Err(error)).boxed(),
        };

        let future = self
            .stores
            .seismic
            .depth_slice(&address, cancellation);
        async move { Ok(ProviderData::SeismicSlice(future.await?)) }.boxed()
    }
}

fn build_address(snapshot: &SettingsSnapshot) -> Result<SeismicSliceAddress, FetchError> {
    let ensemble = require_setting(snapshot, SettingKind::Ensemble)?
        .as_ensemble()
        .ok_or(FetchError::IncompleteSettings(SettingKind::Ensemble))?
        .clone();
    let realization = require_setting(snapshot, SettingKind::Realization)?
        .as_realization()
        .ok_or(FetchError::IncompleteSettings(SettingKind::Realization))?;
    let attribute = require_setting(snapshot, SettingKind::SeismicAttribute)?
        .as_text()
        .ok_or(FetchError::IncompleteSettings(SettingKind::SeismicAttribute))?
        .to_string();
    let time = require_setting(snapshot, SettingKind::TimeOrInterval)?
        .as_time_or_interval()
        .ok_or(FetchError::IncompleteSettings(SettingKind::TimeOrInterval))?;
    let depth = require_setting(snapshot, SettingKind::DepthSlice)?
        .as_number()
        .ok_or(FetchError::IncompleteSettings(SettingKind::DepthSlice))?;

    Ok(SeismicSliceAddress {
        ensemble,
        realization,
        attribute,
        time,
        depth,
    })
}

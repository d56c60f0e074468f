use futures::future::BoxFuture;
use futures::FutureExt;
use itertools::Itertools;
use settings::DependencyNode::{Global, Helper, Local, Stored};
use settings::{
    DependencyRegistrar, FixupMode, GlobalSettingKind, GlobalSettings, HelperError, HelperKind, SettingKind,
    SettingValue, SettingsContextError, SettingsSnapshot, StoredDataKind, StoredValue,
};
use stores::{StoreBundle, SurfaceAddress};
use tokio_util::sync::CancellationToken;

use crate::behaviors::{color_scale_values, require_setting};
use crate::data::{FetchError, ProviderData, ProviderType};
use crate::provider::ProviderBehavior;

/// One surface of one realization: ensemble and realization resolved from
/// the global ensemble set, the rest from the ensemble's surface directory.
pub struct RealizationSurfaceBehavior {
    stores: StoreBundle,
}

impl RealizationSurfaceBehavior {
    pub fn new(stores: StoreBundle) -> Self {
        Self {
            stores,
        }
    }
}

impl ProviderBehavior for RealizationSurfaceBehavior {
    fn provider_type(&self) -> ProviderType {
        ProviderType::RealizationSurface
    }

    fn settings(&self) -> Vec<(SettingKind, FixupMode)> {
        vec![
            (SettingKind::Ensemble, FixupMode::FirstAvailable),
            (SettingKind::Realization, FixupMode::FirstAvailable),
            (SettingKind::Attribute, FixupMode::FirstAvailable),
            (SettingKind::SurfaceName, FixupMode::FirstAvailable),
            (SettingKind::TimeOrInterval, FixupMode::FirstAvailable),
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

        let surfaces = self.stores.surfaces.clone();
        registrar.helper_dependency(
            HelperKind::SurfaceDirectory,
            &[Local(SettingKind::Ensemble)],
            move |inputs, cancellation| {
                let surfaces = surfaces.clone();
                async move {
                    let Some(ensemble) = inputs
                        .local(SettingKind::Ensemble)
                        .and_then(SettingValue::as_ensemble)
                        .cloned()
                    else {
                        return Ok(StoredValue::SurfaceDirectory(vec![]));
                    };

                    let directory = surfaces
                        .surface_directory(&ensemble, cancellation)
                        .await
                        .map_err(|error| HelperError::Failed(error.to_string()))?;
                    Ok(StoredValue::SurfaceDirectory(directory))
                }
                .boxed()
            },
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

        registrar.available_values(
            SettingKind::SurfaceName,
            &[Helper(HelperKind::SurfaceDirectory), Local(SettingKind::Attribute)],
            |ctx| {
                let attribute = ctx
                    .local_setting(SettingKind::Attribute)
                    .and_then(SettingValue::as_text)
                    .map(str::to_string);

                Ok(ctx
                    .helper_dependency(HelperKind::SurfaceDirectory)
                    .and_then(StoredValue::as_surface_directory)
                    .map(|directory| {
                        directory
                            .iter()
                            .filter(|meta| Some(&meta.attribute) == attribute.as_ref())
                            .map(|meta| meta.name.clone())
                            .unique()
                            .map(SettingValue::Text)
                            .collect()
                    })
                    .unwrap_or_default())
            },
        )?;

        registrar.available_values(
            SettingKind::TimeOrInterval,
            &[
                Helper(HelperKind::SurfaceDirectory),
                Local(SettingKind::Attribute),
                Local(SettingKind::SurfaceName),
            ],
            |ctx| {
                let attribute = ctx
                    .local_setting(SettingKind::Attribute)
                    .and_then(SettingValue::as_text)
                    .map(str::to_string);
                let name = ctx
                    .local_setting(SettingKind::SurfaceName)
                    .and_then(SettingValue::as_text)
                    .map(str::to_string);

                Ok(ctx
                    .helper_dependency(HelperKind::SurfaceDirectory)
                    .and_then(StoredValue::as_surface_directory)
                    .map(|directory| {
                        directory
                            .iter()
                            .filter(|meta| {
                                Some(&meta.attribute) == attribute.as_ref() && Some(&meta.name) == name.as_ref()
                            })
                            .map(|meta| meta.time)
                            .unique()
                            .map(SettingValue::TimeOrInterval)
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
            SettingKind::Attribute,
            SettingKind::SurfaceName,
            SettingKind::TimeOrInterval,
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
            .surfaces
            .regular_surface(&address, cancellation);
        async move { Ok(ProviderData::RegularSurface(future.await?)) }.boxed()
    }
}

fn build_address(snapshot: &SettingsSnapshot) -> Result<SurfaceAddress, FetchError> {
    let ensemble = require_setting(snapshot, SettingKind::Ensemble)?
        .as_ensemble()
        .ok_or(FetchError::IncompleteSettings(SettingKind::Ensemble))?
        .clone();
    let realization = require_setting(snapshot, SettingKind::Realization)?
        .as_realization()
        .ok_or(FetchError::IncompleteSettings(SettingKind::Realization))?;
    let attribute = require_setting(snapshot, SettingKind::Attribute)?
        .as_text()
        .ok_or(FetchError::IncompleteSettings(SettingKind::Attribute))?
        .to_string();
    let name = require_setting(snapshot, SettingKind::SurfaceName)?
        .as_text()
        .ok_or(FetchError::IncompleteSettings(SettingKind::SurfaceName))?
        .to_string();
    let time = require_setting(snapshot, SettingKind::TimeOrInterval)?
        .as_time_or_interval()
        .ok_or(FetchError::IncompleteSettings(SettingKind::TimeOrInterval))?;

    Ok(SurfaceAddress {
        ensemble,
        realization,
        name,
        attribute,
        time,
    })
}

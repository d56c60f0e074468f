use futures::future::BoxFuture;
use futures::FutureExt;
use settings::DependencyNode::{Global, Helper};
use settings::{
    DependencyRegistrar, FixupMode, GlobalSettingKind, GlobalSettings, HelperError, HelperKind, SettingKind,
    SettingValue, SettingsContextError, SettingsSnapshot, StoredValue,
};
use stores::{StoreBundle, WellborePicksAddress};
use tokio_util::sync::CancellationToken;

use crate::behaviors::require_setting;
use crate::data::{FetchError, ProviderData, ProviderType};
use crate::provider::ProviderBehavior;

/// Picks of one horizon across a selectable subset of the field's drilled
/// wellbores. Keyed by the global field identifier rather than an ensemble.
pub struct DrilledWellborePicksBehavior {
    stores: StoreBundle,
}

impl DrilledWellborePicksBehavior {
    pub fn new(stores: StoreBundle) -> Self {
        Self {
            stores,
        }
    }
}

impl ProviderBehavior for DrilledWellborePicksBehavior {
    fn provider_type(&self) -> ProviderType {
        ProviderType::DrilledWellborePicks
    }

    fn settings(&self) -> Vec<(SettingKind, FixupMode)> {
        vec![
            (SettingKind::SurfaceName, FixupMode::FirstAvailable),
            (SettingKind::Wellbores, FixupMode::IntersectOrAll),
        ]
    }

    fn define_dependencies(&self, registrar: &mut DependencyRegistrar) -> Result<(), SettingsContextError> {
        let wellbores = self.stores.wellbores.clone();
        registrar.helper_dependency(
            HelperKind::PickIdentifiers,
            &[Global(GlobalSettingKind::FieldIdentifier)],
            move |inputs, cancellation| {
                let wellbores = wellbores.clone();
                async move {
                    let Some(field) = inputs.field().map(str::to_string) else {
                        return Ok(StoredValue::PickIdentifiers(vec![]));
                    };

                    let identifiers = wellbores
                        .pick_identifiers(&field, cancellation)
                        .await
                        .map_err(|error| HelperError::Failed(error.to_string()))?;
                    Ok(StoredValue::PickIdentifiers(identifiers))
                }
                .boxed()
            },
        )?;

        let wellbores = self.stores.wellbores.clone();
        registrar.helper_dependency(
            HelperKind::WellboreDirectory,
            &[Global(GlobalSettingKind::FieldIdentifier)],
            move |inputs, cancellation| {
                let wellbores = wellbores.clone();
                async move {
                    let Some(field) = inputs.field().map(str::to_string) else {
                        return Ok(StoredValue::WellboreDirectory(vec![]));
                    };

                    let directory = wellbores
                        .wellbore_directory(&field, cancellation)
                        .await
                        .map_err(|error| HelperError::Failed(error.to_string()))?;
                    Ok(StoredValue::WellboreDirectory(directory))
                }
                .boxed()
            },
        )?;

        registrar.available_values(
            SettingKind::SurfaceName,
            &[Helper(HelperKind::PickIdentifiers)],
            |ctx| {
                Ok(ctx
                    .helper_dependency(HelperKind::PickIdentifiers)
                    .and_then(StoredValue::as_pick_identifiers)
                    .map(|identifiers| {
                        identifiers
                            .iter()
                            .cloned()
                            .map(SettingValue::Text)
                            .collect()
                    })
                    .unwrap_or_default())
            },
        )?;

        registrar.available_values(
            SettingKind::Wellbores,
            &[Helper(HelperKind::WellboreDirectory)],
            |ctx| {
                Ok(ctx
                    .helper_dependency(HelperKind::WellboreDirectory)
                    .and_then(StoredValue::as_wellbore_directory)
                    .map(|headers| {
                        headers
                            .iter()
                            .map(|header| SettingValue::Text(header.name.clone()))
                            .collect()
                    })
                    .unwrap_or_default())
            },
        )?;

        Ok(())
    }

    fn fetch_relevant_settings(&self) -> &'static [SettingKind] {
        &[SettingKind::SurfaceName, SettingKind::Wellbores]
    }

    fn fetch_relevant_globals(&self) -> &'static [GlobalSettingKind] {
        &[GlobalSettingKind::FieldIdentifier]
    }

    fn are_current_settings_valid(&self, snapshot: &SettingsSnapshot) -> bool {
        let wellbores_selected = snapshot
            .get(SettingKind::Wellbores)
            .and_then(SettingValue::as_text_list)
            .map(|wellbores| !wellbores.is_empty())
            .unwrap_or(false);

        snapshot
            .get(SettingKind::SurfaceName)
            .is_some()
            && wellbores_selected
    }

    fn fetch(
        &self,
        snapshot: &SettingsSnapshot,
        globals: &GlobalSettings,
        cancellation: CancellationToken,
    ) -> BoxFuture<'static, Result<ProviderData, FetchError>> {
        let address = match build_address(snapshot, globals) {
            Ok(address) => address,
            Err(error) => return futures::future::ready(Err(error)).boxed(),
        };

        let future = self
            .stores
            .wellbores
            .picks_for_surface(&address, cancellation);
        async move { Ok(ProviderData::WellborePicks(future.await?)) }.boxed()
    }
}

fn build_address(snapshot: &SettingsSnapshot, globals: &GlobalSettings) -> Result<WellborePicksAddress, FetchError> {
    let field = globals
        .field
        .clone()
        .ok_or(FetchError::IncompleteSettings(SettingKind::SurfaceName))?;
    let pick_name = require_setting(snapshot, SettingKind::SurfaceName)?
        .as_text()
        .ok_or(FetchError::IncompleteSettings(SettingKind::SurfaceName))?
        .to_string();
    let wellbores = require_setting(snapshot, SettingKind::Wellbores)?
        .as_text_list()
        .ok_or(FetchError::IncompleteSettings(SettingKind::Wellbores))?
        .to_vec();

    Ok(WellborePicksAddress {
        field,
        pick_name,
        wellbores,
    })
}

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::Context;
use providers::{
    DataProvider, DrilledWellborePicksBehavior, ProviderBehavior, ProviderType, RealizationSurfaceBehavior,
    SeismicDepthSliceBehavior,
};
use scene::{DataProviderManager, GroupType};
use settings::{GlobalSettings, SettingKind, SettingValue};
use stores::StoreBundle;
use subsurface::ensemble::{EnsembleSummary, RealizationFilter};
use tracing::info;
use uuid::Uuid;

/// A serialized provider/group tree plus the global settings to run it
/// under. This is what `--scene` files contain.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct SceneDefinition {
    pub(crate) global: GlobalDefinition,
    pub(crate) tree: Vec<NodeDefinition>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Default)]
pub(crate) struct GlobalDefinition {
    pub(crate) field: Option<String>,
    #[serde(default)]
    pub(crate) ensembles: Vec<EnsembleSummary>,
    #[serde(default)]
    pub(crate) realization_filter: RealizationFilter,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum NodeDefinition {
    Provider {
        name: String,
        provider_type: ProviderType,
        /// Initial selections; anything omitted is fixed up automatically.
        #[serde(default)]
        settings: BTreeMap<SettingKind, SettingValue>,
    },
    Group {
        name: String,
        group_type: GroupType,
        #[serde(default)]
        children: Vec<NodeDefinition>,
    },
}

pub(crate) fn load_definition(path: &Path) -> anyhow::Result<SceneDefinition> {
    info!("Loading scene definition. file: {}", path.display());

    let file = File::open(path).with_context(|| format!("Error opening scene definition. file: {}", path.display()))?;
    let definition = serde_json::from_reader(file)
        .with_context(|| format!("Error parsing scene definition. file: {}", path.display()))?;
    Ok(definition)
}

/// The built-in demo scene: one view with a surface, a seismic slice and
/// the drilled wellbore picks.
pub(crate) fn demo_definition(field: Option<String>, ensembles: Vec<EnsembleSummary>) -> SceneDefinition {
    SceneDefinition {
        global: GlobalDefinition {
            field,
            ensembles,
            realization_filter: RealizationFilter::All,
        },
        tree: vec![NodeDefinition::Group {
            name: "Main view".to_string(),
            group_type: GroupType::View,
            children: vec![
                NodeDefinition::Provider {
                    name: "Depth surface".to_string(),
                    provider_type: ProviderType::RealizationSurface,
                    settings: BTreeMap::new(),
                },
                NodeDefinition::Provider {
                    name: "Amplitude slice".to_string(),
                    provider_type: ProviderType::SeismicDepthSlice,
                    settings: BTreeMap::new(),
                },
                NodeDefinition::Provider {
                    name: "Well picks".to_string(),
                    provider_type: ProviderType::DrilledWellborePicks,
                    settings: BTreeMap::new(),
                },
            ],
        }],
    }
}

pub(crate) fn build_manager(definition: SceneDefinition, stores: &StoreBundle) -> anyhow::Result<DataProviderManager> {
    let globals = GlobalSettings {
        field: definition.global.field,
        ensembles: definition.global.ensembles,
        realization_filter: definition.global.realization_filter,
    };

    let mut manager = DataProviderManager::new(globals);
    add_nodes(&mut manager, None, definition.tree, stores)?;
    Ok(manager)
}

fn add_nodes(
    manager: &mut DataProviderManager,
    parent: Option<Uuid>,
    nodes: Vec<NodeDefinition>,
    stores: &StoreBundle,
) -> anyhow::Result<()> {
    for node in nodes {
        match node {
            NodeDefinition::Provider {
                name,
                provider_type,
                settings,
            } => {
                let mut provider = DataProvider::new(
                    name,
                    behavior_for(provider_type, stores),
                    manager.global_settings().clone(),
                )?;
                for (kind, value) in settings {
                    provider.set_setting_value(kind, Some(value))?;
                }
                manager.add_provider(parent, provider)?;
            }
            NodeDefinition::Group {
                name,
                group_type,
                children,
            } => {
                let group = manager.add_group(parent, name, group_type)?;
                add_nodes(manager, Some(group), children, stores)?;
            }
        }
    }
    Ok(())
}

fn behavior_for(provider_type: ProviderType, stores: &StoreBundle) -> Box<dyn ProviderBehavior> {
    match provider_type {
        ProviderType::RealizationSurface => Box::new(RealizationSurfaceBehavior::new(stores.clone())),
        ProviderType::SeismicDepthSlice => Box::new(SeismicDepthSliceBehavior::new(stores.clone())),
        ProviderType::DrilledWellborePicks => Box::new(DrilledWellborePicksBehavior::new(stores.clone())),
    }
}

use std::sync::Arc;

use settings::{GlobalSettings, SettingKind, SettingValue};
use stores::scripted::{Response, ScriptedBackend};
use stores::StoreBundle;
use subsurface::ensemble::{EnsembleIdent, EnsembleSummary, RealizationNumber};
use subsurface::surface::{RegularSurface, SurfaceMeta, TimeOrInterval};
use subsurface::wellbore::WellboreHeader;

use crate::behaviors::surface::RealizationSurfaceBehavior;
use crate::behaviors::wellbore::DrilledWellborePicksBehavior;
use crate::provider::DataProvider;

mod state_machine;

pub(crate) fn demo_globals() -> GlobalSettings {
    GlobalSettings {
        field: Some("DROGON".to_string()),
        ensembles: vec![EnsembleSummary {
            ident: EnsembleIdent::new("case", "iter-0"),
            realizations: vec![RealizationNumber(0), RealizationNumber(1)],
        }],
        ..Default::default()
    }
}

pub(crate) fn demo_directory() -> Vec<SurfaceMeta> {
    vec![
        SurfaceMeta {
            name: "TopVolantis".to_string(),
            attribute: "depth".to_string(),
            time: TimeOrInterval::NoTime,
        },
        SurfaceMeta {
            name: "BaseVolantis".to_string(),
            attribute: "depth".to_string(),
            time: TimeOrInterval::NoTime,
        },
    ]
}

pub(crate) fn demo_surface(offset: f32) -> RegularSurface {
    RegularSurface::new(2, 2, 0.0, 0.0, 100.0, 100.0, 0.0, vec![
        1500.0 + offset,
        1510.0 + offset,
        1520.0 + offset,
        1530.0 + offset,
    ])
    .unwrap()
}

pub(crate) fn demo_headers() -> Vec<WellboreHeader> {
    vec![
        WellboreHeader {
            name: "55/33-A-1".to_string(),
            total_depth: 2700.0,
        },
        WellboreHeader {
            name: "55/33-A-2".to_string(),
            total_depth: 2800.0,
        },
    ]
}

pub(crate) fn bundle(scripted: &ScriptedBackend) -> StoreBundle {
    StoreBundle::from_backend(Arc::new(scripted.clone()))
}

pub(crate) fn build_surface_provider(scripted: &ScriptedBackend) -> DataProvider {
    DataProvider::new(
        "Depth surface",
        Box::new(RealizationSurfaceBehavior::new(bundle(scripted))),
        demo_globals(),
    )
    .unwrap()
}

pub(crate) fn build_picks_provider(scripted: &ScriptedBackend) -> DataProvider {
    DataProvider::new(
        "Well picks",
        Box::new(DrilledWellborePicksBehavior::new(bundle(scripted))),
        demo_globals(),
    )
    .unwrap()
}

pub(crate) fn select_realization(provider: &mut DataProvider, realization: u32) {
    provider
        .set_setting_value(
            SettingKind::Realization,
            Some(SettingValue::Realization(RealizationNumber(realization))),
        )
        .unwrap();
}

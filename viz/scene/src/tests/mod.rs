use std::sync::Arc;

use providers::{DataProvider, DataProviderState, RealizationSurfaceBehavior};
use settings::{GlobalSettings, SettingKind, SettingValue};
use stores::memory::InMemoryBackend;
use stores::{StoreBundle, SurfaceAddress};
use subsurface::ensemble::{EnsembleIdent, EnsembleSummary, RealizationNumber};
use subsurface::surface::{RegularSurface, SurfaceMeta, TimeOrInterval};


pub(crate) fn demo_globals() -> GlobalSettings {
    GlobalSettings {
        field: Some("DROGON".to_string()),
        ensembles: vec![EnsembleSummary {
            ident: EnsembleIdent::new("case", "iter-0"),
            realizations: (0..3).map(RealizationNumber).collect(),
        }],
        ..Default::default()
    }
}

pub(crate) fn surface_with_range(xori: f64, low: f32, high: f32) -> RegularSurface {
    RegularSurface::new(2, 2, xori, 0.0, 100.0, 100.0, 0.0, vec![low, high, low + 10.0, high - 10.0]).unwrap()
}

pub(crate) fn address_for(realization: u32) -> SurfaceAddress {
    SurfaceAddress {
        ensemble: EnsembleIdent::new("case", "iter-0"),
        realization: RealizationNumber(realization),
        name: "TopVolantis".to_string(),
        attribute: "depth".to_string(),
        time: TimeOrInterval::NoTime,
    }
}

/// A backend with one depth surface per realization, value ranges roughly
/// [1000,1100], [2000,2100] and [3000,3100].
pub(crate) fn backend_with_surfaces() -> Arc<InMemoryBackend> {
    let backend = InMemoryBackend::new();
    backend.insert_surface_directory(EnsembleIdent::new("case", "iter-0"), vec![SurfaceMeta {
        name: "TopVolantis".to_string(),
        attribute: "depth".to_string(),
        time: TimeOrInterval::NoTime,
    }]);

    for realization in 0..3 {
        let base = 1000.0 * (realization + 1) as f32;
        backend.insert_surface(
            &address_for(realization),
            surface_with_range(realization as f64 * 500.0, base, base + 100.0),
        );
    }

    Arc::new(backend)
}

pub(crate) async fn ready_surface_provider(
    backend: &Arc<InMemoryBackend>,
    name: &str,
    realization: u32,
) -> DataProvider {
    let mut provider = DataProvider::new(
        name,
        Box::new(RealizationSurfaceBehavior::new(StoreBundle::from_backend(backend.clone()))),
        demo_globals(),
    )
    .unwrap();

    provider.refresh().await;
    if realization != 0 {
        provider
            .set_setting_value(
                SettingKind::Realization,
                Some(SettingValue::Realization(RealizationNumber(realization))),
            )
            .unwrap();
        provider.refresh().await;
    }

    assert_eq!(provider.state(), DataProviderState::Ready, "fixture provider must be ready");
    provider
}

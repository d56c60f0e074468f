use std::sync::Arc;

use futures::future::BoxFuture;
use subsurface::ensemble::EnsembleIdent;
use subsurface::seismic::{DepthSlice, SeismicCubeMeta};
use subsurface::surface::{RegularSurface, SurfaceMeta};
use subsurface::wellbore::{WellboreHeader, WellborePick};
use tokio_util::sync::CancellationToken;

use crate::address::{SeismicSliceAddress, SurfaceAddress, WellborePicksAddress};
use crate::error::StoreError;

pub type StoreFuture<T> = BoxFuture<'static, Result<T, StoreError>>;

pub trait SurfaceStore: Send + Sync {
    /// The surfaces that exist in an ensemble, across realizations.
    fn surface_directory(&self, ensemble: &EnsembleIdent, cancellation: CancellationToken)
        -> StoreFuture<Vec<SurfaceMeta>>;

    fn regular_surface(&self, address: &SurfaceAddress, cancellation: CancellationToken)
        -> StoreFuture<RegularSurface>;
}

pub trait SeismicStore: Send + Sync {
    /// The seismic cubes that exist in an ensemble.
    fn seismic_directory(&self, ensemble: &EnsembleIdent, cancellation: CancellationToken)
        -> StoreFuture<Vec<SeismicCubeMeta>>;

    fn depth_slice(&self, address: &SeismicSliceAddress, cancellation: CancellationToken) -> StoreFuture<DepthSlice>;
}

pub trait WellboreStore: Send + Sync {
    /// The drilled wellbores of a field.
    fn wellbore_directory(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<WellboreHeader>>;

    /// The horizon names picks exist for within a field.
    fn pick_identifiers(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<String>>;

    fn picks_for_surface(&self, address: &WellborePicksAddress, cancellation: CancellationToken)
        -> StoreFuture<Vec<WellborePick>>;
}

/// The store handles a provider gets access to.
#[derive(Clone)]
pub struct StoreBundle {
    pub surfaces: Arc<dyn SurfaceStore>,
    pub seismic: Arc<dyn SeismicStore>,
    pub wellbores: Arc<dyn WellboreStore>,
}

impl StoreBundle {
    pub fn new(
        surfaces: Arc<dyn SurfaceStore>,
        seismic: Arc<dyn SeismicStore>,
        wellbores: Arc<dyn WellboreStore>,
    ) -> Self {
        Self {
            surfaces,
            seismic,
            wellbores,
        }
    }

    /// Bundle a backend that implements all three store traits.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SurfaceStore + SeismicStore + WellboreStore + 'static,
    {
        Self {
            surfaces: backend.clone(),
            seismic: backend.clone(),
            wellbores: backend,
        }
    }
}

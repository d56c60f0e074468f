use std::collections::HashMap;

use futures::FutureExt;
use parking_lot::RwLock;
use subsurface::ensemble::EnsembleIdent;
use subsurface::seismic::{DepthSlice, SeismicCubeMeta};
use subsurface::surface::{RegularSurface, SurfaceMeta};
use subsurface::wellbore::{WellboreHeader, WellborePick};
use tokio_util::sync::CancellationToken;

use crate::address::{SeismicSliceAddress, SurfaceAddress, WellborePicksAddress};
use crate::error::StoreError;
use crate::traits::{SeismicStore, StoreFuture, SurfaceStore, WellboreStore};

/// A backend fed by hand. Useful in tests and as a cache layer in front of
/// slower backends.
#[derive(Default)]
pub struct InMemoryBackend {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    surface_directories: HashMap<EnsembleIdent, Vec<SurfaceMeta>>,
    surfaces: HashMap<String, RegularSurface>,
    seismic_directories: HashMap<EnsembleIdent, Vec<SeismicCubeMeta>>,
    slices: HashMap<String, DepthSlice>,
    wellbore_directories: HashMap<String, Vec<WellboreHeader>>,
    pick_identifiers: HashMap<String, Vec<String>>,
    picks: HashMap<String, Vec<WellborePick>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_surface_directory(&self, ensemble: EnsembleIdent, directory: Vec<SurfaceMeta>) {
        self.inner
            .write()
            .surface_directories
            .insert(ensemble, directory);
    }

    pub fn insert_surface(&self, address: &SurfaceAddress, surface: RegularSurface) {
        self.inner
            .write()
            .surfaces
            .insert(address.to_string(), surface);
    }

    pub fn insert_seismic_directory(&self, ensemble: EnsembleIdent, directory: Vec<SeismicCubeMeta>) {
        self.inner
            .write()
            .seismic_directories
            .insert(ensemble, directory);
    }

    pub fn insert_depth_slice(&self, address: &SeismicSliceAddress, slice: DepthSlice) {
        self.inner
            .write()
            .slices
            .insert(address.to_string(), slice);
    }

    pub fn insert_wellbore_directory(&self, field: impl Into<String>, headers: Vec<WellboreHeader>) {
        self.inner
            .write()
            .wellbore_directories
            .insert(field.into(), headers);
    }

    pub fn insert_pick_identifiers(&self, field: impl Into<String>, identifiers: Vec<String>) {
        self.inner
            .write()
            .pick_identifiers
            .insert(field.into(), identifiers);
    }

    pub fn insert_picks(&self, field: impl Into<String>, pick_name: impl Into<String>, picks: Vec<WellborePick>) {
        self.inner
            .write()
            .picks
            .insert(format!("{}/{}", field.into(), pick_name.into()), picks);
    }

    fn lookup<T: Clone>(
        cancellation: &CancellationToken,
        entry: Option<T>,
        key: String,
    ) -> Result<T, StoreError> {
        if cancellation.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        entry.ok_or(StoreError::NotFound(key))
    }
}

impl SurfaceStore for InMemoryBackend {
    fn surface_directory(
        &self,
        ensemble: &EnsembleIdent,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SurfaceMeta>> {
        let entry = self
            .inner
            .read()
            .surface_directories
            .get(ensemble)
            .cloned();
        let key = ensemble.to_string();
        async move { Self::lookup(&cancellation, entry, key) }.boxed()
    }

    fn regular_surface(&self, address: &SurfaceAddress, cancellation: CancellationToken) -> StoreFuture<RegularSurface> {
        let key = address.to_string();
        let entry = self
            .inner
            .read()
            .surfaces
            .get(&key)
            .cloned();
        async move { Self::lookup(&cancellation, entry, key) }.boxed()
    }
}

impl SeismicStore for InMemoryBackend {
    fn seismic_directory(
        &self,
        ensemble: &EnsembleIdent,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SeismicCubeMeta>> {
        let entry = self
            .inner
            .read()
            .seismic_directories
            .get(ensemble)
            .cloned();
        let key = ensemble.to_string();
        async move { Self::lookup(&cancellation, entry, key) }.boxed()
    }

    fn depth_slice(&self, address: &SeismicSliceAddress, cancellation: CancellationToken) -> StoreFuture<DepthSlice> {
        let key = address.to_string();
        let entry = self
            .inner
            .read()
            .slices
            .get(&key)
            .cloned();
        async move { Self::lookup(&cancellation, entry, key) }.boxed()
    }
}

impl WellboreStore for InMemoryBackend {
    fn wellbore_directory(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<WellboreHeader>> {
        let entry = self
            .inner
            .read()
            .wellbore_directories
            .get(field)
            .cloned();
        let key = field.to_string();
        async move { Self::lookup(&cancellation, entry, key) }.boxed()
    }

    fn pick_identifiers(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<String>> {
        let entry = self
            .inner
            .read()
            .pick_identifiers
            .get(field)
            .cloned();
        let key = field.to_string();
        async move { Self::lookup(&cancellation, entry, key) }.boxed()
    }

    fn picks_for_surface(
        &self,
        address: &WellborePicksAddress,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<WellborePick>> {
        let key = format!("{}/{}", address.field, address.pick_name);
        let wellbores = address.wellbores.clone();
        let entry = self
            .inner
            .read()
            .picks
            .get(&key)
            .cloned();
        async move {
            let picks = Self::lookup(&cancellation, entry, key)?;
            Ok(picks
                .into_iter()
                .filter(|pick| wellbores.contains(&pick.wellbore))
                .collect())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        // given
        let backend = InMemoryBackend::new();

        // when
        let result = backend
            .surface_directory(&EnsembleIdent::new("case", "iter-0"), CancellationToken::new())
            .await;

        // then
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        // given
        let backend = InMemoryBackend::new();
        backend.insert_pick_identifiers("DROGON", vec!["TopVolantis".to_string()]);

        let cancellation = CancellationToken::new();
        cancellation.cancel();

        // when
        let result = backend
            .pick_identifiers("DROGON", cancellation)
            .await;

        // then
        assert!(matches!(result, Err(StoreError::Cancelled)));
    }
}

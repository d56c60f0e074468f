use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use subsurface::ensemble::EnsembleIdent;
use subsurface::seismic::{DepthSlice, SeismicCubeMeta};
use subsurface::surface::{RegularSurface, SurfaceMeta};
use subsurface::wellbore::{WellboreHeader, WellborePick};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::address::{SeismicSliceAddress, SurfaceAddress, WellborePicksAddress};
use crate::error::StoreError;
use crate::traits::{SeismicStore, StoreFuture, SurfaceStore, WellboreStore};

/// A backend whose requests stay pending until a test resolves them by hand.
///
/// Requests deliberately ignore their cancellation token so that late
/// resolutions of superseded requests can be simulated; the token is
/// recorded instead, so tests can assert that cancellation was propagated.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<Vec<PendingRequest>>>,
}

pub struct PendingRequest {
    pub key: String,
    pub cancellation: CancellationToken,
    sender: oneshot::Sender<Result<Response, StoreError>>,
}

#[derive(Debug, Clone)]
pub enum Response {
    SurfaceDirectory(Vec<SurfaceMeta>),
    Surface(RegularSurface),
    SeismicDirectory(Vec<SeismicCubeMeta>),
    Slice(DepthSlice),
    WellboreDirectory(Vec<WellboreHeader>),
    PickIdentifiers(Vec<String>),
    Picks(Vec<WellborePick>),
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.state
            .lock()
            .iter()
            .map(|request| request.key.clone())
            .collect()
    }

    /// Whether the token of a still-pending request was cancelled.
    pub fn is_cancelled(&self, key_fragment: &str) -> bool {
        self.state
            .lock()
            .iter()
            .find(|request| request.key.contains(key_fragment))
            .map(|request| request.cancellation.is_cancelled())
            .unwrap_or(false)
    }

    /// Resolve the first pending request whose key contains the fragment.
    ///
    /// Returns false when no such request is pending or its requester is
    /// already gone.
    pub fn resolve(&self, key_fragment: &str, response: Result<Response, StoreError>) -> bool {
        let request = {
            let mut state = self.state.lock();
            let Some(index) = state
                .iter()
                .position(|request| request.key.contains(key_fragment))
            else {
                return false;
            };
            state.remove(index)
        };

        request.sender.send(response).is_ok()
    }

    fn register<T>(
        &self,
        key: String,
        cancellation: CancellationToken,
        extract: fn(Response) -> Option<T>,
    ) -> StoreFuture<T>
    where
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.state
            .lock()
            .push(PendingRequest {
                key,
                cancellation,
                sender,
            });

        async move {
            let response = receiver
                .await
                .unwrap_or(Err(StoreError::Cancelled))?;
            extract(response).ok_or_else(|| StoreError::Format("scripted response type mismatch".to_string()))
        }
        .boxed()
    }
}

impl SurfaceStore for ScriptedBackend {
    fn surface_directory(
        &self,
        ensemble: &EnsembleIdent,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SurfaceMeta>> {
        self.register(
            format!("surface_directory:{}", ensemble),
            cancellation,
            |response| match response {
                Response::SurfaceDirectory(directory) => Some(directory),
                _ => None,
            },
        )
    }

    fn regular_surface(&self, address: &SurfaceAddress, cancellation: CancellationToken) -> StoreFuture<RegularSurface> {
        self.register(
            format!("regular_surface:{}", address),
            cancellation,
            |response| match response {
                Response::Surface(surface) => Some(surface),
                _ => None,
            },
        )
    }
}

impl SeismicStore for ScriptedBackend {
    fn seismic_directory(
        &self,
        ensemble: &EnsembleIdent,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SeismicCubeMeta>> {
        self.register(
            format!("seismic_directory:{}", ensemble),
            cancellation,
            |response| match response {
                Response::SeismicDirectory(directory) => Some(directory),
                _ => None,
            },
        )
    }

    fn depth_slice(&self, address: &SeismicSliceAddress, cancellation: CancellationToken) -> StoreFuture<DepthSlice> {
        self.register(format!("depth_slice:{}", address), cancellation, |response| {
            match response {
                Response::Slice(slice) => Some(slice),
                _ => None,
            }
        })
    }
}

impl WellboreStore for ScriptedBackend {
    fn wellbore_directory(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<WellboreHeader>> {
        self.register(
            format!("wellbore_directory:{}", field),
            cancellation,
            |response| match response {
                Response::WellboreDirectory(headers) => Some(headers),
                _ => None,
            },
        )
    }

    fn pick_identifiers(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<String>> {
        self.register(
            format!("pick_identifiers:{}", field),
            cancellation,
            |response| match response {
                Response::PickIdentifiers(identifiers) => Some(identifiers),
                _ => None,
            },
        )
    }

    fn picks_for_surface(
        &self,
        address: &WellborePicksAddress,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<WellborePick>> {
        self.register(
            format!("picks_for_surface:{}", address),
            cancellation,
            |response| match response {
                Response::Picks(picks) => Some(picks),
                _ => None,
            },
        )
    }
}

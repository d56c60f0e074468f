use settings::SettingKind;
use stores::StoreError;
use subsurface::geometry::{BoundingBox3, ValueRange};
use subsurface::seismic::DepthSlice;
use subsurface::surface::RegularSurface;
use subsurface::wellbore::{picks_bounding_box, WellborePick};
use thiserror::Error;

/// The tag pairing a provider with its settings shape and its registered
/// visualization transforms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString
)]
pub enum ProviderType {
    RealizationSurface,
    SeismicDepthSlice,
    DrilledWellborePicks,
}

/// The payload of a successful fetch, tagged per provider type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderData {
    RegularSurface(RegularSurface),
    SeismicSlice(DepthSlice),
    WellborePicks(Vec<WellborePick>),
}

impl ProviderData {
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        match self {
            ProviderData::RegularSurface(surface) => surface.bounding_box(),
            ProviderData::SeismicSlice(slice) => slice.bounding_box(),
            ProviderData::WellborePicks(picks) => picks_bounding_box(picks),
        }
    }

    pub fn value_range(&self) -> Option<ValueRange> {
        match self {
            ProviderData::RegularSurface(surface) => surface.value_range(),
            ProviderData::SeismicSlice(slice) => slice.value_range(),
            ProviderData::WellborePicks(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Store error. cause: {0}")]
    Store(#[from] StoreError),
    #[error("Fetch cancelled.")]
    Cancelled,
    #[error("Setting unresolved at fetch time. setting: {0}")]
    IncompleteSettings(SettingKind),
}

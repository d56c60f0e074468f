use subsurface::ensemble::RealizationNumber;
use subsurface::seismic::SeismicCubeMeta;
use subsurface::surface::SurfaceMeta;
use subsurface::wellbore::WellboreHeader;

/// The value of a stored-data slot or a committed helper dependency.
///
/// Like [`crate::SettingValue`] this is a closed set so that slots of
/// different providers can share the graph machinery and the snapshot
/// serialization used for input keys.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub enum StoredValue {
    Realizations(Vec<RealizationNumber>),
    SurfaceDirectory(Vec<SurfaceMeta>),
    SeismicDirectory(Vec<SeismicCubeMeta>),
    WellboreDirectory(Vec<WellboreHeader>),
    PickIdentifiers(Vec<String>),
}

impl StoredValue {
    pub fn as_realizations(&self) -> Option<&[RealizationNumber]> {
        match self {
            StoredValue::Realizations(realizations) => Some(realizations.as_slice()),
            _ => None,
        }
    }

    pub fn as_surface_directory(&self) -> Option<&[SurfaceMeta]> {
        match self {
            StoredValue::SurfaceDirectory(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    pub fn as_seismic_directory(&self) -> Option<&[SeismicCubeMeta]> {
        match self {
            StoredValue::SeismicDirectory(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    pub fn as_wellbore_directory(&self) -> Option<&[WellboreHeader]> {
        match self {
            StoredValue::WellboreDirectory(headers) => Some(headers.as_slice()),
            _ => None,
        }
    }

    pub fn as_pick_identifiers(&self) -> Option<&[String]> {
        match self {
            StoredValue::PickIdentifiers(identifiers) => Some(identifiers.as_slice()),
            _ => None,
        }
    }
}

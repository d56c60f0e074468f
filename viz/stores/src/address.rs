use std::fmt::{Display, Formatter};

use subsurface::ensemble::{EnsembleIdent, RealizationNumber};
use subsurface::surface::TimeOrInterval;

/// Fully resolved query for one realization surface.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SurfaceAddress {
    pub ensemble: EnsembleIdent,
    pub realization: RealizationNumber,
    pub name: String,
    pub attribute: String,
    pub time: TimeOrInterval,
}

impl Display for SurfaceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/r{}/{}/{}/{}",
            self.ensemble, self.realization, self.name, self.attribute, self.time
        )
    }
}

/// Fully resolved query for one horizontal seismic slice.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SeismicSliceAddress {
    pub ensemble: EnsembleIdent,
    pub realization: RealizationNumber,
    pub attribute: String,
    pub time: TimeOrInterval,
    pub depth: f64,
}

impl Display for SeismicSliceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/r{}/{}/{}/d{:.0}",
            self.ensemble, self.realization, self.attribute, self.time, self.depth
        )
    }
}

/// Fully resolved query for the picks of one horizon across wellbores.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct WellborePicksAddress {
    pub field: String,
    pub pick_name: String,
    pub wellbores: Vec<String>,
}

impl Display for WellborePicksAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/[{}]", self.field, self.pick_name, self.wellbores.join(","))
    }
}

use std::fmt::{Display, Formatter};

/// Identifies one setting within a provider's settings context.
///
/// The set is fixed so that provider <-> transform pairings and read edges
/// can be checked when dependencies are registered, not when they fire.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::Display
)]
pub enum SettingKind {
    Ensemble,
    Realization,
    Attribute,
    SurfaceName,
    TimeOrInterval,
    SeismicAttribute,
    DepthSlice,
    Wellbores,
    ColorScale,
}

/// Identifies a provider-private derived cache cell.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::Display
)]
pub enum StoredDataKind {
    FilteredRealizations,
}

/// Identifies a memoized asynchronous sub-computation.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::Display
)]
pub enum HelperKind {
    SurfaceDirectory,
    SeismicDirectory,
    WellboreDirectory,
    PickIdentifiers,
}

/// The application-wide values a context may declare a read on.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::Display
)]
pub enum GlobalSettingKind {
    FieldIdentifier,
    EnsembleSet,
    RealizationFilter,
}

/// A node in a context's dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyNode {
    Local(SettingKind),
    Global(GlobalSettingKind),
    Stored(StoredDataKind),
    Helper(HelperKind),
}

impl Display for DependencyNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyNode::Local(kind) => write!(f, "setting:{}", kind),
            DependencyNode::Global(kind) => write!(f, "global:{}", kind),
            DependencyNode::Stored(kind) => write!(f, "stored:{}", kind),
            DependencyNode::Helper(kind) => write!(f, "helper:{}", kind),
        }
    }
}

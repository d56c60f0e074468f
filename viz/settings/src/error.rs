use thiserror::Error;

use crate::kinds::{DependencyNode, SettingKind};

/// Structural registration errors. These are programming errors in a
/// provider's dependency declaration and fail fast, before first evaluation.
#[derive(Debug, Error)]
pub enum SettingsContextError {
    #[error("Cyclic dependency registration. node: {0}")]
    CyclicDependency(DependencyNode),
    #[error("Read of an unregistered node. target: {target}, read: {read}")]
    UnknownReadTarget {
        target: DependencyNode,
        read: DependencyNode,
    },
    #[error("Updater registered for an unknown setting. setting: {0}")]
    UnknownSetting(SettingKind),
    #[error("Duplicate registration. node: {0}")]
    DuplicateRegistration(DependencyNode),
}

/// A recoverable failure inside an available-values or stored-data reader.
///
/// The owning setting falls back to an empty availability list; nothing is
/// surfaced beyond the context.
#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("Missing dependency value. node: {0}")]
    MissingDependency(DependencyNode),
    #[error("{0}")]
    Other(String),
}

/// A helper dependency computation failure.
///
/// Dependents keep the last good value; the owning provider is expected to
/// treat itself as not ready until an input change retriggers the helper.
#[derive(Debug, Error, Clone)]
pub enum HelperError {
    #[error("Helper computation failed. cause: {0}")]
    Failed(String),
    #[error("Helper computation cancelled.")]
    Cancelled,
}

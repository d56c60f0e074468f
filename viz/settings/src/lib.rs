//! Reactive settings resolution for data providers.
//!
//! Each provider owns one [`SettingsContext`]: a fixed set of typed settings
//! plus a dependency graph that recomputes the available values of every
//! setting when anything upstream changes. Three kinds of derived cells hang
//! off the graph:
//!
//! * available-values updaters - synchronous, per setting
//! * stored-data slots - synchronous, provider-private derived values
//! * helper dependencies - asynchronous, memoized and cancellable
//!
//! Dependencies are declared explicitly at registration as read edges and
//! evaluated in topological order; cyclic registrations are rejected up
//! front instead of being left to author discipline.

pub mod context;
pub mod error;
pub mod global;
pub mod helper;
pub mod kinds;
pub mod snapshot;
pub mod stored;
pub mod value;

#[cfg(test)]
mod tests;

pub use context::{DependencyRegistrar, EvaluationPass, ReaderContext, SettingsContext};
pub use error::{HelperError, SettingsContextError, UpdaterError};
pub use global::GlobalSettings;
pub use helper::{HelperFuture, HelperInputs};
pub use kinds::{DependencyNode, GlobalSettingKind, HelperKind, SettingKind, StoredDataKind};
pub use snapshot::SettingsSnapshot;
pub use stored::StoredValue;
pub use value::{FixupMode, Setting, SettingValue};

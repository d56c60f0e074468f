//! Concrete provider behaviors.

pub mod seismic;
pub mod surface;
pub mod wellbore;

use settings::{SettingKind, SettingValue, SettingsSnapshot};

use crate::data::FetchError;

/// The color scales cosmetic settings offer. Changing between them never
/// requires a refetch.
pub const COLOR_SCALES: [&str; 3] = ["Viridis", "Spectral", "Seismic"];

pub(crate) fn require_setting<'a>(
    snapshot: &'a SettingsSnapshot,
    kind: SettingKind,
) -> Result<&'a SettingValue, FetchError> {
    snapshot
        .get(kind)
        .ok_or(FetchError::IncompleteSettings(kind))
}

pub(crate) fn color_scale_values() -> Vec<SettingValue> {
    COLOR_SCALES
        .iter()
        .map(|name| SettingValue::Text(name.to_string()))
        .collect()
}

use indexmap::IndexMap;

use crate::kinds::SettingKind;
use crate::value::SettingValue;

/// An immutable copy of a context's current setting values.
///
/// Snapshots are what providers fetch against: refetch decisions are
/// structural equality over the snapshot restricted to the settings a
/// provider declares fetch-relevant, never timestamps.
#[derive(Debug, serde::Serialize, Clone, PartialEq, Default)]
pub struct SettingsSnapshot {
    values: IndexMap<SettingKind, Option<SettingValue>>,
}

impl SettingsSnapshot {
    pub fn new(values: IndexMap<SettingKind, Option<SettingValue>>) -> Self {
        Self {
            values,
        }
    }

    pub fn get(&self, kind: SettingKind) -> Option<&SettingValue> {
        self.values
            .get(&kind)
            .and_then(|value| value.as_ref())
    }

    pub fn is_complete(&self, kinds: &[SettingKind]) -> bool {
        kinds
            .iter()
            .all(|kind| self.get(*kind).is_some())
    }

    /// The snapshot reduced to the given settings, in the given order.
    pub fn restricted(&self, kinds: &[SettingKind]) -> SettingsSnapshot {
        SettingsSnapshot {
            values: kinds
                .iter()
                .map(|kind| {
                    (
                        *kind,
                        self.values
                            .get(kind)
                            .cloned()
                            .flatten(),
                    )
                })
                .collect(),
        }
    }

    /// Stable content key used for fetch/refetch comparisons.
    pub fn key(&self) -> String {
        serde_json::to_string(&self.values).expect("setting values serialize to JSON")
    }
}

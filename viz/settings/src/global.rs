use subsurface::ensemble::{EnsembleSummary, RealizationFilter};

use crate::kinds::GlobalSettingKind;

/// Application-wide state that settings contexts may declare reads on.
///
/// Owned and versioned by the data provider manager; contexts only ever see
/// committed copies pushed by the manager, never a live shared reference.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
pub struct GlobalSettings {
    pub field: Option<String>,
    pub ensembles: Vec<EnsembleSummary>,
    pub realization_filter: RealizationFilter,
}

impl GlobalSettings {
    /// The per-kind difference against another value, used to dirty only the
    /// graph nodes whose global input actually changed.
    pub fn changed_kinds(&self, other: &GlobalSettings) -> Vec<GlobalSettingKind> {
        let mut changed = vec![];

        if self.field != other.field {
            changed.push(GlobalSettingKind::FieldIdentifier);
        }
        if self.ensembles != other.ensembles {
            changed.push(GlobalSettingKind::EnsembleSet);
        }
        if self.realization_filter != other.realization_filter {
            changed.push(GlobalSettingKind::RealizationFilter);
        }

        changed
    }
}

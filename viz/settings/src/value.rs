use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use subsurface::ensemble::{EnsembleIdent, RealizationNumber};
use subsurface::surface::TimeOrInterval;

use crate::kinds::SettingKind;

/// The value of a single setting.
///
/// A closed set of variants rather than a generic parameter, so that
/// heterogeneous settings can share one dependency graph and one snapshot
/// serialization.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Ensemble(EnsembleIdent),
    Realization(RealizationNumber),
    Date(NaiveDate),
    TimeOrInterval(TimeOrInterval),
    /// Multi-selection over `Text` available values.
    TextList(Vec<String>),
}

impl SettingValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_ensemble(&self) -> Option<&EnsembleIdent> {
        match self {
            SettingValue::Ensemble(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn as_realization(&self) -> Option<RealizationNumber> {
        match self {
            SettingValue::Realization(realization) => Some(*realization),
            _ => None,
        }
    }

    pub fn as_time_or_interval(&self) -> Option<TimeOrInterval> {
        match self {
            SettingValue::TimeOrInterval(time) => Some(*time),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::TextList(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Text(text) => f.write_str(text),
            SettingValue::Integer(value) => write!(f, "{}", value),
            SettingValue::Number(value) => write!(f, "{}", value),
            SettingValue::Ensemble(ident) => write!(f, "{}", ident),
            SettingValue::Realization(realization) => write!(f, "{}", realization),
            SettingValue::Date(date) => write!(f, "{}", date),
            SettingValue::TimeOrInterval(time) => write!(f, "{}", time),
            SettingValue::TextList(items) => f.write_str(items.join(",").as_str()),
        }
    }
}

/// How an out-of-range current value is repaired after evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixupMode {
    /// Single-select: keep the value if still available, otherwise fall back
    /// to the first available value, otherwise clear.
    #[default]
    FirstAvailable,
    /// Multi-select over `Text` availability: drop entries that disappeared;
    /// an empty selection selects everything available.
    IntersectOrAll,
}

/// One named, typed setting with its reactively computed availability.
#[derive(Debug)]
pub struct Setting {
    kind: SettingKind,
    pub(crate) value: Option<SettingValue>,
    pub(crate) available: Vec<SettingValue>,
    fixup_mode: FixupMode,
}

impl Setting {
    pub fn new(kind: SettingKind, fixup_mode: FixupMode) -> Self {
        Self {
            kind,
            value: None,
            available: vec![],
            fixup_mode,
        }
    }

    pub fn kind(&self) -> SettingKind {
        self.kind
    }

    pub fn value(&self) -> Option<&SettingValue> {
        self.value.as_ref()
    }

    pub fn available_values(&self) -> &[SettingValue] {
        &self.available
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Whether the current value satisfies the membership invariant.
    pub fn is_value_available(&self) -> bool {
        match (&self.value, self.fixup_mode) {
            (None, _) => true,
            (Some(value), FixupMode::FirstAvailable) => self.available.contains(value),
            (Some(value), FixupMode::IntersectOrAll) => match value.as_text_list() {
                Some(items) => items
                    .iter()
                    .all(|item| self.contains_text(item)),
                None => false,
            },
        }
    }

    /// Repair the current value against the availability list.
    ///
    /// Returns true when the value changed.
    pub(crate) fn fixup(&mut self) -> bool {
        let fixed = match self.fixup_mode {
            FixupMode::FirstAvailable => match &self.value {
                Some(value) if self.available.contains(value) => self.value.clone(),
                _ => self.available.first().cloned(),
            },
            FixupMode::IntersectOrAll => {
                let selected = self
                    .value
                    .as_ref()
                    .and_then(|value| value.as_text_list())
                    .unwrap_or(&[]);

                let retained: Vec<String> = selected
                    .iter()
                    .filter(|item| self.contains_text(item.as_str()))
                    .cloned()
                    .collect();

                let selection = if retained.is_empty() {
                    self.available
                        .iter()
                        .filter_map(|value| value.as_text().map(str::to_string))
                        .collect::<Vec<_>>()
                } else {
                    retained
                };

                if selection.is_empty() {
                    None
                } else {
                    Some(SettingValue::TextList(selection))
                }
            }
        };

        let changed = self.value != fixed;
        self.value = fixed;
        changed
    }

    fn contains_text(&self, text: &str) -> bool {
        self.available
            .iter()
            .any(|value| value.as_text() == Some(text))
    }
}

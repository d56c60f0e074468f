use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// Identifies one ensemble within a case, e.g. `01_drogon_ahm::iter-0`.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash
)]
pub struct EnsembleIdent {
    pub case_name: String,
    pub ensemble_name: String,
}

impl EnsembleIdent {
    pub fn new(case_name: impl Into<String>, ensemble_name: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            ensemble_name: ensemble_name.into(),
        }
    }
}

impl Display for EnsembleIdent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.case_name, self.ensemble_name)
    }
}

impl FromStr for EnsembleIdent {
    type Err = EnsembleIdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (case_name, ensemble_name) = s
            .split_once("::")
            .ok_or_else(|| EnsembleIdentError::InvalidFormat(s.to_string()))?;

        if case_name.is_empty() || ensemble_name.is_empty() {
            return Err(EnsembleIdentError::InvalidFormat(s.to_string()));
        }

        Ok(Self::new(case_name, ensemble_name))
    }
}

#[derive(Debug, Error)]
pub enum EnsembleIdentError {
    #[error("Invalid ensemble ident. Required format: '<CASE>::<ENSEMBLE>', found: '{0}'")]
    InvalidFormat(String),
}

/// One member run of an ensemble.
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
    Hash
)]
#[serde(transparent)]
pub struct RealizationNumber(pub u32);

impl Display for RealizationNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ensemble together with the realizations it actually contains.
///
/// The realization list comes from the application shell, which knows the
/// case layout; nothing in this crate discovers realizations by itself.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct EnsembleSummary {
    pub ident: EnsembleIdent,
    pub realizations: Vec<RealizationNumber>,
}

/// Application-wide realization filter.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RealizationFilter {
    #[default]
    All,
    Only(BTreeSet<RealizationNumber>),
}

impl RealizationFilter {
    pub fn is_included(&self, realization: RealizationNumber) -> bool {
        match self {
            RealizationFilter::All => true,
            RealizationFilter::Only(realizations) => realizations.contains(&realization),
        }
    }

    pub fn apply(&self, realizations: &[RealizationNumber]) -> Vec<RealizationNumber> {
        realizations
            .iter()
            .copied()
            .filter(|realization| self.is_included(*realization))
            .collect()
    }
}

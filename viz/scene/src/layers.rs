use std::collections::BTreeMap;

use nalgebra::Vector3;
use subsurface::geometry::{BoundingBox3, ValueRange};
use uuid::Uuid;

use crate::group::GroupType;

/// A regular grid of mapped values, the renderable form of surfaces and
/// depth slices.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2dLayer {
    pub ncol: u32,
    pub nrow: u32,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    pub rotation_deg: f64,
    /// Present for slices pinned to one depth plane.
    pub depth: Option<f64>,
    pub color_scale: String,
    /// The range to map colors over, possibly widened by earlier siblings.
    pub value_range: Option<ValueRange>,
    pub values: Vec<f32>,
}

/// Labelled world-space points, the renderable form of wellbore picks.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsLayer {
    pub coordinates: Vec<Vector3<f64>>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneLayer {
    Grid2d(Grid2dLayer),
    Points(PointsLayer),
}

/// A color-scale legend entry contributed by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: String,
    pub title: String,
    pub color_scale: Option<String>,
    pub value_range: Option<ValueRange>,
}

/// The value threaded across providers during assembly, letting later
/// providers observe earlier providers' contributions.
///
/// Threaded as a pure fold: every step produces a new value, nothing is
/// shared or mutated in place during the walk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccumulatedData {
    value_ranges: BTreeMap<String, ValueRange>,
}

impl AccumulatedData {
    pub fn value_range(&self, key: &str) -> Option<&ValueRange> {
        self.value_ranges.get(key)
    }

    pub fn value_ranges(&self) -> &BTreeMap<String, ValueRange> {
        &self.value_ranges
    }

    /// A copy with the given range merged in under the key.
    pub fn with_value_range(mut self, key: impl Into<String>, range: ValueRange) -> Self {
        let key = key.into();
        let merged = match self.value_ranges.get(&key) {
            Some(existing) => existing.union(&range),
            None => range,
        };
        self.value_ranges.insert(key, merged);
        self
    }
}

#[derive(Debug)]
pub struct ProviderVisualization {
    pub provider_id: Uuid,
    pub name: String,
    pub layer: SceneLayer,
    pub hover: Option<SceneLayer>,
}

#[derive(Debug)]
pub struct GroupVisualization {
    pub group_id: Uuid,
    pub name: String,
    pub group_type: GroupType,
    pub children: Vec<SceneItem>,
    /// Aggregated over this group's subtree only.
    pub bounding_box: Option<BoundingBox3>,
    pub annotations: Vec<Annotation>,
}

/// One node of the visualization-item tree, parallel to the provider tree.
#[derive(Debug)]
pub enum SceneItem {
    DataProviderVisualization(ProviderVisualization),
    Group(GroupVisualization),
}

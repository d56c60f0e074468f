use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use nalgebra::{Rotation2, Vector2, Vector3};
use thiserror::Error;

use crate::geometry::{BoundingBox3, ValueRange};

/// The time context of a simulated result.
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
pub enum TimeOrInterval {
    /// Static result, e.g. a depth surface.
    NoTime,
    /// Result at a single time step.
    TimePoint(NaiveDate),
    /// Difference result over an interval.
    Interval(NaiveDate, NaiveDate),
}

impl Display for TimeOrInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeOrInterval::NoTime => f.write_str("static"),
            TimeOrInterval::TimePoint(date) => write!(f, "{}", date),
            TimeOrInterval::Interval(from, to) => write!(f, "{}--{}", from, to),
        }
    }
}

/// Directory entry describing one surface available in an ensemble.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceMeta {
    pub name: String,
    pub attribute: String,
    pub time: TimeOrInterval,
}

/// A regular 2D grid of values, row-major with `ncol` varying fastest.
///
/// Undefined nodes are stored as NaN. For depth surfaces the values *are* the
/// z coordinates; for attribute surfaces they are just the mapped property.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct RegularSurface {
    pub ncol: u32,
    pub nrow: u32,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    /// Anti-clockwise rotation around the origin node, degrees.
    pub rotation_deg: f64,
    values: Vec<f32>,
}

impl RegularSurface {
    pub fn new(
        ncol: u32,
        nrow: u32,
        xori: f64,
        yori: f64,
        xinc: f64,
        yinc: f64,
        rotation_deg: f64,
        values: Vec<f32>,
    ) -> Result<Self, SurfaceError> {
        let expected = ncol as usize * nrow as usize;
        if values.len() != expected {
            return Err(SurfaceError::ValueCountMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            ncol,
            nrow,
            xori,
            yori,
            xinc,
            yinc,
            rotation_deg,
            values,
        })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn value_at(&self, col: u32, row: u32) -> Option<f32> {
        if col >= self.ncol || row >= self.nrow {
            return None;
        }
        let value = self.values[row as usize * self.ncol as usize + col as usize];
        value.is_finite().then_some(value)
    }

    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.values.iter().map(|value| *value as f64))
    }

    /// The four rotated outline corners in world x/y.
    pub fn outline(&self) -> [Vector2<f64>; 4] {
        let rotation = Rotation2::new(self.rotation_deg.to_radians());
        let origin = Vector2::new(self.xori, self.yori);
        let extent_x = self.xinc * (self.ncol.max(1) - 1) as f64;
        let extent_y = self.yinc * (self.nrow.max(1) - 1) as f64;

        [
            Vector2::new(0.0, 0.0),
            Vector2::new(extent_x, 0.0),
            Vector2::new(extent_x, extent_y),
            Vector2::new(0.0, extent_y),
        ]
        .map(|corner| origin + rotation * corner)
    }

    /// Bounding box with x/y from the rotated outline and z from the value range.
    ///
    /// `None` when every node is undefined.
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        let range = self.value_range()?;

        BoundingBox3::from_points(self.outline().into_iter().flat_map(|corner| {
            [
                Vector3::new(corner.x, corner.y, range.min),
                Vector3::new(corner.x, corner.y, range.max),
            ]
        }))
    }
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Value count does not match grid dimensions. expected: {expected}, actual: {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },
}

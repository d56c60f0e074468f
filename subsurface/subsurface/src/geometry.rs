use nalgebra::Vector3;

/// Axis-aligned bounding box in world coordinates (x east, y north, z depth).
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BoundingBox3 {
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self {
            min,
            max,
        }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector3<f64>>,
    {
        points
            .into_iter()
            .fold(None, |bounding_box, point| {
                Some(match bounding_box {
                    None => Self::new(point, point),
                    Some(bounding_box) => bounding_box.extended_by_point(point),
                })
            })
    }

    /// Component-wise min/max with another box.
    pub fn union(&self, other: &BoundingBox3) -> BoundingBox3 {
        BoundingBox3 {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Component-wise min/max over any number of optional boxes.
    ///
    /// `None` entries contribute nothing; an all-`None` input yields `None`.
    pub fn union_all<I>(boxes: I) -> Option<BoundingBox3>
    where
        I: IntoIterator<Item = Option<BoundingBox3>>,
    {
        boxes
            .into_iter()
            .flatten()
            .fold(None, |combined: Option<BoundingBox3>, bounding_box| {
                Some(match combined {
                    None => bounding_box,
                    Some(combined) => combined.union(&bounding_box),
                })
            })
    }

    fn extended_by_point(&self, point: Vector3<f64>) -> BoundingBox3 {
        BoundingBox3 {
            min: self.min.inf(&point),
            max: self.max.sup(&point),
        }
    }
}

/// Inclusive min/max over the finite values of a result.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
        }
    }

    /// Range over the finite entries; `None` when every entry is undefined.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |range: Option<ValueRange>, value| {
                Some(match range {
                    None => ValueRange::new(value, value),
                    Some(range) => ValueRange::new(range.min.min(value), range.max.max(value)),
                })
            })
    }

    pub fn union(&self, other: &ValueRange) -> ValueRange {
        ValueRange::new(self.min.min(other.min), self.max.max(other.max))
    }
}

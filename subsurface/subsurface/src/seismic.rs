use nalgebra::Vector3;

use crate::geometry::{BoundingBox3, ValueRange};
use crate::surface::TimeOrInterval;

/// Directory entry describing one seismic cube available in an ensemble.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SeismicCubeMeta {
    pub attribute: String,
    pub time: TimeOrInterval,
    pub depth_min: f64,
    pub depth_max: f64,
    pub depth_step: f64,
}

impl SeismicCubeMeta {
    /// The depths at which a horizontal slice can be requested.
    pub fn slice_depths(&self) -> Vec<f64> {
        if self.depth_step <= 0.0 || self.depth_max < self.depth_min {
            return vec![];
        }

        let steps = ((self.depth_max - self.depth_min) / self.depth_step).floor() as usize;
        (0..=steps)
            .map(|step| self.depth_min + step as f64 * self.depth_step)
            .collect()
    }
}

/// A horizontal slice through a seismic cube at a fixed depth.
///
/// Amplitudes are a regular grid like a surface, but the z extent collapses
/// to the slice depth.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct DepthSlice {
    pub depth: f64,
    pub ncol: u32,
    pub nrow: u32,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    pub amplitudes: Vec<f32>,
}

impl DepthSlice {
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.amplitudes.iter().map(|value| *value as f64))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        if self.ncol == 0 || self.nrow == 0 {
            return None;
        }

        let extent_x = self.xinc * (self.ncol - 1) as f64;
        let extent_y = self.yinc * (self.nrow - 1) as f64;

        Some(BoundingBox3::new(
            Vector3::new(self.xori, self.yori, self.depth),
            Vector3::new(self.xori + extent_x, self.yori + extent_y, self.depth),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_depths() {
        // given
        let meta = SeismicCubeMeta {
            attribute: "amplitude".to_string(),
            time: TimeOrInterval::NoTime,
            depth_min: 1500.0,
            depth_max: 1700.0,
            depth_step: 100.0,
        };

        // when
        let depths = meta.slice_depths();

        // then
        assert_eq!(depths, vec![1500.0, 1600.0, 1700.0]);
    }

    #[test]
    fn test_slice_depths_with_invalid_step() {
        // given
        let meta = SeismicCubeMeta {
            attribute: "amplitude".to_string(),
            time: TimeOrInterval::NoTime,
            depth_min: 1500.0,
            depth_max: 1700.0,
            depth_step: 0.0,
        };

        // then
        assert!(meta.slice_depths().is_empty());
    }

    #[test]
    fn test_bounding_box_is_flat_at_slice_depth() {
        // given
        let slice = DepthSlice {
            depth: 1600.0,
            ncol: 3,
            nrow: 2,
            xori: 0.0,
            yori: 0.0,
            xinc: 25.0,
            yinc: 25.0,
            amplitudes: vec![0.0; 6],
        };

        // when
        let bounding_box = slice.bounding_box().unwrap();

        // then
        assert_eq!(bounding_box.min.z, 1600.0);
        assert_eq!(bounding_box.max.z, 1600.0);
        assert_eq!(bounding_box.max.x, 50.0);
    }
}

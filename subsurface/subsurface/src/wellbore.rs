use nalgebra::Vector3;

use crate::geometry::BoundingBox3;

/// Directory entry for a drilled wellbore within a field.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct WellboreHeader {
    /// e.g. `55/33-A-4`
    pub name: String,
    pub total_depth: f64,
}

/// A named horizon intersection along a wellbore.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct WellborePick {
    pub wellbore: String,
    pub pick_name: String,
    /// Measured depth along the trajectory.
    pub md: f64,
    /// World position of the intersection (z is depth).
    pub location: Vector3<f64>,
}

pub fn picks_bounding_box(picks: &[WellborePick]) -> Option<BoundingBox3> {
    BoundingBox3::from_points(picks.iter().map(|pick| pick.location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_bounding_box() {
        // given
        let picks = vec![
            WellborePick {
                wellbore: "55/33-A-1".to_string(),
                pick_name: "TopVolantis".to_string(),
                md: 2500.0,
                location: Vector3::new(1000.0, 2000.0, 1650.0),
            },
            WellborePick {
                wellbore: "55/33-A-2".to_string(),
                pick_name: "TopVolantis".to_string(),
                md: 2600.0,
                location: Vector3::new(900.0, 2100.0, 1700.0),
            },
        ];

        // when
        let bounding_box = picks_bounding_box(&picks).unwrap();

        // then
        assert_eq!(bounding_box.min, Vector3::new(900.0, 2000.0, 1650.0));
        assert_eq!(bounding_box.max, Vector3::new(1000.0, 2100.0, 1700.0));
    }

    #[test]
    fn test_picks_bounding_box_of_nothing() {
        assert!(picks_bounding_box(&[]).is_none());
    }
}

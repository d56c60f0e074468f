use providers::{ProviderData, ProviderType};
use subsurface::geometry::BoundingBox3;

use crate::layers::{AccumulatedData, Annotation, PointsLayer, SceneLayer};
use crate::registry::{LayerTransforms, TransformContext, TransformError};

pub struct DrilledWellborePicksTransforms;

impl LayerTransforms for DrilledWellborePicksTransforms {
    fn to_visualization(
        &self,
        data: &ProviderData,
        _accumulated: &AccumulatedData,
        _context: &TransformContext<'_>,
    ) -> Result<SceneLayer, TransformError> {
        let ProviderData::WellborePicks(picks) = data else {
            return Err(TransformError::DataMismatch(ProviderType::DrilledWellborePicks));
        };

        Ok(SceneLayer::Points(PointsLayer {
            coordinates: picks
                .iter()
                .map(|pick| pick.location)
                .collect(),
            labels: picks
                .iter()
                .map(|pick| format!("{} {}", pick.wellbore, pick.pick_name))
                .collect(),
        }))
    }

    fn to_bounding_box(&self, data: &ProviderData) -> Option<BoundingBox3> {
        data.bounding_box()
    }

    fn to_annotations(&self, data: &ProviderData, context: &TransformContext<'_>) -> Vec<Annotation> {
        let ProviderData::WellborePicks(picks) = data else {
            return vec![];
        };
        if picks.is_empty() {
            return vec![];
        }

        vec![Annotation {
            id: format!("picks:{}", picks[0].pick_name),
            title: context.provider_name.to_string(),
            color_scale: None,
            value_range: None,
        }]
    }

    /// Hover targets are the pick markers themselves, labelled by wellbore.
    fn to_hover_visualization(
        &self,
        data: &ProviderData,
        _context: &TransformContext<'_>,
    ) -> Option<SceneLayer> {
        let ProviderData::WellborePicks(picks) = data else {
            return None;
        };

        Some(SceneLayer::Points(PointsLayer {
            coordinates: picks
                .iter()
                .map(|pick| pick.location)
                .collect(),
            labels: picks
                .iter()
                .map(|pick| pick.wellbore.clone())
                .collect(),
        }))
    }
}

use providers::{ProviderData, ProviderType};
use settings::SettingKind;
use subsurface::geometry::BoundingBox3;

use crate::layers::{AccumulatedData, Annotation, Grid2dLayer, SceneLayer};
use crate::registry::{LayerTransforms, TransformContext, TransformError};

/// Accumulator key shared by every surface showing the same attribute, so
/// that siblings agree on one color range.
fn range_key(context: &TransformContext<'_>) -> String {
    format!(
        "surface:{}",
        context
            .setting_text(SettingKind::Attribute)
            .unwrap_or("values")
    )
}

pub struct RealizationSurfaceTransforms;

impl LayerTransforms for RealizationSurfaceTransforms {
    fn to_visualization(
        &self,
        data: &ProviderData,
        accumulated: &AccumulatedData,
        context: &TransformContext<'_>,
    ) -> Result<SceneLayer, TransformError> {
        let ProviderData::RegularSurface(surface) = data else {
            return Err(TransformError::DataMismatch(ProviderType::RealizationSurface));
        };

        // Widen the color range by what earlier siblings contributed.
        let own_range = surface.value_range();
        let shared_range = accumulated.value_range(range_key(context).as_str());
        let value_range = match (own_range, shared_range) {
            (Some(own), Some(shared)) => Some(own.union(shared)),
            (own, shared) => own.or(shared.copied()),
        };

        Ok(SceneLayer::Grid2d(Grid2dLayer {
            ncol: surface.ncol,
            nrow: surface.nrow,
            xori: surface.xori,
            yori: surface.yori,
            xinc: surface.xinc,
            yinc: surface.yinc,
            rotation_deg: surface.rotation_deg,
            depth: None,
            color_scale: context.color_scale().to_string(),
            value_range,
            values: surface.values().to_vec(),
        }))
    }

    fn to_bounding_box(&self, data: &ProviderData) -> Option<BoundingBox3> {
        data.bounding_box()
    }

    fn to_annotations(&self, data: &ProviderData, context: &TransformContext<'_>) -> Vec<Annotation> {
        vec![Annotation {
            id: range_key(context),
            title: context.provider_name.to_string(),
            color_scale: Some(context.color_scale().to_string()),
            value_range: data.value_range(),
        }]
    }

    fn reduce_accumulated(
        &self,
        accumulated: AccumulatedData,
        data: &ProviderData,
        context: &TransformContext<'_>,
    ) -> AccumulatedData {
        match data.value_range() {
            Some(range) => accumulated.with_value_range(range_key(context), range),
            None => accumulated,
        }
    }
}

use providers::{ProviderData, ProviderType};
use settings::SettingKind;
use subsurface::geometry::BoundingBox3;

use crate::layers::{AccumulatedData, Annotation, Grid2dLayer, SceneLayer};
use crate::registry::{LayerTransforms, TransformContext, TransformError};

fn range_key(context: &TransformContext<'_>) -> String {
    format!(
        "seismic:{}",
        context
            .setting_text(SettingKind::SeismicAttribute)
            .unwrap_or("amplitude")
    )
}

pub struct SeismicDepthSliceTransforms;

impl LayerTransforms for SeismicDepthSliceTransforms {
    fn to_visualization(
        &self,
        data: &ProviderData,
        accumulated: &AccumulatedData,
        context: &TransformContext<'_>,
    ) -> Result<SceneLayer, TransformError> {
        let ProviderData::SeismicSlice(slice) = data else {
            return Err(TransformError::DataMismatch(ProviderType::SeismicDepthSlice));
        };

        let own_range = slice.value_range();
        let shared_range = accumulated.value_range(range_key(context).as_str());
        let value_range = match (own_range, shared_range) {
            (Some(own), Some(shared)) => Some(own.union(shared)),
            (own, shared) => own.or(shared.copied()),
        };

        Ok(SceneLayer::Grid2d(Grid2dLayer {
            ncol: slice.ncol,
            nrow: slice.nrow,
            xori: slice.xori,
            yori: slice.yori,
            xinc: slice.xinc,
            yinc: slice.yinc,
            rotation_deg: 0.0,
            depth: Some(slice.depth),
            color_scale: context.color_scale().to_string(),
            value_range,
            values: slice.amplitudes.clone(),
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

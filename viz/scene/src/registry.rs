use std::collections::HashMap;

use providers::{ProviderData, ProviderType};
use settings::{SettingKind, SettingsSnapshot};
use subsurface::geometry::BoundingBox3;
use thiserror::Error;
use uuid::Uuid;

use crate::layers::{AccumulatedData, Annotation, SceneLayer};
use crate::transforms::seismic::SeismicDepthSliceTransforms;
use crate::transforms::surface::RealizationSurfaceTransforms;
use crate::transforms::wellbore::DrilledWellborePicksTransforms;

/// Provider identity and settings handed to transform functions.
pub struct TransformContext<'a> {
    pub provider_id: Uuid,
    pub provider_name: &'a str,
    pub snapshot: SettingsSnapshot,
}

impl TransformContext<'_> {
    pub fn setting_text(&self, kind: SettingKind) -> Option<&str> {
        self.snapshot
            .get(kind)
            .and_then(settings::SettingValue::as_text)
    }

    pub fn color_scale(&self) -> &str {
        self.setting_text(SettingKind::ColorScale)
            .unwrap_or("Viridis")
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Unexpected data variant for provider type. provider_type: {0}")]
    DataMismatch(ProviderType),
    #[error("{0}")]
    Failed(String),
}

/// Externally authored, pure transform functions for one provider type.
///
/// The assembler never inspects provider data itself; everything renderable
/// comes out of these.
pub trait LayerTransforms: Send + Sync {
    fn to_visualization(
        &self,
        data: &ProviderData,
        accumulated: &AccumulatedData,
        context: &TransformContext<'_>,
    ) -> Result<SceneLayer, TransformError>;

    fn to_bounding_box(&self, data: &ProviderData) -> Option<BoundingBox3>;

    fn to_annotations(&self, data: &ProviderData, context: &TransformContext<'_>) -> Vec<Annotation>;

    fn to_hover_visualization(
        &self,
        _data: &ProviderData,
        _context: &TransformContext<'_>,
    ) -> Option<SceneLayer> {
        None
    }

    /// Fold this provider's contribution into the accumulator passed to
    /// later providers.
    fn reduce_accumulated(
        &self,
        accumulated: AccumulatedData,
        _data: &ProviderData,
        _context: &TransformContext<'_>,
    ) -> AccumulatedData {
        accumulated
    }
}

/// Provider-type keyed transform registry; read-only at traversal time.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: HashMap<ProviderType, Box<dyn LayerTransforms>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the transforms for every built-in provider type.
    pub fn with_default_transforms() -> Self {
        let mut registry = Self::new();
        registry.register(ProviderType::RealizationSurface, Box::new(RealizationSurfaceTransforms));
        registry.register(ProviderType::SeismicDepthSlice, Box::new(SeismicDepthSliceTransforms));
        registry.register(
            ProviderType::DrilledWellborePicks,
            Box::new(DrilledWellborePicksTransforms),
        );
        registry
    }

    pub fn register(&mut self, provider_type: ProviderType, transforms: Box<dyn LayerTransforms>) {
        self.transforms
            .insert(provider_type, transforms);
    }

    pub fn get(&self, provider_type: ProviderType) -> Option<&dyn LayerTransforms> {
        self.transforms
            .get(&provider_type)
            .map(Box::as_ref)
    }
}

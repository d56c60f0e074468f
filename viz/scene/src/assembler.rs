use subsurface::geometry::BoundingBox3;
use tracing::warn;

use crate::group::{Group, TreeItem};
use crate::layers::{AccumulatedData, Annotation, GroupVisualization, ProviderVisualization, SceneItem};
use crate::registry::{TransformContext, TransformRegistry};

/// Everything the renderer and the status bar need for one revision.
#[derive(Debug)]
pub struct AssembledScene {
    /// Parallel to the provider tree, sibling order preserved.
    pub items: Vec<SceneItem>,
    /// Component-wise min/max over every provider box in the tree.
    pub bounding_box: Option<BoundingBox3>,
    /// Flat, depth-first list over the whole tree.
    pub annotations: Vec<Annotation>,
    pub accumulated: AccumulatedData,
    pub loading_count: usize,
    pub errors: Vec<String>,
}

/// Walk a tree snapshot and fold it into a renderable scene.
///
/// Synchronous and side-effect-free over the snapshot plus registry; rerun
/// on every revision, never cancelled. A provider whose type has no
/// registered transforms contributes nothing and is not an error.
pub fn assemble_scene(root: &Group, registry: &TransformRegistry) -> AssembledScene {
    let mut loading_count = 0;
    let mut errors = vec![];

    let outcome = assemble_children(
        root.children(),
        registry,
        AccumulatedData::default(),
        &mut loading_count,
        &mut errors,
    );

    AssembledScene {
        items: outcome.items,
        bounding_box: outcome.bounding_box,
        annotations: outcome.annotations,
        accumulated: outcome.accumulated,
        loading_count,
        errors,
    }
}

struct SubtreeOutcome {
    items: Vec<SceneItem>,
    bounding_box: Option<BoundingBox3>,
    annotations: Vec<Annotation>,
    accumulated: AccumulatedData,
}

fn assemble_children(
    children: &[TreeItem],
    registry: &TransformRegistry,
    mut accumulated: AccumulatedData,
    loading_count: &mut usize,
    errors: &mut Vec<String>,
) -> SubtreeOutcome {
    let mut items = vec![];
    let mut boxes = vec![];
    let mut annotations = vec![];

    for child in children {
        match child {
            TreeItem::Group(group) => {
                // The accumulator is threaded straight through the subtree,
                // so providers after this group see its contributions.
                let outcome = assemble_children(group.children(), registry, accumulated, loading_count, errors);
                accumulated = outcome.accumulated;

                boxes.push(outcome.bounding_box);
                annotations.extend(outcome.annotations.iter().cloned());
                items.push(SceneItem::Group(GroupVisualization {
                    group_id: group.id(),
                    name: group.name().to_string(),
                    group_type: group.group_type(),
                    children: outcome.items,
                    bounding_box: outcome.bounding_box,
                    annotations: outcome.annotations,
                }));
            }
            TreeItem::Provider(provider) => {
                if provider.is_loading() {
                    *loading_count += 1;
                }
                if let Some((_, message)) = provider.error() {
                    errors.push(format!("{}: {}", provider.name(), message));
                }

                // Unregistered provider types are skipped silently so newer
                // trees keep working against older transform sets.
                let Some(transforms) = registry.get(provider.provider_type()) else {
                    continue;
                };
                let Some(data) = provider.data() else {
                    continue;
                };

                let context = TransformContext {
                    provider_id: provider.id(),
                    provider_name: provider.name(),
                    snapshot: provider.context().snapshot(),
                };

                match transforms.to_visualization(data, &accumulated, &context) {
                    Ok(layer) => {
                        items.push(SceneItem::DataProviderVisualization(ProviderVisualization {
                            provider_id: provider.id(),
                            name: provider.name().to_string(),
                            layer,
                            hover: transforms.to_hover_visualization(data, &context),
                        }));
                    }
                    Err(error) => {
                        // Isolated per provider; the rest of the tree still
                        // assembles.
                        warn!(
                            "Visualization transform failed. provider: {}, cause: {}",
                            provider.name(),
                            error
                        );
                        errors.push(format!("{}: {}", provider.name(), error));
                    }
                }

                boxes.push(transforms.to_bounding_box(data));
                annotations.extend(transforms.to_annotations(data, &context));
                accumulated = transforms.reduce_accumulated(accumulated, data, &context);
            }
        }
    }

    SubtreeOutcome {
        items,
        bounding_box: BoundingBox3::union_all(boxes),
        annotations,
        accumulated,
    }
}

use scene::{AssembledScene, DataProviderManager, Group, SceneItem, SceneLayer, TreeItem};
use termtree::Tree;

pub(crate) fn print_scene(manager: &DataProviderManager, scene: &AssembledScene) {
    println!("{}", build_tree(manager.root()));

    println!("Layers:");
    print_items(&scene.items, 1);

    match &scene.bounding_box {
        Some(bounding_box) => println!(
            "Bounding box: ({:.1}, {:.1}, {:.1}) - ({:.1}, {:.1}, {:.1})",
            bounding_box.min.x,
            bounding_box.min.y,
            bounding_box.min.z,
            bounding_box.max.x,
            bounding_box.max.y,
            bounding_box.max.z
        ),
        None => println!("Bounding box: none"),
    }

    println!("Annotations:");
    for annotation in &scene.annotations {
        let range = annotation
            .value_range
            .map(|range| format!(" [{:.1}, {:.1}]", range.min, range.max))
            .unwrap_or_default();
        let color_scale = annotation
            .color_scale
            .as_deref()
            .map(|name| format!(" ({})", name))
            .unwrap_or_default();
        println!("  - {}{}{}", annotation.title, color_scale, range);
    }

    println!("Loading: {}", scene.loading_count);
    if scene.errors.is_empty() {
        println!("Errors: none");
    } else {
        println!("Errors:");
        for error in &scene.errors {
            println!("  - {}", error);
        }
    }
}

fn build_tree(group: &Group) -> Tree<String> {
    let mut tree = Tree::new(format!("{} [{}]", group.name(), group.group_type()));
    for child in group.children() {
        match child {
            TreeItem::Provider(provider) => {
                tree.push(Tree::new(format!(
                    "{} <{}> ({})",
                    provider.name(),
                    provider.provider_type(),
                    provider.state()
                )));
            }
            TreeItem::Group(child_group) => {
                tree.push(build_tree(child_group));
            }
        }
    }
    tree
}

fn print_items(items: &[SceneItem], indent: usize) {
    let pad = "  ".repeat(indent);
    for item in items {
        match item {
            SceneItem::DataProviderVisualization(visualization) => match &visualization.layer {
                SceneLayer::Grid2d(layer) => {
                    let range = layer
                        .value_range
                        .map(|range| format!(", range [{:.1}, {:.1}]", range.min, range.max))
                        .unwrap_or_default();
                    let depth = layer
                        .depth
                        .map(|depth| format!(", depth {:.0}", depth))
                        .unwrap_or_default();
                    println!(
                        "{}- {}: grid {}x{} ({}){}{}",
                        pad, visualization.name, layer.ncol, layer.nrow, layer.color_scale, range, depth
                    );
                }
                SceneLayer::Points(layer) => {
                    println!("{}- {}: {} points", pad, visualization.name, layer.coordinates.len());
                }
            },
            SceneItem::Group(group) => {
                println!("{}+ {} [{}]", pad, group.name, group.group_type);
                print_items(&group.children, indent + 1);
            }
        }
    }
}

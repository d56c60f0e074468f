use std::sync::Arc;

use clap::Parser;
use scene::TransformRegistry;
use stores::fs::FsBackend;
use stores::synthetic::SyntheticBackend;
use stores::StoreBundle;
use tokio::runtime::Runtime;
use tracing::info;
use util::source::Source;

use crate::definition::SceneDefinition;
use crate::opts::Opts;

mod definition;
mod logging;
mod opts;
mod report;

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    logging::configure_tracing(opts.trace.clone(), opts.verbose.clone())?;

    let runtime = Runtime::new()?;
    runtime.block_on(run(opts))
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let (bundle, definition) = match &opts.data {
        Some(directory) => {
            let source = Source::try_from_directory_path(directory.clone())?;
            info!("Using dataset directory. source: {}", source);

            let backend = Arc::new(FsBackend::try_from_source(&source)?);
            let ensembles = backend.load_ensembles()?;

            let definition = build_definition(&opts, Some("DROGON".to_string()), ensembles)?;
            (StoreBundle::from_backend(backend), definition)
        }
        None => {
            info!("No dataset directory given, generating synthetic demo data.");

            let backend = SyntheticBackend::new();
            let field = Some(backend.field().to_string());
            let ensembles = backend.ensembles().to_vec();

            let definition = build_definition(&opts, field, ensembles)?;
            (StoreBundle::from_backend(Arc::new(backend)), definition)
        }
    };

    let mut manager = definition::build_manager(definition, &bundle)?;
    info!(
        "Built provider tree. providers: {}",
        manager.root().providers().len()
    );

    manager.refresh().await;
    info!("Provider tree refreshed. revision: {}", manager.revision());

    let registry = TransformRegistry::with_default_transforms();
    let scene = manager.assemble(&registry);

    report::print_scene(&manager, &scene);

    Ok(())
}

fn build_definition(
    opts: &Opts,
    field: Option<String>,
    ensembles: Vec<subsurface::ensemble::EnsembleSummary>,
) -> anyhow::Result<SceneDefinition> {
    match &opts.scene {
        Some(path) => definition::load_definition(path),
        None => Ok(definition::demo_definition(field, ensembles)),
    }
}

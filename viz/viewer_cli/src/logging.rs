use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_log::AsTrace;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Console logging at the chosen verbosity, plus an optional full trace
/// file for debugging provider/fetch interleavings after the fact.
pub(crate) fn configure_tracing(trace: Option<PathBuf>, verbose: Verbosity<InfoLevel>) -> anyhow::Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(verbose.log_level_filter().as_trace());

    let trace_layer = match trace {
        Some(path) => {
            let file = File::create(&path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_filter(tracing_subscriber::filter::LevelFilter::TRACE),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(trace_layer)
        .init();

    Ok(())
}

#![deny(missing_docs)]

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(name = "viewer_cli")]
#[command(bin_name = "viewer_cli")]
#[command(version, about, long_about = None)]
pub(crate) struct Opts {
    /// Scene definition file (JSON). Omit to use the built-in demo scene.
    #[arg(long, value_name = "SCENE_FILE")]
    pub(crate) scene: Option<PathBuf>,

    /// Dataset directory. Omit to generate synthetic demo data.
    #[arg(long, value_name = "DATA_DIR")]
    pub(crate) data: Option<PathBuf>,

    /// Trace log file
    #[arg(long, num_args = 0..=1, default_missing_value = "trace.log")]
    pub(crate) trace: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

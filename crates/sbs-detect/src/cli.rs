use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DisplayBackend {
    /// Log mode transitions without touching any hardware
    Noop,
    /// Disable mode switching entirely
    Off,
}

#[derive(Debug, Parser)]
#[command(
    name = "sbs-detect",
    about = "Classify video frames as side-by-side stereo or monoscopic",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Lock frame acquisition to a specific backend implementation
    #[arg(short = 'b', long = "backend")]
    pub backend: Option<String>,

    /// Directory of frame images for the images backend
    #[arg(long = "input", value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Print the list of available frame backends
    #[arg(long = "list-backends")]
    pub list_backends: bool,

    /// Edge length of the square luma grid both halves are downsampled to
    #[arg(
        long = "target-size",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub target_size: Option<u32>,

    /// Correlation threshold below which a frame counts as stereo
    #[arg(long = "threshold")]
    pub threshold: Option<f32>,

    /// Write per-frame detection reports as JSON to this file
    #[arg(long = "json-output", value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(
        long = "max-frames",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_frames: Option<u64>,

    /// Display mode-switch backend driven by the classification results
    #[arg(long = "display", value_enum)]
    pub display: Option<DisplayBackend>,
}

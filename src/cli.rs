//! CLI argument parsing for planmark

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Flatten an annotated floor plan into a shareable JPEG
#[derive(Parser, Debug)]
#[command(name = "planmark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress status output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PLANMARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Composite a drawing with its annotations and share or save it
    Export(ExportArgs),
    /// Print the effective configuration
    Config {
        /// Also write it to the default config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Drawing image (PNG, JPEG, ...)
    #[arg(long)]
    pub drawing: Option<PathBuf>,

    /// Identifier used to look up pins (defaults to the file stem)
    #[arg(long)]
    pub drawing_id: Option<String>,

    /// Drawing title used in the share caption
    #[arg(long)]
    pub title: Option<String>,

    /// On-screen size of the drawing in logical pixels, e.g. 800x600
    #[arg(long, value_parser = parse_display_size)]
    pub display_size: Option<(f32, f32)>,

    /// Device pixel ratio
    #[arg(long)]
    pub dpr: Option<f32>,

    /// Free-hand ink as a transparent image
    #[arg(long, conflicts_with = "ink")]
    pub strokes: Option<PathBuf>,

    /// Free-hand ink as a JSON array of strokes
    #[arg(long)]
    pub ink: Option<PathBuf>,

    /// Pin store (JSON object mapping drawing id to pins)
    #[arg(long)]
    pub pins: Option<PathBuf>,

    /// Text annotations (JSON array)
    #[arg(long)]
    pub texts: Option<PathBuf>,

    /// Skip the native share and always save to a file
    #[arg(long)]
    pub no_share: bool,

    /// Directory to save into when not sharing
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_display_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| -> Result<f32, String> {
        let v: f32 = v
            .trim()
            .parse()
            .map_err(|_| format!("invalid size component {v:?}"))?;
        if v.is_finite() && v >= 0.0 {
            Ok(v)
        } else {
            Err(format!("size must be a non-negative number, got {v}"))
        }
    };
    Ok((parse(w)?, parse(h)?))
}

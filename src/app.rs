//! Command dispatch

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;

use crate::busy::StatusLine;
use crate::cli::{Cli, Commands, ExportArgs};
use crate::config::PlanmarkConfig;
use crate::delivery::{Delivery, DownloadDir, PortalShare};
use crate::domain::{DrawingSurface, FreehandLayer};
use crate::export::{ExportContext, Exporter};
use crate::render::text::TextRenderer;
use crate::store::{self, JsonPinStore, NoPins, PinStore};

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => PlanmarkConfig::load_from(path),
        None => PlanmarkConfig::load(),
    };

    match cli.command {
        Commands::Export(args) => export(args, &config, cli.quiet).await,
        Commands::Config { save } => {
            if let Some(path) = cli.config.clone().or_else(PlanmarkConfig::default_path) {
                println!("# {}", path.display());
            }
            print!("{}", config.to_toml()?);
            if save {
                match &cli.config {
                    Some(path) => config.save_to(path)?,
                    None => config.save(),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_image(path: &Path) -> anyhow::Result<image::RgbaImage> {
    Ok(image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .into_rgba8())
}

fn load_drawing(args: &ExportArgs) -> anyhow::Result<Option<DrawingSurface>> {
    let Some(path) = &args.drawing else {
        return Ok(None);
    };
    let image = open_image(path)?;
    let id = args.drawing_id.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    log::debug!(
        "Drawing {} loaded from {}: {}x{} pixels",
        id,
        path.display(),
        image.width(),
        image.height()
    );

    let mut surface = DrawingSurface::at_native_size(id, image).with_title(args.title.clone());
    if let Some((w, h)) = args.display_size {
        surface = surface.with_display_size(w, h);
    }
    Ok(Some(surface))
}

fn load_freehand(args: &ExportArgs) -> anyhow::Result<Option<FreehandLayer>> {
    if let Some(path) = &args.strokes {
        return Ok(Some(FreehandLayer::Raster(open_image(path)?)));
    }
    if let Some(path) = &args.ink {
        return Ok(Some(FreehandLayer::Strokes(store::load_ink_strokes(path)?)));
    }
    Ok(None)
}

async fn export(
    args: ExportArgs,
    config: &PlanmarkConfig,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    match &args.pins {
        Some(path) => export_with(&args, config, quiet, &JsonPinStore::new(path)).await,
        None => export_with(&args, config, quiet, &NoPins).await,
    }
}

async fn export_with<P: PinStore>(
    args: &ExportArgs,
    config: &PlanmarkConfig,
    quiet: bool,
    pins: &P,
) -> anyhow::Result<ExitCode> {
    let drawing = load_drawing(args)?;
    let freehand = load_freehand(args)?;
    let texts = match &args.texts {
        Some(path) => store::load_text_annotations(path)?,
        None => Vec::new(),
    };

    let share = if config.native_share && !args.no_share {
        PortalShare::probe().await
    } else {
        None
    };
    let download_dir = args.output_dir.clone().or_else(|| config.download_dir.clone());
    let download = DownloadDir::new(download_dir);
    let delivery = Delivery::new(share, download);
    log::info!("Native share available: {}", delivery.can_share());

    let mut settings = config.export_settings();
    if let Some(quality) = args.quality {
        settings.jpeg_quality = quality;
    }
    let exporter = Exporter::new(TextRenderer::with_system_fonts(), settings);

    let ctx = ExportContext {
        drawing: drawing.as_ref(),
        freehand: freehand.as_ref(),
        pins,
        texts: &texts,
        device_pixel_ratio: args.dpr.unwrap_or(config.device_pixel_ratio),
    };
    let busy = StatusLine::new(quiet);

    match exporter.export(ctx, &delivery, &busy).await {
        Ok(report) => {
            for warning in &report.warnings {
                log::debug!("Export warning: {}", warning.detail());
                eprintln!("{}", warning.user_message());
            }
            log::info!(
                "Exported {}x{} ({} bytes)",
                report.width,
                report.height,
                report.bytes
            );
            if !quiet {
                println!("{}", report.outcome.message());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            if err.is_precondition() {
                log::warn!("Nothing to export: {}", err);
            } else {
                log::error!("Export failed: {}", err);
            }
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

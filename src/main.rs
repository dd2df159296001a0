use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use box_annotator::config::{self, AppConfig};
use box_annotator::export::{ExportError, ExportFormat};
use box_annotator::{intake, labels};
use box_annotator::state::{load_session, save_session};
use box_annotator::{AnnotationEngine, DisplayPoint, EngineError, GestureOutcome, Tool};

#[derive(Parser)]
#[clap(name = "box-annotator", version, about = "Bounding-box annotation sessions and export")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the platform default
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session from image files or folders of images
    New {
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
        /// Session file to write
        #[clap(short, long)]
        output: PathBuf,
        /// Label YAML file (overrides the configured one)
        #[clap(long)]
        labels: Option<String>,
    },
    /// Print images, boxes and labels of a session
    Summary { session: PathBuf },
    /// Draw a box on one image, in display coordinates
    Draw {
        session: PathBuf,
        /// Image index
        #[clap(long, default_value_t = 0)]
        image: usize,
        /// Start point as x,y
        #[clap(long, value_parser = parse_point)]
        from: DisplayPoint,
        /// End point as x,y
        #[clap(long, value_parser = parse_point)]
        to: DisplayPoint,
        /// Label for the new box (defaults to the first label)
        #[clap(long)]
        label: Option<String>,
    },
    /// Write JSON and/or YOLO files for a session
    Export {
        session: PathBuf,
        /// Output directory
        #[clap(short, long)]
        output: PathBuf,
        #[clap(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Manage the label set of a session
    Labels {
        #[clap(subcommand)]
        action: LabelAction,
    },
}

#[derive(Subcommand)]
enum LabelAction {
    List {
        session: PathBuf,
    },
    Add {
        session: PathBuf,
        name: String,
        /// Color as #rrggbb
        #[clap(long)]
        color: Option<String>,
    },
    Remove {
        session: PathBuf,
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yolo,
    All,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Yolo => ExportFormat::Yolo,
            FormatArg::All => ExportFormat::All,
        }
    }
}

fn parse_point(s: &str) -> Result<DisplayPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got \"{s}\""))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(DisplayPoint::new(x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    box_annotator::logging::init_logs(cli.verbose);

    let config = config::load_config(cli.config.as_deref());

    match cli.command {
        Commands::New {
            inputs,
            output,
            labels,
        } => new_session(&config, &inputs, &output, labels.as_deref()),
        Commands::Summary { session } => summary(&config, &session),
        Commands::Draw {
            session,
            image,
            from,
            to,
            label,
        } => draw_box(&config, &session, image, from, to, label.as_deref()),
        Commands::Export {
            session,
            output,
            format,
        } => {
            let format = format
                .map(ExportFormat::from)
                .unwrap_or(config.export.default_format);
            export(&config, &session, &output, format)
        }
        Commands::Labels { action } => manage_labels(&config, action),
    }
}

fn new_session(
    config: &AppConfig,
    inputs: &[PathBuf],
    output: &Path,
    labels_file: Option<&str>,
) -> Result<()> {
    let files = intake::collect_images(inputs).context("Failed to scan inputs")?;
    if files.is_empty() {
        bail!("No image files found in the given inputs");
    }

    let labels_file = labels_file.or(config.labels.config_file.as_deref());
    let label_set = labels::load_labels(labels_file);
    let mut engine = AnnotationEngine::with_labels(config.engine_settings(), label_set);

    let count = engine
        .install_batch(intake::decode_all(&files))
        .map_err(|e| {
            if let EngineError::BatchDecode { failures, .. } = &e {
                for failure in failures {
                    warn!("{}: {}", failure.filename, failure.reason);
                }
            }
            e
        })
        .context("Image batch was not loaded")?;

    save_session(&engine, output)?;
    println!(
        "Created session {} with {} image(s) and {} label(s)",
        output.display(),
        count,
        engine.labels().len()
    );
    Ok(())
}

fn summary(config: &AppConfig, session: &Path) -> Result<()> {
    let engine = load_session(session, config.engine_settings())?;

    println!("Labels:");
    if engine.labels().is_empty() {
        println!("  (none)");
    }
    for (idx, label) in engine.labels().iter().enumerate() {
        println!("  {idx}: {} {}", label.name, label.color);
    }

    println!("Images:");
    for (idx, img) in engine.images().iter().enumerate() {
        let (dw, dh) = img.display_size();
        println!(
            "  [{idx}] {} {}x{} -> {}x{} (ratio {:.4}), {} box(es)",
            img.filename,
            img.width,
            img.height,
            dw,
            dh,
            img.scale_ratio.get(),
            img.boxes.len()
        );
        for b in &img.boxes {
            let r = b.rect.to_original(img.scale_ratio);
            println!(
                "      {} [{}, {}, {}, {}]",
                b.label, r.x_min, r.y_min, r.x_max, r.y_max
            );
        }
    }
    Ok(())
}

fn draw_box(
    config: &AppConfig,
    session: &Path,
    image: usize,
    from: DisplayPoint,
    to: DisplayPoint,
    label: Option<&str>,
) -> Result<()> {
    let mut engine = load_session(session, config.engine_settings())?;
    engine.set_active_image(image)?;
    engine.set_tool(Tool::Draw);

    engine.pointer_down(from);
    engine.pointer_move(to);
    match engine.pointer_up(to) {
        GestureOutcome::Created(index) => {
            if let Some(label) = label {
                engine.set_box_label(index, label)?;
            }
            save_session(&engine, session)?;
            let b = &engine.boxes()[index];
            println!(
                "Added box {index} ({:.1}, {:.1}, {:.1}x{:.1}) labeled {}",
                b.rect.x, b.rect.y, b.rect.width, b.rect.height, b.label
            );
        }
        GestureOutcome::Discarded => {
            println!(
                "Box too small (minimum {} display pixels per side), nothing added",
                engine.settings().min_box_size
            );
        }
        other => bail!("Unexpected gesture outcome {other:?}"),
    }
    Ok(())
}

fn export(config: &AppConfig, session: &Path, output: &Path, format: ExportFormat) -> Result<()> {
    let engine = load_session(session, config.engine_settings())?;
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    info!(format = format.name(), "exporting");

    if format.includes_json() {
        match engine.export_json() {
            Ok(export) => {
                let path = output.join(&config.export.json_file_name);
                export.save(&path)?;
                let s = export.summary();
                println!(
                    "JSON: {} box(es) from {} image(s) -> {}",
                    s.annotations_exported,
                    s.images_exported,
                    path.display()
                );
            }
            Err(e @ (ExportError::NothingToExport | ExportError::NoAnnotations)) => {
                println!("{e}");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if format.includes_yolo() {
        match engine.export_yolo() {
            Ok(export) => {
                let written = export.save_all(output)?;
                let s = export.summary();
                println!(
                    "YOLO: {} box(es) in {} file(s), {} skipped",
                    s.annotations_exported,
                    written.len(),
                    s.annotations_skipped
                );
            }
            Err(e @ (ExportError::NothingToExport | ExportError::NoAnnotations)) => {
                println!("{e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn manage_labels(config: &AppConfig, action: LabelAction) -> Result<()> {
    match action {
        LabelAction::List { session } => {
            let engine = load_session(&session, config.engine_settings())?;
            for (idx, label) in engine.labels().iter().enumerate() {
                println!("{idx}: {} {}", label.name, label.color);
            }
        }
        LabelAction::Add {
            session,
            name,
            color,
        } => {
            let mut engine = load_session(&session, config.engine_settings())?;
            let label = engine.add_label(&name, color.as_deref())?;
            save_session(&engine, &session)?;
            println!("Added label {} {}", label.name, label.color);
        }
        LabelAction::Remove { session, name } => {
            let mut engine = load_session(&session, config.engine_settings())?;
            let moved = engine.delete_label(&name)?;
            save_session(&engine, &session)?;
            println!(
                "Removed label {name}; {moved} box(es) now labeled {}",
                engine.labels().default_name()
            );
        }
    }
    Ok(())
}

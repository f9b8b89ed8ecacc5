use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use picmeta::core::preview::{PreviewImage, DEFAULT_PREVIEW_BOUNDS};
use picmeta::core::{AnalyzerService, PreviewService, ScannerService};
use picmeta::session::SessionUpdate;
use picmeta::table::{self, Column, SortOrder};
use picmeta::theme::{Theme, ThemeName};
use picmeta::{AnalyzerConfig, AnalyzerSession};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "picmeta", version, about = "Inspect image file metadata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a folder or a set of files and print the metadata table
    Analyze {
        /// Folder to analyze (its direct children only)
        #[arg(short, long, value_name = "DIR", conflicts_with = "files")]
        dir: Option<PathBuf>,
        /// Explicit image files to analyze
        #[arg(short, long, value_name = "FILE", num_args = 1..)]
        files: Vec<PathBuf>,
        /// Sort the table by this column
        #[arg(long, value_enum)]
        sort: Option<Column>,
        /// Sort in descending order
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Colour preset for the progress bar
        #[arg(long, value_enum, default_value_t = ThemeName::Cyberpunk)]
        theme: ThemeName,
        /// Print the analysis report for this row
        #[arg(long, value_name = "ROW")]
        preview: Option<usize>,
        /// Write the preview image of `--preview` to this PNG file
        #[arg(long, value_name = "FILE", requires = "preview")]
        preview_out: Option<PathBuf>,
        /// Side of the preview bounding box in pixels
        #[arg(long, value_name = "PX", default_value_t = DEFAULT_PREVIEW_BOUNDS)]
        preview_size: u32,
        /// Pick rows to preview from a menu after the table is printed
        #[arg(short, long)]
        interactive: bool,
    },

    /// Analyze one file, print its report and write its preview
    Preview {
        /// Image file to preview
        file: PathBuf,
        /// PNG file to write (default: `<name>_preview.png`)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Side of the preview bounding box in pixels
        #[arg(long, value_name = "PX", default_value_t = DEFAULT_PREVIEW_BOUNDS)]
        size: u32,
    },

    /// List the colour presets
    Themes,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            dir,
            files,
            sort,
            desc,
            json,
            theme,
            preview,
            preview_out,
            preview_size,
            interactive,
        } => {
            let config = AnalyzerConfig {
                preview_bounds: preview_size,
                theme,
                ..AnalyzerConfig::default()
            };
            let scanner = ScannerService::with_extensions(&config.extensions);
            let paths = select_paths(&scanner, dir, files)?;

            let mut session = AnalyzerSession::new(config);
            if let Some(column) = sort {
                let order = if desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                session.sort_by(column, order);
            }

            run_batch(&mut session, paths).await?;

            if json {
                let skipped = session
                    .last_report()
                    .map(|report| report.failures.clone())
                    .unwrap_or_default();
                let output = serde_json::json!({
                    "rows": session.rows(),
                    "skipped": skipped,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", table::render_text(session.rows()));
                if let Some(report) = session.last_report() {
                    println!(
                        "\n✅ Analyzed {} of {} file(s), {} skipped",
                        report.analyzed,
                        report.total,
                        report.failures.len()
                    );
                }
            }

            if let Some(row) = preview {
                show_preview(&session, row, preview_out.as_deref())?;
            }

            if interactive {
                pick_rows(&session)?;
            }
        }

        Commands::Preview { file, out, size } => {
            let record = AnalyzerService::new()
                .analyze(&file)
                .with_context(|| format!("Failed to analyze {}", file.display()))?;
            let out = out.unwrap_or_else(|| default_preview_path(&file));

            let preview = PreviewService::with_bounds(size).preview(&record);
            println!("{}", preview.report);
            write_preview_image(&preview.image, &out)?;
        }

        Commands::Themes => {
            for name in ThemeName::ALL {
                let theme = name.theme();
                println!(
                    "{:<11} bg {}  fg {}  accent {}  font {} {}px",
                    name.to_string(),
                    theme.background,
                    theme.foreground,
                    theme.accent,
                    theme.font,
                    theme.font_size_px
                );
            }
        }
    }

    Ok(())
}

/// Resolve the command-line selection into the ordered list to analyze.
/// With nothing given, ask for a folder.
fn select_paths(
    scanner: &ScannerService,
    dir: Option<PathBuf>,
    files: Vec<PathBuf>,
) -> Result<Vec<PathBuf>> {
    if !files.is_empty() {
        let kept = scanner.filter_selection(&files);
        if kept.len() < files.len() {
            eprintln!(
                "⚠️  Ignoring {} file(s) without a supported extension",
                files.len() - kept.len()
            );
        }
        return Ok(kept);
    }

    let dir = match dir {
        Some(dir) => dir,
        None => {
            let default_dir = dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            let answer: String = Input::new()
                .with_prompt("Folder to analyze")
                .default(default_dir.display().to_string())
                .interact_text()?;
            PathBuf::from(answer)
        }
    };

    println!("▶ Scanning {}", dir.display());
    scanner
        .list_directory(&dir)
        .with_context(|| format!("Failed to list {}", dir.display()))
}

async fn run_batch(session: &mut AnalyzerSession, paths: Vec<PathBuf>) -> Result<()> {
    let progress = ProgressBar::new(100);
    progress.set_style(progress_style(&session.theme())?);

    session.start_batch(paths);
    while let Some(update) = session.next_update().await {
        match update {
            SessionUpdate::Progress(percent) => progress.set_position(percent as u64),
            SessionUpdate::RowInserted(row) => {
                if let Ok(record) = session.row(row) {
                    progress.set_message(record.filename.clone());
                }
            }
            SessionUpdate::Skipped(item) => {
                progress.println(format!("⚠️  Skipped {}: {}", item.path.display(), item.reason));
            }
            SessionUpdate::Finished(_) => progress.finish_and_clear(),
        }
    }
    Ok(())
}

fn progress_style(theme: &Theme) -> Result<ProgressStyle> {
    let template = format!(
        "{{spinner:.{color}}} [{{bar:40.{color}}}] {{pos:>3}}% {{msg}}",
        color = theme.terminal_color
    );
    Ok(ProgressStyle::with_template(&template)?.progress_chars("#>-"))
}

fn show_preview(session: &AnalyzerSession, row: usize, out: Option<&Path>) -> Result<()> {
    let preview = session.select(row)?;
    println!("\n{}", preview.report);
    if let Some(out) = out {
        write_preview_image(&preview.image, out)?;
    }
    Ok(())
}

fn pick_rows(session: &AnalyzerSession) -> Result<()> {
    if session.rows().is_empty() {
        return Ok(());
    }

    let items: Vec<String> = session
        .rows()
        .iter()
        .enumerate()
        .map(|(i, record)| format!("{:>3}  {}", i, record.filename))
        .collect();

    while let Some(row) = Select::new()
        .with_prompt("Preview which row? (Esc to quit)")
        .items(&items)
        .default(0)
        .interact_opt()?
    {
        show_preview(session, row, None)?;
    }
    Ok(())
}

fn write_preview_image(image: &PreviewImage, out: &Path) -> Result<()> {
    match image {
        PreviewImage::Rendered(img) => {
            PreviewService::new()
                .save(img, out)
                .with_context(|| format!("Failed to write preview {}", out.display()))?;
            println!("🖼  Preview written to {}", out.display());
        }
        PreviewImage::Unavailable(placeholder) => eprintln!("⚠️  {}", placeholder),
    }
    Ok(())
}

fn default_preview_path(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    PathBuf::from(format!("{}_preview.png", stem))
}

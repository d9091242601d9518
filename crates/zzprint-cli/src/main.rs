mod settings;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use settings::{HISTORY_FILE, SETTINGS_FILE, Settings};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use zzprint_layout::constants::pt_to_mm;
use zzprint_layout::layout::SheetGeometry;
use zzprint_layout::{
    DEFAULT_PREVIEW_SOURCES, FailurePolicy, Grid, InputFile, LayoutOptions, LayoutStatistics,
    PrintHistory, SUPPORTED_EXTENSIONS, SheetMargins, calculate_statistics, display_name,
    generate_preview, load_sources, save_pdf, scan_directory,
};
use zzprint_runtime::{AppLogger, PrintCommand, PrintUpdate, spawn_worker};

const DEFAULT_OUTPUT_NAME: &str = "invoices.pdf";

#[derive(Parser)]
#[command(name = "zzprint", about = "Lay out invoices for printing", version)]
struct Cli {
    /// Directory holding settings and print history
    #[arg(long, global = true, env = "ZZPRINT_HOME")]
    config_dir: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out invoices onto sheets and save one merged PDF
    Layout {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Output PDF file (defaults to the last save folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out invoices that were printed before
        #[arg(long)]
        skip_printed: bool,

        /// Neither check nor update the print history
        #[arg(long)]
        no_history: bool,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Write the first sheets of a layout
    Preview {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of sheets to include
        #[arg(long, default_value = "1")]
        sheets: usize,
    },

    /// Show layout statistics
    Stats {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Inspect or edit the print history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Inspect or edit saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recorded digests
    List,
    /// Forget every printed invoice
    Clear,
    /// Forget one invoice (a file, or its MD5 digest)
    Forget { file: PathBuf },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
    Reset,
}

#[derive(Args)]
struct LayoutArgs {
    /// Invoice file(s): PDF, OFD, PNG, JPG or BMP
    #[arg(short, long, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Import every supported file in a folder
    #[arg(short = 'd', long = "dir")]
    directory: Option<PathBuf>,

    /// Layout options JSON; command line flags override it
    #[arg(long)]
    options: Option<PathBuf>,

    /// Grid as columns×rows, e.g. 1x2 or 2x4 (defaults to the saved grid)
    #[arg(long, value_parser = parse_grid)]
    grid: Option<Grid>,

    /// Copies of each invoice, 1 to 4 (defaults to the saved count)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    copies: Option<u8>,

    /// Output paper size
    #[arg(long, default_value = "a4", value_enum)]
    paper: PaperArg,

    /// Output orientation
    #[arg(long, default_value = "portrait", value_enum)]
    orientation: OrientationArg,

    /// Cell order when copies repeat
    #[arg(long, default_value = "collated", value_enum)]
    order: OrderArg,

    /// Scaling mode
    #[arg(long, default_value = "fit", value_enum)]
    scaling: ScalingArg,

    /// Turn invoices a quarter when that shows them larger
    #[arg(long)]
    auto_rotate: bool,

    /// Draw dashed cut guides between cells
    #[arg(long)]
    cut_guides: bool,

    /// Space kept clear inside every cell, in mm
    #[arg(long)]
    padding_mm: Option<f32>,

    /// Sheet margin in mm (uniform on all sides)
    #[arg(long, default_value = "0.0")]
    margin_mm: f32,

    /// Fail on unreadable invoices instead of printing a placeholder
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Collated,
    Grouped,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScalingArg {
    Fit,
    ShrinkToFit,
}

impl From<PaperArg> for zzprint_layout::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for zzprint_layout::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<OrderArg> for zzprint_layout::PageOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Collated => Self::Collated,
            OrderArg::Grouped => Self::Grouped,
        }
    }
}

impl From<ScalingArg> for zzprint_layout::ScalingMode {
    fn from(arg: ScalingArg) -> Self {
        match arg {
            ScalingArg::Fit => Self::Fit,
            ScalingArg::ShrinkToFit => Self::ShrinkToFit,
        }
    }
}

fn parse_grid(s: &str) -> std::result::Result<Grid, String> {
    s.parse().map_err(|e: zzprint_layout::LayoutError| e.to_string())
}

impl LayoutArgs {
    /// Input files from `-i` followed by the folder import
    async fn collect_files(&self, settings: &mut Settings) -> Result<Vec<PathBuf>> {
        let mut files = self.input.clone();
        if let Some(dir) = &self.directory {
            let found = scan_directory(dir)
                .await
                .with_context(|| format!("Cannot read folder {}", dir.display()))?;
            log::info!("Found {} invoice(s) in {}", found.len(), dir.display());
            files.extend(found);
            settings.last_path = Some(dir.clone());
        } else if let Some(parent) = self.input.first().and_then(|p| p.parent()) {
            settings.last_path = Some(parent.to_path_buf());
        }

        if files.is_empty() {
            bail!(
                "No invoices given; pass files with -i or a folder with -d ({})",
                SUPPORTED_EXTENSIONS.join(", ")
            );
        }
        Ok(files)
    }

    /// Build layout options for `files`, starting from the options file if any
    async fn to_options(&self, files: Vec<PathBuf>, settings: &Settings) -> Result<LayoutOptions> {
        let mut options = match &self.options {
            Some(path) => LayoutOptions::load(path)
                .await
                .with_context(|| format!("Cannot load options {}", path.display()))?,
            None => LayoutOptions {
                grid: settings.grid,
                copies: settings.copies,
                ..LayoutOptions::default()
            },
        };

        // Per-file copies from the options file survive for listed files
        let known = std::mem::take(&mut options.input_files);
        options.input_files = files
            .into_iter()
            .map(|path| {
                known
                    .iter()
                    .find(|f| f.path == path)
                    .cloned()
                    .unwrap_or_else(|| InputFile::new(path))
            })
            .collect();

        if let Some(grid) = self.grid {
            options.grid = grid;
        }
        if let Some(copies) = self.copies {
            options.copies = copies;
        }
        if let Some(padding) = self.padding_mm {
            options.cell_padding_mm = padding;
        }
        if self.options.is_none() || self.margin_mm > 0.0 {
            options.sheet_margins = SheetMargins::uniform(self.margin_mm);
        }
        if self.options.is_none() {
            options.paper_size = self.paper.into();
            options.orientation = self.orientation.into();
            options.page_order = self.order.into();
            options.scaling_mode = self.scaling.into();
        }
        options.auto_rotate |= self.auto_rotate;
        options.cut_guides |= self.cut_guides;
        if self.strict {
            options.failure_policy = FailurePolicy::Abort;
        }

        options.validate()?;
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    AppLogger::new(1000)
        .with_level(level)
        .with_stderr(true)
        .init()
        .context("Failed to install logger")?;

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => dirs::config_dir()
            .map(|dir| dir.join("zzprint"))
            .context("No config directory; pass --config-dir")?,
    };
    let settings_path = config_dir.join(SETTINGS_FILE);
    let history_path = config_dir.join(HISTORY_FILE);
    let mut settings = Settings::load(&settings_path).await;

    match cli.command {
        Commands::Layout {
            layout,
            output,
            skip_printed,
            no_history,
            stats_only,
        } => {
            let files = layout.collect_files(&mut settings).await?;
            let output = match output {
                Some(path) => path,
                None => settings
                    .last_save_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(DEFAULT_OUTPUT_NAME),
            };

            let (command_tx, mut update_rx) = spawn_worker();

            let files = if no_history {
                files
            } else {
                command_tx.send(PrintCommand::CheckHistory {
                    files: files.clone(),
                    history_path: history_path.clone(),
                })?;
                let printed = match next_update(&mut update_rx).await? {
                    PrintUpdate::PrintedBefore { files } => files,
                    other => bail!("Unexpected worker update: {:?}", other),
                };
                for file in &printed {
                    log::warn!("Already printed: {}", display_name(file));
                }
                if skip_printed {
                    let remaining: Vec<_> =
                        files.into_iter().filter(|f| !printed.contains(f)).collect();
                    if remaining.is_empty() {
                        bail!("Every invoice was printed before; nothing to do");
                    }
                    remaining
                } else {
                    files
                }
            };

            let options = layout.to_options(files, &settings).await?;

            command_tx.send(PrintCommand::CalculateStats {
                options: options.clone(),
            })?;
            match next_update(&mut update_rx).await? {
                PrintUpdate::StatsCalculated { stats } => print_statistics(&stats, &options),
                other => bail!("Unexpected worker update: {:?}", other),
            }

            if stats_only {
                return Ok(());
            }

            command_tx.send(PrintCommand::Generate {
                options,
                output_path: output.clone(),
                history_path: (!no_history).then_some(history_path),
            })?;
            let sheet_count = loop {
                match next_update(&mut update_rx).await? {
                    PrintUpdate::Progress {
                        operation,
                        current,
                        total,
                    } => log::debug!("{}: {}/{}", operation, current, total),
                    PrintUpdate::Complete { sheet_count, .. } => break sheet_count,
                    other => log::debug!("Ignoring worker update: {:?}", other),
                }
            };

            settings.last_save_path = output.parent().map(Path::to_path_buf);
            settings.save(&settings_path).await?;
            println!("Laid out {} sheet(s) → {}", sheet_count, output.display());
        }

        Commands::Preview {
            layout,
            output,
            sheets,
        } => {
            let mut files = layout.collect_files(&mut settings).await?;
            if files.len() > DEFAULT_PREVIEW_SOURCES {
                log::info!(
                    "Previewing the first {} of {} invoices",
                    DEFAULT_PREVIEW_SOURCES,
                    files.len()
                );
                files.truncate(DEFAULT_PREVIEW_SOURCES);
            }
            let options = layout.to_options(files, &settings).await?;

            let sources = load_sources(&options.input_files, options.failure_policy).await?;
            let preview = generate_preview(&sources, &options, sheets).await?;
            let page_count = preview.get_pages().len();
            save_pdf(preview, &output).await?;
            settings.save(&settings_path).await?;
            println!("Preview of {} sheet(s) → {}", page_count, output.display());
        }

        Commands::Stats { layout } => {
            let files = layout.collect_files(&mut settings).await?;
            let options = layout.to_options(files, &settings).await?;
            let sources = load_sources(&options.input_files, options.failure_policy).await?;
            let stats = calculate_statistics(&sources, &options)?;
            print_statistics(&stats, &options);
            settings.save(&settings_path).await?;
        }

        Commands::History { action } => {
            let mut history = PrintHistory::load(&history_path).await?;
            match action {
                HistoryAction::List => {
                    if history.is_empty() {
                        println!("Print history is empty");
                    }
                    for hash in history.iter() {
                        println!("{}", hash);
                    }
                }
                HistoryAction::Clear => {
                    let count = history.len();
                    history.clear();
                    history.save().await?;
                    println!("Forgot {} printed invoice(s)", count);
                }
                HistoryAction::Forget { file } => {
                    let hash = digest_for(&file).await?;
                    if history.forget(&hash) {
                        history.save().await?;
                        println!("Forgot {}", file.display());
                    } else {
                        println!("{} is not in the print history", file.display());
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                for line in settings.describe() {
                    println!("{}", line);
                }
            }
            ConfigAction::Set { key, value } => {
                settings.set(&key, &value)?;
                settings.save(&settings_path).await?;
                println!("Saved {} = {}", key, value);
            }
            ConfigAction::Reset => {
                Settings::default().save(&settings_path).await?;
                println!("Settings reset to defaults");
            }
        },
    }

    Ok(())
}

/// Wait for the next worker update, turning worker errors into failures
async fn next_update(update_rx: &mut mpsc::UnboundedReceiver<PrintUpdate>) -> Result<PrintUpdate> {
    match update_rx.recv().await {
        Some(PrintUpdate::Error { message }) => bail!(message),
        Some(update) => Ok(update),
        None => bail!("Layout worker stopped unexpectedly"),
    }
}

/// MD5 digest for a history entry: an existing file is hashed, anything
/// else must already be a digest
async fn digest_for(file: &Path) -> Result<String> {
    if tokio::fs::try_exists(file).await.unwrap_or(false) {
        return Ok(PrintHistory::hash_file(file).await?);
    }
    let text = file.to_string_lossy();
    if text.len() == 32 && text.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(text.to_ascii_lowercase())
    } else {
        bail!("{} is neither a file nor an MD5 digest", file.display())
    }
}

fn print_statistics(stats: &LayoutStatistics, options: &LayoutOptions) {
    let geometry = SheetGeometry::from_options(options);
    println!("Layout Statistics:");
    println!("  Invoices: {}", stats.source_documents);
    println!("  Source pages: {}", stats.source_pages);
    println!(
        "  Cells per sheet: {} ({})",
        stats.cells_per_sheet, options.grid
    );
    println!(
        "  Cell size: {:.1} × {:.1} mm",
        pt_to_mm(geometry.cell_width_pt),
        pt_to_mm(geometry.cell_height_pt)
    );
    println!("  Placed cells: {}", stats.placed_cells);
    println!("  Output sheets: {}", stats.output_sheets);
    println!("  Empty cells: {}", stats.empty_cells);
    if stats.placeholder_sources > 0 {
        println!("  Placeholders: {}", stats.placeholder_sources);
    }
}

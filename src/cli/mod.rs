//! # CLI Module
//!
//! Command-line front end for the media organizer.
//!
//! ## Usage
//! ```bash
//! # Organize a folder (moves files by default)
//! media-organize run ~/Camera ~/Library
//!
//! # Copy instead, four hashing threads
//! media-organize run ~/Camera ~/Library --mode copy --concurrency 4
//!
//! # See what would happen, as JSON
//! media-organize analyze ~/Camera --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_dedup_organizer::config::Settings;
use media_dedup_organizer::core::grouper::ReadErrorPolicy;
use media_dedup_organizer::core::organize::OperationMode;
use media_dedup_organizer::core::pipeline::{Analysis, Pipeline, PipelineBuilder};
use media_dedup_organizer::core::reporter::{export_json, export_to_file, format_bytes, Report};
use media_dedup_organizer::error::Result;
use media_dedup_organizer::events::{
    Event, EventChannel, EventReceiver, HashEvent, OrganizeEvent, PipelineEvent,
};
use media_dedup_organizer::init_tracing;
use std::path::PathBuf;
use std::thread;

/// Media Organizer - sort photos and videos by date, set duplicates aside
#[derive(Parser, Debug)]
#[command(name = "media-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Organize SOURCE into TARGET/<YYYY>/<Month>, duplicates into TARGET/Duplicates
    Run {
        /// Folder to organize
        source: PathBuf,

        /// Root of the organized library
        target: PathBuf,

        /// Move (default) or copy files
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Write the report to a file (.json for JSON, anything else for text)
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Find duplicates in SOURCE without changing anything
    Analyze {
        /// Folder to analyze
        source: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Files hashed at once (default: half the CPU cores)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Recognized extensions, comma separated (e.g. jpg,heic,mov)
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Ignore hidden files and folders
    #[arg(long)]
    skip_hidden: bool,

    /// Report symbolic links instead of following them
    #[arg(long)]
    no_follow_symlinks: bool,

    /// Leave unreadable files in place instead of organizing them as unique
    #[arg(long)]
    skip_unreadable: bool,

    /// JSON settings file; flags given here take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Move files into the library
    Move,
    /// Copy files, leaving the originals
    Copy,
}

impl From<Mode> for OperationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Move => OperationMode::Move,
            Mode::Copy => OperationMode::Copy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            target,
            mode,
            report,
            common,
        } => {
            init_tracing(common.verbose);
            let mut builder = configure(Pipeline::builder().source(source).target(target), &common)?;
            if let Some(mode) = mode {
                builder = builder.mode(mode.into());
            }
            run_organize(builder.build(), common.output, report)
        }
        Commands::Analyze { source, common } => {
            init_tracing(common.verbose);
            let builder = configure(Pipeline::builder().source(source), &common)?;
            run_analyze(builder.build(), common.output)
        }
    }
}

/// Settings file first, then flags on top
fn configure(mut builder: PipelineBuilder, args: &CommonArgs) -> Result<PipelineBuilder> {
    if let Some(path) = &args.config {
        builder = Settings::load(path)?.apply(builder);
    }
    if let Some(concurrency) = args.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(extensions) = &args.extensions {
        builder = builder.extensions(extensions.iter().cloned());
    }
    if args.skip_hidden {
        builder = builder.include_hidden(false);
    }
    if args.no_follow_symlinks {
        builder = builder.follow_symlinks(false);
    }
    if args.skip_unreadable {
        builder = builder.read_error_policy(ReadErrorPolicy::Skip);
    }
    Ok(builder)
}

fn run_organize(pipeline: Pipeline, output: OutputFormat, report_path: Option<PathBuf>) -> Result<()> {
    let term = Term::stderr();
    if matches!(output, OutputFormat::Pretty) {
        print_header(&term);
    }

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, matches!(output, OutputFormat::Pretty));

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let report = result?;

    if let Some(path) = report_path {
        if let Err(e) = export_to_file(&report, &path) {
            term.write_line(&format!(
                "{} could not write report to {}: {}",
                style("!").red().bold(),
                path.display(),
                e
            ))
            .ok();
        }
    }

    match output {
        OutputFormat::Pretty => print_report(&term, &report),
        OutputFormat::Json => print_json(&term, &report),
    }

    Ok(())
}

fn run_analyze(pipeline: Pipeline, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    if matches!(output, OutputFormat::Pretty) {
        print_header(&term);
    }

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, matches!(output, OutputFormat::Pretty));

    let result = pipeline.analyze_with_events(&sender);
    drop(sender);
    event_thread.join().ok();

    let analysis = result?;
    match output {
        OutputFormat::Pretty => print_analysis(&term, &analysis),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "files_scanned": analysis.files_scanned,
                "duplicate_count": analysis.ledger.count(),
                "reclaimed_bytes": analysis.ledger.reclaimed_bytes,
                "groups": analysis.duplicate_groups().map(|g| {
                    serde_json::json!({
                        "keeper": g.keeper(),
                        "duplicates": g.duplicates(),
                        "size": g.size,
                    })
                }).collect::<Vec<_>>(),
                "errors": analysis.errors,
                "cancelled": analysis.cancelled,
            });
            match serde_json::to_string_pretty(&value) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    term.write_line(&format!("could not encode JSON: {e}")).ok();
                }
            }
        }
    }

    Ok(())
}

/// Draw progress from the event stream until the sender is dropped
fn spawn_progress(receiver: EventReceiver, show: bool) -> thread::JoinHandle<()> {
    let progress = if show {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    // Handle events in a separate thread
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Hash(HashEvent::Started { total_files, .. }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                }
                Event::Organize(OrganizeEvent::Started { total_files, .. }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                }
                Event::Hash(HashEvent::Progress(p)) | Event::Organize(OrganizeEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    pb.set_message(format!("{} {}", p.phase, p.current_item));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
    })
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("Media Organizer").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_report(term: &Term, report: &Report) {
    let summary = report.summary();
    let mut lines = summary.lines();

    if let Some(title) = lines.next() {
        let marker = if report.cancelled {
            style("■").yellow().bold()
        } else {
            style("✓").green().bold()
        };
        term.write_line(&format!("{marker} {}", style(title).bold())).ok();
    }
    for line in lines {
        if line.is_empty() {
            term.write_line("").ok();
        } else {
            term.write_line(&format!("  {line}")).ok();
        }
    }

    if report.has_details() {
        term.write_line("").ok();
        term.write_str(&report.details()).ok();
    }
}

fn print_json(term: &Term, report: &Report) {
    let stdout = std::io::stdout();
    if let Err(e) = export_json(report, stdout.lock()) {
        term.write_line(&format!("could not write JSON: {e}")).ok();
    }
}

fn print_analysis(term: &Term, analysis: &Analysis) {
    term.write_line(&format!(
        "{} Analysis Complete{}",
        style("✓").green().bold(),
        if analysis.cancelled { " (cancelled)" } else { "" }
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned",
        style(analysis.files_scanned).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates, {} reclaimable",
        style(analysis.ledger.count()).cyan(),
        style(format_bytes(analysis.ledger.reclaimed_bytes)).yellow()
    ))
    .ok();
    term.write_line("").ok();

    for (i, group) in analysis.duplicate_groups().enumerate() {
        term.write_line(&format!(
            "  {} {} files, {} each",
            style(format!("Group {}:", i + 1)).bold(),
            group.members.len(),
            format_bytes(group.size)
        ))
        .ok();
        term.write_line(&format!(
            "    {} {}",
            style("★").green(),
            group.keeper().display()
        ))
        .ok();
        for path in group.duplicates() {
            term.write_line(&format!("    {} {}", style("○").dim(), path.display()))
                .ok();
        }
        term.write_line("").ok();
    }

    for entry in &analysis.errors {
        term.write_line(&format!(
            "  {} {} {}: {}",
            style("!").red(),
            entry.op,
            entry.path.display(),
            entry.message
        ))
        .ok();
    }

    term.write_line(&format!(
        "{}",
        style("Nothing was moved. Run `media-organize run` to organize.").dim()
    ))
    .ok();
}

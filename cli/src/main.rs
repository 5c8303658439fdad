//! pdftrail CLI - forensic PDF revision and timeline analysis

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdftrail::{
    document_rows, timeline_rows, to_json, AnalyzeOptions, Analyzer, CommandDump, DocumentRow,
    Error, JsonFormat,
};

#[derive(Parser)]
#[command(name = "pdftrail")]
#[command(version)]
#[command(about = "Reconstruct PDF revision history and modification timelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every PDF in a directory and emit the report + timeline artifact
    Scan {
        /// Directory containing PDF documents
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// External object dump program to invoke
        #[arg(long, value_name = "PROGRAM", default_value = "pdf-parser")]
        tool: PathBuf,

        /// Per-object dump timeout in seconds
        #[arg(long, value_name = "SECONDS", default_value = "30")]
        timeout: u64,

        /// Document worker threads (0 = auto)
        #[arg(long, default_value = "0")]
        workers: usize,

        /// Concurrent dump calls per document
        #[arg(long, default_value = "4")]
        object_workers: usize,

        /// Process documents and objects one at a time
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Report a single document (metadata, structure, objects)
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// External object dump program to invoke
        #[arg(long, value_name = "PROGRAM", default_value = "pdf-parser")]
        tool: PathBuf,

        /// Per-object dump timeout in seconds
        #[arg(long, value_name = "SECONDS", default_value = "30")]
        timeout: u64,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            input,
            output,
            tool,
            timeout,
            workers,
            object_workers,
            sequential,
            compact,
        } => cmd_scan(
            &input,
            output.as_deref(),
            &tool,
            timeout,
            workers,
            object_workers,
            sequential,
            compact,
        ),
        Commands::Info {
            input,
            tool,
            timeout,
            compact,
        } => cmd_info(&input, &tool, timeout, compact),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_scan(
    input: &Path,
    output: Option<&Path>,
    tool: &Path,
    timeout: u64,
    workers: usize,
    object_workers: usize,
    sequential: bool,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Listing documents...");
    let paths = list_pdfs(input)?;
    if paths.is_empty() {
        pb.finish_and_clear();
        println!("{}", "No PDF documents found; nothing to do.".yellow());
        return Ok(());
    }
    pb.inc(1);

    pb.set_message(format!("Analyzing {} documents...", paths.len()));
    let mut options = AnalyzeOptions::new()
        .with_workers(workers)
        .with_object_workers(object_workers)
        .with_dump_timeout(Duration::from_secs(timeout));
    if sequential {
        options = options.sequential();
    }
    let analyzer = Analyzer::new(Arc::new(CommandDump::new(tool)), options);
    let run = analyzer.analyze_paths(&paths)?;
    pb.inc(1);

    pb.set_message("Building timeline...");
    let timeline = match run.timeline() {
        Ok(events) => events,
        Err(Error::NoTimelineData) => {
            log::info!("no timeline data across {} documents", run.reports.len());
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };
    pb.inc(1);
    pb.finish_and_clear();

    for failure in &run.failures {
        eprintln!(
            "{} {}: {}",
            "Skipped".yellow().bold(),
            failure.path.display(),
            failure.error
        );
    }

    let documents: Vec<DocumentRow> = run.reports.iter().flat_map(document_rows).collect();
    let artifact = serde_json::json!({
        "documents": documents,
        "timeline": timeline_rows(&timeline),
    });
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(&artifact, format)?;

    match output {
        Some(path) => {
            fs::write(path, &json)?;
            println!(
                "{} {} documents, {} timeline events -> {}",
                "Done:".green().bold(),
                run.reports.len(),
                timeline.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_info(
    input: &Path,
    tool: &Path,
    timeout: u64,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = AnalyzeOptions::new().with_dump_timeout(Duration::from_secs(timeout));
    let analyzer = Analyzer::new(Arc::new(CommandDump::new(tool)), options);
    let report = analyzer.analyze_document(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", to_json(&report, format)?);
    Ok(())
}

/// List `*.pdf` files in a directory, sorted for deterministic output.
fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

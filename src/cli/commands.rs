//! Command implementations

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::FsIntakeAdapter;
use crate::app::container::AppContainer;
use crate::app::pipeline::RenamePipeline;
use crate::cli::args::{
    FrameArgs, LogoAction, LogoArgs, OutputFormat, RenameArgs, SanitizeArgs, SuggestArgs,
};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{extension_of, sanitize_filename};
use crate::ports::PipelineObserver;
use crate::utils::{ellipsize, format_file_size, format_megabytes, progress_bar};

/// Prints a progress line on stderr whenever a record changes
pub struct ProgressPrinter;

impl PipelineObserver for ProgressPrinter {
    fn record_changed(&self, record: &FileRecord) {
        let detail = match (&record.status, &record.exported_to) {
            (FileStatus::Renamed, Some(path)) => format!("saved as {}", path.display()),
            _ => record.suggested_name.clone(),
        };
        eprintln!(
            "{} {:>3}% {} | {} {}",
            progress_bar(record.progress, 20),
            record.progress,
            record.original_name,
            record.status.label(),
            detail
        );
    }
}

/// Execute the rename command
pub async fn rename(container: &dyn AppContainer, args: RenameArgs) -> Result<()> {
    info!("Starting rename operation");

    let mut pipeline = container.rename_pipeline();
    load_inputs(&mut pipeline, &args.inputs, &args.only)?;
    ensure_enabled(&pipeline, args.format)?;

    if args.format == OutputFormat::Text {
        pipeline.add_observer(Arc::new(ProgressPrinter));
    }
    run_analysis(&mut pipeline).await?;

    if !pipeline.auto_download() {
        if args.yes {
            download_all(&mut pipeline)?;
        } else if io::stdin().is_terminal() {
            review(&mut pipeline).await?;
        } else {
            eprintln!("Nothing saved. Run again with --yes to save every analyzed file.");
        }
    }

    render(&pipeline, args.format)?;
    info!("Rename operation completed");
    Ok(())
}

/// Execute the suggest command
pub async fn suggest(container: &dyn AppContainer, args: SuggestArgs) -> Result<()> {
    info!("Starting suggest operation");

    let mut pipeline = container.rename_pipeline();
    pipeline.set_auto_download(false);
    load_inputs(&mut pipeline, &args.inputs, &args.only)?;
    ensure_enabled(&pipeline, args.format)?;

    if args.format == OutputFormat::Text {
        pipeline.add_observer(Arc::new(ProgressPrinter));
    }
    run_analysis(&mut pipeline).await?;

    render(&pipeline, args.format)
}

/// Execute the frame command
pub async fn frame(container: &dyn AppContainer, args: FrameArgs) -> Result<()> {
    info!("Extracting frame from {}", args.input.display());

    let source = FsIntakeAdapter::new()
        .read_source(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    if !source.is_video() {
        warn!("{} does not look like a video, trying anyway", source.name());
    }

    let frame = container
        .frame_port()
        .extract_frame(&source, container.config().frame_at_seconds)
        .await
        .with_context(|| format!("Failed to extract a frame from {}", source.name()))?;
    let jpeg = frame.decode()?;

    std::fs::write(&args.out, &jpeg)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    println!("{} ({})", args.out.display(), format_file_size(jpeg.len() as u64));
    Ok(())
}

/// Execute the sanitize command
pub fn sanitize(args: &SanitizeArgs) -> Result<()> {
    println!("{}", sanitize_filename(&args.title, &args.ext));
    Ok(())
}

/// Execute the logo command; storage problems are reported, never fatal
pub fn logo(container: &dyn AppContainer, args: LogoArgs) -> Result<()> {
    let logo = container.logo_interactor();

    match args.action {
        LogoAction::Set { image } => match logo.set_from_file(&image) {
            Ok(saved) => println!("Logo saved ({})", saved.mime_type()),
            Err(e) => print_banner(&e.to_string()),
        },
        LogoAction::Show { uri } => match logo.current() {
            Some(current) if uri => println!("{}", current),
            Some(current) => {
                let size = current.decode().map(|bytes| bytes.len() as u64).unwrap_or(0);
                println!("{} logo, {}", current.mime_type(), format_file_size(size));
            }
            None => println!("No logo set"),
        },
        LogoAction::Remove => {
            if logo.remove() {
                println!("Logo removed");
            } else {
                print_banner("Could not remove the logo");
            }
        }
    }
    Ok(())
}

/// Read the inputs into the pipeline and deselect anything `--only` excludes
fn load_inputs(pipeline: &mut RenamePipeline, inputs: &[PathBuf], only: &[String]) -> Result<()> {
    let sources = FsIntakeAdapter::new()
        .read_all(inputs)
        .context("Failed to read input files")?;
    let report = pipeline.intake(sources);
    if report.accepted.is_empty() {
        warn!("No video files found in the given inputs");
    }
    for name in &report.skipped_non_video {
        eprintln!("Skipping non-video file: {}", name);
    }
    for name in &report.skipped_duplicates {
        eprintln!("Skipping duplicate file name: {}", name);
    }

    if !only.is_empty() {
        let excluded: Vec<FileId> = pipeline
            .records()
            .iter()
            .filter(|r| !only.contains(&r.original_name))
            .map(|r| r.id)
            .collect();
        for id in excluded {
            pipeline.set_selected(id, false)?;
        }
    }
    Ok(())
}

/// Show the configuration banner and stop when analysis is unavailable
fn ensure_enabled(pipeline: &RenamePipeline, format: OutputFormat) -> Result<()> {
    if let Some(reason) = pipeline.configuration_error() {
        let reason = reason.to_string();
        print_banner(&reason);
        render(pipeline, format)?;
        return Err(DomainError::Configuration(reason).into());
    }
    Ok(())
}

async fn run_analysis(pipeline: &mut RenamePipeline) -> Result<()> {
    match pipeline.analyze_selected().await {
        Ok(summary) => {
            info!(
                "{} analyzed, {} failed, {} saved",
                summary.analyzed.len(),
                summary.failed.len(),
                summary.exported.len()
            );
            Ok(())
        }
        Err(DomainError::NothingEligible(message)) => {
            print_banner(&message);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn download_all(pipeline: &mut RenamePipeline) -> Result<()> {
    match pipeline.download_selected() {
        Ok(summary) => {
            info!("{} saved, {} failed", summary.exported.len(), summary.failed.len());
            Ok(())
        }
        Err(DomainError::NothingEligible(message)) => {
            print_banner(&message);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Walk the user through each analyzed or failed record
async fn review(pipeline: &mut RenamePipeline) -> Result<()> {
    let pending: Vec<FileId> = pipeline
        .records()
        .iter()
        .filter(|r| r.is_selected && matches!(r.status, FileStatus::Analyzed | FileStatus::Error))
        .map(|r| r.id)
        .collect();

    for id in pending {
        loop {
            let record = pipeline.record(id)?;
            let original_name = record.original_name.clone();

            match record.status {
                FileStatus::Analyzed => {
                    let target = sanitize_filename(&record.suggested_name, extension_of(&original_name));
                    let question = format!("{} -> {}  [a]ccept, [e]dit, [s]kip? ", original_name, target);
                    let Some(answer) = ask(&question)? else { return Ok(()) };
                    match answer.as_str() {
                        "" | "a" | "accept" | "y" => {
                            if let Err(e) = pipeline.download(id) {
                                print_banner(&format!("{}: {}", original_name, e));
                            }
                            break;
                        }
                        "e" | "edit" => {
                            let Some(title) = ask("New title: ")? else { return Ok(()) };
                            if !title.is_empty() {
                                pipeline.set_suggested_name(id, title)?;
                            }
                        }
                        "s" | "skip" | "n" => break,
                        _ => {}
                    }
                }
                FileStatus::Error => {
                    let question = format!("{} failed ({})  [r]etry, [s]kip? ", original_name, record.suggested_name);
                    let Some(answer) = ask(&question)? else { return Ok(()) };
                    match answer.as_str() {
                        "r" | "retry" => {
                            if let Err(e) = pipeline.retry(id).await {
                                print_banner(&format!("{}: {}", original_name, e));
                            }
                        }
                        "" | "s" | "skip" | "n" => break,
                        _ => {}
                    }
                }
                _ => break,
            }
        }
    }
    Ok(())
}

/// Prompt on stderr and read one trimmed line; `None` at end of input
fn ask(question: &str) -> Result<Option<String>> {
    eprint!("{}", question);
    io::stderr().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read answer")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Print the working set in the requested format
pub fn render(pipeline: &RenamePipeline, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(pipeline.records())
                .context("Failed to serialize records to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(pipeline.records())
                .context("Failed to serialize records to YAML")?;
            print!("{}", yaml);
        }
        OutputFormat::Text => display_records(pipeline),
    }
    Ok(())
}

/// Display records in human-readable format
fn display_records(pipeline: &RenamePipeline) {
    let records = pipeline.records();
    println!();
    println!("Files ({} of {} selected)", pipeline.selected_count(), records.len());
    println!("=====");

    if records.is_empty() {
        println!("No video files.");
    }

    for record in records {
        println!(
            "{} {}  {:<17} {:>3}%  {:>10}  {}",
            if record.is_selected { "[x]" } else { "[ ]" },
            record.id.short(),
            record.status.label(),
            record.progress,
            format_megabytes(record.size_bytes),
            record.original_name
        );
        if record.has_suggested_name() {
            println!("    -> {}", ellipsize(&record.suggested_name, 120));
        }
        if let Some(path) = &record.exported_to {
            println!("    saved as {}", path.display());
        }
    }

    if let Some(message) = pipeline.global_error() {
        print_banner(message);
    }
}

fn print_banner(message: &str) {
    eprintln!();
    eprintln!("! {}", message);
}

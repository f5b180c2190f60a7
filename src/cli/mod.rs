//! # CLI Module
//!
//! Command-line interface for the media reconciler.
//!
//! ## Usage
//! ```bash
//! # Copy new media from a card into the library
//! media-reconcile /Volumes/card/DCIM --dest ~/Pictures/library
//!
//! # Preview only
//! media-reconcile /Volumes/card/DCIM --dest ~/Pictures/library --dry-run
//!
//! # Move instead of copy, raw files only
//! media-reconcile ~/Downloads/import --dest ~/Pictures/library --move --filter raf
//!
//! # JSON output
//! media-reconcile ~/import --dest ~/library --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_reconciler::core::pool::CancellationToken;
use media_reconciler::core::reconcile::{
    ApplyOutcome, ApplyReport, PlanSummary, ReconcileConfig, Reconciler, TransferMode,
};
use media_reconciler::core::scanner::MediaFilter;
use media_reconciler::error::Result;
use media_reconciler::events::{
    ApplyEvent, Event, EventChannel, EventReceiver, EventSender, PlanEvent, ScanEvent,
};
use std::path::PathBuf;
use std::thread;

const CONFLICT_GUIDANCE: &str = "File conflicts need to be resolved before application can proceed. Resolve them and rerun application to continue.";

/// Media Reconciler - organize camera media by capture date, without duplicates
#[derive(Parser, Debug)]
#[command(name = "media-reconcile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Unorganized source directories
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Organized destination directory
    #[arg(short, long)]
    dest: PathBuf,

    /// Move new files instead of copying them
    #[arg(long = "move")]
    move_files: bool,

    /// Build and print the plan without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Media types to process, comma separated (jpg,raf,mov)
    #[arg(short, long)]
    filter: Option<MediaFilter>,

    /// Place camera JPEGs next to raw files instead of in a sooc folder
    #[arg(long)]
    no_sooc: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    media_reconciler::init_tracing_with(if cli.verbose {
        "media_reconciler=debug"
    } else {
        "warn"
    });

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_token.cancel();
        eprintln!("\nInterrupt received, stopping after the current step...");
    }) {
        tracing::warn!(error = %e, "Could not install Ctrl-C handler");
    }

    let config = ReconcileConfig::builder()
        .sources(cli.sources.iter())
        .destination(&cli.dest)
        .mode(if cli.move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        })
        .filter(cli.filter.clone().unwrap_or_default())
        .no_sooc(cli.no_sooc)
        .build()?;

    let reconciler = Reconciler::new(config, cancel);
    let term = Term::stderr();

    if cli.output == OutputFormat::Pretty {
        term.write_line(&format!(
            "{} {}",
            style("Media Reconciler").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("building execution plan... (depending on disk used and number of files this might take a while)")
            .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::unbounded();
    let output = cli.output;
    let verbose = cli.verbose;
    let event_thread = thread::spawn(move || render_events(receiver, output, verbose));

    let outcome = plan_and_apply(&reconciler, cli.dry_run, &sender);

    drop(sender);
    event_thread.join().ok();

    let (summary, report) = outcome?;
    match cli.output {
        OutputFormat::Pretty => print_pretty_outcome(&term, report.as_ref(), cli.dry_run),
        OutputFormat::Json => print_json_outcome(&summary, report.as_ref())?,
    }

    Ok(())
}

fn plan_and_apply(
    reconciler: &Reconciler,
    dry_run: bool,
    events: &EventSender,
) -> Result<(PlanSummary, Option<ApplyReport>)> {
    let plan = reconciler.plan(events)?;
    let summary = plan.summary();
    if dry_run {
        return Ok((summary, None));
    }
    let report = reconciler.apply(&plan, events)?;
    Ok((summary, Some(report)))
}

fn render_events(receiver: EventReceiver, output: OutputFormat, verbose: bool) {
    if output == OutputFormat::Json {
        // Drain so senders never see a full channel.
        for _ in receiver.iter() {}
        return;
    }

    let term = Term::stderr();
    let mut apply_bar: Option<ProgressBar> = None;

    for event in receiver.iter() {
        match event {
            Event::Scan(ScanEvent::Discovered { root, files, .. }) => {
                term.write_line(&format!("  scanning {}: {} files", root.display(), files))
                    .ok();
            }
            Event::Progress(p) => {
                term.write_line(&format!(
                    "    {} {}/{} files ({}%)",
                    style(p.phase).dim(),
                    p.processed,
                    p.total,
                    p.percent
                ))
                .ok();
            }
            Event::Plan(PlanEvent::Resolving { files }) => {
                term.write_line(&format!("  calculating destinations for {files} files"))
                    .ok();
            }
            Event::Plan(PlanEvent::Built { summary }) => {
                term.write_line("").ok();
                print!("{summary}");
                println!();
            }
            Event::Apply(ApplyEvent::Started { actions }) => {
                let pb = ProgressBar::new(actions as u64);
                if let Ok(bar_style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                {
                    pb.set_style(bar_style.progress_chars("█▓░"));
                }
                pb.set_message("Applying plan");
                apply_bar = Some(pb);
            }
            Event::Apply(ApplyEvent::ActionApplied { message, .. }) => {
                if let Some(ref pb) = apply_bar {
                    if verbose {
                        pb.println(format!("  {message}"));
                    }
                    pb.inc(1);
                }
            }
            Event::Apply(ApplyEvent::Completed { .. } | ApplyEvent::Interrupted { .. }) => {
                if let Some(pb) = apply_bar.take() {
                    pb.finish_and_clear();
                }
            }
            Event::Apply(ApplyEvent::Refused { conflicts }) => {
                term.write_line(&format!(
                    "  {} {} conflict(s) found",
                    style("✗").red().bold(),
                    conflicts
                ))
                .ok();
            }
            Event::Scan(_) => {}
        }
    }

    if let Some(pb) = apply_bar {
        pb.abandon();
    }
}

fn print_pretty_outcome(term: &Term, report: Option<&ApplyReport>, dry_run: bool) {
    let Some(report) = report else {
        if dry_run {
            term.write_line(&format!(
                "{}",
                style("Dry run: no files were changed.").dim()
            ))
            .ok();
        }
        return;
    };

    match report.outcome {
        ApplyOutcome::Completed => {
            term.write_line(&format!(
                "{} Applied {} action(s)",
                style("✓").green().bold(),
                style(report.applied).cyan()
            ))
            .ok();
        }
        ApplyOutcome::Refused => {
            term.write_line(&format!("  {}", style(CONFLICT_GUIDANCE).yellow()))
                .ok();
        }
        ApplyOutcome::Interrupted => {
            term.write_line(&format!(
                "{} Interrupted after {} action(s); applied changes were kept",
                style("!").yellow().bold(),
                report.applied
            ))
            .ok();
        }
    }
}

fn print_json_outcome(summary: &PlanSummary, report: Option<&ApplyReport>) -> Result<()> {
    let output = serde_json::json!({
        "plan": summary,
        "apply": report,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

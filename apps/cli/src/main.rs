use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use audiostudio_core::{
    AnalysisState, Catalog, FixedAnalyzer, StudioConfig, StudioError, StudioEvent, StudioSession,
    Subscription, TrackCategory, VideoUpload, format_analysis_readable,
    format_export_plan_readable, format_track_line,
};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, prelude::*};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for TrackCategory (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliCategory {
    Music,
    Sfx,
    Voice,
}

impl From<CliCategory> for TrackCategory {
    fn from(cli: CliCategory) -> Self {
        match cli {
            CliCategory::Music => TrackCategory::Music,
            CliCategory::Sfx => TrackCategory::Sfx,
            CliCategory::Voice => TrackCategory::Voice,
        }
    }
}

#[derive(Parser)]
#[command(name = "audiostudio")]
#[command(about = "Pick soundtrack, effects and voice-over for a video with AI-assisted analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in audio library
    Catalog {
        /// Only show one category
        #[arg(short, long)]
        category: Option<CliCategory>,

        /// Print the tracks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a video, run the analysis and stage tracks for export
    Analyze {
        /// Video file (mp4, mov, avi, mkv, webm)
        video: PathBuf,

        /// Stage a library track by id (repeatable)
        #[arg(short, long = "add", value_name = "ID")]
        add: Vec<String>,

        /// Unstage a track by id after all additions (repeatable)
        #[arg(short, long = "remove", value_name = "ID")]
        remove: Vec<String>,

        /// Milliseconds between two progress ticks
        #[arg(long, default_value_t = 300)]
        tick_ms: u64,

        /// Progress added per tick, in percent
        #[arg(long, default_value_t = 10)]
        step: u8,

        /// Print the export plan as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos:>3}%")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn print_catalog(catalog: &Catalog, category: Option<TrackCategory>, json: bool) -> Result<()> {
    let tracks: Vec<_> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&tracks)?);
        return Ok(());
    }

    println!(
        "\n{}  {}\n",
        style("audiostudio").cyan().bold(),
        style("Sound library").dim()
    );
    for track in tracks {
        println!(
            "  {} {}",
            style(format!("[{}]", track.id)).dim(),
            format_track_line(track)
        );
    }
    println!();
    Ok(())
}

/// Mirrors run events onto the progress bar until the run settles.
async fn follow_analysis(session: &StudioSession, sub: &mut Subscription) -> AnalysisState {
    let pb = create_progress_bar("AI analysis of the content...");

    loop {
        tokio::select! {
            event = sub.next() => {
                let Some(event) = event else { break };
                match &event.event {
                    StudioEvent::AnalysisProgressed { progress, .. } => {
                        pb.set_position(u64::from(*progress));
                    }
                    StudioEvent::AnalysisCompleted { .. } => {
                        pb.finish_with_message(format!(
                            "{} AI analysis complete",
                            style("✓").green().bold()
                        ));
                        break;
                    }
                    StudioEvent::AnalysisFailed { reason, .. } => {
                        pb.abandon_with_message(format!(
                            "{} Analysis failed: {}",
                            style("✗").red().bold(),
                            reason
                        ));
                        break;
                    }
                    StudioEvent::AnalysisCancelled { progress, .. } => {
                        pb.abandon_with_message(format!(
                            "{} Analysis cancelled at {}%",
                            style("!").yellow().bold(),
                            progress
                        ));
                        break;
                    }
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if session.cancel_analysis() {
                    tracing::info!("analysis cancelled by user");
                }
            }
        }
    }

    session.wait_for_analysis().await
}

async fn analyze(
    video: PathBuf,
    add: Vec<String>,
    remove: Vec<String>,
    config: StudioConfig,
    json: bool,
) -> Result<()> {
    let session = StudioSession::new(config, Arc::new(FixedAnalyzer))?;
    let upload = VideoUpload::from_path(&video).await?;
    let mut sub = session.subscribe();

    println!(
        "\n{}  {}\n",
        style("audiostudio").cyan().bold(),
        style("Audio AI Studio").dim()
    );

    let started = Instant::now();
    session.upload_video(upload)?;
    println!(
        "{} Video uploaded: {}",
        style("✓").green().bold(),
        style(video.display()).dim()
    );

    let state = follow_analysis(&session, &mut sub).await;
    println!(
        "{} {}",
        style("Analysis time:").dim(),
        style(format_duration(started.elapsed())).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());

    if let AnalysisState::Complete { result } = &state {
        println!("{}", format_analysis_readable(result));
    }

    for id in &add {
        if !session.add_track(id) {
            println!(
                "{} Track {} skipped {}",
                style("·").dim(),
                id,
                style("(unknown or already added)").dim()
            );
        }
    }
    for id in &remove {
        session.remove_track(id);
    }
    for event in std::iter::from_fn(|| sub.try_next()) {
        if let StudioEvent::TrackAdded { track } = &event.event {
            println!("{} {} added", style("✓").green().bold(), track.name);
        }
    }

    match session.export_plan() {
        Ok(plan) if json => println!("{}", plan.to_json()?),
        Ok(plan) => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}", format_export_plan_readable(&plan));
        }
        Err(StudioError::NothingToExport { .. }) => {
            println!(
                "\n{}\n",
                style("Add tracks from the library to prepare an export").dim()
            );
        }
        Err(e) => return Err(e.into()),
    }

    if let AnalysisState::Failed { reason } = state {
        anyhow::bail!("analysis failed: {reason}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Catalog { category, json } => {
            print_catalog(&Catalog::builtin(), category.map(Into::into), json)
        }
        Command::Analyze {
            video,
            add,
            remove,
            tick_ms,
            step,
            json,
        } => {
            let config = StudioConfig {
                tick_period: Duration::from_millis(tick_ms),
                progress_step: step,
                ..Default::default()
            };

            if let Err(e) = analyze(video, add, remove, config, json).await {
                eprintln!("{} {}", style("Error:").red().bold(), e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

//! YoloDesc - per-frame YOLO class-count descriptors
//!
//! A CLI tool that turns a YOLO detection log into a descriptor table:
//! one row per video frame, one column per detection class, each cell the
//! number of detections of that class in that frame.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (I/O, malformed log, out-of-range index, probe failure)
//!   2 - Usage error (missing or invalid arguments)

mod cli;
mod config;
mod descriptor;
mod error;
mod models;
mod report;
mod video;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{DescriptorSummary, DescriptorTable, SummaryMetadata};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("YoloDesc v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Descriptor generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .yolodesc.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!(
        "✅ Created {} with default settings.",
        config::CONFIG_FILE_NAME
    );
    println!("   Edit it to customize class count, class names, and video probing.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete descriptor workflow.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let (video_path, detections_path, output_path) =
        match (&args.video, &args.detections, &args.output) {
            (Some(video), Some(detections), Some(output)) => (video, detections, output),
            _ => anyhow::bail!("VIDEO, DETECTIONS and OUTPUT are all required"),
        };

    // Step 1: How many rows the table needs
    println!("🎞️  Reading frame count: {}", video_path.display());
    let probe_options = video::ProbeOptions::from(&config.video);
    let frame_count = video::resolve_frame_count(video_path, args.frames, &probe_options)?;
    println!(
        "   Frames: {} (from {})",
        frame_count.frames, frame_count.source
    );

    // Step 2: Read the detection log
    println!("📄 Reading detections: {}", detections_path.display());
    let content = std::fs::read_to_string(detections_path).with_context(|| {
        format!(
            "Failed to read detection log: {}",
            detections_path.display()
        )
    })?;
    let lines: Vec<&str> = content.lines().collect();
    info!("Detection log has {} lines", lines.len());

    // Step 3: Aggregate
    println!("🔢 Aggregating detections...");
    let class_count = config.descriptor.class_count;
    let aggregated = if config.output.progress {
        let progress = aggregation_progress_bar();
        let result =
            descriptor::aggregate_with_progress(&lines, frame_count.frames, class_count, &progress);
        progress.finish_and_clear();
        result
    } else {
        descriptor::aggregate(&lines, frame_count.frames, class_count)
    };
    let table = aggregated
        .with_context(|| format!("Malformed detection log {}", detections_path.display()))?;

    // Step 4: Write the descriptor table
    report::save_table(&table, output_path)?;
    info!(
        "Wrote {}x{} descriptor to {}",
        table.frames(),
        table.classes(),
        output_path.display()
    );

    if config.output.verify {
        verify_written_table(&table, output_path)?;
    }

    // Step 5: Optional summary report
    if let Some(ref summary_path) = args.summary {
        let metadata = SummaryMetadata {
            video_path: video_path.display().to_string(),
            detections_path: detections_path.display().to_string(),
            output_path: output_path.display().to_string(),
            generated_at: Utc::now(),
            total_frames: table.frames(),
            class_count: table.classes(),
            frame_source: frame_count.source,
        };
        let summary =
            DescriptorSummary::from_table(&table, metadata, &config.descriptor.class_names);
        report::write_summary(&summary, summary_path, config.output.summary_format)?;
        println!("📝 Summary saved to: {}", summary_path.display());
    }

    if table.frames_with_detections() == 0 && !lines.is_empty() {
        warn!("Detection log produced no detections");
    }

    // Print summary
    println!("\n📊 Total objects: {}", table.total());
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Done! Descriptor saved to: {}",
        output_path.display()
    );

    Ok(())
}

/// Progress bar over detection-log lines.
fn aggregation_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Re-read the output file and compare it against the in-memory table.
fn verify_written_table(table: &DescriptorTable, path: &Path) -> Result<()> {
    let written = report::load_table(path, table.classes())?;

    if written != *table {
        anyhow::bail!(
            "Descriptor written to {} does not match the aggregated table",
            path.display()
        );
    }

    debug!("Verified {}", path.display());
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

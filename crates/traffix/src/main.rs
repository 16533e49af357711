//! `traffix` - CLI for the vehicle registry
//!
//! Every invocation starts from a fresh in-memory registry, applies one
//! command, and prints the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use traffix::cli::{
    Cli, Command, ConfigCommand, FineCommand, IngestCommand, OutputFormat, WatchCommand,
};
use traffix::ingest::{self, FrameOptions};
use traffix::monitor::{FeedSummary, ReplayAnalyzer, SyntheticFrames};
use traffix::{
    init_logging, Config, FeedMonitor, FineRecord, FineSchedule, VehicleRecord, VehicleRegistry,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity(), cli.log_format);

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let registry = VehicleRegistry::from_config(&config.registry);
    debug!(vehicles = registry.len(), "Registry ready");

    match cli.command {
        Command::List(cmd) => print_vehicles(&registry.records(), cmd.format)?,
        Command::Search(cmd) => print_vehicles(&registry.filter(&cmd.query), cmd.format)?,
        Command::Show(cmd) => match registry.find(&cmd.plate) {
            Some(vehicle) if cmd.json => println!("{}", serde_json::to_string_pretty(&vehicle)?),
            Some(vehicle) => print_vehicle_detail(&vehicle),
            None => println!("Vehicle {} not found.", cmd.plate),
        },
        Command::Register(cmd) => {
            if registry.register_if_new(&cmd.plate, &cmd.vehicle_type) {
                println!("Registered {} as {}.", cmd.plate, cmd.vehicle_type);
            } else {
                println!("{} is already registered.", cmd.plate);
            }
        }
        Command::Fine(cmd) => handle_fine(&registry, &config, cmd),
        Command::Delete(cmd) => {
            if registry.delete(&cmd.plate) {
                println!("Deleted {} and its fine history.", cmd.plate);
            } else {
                println!("Vehicle {} not found.", cmd.plate);
            }
        }
        Command::Stats(cmd) => handle_stats(&registry, cmd.json)?,
        Command::Ingest(cmd) => handle_ingest(&registry, &config, cmd)?,
        Command::Watch(cmd) => handle_watch(registry, &config, &cmd)?,
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(())
}

fn handle_fine(registry: &VehicleRegistry, config: &Config, cmd: FineCommand) {
    let location = cmd
        .location
        .unwrap_or_else(|| config.fines.location.clone());
    let mut fine = FineRecord::pending(cmd.violation, cmd.amount, location);
    fine.status = cmd.status.into();
    let id = fine.id.clone();

    if registry.append_fine(&cmd.plate, fine) {
        println!("Issued fine {id} of {} to {}.", cmd.amount, cmd.plate);
        if let Some(total) = registry.total_fines(&cmd.plate) {
            println!("Total fines for {}: {total}", cmd.plate);
        }
    } else {
        println!(
            "Vehicle {} not found. Register it before issuing fines.",
            cmd.plate
        );
    }
}

fn handle_stats(registry: &VehicleRegistry, json: bool) -> anyhow::Result<()> {
    let stats = registry.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("traffix registry");
        println!("----------------");
        println!("Vehicles:      {}", stats.vehicles);
        println!("Fines:         {}", stats.fines);
        println!("Pending:       {}", stats.pending_fines);
        println!("Total amount:  {}", stats.total_amount);
        println!("Outstanding:   {}", stats.outstanding_amount);
    }
    Ok(())
}

fn handle_ingest(
    registry: &VehicleRegistry,
    config: &Config,
    cmd: IngestCommand,
) -> anyhow::Result<()> {
    match cmd {
        IngestCommand::Frame { file, json } => {
            let analysis = ingest::load_frame_analysis(&file)?;
            let outcome =
                ingest::process_frame(registry, &analysis, &FrameOptions::from(&config.feed));
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.detections)?);
            } else {
                for detection in &outcome.detections {
                    println!("{:<16} {}", detection.plate_number, detection.status);
                }
                println!();
                println!(
                    "Flow: {}  Violations: {}",
                    outcome.flow, outcome.violations
                );
            }
        }
        IngestCommand::Video { file, json } => {
            let detections = ingest::load_video_detections(&file)?;
            let schedule = FineSchedule::from(&config.fines);
            let notices = ingest::process_video(registry, &detections, &schedule);
            if json {
                println!("{}", serde_json::to_string_pretty(&notices)?);
            } else {
                if notices.is_empty() {
                    println!("No violations found in {} detections.", detections.len());
                }
                for notice in &notices {
                    println!("{notice}");
                }
                println!();
                print_vehicles(&registry.records(), OutputFormat::Table)?;
            }
        }
    }
    Ok(())
}

fn handle_watch(
    registry: VehicleRegistry,
    config: &Config,
    cmd: &WatchCommand,
) -> anyhow::Result<()> {
    let analyses = ingest::load_frame_analyses(&cmd.file)?;
    let frames = SyntheticFrames::new(u64::try_from(analyses.len()).unwrap_or(u64::MAX));
    let analyzer = ReplayAnalyzer::new(analyses);

    let mut monitor = FeedMonitor::new(Arc::new(registry), &config.feed);
    if let Some(ms) = cmd.interval_ms {
        monitor = monitor.with_interval(Duration::from_millis(ms));
    }

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let summary = runtime.block_on(async {
        tokio::select! {
            summary = monitor.run(frames, &analyzer) => summary,
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted.");
                FeedSummary::default()
            }
        }
    });

    let tracker = monitor.tracker();
    let tracker = tracker.lock();
    println!("Recent detections");
    println!("=================");
    for detection in tracker.recent() {
        println!(
            "{}  {:<16} {}",
            detection.timestamp.format("%H:%M:%S"),
            detection.plate_number,
            detection.status
        );
    }
    let stats = tracker.stats();
    println!();
    println!(
        "Frames: {} analyzed, {} empty, {} failed",
        summary.analyzed, summary.empty, summary.failed
    );
    println!("Flow: {}  Violations: {}", stats.flow, stats.violations);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Registry]");
                println!("  Seed demo data:     {}", config.registry.seed_demo_data);
                println!();
                println!("[Fines]");
                println!("  Speeding amount:    {}", config.fines.speeding_amount);
                println!("  Default amount:     {}", config.fines.default_amount);
                println!("  Location:           {}", config.fines.location);
                println!();
                println!("[Feed]");
                println!("  Frame interval:     {} ms", config.feed.frame_interval_ms);
                println!("  Recent capacity:    {}", config.feed.recent_capacity);
                println!("  Auto register:      {}", config.feed.auto_register);
                println!("  Confidence:         {}", config.feed.default_confidence);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_vehicles(vehicles: &[VehicleRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(vehicles)?),
        OutputFormat::Plain => {
            for v in vehicles {
                println!(
                    "{} {} {} {} {}",
                    v.plate_number,
                    v.owner_name,
                    v.vehicle_type,
                    v.violation_count(),
                    v.total_fines()
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<16} {:<20} {:<10} {:>10} {:>10}",
                "PLATE", "OWNER", "TYPE", "VIOLATIONS", "TOTAL"
            );
            for v in vehicles {
                println!(
                    "{:<16} {:<20} {:<10} {:>10} {:>10}",
                    v.plate_number,
                    v.owner_name,
                    v.vehicle_type,
                    v.violation_count(),
                    v.total_fines()
                );
            }
            if vehicles.is_empty() {
                println!("(no matching vehicles)");
            }
        }
    }
    Ok(())
}

fn print_vehicle_detail(vehicle: &VehicleRecord) {
    println!("{}", vehicle.plate_number);
    println!("{}", "-".repeat(vehicle.plate_number.len()));
    println!("Owner:       {}", vehicle.owner_name);
    println!("Email:       {}", vehicle.email);
    println!("Phone:       {}", vehicle.phone);
    println!("Type:        {}", vehicle.vehicle_type);
    println!("Registered:  {}", vehicle.registration_date);
    println!();

    if vehicle.history.is_empty() {
        println!("No violations on record.");
        return;
    }

    for fine in &vehicle.history {
        println!(
            "{:<8} {:<12} {:<20} {:<24} {:>8} {}",
            fine.id, fine.date, fine.violation_type, fine.location, fine.amount, fine.status
        );
    }
    println!();
    println!(
        "Total: {}  Outstanding: {}",
        vehicle.total_fines(),
        vehicle.outstanding()
    );
}

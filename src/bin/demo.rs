//! demo - end-to-end synthetic run for catspot
//!
//! Runs the synthetic camera through the full pipeline: a scripted
//! cat walks in, sits centered, and the stability gate confirms it.
//! Exits non-zero if the run never confirms.

use anyhow::{anyhow, Result};
use clap::Parser;

use catspot::{
    BackendRegistry, CameraConfig, CameraSource, CpuBackend, OverlayConfig, PresenceEvent,
    Spotter, StabilityConfig, Viewport,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of synthetic frames to run.
    #[arg(long, default_value_t = 20)]
    frames: u64,
    /// Frames per second for the synthetic source.
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Deterministic seed for the synthetic camera's jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output directory for a snapshot of the confirming frame
    /// (requires the snapshot feature).
    #[arg(long)]
    out: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }

    stage("connect synthetic camera");
    let camera_config = CameraConfig {
        url: "stub://demo".to_string(),
        target_fps: args.fps,
        width: 320,
        height: 240,
        seed: args.seed,
    };
    let viewport = Viewport {
        width: camera_config.width,
        height: camera_config.height,
    };
    let mut source = CameraSource::new(camera_config)?;
    source.connect()?;

    stage("build pipeline (cpu backend)");
    let mut registry = BackendRegistry::new();
    registry.register(CpuBackend::new());
    let mut spotter = Spotter::new(
        registry,
        StabilityConfig::default(),
        OverlayConfig::default(),
        viewport,
    );

    stage("run frames");
    let mut events: Vec<PresenceEvent> = Vec::new();
    let mut sighting_count = 0u64;
    for _ in 0..args.frames {
        let frame = source.next_frame()?;
        let report = spotter.process(&frame)?;
        sighting_count += report.sightings.len() as u64;

        if !report.events.is_empty() {
            if let Some(out) = &args.out {
                write_snapshot(out, &frame, &report)?;
            }
            events.extend(report.events);
        }
    }

    let stats = spotter.stats();
    println!("demo summary:");
    println!("  frames processed: {}", stats.frames_processed);
    println!("  sightings: {}", sighting_count);
    println!("  confirmations: {}", events.len());
    if let Some(event) = events.first() {
        println!(
            "  first confirmation: frame {} conf {:.2}",
            event.frame_index, event.confidence
        );
    }
    println!("next steps:");
    println!("  cargo run --bin catspotd");
    println!("  cargo run --bin demo -- --frames 40 --seed 7");

    if events.is_empty() {
        return Err(anyhow!(
            "synthetic run never confirmed a cat in {} frames",
            args.frames
        ));
    }
    Ok(())
}

fn stage(msg: &str) {
    eprintln!("demo: {}", msg);
}

#[cfg(feature = "snapshot")]
fn write_snapshot(out: &str, frame: &catspot::Frame, report: &catspot::FrameReport) -> Result<()> {
    use anyhow::Context;

    std::fs::create_dir_all(out)?;
    let image = catspot::overlay::render_snapshot(frame, &report.overlay)?;
    let path = std::path::Path::new(out).join(format!("confirmed_frame_{}.png", frame.index));
    image
        .save(&path)
        .with_context(|| format!("writing snapshot to {}", path.display()))?;
    stage(&format!("snapshot written to {}", path.display()));
    Ok(())
}

#[cfg(not(feature = "snapshot"))]
fn write_snapshot(_out: &str, _frame: &catspot::Frame, _report: &catspot::FrameReport) -> Result<()> {
    log::warn!("--out ignored: build with the snapshot feature to write snapshots");
    Ok(())
}

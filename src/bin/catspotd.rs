//! catspotd - cat spotting daemon
//!
//! This daemon:
//! 1. Ingests frames from the configured camera source
//! 2. Runs the configured detection backend on each frame
//! 3. Feeds detections through the centering/stability gate
//! 4. Prints presence events as JSON lines on stdout
//! 5. Logs source health periodically, shuts down on ctrl-c

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use catspot::{BackendRegistry, CameraSource, CpuBackend, Spotter, SpotterConfig, StubBackend};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = SpotterConfig::load()?;

    let mut source = CameraSource::new(cfg.camera_config())?;
    source.connect()?;

    let registry = build_registry(&cfg)?;
    let mut spotter = Spotter::new(
        registry,
        cfg.stability_config(),
        cfg.overlay_config(),
        cfg.viewport(),
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    // Pace to the configured capture rate; sources deliver on demand.
    let frame_interval = Duration::from_millis((1000 / cfg.camera.target_fps).max(1) as u64);
    let mut last_health_log = Instant::now();

    log::info!(
        "catspotd running. source={} backend={} target={} confirm_after={}",
        cfg.camera.url,
        cfg.detector.backend,
        cfg.stability.target_label,
        cfg.stability.confirm_after
    );

    while running.load(Ordering::SeqCst) {
        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("capture failed: {}", e);
                break;
            }
        };

        let report = spotter.process(&frame)?;
        for event in &report.events {
            println!("{}", serde_json::to_string(event)?);
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "camera health={} frames={} url={} gate_run={}",
                source.is_healthy(),
                stats.frames_captured,
                stats.url,
                spotter.gate_state().consecutive_stable
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(frame_interval);
    }

    let stats = spotter.stats();
    log::info!(
        "catspotd stopped. frames={} events={}",
        stats.frames_processed,
        stats.events_emitted
    );
    Ok(())
}

fn build_registry(cfg: &SpotterConfig) -> Result<BackendRegistry> {
    let mut registry = BackendRegistry::new();
    registry.register(CpuBackend::new().with_label(&cfg.stability.target_label));
    registry.register(StubBackend::new());

    if cfg.detector.backend == "tract" {
        #[cfg(feature = "backend-tract")]
        {
            let model_path = cfg.detector.model_path.as_ref().ok_or_else(|| {
                anyhow!("detector.model_path is required for the tract backend")
            })?;
            registry.register(catspot::TractBackend::new(
                model_path,
                &cfg.stability.target_label,
                cfg.camera.width,
                cfg.camera.height,
            )?);
        }
        #[cfg(not(feature = "backend-tract"))]
        return Err(anyhow!(
            "the tract backend requires building with the backend-tract feature"
        ));
    }

    registry.set_default(&cfg.detector.backend)?;
    Ok(registry)
}

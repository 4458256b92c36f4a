//! Headless electrolysis run.
//!
//! Drives a bubble field for a fixed number of frames against a bookkeeping
//! renderer and logs what a real scene would have drawn.

use clap::Parser;
use electrolysis::{
    BubbleCategory, BubbleConfig, BubbleField, CableLayout, Clock, FrameClock, SceneConfig,
    SceneLedger, Vec3,
};
use std::process::ExitCode;

/// Simulate gas evolution in the electrolysis jar without a window
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a scene configuration file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Bubble preset when no config file is given: default, sparse, shallow
    #[arg(short, long, default_value = "default")]
    preset: String,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log stats every this many frames
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn load_scene(args: &Args) -> Option<SceneConfig> {
    match &args.config {
        Some(path) => match SceneConfig::load(path) {
            Ok(scene) => {
                log::info!("Loaded scene from {}", path);
                Some(scene)
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path, e);
                None
            }
        },
        None => match BubbleConfig::preset(&args.preset) {
            Some(bubbles) => Some(SceneConfig {
                bubbles,
                ..SceneConfig::default()
            }),
            None => {
                log::error!("Unknown preset '{}'", args.preset);
                None
            }
        },
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let Some(scene) = load_scene(&args) else {
        return ExitCode::FAILURE;
    };

    let electrodes = scene.apparatus.electrodes();
    let liquid = scene.apparatus.liquid();

    let bubbles = scene.bubbles.clone();
    let field = match args.seed {
        Some(seed) => BubbleField::seeded(bubbles, electrodes, liquid, SceneLedger::new(), seed),
        None => BubbleField::new(bubbles, electrodes, liquid, SceneLedger::new()),
    };
    let mut field = match field {
        Ok(field) => field,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // PSU terminals sit in front of the jar; each lead clips onto the top of its plate.
    let terminals = [
        ("negative", Vec3::new(-0.5, 3.0, 5.0), electrodes.negative),
        ("positive", Vec3::new(0.5, 3.0, 5.0), electrodes.positive),
    ];
    for (name, terminal, plate) in terminals {
        let clip = plate.position + Vec3::new(0.0, plate.height / 2.0, 0.0);
        match CableLayout::new(terminal, clip, 10, 0.1) {
            Ok(lead) => log::info!(
                "{} lead: {} segments of {:.2} over {:.2} units",
                name,
                lead.segment_count(),
                lead.segment_length(),
                lead.length()
            ),
            Err(e) => log::warn!("Skipping {} lead: {}", name, e),
        }
    }

    log::info!(
        "Simulating {} frames at {}ms/frame (max {} bubbles, speed {})",
        args.frames,
        args.frame_ms,
        scene.bubbles.max_bubbles,
        scene.bubbles.speed
    );

    let mut clock = FrameClock::fixed(args.frame_ms);
    let mut peak = 0;
    let mut retired = 0;
    let mut refused = 0;

    for _ in 0..args.frames {
        clock.tick();
        let report = field.tick(&clock);
        peak = peak.max(field.live_count());
        retired += report.advance.retired();
        refused += report.spawn.failed;

        if args.report_every > 0 && clock.frame() % args.report_every == 0 {
            log::info!(
                "t={:>7.0}ms live={:>4} (white {}, blue {}, red {})",
                clock.now_ms(),
                field.live_count(),
                field.count_of(BubbleCategory::White),
                field.count_of(BubbleCategory::Blue),
                field.count_of(BubbleCategory::Red)
            );
        }
    }

    let remaining = field.retire_all();
    let ledger = field.into_renderer();
    log::info!(
        "Done: {} drawables allocated ({} white, {} blue, {} red)",
        ledger.total_allocated(),
        ledger.allocated(BubbleCategory::White),
        ledger.allocated(BubbleCategory::Blue),
        ledger.allocated(BubbleCategory::Red)
    );
    log::info!(
        "Peak {} live, {} retired in flight, {} at teardown, {} refused",
        peak,
        retired,
        remaining,
        refused
    );

    if ledger.live_count() != 0 || ledger.stale_updates() != 0 {
        log::error!(
            "Drawable bookkeeping mismatch: {} still live, {} stale updates",
            ledger.live_count(),
            ledger.stale_updates()
        );
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

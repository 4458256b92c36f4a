//! Integration tests for the bubble field.
//!
//! These drive a field through the public API against the bookkeeping
//! renderer and check the lifecycle guarantees: capacity, spawn gating,
//! retirement and drawable ownership.

use electrolysis::clock::ManualClock;
use electrolysis::prelude::*;
use electrolysis::DrawableId;
use std::collections::{HashMap, HashSet};

fn standard_field(config: BubbleConfig, seed: u64) -> BubbleField<SceneLedger> {
    BubbleField::seeded(
        config,
        ElectrodePair::standard(),
        LiquidVolume::standard(),
        SceneLedger::new(),
        seed,
    )
    .unwrap()
}

/// Every live bubble's handle is live in the ledger, and nothing else is.
fn assert_handles_consistent(field: &BubbleField<SceneLedger>) {
    let ledger = field.renderer();
    assert_eq!(ledger.live_count(), field.live_count());
    for bubble in field.bubbles() {
        let raw = bubble.handle().raw();
        assert!(ledger.is_live(raw), "bubble {:?} holds a disposed handle", bubble.id());
        assert_eq!(ledger.category_of(raw), Some(bubble.category()));
    }
    assert_eq!(ledger.stale_updates(), 0);
}

// ============================================================================
// Spawn policy
// ============================================================================

#[test]
fn test_single_batch_scenario() {
    for seed in 0..20 {
        let mut field = standard_field(BubbleConfig::default(), seed);
        let report = field.try_spawn_batch(1_000.0);

        assert_eq!(report.white, 30);
        assert_eq!(field.count_of(BubbleCategory::White), 30);
        assert!(report.blue <= 5);
        assert!(report.red <= 5);
        assert!(report.colored() <= 10);
        assert_eq!(field.live_count(), 30 + report.colored());
        assert_handles_consistent(&field);
    }
}

#[test]
fn test_spawn_gating() {
    let config = BubbleConfig::default().with_spawn_interval_ms(5.0);
    let mut field = standard_field(config, 1);

    let first = field.try_spawn_batch(100.0);
    assert!(first.total() > 0);
    let live = field.live_count();

    // Gate is 10x the nominal interval.
    let second = field.try_spawn_batch(149.0);
    assert_eq!(second.gated, Some(SpawnGate::Interval));
    assert_eq!(second.total(), 0);
    assert_eq!(field.live_count(), live);

    let third = field.try_spawn_batch(150.0);
    assert_eq!(third.gated, None);
    assert!(third.total() >= 30);
}

#[test]
fn test_gated_call_does_not_reset_timer() {
    let config = BubbleConfig::default().with_spawn_interval_ms(1.0);
    let mut field = standard_field(config, 2);

    field.try_spawn_batch(0.0);
    field.try_spawn_batch(9.0);
    assert_eq!(field.last_spawn_ms(), Some(0.0));
    assert_eq!(field.try_spawn_batch(10.0).gated, None);
}

#[test]
fn test_capacity_gated_call_still_resets_timer() {
    let config = BubbleConfig::default()
        .with_max_bubbles(30)
        .with_densities(0.0, 0.0)
        .with_spawn_interval_ms(5.0);
    let gate = config.spawn_gate_ms();
    let mut field = standard_field(config, 17);

    field.try_spawn_batch(0.0);
    assert!(field.is_full());

    // Passes the interval gate, so the timer moves even though nothing spawns.
    let report = field.try_spawn_batch(100.0);
    assert_eq!(report.gated, Some(SpawnGate::Capacity));
    assert_eq!(field.last_spawn_ms(), Some(100.0));

    field.retire_all();
    let report = field.try_spawn_batch(100.0 + gate - 1.0);
    assert_eq!(report.gated, Some(SpawnGate::Interval));
    assert!(field.is_empty());

    let report = field.try_spawn_batch(100.0 + gate);
    assert_eq!(report.gated, None);
    assert_eq!(report.white, 30);
}

#[test]
fn test_full_field_is_noop() {
    let config = BubbleConfig::default().with_max_bubbles(30).with_densities(0.0, 0.0);
    let mut field = standard_field(config, 3);

    field.try_spawn_batch(0.0);
    assert_eq!(field.live_count(), 30);
    assert!(field.is_full());

    let report = field.try_spawn_batch(1_000_000.0);
    assert_eq!(report.gated, Some(SpawnGate::Capacity));
    assert_eq!(field.live_count(), 30);
    assert_handles_consistent(&field);
}

#[test]
fn test_capacity_never_exceeded() {
    let config = BubbleConfig::default()
        .with_max_bubbles(100)
        .with_densities(1.0, 1.0)
        .with_speed(0.01);
    let mut field = standard_field(config, 4);
    let mut clock = ManualClock::new(0.0);

    for batch in 0..50 {
        let report = field.try_spawn_batch(clock.now_ms());
        assert!(field.live_count() <= 100);
        if batch >= 3 {
            // 40 per batch; barely any bubble retires at this speed.
            assert_eq!(field.live_count(), 100);
        }
        if batch == 2 {
            assert_eq!(report.total() + report.capped, 40);
            assert!(report.capped > 0);
        }
        field.advance();
        assert!(field.live_count() <= 100);
        clock.advance(1.0);
    }
}

#[test]
fn test_zero_capacity_spawns_nothing() {
    let mut field = standard_field(BubbleConfig::default().with_max_bubbles(0), 5);
    let report = field.try_spawn_batch(0.0);
    assert_eq!(report.gated, Some(SpawnGate::Capacity));
    assert!(field.is_empty());
    assert_eq!(field.renderer().total_allocated(), 0);
}

#[test]
fn test_allocation_failure_skips_bubble() {
    let mut field = BubbleField::seeded(
        BubbleConfig::default().with_densities(0.0, 0.0),
        ElectrodePair::standard(),
        LiquidVolume::standard(),
        SceneLedger::with_budget(20),
        6,
    )
    .unwrap();

    let report = field.try_spawn_batch(0.0);
    assert_eq!(report.white, 20);
    assert_eq!(report.failed, 10);
    assert_eq!(field.live_count(), 20);
    assert_eq!(field.renderer().failed(), 10);
    assert_eq!(field.renderer().disposed(), 0);
    assert_handles_consistent(&field);
}

#[test]
fn test_liquid_bounds_constrain_colored_spawns() {
    let config = BubbleConfig::default().with_densities(1.0, 1.0).with_white_edge_count(0);
    let mut field = standard_field(config, 7);
    let liquid = LiquidVolume::new(0.5, 0.25);
    field.set_liquid(liquid).unwrap();
    field.try_spawn_batch(0.0);

    assert_eq!(field.live_count(), 10);
    for bubble in field.bubbles() {
        let y = bubble.position().y;
        assert!(y >= liquid.bottom && y <= liquid.top, "y = {}", y);
    }
}

// ============================================================================
// Motion and retirement
// ============================================================================

#[test]
fn test_colored_on_target_retires_immediately() {
    let mut field = standard_field(BubbleConfig::default().with_speed(0.1), 8);
    let plate = field.electrodes().negative;

    let id = field
        .spawn_bubble(
            plate.position,
            Motion::Colored {
                source: Polarity::Negative,
                target: plate.position,
            },
        )
        .unwrap();
    assert!(field.get(id).is_some());

    let report = field.advance();
    assert_eq!(report.retired_colored, 1);
    assert!(field.get(id).is_none());
    assert!(field.is_empty());
    assert_eq!(field.renderer().disposed(), 1);
}

#[test]
fn test_white_above_surface_retires_next_advance() {
    let mut field = standard_field(BubbleConfig::default(), 9);
    field.spawn_bubble(Vec3::new(0.0, 2.5, 0.0), Motion::White { aim: Vec3::new(0.0, 4.0, 0.0) });
    field.spawn_bubble(Vec3::new(0.0, 0.0, 0.0), Motion::White { aim: Vec3::new(0.0, 4.0, 0.0) });

    let report = field.advance();
    assert_eq!(report.retired_white, 1);
    assert_eq!(report.active, 1);
    assert_eq!(field.renderer().disposed(), 1);
}

#[test]
fn test_white_bubbles_rise_out() {
    let config = BubbleConfig::default().with_densities(0.0, 0.0).with_speed(0.5);
    let mut field = standard_field(config, 10);
    field.try_spawn_batch(0.0);

    // Bottom edge at y = -2, retirement above y = 2: 9 steps of 0.5.
    for step in 1..=8 {
        let report = field.advance();
        assert_eq!(report.retired(), 0, "early retirement at step {}", step);
    }
    let report = field.advance();
    assert_eq!(report.retired_white, 30);
    assert!(field.is_empty());
    assert_eq!(field.renderer().disposed(), 30);
}

#[test]
fn test_colored_bubbles_reach_their_plate() {
    let config = BubbleConfig::default().with_densities(1.0, 1.0).with_white_edge_count(0);
    let mut field = standard_field(config, 11);
    field.try_spawn_batch(0.0);
    assert_eq!(field.live_count(), 10);

    let mut steps = 0;
    while !field.is_empty() {
        field.advance();
        steps += 1;
        assert!(steps < 200, "colored bubbles never arrived");
    }
    assert_eq!(field.renderer().disposed(), 10);
}

#[test]
fn test_categories_and_targets_are_stable() {
    let config = BubbleConfig::default().with_speed(0.02);
    let mut field = standard_field(config, 12);
    let mut clock = ManualClock::new(0.0);
    let mut seen: HashMap<BubbleId, (BubbleCategory, Option<Vec3>)> = HashMap::new();

    for _ in 0..100 {
        field.tick(&clock);
        clock.advance(1.0);

        for bubble in field.bubbles() {
            let entry = seen.entry(bubble.id()).or_insert((bubble.category(), bubble.target()));
            assert_eq!(*entry, (bubble.category(), bubble.target()));
        }
    }
}

#[test]
fn test_positions_are_pushed_to_renderer() {
    let mut field = standard_field(BubbleConfig::default(), 13);
    field.try_spawn_batch(0.0);
    field.advance();

    let ledger = field.renderer();
    for bubble in field.bubbles() {
        assert_eq!(ledger.position_of(bubble.handle().raw()), Some(bubble.position()));
    }
}

// ============================================================================
// Handle ownership
// ============================================================================

#[test]
fn test_no_dangling_handles_over_long_run() {
    let config = BubbleConfig::default().with_max_bubbles(300);
    let mut field = standard_field(config, 14);
    let mut clock = ManualClock::new(0.0);

    for frame in 0..400 {
        field.tick(&clock);
        clock.advance(16.0);
        assert!(field.live_count() <= 300);
        if frame % 25 == 0 {
            assert_handles_consistent(&field);
        }
    }
    assert_handles_consistent(&field);

    let ledger = field.renderer();
    assert_eq!(ledger.total_allocated(), ledger.disposed() + ledger.live_count());
}

#[test]
fn test_retire_all_disposes_everything_once() {
    let mut field = standard_field(BubbleConfig::default(), 15);
    let clock = ManualClock::new(0.0);
    field.tick(&clock);
    let live = field.live_count();
    assert!(live > 0);

    assert_eq!(field.retire_all(), live);
    assert_eq!(field.retire_all(), 0);
    assert!(field.is_empty());

    let ledger = field.renderer();
    assert_eq!(ledger.live_count(), 0);
    assert_eq!(ledger.disposed(), ledger.total_allocated());
    assert_eq!(ledger.stale_updates(), 0);
}

/// Renderer that panics on any misuse of its handles.
#[derive(Default)]
struct StrictRenderer {
    ledger: SceneLedger,
    disposed: HashSet<u64>,
}

impl DrawableFactory for StrictRenderer {
    type Handle = DrawableId;

    fn allocate(&mut self, category: BubbleCategory) -> Result<DrawableId, DrawableError> {
        self.ledger.allocate(category)
    }

    fn set_position(&mut self, handle: &DrawableId, position: Vec3) {
        assert!(!self.disposed.contains(&handle.raw()), "moved a disposed drawable");
        self.ledger.set_position(handle, position);
    }

    fn dispose(&mut self, handle: DrawableId) {
        assert!(!self.disposed.contains(&handle.raw()), "double dispose");
        self.disposed.insert(handle.raw());
        self.ledger.dispose(handle);
    }
}

#[test]
fn test_custom_renderer_sees_each_handle_disposed_once() {
    let mut field = BubbleField::seeded(
        BubbleConfig::default().with_max_bubbles(200).with_speed(0.2),
        ElectrodePair::standard(),
        LiquidVolume::standard(),
        StrictRenderer::default(),
        16,
    )
    .unwrap();
    let mut clock = FrameClock::fixed(16.0);

    for _ in 0..120 {
        clock.tick();
        field.tick(&clock);
    }
    let renderer = field.into_renderer();
    assert_eq!(renderer.ledger.live_count(), 0);
    assert_eq!(renderer.disposed.len(), renderer.ledger.total_allocated());
}

//! The bubble field: gas evolution at a pair of electrodes.
//!
//! [`BubbleField`] owns every live bubble. Each frame the host calls
//! [`try_spawn_batch`](BubbleField::try_spawn_batch) and then
//! [`advance`](BubbleField::advance) (or [`tick`](BubbleField::tick), which
//! does both).
//!
//! # Spawn batches
//!
//! A batch is gated twice:
//!
//! 1. **Interval** - at least [`BubbleConfig::spawn_gate_ms`] must have passed
//!    since the previous batch. The first batch is never gated.
//! 2. **Capacity** - a full field spawns nothing. A nearly-full field spawns
//!    until it is full and drops the rest of the batch.
//!
//! Each batch then emits, per plate:
//!
//! - `white_edge_count_per_electrode` white bubbles spread evenly along the
//!   plate's bottom edge, each aimed upward with lateral scatter
//! - up to `colored_draws_per_electrode` colored bubbles, each draw succeeding
//!   with the plate's density, placed somewhere in the liquid near the plate
//!   and homed back onto it
//!
//! # Example
//!
//! ```ignore
//! use electrolysis::prelude::*;
//!
//! let mut field = BubbleField::new(
//!     BubbleConfig::default(),
//!     ElectrodePair::standard(),
//!     LiquidVolume::standard(),
//!     SceneLedger::new(),
//! )?;
//!
//! let mut clock = FrameClock::new();
//! loop {
//!     clock.tick();
//!     field.tick(&clock);
//! }
//! ```

use crate::bubble::{Bubble, BubbleCategory, BubbleId, Motion, MotionParams, Step};
use crate::clock::Clock;
use crate::config::BubbleConfig;
use crate::drawable::DrawableFactory;
use crate::electrode::{Electrode, ElectrodePair, LiquidVolume, Polarity};
use crate::error::ConfigError;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Why a spawn batch produced nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnGate {
    /// Too soon after the previous batch.
    Interval,
    /// The field was already at `max_bubbles`.
    Capacity,
}

/// Outcome of one [`BubbleField::try_spawn_batch`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub white: usize,
    pub blue: usize,
    pub red: usize,
    /// Bubbles dropped because the renderer refused a drawable.
    pub failed: usize,
    /// Bubbles dropped because the field filled up mid-batch.
    pub capped: usize,
    /// Set when the whole batch was skipped.
    pub gated: Option<SpawnGate>,
}

impl SpawnReport {
    /// Bubbles actually added to the field.
    pub fn total(&self) -> usize {
        self.white + self.blue + self.red
    }

    pub fn colored(&self) -> usize {
        self.blue + self.red
    }

    fn record(&mut self, category: BubbleCategory) {
        match category {
            BubbleCategory::White => self.white += 1,
            BubbleCategory::Blue => self.blue += 1,
            BubbleCategory::Red => self.red += 1,
        }
    }
}

/// Outcome of one [`BubbleField::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Bubbles still live after the step.
    pub active: usize,
    pub retired_white: usize,
    pub retired_colored: usize,
}

impl AdvanceReport {
    pub fn retired(&self) -> usize {
        self.retired_white + self.retired_colored
    }
}

/// Both halves of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawn: SpawnReport,
    pub advance: AdvanceReport,
}

/// Live set of bubbles at a pair of electrodes.
///
/// `R` supplies drawables for the bubbles; `G` is the random source
/// (a [`SmallRng`] seeded from entropy unless one is provided).
///
/// The field never disposes a handle it does not own and disposes each owned
/// handle exactly once: when its bubble retires, in [`retire_all`], or in
/// [`into_renderer`].
///
/// [`retire_all`]: BubbleField::retire_all
/// [`into_renderer`]: BubbleField::into_renderer
pub struct BubbleField<R: DrawableFactory, G: Rng = SmallRng> {
    config: BubbleConfig,
    electrodes: ElectrodePair,
    liquid: LiquidVolume,
    renderer: R,
    rng: G,
    live: Vec<Bubble<R::Handle>>,
    /// Swap buffer for `advance`, kept to reuse its allocation.
    scratch: Vec<Bubble<R::Handle>>,
    next_id: u64,
    last_spawn_ms: Option<f64>,
}

impl<R: DrawableFactory> BubbleField<R, SmallRng> {
    /// Create a field with an entropy-seeded random source.
    ///
    /// Fails if `config` does not pass [`BubbleConfig::validate`].
    pub fn new(
        config: BubbleConfig,
        electrodes: ElectrodePair,
        liquid: LiquidVolume,
        renderer: R,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, electrodes, liquid, renderer, SmallRng::from_entropy())
    }

    /// Create a field whose random draws are reproducible from `seed`.
    pub fn seeded(
        config: BubbleConfig,
        electrodes: ElectrodePair,
        liquid: LiquidVolume,
        renderer: R,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, electrodes, liquid, renderer, SmallRng::seed_from_u64(seed))
    }
}

impl<R: DrawableFactory, G: Rng> BubbleField<R, G> {
    /// Create a field drawing randomness from `rng`.
    pub fn with_rng(
        config: BubbleConfig,
        electrodes: ElectrodePair,
        liquid: LiquidVolume,
        renderer: R,
        rng: G,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for (polarity, plate) in electrodes.iter() {
            if !plate.is_finite() {
                return Err(ConfigError::invalid(
                    "electrodes",
                    format!("{:?} plate has non-finite geometry: {:?}", polarity, plate),
                ));
            }
        }
        if !liquid.is_valid() {
            return Err(ConfigError::invalid(
                "liquid",
                format!("bounds must be finite with top >= bottom, got {:?}", liquid),
            ));
        }
        log::debug!(
            "Bubble field ready: max {} bubbles, speed {}, plates {:.2} apart",
            config.max_bubbles,
            config.speed,
            electrodes.separation()
        );

        Ok(Self {
            live: Vec::with_capacity(config.max_bubbles),
            scratch: Vec::with_capacity(config.max_bubbles),
            config,
            electrodes,
            liquid,
            renderer,
            rng,
            next_id: 0,
            last_spawn_ms: None,
        })
    }

    // =========================================================================
    // FRAME OPERATIONS
    // =========================================================================

    /// Spawn one batch of bubbles if the interval and capacity gates allow it.
    pub fn try_spawn_batch(&mut self, now_ms: f64) -> SpawnReport {
        let mut report = SpawnReport::default();

        if let Some(last) = self.last_spawn_ms {
            if now_ms - last < self.config.spawn_gate_ms() {
                log::trace!("Spawn gated: {:.3}ms since last batch", now_ms - last);
                report.gated = Some(SpawnGate::Interval);
                return report;
            }
        }
        self.last_spawn_ms = Some(now_ms);

        if self.is_full() {
            log::trace!("Spawn gated: field full at {}", self.live.len());
            report.gated = Some(SpawnGate::Capacity);
            return report;
        }

        let electrodes = self.electrodes;
        for (_, electrode) in electrodes.iter() {
            self.spawn_edge_row(electrode, &mut report);
        }
        for (polarity, electrode) in electrodes.iter() {
            self.spawn_colored(polarity, electrode, &mut report);
        }

        if report.failed > 0 || report.capped > 0 {
            log::debug!(
                "Batch at {:.1}ms: {} spawned, {} refused by renderer, {} over capacity",
                now_ms,
                report.total(),
                report.failed,
                report.capped
            );
        }
        report
    }

    /// Move every bubble one tick and retire those that reached their end.
    pub fn advance(&mut self) -> AdvanceReport {
        let params = self.motion_params();
        let mut report = AdvanceReport::default();

        std::mem::swap(&mut self.live, &mut self.scratch);
        for mut bubble in self.scratch.drain(..) {
            match bubble.step(&params, &mut self.rng) {
                Step::Active => {
                    self.renderer.set_position(bubble.handle(), bubble.position());
                    self.live.push(bubble);
                }
                Step::Retire => {
                    if bubble.category().is_colored() {
                        report.retired_colored += 1;
                    } else {
                        report.retired_white += 1;
                    }
                    self.renderer.dispose(bubble.into_handle());
                }
            }
        }

        report.active = self.live.len();
        report
    }

    /// Run one frame: a spawn attempt at `clock`'s time, then a motion step.
    pub fn tick<C: Clock + ?Sized>(&mut self, clock: &C) -> TickReport {
        let spawn = self.try_spawn_batch(clock.now_ms());
        let advance = self.advance();
        TickReport { spawn, advance }
    }

    /// Add a single bubble outside the batch policy.
    ///
    /// Respects the capacity ceiling. Returns `None` if the field is full or
    /// the renderer refused a drawable.
    pub fn spawn_bubble(&mut self, position: Vec3, motion: Motion) -> Option<BubbleId> {
        let mut report = SpawnReport::default();
        self.spawn(position, motion, &mut report)
    }

    /// Retire every live bubble, disposing its drawable. Returns how many.
    pub fn retire_all(&mut self) -> usize {
        let count = self.live.len();
        for bubble in self.live.drain(..) {
            self.renderer.dispose(bubble.into_handle());
        }
        if count > 0 {
            log::debug!("Retired all {} live bubbles", count);
        }
        count
    }

    /// Tear the field down, returning the renderer with nothing left allocated.
    pub fn into_renderer(mut self) -> R {
        self.retire_all();
        self.renderer
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.live.len() >= self.config.max_bubbles
    }

    /// Live bubbles, oldest first.
    pub fn bubbles(&self) -> &[Bubble<R::Handle>] {
        &self.live
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble<R::Handle>> {
        // Ids increase in spawn order and survivors keep their relative order.
        self.live
            .binary_search_by_key(&id, |b| b.id())
            .ok()
            .map(|i| &self.live[i])
    }

    /// Number of live bubbles of one category.
    pub fn count_of(&self, category: BubbleCategory) -> usize {
        self.live.iter().filter(|b| b.category() == category).count()
    }

    pub fn config(&self) -> &BubbleConfig {
        &self.config
    }

    pub fn electrodes(&self) -> &ElectrodePair {
        &self.electrodes
    }

    pub fn liquid(&self) -> LiquidVolume {
        self.liquid
    }

    /// Replace the liquid extent used for later colored spawns.
    ///
    /// Invalid bounds are rejected and the previous extent is kept.
    pub fn set_liquid(&mut self, liquid: LiquidVolume) -> Result<(), ConfigError> {
        if !liquid.is_valid() {
            return Err(ConfigError::invalid(
                "liquid",
                format!("bounds must be finite with top >= bottom, got {:?}", liquid),
            ));
        }
        self.liquid = liquid;
        Ok(())
    }

    /// Time of the last batch that passed the interval gate.
    pub fn last_spawn_ms(&self) -> Option<f64> {
        self.last_spawn_ms
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn motion_params(&self) -> MotionParams {
        MotionParams {
            speed: self.config.speed,
            jitter: self.config.white_jitter,
            retire_height: self.config.white_retire_height,
        }
    }

    /// Uniform draw in `[-half, half)`.
    #[inline]
    fn uniform(&mut self, half: f32) -> f32 {
        self.rng.gen_range(-half..half)
    }

    fn density(&self, polarity: Polarity) -> f32 {
        match polarity {
            Polarity::Negative => self.config.blue_density,
            Polarity::Positive => self.config.red_density,
        }
    }

    /// White bubbles evenly along the plate's bottom edge.
    fn spawn_edge_row(&mut self, electrode: &Electrode, report: &mut SpawnReport) {
        let count = self.config.white_edge_count_per_electrode;
        let aim_height = self.config.white_target_height;

        for i in 0..count {
            let width_fraction = i as f32 / count as f32 - 0.5;
            let position = Vec3::new(
                electrode.position.x,
                electrode.bottom(),
                electrode.position.z + width_fraction * electrode.depth,
            );
            let aim = Vec3::new(
                position.x + self.uniform(1.0),
                aim_height,
                position.z + self.uniform(2.0),
            );
            self.spawn(position, Motion::White { aim }, report);
        }
    }

    /// Density-weighted colored bubbles in the liquid near the plate.
    fn spawn_colored(
        &mut self,
        polarity: Polarity,
        electrode: &Electrode,
        report: &mut SpawnReport,
    ) {
        let density = self.density(polarity);

        for _ in 0..self.config.colored_draws_per_electrode {
            if self.rng.gen::<f32>() >= density {
                continue;
            }

            let position = Vec3::new(
                electrode.position.x + self.uniform(1.0),
                self.liquid.lerp(self.rng.gen::<f32>()),
                electrode.position.z + self.uniform(0.5) * electrode.depth,
            );
            let jitter = Vec3::new(self.uniform(0.25), self.uniform(0.25), self.uniform(0.25));
            let motion = Motion::Colored {
                source: polarity,
                target: electrode.position + jitter,
            };
            self.spawn(position, motion, report);
        }
    }

    fn spawn(
        &mut self,
        position: Vec3,
        motion: Motion,
        report: &mut SpawnReport,
    ) -> Option<BubbleId> {
        if self.is_full() {
            report.capped += 1;
            return None;
        }

        let category = motion.category();
        let handle = match self.renderer.allocate(category) {
            Ok(handle) => handle,
            Err(e) => {
                log::debug!("Skipping {} bubble: {}", category.name(), e);
                report.failed += 1;
                return None;
            }
        };
        self.renderer.set_position(&handle, position);

        let id = BubbleId(self.next_id);
        self.next_id += 1;
        self.live.push(Bubble::new(id, position, motion, handle));
        report.record(category);
        Some(id)
    }
}

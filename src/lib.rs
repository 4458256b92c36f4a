//! # Electrolysis - gas bubbles for water-splitting visualizations
//!
//! Particle kinematics for an electrolysis cell: two electrodes in a jar of
//! liquid, each giving off a stream of gas bubbles. The crate owns the bubble
//! state and motion; drawing is delegated to a renderer you plug in.
//!
//! ## Quick Start
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
//! for _ in 0..600 {
//!     clock.tick();
//!     let report = field.tick(&clock);
//!     println!("{} live, {} retired", field.live_count(), report.advance.retired());
//! }
//! field.retire_all();
//! ```
//!
//! ## Core Concepts
//!
//! ### Bubbles
//!
//! | Category | Spawned | Moves | Retires |
//! |----------|---------|-------|---------|
//! | White | along each plate's bottom edge | rises, jittering sideways | above the surface |
//! | Blue | in the liquid near the cathode | homes onto the cathode | on arrival |
//! | Red | in the liquid near the anode | homes onto the anode | on arrival |
//!
//! The anode is configured with twice the density of the cathode, so more red
//! gas appears than blue.
//!
//! ### Renderers
//!
//! Implement [`DrawableFactory`] to connect the field to a scene graph. Each
//! bubble owns exactly one handle from spawn to retirement.
//!
//! ### Clocks
//!
//! Spawn batches are gated on wall-clock time. [`FrameClock`] is the usual
//! per-frame timer; [`clock::ManualClock`] gives full control.

pub mod bubble;
pub mod cable;
pub mod clock;
pub mod config;
pub mod drawable;
pub mod electrode;
pub mod error;
mod field;

pub use glam::{Quat, Vec3};

pub use bubble::{Bubble, BubbleCategory, BubbleId, Motion};
pub use cable::{CableLayout, CableSegment, SegmentRole};
pub use clock::{Clock, FrameClock};
pub use config::{ApparatusConfig, BubbleConfig, SceneConfig};
pub use drawable::{DrawableFactory, DrawableId, SceneLedger};
pub use electrode::{Electrode, ElectrodePair, LiquidVolume, Polarity};
pub use error::{CableError, ConfigError, DrawableError, LoadError};
pub use field::{AdvanceReport, BubbleField, SpawnGate, SpawnReport, TickReport};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use electrolysis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::ManualClock;
    pub use crate::{
        AdvanceReport, Bubble, BubbleCategory, BubbleConfig, BubbleField, BubbleId, CableLayout,
        Clock, ConfigError, DrawableError, DrawableFactory, Electrode, ElectrodePair, FrameClock,
        LiquidVolume, Motion, Polarity, SceneLedger, SpawnGate, SpawnReport, TickReport, Vec3,
    };
}

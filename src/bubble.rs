//! Bubble particles and their motion laws.
//!
//! A bubble is either *white* (free gas rising off a plate edge) or *colored*
//! (gas drifting back to the plate that produced it). The two laws are kept
//! as a sum type so a bubble can never switch between them.
//!
//! | Category | Law | Retires when |
//! |----------|-----|--------------|
//! | White | jitter x/z, rise by `speed` | `y > white_retire_height` |
//! | Blue, Red | step `speed` toward target | `distance < speed` |

use crate::electrode::Polarity;
use glam::Vec3;
use rand::Rng;

/// Category of a bubble, fixed at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BubbleCategory {
    White,
    /// Cathode gas.
    Blue,
    /// Anode gas.
    Red,
}

impl BubbleCategory {
    /// Opacity render collaborators use for every bubble material.
    pub const OPACITY: f32 = 0.8;

    /// All categories, in spawn order.
    pub const ALL: [BubbleCategory; 3] = [
        BubbleCategory::White,
        BubbleCategory::Blue,
        BubbleCategory::Red,
    ];

    /// Material color (RGB, 0.0-1.0).
    pub fn color(self) -> Vec3 {
        match self {
            BubbleCategory::White => Vec3::ONE,
            BubbleCategory::Blue => Vec3::new(0.0, 0.0, 1.0),
            BubbleCategory::Red => Vec3::new(1.0, 0.0, 0.0),
        }
    }

    #[inline]
    pub fn is_colored(self) -> bool {
        !matches!(self, BubbleCategory::White)
    }

    pub fn name(self) -> &'static str {
        match self {
            BubbleCategory::White => "white",
            BubbleCategory::Blue => "blue",
            BubbleCategory::Red => "red",
        }
    }
}

/// Stable identifier of a bubble within one field.
///
/// Ids are handed out in spawn order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BubbleId(pub u64);

/// Motion law of a bubble, with the state that law needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Rise with horizontal jitter.
    ///
    /// `aim` is the point picked at spawn (lateral scatter at a fixed
    /// height). The rising law does not steer toward it.
    White { aim: Vec3 },
    /// Home toward `target` in straight steps.
    ///
    /// `source` is the plate whose gas this is and decides the color.
    Colored { source: Polarity, target: Vec3 },
}

/// Tunables the motion laws read each step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Distance per tick.
    pub speed: f32,
    /// Half-width of the uniform x/z jitter applied to white bubbles.
    pub jitter: f32,
    /// White bubbles above this height retire.
    pub retire_height: f32,
}

/// Result of applying a motion law once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Active,
    Retire,
}

impl Motion {
    pub fn category(&self) -> BubbleCategory {
        match self {
            Motion::White { .. } => BubbleCategory::White,
            Motion::Colored { source, .. } => source.bubble_category(),
        }
    }

    /// Homing target of a colored bubble.
    pub fn target(&self) -> Option<Vec3> {
        match self {
            Motion::White { .. } => None,
            Motion::Colored { target, .. } => Some(*target),
        }
    }

    /// Advance `position` by one tick and report whether the bubble is done.
    pub fn step<G: Rng>(&self, position: &mut Vec3, params: &MotionParams, rng: &mut G) -> Step {
        match self {
            Motion::White { .. } => {
                if params.jitter > 0.0 {
                    position.x += rng.gen_range(-params.jitter..params.jitter);
                    position.z += rng.gen_range(-params.jitter..params.jitter);
                }
                position.y += params.speed;

                if position.y > params.retire_height {
                    Step::Retire
                } else {
                    Step::Active
                }
            }
            Motion::Colored { target, .. } => {
                // Zero when already on target, so the bubble stays put and retires.
                let direction = (*target - *position).normalize_or_zero();
                *position += direction * params.speed;

                if position.distance(*target) < params.speed {
                    Step::Retire
                } else {
                    Step::Active
                }
            }
        }
    }
}

/// A live bubble owned by a [`BubbleField`](crate::BubbleField).
///
/// `H` is the renderer's drawable handle. The field holds it exclusively until
/// the bubble retires, at which point it is passed back for disposal.
#[derive(Debug)]
pub struct Bubble<H> {
    id: BubbleId,
    position: Vec3,
    motion: Motion,
    handle: H,
}

impl<H> Bubble<H> {
    pub(crate) fn new(id: BubbleId, position: Vec3, motion: Motion, handle: H) -> Self {
        Self {
            id,
            position,
            motion,
            handle,
        }
    }

    #[inline]
    pub fn id(&self) -> BubbleId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn category(&self) -> BubbleCategory {
        self.motion.category()
    }

    #[inline]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Homing target, `None` for white bubbles.
    #[inline]
    pub fn target(&self) -> Option<Vec3> {
        self.motion.target()
    }

    #[inline]
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub(crate) fn step<G: Rng>(&mut self, params: &MotionParams, rng: &mut G) -> Step {
        self.motion.step(&mut self.position, params, rng)
    }

    pub(crate) fn into_handle(self) -> H {
        self.handle
    }
}

//! Renderer seam for bubble drawables.
//!
//! The bubble field never draws anything itself. It asks a
//! [`DrawableFactory`] for one primitive per bubble, moves it every tick and
//! hands it back when the bubble retires. Handles are passed back *by value*,
//! so a retired bubble's handle cannot be disposed twice.
//!
//! [`SceneLedger`] is a headless factory that only keeps books. It backs the
//! runner binary and the tests.

use crate::bubble::BubbleCategory;
use crate::error::DrawableError;
use glam::Vec3;
use std::collections::HashMap;

/// External renderer collaborator.
///
/// # Example
///
/// ```ignore
/// struct MeshPool { /* ... */ }
///
/// impl DrawableFactory for MeshPool {
///     type Handle = MeshKey;
///
///     fn allocate(&mut self, category: BubbleCategory) -> Result<MeshKey, DrawableError> {
///         self.spawn_sphere(category.color(), BubbleCategory::OPACITY)
///     }
///
///     fn set_position(&mut self, handle: &MeshKey, position: Vec3) {
///         self.transforms[*handle] = position;
///     }
///
///     fn dispose(&mut self, handle: MeshKey) {
///         self.remove(handle);
///     }
/// }
/// ```
pub trait DrawableFactory {
    /// Opaque reference to one renderer primitive.
    type Handle;

    /// Create a primitive for a bubble of the given category.
    fn allocate(&mut self, category: BubbleCategory) -> Result<Self::Handle, DrawableError>;

    /// Move a primitive.
    fn set_position(&mut self, handle: &Self::Handle, position: Vec3);

    /// Release a primitive. Consumes the handle.
    fn dispose(&mut self, handle: Self::Handle);
}

impl<F: DrawableFactory + ?Sized> DrawableFactory for &mut F {
    type Handle = F::Handle;

    fn allocate(&mut self, category: BubbleCategory) -> Result<Self::Handle, DrawableError> {
        (**self).allocate(category)
    }

    fn set_position(&mut self, handle: &Self::Handle, position: Vec3) {
        (**self).set_position(handle, position)
    }

    fn dispose(&mut self, handle: Self::Handle) {
        (**self).dispose(handle)
    }
}

/// Handle issued by [`SceneLedger`].
///
/// Deliberately not `Clone`: the only copy lives in the bubble that owns it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DrawableId(u64);

impl DrawableId {
    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    category: BubbleCategory,
    position: Vec3,
}

/// Headless drawable factory that records what a renderer would be asked.
#[derive(Debug, Default)]
pub struct SceneLedger {
    next_id: u64,
    live: HashMap<u64, Entry>,
    budget: Option<usize>,
    allocated: [usize; 3],
    disposed: usize,
    failed: usize,
    stale_updates: usize,
}

impl SceneLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that refuses allocations once `budget` primitives are live.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: Some(budget),
            ..Self::default()
        }
    }

    /// Number of primitives currently live.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether `raw` names a live primitive.
    pub fn is_live(&self, raw: u64) -> bool {
        self.live.contains_key(&raw)
    }

    /// Last position set for a live primitive.
    pub fn position_of(&self, raw: u64) -> Option<Vec3> {
        self.live.get(&raw).map(|e| e.position)
    }

    /// Category a live primitive was allocated for.
    pub fn category_of(&self, raw: u64) -> Option<BubbleCategory> {
        self.live.get(&raw).map(|e| e.category)
    }

    /// Total primitives ever allocated for `category`.
    pub fn allocated(&self, category: BubbleCategory) -> usize {
        self.allocated[slot(category)]
    }

    pub fn total_allocated(&self) -> usize {
        self.allocated.iter().sum()
    }

    /// Total primitives released.
    #[inline]
    pub fn disposed(&self) -> usize {
        self.disposed
    }

    /// Allocations refused because the budget was exhausted.
    #[inline]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Position updates or disposals that named a primitive that was not live.
    ///
    /// Stays zero as long as every caller respects handle ownership.
    #[inline]
    pub fn stale_updates(&self) -> usize {
        self.stale_updates
    }
}

fn slot(category: BubbleCategory) -> usize {
    match category {
        BubbleCategory::White => 0,
        BubbleCategory::Blue => 1,
        BubbleCategory::Red => 2,
    }
}

impl DrawableFactory for SceneLedger {
    type Handle = DrawableId;

    fn allocate(&mut self, category: BubbleCategory) -> Result<DrawableId, DrawableError> {
        if let Some(budget) = self.budget {
            if self.live.len() >= budget {
                self.failed += 1;
                return Err(DrawableError::Exhausted { budget });
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(
            id,
            Entry {
                category,
                position: Vec3::ZERO,
            },
        );
        self.allocated[slot(category)] += 1;
        Ok(DrawableId(id))
    }

    fn set_position(&mut self, handle: &DrawableId, position: Vec3) {
        match self.live.get_mut(&handle.0) {
            Some(entry) => entry.position = position,
            None => self.stale_updates += 1,
        }
    }

    fn dispose(&mut self, handle: DrawableId) {
        if self.live.remove(&handle.0).is_some() {
            self.disposed += 1;
        } else {
            log::warn!("Dispose of unknown drawable {}", handle.0);
            self.stale_updates += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_lifecycle() {
        let mut ledger = SceneLedger::new();
        let a = ledger.allocate(BubbleCategory::White).unwrap();
        let b = ledger.allocate(BubbleCategory::Red).unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.live_count(), 2);

        ledger.set_position(&b, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(ledger.position_of(b.raw()), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(ledger.category_of(b.raw()), Some(BubbleCategory::Red));

        let raw_a = a.raw();
        ledger.dispose(a);
        assert!(!ledger.is_live(raw_a));
        assert_eq!(ledger.disposed(), 1);
        assert_eq!(ledger.live_count(), 1);
        assert_eq!(ledger.allocated(BubbleCategory::White), 1);
        assert_eq!(ledger.stale_updates(), 0);
    }

    #[test]
    fn test_ledger_budget() {
        let mut ledger = SceneLedger::with_budget(1);
        let first = ledger.allocate(BubbleCategory::Blue).unwrap();
        assert_eq!(
            ledger.allocate(BubbleCategory::Blue),
            Err(DrawableError::Exhausted { budget: 1 })
        );
        assert_eq!(ledger.failed(), 1);

        ledger.dispose(first);
        assert!(ledger.allocate(BubbleCategory::Blue).is_ok());
        assert_eq!(ledger.total_allocated(), 2);
    }

    #[test]
    fn test_ledger_through_mut_ref() {
        fn spawn_one<F: DrawableFactory>(mut factory: F) -> F::Handle {
            factory.allocate(BubbleCategory::White).unwrap()
        }

        let mut ledger = SceneLedger::new();
        let handle = spawn_one(&mut ledger);
        assert!(ledger.is_live(handle.raw()));
    }
}

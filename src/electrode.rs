//! Electrodes and the liquid volume they sit in.
//!
//! Both are read-only inputs to the bubble field. The scene that owns the
//! actual plate and liquid meshes hands their geometry over as plain values.
//!
//! # Example
//!
//! ```ignore
//! let electrodes = ElectrodePair::new(
//!     Electrode::new(Vec3::new(-1.5, 1.0, 0.0), 0.1, 6.0, 2.0),
//!     Electrode::new(Vec3::new(1.5, 1.0, 0.0), 0.1, 6.0, 2.0),
//! );
//! let liquid = LiquidVolume::from_column(-0.625, 3.75);
//! ```

use crate::bubble::BubbleCategory;
use glam::Vec3;

/// Which terminal of the power supply a plate is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Cathode. Evolves hydrogen, drawn with blue bubbles.
    Negative,
    /// Anode. Evolves oxygen, drawn with red bubbles.
    Positive,
}

impl Polarity {
    /// Category of the colored bubbles this plate emits.
    pub fn bubble_category(self) -> BubbleCategory {
        match self {
            Polarity::Negative => BubbleCategory::Blue,
            Polarity::Positive => BubbleCategory::Red,
        }
    }
}

/// A planar emitter plate.
///
/// `width` runs along x (plate thickness in the standard jar), `height` along
/// y and `depth` along z. Bubbles are distributed along the depth edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Electrode {
    /// Center of the plate.
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Electrode {
    pub fn new(position: Vec3, width: f32, height: f32, depth: f32) -> Self {
        Self {
            position,
            width,
            height,
            depth,
        }
    }

    /// Y coordinate of the plate's lower edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y - self.height / 2.0
    }

    /// Whether every coordinate and extent is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.depth.is_finite()
    }
}

/// The cathode/anode pair of an electrolysis cell.
///
/// The pair is fixed for the lifetime of a bubble field; there is always
/// exactly one plate of each polarity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElectrodePair {
    pub negative: Electrode,
    pub positive: Electrode,
}

impl ElectrodePair {
    pub fn new(negative: Electrode, positive: Electrode) -> Self {
        Self { negative, positive }
    }

    /// Plates of the standard jar: 0.1 x 6 x 2 plates, 3 units apart.
    pub fn standard() -> Self {
        Self {
            negative: Electrode::new(Vec3::new(-1.5, 1.0, 0.0), 0.1, 6.0, 2.0),
            positive: Electrode::new(Vec3::new(1.5, 1.0, 0.0), 0.1, 6.0, 2.0),
        }
    }

    /// Plate wired to the given terminal.
    pub fn get(&self, polarity: Polarity) -> &Electrode {
        match polarity {
            Polarity::Negative => &self.negative,
            Polarity::Positive => &self.positive,
        }
    }

    /// Both plates, cathode first.
    pub fn iter(&self) -> impl Iterator<Item = (Polarity, &Electrode)> {
        [
            (Polarity::Negative, &self.negative),
            (Polarity::Positive, &self.positive),
        ]
        .into_iter()
    }

    /// Distance between the two plate centers.
    pub fn separation(&self) -> f32 {
        self.negative.position.distance(self.positive.position)
    }
}

/// World-space vertical extent of the liquid.
///
/// Colored bubbles spawn somewhere between `bottom` and `top`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidVolume {
    pub top: f32,
    pub bottom: f32,
}

impl LiquidVolume {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    /// Full extent of a liquid column centered at `center_y`.
    pub fn from_column(center_y: f32, height: f32) -> Self {
        Self::from_column_band(center_y, height, 2.0)
    }

    /// Extent of a column using `height / divisor` above and below the center.
    ///
    /// A divisor of 2 gives the full column, 4 the middle half.
    pub fn from_column_band(center_y: f32, height: f32, divisor: f32) -> Self {
        let half = height / divisor;
        Self {
            top: center_y + half,
            bottom: center_y - half,
        }
    }

    /// Liquid of the standard jar (column of 3.75 centered at y = -0.625).
    pub fn standard() -> Self {
        Self::from_column(-0.625, 3.75)
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.top - self.bottom
    }

    /// Point at `fraction` of the way from bottom to top.
    #[inline]
    pub fn lerp(&self, fraction: f32) -> f32 {
        self.bottom + fraction * self.depth()
    }

    /// Finite bounds with `top` not below `bottom`.
    pub fn is_valid(&self) -> bool {
        self.top.is_finite() && self.bottom.is_finite() && self.top >= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_categories() {
        assert_eq!(Polarity::Negative.bubble_category(), BubbleCategory::Blue);
        assert_eq!(Polarity::Positive.bubble_category(), BubbleCategory::Red);
    }

    #[test]
    fn test_standard_pair() {
        let pair = ElectrodePair::standard();
        assert!((pair.separation() - 3.0).abs() < 1e-6);
        assert_eq!(pair.get(Polarity::Negative).position.x, -1.5);
        assert_eq!(pair.negative.bottom(), -2.0);

        let order: Vec<Polarity> = pair.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![Polarity::Negative, Polarity::Positive]);
    }

    #[test]
    fn test_liquid_column() {
        let liquid = LiquidVolume::standard();
        assert!((liquid.top - 1.25).abs() < 1e-6);
        assert!((liquid.bottom + 2.5).abs() < 1e-6);
        assert!((liquid.lerp(0.5) - (-0.625)).abs() < 1e-6);

        let band = LiquidVolume::from_column_band(0.0, 4.0, 4.0);
        assert_eq!(band, LiquidVolume::new(1.0, -1.0));
    }

    #[test]
    fn test_liquid_validity() {
        assert!(LiquidVolume::standard().is_valid());
        assert!(LiquidVolume::new(0.5, 0.5).is_valid());
        assert!(!LiquidVolume::new(-1.0, 1.0).is_valid());
        assert!(!LiquidVolume::from_column_band(0.0, 4.0, 0.0).is_valid());
        assert!(!LiquidVolume::new(f32::NAN, 0.0).is_valid());
    }
}

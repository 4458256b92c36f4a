//! Segmented cable layout between two endpoints.
//!
//! A PSU lead is drawn as a chain of short cylinders from a banana plug at the
//! supply to a crocodile clip on an electrode. This module derives the
//! per-segment transforms; attaching them to meshes or physics bodies is the
//! host's business.
//!
//! ```text
//!  start                                               end
//!  [Plug]==[Body]==[Body]==[Body]==[Body]==[Body]==[Clip]
//! ```
//!
//! # Example
//!
//! ```ignore
//! let lead = CableLayout::new(psu_red_terminal, anode_top, 10, 0.1)?;
//! for segment in lead.segments() {
//!     mesh.set_transform(segment.center, segment.orientation);
//! }
//! ```

use crate::error::CableError;
use glam::{Quat, Vec3};

/// Radius multiplier applied to the two tip segments.
pub const TIP_RADIUS_SCALE: f32 = 1.1;

/// What a segment represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentRole {
    /// Banana plug at the start point.
    Plug,
    Body,
    /// Crocodile clip at the end point.
    Clip,
}

/// Transform and size of one cable segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CableSegment {
    pub index: usize,
    pub center: Vec3,
    pub length: f32,
    pub radius: f32,
    /// Rotates the segment's local +Y axis onto the cable direction.
    pub orientation: Quat,
    pub role: SegmentRole,
}

/// Pivot linking two consecutive segments.
///
/// Offsets are in each segment's local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CableJoint {
    /// Index of the earlier segment.
    pub a: usize,
    pub pivot_a: Vec3,
    /// Index of the later segment.
    pub b: usize,
    pub pivot_b: Vec3,
}

/// A straight cable split into equal segments.
#[derive(Clone, Debug, PartialEq)]
pub struct CableLayout {
    start: Vec3,
    end: Vec3,
    segment_count: usize,
    radius: f32,
}

impl CableLayout {
    pub fn new(
        start: Vec3,
        end: Vec3,
        segment_count: usize,
        radius: f32,
    ) -> Result<Self, CableError> {
        if segment_count < 2 {
            return Err(CableError::TooFewSegments(segment_count));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(CableError::InvalidRadius(radius));
        }
        let layout = Self {
            start,
            end,
            segment_count,
            radius,
        };
        layout.direction()?;
        Ok(layout)
    }

    #[inline]
    pub fn start(&self) -> Vec3 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Vec3 {
        self.end
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Straight-line length from start to end.
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn segment_length(&self) -> f32 {
        self.length() / self.segment_count as f32
    }

    /// Move the endpoints. The layout is left untouched on error.
    pub fn set_endpoints(&mut self, start: Vec3, end: Vec3) -> Result<(), CableError> {
        (end - start).try_normalize().ok_or(CableError::ZeroLength)?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    fn direction(&self) -> Result<Vec3, CableError> {
        (self.end - self.start).try_normalize().ok_or(CableError::ZeroLength)
    }

    /// All segments, plug first.
    pub fn segments(&self) -> Vec<CableSegment> {
        // Endpoints are checked in `new` and `set_endpoints`.
        let direction = self.direction().unwrap_or(Vec3::Y);
        let orientation = Quat::from_rotation_arc(Vec3::Y, direction);
        let length = self.segment_length();
        let last = self.segment_count - 1;

        (0..self.segment_count)
            .map(|i| {
                let (role, center) = if i == 0 {
                    (SegmentRole::Plug, self.start)
                } else if i == last {
                    (SegmentRole::Clip, self.end)
                } else {
                    (SegmentRole::Body, self.start + direction * length * i as f32)
                };
                let radius = match role {
                    SegmentRole::Body => self.radius,
                    SegmentRole::Plug | SegmentRole::Clip => self.radius * TIP_RADIUS_SCALE,
                };
                CableSegment {
                    index: i,
                    center,
                    length,
                    radius,
                    orientation,
                    role,
                }
            })
            .collect()
    }

    /// Point-to-point pivots between consecutive segments.
    pub fn joints(&self) -> Vec<CableJoint> {
        let half = self.segment_length() / 2.0;
        (1..self.segment_count)
            .map(|i| CableJoint {
                a: i - 1,
                pivot_a: Vec3::new(0.0, -half, 0.0),
                b: i,
                pivot_b: Vec3::new(0.0, half, 0.0),
            })
            .collect()
    }
}

//! Axis-aligned bounding boxes over padded 3-component coordinates.
//!
//! Unused trailing axes of 1D and 2D meshes are padded with zeros, so every
//! box is degenerate (zero extent) along those axes and all containment and
//! overlap tests stay valid without special cases.

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    /// The empty box: contains nothing, neutral for [`Aabb::union`].
    pub const EMPTY: Aabb = Aabb {
        min: [f64::INFINITY; 3],
        max: [f64::NEG_INFINITY; 3],
    };

    /// Smallest box holding all `points`; [`Aabb::EMPTY`] for no points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, p| acc.union(&Aabb { min: *p, max: *p }))
    }

    /// Smallest box holding both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] = out.min[axis].min(other.min[axis]);
            out.max[axis] = out.max[axis].max(other.max[axis]);
        }
        out
    }

    /// Whether the box holds no point.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Box grown by `margin` on every side of the first `dimension` axes.
    pub fn inflate(&self, margin: f64, dimension: usize) -> Aabb {
        let mut out = *self;
        for axis in 0..dimension.min(3) {
            out.min[axis] -= margin;
            out.max[axis] += margin;
        }
        out
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Inclusive overlap test (touching boxes overlap).
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.max[axis] >= other.min[axis] && self.min[axis] <= other.max[axis])
    }

    /// Largest edge length over all axes.
    pub fn longest_extent(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (0..3)
            .map(|axis| self.max[axis] - self.min[axis])
            .fold(0.0, f64::max)
    }

    /// Center of the box.
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }
}

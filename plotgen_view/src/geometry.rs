// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-space geometry and real-space bounding boxes.

use kurbo::Rect;

/// Largest device coordinate magnitude the engine will ever produce.
///
/// This is the platform point-coordinate limit, `2^27 - 1`.
pub const DEV_LIMIT: i64 = (1 << 27) - 1;

/// Largest `|real * factor|` for which `f64` still resolves single pixels, `2^53`.
pub const PREC_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Rounds half-way cases towards positive infinity.
///
/// Every conversion from a real value to a device integer goes through this
/// function so that forward geometry and inverse queries agree exactly.
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    let c = libm::ceil(x);
    if c - x > 0.5 { c - 1.0 } else { c }
}

/// Converts an already rounded device value into an `i64`, saturating.
#[must_use]
pub(crate) fn to_device_int(x: f64) -> i64 {
    if x.is_nan() {
        0
    } else {
        #[expect(clippy::cast_possible_truncation, reason = "float to int casts saturate")]
        let v = x as i64;
        v
    }
}

/// A point in device (pixel) space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DevicePoint {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate, growing downwards.
    pub y: i32,
}

impl DevicePoint {
    /// The device origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a new device point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a device point from `i64` coordinates, saturating into `i32`.
    #[must_use]
    pub fn saturating_from(x: i64, y: i64) -> Self {
        Self {
            x: saturate_i32(x),
            y: saturate_i32(y),
        }
    }
}

pub(crate) fn saturate_i32(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}

/// A size in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceSize {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl DeviceSize {
    /// Creates a new device size.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in device space with inclusive bounds.
///
/// `x0..=x1` and `y0..=y1` are the covered pixel columns and rows. A single
/// pixel has `x0 == x1` and `y0 == y1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceRect {
    /// Left column.
    pub x0: i32,
    /// Top row.
    pub y0: i32,
    /// Right column (inclusive).
    pub x1: i32,
    /// Bottom row (inclusive).
    pub y1: i32,
}

impl DeviceRect {
    /// Creates a rectangle from inclusive bounds, normalizing the corner order.
    #[must_use]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// A rectangle covering exactly one pixel.
    #[must_use]
    pub const fn point(p: DevicePoint) -> Self {
        Self {
            x0: p.x,
            y0: p.y,
            x1: p.x,
            y1: p.y,
        }
    }

    /// A rectangle at `origin` covering `size` pixels.
    ///
    /// Empty sizes produce a single-pixel rectangle at the origin.
    #[must_use]
    pub fn from_origin_size(origin: DevicePoint, size: DeviceSize) -> Self {
        Self {
            x0: origin.x,
            y0: origin.y,
            x1: origin.x.saturating_add(size.width.max(1) - 1),
            y1: origin.y.saturating_add(size.height.max(1) - 1),
        }
    }

    /// Bounding box of a point slice, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[DevicePoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut r = Self::point(*first);
        for p in rest {
            r.x0 = r.x0.min(p.x);
            r.x1 = r.x1.max(p.x);
            r.y0 = r.y0.min(p.y);
            r.y1 = r.y1.max(p.y);
        }
        Some(r)
    }

    /// Horizontal extent in pixels, `x1 - x0`.
    #[must_use]
    pub fn width(&self) -> i64 {
        i64::from(self.x1) - i64::from(self.x0)
    }

    /// Vertical extent in pixels, `y1 - y0`.
    #[must_use]
    pub fn height(&self) -> i64 {
        i64::from(self.y1) - i64::from(self.y0)
    }

    /// Returns `true` if the two rectangles share at least one pixel.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x0 <= other.x0 && other.x1 <= self.x1 && self.y0 <= other.y0 && other.y1 <= self.y1
    }

    /// Returns `true` if the point lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, p: DevicePoint) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Clamps the rectangle into `bounds`, or `None` if they do not overlap.
    #[must_use]
    pub fn intersect(&self, bounds: &Self) -> Option<Self> {
        if !self.intersects(bounds) {
            return None;
        }
        Some(Self {
            x0: self.x0.max(bounds.x0),
            y0: self.y0.max(bounds.y0),
            x1: self.x1.min(bounds.x1),
            y1: self.y1.min(bounds.y1),
        })
    }
}

/// Real-space bounding box of a curve or dataset.
///
/// A box whose components are NaN means "no data". That state is kept
/// distinct from a zero box so that empty datasets never contribute phantom
/// points at the origin. [`RealBBox::union`] relies on `f64::min`/`f64::max`
/// ignoring a NaN operand, so folding over empty boxes is harmless.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RealBBox {
    /// Smallest x.
    pub min_x: f64,
    /// Largest x.
    pub max_x: f64,
    /// Smallest y.
    pub min_y: f64,
    /// Largest y.
    pub max_y: f64,
}

impl Default for RealBBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl RealBBox {
    /// The "no data" box.
    pub const EMPTY: Self = Self {
        min_x: f64::NAN,
        max_x: f64::NAN,
        min_y: f64::NAN,
        max_y: f64::NAN,
    };

    /// Creates a box from its components.
    #[must_use]
    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Bounding box of a sequence of points; empty input gives [`RealBBox::EMPTY`].
    pub fn from_points(points: impl IntoIterator<Item = kurbo::Point>) -> Self {
        points.into_iter().fold(Self::EMPTY, |acc, p| {
            acc.union(&Self::new(p.x, p.x, p.y, p.y))
        })
    }

    /// Returns `true` if any component is NaN.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_x.is_nan() || self.max_x.is_nan() || self.min_y.is_nan() || self.max_y.is_nan()
    }

    /// Returns `true` if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }

    /// Returns `true` if the x range is usable.
    #[must_use]
    pub fn has_x(&self) -> bool {
        self.min_x.is_finite() && self.max_x.is_finite()
    }

    /// Returns `true` if the y range is usable.
    #[must_use]
    pub fn has_y(&self) -> bool {
        self.min_y.is_finite() && self.max_y.is_finite()
    }

    /// NaN-aware componentwise union.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Mirrors the y range around zero using `max(|min_y|, |max_y|)`.
    #[must_use]
    pub fn symmetric_y(&self) -> Self {
        if !self.has_y() {
            return *self;
        }
        let m = libm::fabs(self.min_y).max(libm::fabs(self.max_y));
        Self {
            min_y: -m,
            max_y: m,
            ..*self
        }
    }

    /// Widens the y range so that it contains zero.
    #[must_use]
    pub fn including_y_zero(&self) -> Self {
        if !self.has_y() {
            return *self;
        }
        Self {
            min_y: self.min_y.min(0.0),
            max_y: self.max_y.max(0.0),
            ..*self
        }
    }

    /// Converts into a real rect (`y0` is the bottom edge).
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Converts a real rect into a box.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs();
        Self::new(r.x0, r.x1, r.y0, r.y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up_breaks_ties_upwards() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(-2.5001), -3.0);
        assert_eq!(round_half_up(7.0), 7.0);
    }

    #[test]
    fn nan_union_ignores_empty_boxes() {
        let a = RealBBox::new(0.0, 1.0, -1.0, 1.0);
        assert_eq!(RealBBox::EMPTY.union(&a), a);
        assert_eq!(a.union(&RealBBox::EMPTY), a);
        assert!(RealBBox::EMPTY.union(&RealBBox::EMPTY).is_empty());
    }

    #[test]
    fn symmetric_and_zero_inclusion() {
        let b = RealBBox::new(0.0, 1.0, -2.0, 3.0);
        let s = b.symmetric_y();
        assert_eq!((s.min_y, s.max_y), (-3.0, 3.0));

        let z = RealBBox::new(0.0, 1.0, 2.0, 3.0).including_y_zero();
        assert_eq!((z.min_y, z.max_y), (0.0, 3.0));
        assert!(RealBBox::EMPTY.symmetric_y().is_empty());
    }

    #[test]
    fn device_rect_relations() {
        let a = DeviceRect::new(0, 0, 10, 10);
        let b = DeviceRect::new(5, 5, 20, 20);
        let c = DeviceRect::new(11, 0, 12, 1);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_rect(&DeviceRect::new(1, 1, 9, 9)));
        assert!(!a.contains_rect(&b));
        assert_eq!(a.intersect(&b), Some(DeviceRect::new(5, 5, 10, 10)));
        assert_eq!(a.union(&c), DeviceRect::new(0, 0, 12, 10));
    }

    #[test]
    fn saturating_point() {
        let p = DevicePoint::saturating_from(i64::MAX, i64::MIN);
        assert_eq!(p, DevicePoint::new(i32::MAX, i32::MIN));
    }
}

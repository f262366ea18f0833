// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use crate::geometry::{DevicePoint, DeviceRect, RealBBox, round_half_up, to_device_int};

/// Affine real → device mapping with integer offsets.
///
/// A real coordinate `v` maps to `round_half_up(v * factor) - offset`. Keeping
/// the offset as an integer, applied after rounding, means the mapping of a
/// value never depends on how far the view has been scrolled, which keeps
/// cached curves valid while panning.
///
/// By convention `x_factor > 0` and `y_factor < 0` (device Y grows downward).
/// A factor of exactly `0.0` marks a collapsed axis: every value maps to
/// `-offset`.
///
/// Equality is plain field equality and is used as a cache key for curves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    /// Subtracted from the rounded x product.
    pub x_offset: i64,
    /// Subtracted from the rounded y product.
    pub y_offset: i64,
    /// Pixels per real x unit.
    pub x_factor: f64,
    /// Pixels per real y unit (negative).
    pub y_factor: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            x_offset: 0,
            y_offset: 0,
            x_factor: 1.0,
            y_factor: -1.0,
        }
    }
}

impl Scale {
    /// Creates a scale from its parts.
    #[must_use]
    pub const fn new(x_offset: i64, y_offset: i64, x_factor: f64, y_factor: f64) -> Self {
        Self {
            x_offset,
            y_offset,
            x_factor,
            y_factor,
        }
    }

    /// Maps a real x value to a device column.
    #[must_use]
    pub fn x_to_device(&self, x: f64) -> i64 {
        map(x, self.x_factor, self.x_offset)
    }

    /// Maps a real y value to a device row.
    #[must_use]
    pub fn y_to_device(&self, y: f64) -> i64 {
        map(y, self.y_factor, self.y_offset)
    }

    /// Maps a real point to a device point, saturating into `i32`.
    #[must_use]
    pub fn to_device(&self, p: Point) -> DevicePoint {
        DevicePoint::saturating_from(self.x_to_device(p.x), self.y_to_device(p.y))
    }

    /// Maps a device column back to real space.
    ///
    /// Returns NaN on a collapsed axis; callers that need a value there use
    /// the viewport, which knows the collapse point.
    #[must_use]
    pub fn x_to_real(&self, x: i64) -> f64 {
        unmap(x, self.x_factor, self.x_offset)
    }

    /// Maps a device row back to real space.
    #[must_use]
    pub fn y_to_real(&self, y: i64) -> f64 {
        unmap(y, self.y_factor, self.y_offset)
    }

    /// Device bounding box of a real bounding box.
    ///
    /// A box with non-finite components collapses to the single pixel at
    /// `(-x_offset, -y_offset)`.
    #[must_use]
    pub fn bbox_to_device(&self, bbox: &RealBBox) -> DeviceRect {
        if !bbox.is_finite() {
            return DeviceRect::point(DevicePoint::saturating_from(
                self.x_offset.saturating_neg(),
                self.y_offset.saturating_neg(),
            ));
        }
        let a = DevicePoint::saturating_from(
            self.x_to_device(bbox.min_x),
            self.y_to_device(bbox.min_y),
        );
        let b = DevicePoint::saturating_from(
            self.x_to_device(bbox.max_x),
            self.y_to_device(bbox.max_y),
        );
        DeviceRect::new(a.x, a.y, b.x, b.y)
    }
}

fn map(v: f64, factor: f64, offset: i64) -> i64 {
    if factor == 0.0 {
        return offset.saturating_neg();
    }
    to_device_int(round_half_up(v * factor)).saturating_sub(offset)
}

fn unmap(d: i64, factor: f64, offset: i64) -> f64 {
    if factor == 0.0 {
        return f64::NAN;
    }
    (d.saturating_add(offset)) as f64 / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_roundtrip_within_half_pixel() {
        let s = Scale::new(-37, 412, 13.7, -0.25);
        for i in -200..200 {
            let v = f64::from(i) * 0.731;
            let back = s.x_to_real(s.x_to_device(v));
            assert!(libm::fabs(back - v) <= 0.5 / 13.7 + 1e-12, "x {v} -> {back}");
            let back = s.y_to_real(s.y_to_device(v));
            assert!(libm::fabs(back - v) <= 0.5 / 0.25 + 1e-12, "y {v} -> {back}");
        }
    }

    #[test]
    fn collapsed_axis_maps_to_negated_offset() {
        let s = Scale::new(-50, -20, 0.0, 0.0);
        assert_eq!(s.x_to_device(123.0), 50);
        assert_eq!(s.y_to_device(-9.0), 20);
        assert!(s.x_to_real(50).is_nan());
    }

    #[test]
    fn bbox_maps_with_inverted_y() {
        let s = Scale::new(0, -100, 10.0, -10.0);
        let r = s.bbox_to_device(&RealBBox::new(0.0, 2.0, 0.0, 5.0));
        assert_eq!(r, DeviceRect::new(0, 50, 20, 100));
    }

    #[test]
    fn empty_bbox_collapses_to_offset_point() {
        let s = Scale::new(7, -3, 2.0, -2.0);
        let r = s.bbox_to_device(&RealBBox::EMPTY);
        assert_eq!(r, DeviceRect::point(DevicePoint::new(-7, 3)));
    }
}

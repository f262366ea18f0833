// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cropping curve sets to the buffer rect.

use alloc::vec::Vec;
use core::ops::Range;

use plotgen_view::{DevicePoint, DeviceRect};

use crate::CurveRef;

/// Largest coordinate distance from the buffer origin a 16-bit renderer can take.
pub const SIGNED16_REACH: i64 = 32_767;

/// Coordinate range supported by the rendering sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CoordinateLimit {
    /// The sink takes full `i32` coordinates.
    #[default]
    Wide,
    /// The sink wraps around outside `±32767` of the buffer origin.
    Signed16,
}

/// Reduces `curves` to what intersects `buffer`, writing the result to `out`.
///
/// `out` is cleared first and its capacity reused.
/// - Curves whose box misses the buffer are dropped.
/// - Curves whose box lies inside the buffer are kept as is.
/// - Straddling curves with nondecreasing x are cropped with
///   [`crop_x_range`]; other straddling curves are kept whole.
///
/// With [`CoordinateLimit::Signed16`] the survivors are further split into
/// runs that stay within [`SIGNED16_REACH`] of the buffer origin.
pub fn optimize(
    curves: &[CurveRef],
    buffer: &DeviceRect,
    limit: CoordinateLimit,
    out: &mut Vec<CurveRef>,
) {
    out.clear();
    for c in curves {
        if c.is_empty() || !buffer.intersects(&c.bbox()) {
            continue;
        }
        let kept = if buffer.contains_rect(&c.bbox()) || !c.nondecreasing_x() {
            c.clone()
        } else {
            let points = c.points();
            let r = crop_x_range(points, buffer.x0, buffer.x1);
            let bbox = DeviceRect {
                x0: points[r.start].x,
                x1: points[r.end - 1].x,
                ..c.bbox()
            };
            c.slice(r, bbox)
        };
        match limit {
            CoordinateLimit::Wide => out.push(kept),
            CoordinateLimit::Signed16 => split_signed16(&kept, buffer, out),
        }
    }
    log::trace!(
        target: "plotgen",
        "optimized {} curves to {} for buffer {:?}",
        curves.len(),
        out.len(),
        buffer
    );
}

/// Crop range of a curve with nondecreasing x.
///
/// Starts at the last point with `x <= left` (or the first point) and ends
/// at the first point with `x >= right` (or the last point), so the segments
/// crossing the buffer edges are preserved. Runs in logarithmic time: an
/// interpolated guess is refined by galloping and a binary search.
///
/// Returns an empty range for an empty slice.
#[must_use]
pub fn crop_x_range(points: &[DevicePoint], left: i32, right: i32) -> Range<usize> {
    let n = points.len();
    if n == 0 {
        return 0..0;
    }
    let after_left = partition_from(points, guess_index(points, left), |p| p.x <= left);
    let start = after_left.saturating_sub(1);
    let before_right = partition_from(points, guess_index(points, right), |p| p.x < right);
    let end = before_right.min(n - 1).max(start);
    start..end + 1
}

/// Linear-scan counterpart of [`crop_x_range`].
#[must_use]
pub fn crop_x_range_linear(points: &[DevicePoint], left: i32, right: i32) -> Range<usize> {
    let n = points.len();
    if n == 0 {
        return 0..0;
    }
    let mut start = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x <= left {
            start = i;
        } else {
            break;
        }
    }
    let mut end = n - 1;
    for (i, p) in points.iter().enumerate() {
        if p.x >= right {
            end = i;
            break;
        }
    }
    start..end.max(start) + 1
}

fn guess_index(points: &[DevicePoint], x: i32) -> usize {
    let last = points.len() - 1;
    let x0 = points[0].x;
    let x1 = points[last].x;
    if x <= x0 || x1 <= x0 {
        return 0;
    }
    if x >= x1 {
        return last;
    }
    let t = (f64::from(x) - f64::from(x0)) / (f64::from(x1) - f64::from(x0));
    #[expect(
        clippy::cast_possible_truncation,
        reason = "t is in [0, 1], the product is within 0..=last"
    )]
    let guess = (t * last as f64) as usize;
    guess.min(last)
}

/// `partition_point` that starts probing at `guess` and gallops outwards.
fn partition_from(
    points: &[DevicePoint],
    guess: usize,
    pred: impl Fn(&DevicePoint) -> bool,
) -> usize {
    let n = points.len();
    let guess = guess.min(n - 1);
    let mut step = 1;
    if pred(&points[guess]) {
        let mut lo = guess + 1;
        loop {
            let next = guess + step;
            if next >= n {
                return lo + points[lo..].partition_point(&pred);
            }
            if !pred(&points[next]) {
                return lo + points[lo..next].partition_point(&pred);
            }
            lo = next + 1;
            step *= 2;
        }
    } else {
        let mut hi = guess;
        loop {
            if step > guess {
                return points[..hi].partition_point(&pred);
            }
            let next = guess - step;
            if pred(&points[next]) {
                return next + 1 + points[next + 1..hi].partition_point(&pred);
            }
            hi = next;
            step *= 2;
        }
    }
}

fn split_signed16(c: &CurveRef, buffer: &DeviceRect, out: &mut Vec<CurveRef>) {
    let ox = i64::from(buffer.x0);
    let oy = i64::from(buffer.y0);
    let reachable = |x: i32, y: i32| {
        (i64::from(x) - ox).abs() <= SIGNED16_REACH && (i64::from(y) - oy).abs() <= SIGNED16_REACH
    };
    let b = c.bbox();
    if reachable(b.x0, b.y0) && reachable(b.x1, b.y1) {
        out.push(c.clone());
        return;
    }
    let points = c.points();
    let mut run: Option<(usize, DeviceRect)> = None;
    for (i, p) in points.iter().enumerate() {
        if reachable(p.x, p.y) {
            run = Some(match run {
                Some((start, r)) => (start, r.union(&DeviceRect::point(*p))),
                None => (i, DeviceRect::point(*p)),
            });
        } else if let Some((start, r)) = run.take() {
            out.push(c.slice(start..i, r));
        }
    }
    if let Some((start, r)) = run {
        out.push(c.slice(start..points.len(), r));
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    use plotgen_view::{DevicePoint, DeviceRect};

    use super::{CoordinateLimit, crop_x_range, crop_x_range_linear, optimize};
    use crate::{Curve, CurveRef, PenId};

    fn curve(points: Vec<DevicePoint>, nondecreasing_x: bool) -> CurveRef {
        CurveRef::whole(
            Rc::new(Curve::from_points(points, nondecreasing_x)),
            PenId(0),
        )
    }

    #[test]
    fn crops_long_monotone_curve() {
        let points: Vec<_> = (0..10_000).map(|i| DevicePoint::new(i, i % 13)).collect();
        let r = crop_x_range(&points, 100, 200);
        assert!(r.len() <= 102);
        let sub = &points[r.clone()];
        assert!(sub[0].x <= 100 && 100 < sub[1].x);
        let last = sub.len() - 1;
        assert!(sub[last].x >= 200 && 200 > sub[last - 1].x);
        assert_eq!(r, crop_x_range_linear(&points, 100, 200));
    }

    struct Lcg(u64);

    impl Lcg {
        fn next_u32(&mut self) -> u32 {
            // Numerical Recipes LCG parameters.
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
            (self.0 >> 32) as u32
        }

        fn below(&mut self, upper: u32) -> i32 {
            (self.next_u32() % upper) as i32
        }
    }

    #[test]
    fn crop_matches_linear_scan_on_random_fixtures() {
        let mut rng = Lcg(0x1234_5678);
        for fixture in 0..1000 {
            let n = 1 + rng.below(300) as usize;
            let mut x = rng.below(200) - 100;
            let mut points = Vec::with_capacity(n);
            for _ in 0..n {
                // Include repeated x values and occasional large gaps.
                x += match rng.below(10) {
                    0..=2 => 0,
                    9 => rng.below(500),
                    _ => rng.below(5),
                };
                points.push(DevicePoint::new(x, rng.below(100)));
            }
            let lo = points[0].x - 50;
            let span = (points[n - 1].x + 50 - lo) as u32 + 1;
            let a = lo + rng.below(span);
            let b = lo + rng.below(span);
            let (left, right) = (a.min(b), a.max(b));
            assert_eq!(
                crop_x_range(&points, left, right),
                crop_x_range_linear(&points, left, right),
                "fixture {fixture}: [{left}, {right}] over {n} points"
            );
        }
    }

    #[test]
    fn drops_outside_keeps_inside_and_crops_stragglers() {
        let buffer = DeviceRect::new(100, 0, 200, 50);
        let inside = curve((120..130).map(|x| DevicePoint::new(x, 10)).collect(), true);
        let outside = curve((300..400).map(|x| DevicePoint::new(x, 10)).collect(), true);
        let straddling = curve((0..1000).map(|x| DevicePoint::new(x, 20)).collect(), true);
        let wiggly = curve(
            (0..1000)
                .map(|i| DevicePoint::new(if i % 2 == 0 { i } else { 1000 - i }, 20))
                .collect(),
            false,
        );

        let mut out = Vec::new();
        optimize(
            &[inside.clone(), outside, straddling, wiggly.clone()],
            &buffer,
            CoordinateLimit::Wide,
            &mut out,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].range(), inside.range());
        assert_eq!(out[1].range(), 100..201);
        assert_eq!(out[1].bbox(), DeviceRect::new(100, 20, 200, 20));
        assert_eq!(out[2].len(), wiggly.len());
    }

    #[test]
    fn signed16_splits_far_runs() {
        let buffer = DeviceRect::new(0, 0, 1000, 1000);
        let far = curve(
            alloc::vec![
                DevicePoint::new(-40_000, 0),
                DevicePoint::new(10, 0),
                DevicePoint::new(20, 5),
                DevicePoint::new(40_000, 0),
                DevicePoint::new(50, 0),
            ],
            false,
        );
        let mut out = Vec::new();
        optimize(&[far], &buffer, CoordinateLimit::Signed16, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].range(), 1..3);
        assert_eq!(out[0].bbox(), DeviceRect::new(10, 0, 20, 5));
        assert_eq!(out[1].range(), 4..5);
    }
}

// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use core::ops::Range;

use plotgen_view::{DevicePoint, DeviceRect};

use crate::Curve;

/// Opaque style token attached to a curve reference.
///
/// The engine never interprets pens; it only passes them through to the
/// rendering sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PenId(pub u32);

/// A drawable sub-range of a shared [`Curve`].
///
/// Curve sets are vectors of these. Cloning is cheap; the points themselves
/// stay in the curve cache that produced them.
#[derive(Clone, Debug)]
pub struct CurveRef {
    curve: Rc<Curve>,
    range: Range<usize>,
    bbox: DeviceRect,
    pen: PenId,
}

impl CurveRef {
    /// References every stored point of `curve`.
    #[must_use]
    pub fn whole(curve: Rc<Curve>, pen: PenId) -> Self {
        let range = 0..curve.len();
        let bbox = curve.bbox();
        Self {
            curve,
            range,
            bbox,
            pen,
        }
    }

    /// References `range` (compacted indices) of `curve`.
    ///
    /// The range is clamped to the stored points. For curves with
    /// nondecreasing x the bounding box takes its x extent from the range
    /// end points; otherwise the whole curve box is used.
    #[must_use]
    pub fn new(curve: Rc<Curve>, range: Range<usize>, pen: PenId) -> Self {
        let end = range.end.min(curve.len());
        let range = range.start.min(end)..end;
        let bbox = sub_bbox(&curve, range.clone());
        Self {
            curve,
            range,
            bbox,
            pen,
        }
    }

    /// Narrows to `relative` (indices into [`CurveRef::points`]) with a known box.
    #[must_use]
    pub fn slice(&self, relative: Range<usize>, bbox: DeviceRect) -> Self {
        let start = self.range.start + relative.start;
        let end = (self.range.start + relative.end).min(self.range.end);
        Self {
            curve: Rc::clone(&self.curve),
            range: start.min(end)..end,
            bbox,
            pen: self.pen,
        }
    }

    /// Returns the referenced points.
    #[must_use]
    pub fn points(&self) -> &[DevicePoint] {
        &self.curve.points()[self.range.clone()]
    }

    /// Number of referenced points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether no point is referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The referenced range of compacted indices.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Device bounding box of the referenced points.
    #[must_use]
    pub fn bbox(&self) -> DeviceRect {
        self.bbox
    }

    /// Style token.
    #[must_use]
    pub fn pen(&self) -> PenId {
        self.pen
    }

    /// Returns a copy drawn with another pen.
    #[must_use]
    pub fn with_pen(mut self, pen: PenId) -> Self {
        self.pen = pen;
        self
    }

    /// The underlying curve.
    #[must_use]
    pub fn curve(&self) -> &Rc<Curve> {
        &self.curve
    }

    /// Whether x never decreases along the underlying curve.
    #[must_use]
    pub fn nondecreasing_x(&self) -> bool {
        self.curve.nondecreasing_x()
    }
}

fn sub_bbox(curve: &Curve, range: Range<usize>) -> DeviceRect {
    let full = curve.bbox();
    if range.is_empty() || range.len() == curve.len() || !curve.nondecreasing_x() {
        return full;
    }
    let points = curve.points();
    DeviceRect {
        x0: points[range.start].x,
        x1: points[range.end - 1].x,
        ..full
    }
}

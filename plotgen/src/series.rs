// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use bitflags::bitflags;
use plotgen_curve::{AllocError, Curve};
use plotgen_view::{RealBBox, Scale};

use crate::cache::{Cached, Generation};
use crate::source::{DataSource, StepIndex};

bitflags! {
    /// What a [`crate::DataSeriesGroup::mark_old`] notification invalidates.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Stale: u8 {
        /// Real-space bounding boxes.
        const BBOX = 1 << 0;
        /// Device curves.
        const CURVE = 1 << 1;
        /// Every step instead of a single one.
        const ALL_STEPS = 1 << 2;
    }
}

/// The cached curve and bounding box of one [`StepIndex`] of a group.
///
/// The bounding box is the raw one reported by the source; group layout hints
/// are applied when it is read through the group. The curve is keyed by the
/// [`Scale`] it was computed for.
#[derive(Debug)]
pub struct DataSeries {
    index: StepIndex,
    bbox: Cached<RealBBox>,
    curve: Cached<Rc<Curve>>,
    scale: Option<Scale>,
}

impl DataSeries {
    pub(crate) fn new(index: StepIndex) -> Self {
        Self {
            index,
            bbox: Cached::new(RealBBox::EMPTY),
            curve: Cached::new(Rc::new(Curve::new())),
            scale: None,
        }
    }

    /// The step this series belongs to.
    #[must_use]
    pub fn index(&self) -> StepIndex {
        self.index
    }

    /// Scale of the last computed curve.
    #[must_use]
    pub fn curve_scale(&self) -> Option<Scale> {
        self.scale
    }

    /// The last computed curve, fresh or not.
    #[must_use]
    pub fn last_curve(&self) -> &Rc<Curve> {
        self.curve.value()
    }

    pub(crate) fn invalidate(&mut self, stale: Stale, at: Generation) {
        if stale.contains(Stale::BBOX) {
            self.bbox.invalidate(at);
        }
        if stale.contains(Stale::CURVE) {
            self.curve.invalidate(at);
        }
    }

    pub(crate) fn fresh_bbox(&self, floor: Generation) -> Option<RealBBox> {
        self.bbox.is_fresh(floor).then(|| *self.bbox.value())
    }

    pub(crate) fn store_bbox(&mut self, bbox: RealBBox, at: Generation) {
        self.bbox.store(bbox, at);
    }

    pub(crate) fn fresh_curve(&self, scale: &Scale, floor: Generation) -> Option<Rc<Curve>> {
        (self.curve.is_fresh(floor) && self.scale.as_ref() == Some(scale))
            .then(|| Rc::clone(self.curve.value()))
    }

    /// Refetches the device points through `source`.
    ///
    /// The device bounding box comes from `raw_bbox`, not from scanning the
    /// points. The curve is simplified when it has more than `threshold`
    /// points per pixel of bounding box width plus height.
    pub(crate) fn refill_curve(
        &mut self,
        source: &dyn DataSource,
        scale: &Scale,
        raw_bbox: &RealBBox,
        nondecreasing_x: bool,
        threshold: f64,
        at: Generation,
    ) -> Result<Rc<Curve>, AllocError> {
        let index = self.index;
        let len = source.index_range_of(index);
        let curve = exclusive(self.curve.value_mut());
        curve.refill(len, scale.bbox_to_device(raw_bbox), nondecreasing_x, |out| {
            source.fill_device_points(index, scale, out);
        })?;
        let b = curve.bbox();
        if len as f64 > threshold * (b.width() + b.height()) as f64 {
            curve.simplify();
        }
        log::trace!(
            target: "plotgen",
            "curve {index:?}: {len} points, {} after simplification",
            curve.len()
        );
        self.scale = Some(*scale);
        self.curve.mark_fresh(at);
        Ok(Rc::clone(self.curve.value()))
    }
}

/// Mutable access to a shared curve, replacing it if a curve set still holds it.
fn exclusive(curve: &mut Rc<Curve>) -> &mut Curve {
    if Rc::get_mut(curve).is_none() {
        *curve = Rc::new(Curve::new());
    }
    Rc::make_mut(curve)
}

// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::ops::Range;

use bitflags::bitflags;
use hashbrown::HashMap;
use plotgen_curve::{AllocError, Curve, CurveRef, PenId};
use plotgen_view::{RealBBox, Scale};
use smallvec::SmallVec;

use crate::cache::{Clock, Generation};
use crate::series::{DataSeries, Stale};
use crate::source::{DataSource, StepIndex};

bitflags! {
    /// Layout hints of a dataset group.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayoutHints: u8 {
        /// Mirror the y range around zero.
        const SYMMETRIC_Y_RANGE = 1 << 0;
        /// Widen the y range to include zero.
        const INCLUDE_Y_ZERO = 1 << 1;
        /// Every curve has nondecreasing x, so it can be cropped by binary search.
        const NONDECREASING_X = 1 << 2;
        /// When visible, this group alone determines the auto-scale range.
        const DOMINANT_BBOX = 1 << 3;
        /// Points outside the valid chunk range are drawn with the alternate pen.
        const HAS_HEAD_AND_TAIL = 1 << 4;
    }
}

/// Whether a group draws one curve per step or a single aggregate curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// One series per step.
    #[default]
    Numbered,
    /// One aggregate series, such as a per-step evaluation.
    Singular,
}

/// Pens used for the curves of a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupPens {
    /// Regular curves.
    pub normal: PenId,
    /// The selected step.
    pub highlighted: PenId,
    /// Head and tail outside the valid chunk range.
    pub alternate: PenId,
}

/// Kinds of processing parameter changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A parameter that decides which steps are included (flags such as
    /// ignored or excluded from the envelope).
    StepInclusion,
    /// A parameter that changes the processed data itself. Data reloads are
    /// reported separately through `mark_old`.
    Processing,
    /// A parameter that only affects presentation.
    Presentation,
}

impl ParamKind {
    /// Whether changes of this kind can change step flags.
    #[must_use]
    pub fn affects_step_flags(self) -> bool {
        matches!(self, Self::StepInclusion)
    }
}

/// A named dataset with cached per-step bounding boxes and curves.
#[derive(Debug)]
pub struct DataSeriesGroup {
    name: String,
    kind: GroupKind,
    source: Box<dyn DataSource>,
    hints: LayoutHints,
    pens: GroupPens,
    visible: bool,
    clock: Clock,
    bbox_floor: Generation,
    curve_floor: Generation,
    series: HashMap<StepIndex, DataSeries>,
}

impl DataSeriesGroup {
    /// Creates a visible group.
    pub fn new(
        name: impl Into<String>,
        kind: GroupKind,
        source: Box<dyn DataSource>,
        hints: LayoutHints,
        pens: GroupPens,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            source,
            hints,
            pens,
            visible: true,
            clock: Clock::default(),
            bbox_floor: Generation::default(),
            curve_floor: Generation::default(),
            series: HashMap::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numbered or singular.
    #[must_use]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Layout hints.
    #[must_use]
    pub fn hints(&self) -> LayoutHints {
        self.hints
    }

    /// Pens.
    #[must_use]
    pub fn pens(&self) -> GroupPens {
        self.pens
    }

    /// Whether the group is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The data source.
    #[must_use]
    pub fn source(&self) -> &dyn DataSource {
        &*self.source
    }

    /// Mutable access to the data source.
    ///
    /// Cached data is not invalidated; report the change with
    /// [`DataSeriesGroup::mark_old`] or through the owning graph.
    pub fn source_mut(&mut self) -> &mut dyn DataSource {
        &mut *self.source
    }

    /// Latest generation of this group.
    ///
    /// It grows whenever anything about the group is invalidated, so it can
    /// be used as a cache key by derived data such as curve sets.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.clock.now()
    }

    /// Number of steps reported by the source, `0` when unknown.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.source.step_count().unwrap_or(0)
    }

    /// Cached series of `index`, if it was ever requested.
    #[must_use]
    pub fn series(&self, index: StepIndex) -> Option<&DataSeries> {
        self.series.get(&index)
    }

    /// Shows or hides the group.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.clock.bump();
        }
    }

    /// Replaces the layout hints, invalidating everything derived from them.
    pub fn set_hints(&mut self, hints: LayoutHints) {
        if self.hints != hints {
            self.hints = hints;
            self.mark_old(Stale::all(), 0);
        }
    }

    /// Real-space bounding box of `index`, with layout hints applied.
    ///
    /// Empty data yields an all-NaN box.
    pub fn real_bbox(&mut self, index: StepIndex) -> RealBBox {
        let raw = self.raw_bbox(index);
        self.apply_hints(raw)
    }

    fn apply_hints(&self, mut b: RealBBox) -> RealBBox {
        if self.hints.contains(LayoutHints::SYMMETRIC_Y_RANGE) {
            b = b.symmetric_y();
        }
        if self.hints.contains(LayoutHints::INCLUDE_Y_ZERO) {
            b = b.including_y_zero();
        }
        b
    }

    fn raw_bbox(&mut self, index: StepIndex) -> RealBBox {
        if let Some(b) = self
            .series
            .get(&index)
            .and_then(|s| s.fresh_bbox(self.bbox_floor))
        {
            return b;
        }
        let b = if self.source.index_range_of(index) == 0 {
            RealBBox::EMPTY
        } else {
            match (self.kind, index, self.source.step_count()) {
                (GroupKind::Numbered, StepIndex::AllSteps, Some(steps)) => {
                    let mut acc = RealBBox::EMPTY;
                    for step in 0..steps {
                        if self.source.step_flags(step).contributes_to_envelope() {
                            acc = acc.union(&self.raw_bbox(StepIndex::Step(step)));
                        }
                    }
                    acc
                }
                _ => self.source.real_bbox_of(index),
            }
        };
        log::trace!(target: "plotgen", "{}: bbox of {index:?} = {b:?}", self.name);
        let at = self.clock.now();
        self.series
            .entry(index)
            .or_insert_with(|| DataSeries::new(index))
            .store_bbox(b, at);
        b
    }

    /// Device curve of `index` for `scale`.
    ///
    /// Returns the cached curve when it was computed for an equal scale and
    /// nothing invalidated it since.
    pub fn curve(
        &mut self,
        scale: &Scale,
        index: StepIndex,
        simplify_threshold: f64,
    ) -> Result<Rc<Curve>, AllocError> {
        if let Some(c) = self
            .series
            .get(&index)
            .and_then(|s| s.fresh_curve(scale, self.curve_floor))
        {
            return Ok(c);
        }
        let raw = self.raw_bbox(index);
        let at = self.clock.now();
        let nondecreasing_x = self.hints.contains(LayoutHints::NONDECREASING_X);
        let source = &*self.source;
        self.series
            .entry(index)
            .or_insert_with(|| DataSeries::new(index))
            .refill_curve(source, scale, &raw, nondecreasing_x, simplify_threshold, at)
    }

    /// Curve of `index` split around the valid chunk range.
    ///
    /// `valid` holds original point indices. Without [`LayoutHints::HAS_HEAD_AND_TAIL`]
    /// or a range, the whole curve is returned with `pen`. Otherwise the
    /// head `[0, start]` and tail `[end, last]` use the alternate pen and the
    /// body `[start, end]` uses `pen`; the parts share their boundary points
    /// and empty parts are left out.
    pub fn split_curve(
        &mut self,
        scale: &Scale,
        index: StepIndex,
        simplify_threshold: f64,
        valid: Option<Range<usize>>,
        pen: PenId,
    ) -> Result<SmallVec<[CurveRef; 3]>, AllocError> {
        let curve = self.curve(scale, index, simplify_threshold)?;
        let mut parts = SmallVec::new();
        if curve.is_empty() {
            return Ok(parts);
        }
        let valid = valid.filter(|_| self.hints.contains(LayoutHints::HAS_HEAD_AND_TAIL));
        let Some(valid) = valid else {
            parts.push(CurveRef::whole(curve, pen));
            return Ok(parts);
        };
        let last = curve.len() - 1;
        let start = curve.simplified_index(valid.start, false);
        let end = curve
            .simplified_index(valid.end.saturating_sub(1), true)
            .max(start);
        let alternate = self.pens.alternate;
        if start > 0 {
            parts.push(CurveRef::new(Rc::clone(&curve), 0..start + 1, alternate));
        }
        parts.push(CurveRef::new(Rc::clone(&curve), start..end + 1, pen));
        if end < last {
            parts.push(CurveRef::new(curve, end..last + 1, alternate));
        }
        Ok(parts)
    }

    /// Invalidates cached data after the source changed.
    ///
    /// With [`Stale::ALL_STEPS`] every series is affected; otherwise only
    /// `step` and the aggregate.
    pub fn mark_old(&mut self, stale: Stale, step: usize) {
        let at = self.clock.bump();
        if stale.contains(Stale::ALL_STEPS) {
            if stale.contains(Stale::BBOX) {
                self.bbox_floor = at;
            }
            if stale.contains(Stale::CURVE) {
                self.curve_floor = at;
            }
        } else {
            for index in [StepIndex::Step(step), StepIndex::AllSteps] {
                if let Some(s) = self.series.get_mut(&index) {
                    s.invalidate(stale, at);
                }
            }
        }
        log::trace!(target: "plotgen", "{}: mark_old {stale:?} step {step}", self.name);
    }

    /// Invalidates the aggregate bounding box if `kind` can change step flags.
    ///
    /// Returns whether anything was invalidated.
    pub fn change_proc_param(&mut self, kind: ParamKind, step: usize) -> bool {
        if !kind.affects_step_flags() {
            return false;
        }
        let at = self.clock.bump();
        if let Some(s) = self.series.get_mut(&StepIndex::AllSteps) {
            s.invalidate(Stale::BBOX, at);
        }
        log::trace!(target: "plotgen", "{}: {kind:?} changed at step {step}", self.name);
        true
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use kurbo::Point;
    use plotgen_curve::PenId;
    use plotgen_view::{DevicePoint, RealBBox, Scale};

    use super::{DataSeriesGroup, GroupKind, GroupPens, LayoutHints, ParamKind};
    use crate::series::Stale;
    use crate::source::{DataSource, StepFlags, StepIndex, StepTraces};

    fn pens() -> GroupPens {
        GroupPens {
            normal: PenId(1),
            highlighted: PenId(2),
            alternate: PenId(3),
        }
    }

    fn line(n: usize, y: f64) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, y)).collect()
    }

    #[test]
    fn empty_step_is_nan_without_asking_the_source() {
        let t = StepTraces::new(vec![Vec::new(), line(3, 1.0)]);
        let mut g = DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(t),
            LayoutHints::INCLUDE_Y_ZERO,
            pens(),
        );
        assert!(g.real_bbox(StepIndex::Step(0)).is_empty());
        assert_eq!(g.real_bbox(StepIndex::Step(1)), RealBBox::new(0.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn curves_are_cached_per_scale() {
        let t = StepTraces::new(vec![line(10, 1.0)]);
        let mut g = DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(t),
            LayoutHints::NONDECREASING_X,
            pens(),
        );
        let s1 = Scale::new(0, 0, 10.0, -10.0);
        let a = g.curve(&s1, StepIndex::Step(0), 3.0).unwrap();
        let b = g.curve(&s1, StepIndex::Step(0), 3.0).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 10);
        assert!(a.nondecreasing_x());

        let s2 = Scale::new(0, 0, 20.0, -10.0);
        let c = g.curve(&s2, StepIndex::Step(0), 3.0).unwrap();
        assert_eq!(c.points()[9].x, 180);

        g.mark_old(Stale::CURVE, 0);
        let d = g.curve(&s2, StepIndex::Step(0), 3.0).unwrap();
        assert!(!Rc::ptr_eq(&c, &d));
    }

    #[test]
    fn dense_curves_are_simplified() {
        // 1000 points squeezed into 10 pixel columns.
        let t = StepTraces::new(vec![line(1000, 0.0)]);
        let mut g = DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(t),
            LayoutHints::NONDECREASING_X,
            pens(),
        );
        let c = g
            .curve(&Scale::new(0, 0, 0.01, -1.0), StepIndex::Step(0), 3.0)
            .unwrap();
        assert_eq!(c.original_len(), 1000);
        assert_eq!(c.len(), 11);
    }

    #[test]
    fn split_uses_alternate_pen_outside_valid_range() {
        let t = StepTraces::new(vec![line(100, 0.0)]);
        let mut g = DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(t),
            LayoutHints::NONDECREASING_X | LayoutHints::HAS_HEAD_AND_TAIL,
            pens(),
        );
        let s = Scale::new(0, 0, 1.0, -1.0);
        let parts = g
            .split_curve(&s, StepIndex::Step(0), 3.0, Some(10..51), PenId(1))
            .unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].range(), 0..11);
        assert_eq!(parts[0].pen(), PenId(3));
        assert_eq!(parts[1].range(), 10..51);
        assert_eq!(parts[1].pen(), PenId(1));
        assert_eq!(parts[2].range(), 50..100);
        assert_eq!(parts[2].pen(), PenId(3));

        let whole = g
            .split_curve(&s, StepIndex::Step(0), 3.0, Some(0..100), PenId(2))
            .unwrap();
        assert_eq!(whole.len(), 1);
        assert_eq!(whole[0].pen(), PenId(2));
    }

    /// Lets a test edit the data behind the group's back.
    #[derive(Debug)]
    struct Shared(Rc<RefCell<StepTraces>>);

    impl DataSource for Shared {
        fn index_range_of(&self, index: StepIndex) -> usize {
            self.0.borrow().index_range_of(index)
        }
        fn step_flags(&self, step: usize) -> StepFlags {
            self.0.borrow().step_flags(step)
        }
        fn real_bbox_of(&self, index: StepIndex) -> RealBBox {
            self.0.borrow().real_bbox_of(index)
        }
        fn fill_device_points(&self, index: StepIndex, scale: &Scale, out: &mut [DevicePoint]) {
            self.0.borrow().fill_device_points(index, scale, out);
        }
        fn step_count(&self) -> Option<usize> {
            self.0.borrow().step_count()
        }
    }

    #[test]
    fn inclusion_params_invalidate_the_aggregate_only() {
        let mut t = StepTraces::new(vec![line(3, 1.0), line(3, 5.0)]);
        t.set_step_flags(1, StepFlags::IGNORED);
        let data = Rc::new(RefCell::new(t));
        let mut g = DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(Shared(Rc::clone(&data))),
            LayoutHints::empty(),
            pens(),
        );
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 1.0);

        data.borrow_mut().set_step_flags(1, StepFlags::OK);
        // Nothing is refetched until the change is reported.
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 1.0);

        let before = g.generation();
        assert!(!g.change_proc_param(ParamKind::Presentation, 1));
        assert_eq!(g.generation(), before);
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 1.0);

        assert!(g.change_proc_param(ParamKind::StepInclusion, 1));
        assert!(g.generation() > before);
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 5.0);
    }

    #[test]
    fn mark_old_reaches_single_steps_and_all_steps() {
        let data = Rc::new(RefCell::new(StepTraces::new(vec![
            line(3, 1.0),
            line(3, 2.0),
        ])));
        let mut g = DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(Shared(Rc::clone(&data))),
            LayoutHints::empty(),
            pens(),
        );
        assert_eq!(g.real_bbox(StepIndex::Step(1)).max_y, 2.0);
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 2.0);

        data.borrow_mut().set_step_points(1, line(3, 4.0));
        g.mark_old(Stale::BBOX, 1);
        assert_eq!(g.real_bbox(StepIndex::Step(1)).max_y, 4.0);
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 4.0);

        data.borrow_mut().set_step_points(0, line(3, 9.0));
        // Marking step 1 leaves the cached box of step 0 alone.
        g.mark_old(Stale::BBOX, 1);
        assert_eq!(g.real_bbox(StepIndex::Step(0)).max_y, 1.0);
        g.mark_old(Stale::BBOX | Stale::ALL_STEPS, 0);
        assert_eq!(g.real_bbox(StepIndex::Step(0)).max_y, 9.0);
        assert_eq!(g.real_bbox(StepIndex::AllSteps).max_y, 9.0);
    }
}

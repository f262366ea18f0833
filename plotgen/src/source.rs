// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data-source contract and two in-memory sources.

use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;
use kurbo::Point;
use plotgen_view::{DevicePoint, RealBBox, Scale};

/// Which curve of a dataset is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepIndex {
    /// The aggregate over all steps.
    AllSteps,
    /// One step.
    Step(usize),
}

bitflags! {
    /// Per-step validity bits reported by a [`DataSource`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StepFlags: u8 {
        /// The step holds valid data.
        const OK = 1 << 0;
        /// The step was excluded by the user.
        const IGNORED = 1 << 1;
        /// The step has not been measured yet.
        const BLANK = 1 << 2;
        /// The step is left out of the all-steps envelope.
        const NO_ENVELOPE = 1 << 3;
        /// The step is not drawn.
        const NOT_SHOWN = 1 << 4;
    }
}

impl StepFlags {
    /// Whether the step contributes to aggregate bounding boxes.
    #[must_use]
    pub fn contributes_to_envelope(self) -> bool {
        self.contains(Self::OK) && !self.contains(Self::NO_ENVELOPE)
    }

    /// Whether the step is drawn in the all-steps curve set.
    #[must_use]
    pub fn is_plotted(self) -> bool {
        !self.intersects(Self::BLANK | Self::NOT_SHOWN)
    }
}

/// Backing data of one dataset group.
///
/// Implementations hand out point counts, bounding boxes and device points
/// for single steps and for the aggregate. All methods must be cheap to call
/// repeatedly for the same index; the engine caches what it derives from them
/// and is told about changes through [`crate::Graph::mark_old`].
pub trait DataSource: fmt::Debug {
    /// Number of points of `index`; `0` means "no data".
    fn index_range_of(&self, index: StepIndex) -> usize;

    /// Validity bits of one step.
    fn step_flags(&self, step: usize) -> StepFlags;

    /// Real-space bounding box of `index`, all-NaN when empty.
    fn real_bbox_of(&self, index: StepIndex) -> RealBBox;

    /// Writes the device points of `index`.
    ///
    /// `out` has exactly [`DataSource::index_range_of`] elements.
    fn fill_device_points(&self, index: StepIndex, scale: &Scale, out: &mut [DevicePoint]);

    /// Number of steps, if known.
    fn step_count(&self) -> Option<usize>;
}

/// Per-step point lists held in memory.
///
/// The aggregate is the concatenation of the steps that contribute to the
/// envelope.
#[derive(Clone, Debug, Default)]
pub struct StepTraces {
    steps: Vec<Vec<Point>>,
    flags: Vec<StepFlags>,
}

impl StepTraces {
    /// Creates traces with every step flagged [`StepFlags::OK`].
    #[must_use]
    pub fn new(steps: Vec<Vec<Point>>) -> Self {
        let flags = alloc::vec![StepFlags::OK; steps.len()];
        Self { steps, flags }
    }

    /// Appends a step.
    pub fn push_step(&mut self, points: Vec<Point>, flags: StepFlags) {
        self.steps.push(points);
        self.flags.push(flags);
    }

    /// Replaces the points of a step. Out-of-range steps are ignored.
    pub fn set_step_points(&mut self, step: usize, points: Vec<Point>) {
        if let Some(s) = self.steps.get_mut(step) {
            *s = points;
        }
    }

    /// Replaces the flags of a step. Out-of-range steps are ignored.
    pub fn set_step_flags(&mut self, step: usize, flags: StepFlags) {
        if let Some(f) = self.flags.get_mut(step) {
            *f = flags;
        }
    }

    fn aggregate(&self) -> impl Iterator<Item = &Point> {
        self.steps
            .iter()
            .zip(&self.flags)
            .filter(|(_, f)| f.contributes_to_envelope())
            .flat_map(|(s, _)| s.iter())
    }

    fn points_of(&self, index: StepIndex) -> &[Point] {
        match index {
            StepIndex::Step(i) => self.steps.get(i).map_or(&[][..], Vec::as_slice),
            StepIndex::AllSteps => &[],
        }
    }
}

impl DataSource for StepTraces {
    fn index_range_of(&self, index: StepIndex) -> usize {
        match index {
            StepIndex::AllSteps => self.aggregate().count(),
            StepIndex::Step(_) => self.points_of(index).len(),
        }
    }

    fn step_flags(&self, step: usize) -> StepFlags {
        self.flags.get(step).copied().unwrap_or(StepFlags::BLANK)
    }

    fn real_bbox_of(&self, index: StepIndex) -> RealBBox {
        match index {
            StepIndex::AllSteps => RealBBox::from_points(self.aggregate().copied()),
            StepIndex::Step(_) => RealBBox::from_points(self.points_of(index).iter().copied()),
        }
    }

    fn fill_device_points(&self, index: StepIndex, scale: &Scale, out: &mut [DevicePoint]) {
        match index {
            StepIndex::AllSteps => {
                for (o, p) in out.iter_mut().zip(self.aggregate()) {
                    *o = scale.to_device(*p);
                }
            }
            StepIndex::Step(_) => {
                for (o, p) in out.iter_mut().zip(self.points_of(index)) {
                    *o = scale.to_device(*p);
                }
            }
        }
    }

    fn step_count(&self) -> Option<usize> {
        Some(self.steps.len())
    }
}

/// One scalar per step, such as an integral evaluated over every step.
///
/// Step `i` is drawn at `x = i` unless explicit positions are given. The
/// aggregate curve joins the values of all steps that contribute to the
/// envelope; a single step is one point.
#[derive(Clone, Debug, Default)]
pub struct StepEvaluation {
    values: Vec<f64>,
    positions: Option<Vec<f64>>,
    flags: Vec<StepFlags>,
}

impl StepEvaluation {
    /// Creates an evaluation with every step flagged [`StepFlags::OK`].
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        let flags = alloc::vec![StepFlags::OK; values.len()];
        Self {
            values,
            positions: None,
            flags,
        }
    }

    /// Uses `positions` as the x value of each step.
    ///
    /// Missing positions fall back to the step number.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<f64>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Replaces the value of a step. Out-of-range steps are ignored.
    pub fn set_value(&mut self, step: usize, value: f64) {
        if let Some(v) = self.values.get_mut(step) {
            *v = value;
        }
    }

    /// Replaces the flags of a step. Out-of-range steps are ignored.
    pub fn set_step_flags(&mut self, step: usize, flags: StepFlags) {
        if let Some(f) = self.flags.get_mut(step) {
            *f = flags;
        }
    }

    fn point(&self, step: usize) -> Point {
        let x = self
            .positions
            .as_ref()
            .and_then(|p| p.get(step).copied())
            .unwrap_or(step as f64);
        Point::new(x, self.values[step])
    }

    fn points_of(&self, index: StepIndex) -> impl Iterator<Item = Point> + '_ {
        let range = match index {
            StepIndex::AllSteps => 0..self.values.len(),
            StepIndex::Step(i) if i < self.values.len() => i..i + 1,
            StepIndex::Step(_) => 0..0,
        };
        let aggregate = index == StepIndex::AllSteps;
        range
            .filter(move |&i| !aggregate || self.step_flags(i).contributes_to_envelope())
            .map(|i| self.point(i))
    }
}

impl DataSource for StepEvaluation {
    fn index_range_of(&self, index: StepIndex) -> usize {
        self.points_of(index).count()
    }

    fn step_flags(&self, step: usize) -> StepFlags {
        self.flags.get(step).copied().unwrap_or(StepFlags::BLANK)
    }

    fn real_bbox_of(&self, index: StepIndex) -> RealBBox {
        RealBBox::from_points(self.points_of(index))
    }

    fn fill_device_points(&self, index: StepIndex, scale: &Scale, out: &mut [DevicePoint]) {
        for (o, p) in out.iter_mut().zip(self.points_of(index)) {
            *o = scale.to_device(p);
        }
    }

    fn step_count(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Point;
    use plotgen_view::{DevicePoint, RealBBox, Scale};

    use super::{DataSource, StepEvaluation, StepFlags, StepIndex, StepTraces};

    #[test]
    fn traces_aggregate_skips_excluded_steps() {
        let mut t = StepTraces::new(vec![
            vec![Point::new(0.0, 1.0), Point::new(1.0, 2.0)],
            vec![Point::new(5.0, -7.0)],
            vec![Point::new(2.0, 0.0)],
        ]);
        t.set_step_flags(1, StepFlags::OK | StepFlags::NO_ENVELOPE);
        assert_eq!(t.index_range_of(StepIndex::AllSteps), 3);
        assert_eq!(t.index_range_of(StepIndex::Step(1)), 1);
        assert_eq!(t.index_range_of(StepIndex::Step(9)), 0);
        assert_eq!(
            t.real_bbox_of(StepIndex::AllSteps),
            RealBBox::new(0.0, 2.0, 0.0, 2.0)
        );
        assert_eq!(t.step_flags(9), StepFlags::BLANK);
    }

    #[test]
    fn evaluation_places_steps_on_x() {
        let mut e = StepEvaluation::new(vec![3.0, 4.0, 5.0]);
        e.set_step_flags(1, StepFlags::IGNORED);
        assert_eq!(e.index_range_of(StepIndex::AllSteps), 2);
        assert_eq!(e.index_range_of(StepIndex::Step(1)), 1);
        assert_eq!(
            e.real_bbox_of(StepIndex::AllSteps),
            RealBBox::new(0.0, 2.0, 3.0, 5.0)
        );

        let mut out = [DevicePoint::ZERO; 2];
        e.fill_device_points(StepIndex::AllSteps, &Scale::new(0, 0, 10.0, -1.0), &mut out);
        assert_eq!(out, [DevicePoint::new(0, -3), DevicePoint::new(20, -5)]);

        let e = e.with_positions(vec![0.5]);
        assert_eq!(
            e.real_bbox_of(StepIndex::Step(0)),
            RealBBox::new(0.5, 0.5, 3.0, 3.0)
        );
    }
}

// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::mem;
use core::ops::Range;

use bitflags::bitflags;
use kurbo::{Point, Rect};
use plotgen_axis::{Axis, AxisMapping};
use plotgen_curve::{AllocError, CurveRef, optimize};
use plotgen_view::{DevicePoint, DeviceRect, DeviceSize, RealBBox, RealRounding, Scale, Viewport};

use crate::cache::{Clock, Generation};
use crate::config::GraphConfig;
use crate::group::{DataSeriesGroup, GroupKind, LayoutHints, ParamKind};
use crate::series::Stale;
use crate::source::StepIndex;

bitflags! {
    /// Axes that follow the data bounds on every refresh.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AutoZoom: u8 {
        /// X follows the selected step.
        const X_SELECTED = 1 << 0;
        /// X follows all data.
        const X_ALL = 1 << 1;
        /// Y follows the selected step.
        const Y_SELECTED = 1 << 2;
        /// Y follows all data.
        const Y_ALL = 1 << 3;
    }
}

/// A redraw request for the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repaint {
    /// Everything.
    Full,
    /// A region in virtual device coordinates.
    Area(DeviceRect),
}

/// Handle of a group added with [`Graph::add_group`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// Position of the group in drawing order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SetKind {
    AllSteps,
    Highlighted,
}

impl SetKind {
    fn other(self) -> Self {
        match self {
            Self::AllSteps => Self::Highlighted,
            Self::Highlighted => Self::AllSteps,
        }
    }
}

/// Everything a curve set depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SetKey {
    scale: Scale,
    data: u64,
    layout: Generation,
    step: Option<usize>,
    buffer: Option<DeviceRect>,
}

impl SetKey {
    /// Whether both keys see the same curves, whatever the step or buffer.
    fn same_data(&self, other: &Self) -> bool {
        self.scale == other.scale && self.data == other.data && self.layout == other.layout
    }
}

#[derive(Debug, Default)]
struct CurveSet {
    raw: Vec<CurveRef>,
    raw_key: Option<SetKey>,
    optimized: Vec<CurveRef>,
    optimized_key: Option<SetKey>,
}

impl CurveSet {
    fn clear(&mut self) {
        self.raw.clear();
        self.raw_key = None;
        self.optimized.clear();
        self.optimized_key = None;
    }
}

/// Groups of stepped data behind one viewport.
///
/// A `Graph` pulls bounding boxes and device curves out of its groups on
/// demand and caches the derived curve sets and axes. Mutations that change
/// the data bounds trigger a refresh: the viewport gets the new bounds, the
/// auto-zoom axes follow them and a [`Repaint::Full`] is queued. While a
/// [`crate::FreezeGuard`] is alive, refreshes are deferred until the
/// outermost guard is dropped.
///
/// Allocation failures while building curves put the graph into a sticky
/// data-error state in which every curve set is empty and the data bounds
/// are all-NaN, until [`Graph::reset`].
#[derive(Debug)]
pub struct Graph {
    config: GraphConfig,
    viewport: Viewport,
    groups: Vec<DataSeriesGroup>,
    selected_step: usize,
    valid_range: Option<Range<usize>>,
    auto_zoom: AutoZoom,
    clock: Clock,
    all_steps: CurveSet,
    highlighted: CurveSet,
    x_axis: Option<Axis>,
    y_axis: Option<Axis>,
    data_error: bool,
    repaints: Vec<Repaint>,
    freeze_depth: u32,
    refresh_pending: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl Graph {
    /// Creates an empty graph with both axes auto-zooming over all data.
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        let mut graph = Self {
            config,
            viewport: Viewport::new(),
            groups: Vec::new(),
            selected_step: 0,
            valid_range: None,
            auto_zoom: AutoZoom::X_ALL | AutoZoom::Y_ALL,
            clock: Clock::default(),
            all_steps: CurveSet::default(),
            highlighted: CurveSet::default(),
            x_axis: None,
            y_axis: None,
            data_error: false,
            repaints: Vec::new(),
            freeze_depth: 0,
            refresh_pending: false,
        };
        graph.apply_config();
        graph
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Replaces the configuration and refreshes.
    pub fn set_config(&mut self, config: GraphConfig) {
        self.config = config;
        self.apply_config();
        self.clock.bump();
        self.x_axis = None;
        self.y_axis = None;
        self.request_refresh();
    }

    fn apply_config(&mut self) {
        let c = &self.config;
        self.viewport.set_constrained_edges(c.constrain);
        self.viewport.set_scrollbar_size(c.scrollbar_size);
        self.viewport.set_prefetch_margin(c.prefetch_margin);
        self.viewport.set_sticky_axis_fraction(c.sticky_axis_fraction);
    }

    /// The viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Axes currently following the data.
    #[must_use]
    pub fn auto_zoom(&self) -> AutoZoom {
        self.auto_zoom
    }

    /// Appends a group and refreshes.
    pub fn add_group(&mut self, group: DataSeriesGroup) -> GroupId {
        log::debug!(target: "plotgen", "add group {:?}", group.name());
        self.groups.push(group);
        self.clock.bump();
        self.request_refresh();
        GroupId(self.groups.len() - 1)
    }

    /// All groups, in drawing order.
    #[must_use]
    pub fn groups(&self) -> &[DataSeriesGroup] {
        &self.groups
    }

    /// A group by handle.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&DataSeriesGroup> {
        self.groups.get(id.0)
    }

    /// Mutable access to a group.
    ///
    /// Curve sets notice changes through the group generation, but the data
    /// bounds are only recomputed on refresh; call [`Graph::request_refresh`]
    /// after changing what the group reports.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut DataSeriesGroup> {
        self.groups.get_mut(id.0)
    }

    /// Shows or hides a group and refreshes.
    pub fn set_group_visible(&mut self, id: GroupId, visible: bool) {
        let Some(g) = self.groups.get_mut(id.0) else {
            return;
        };
        if g.is_visible() != visible {
            g.set_visible(visible);
            self.request_refresh();
        }
    }

    /// Sets the valid chunk range, in original point indices.
    ///
    /// Groups with [`LayoutHints::HAS_HEAD_AND_TAIL`] draw points outside it
    /// with their alternate pen.
    pub fn set_valid_range(&mut self, range: Option<Range<usize>>) {
        if self.valid_range != range {
            self.valid_range = range;
            self.clock.bump();
            self.push_repaint(Repaint::Full);
        }
    }

    /// The valid chunk range.
    #[must_use]
    pub fn valid_range(&self) -> Option<Range<usize>> {
        self.valid_range.clone()
    }

    /// Draws only the selected step instead of all steps.
    pub fn set_only_selected_plotted(&mut self, only_selected: bool) {
        if self.config.only_selected_plotted != only_selected {
            self.config.only_selected_plotted = only_selected;
            self.clock.bump();
            self.request_refresh();
        }
    }

    /// Reports changed source data to every group and refreshes.
    pub fn mark_old(&mut self, stale: Stale, step: usize) {
        for g in &mut self.groups {
            g.mark_old(stale, step);
        }
        self.request_refresh();
    }

    /// Reports a processing parameter change to every group.
    ///
    /// Refreshes if any group invalidated something.
    pub fn change_proc_param(&mut self, kind: ParamKind, step: usize) {
        let mut changed = false;
        for g in &mut self.groups {
            changed |= g.change_proc_param(kind, step);
        }
        if changed {
            self.request_refresh();
        }
    }

    /// Largest step count of the numbered groups.
    #[must_use]
    pub fn step_count(&self) -> Option<usize> {
        self.groups
            .iter()
            .filter(|g| g.kind() == GroupKind::Numbered)
            .filter_map(|g| g.source().step_count())
            .max()
    }

    /// The selected step.
    #[must_use]
    pub fn selected_step(&self) -> usize {
        self.selected_step
    }

    /// Selects a step, clamped to the available steps.
    ///
    /// When only the selected step is plotted or an axis follows it, this
    /// refreshes. Otherwise only the areas of the old and new highlighted
    /// curves are queued for repaint.
    pub fn select_step(&mut self, step: usize) {
        let step = match self.step_count() {
            Some(n) if n > 0 => step.min(n - 1),
            _ => 0,
        };
        if step == self.selected_step {
            return;
        }
        log::debug!(target: "plotgen", "select step {step}");
        if self.config.only_selected_plotted
            || self
                .auto_zoom
                .intersects(AutoZoom::X_SELECTED | AutoZoom::Y_SELECTED)
        {
            self.selected_step = step;
            self.request_refresh();
            return;
        }
        let old = self.highlight_area();
        self.selected_step = step;
        let new = self.highlight_area();
        for area in [old, new].into_iter().flatten() {
            self.push_repaint(Repaint::Area(area));
        }
    }

    fn highlight_area(&mut self) -> Option<DeviceRect> {
        self.viewport.client_size()?;
        let pad = line_pad(self.config.line_width);
        let area = self
            .optimized_highlighted_curve_set()
            .iter()
            .map(CurveRef::bbox)
            .reduce(|a, b| a.union(&b))?;
        Some(DeviceRect {
            x0: area.x0.saturating_sub(pad),
            y0: area.y0.saturating_sub(pad),
            x1: area.x1.saturating_add(pad),
            y1: area.y1.saturating_add(pad),
        })
    }

    /// Union of the aggregate boxes of the visible groups.
    ///
    /// Visible groups with [`LayoutHints::DOMINANT_BBOX`] take precedence
    /// over all others. All-NaN in the data-error state.
    pub fn data_bounds(&mut self) -> RealBBox {
        if self.data_error {
            return RealBBox::EMPTY;
        }
        let dominant = self
            .groups
            .iter()
            .any(|g| g.is_visible() && g.hints().contains(LayoutHints::DOMINANT_BBOX));
        let mut b = RealBBox::EMPTY;
        for g in self.groups.iter_mut().filter(|g| {
            g.is_visible() && (!dominant || g.hints().contains(LayoutHints::DOMINANT_BBOX))
        }) {
            b = b.union(&g.real_bbox(StepIndex::AllSteps));
        }
        b
    }

    /// Union of the boxes of the selected step over visible numbered groups.
    pub fn selected_bounds(&mut self) -> RealBBox {
        if self.data_error {
            return RealBBox::EMPTY;
        }
        let step = StepIndex::Step(self.selected_step);
        let mut b = RealBBox::EMPTY;
        for g in self
            .groups
            .iter_mut()
            .filter(|g| g.is_visible() && g.kind() == GroupKind::Numbered)
        {
            b = b.union(&g.real_bbox(step));
        }
        b
    }

    /// Fits the scale to a client area; see [`Viewport::set_scale`].
    pub fn set_scale(&mut self, client: DeviceSize) -> DeviceSize {
        let before = self.viewport.scale();
        let virtual_size = self.viewport.set_scale(client);
        if self.viewport.scale() != before {
            log::debug!(target: "plotgen", "scale {:?}", self.viewport.scale());
            self.push_repaint(Repaint::Full);
        }
        virtual_size
    }

    /// Virtual pixel position of the client's top-left corner.
    #[must_use]
    pub fn view_start(&self) -> DevicePoint {
        self.viewport.view_start()
    }

    /// Scrolls the view; axes that moved stop auto-zooming.
    pub fn set_view_start(&mut self, start: DevicePoint) -> bool {
        let before = self.viewport.view_start();
        if !self.viewport.set_view_start(start) {
            return false;
        }
        let after = self.viewport.view_start();
        if after.x != before.x {
            self.auto_zoom.remove(AutoZoom::X_SELECTED | AutoZoom::X_ALL);
        }
        if after.y != before.y {
            self.auto_zoom.remove(AutoZoom::Y_SELECTED | AutoZoom::Y_ALL);
        }
        self.push_repaint(Repaint::Full);
        true
    }

    /// The client area in virtual device coordinates.
    #[must_use]
    pub fn client_rect(&self) -> DeviceRect {
        self.viewport.client_rect()
    }

    /// The region a redraw pass touches.
    #[must_use]
    pub fn buffer_rect(&self) -> DeviceRect {
        self.viewport.buffer_rect()
    }

    /// Real-space position of a virtual device point.
    #[must_use]
    pub fn real_point_at(&self, p: DevicePoint, rounding: RealRounding) -> Point {
        self.viewport.real_point_at(p, rounding)
    }

    /// Zooms by `√2` around a device point; zoomed axes stop auto-zooming.
    pub fn zoom(&mut self, zoom_in: bool, horizontal: bool, vertical: bool, fixed: DevicePoint) {
        if horizontal {
            self.auto_zoom.remove(AutoZoom::X_SELECTED | AutoZoom::X_ALL);
        }
        if vertical {
            self.auto_zoom.remove(AutoZoom::Y_SELECTED | AutoZoom::Y_ALL);
        }
        if self.viewport.zoom(zoom_in, horizontal, vertical, fixed) {
            self.push_repaint(Repaint::Full);
        }
    }

    /// Makes the given axes follow the selected step or all data.
    pub fn auto_scale(&mut self, selected: bool, horizontal: bool, vertical: bool) {
        let (x, y) = if selected {
            (AutoZoom::X_SELECTED, AutoZoom::Y_SELECTED)
        } else {
            (AutoZoom::X_ALL, AutoZoom::Y_ALL)
        };
        if horizontal {
            self.auto_zoom.remove(AutoZoom::X_SELECTED | AutoZoom::X_ALL);
            self.auto_zoom.insert(x);
        }
        if vertical {
            self.auto_zoom.remove(AutoZoom::Y_SELECTED | AutoZoom::Y_ALL);
            self.auto_zoom.insert(y);
        }
        if self.apply_auto_zoom() {
            self.push_repaint(Repaint::Full);
        }
    }

    /// Shows an explicit real rect; both axes stop auto-zooming.
    pub fn set_visible_real_rect(&mut self, rect: Rect) {
        self.auto_zoom = AutoZoom::empty();
        if self.viewport.set_visible_real_rect(rect, false, false) {
            self.push_repaint(Repaint::Full);
        }
    }

    /// Replaces the user bound overrides and re-applies the constraints.
    pub fn set_bound_overrides(&mut self, overrides: RealBBox) {
        self.viewport.set_bound_overrides(overrides);
        self.request_refresh();
    }

    fn apply_auto_zoom(&mut self) -> bool {
        let a = self.auto_zoom;
        let (xs, ys) = (a.contains(AutoZoom::X_SELECTED), a.contains(AutoZoom::Y_SELECTED));
        let xa = a.contains(AutoZoom::X_ALL) && !xs;
        let ya = a.contains(AutoZoom::Y_ALL) && !ys;
        let mut changed = false;
        if xs || ys {
            let b = self.selected_bounds();
            changed |= self.viewport.auto_scale(&b, xs, ys);
        }
        if xa || ya {
            let b = self.data_bounds();
            changed |= self.viewport.auto_scale(&b, xa, ya);
        }
        changed
    }

    /// All plotted curves of the visible groups.
    ///
    /// Numbered groups contribute every step not flagged blank or hidden (or
    /// only the selected step in only-selected mode); singular groups
    /// contribute their aggregate.
    pub fn curve_set(&mut self) -> &[CurveRef] {
        if self.prepare(SetKind::AllSteps, false) {
            &self.all_steps.raw
        } else {
            &[]
        }
    }

    /// The selected step of every visible numbered group, with highlight pens.
    pub fn highlighted_curve_set(&mut self) -> &[CurveRef] {
        if self.prepare(SetKind::Highlighted, false) {
            &self.highlighted.raw
        } else {
            &[]
        }
    }

    /// [`Graph::curve_set`] cropped to the buffer rect.
    pub fn optimized_curve_set(&mut self) -> &[CurveRef] {
        if self.prepare(SetKind::AllSteps, true) {
            &self.all_steps.optimized
        } else {
            &[]
        }
    }

    /// [`Graph::highlighted_curve_set`] cropped to the buffer rect.
    pub fn optimized_highlighted_curve_set(&mut self) -> &[CurveRef] {
        if self.prepare(SetKind::Highlighted, true) {
            &self.highlighted.optimized
        } else {
            &[]
        }
    }

    fn set_mut(&mut self, kind: SetKind) -> &mut CurveSet {
        match kind {
            SetKind::AllSteps => &mut self.all_steps,
            SetKind::Highlighted => &mut self.highlighted,
        }
    }

    fn set_key(&self, kind: SetKind, buffer: Option<DeviceRect>) -> SetKey {
        let per_step = kind == SetKind::Highlighted || self.config.only_selected_plotted;
        SetKey {
            scale: self.viewport.scale(),
            data: self.groups.iter().map(|g| g.generation().0).sum(),
            layout: self.clock.now(),
            step: per_step.then_some(self.selected_step),
            buffer,
        }
    }

    /// Brings a curve set up to date; `false` in the data-error state.
    fn prepare(&mut self, kind: SetKind, optimized: bool) -> bool {
        if self.data_error {
            return false;
        }
        if let Err(e) = self.ensure_raw(kind) {
            self.fail(&e);
            return false;
        }
        if optimized {
            self.ensure_optimized(kind);
        }
        true
    }

    fn ensure_raw(&mut self, kind: SetKind) -> Result<(), AllocError> {
        let key = self.set_key(kind, None);
        let set = self.set_mut(kind);
        if set.raw_key == Some(key) {
            return Ok(());
        }
        let mut curves = mem::take(&mut set.raw);
        curves.clear();
        set.clear();
        // A stale sibling set still shares the series curves; dropping it
        // lets the refill reuse their buffers.
        let other = self.set_mut(kind.other());
        if other.raw_key.is_some_and(|k| !k.same_data(&key)) {
            other.clear();
        }
        let built = self.build(kind, &mut curves);
        log::trace!(target: "plotgen", "{kind:?} curve set: {} curves", curves.len());
        let set = self.set_mut(kind);
        set.raw = curves;
        match built {
            Ok(()) => set.raw_key = Some(key),
            Err(_) => set.raw.clear(),
        }
        built
    }

    fn ensure_optimized(&mut self, kind: SetKind) {
        let buffer = self.viewport.buffer_rect();
        let key = self.set_key(kind, Some(buffer));
        let limit = self.config.coordinate_limit;
        let set = self.set_mut(kind);
        if set.optimized_key == Some(key) {
            return;
        }
        optimize(&set.raw, &buffer, limit, &mut set.optimized);
        set.optimized_key = Some(key);
        log::trace!(
            target: "plotgen",
            "{kind:?} optimized curve set: {} of {} curves",
            set.optimized.len(),
            set.raw.len()
        );
    }

    fn build(&mut self, kind: SetKind, out: &mut Vec<CurveRef>) -> Result<(), AllocError> {
        let scale = self.viewport.scale();
        let threshold = self.config.simplify_threshold;
        let step = self.selected_step;
        let valid = &self.valid_range;
        let highlighted = kind == SetKind::Highlighted;
        let per_step = highlighted || self.config.only_selected_plotted;
        for g in self.groups.iter_mut().filter(|g| g.is_visible()) {
            let pens = g.pens();
            let pen = if highlighted {
                pens.highlighted
            } else {
                pens.normal
            };
            match g.kind() {
                GroupKind::Numbered if per_step => {
                    if step < g.step_count() {
                        let index = StepIndex::Step(step);
                        out.extend(g.split_curve(&scale, index, threshold, valid.clone(), pen)?);
                    }
                }
                GroupKind::Numbered => {
                    for s in 0..g.step_count() {
                        if g.source().step_flags(s).is_plotted() {
                            let index = StepIndex::Step(s);
                            out.extend(g.split_curve(&scale, index, threshold, valid.clone(), pen)?);
                        }
                    }
                }
                GroupKind::Singular if !highlighted => {
                    let index = StepIndex::AllSteps;
                    out.extend(g.split_curve(&scale, index, threshold, valid.clone(), pen)?);
                }
                GroupKind::Singular => {}
            }
        }
        Ok(())
    }

    fn fail(&mut self, err: &AllocError) {
        log::warn!(target: "plotgen", "data error: {err}");
        self.data_error = true;
        self.all_steps.clear();
        self.highlighted.clear();
        self.push_repaint(Repaint::Full);
    }

    /// Whether an allocation failure put the graph into the data-error state.
    #[must_use]
    pub fn has_data_error(&self) -> bool {
        self.data_error
    }

    /// Leaves the data-error state and drops every cache.
    pub fn reset(&mut self) {
        self.data_error = false;
        for g in &mut self.groups {
            g.mark_old(Stale::all(), 0);
        }
        self.clock.bump();
        self.all_steps.clear();
        self.highlighted.clear();
        self.x_axis = None;
        self.y_axis = None;
        self.request_refresh();
    }

    /// Ticks of the horizontal axis covering the buffer rect.
    ///
    /// Regenerated when the scale or `min_px` changed or the cached ticks no
    /// longer cover the client area.
    pub fn x_axis(&mut self, min_px: f64) -> &Axis {
        let mapping = AxisMapping::horizontal(&self.viewport);
        let client = self.viewport.client_rect();
        let fresh = self
            .x_axis
            .as_ref()
            .is_some_and(|a| a.is_valid_for(&mapping, min_px, client.x0, client.x1));
        if !fresh {
            let buffer = self.viewport.buffer_rect();
            log::trace!(target: "plotgen", "x axis over {}..={}", buffer.x0, buffer.x1);
            let style = self.config.x_axis_style();
            self.x_axis = Some(Axis::generate(mapping, buffer.x0, buffer.x1, min_px, &style));
        }
        self.x_axis.get_or_insert_with(Axis::default)
    }

    /// Ticks of the vertical axis covering the buffer rect.
    pub fn y_axis(&mut self, min_px: f64) -> &Axis {
        let mapping = AxisMapping::vertical(&self.viewport);
        let client = self.viewport.client_rect();
        let fresh = self
            .y_axis
            .as_ref()
            .is_some_and(|a| a.is_valid_for(&mapping, min_px, client.y0, client.y1));
        if !fresh {
            let buffer = self.viewport.buffer_rect();
            log::trace!(target: "plotgen", "y axis over {}..={}", buffer.y0, buffer.y1);
            let style = self.config.y_axis_style();
            self.y_axis = Some(Axis::generate(mapping, buffer.y0, buffer.y1, min_px, &style));
        }
        self.y_axis.get_or_insert_with(Axis::default)
    }

    /// Drains the queued repaint requests.
    pub fn take_repaints(&mut self) -> Vec<Repaint> {
        mem::take(&mut self.repaints)
    }

    fn push_repaint(&mut self, r: Repaint) {
        if self.repaints.contains(&Repaint::Full) {
            return;
        }
        if r == Repaint::Full {
            self.repaints.clear();
        }
        self.repaints.push(r);
    }

    /// Whether a [`crate::FreezeGuard`] is alive.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.freeze_depth > 0
    }

    /// Recomputes the data bounds and re-applies auto zoom, now or when the
    /// outermost freeze guard is dropped.
    pub fn request_refresh(&mut self) {
        if self.is_frozen() {
            self.refresh_pending = true;
        } else {
            self.refresh_now();
        }
    }

    fn refresh_now(&mut self) {
        self.refresh_pending = false;
        let bounds = self.data_bounds();
        log::debug!(target: "plotgen", "refresh: data bounds {bounds:?}");
        self.viewport.set_data_bounds(bounds);
        self.apply_auto_zoom();
        self.push_repaint(Repaint::Full);
    }

    pub(crate) fn enter_freeze(&mut self) {
        self.freeze_depth += 1;
    }

    pub(crate) fn thaw(&mut self) {
        self.freeze_depth = self.freeze_depth.saturating_sub(1);
        if self.freeze_depth == 0 && self.refresh_pending {
            self.refresh_now();
        }
    }
}

/// Pixels a stroke of `width` reaches beyond the curve's bounding box.
#[expect(clippy::cast_possible_truncation, reason = "clamped to a few pixels")]
fn line_pad(width: f64) -> i32 {
    (width.clamp(0.0, 64.0) * 0.5) as i32 + 1
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Point;
    use plotgen_curve::PenId;
    use plotgen_view::{DevicePoint, DeviceSize};

    use super::{AutoZoom, Graph, Repaint};
    use crate::group::{DataSeriesGroup, GroupKind, GroupPens, LayoutHints};
    use crate::series::Stale;
    use crate::source::{StepEvaluation, StepTraces};

    fn pens() -> GroupPens {
        GroupPens {
            normal: PenId(1),
            highlighted: PenId(2),
            alternate: PenId(3),
        }
    }

    fn ramp(n: usize, slope: f64) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, slope * i as f64)).collect()
    }

    fn numbered(steps: Vec<Vec<Point>>) -> DataSeriesGroup {
        DataSeriesGroup::new(
            "Real",
            GroupKind::Numbered,
            Box::new(StepTraces::new(steps)),
            LayoutHints::NONDECREASING_X,
            pens(),
        )
    }

    #[test]
    fn adding_a_group_fits_the_view() {
        let mut g = Graph::default();
        g.add_group(numbered(vec![ramp(11, 1.0), ramp(11, 2.0)]));
        let v = g.viewport().visible_real_rect();
        assert_eq!((v.x0, v.x1, v.y0, v.y1), (0.0, 10.0, 0.0, 20.0));
        assert_eq!(g.take_repaints(), vec![Repaint::Full]);
        assert!(g.take_repaints().is_empty());
    }

    #[test]
    fn curve_sets_follow_selection_and_kind() {
        let mut g = Graph::default();
        g.add_group(numbered(vec![ramp(11, 1.0), ramp(11, 2.0), ramp(11, 3.0)]));
        g.add_group(DataSeriesGroup::new(
            "Integral",
            GroupKind::Singular,
            Box::new(StepEvaluation::new(vec![1.0, 2.0, 3.0])),
            LayoutHints::empty(),
            pens(),
        ));
        g.set_scale(DeviceSize::new(200, 100));

        assert_eq!(g.curve_set().len(), 4);
        assert!(g.curve_set().iter().all(|c| c.pen() == PenId(1)));
        let h = g.highlighted_curve_set();
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].pen(), PenId(2));

        g.set_only_selected_plotted(true);
        assert_eq!(g.curve_set().len(), 2);
    }

    #[test]
    fn curve_sets_are_reused_until_something_changes() {
        let mut g = Graph::default();
        let id = g.add_group(numbered(vec![ramp(11, 1.0)]));
        g.set_scale(DeviceSize::new(200, 100));
        let first = g.curve_set()[0].curve().clone();
        assert!(alloc::rc::Rc::ptr_eq(&first, g.curve_set()[0].curve()));

        g.set_group_visible(id, false);
        assert!(g.curve_set().is_empty());
        g.set_group_visible(id, true);
        assert_eq!(g.curve_set().len(), 1);
    }

    #[test]
    fn rebuilt_sets_replace_their_contents() {
        let mut g = Graph::default();
        g.add_group(numbered(vec![ramp(11, 1.0), ramp(11, 2.0)]));
        g.set_scale(DeviceSize::new(200, 100));
        for _ in 0..3 {
            g.mark_old(Stale::all(), 0);
            assert_eq!(g.curve_set().len(), 2);
            assert_eq!(g.optimized_curve_set().len(), 2);
            assert_eq!(g.highlighted_curve_set().len(), 1);
            g.select_step(1);
            assert_eq!(g.highlighted_curve_set().len(), 1);
            g.select_step(0);
        }
    }

    #[test]
    fn refills_reuse_curve_buffers() {
        let mut g = Graph::default();
        g.add_group(numbered(vec![ramp(11, 1.0)]));
        g.set_scale(DeviceSize::new(200, 100));
        let before = alloc::rc::Rc::as_ptr(g.curve_set()[0].curve());
        // Both sets and the cropped one share the step's curve.
        assert_eq!(g.highlighted_curve_set().len(), 1);
        assert_eq!(g.optimized_curve_set().len(), 1);

        g.mark_old(Stale::CURVE, 0);
        let after = alloc::rc::Rc::as_ptr(g.curve_set()[0].curve());
        assert_eq!(before, after);
        assert_eq!(g.highlighted_curve_set().len(), 1);
    }

    #[test]
    fn zooming_clears_auto_zoom_and_auto_scale_restores_it() {
        let mut g = Graph::default();
        g.add_group(numbered(vec![ramp(11, 1.0)]));
        g.set_scale(DeviceSize::new(200, 100));
        g.zoom(true, true, false, DevicePoint::new(100, 50));
        assert_eq!(g.auto_zoom(), AutoZoom::Y_ALL);
        assert!(g.viewport().visible_real_rect().width() < 10.0);

        g.auto_scale(false, true, false);
        assert_eq!(g.auto_zoom(), AutoZoom::X_ALL | AutoZoom::Y_ALL);
        assert_eq!(g.viewport().visible_real_rect().width(), 10.0);
    }

    #[test]
    fn selection_is_clamped() {
        let mut g = Graph::default();
        assert_eq!(g.step_count(), None);
        g.select_step(4);
        assert_eq!(g.selected_step(), 0);

        g.add_group(numbered(vec![ramp(3, 1.0), ramp(3, 1.0)]));
        g.select_step(7);
        assert_eq!(g.selected_step(), 1);
    }
}

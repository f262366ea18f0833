// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use kurbo::{Point, Rect};

use crate::geometry::{
    DEV_LIMIT, DevicePoint, DeviceRect, DeviceSize, PREC_LIMIT, RealBBox, round_half_up,
    to_device_int,
};
use crate::modes::{Axes, Edges, RealRounding};
use crate::scale::Scale;

/// Real-space viewport over a plot with integer device mapping.
///
/// `Viewport` owns three real-space rectangles:
/// - the *data bounds*, the union of the bounding boxes of everything that is
///   plotted (NaN components when there is no data),
/// - the *requested* rect, what the user asked to see (after constraints),
/// - the *graph rect*, the union of both, which is what the virtual (scrollable)
///   device area covers.
///
/// [`Viewport::set_scale`] derives a [`Scale`] that maps the graph rect onto
/// virtual pixels and the requested range onto the client area, subject to two
/// precision guards:
/// - `|real * factor|` never exceeds `2^53`, so rounding to pixels is exact,
/// - no device coordinate of the graph rect exceeds `2^27 - 1`.
///
/// When either guard triggers, the visible range is widened around its center
/// and further zoom-in on that axis is refused until the guard clears.
#[derive(Clone, Debug)]
pub struct Viewport {
    data_bounds: RealBBox,
    overrides: RealBBox,
    requested: Rect,
    visible: Rect,
    graph_rect: Rect,
    constrain: Edges,
    scale: Scale,
    client: Option<DeviceSize>,
    view_size: DeviceSize,
    virtual_size: DeviceSize,
    view_start: DevicePoint,
    scrollbar: DeviceSize,
    prefetch_margin: f64,
    sticky_axis_fraction: f64,
    zoom_limited: Axes,
    show_zero_axis_x: bool,
    show_zero_axis_y: bool,
    sticky_zoom_bottom: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Creates a viewport showing the unit square with no data bounds.
    ///
    /// All four edges are constrained, the prefetch margin is 25% of the
    /// client size per side and scrollbars take 16 pixels.
    #[must_use]
    pub fn new() -> Self {
        let unit = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut vp = Self {
            data_bounds: RealBBox::EMPTY,
            overrides: RealBBox::EMPTY,
            requested: unit,
            visible: unit,
            graph_rect: unit,
            constrain: Edges::all(),
            scale: Scale::default(),
            client: None,
            view_size: DeviceSize::default(),
            virtual_size: DeviceSize::default(),
            view_start: DevicePoint::ZERO,
            scrollbar: DeviceSize::new(16, 16),
            prefetch_margin: 0.25,
            sticky_axis_fraction: 0.1,
            zoom_limited: Axes::empty(),
            show_zero_axis_x: false,
            show_zero_axis_y: false,
            sticky_zoom_bottom: false,
        };
        vp.update_flags();
        vp
    }

    /// Returns the current scale.
    #[must_use]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Returns the rect that is actually visible after the last [`Viewport::set_scale`].
    #[must_use]
    pub fn visible_real_rect(&self) -> Rect {
        self.visible
    }

    /// Returns the requested rect after constraints.
    #[must_use]
    pub fn requested_real_rect(&self) -> Rect {
        self.requested
    }

    /// Returns the union of the data bounds and the requested rect.
    #[must_use]
    pub fn graph_real_rect(&self) -> Rect {
        self.graph_rect
    }

    /// Returns the data bounds.
    #[must_use]
    pub fn data_bounds(&self) -> RealBBox {
        self.data_bounds
    }

    /// Size of the scrollable virtual device area.
    #[must_use]
    pub fn virtual_size(&self) -> DeviceSize {
        self.virtual_size
    }

    /// Client pixels left for the plot once scrollbars are accounted for.
    #[must_use]
    pub fn view_size(&self) -> DeviceSize {
        self.view_size
    }

    /// Last client size passed to [`Viewport::set_scale`].
    #[must_use]
    pub fn client_size(&self) -> Option<DeviceSize> {
        self.client
    }

    /// Axes on which zoom-in is currently refused by a precision guard.
    #[must_use]
    pub fn zoom_in_limited(&self) -> Axes {
        self.zoom_limited
    }

    /// Whether the horizontal line at `y = 0` should be drawn.
    #[must_use]
    pub fn show_zero_axis_x(&self) -> bool {
        self.show_zero_axis_x
    }

    /// Whether the vertical line at `x = 0` should be drawn.
    #[must_use]
    pub fn show_zero_axis_y(&self) -> bool {
        self.show_zero_axis_y
    }

    /// Whether vertical zooming pins the bottom edge at zero.
    #[must_use]
    pub fn sticky_zoom_bottom(&self) -> bool {
        self.sticky_zoom_bottom
    }

    /// Sets the edges that constrain the requested rect.
    pub fn set_constrained_edges(&mut self, edges: Edges) {
        if self.constrain != edges {
            self.constrain = edges;
            self.set_visible_real_rect(self.requested, true, true);
        }
    }

    /// Returns the constrained edges.
    #[must_use]
    pub fn constrained_edges(&self) -> Edges {
        self.constrain
    }

    /// Sets the pixel size reserved for a scrollbar on each dimension.
    pub fn set_scrollbar_size(&mut self, size: DeviceSize) {
        if self.scrollbar != size {
            self.scrollbar = size;
            self.rescale();
        }
    }

    /// Sets the fraction of the client size added on every side of the buffer rect.
    pub fn set_prefetch_margin(&mut self, margin: f64) {
        self.prefetch_margin = margin.max(0.0);
    }

    /// Sets the fraction of the visible range within which zoom anchors snap onto an axis.
    pub fn set_sticky_axis_fraction(&mut self, fraction: f64) {
        self.sticky_axis_fraction = fraction.max(0.0);
    }

    /// Temporarily widens the constraint bounds.
    ///
    /// Components that are NaN leave the corresponding data bound untouched.
    /// This lets externally supplied zoom parameters that lie outside the
    /// current data survive until the next auto-scale of that axis.
    pub fn set_bound_overrides(&mut self, overrides: RealBBox) {
        self.overrides = overrides;
        self.update_graph_rect();
    }

    /// Replaces the data bounds and re-applies the constraints to the current request.
    pub fn set_data_bounds(&mut self, bounds: RealBBox) {
        self.data_bounds = bounds;
        self.set_visible_real_rect(self.requested, true, true);
    }

    /// Fits the scale to a client area and returns the virtual (scrollable) size.
    pub fn set_scale(&mut self, client: DeviceSize) -> DeviceSize {
        self.client = Some(DeviceSize::new(client.width.max(1), client.height.max(1)));
        self.rescale();
        self.virtual_size
    }

    /// Returns the virtual pixel position of the client's top-left corner.
    #[must_use]
    pub fn view_start(&self) -> DevicePoint {
        self.view_start
    }

    /// Scrolls so that the client's top-left corner sits at `start`.
    ///
    /// The position is clamped to the scrollable range. At either end of that
    /// range the visible rect snaps exactly onto the graph rect edge so that
    /// repeated scrolling never accumulates rounding drift. Returns `true` if
    /// the view moved.
    pub fn set_view_start(&mut self, start: DevicePoint) -> bool {
        if self.client.is_none() {
            return false;
        }
        let max_x = (self.virtual_size.width - self.view_size.width).max(0);
        let max_y = (self.virtual_size.height - self.view_size.height).max(0);
        let start = DevicePoint::new(start.x.clamp(0, max_x), start.y.clamp(0, max_y));
        if start == self.view_start {
            return false;
        }

        let g = self.graph_rect;
        let mut v = self.visible;
        if self.scale.x_factor != 0.0 {
            let w = v.width();
            let (lo, hi) = if start.x == 0 {
                (g.x0, g.x0 + w)
            } else if start.x == max_x {
                (g.x1 - w, g.x1)
            } else {
                let lo = self.scale.x_to_real(i64::from(start.x));
                (lo, lo + w)
            };
            v.x0 = lo;
            v.x1 = hi;
        }
        if self.scale.y_factor != 0.0 {
            let h = v.height();
            let (lo, hi) = if start.y == 0 {
                (g.y1 - h, g.y1)
            } else if start.y == max_y {
                (g.y0, g.y0 + h)
            } else {
                let hi = self.scale.y_to_real(i64::from(start.y));
                (hi - h, hi)
            };
            v.y0 = lo;
            v.y1 = hi;
        }

        self.visible = v;
        self.requested = v;
        self.view_start = start;
        self.update_flags();
        true
    }

    /// The client area in virtual device coordinates.
    #[must_use]
    pub fn client_rect(&self) -> DeviceRect {
        DeviceRect::from_origin_size(self.view_start, self.view_size)
    }

    /// The region a redraw pass touches: the client area plus the prefetch
    /// margin on every side, clamped to the virtual area.
    #[must_use]
    pub fn buffer_rect(&self) -> DeviceRect {
        let client = self.client_rect();
        let mx = margin_px(self.view_size.width, self.prefetch_margin);
        let my = margin_px(self.view_size.height, self.prefetch_margin);
        let vx1 = (self.virtual_size.width - 1).max(client.x1);
        let vy1 = (self.virtual_size.height - 1).max(client.y1);
        DeviceRect {
            x0: client.x0.saturating_sub(mx).max(0),
            y0: client.y0.saturating_sub(my).max(0),
            x1: client.x1.saturating_add(mx).min(vx1),
            y1: client.y1.saturating_add(my).min(vy1),
        }
    }

    /// Real-space position of a virtual device point.
    ///
    /// A collapsed axis reports the center of the visible range.
    #[must_use]
    pub fn real_point_at(&self, p: DevicePoint, rounding: RealRounding) -> Point {
        let s = &self.scale;
        let mut x = if s.x_factor == 0.0 {
            (self.visible.x0 + self.visible.x1) * 0.5
        } else {
            s.x_to_real(i64::from(p.x))
        };
        let mut y = if s.y_factor == 0.0 {
            (self.visible.y0 + self.visible.y1) * 0.5
        } else {
            s.y_to_real(i64::from(p.y))
        };
        if rounding == RealRounding::Coarse {
            x = coarse(x, s.x_factor);
            y = coarse(y, s.y_factor);
        }
        Point::new(x, y)
    }

    /// Zooms by `√2` around a device point.
    ///
    /// The anchor is converted to real space and snapped onto an axis that is
    /// in view when it lies within the sticky fraction of the visible range of
    /// that axis. When the bottom edge sits exactly at zero, vertical zooming
    /// keeps it there.
    pub fn zoom(
        &mut self,
        zoom_in: bool,
        horizontal: bool,
        vertical: bool,
        fixed: DevicePoint,
    ) -> bool {
        let mut anchor = self.real_point_at(fixed, RealRounding::Exact);
        let v = self.visible;
        if vertical {
            if self.sticky_zoom_bottom {
                anchor.y = 0.0;
            } else if self.show_zero_axis_x
                && libm::fabs(anchor.y) < self.sticky_axis_fraction * v.height()
            {
                anchor.y = 0.0;
            }
        }
        if horizontal
            && self.show_zero_axis_y
            && libm::fabs(anchor.x) < self.sticky_axis_fraction * v.width()
        {
            anchor.x = 0.0;
        }
        self.zoom_about(zoom_in, horizontal, vertical, anchor)
    }

    /// Zooms by `√2` around a real-space anchor.
    ///
    /// Axes on which zoom-in is limited are left alone when zooming in.
    pub fn zoom_about(
        &mut self,
        zoom_in: bool,
        horizontal: bool,
        vertical: bool,
        anchor: Point,
    ) -> bool {
        let f = if zoom_in { FRAC_1_SQRT_2 } else { SQRT_2 };
        let mut r = self.visible;
        if horizontal && !(zoom_in && self.zoom_limited.contains(Axes::X)) {
            r.x0 = anchor.x - (anchor.x - r.x0) * f;
            r.x1 = anchor.x + (r.x1 - anchor.x) * f;
        }
        if vertical && !(zoom_in && self.zoom_limited.contains(Axes::Y)) {
            r.y0 = anchor.y - (anchor.y - r.y0) * f;
            r.y1 = anchor.y + (r.y1 - anchor.y) * f;
        }
        log::debug!(
            target: "plotgen",
            "zoom {} about ({}, {})",
            if zoom_in { "in" } else { "out" },
            anchor.x,
            anchor.y
        );
        self.set_visible_real_rect(r, true, false)
    }

    /// Replaces the requested range of the given axes with `bbox`.
    ///
    /// Bound overrides on those axes are dropped. Axes on which `bbox` has no
    /// data keep their current range.
    pub fn auto_scale(&mut self, bbox: &RealBBox, horizontal: bool, vertical: bool) -> bool {
        let mut r = self.requested;
        if horizontal && bbox.has_x() {
            r.x0 = bbox.min_x;
            r.x1 = bbox.max_x;
            self.overrides.min_x = f64::NAN;
            self.overrides.max_x = f64::NAN;
        }
        if vertical && bbox.has_y() {
            r.y0 = bbox.min_y;
            r.y1 = bbox.max_y;
            self.overrides.min_y = f64::NAN;
            self.overrides.max_y = f64::NAN;
        }
        self.set_visible_real_rect(r, false, true)
    }

    /// Requests a visible rect, constrained to the data bounds.
    ///
    /// For every constrained edge that `rect` crosses, the rect is first moved
    /// back inside (when `allow_move` is set and moving does not break the
    /// opposite edge), otherwise trimmed. A range is never inverted: in the
    /// worst case it collapses to zero width on the violated bound.
    ///
    /// Returns `true` if the request changed; `force` re-applies it anyway.
    pub fn set_visible_real_rect(&mut self, rect: Rect, allow_move: bool, force: bool) -> bool {
        let r = rect.abs();
        let b = self.constraint_bounds();
        let c = self.constrain;
        let (x0, x1) = constrain_range(
            (r.x0, r.x1),
            (b.min_x, b.max_x),
            (c.contains(Edges::LEFT), c.contains(Edges::RIGHT)),
            allow_move,
        );
        let (y0, y1) = constrain_range(
            (r.y0, r.y1),
            (b.min_y, b.max_y),
            (c.contains(Edges::BOTTOM), c.contains(Edges::TOP)),
            allow_move,
        );
        let r = Rect::new(x0, y0, x1, y1);
        if !force && r == self.requested {
            return false;
        }
        self.requested = r;
        self.update_graph_rect();
        self.update_flags();
        self.rescale();
        true
    }

    /// Snapshot of the viewport state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> ViewportDebugInfo {
        ViewportDebugInfo {
            data_bounds: self.data_bounds,
            requested: self.requested,
            visible: self.visible,
            graph_rect: self.graph_rect,
            scale: self.scale,
            view_size: self.view_size,
            virtual_size: self.virtual_size,
            view_start: self.view_start,
            zoom_limited: self.zoom_limited,
        }
    }

    fn constraint_bounds(&self) -> RealBBox {
        let d = self.data_bounds;
        let o = self.overrides;
        RealBBox::new(
            d.min_x.min(o.min_x),
            d.max_x.max(o.max_x),
            d.min_y.min(o.min_y),
            d.max_y.max(o.max_y),
        )
    }

    fn update_graph_rect(&mut self) {
        let g = RealBBox::from_rect(self.requested).union(&self.data_bounds);
        self.graph_rect = g.to_rect();
    }

    fn update_flags(&mut self) {
        let r = self.requested;
        self.show_zero_axis_x = straddles_zero(r.y0, r.y1);
        self.show_zero_axis_y = straddles_zero(r.x0, r.x1);
        self.sticky_zoom_bottom = r.y0 == 0.0;
    }

    fn rescale(&mut self) {
        let Some(client) = self.client else {
            self.visible = self.requested;
            return;
        };

        // Reserving scrollbar space can itself make the other axis scroll, so
        // the fit is redone until the available size settles.
        let mut avail = client;
        let mut fit = self.fit(avail);
        for _ in 0..2 {
            let next = DeviceSize::new(
                (client.width - if fit.1.scrolls { self.scrollbar.width } else { 0 }).max(1),
                (client.height - if fit.0.scrolls { self.scrollbar.height } else { 0 }).max(1),
            );
            if next == avail {
                break;
            }
            avail = next;
            fit = self.fit(avail);
        }

        let (fx, fy) = fit;
        let scale = Scale::new(fx.offset, fy.offset, fx.factor, fy.factor);
        if scale != self.scale {
            log::debug!(target: "plotgen", "scale changed: {scale:?}");
        }
        self.scale = scale;
        self.visible = Rect::new(fx.lo, fy.lo, fx.hi, fy.hi);
        self.view_size = avail;
        self.virtual_size = DeviceSize::new(fx.virtual_len, fy.virtual_len);
        self.view_start = DevicePoint::new(fx.start, fy.start);
        self.zoom_limited = Axes::from_bools(fx.limited, fy.limited);
    }

    fn fit(&self, avail: DeviceSize) -> (AxisFit, AxisFit) {
        let g = self.graph_rect;
        let r = self.requested;
        (
            fit_axis((g.x0, g.x1), (r.x0, r.x1), avail.width, false),
            fit_axis((g.y0, g.y1), (r.y0, r.y1), avail.height, true),
        )
    }
}

/// Debug snapshot of a [`Viewport`] state.
#[derive(Clone, Copy, Debug)]
pub struct ViewportDebugInfo {
    /// Union of the plotted data bounding boxes.
    pub data_bounds: RealBBox,
    /// Requested rect after constraints.
    pub requested: Rect,
    /// Rect actually visible in the client area.
    pub visible: Rect,
    /// Union of data bounds and request.
    pub graph_rect: Rect,
    /// Current scale.
    pub scale: Scale,
    /// Client pixels after scrollbars.
    pub view_size: DeviceSize,
    /// Scrollable virtual size.
    pub virtual_size: DeviceSize,
    /// Scroll position.
    pub view_start: DevicePoint,
    /// Axes where zoom-in is refused.
    pub zoom_limited: Axes,
}

/// Result of fitting one axis.
#[derive(Clone, Copy, Debug)]
struct AxisFit {
    factor: f64,
    offset: i64,
    lo: f64,
    hi: f64,
    virtual_len: i32,
    start: i32,
    scrolls: bool,
    limited: bool,
}

fn fit_axis(graph: (f64, f64), visible: (f64, f64), pixels: i32, inverted: bool) -> AxisFit {
    let pixels = pixels.max(1);
    let span_px = f64::from(pixels - 1);
    let (g_lo, g_hi) = graph;
    let g_w = g_hi - g_lo;

    if !(g_w > 0.0) || !g_w.is_finite() || span_px < 1.0 {
        let (lo, hi) = if g_w > 0.0 { visible } else { graph };
        return AxisFit {
            factor: 0.0,
            offset: -i64::from((pixels - 1) / 2),
            lo,
            hi,
            virtual_len: pixels,
            start: 0,
            scrolls: false,
            limited: false,
        };
    }

    let mut lo = visible.0.max(g_lo).min(g_hi);
    let mut hi = visible.1.min(g_hi).max(lo);
    let mut w = hi - lo;

    let max_abs = libm::fabs(g_lo).max(libm::fabs(g_hi));
    let dev_limit = DEV_LIMIT as f64;
    let min_w = (span_px * max_abs / PREC_LIMIT).max(span_px * g_w / dev_limit);
    // A range the guard already widened comes back a few ulps of the
    // endpoints off `min_w`.
    let limited = w <= min_w + 4.0 * f64::EPSILON * max_abs;
    if limited {
        let center = (lo + hi) * 0.5;
        w = min_w.min(g_w);
        lo = center - w * 0.5;
        hi = lo + w;
        if lo < g_lo {
            lo = g_lo;
            hi = lo + w;
        }
        if hi > g_hi {
            hi = g_hi;
            lo = hi - w;
        }
        log::debug!(target: "plotgen", "precision guard widened range to {w}");
    }

    let mut coef = span_px / w;
    let mut full = pixel_span(g_lo, g_hi, coef);
    let scrolls = if full <= span_px {
        false
    } else if w >= g_w {
        // The whole range was requested; only rounding overflows.
        coef = (span_px - 0.5) / g_w;
        full = pixel_span(g_lo, g_hi, coef);
        false
    } else {
        true
    };
    if !scrolls {
        lo = g_lo;
        hi = g_hi;
    }

    let factor = if inverted { -coef } else { coef };
    let origin = if inverted { g_hi } else { g_lo };
    let offset = to_device_int(round_half_up(origin * factor));
    #[expect(clippy::cast_possible_truncation, reason = "bounded by DEV_LIMIT")]
    let virtual_len = if scrolls { (full + 1.0) as i32 } else { pixels };
    let near = if inverted { hi } else { lo };
    let start = to_device_int(round_half_up(near * factor)) - offset;
    let start = start.clamp(0, i64::from((virtual_len - pixels).max(0)));

    AxisFit {
        factor,
        offset,
        lo,
        hi,
        virtual_len,
        start: i32::try_from(start).unwrap_or(0),
        scrolls,
        limited,
    }
}

fn pixel_span(lo: f64, hi: f64, coef: f64) -> f64 {
    round_half_up(hi * coef) - round_half_up(lo * coef)
}

fn constrain_range(
    range: (f64, f64),
    bounds: (f64, f64),
    constrained: (bool, bool),
    allow_move: bool,
) -> (f64, f64) {
    let (mut lo, mut hi) = range;
    let (min, max) = bounds;
    let (c_min, c_max) = constrained;

    if c_min && lo < min {
        if allow_move {
            let d = min - lo;
            lo += d;
            hi += d;
        } else {
            lo = min;
        }
    }
    if c_max && hi > max {
        let d = hi - max;
        if allow_move && !(c_min && lo - d < min) {
            lo -= d;
            hi -= d;
        } else {
            hi = max;
        }
    }
    if c_min && lo < min {
        lo = min;
    }
    if hi < lo {
        if c_max && lo > max {
            lo = max;
        }
        hi = lo;
    }
    (lo, hi)
}

fn straddles_zero(lo: f64, hi: f64) -> bool {
    (lo < 0.0 && hi > 0.0) || (lo == 0.0 && hi == 0.0)
}

fn margin_px(size: i32, margin: f64) -> i32 {
    let m = to_device_int(round_half_up(f64::from(size) * margin));
    i32::try_from(m).unwrap_or(i32::MAX)
}

fn coarse(v: f64, factor: f64) -> f64 {
    if factor == 0.0 || !v.is_finite() {
        return v;
    }
    let pixel = 1.0 / libm::fabs(factor);
    let q = libm::pow(10.0, libm::floor(libm::log10(pixel)));
    if !(q > 0.0) || !q.is_finite() {
        return v;
    }
    round_half_up(v / q) * q
}

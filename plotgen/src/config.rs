// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use plotgen_axis::AxisStyle;
use plotgen_curve::CoordinateLimit;
use plotgen_view::{DeviceSize, Edges};

/// Tunables of a [`crate::Graph`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
    /// Curves with more than this many points per pixel of bounding box
    /// width plus height are simplified.
    pub simplify_threshold: f64,
    /// Fraction of the client size added on every side of the buffer rect.
    pub prefetch_margin: f64,
    /// Pixels a scrollbar takes on each dimension.
    pub scrollbar_size: DeviceSize,
    /// Fraction of the visible range within which zoom anchors snap onto an axis.
    pub sticky_axis_fraction: f64,
    /// Coordinate range supported by the rendering sink.
    pub coordinate_limit: CoordinateLimit,
    /// Edges of the data bounds the visible rect must stay within.
    pub constrain: Edges,
    /// Draw only the selected step instead of all steps.
    pub only_selected_plotted: bool,
    /// Print raw x labels instead of factoring out a power of ten.
    pub absolute_labels_x: bool,
    /// Print raw y labels instead of factoring out a power of ten.
    pub absolute_labels_y: bool,
    /// Unit of the x axis.
    pub x_unit: String,
    /// Unit of the y axis.
    pub y_unit: String,
    /// Width of drawn curves and axis lines, in pixels.
    pub line_width: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            simplify_threshold: 3.0,
            prefetch_margin: 0.25,
            scrollbar_size: DeviceSize::new(16, 16),
            sticky_axis_fraction: 0.1,
            coordinate_limit: CoordinateLimit::Wide,
            constrain: Edges::all(),
            only_selected_plotted: false,
            absolute_labels_x: false,
            absolute_labels_y: false,
            x_unit: String::new(),
            y_unit: String::new(),
            line_width: 1.0,
        }
    }
}

impl GraphConfig {
    pub(crate) fn x_axis_style(&self) -> AxisStyle {
        AxisStyle {
            absolute_labels: self.absolute_labels_x,
            unit: self.x_unit.clone(),
            line_width: self.line_width,
        }
    }

    pub(crate) fn y_axis_style(&self) -> AxisStyle {
        AxisStyle {
            absolute_labels: self.absolute_labels_y,
            unit: self.y_unit.clone(),
            line_width: self.line_width,
        }
    }
}

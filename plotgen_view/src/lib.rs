// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotgen View: scale and viewport primitives for scrollable plots.
//!
//! This crate models the mapping between *real* space (the coordinates of the
//! plotted data) and *device* space (integer pixels). It focuses on:
//! - A [`Scale`] with integer offsets, so that scrolling never changes how a
//!   value rounds to a pixel.
//! - A [`Viewport`] that fits a requested real rect into a client area,
//!   decides whether scrollbars are needed, and handles zooming and panning.
//! - Range constraints that keep the request inside the data bounds.
//! - Precision guards that stop zooming in before `f64` runs out of digits or
//!   device coordinates overflow.
//!
//! It does **not** draw anything. Callers use [`Viewport::scale`] to map their
//! data and [`Viewport::buffer_rect`] to decide what to prepare.
//!
//! ## Minimal example
//!
//! ```rust
//! use plotgen_view::{DeviceSize, RealBBox, Viewport};
//!
//! let data = RealBBox::new(0.0, 100.0, -1.0, 1.0);
//! let mut view = Viewport::new();
//! view.set_data_bounds(data);
//! view.auto_scale(&data, true, true);
//!
//! let virtual_size = view.set_scale(DeviceSize::new(801, 201));
//! assert_eq!(virtual_size, DeviceSize::new(801, 201));
//!
//! let scale = view.scale();
//! assert_eq!(scale.x_to_device(50.0), 400);
//! assert_eq!(scale.y_to_device(1.0), 0);
//! ```
//!
//! ## Device conventions
//!
//! - Device Y grows downwards, so the y factor is negative.
//! - Device rects are inclusive on both ends.
//! - A zero factor marks a collapsed axis (all data on one value); such an
//!   axis maps everything to the middle of the client.
//!
//! This crate is `no_std`.

#![no_std]

mod geometry;
mod modes;
mod scale;
mod viewport;

pub use geometry::{
    DEV_LIMIT, DevicePoint, DeviceRect, DeviceSize, PREC_LIMIT, RealBBox, round_half_up,
};
pub use modes::{Axes, Edges, RealRounding};
pub use scale::Scale;
pub use viewport::{Viewport, ViewportDebugInfo};

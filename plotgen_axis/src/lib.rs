// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotgen Axis: tick placement and labels for plot axes.
//!
//! [`Axis::generate`] picks a major step of `1`, `2` or `5` times a power of
//! ten so that neighbouring major ticks are at least a requested number of
//! pixels apart, places major and minor ticks over a device range and formats
//! labels with [`format_g`] (C's `%.14g`). When absolute labels are off, the
//! step's power of ten is factored out into the axis caption (`*1e-3 s`).
//!
//! ## Example
//!
//! ```rust
//! use plotgen_axis::{Axis, AxisMapping, AxisStyle};
//!
//! // 10 device pixels per second, at least 30 pixels between labels.
//! let mapping = AxisMapping {
//!     factor: 10.0,
//!     offset: 0,
//!     collapsed_value: 0.0,
//!     show_zero: false,
//! };
//! let axis = Axis::generate(mapping, 0, 100, 30.0, &AxisStyle::default());
//! assert_eq!(axis.labels, ["0", "5", "10"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod format;
mod ticks;

pub use format::{LABEL_PRECISION, format_g};
pub use ticks::{Axis, AxisMapping, AxisStyle};

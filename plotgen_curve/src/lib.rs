// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotgen Curve: device-space curves and curve-set cropping.
//!
//! A [`Curve`] holds the integer device points of one plotted trace together
//! with its device bounding box. Dense data often quantizes many consecutive
//! samples onto the same pixel; [`Curve::simplify`] removes those runs in
//! place and remembers them as [`Elision`]s so that indices coming from the
//! data source can still be translated with [`Curve::simplified_index`].
//!
//! Curve sets are vectors of [`CurveRef`]: a shared curve, a point range and a
//! [`PenId`] style token. [`optimize`] reduces a curve set to what intersects
//! the buffer rect, cropping long curves with nondecreasing x by binary
//! search instead of a linear scan.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use plotgen_curve::{CoordinateLimit, Curve, CurveRef, PenId, optimize};
//! use plotgen_view::{DevicePoint, DeviceRect};
//!
//! let points = (0..10_000).map(|x| DevicePoint::new(x, 0)).collect();
//! let curve = Rc::new(Curve::from_points(points, true));
//! let set = [CurveRef::whole(curve, PenId(0))];
//!
//! let mut visible = Vec::new();
//! optimize(
//!     &set,
//!     &DeviceRect::new(100, 0, 200, 10),
//!     CoordinateLimit::Wide,
//!     &mut visible,
//! );
//! assert_eq!(visible[0].len(), 101);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod curve;
mod curve_ref;
mod error;
mod optimize;

pub use curve::{Curve, Elision};
pub use curve_ref::{CurveRef, PenId};
pub use error::AllocError;
pub use optimize::{CoordinateLimit, SIGNED16_REACH, crop_x_range, crop_x_range_linear, optimize};

// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotgen: turns stepped datasets into device-space curve sets and axes.
//!
//! Data reaches the engine through the [`DataSource`] trait. Each source is
//! wrapped in a [`DataSeriesGroup`] ("Real", "Imaginary", an integral over
//! all steps, ...) that caches per-step real bounding boxes and device
//! curves. A [`Graph`] owns the groups and a [`plotgen_view::Viewport`] and
//! produces, on demand:
//! - curve sets for all steps and for the selected step,
//! - the same sets cropped to the buffer rect,
//! - major and minor ticks for both axes.
//!
//! Caches are pull-based and invalidated through [`Graph::mark_old`],
//! [`Graph::change_proc_param`] and the view operations. Changes can be
//! batched with [`Graph::freeze`].
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use plotgen::{
//!     DataSeriesGroup, Graph, GraphConfig, GroupKind, GroupPens, LayoutHints, StepTraces,
//! };
//! use plotgen_view::DeviceSize;
//!
//! let steps = (0..3)
//!     .map(|s| (0..100).map(|i| Point::new(f64::from(i), f64::from(s * i))).collect())
//!     .collect();
//! let mut graph = Graph::new(GraphConfig::default());
//! graph.add_group(DataSeriesGroup::new(
//!     "Real",
//!     GroupKind::Numbered,
//!     Box::new(StepTraces::new(steps)),
//!     LayoutHints::NONDECREASING_X,
//!     GroupPens::default(),
//! ));
//! graph.set_scale(DeviceSize::new(400, 300));
//!
//! assert_eq!(graph.curve_set().len(), 3);
//! assert_eq!(graph.highlighted_curve_set().len(), 1);
//! assert!(!graph.x_axis(50.0).major.is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cache;
mod config;
mod freeze;
mod graph;
mod group;
mod series;
mod source;

pub use cache::Generation;
pub use config::GraphConfig;
pub use freeze::FreezeGuard;
pub use graph::{AutoZoom, Graph, GroupId, Repaint};
pub use group::{DataSeriesGroup, GroupKind, GroupPens, LayoutHints, ParamKind};
pub use series::{DataSeries, Stale};
pub use source::{DataSource, StepEvaluation, StepFlags, StepIndex, StepTraces};

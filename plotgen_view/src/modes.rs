// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;

bitflags! {
    /// Edges of the data bounds that the visible rect must stay within.
    ///
    /// Consulted by [`crate::Viewport::set_visible_real_rect`]. An edge that is
    /// not set may be scrolled or zoomed past freely.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        /// Smallest x.
        const LEFT = 1 << 0;
        /// Largest x.
        const RIGHT = 1 << 1;
        /// Largest y.
        const TOP = 1 << 2;
        /// Smallest y.
        const BOTTOM = 1 << 3;
    }
}

bitflags! {
    /// A set of plot axes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Axes: u8 {
        /// The horizontal (x) axis.
        const X = 1 << 0;
        /// The vertical (y) axis.
        const Y = 1 << 1;
    }
}

impl Axes {
    /// Builds a set from the usual `(horizontal, vertical)` argument pair.
    #[must_use]
    pub fn from_bools(horizontal: bool, vertical: bool) -> Self {
        let mut axes = Self::empty();
        axes.set(Self::X, horizontal);
        axes.set(Self::Y, vertical);
        axes
    }
}

/// Rounding applied by [`crate::Viewport::real_point_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RealRounding {
    /// `(device + offset) / factor`, unmodified. Use for deltas.
    #[default]
    Exact,
    /// Rounded to the decimal power at or below one device pixel, for
    /// on-screen cursor readouts.
    Coarse,
}

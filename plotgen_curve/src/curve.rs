// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use plotgen_view::{DevicePoint, DeviceRect};

use crate::AllocError;

/// A run of consecutive equal points removed by [`Curve::simplify`].
///
/// Both indices are in original (unsimplified) index space and inclusive.
/// `first` is the point that was kept; `first + 1 ..= last` were dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Elision {
    /// Original index of the kept representative.
    pub first: usize,
    /// Original index of the last duplicate.
    pub last: usize,
}

impl Elision {
    /// Number of points removed by this run.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.last - self.first
    }
}

/// A device-space polyline.
///
/// The point buffer is reused across refills; its capacity is the buffer
/// length, the number of stored points is at most that. After
/// [`Curve::simplify`] the stored points are compacted and [`Curve::elisions`]
/// records what was removed so indices from the data source can still be
/// translated with [`Curve::simplified_index`].
#[derive(Clone, Debug, Default)]
pub struct Curve {
    points: Vec<DevicePoint>,
    elisions: Vec<Elision>,
    original_len: usize,
    bbox: DeviceRect,
    nondecreasing_x: bool,
}

impl Curve {
    /// Creates an empty curve without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            elisions: Vec::new(),
            original_len: 0,
            bbox: DeviceRect::point(DevicePoint::ZERO),
            nondecreasing_x: false,
        }
    }

    /// Creates a curve from points, computing the bounding box by scanning them.
    #[must_use]
    pub fn from_points(points: Vec<DevicePoint>, nondecreasing_x: bool) -> Self {
        let bbox = DeviceRect::from_points(&points).unwrap_or_default();
        Self {
            original_len: points.len(),
            points,
            elisions: Vec::new(),
            bbox,
            nondecreasing_x,
        }
    }

    /// Refills the curve with `len` points produced by `fill`.
    ///
    /// The buffer only grows when its capacity is too small; growth failures
    /// are reported instead of aborting. Elisions from an earlier
    /// simplification are discarded.
    pub fn refill(
        &mut self,
        len: usize,
        bbox: DeviceRect,
        nondecreasing_x: bool,
        fill: impl FnOnce(&mut [DevicePoint]),
    ) -> Result<(), AllocError> {
        self.points.clear();
        self.elisions.clear();
        if self.points.capacity() < len {
            self.points
                .try_reserve_exact(len)
                .map_err(|_| AllocError { requested: len })?;
        }
        self.points.resize(len, DevicePoint::ZERO);
        fill(&mut self.points);
        self.original_len = len;
        self.bbox = bbox;
        self.nondecreasing_x = nondecreasing_x;
        Ok(())
    }

    /// Collapses runs of consecutive equal points in place.
    ///
    /// Returns `true` if anything was removed. The buffer capacity is
    /// unchanged. A curve that already carries elisions is left alone, and a
    /// curve without duplicates produces none, so simplifying twice is the
    /// same as simplifying once.
    pub fn simplify(&mut self) -> bool {
        let n = self.points.len();
        if n < 2 || !self.elisions.is_empty() {
            return false;
        }
        let mut kept = 0;
        let mut run_first = 0;
        for i in 1..n {
            let p = self.points[i];
            if p == self.points[kept] {
                continue;
            }
            if i - 1 > run_first {
                self.elisions.push(Elision {
                    first: run_first,
                    last: i - 1,
                });
            }
            kept += 1;
            self.points[kept] = p;
            run_first = i;
        }
        if n - 1 > run_first {
            self.elisions.push(Elision {
                first: run_first,
                last: n - 1,
            });
        }
        self.points.truncate(kept + 1);
        if !self.elisions.is_empty() {
            log::trace!(
                target: "plotgen",
                "simplified curve {} -> {} points ({} runs)",
                n,
                self.points.len(),
                self.elisions.len()
            );
        }
        !self.elisions.is_empty()
    }

    /// Translates an original index into an index of the compacted points.
    ///
    /// Indices inside an elided run map onto the run's kept point. Indices
    /// past the end clamp to the last point. `backwards` walks the elision
    /// list from the end, which is cheaper for indices near the tail; both
    /// directions give the same answer.
    #[must_use]
    pub fn simplified_index(&self, original: usize, backwards: bool) -> usize {
        if self.original_len == 0 {
            return 0;
        }
        let original = original.min(self.original_len - 1);
        if backwards {
            let mut from_end = self.original_len - 1 - original;
            for e in self.elisions.iter().rev() {
                if e.last < original {
                    break;
                }
                if e.first >= original {
                    from_end -= e.removed();
                } else {
                    from_end -= e.last - original;
                }
            }
            self.points.len() - 1 - from_end
        } else {
            let mut index = original;
            for e in &self.elisions {
                if e.first >= original {
                    break;
                }
                if e.last < original {
                    index -= e.removed();
                } else {
                    index -= original - e.first;
                }
            }
            index
        }
    }

    /// The stored (possibly compacted) points.
    #[must_use]
    pub fn points(&self) -> &[DevicePoint] {
        &self.points
    }

    /// Number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve stores no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point count before simplification.
    #[must_use]
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Allocated buffer length.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    /// Elided runs, in ascending order.
    #[must_use]
    pub fn elisions(&self) -> &[Elision] {
        &self.elisions
    }

    /// Device bounding box, ignoring line width.
    #[must_use]
    pub fn bbox(&self) -> DeviceRect {
        self.bbox
    }

    /// Whether x never decreases along the curve.
    #[must_use]
    pub fn nondecreasing_x(&self) -> bool {
        self.nondecreasing_x
    }
}

// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation-stamped cache entries.

/// A point on a monotonically increasing clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Clock handing out [`Generation`]s.
///
/// Every mutation path calls [`Clock::bump`] and records the result as the
/// "stale since" generation of what it invalidates. Values are stamped with
/// [`Clock::now`] when computed.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Clock {
    now: Generation,
}

impl Clock {
    pub(crate) fn now(&self) -> Generation {
        self.now
    }

    pub(crate) fn bump(&mut self) -> Generation {
        self.now.0 += 1;
        self.now
    }
}

/// A value plus the generation it was computed at.
///
/// An entry is fresh iff its stamp is at least its own "stale since"
/// generation and at least every outer floor passed to [`Cached::is_fresh`].
/// New entries start out stale.
#[derive(Clone, Debug)]
pub(crate) struct Cached<T> {
    value: T,
    stamp: Option<Generation>,
    stale_since: Generation,
}

impl<T> Cached<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value,
            stamp: None,
            stale_since: Generation::default(),
        }
    }

    pub(crate) fn is_fresh(&self, floor: Generation) -> bool {
        self.stamp
            .is_some_and(|s| s >= self.stale_since && s >= floor)
    }

    pub(crate) fn invalidate(&mut self, at: Generation) {
        self.stale_since = self.stale_since.max(at);
    }

    pub(crate) fn store(&mut self, value: T, at: Generation) {
        self.value = value;
        self.stamp = Some(at);
    }

    pub(crate) fn mark_fresh(&mut self, at: Generation) {
        self.stamp = Some(at);
    }

    pub(crate) fn value(&self) -> &T {
        &self.value
    }

    /// Access for in-place recomputation; follow with [`Cached::mark_fresh`].
    pub(crate) fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! IntervalSet: a canonical set of values stored as sorted, disjoint,
//! non-adjacent half-open intervals.
//!
//! Invariants (always held between public calls):
//!    - every stored interval is non-empty
//!    - intervals are sorted by ascending `start()`
//!    - for adjacent entries `a` then `b`, `a.end() < b.start()` (disjoint
//!      and not even touching)
//!
//! Together these make the representation canonical: two sets holding the
//! same values are elementwise equal. QUIC bookkeeping leans on that for
//! things like "which byte ranges have been received" and "which packet
//! numbers have been acked", where the set churns constantly and must stay
//! minimal.
//!
//! Complexity:
//!    - contains, find, lower_bound, upper_bound, is_disjoint: `O(log n)`
//!    - add: `O(log n + k)` for `k` absorbed neighbors
//!    - union/intersection/difference (set): `O(n + m)`
//!    - contains_set: `O(m log n)`

use quic_ranges_core::interval::Interval;
use std::fmt;
use std::mem;
use std::ops::{Deref, Range};

/// Read-only iterator over the intervals of a set, in ascending order.
///
/// Double-ended, so `.rev()` walks the set from the highest interval down,
/// which is the order ACK frames want their ranges in.
pub type Iter<'a, T> = std::slice::Iter<'a, Interval<T>>;

/// A set of values over an ordered domain, represented as the minimal
/// sequence of half-open `[start, end)` intervals.
///
/// Mutations keep the representation canonical: overlapping and touching
/// intervals are coalesced as they are added, so `{[1, 2)} + [2, 3)` is the
/// single interval `[1, 3)`. Empty intervals (including misordered ones)
/// are accepted by every operation and represent "no values": mutators
/// ignore them and queries answer accordingly.
///
/// Iteration borrows the set, so the borrow checker rules out reading
/// through an iterator across a mutation.
///
/// # Examples
///
/// ```
/// use quic_ranges_core::interval::Interval;
/// use quic_ranges_set::IntervalSet;
///
/// let mut received = IntervalSet::new();
/// received.add(Interval::new(10u64, 20u64));
/// received.add(Interval::new(30u64, 40u64));
/// received.add(Interval::new(15u64, 35u64));
/// assert_eq!(received.len(), 1);
/// assert!(received.contains_interval(Interval::new(10, 40)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalSet<T> {
    intervals: Vec<Interval<T>>,
}

impl<T> IntervalSet<T> {
    /// Creates a new, empty set. Does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Creates an empty set with room for at least `capacity` intervals.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            intervals: Vec::with_capacity(capacity),
        }
    }

    /// Creates a set holding the given interval, or an empty set if the
    /// interval is empty.
    #[inline]
    pub fn from_interval(interval: Interval<T>) -> Self
    where
        T: Ord + Copy,
    {
        let mut set = Self::new();
        set.add(interval);
        set
    }

    /// Creates a set holding the values of `start..end`.
    #[inline]
    pub fn from_range(range: Range<T>) -> Self
    where
        T: Ord + Copy,
    {
        Self::from_interval(range.into())
    }

    /// Creates a set from arbitrary intervals, sorting and coalescing them
    /// in place. Empty inputs are dropped.
    #[inline]
    pub fn from_vec(mut intervals: Vec<Interval<T>>) -> Self
    where
        T: Ord + Copy,
    {
        Self::coalesce_unsorted(&mut intervals);
        Self { intervals }
    }

    /// Returns the number of disjoint intervals in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Returns the stored intervals as a slice, sorted and disjoint.
    #[inline]
    pub fn as_slice(&self) -> &[Interval<T>] {
        &self.intervals
    }

    /// Removes all values. Keeps the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Iterates over the intervals in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.intervals.iter()
    }

    /// Returns the smallest interval covering every value in the set, or
    /// `None` if the set is empty.
    #[inline]
    pub fn spanning_interval(&self) -> Option<Interval<T>>
    where
        T: Copy,
    {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => Some(Interval::new(first.start(), last.end())),
            _ => None,
        }
    }

    /// Exchanges the contents of two sets in constant time.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.intervals, &mut other.intervals);
    }

    /// Replaces the contents of the set with the given intervals.
    #[inline]
    pub fn assign<I>(&mut self, intervals: I)
    where
        I: IntoIterator<Item = Interval<T>>,
        T: Ord + Copy,
    {
        self.clear();
        for interval in intervals {
            self.add(interval);
        }
    }

    /// Index of the first stored interval with `start > point`.
    ///
    /// Decrementing lands on the only interval that can contain `point`,
    /// which is what the membership probes are built on.
    #[inline]
    fn first_starting_after(&self, point: T) -> usize
    where
        T: Ord + Copy,
    {
        self.intervals
            .partition_point(|interval| interval.start() <= point)
    }

    /// Index of the first stored interval with `start >= point`.
    #[inline]
    fn first_starting_at_or_after(&self, point: T) -> usize
    where
        T: Ord + Copy,
    {
        self.intervals
            .partition_point(|interval| interval.start() < point)
    }

    /// Index of the first stored interval with `end > point`, skipping every
    /// interval that lies entirely at or before `point`.
    #[inline]
    fn first_ending_after(&self, point: T) -> usize
    where
        T: Ord + Copy,
    {
        self.intervals
            .partition_point(|interval| interval.end() <= point)
    }

    /// Adds every value of `interval` to the set.
    ///
    /// Overlapping and touching neighbors are absorbed so the result stays
    /// canonical. Adding an empty interval has no effect.
    pub fn add(&mut self, interval: Interval<T>)
    where
        T: Ord + Copy,
    {
        if interval.is_empty() {
            return;
        }

        let mut index = self.first_starting_at_or_after(interval.start());
        let mut merged = interval;

        // Absorb the left neighbor when it reaches or touches the new
        // interval. Its start is strictly smaller by construction.
        if index > 0 && self.intervals[index - 1].end() >= merged.start() {
            index -= 1;
            let left = self.intervals[index];
            merged.set_start(left.start());
            if left.end() > merged.end() {
                merged.set_end(left.end());
            }
        }

        // Absorb everything to the right that the merged extent reaches.
        let mut scan = index;
        while scan < self.intervals.len() && self.intervals[scan].start() <= merged.end() {
            if self.intervals[scan].end() > merged.end() {
                merged.set_end(self.intervals[scan].end());
            }
            scan += 1;
        }

        self.intervals.splice(index..scan, std::iter::once(merged));
        debug_assert!(self.valid());
    }

    /// Adds every value of `start..end` to the set.
    #[inline]
    pub fn add_range(&mut self, range: Range<T>)
    where
        T: Ord + Copy,
    {
        self.add(range.into());
    }

    /// Same result as [`add`](Self::add), optimized for intervals that
    /// extend the current rightmost interval.
    ///
    /// When the new interval starts inside or exactly at the end of the last
    /// stored interval, its end is extended in place without any search or
    /// shifting. Anything else falls back to `add`.
    pub fn append(&mut self, interval: Interval<T>)
    where
        T: Ord + Copy,
    {
        if interval.is_empty() {
            return;
        }
        match self.intervals.last_mut() {
            // Extending the tail keeps the ordering intact: the start is
            // unchanged and there is no successor to collide with.
            Some(last) if interval.start() >= last.start() && interval.start() <= last.end() => {
                if interval.end() > last.end() {
                    last.set_end(interval.end());
                }
            }
            _ => self.add(interval),
        }
        debug_assert!(self.valid());
    }

    /// Adds every value of `other` to the set.
    pub fn union(&mut self, other: &Self)
    where
        T: Ord + Copy,
    {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.intervals.extend_from_slice(other.as_slice());
            return;
        }

        let mine = mem::take(&mut self.intervals);
        let theirs = other.as_slice();
        self.intervals.reserve(mine.len() + theirs.len());

        // Merge the two sorted runs, coalescing at the output tail.
        let (mut i, mut j) = (0, 0);
        while i < mine.len() && j < theirs.len() {
            let next = if mine[i].start() <= theirs[j].start() {
                let interval = mine[i];
                i += 1;
                interval
            } else {
                let interval = theirs[j];
                j += 1;
                interval
            };
            Self::push_coalesced(&mut self.intervals, next);
        }
        for &interval in &mine[i..] {
            Self::push_coalesced(&mut self.intervals, interval);
        }
        for &interval in &theirs[j..] {
            Self::push_coalesced(&mut self.intervals, interval);
        }
        debug_assert!(self.valid());
    }

    /// Keeps only the values present in both `self` and `other`.
    pub fn intersection(&mut self, other: &Self)
    where
        T: Ord + Copy,
    {
        match (self.spanning_interval(), other.spanning_interval()) {
            (Some(mine), Some(theirs)) if mine.intersects(&theirs) => {}
            _ => {
                self.clear();
                return;
            }
        }

        let mine = mem::take(&mut self.intervals);
        let theirs = other.as_slice();
        let mut out = Vec::with_capacity(mine.len().min(theirs.len()));

        // Walk both runs, emitting each pairwise overlap and advancing the
        // side that ends first. Overlaps of canonical inputs come out
        // sorted, disjoint, and non-adjacent.
        let (mut i, mut j) = (0, 0);
        while i < mine.len() && j < theirs.len() {
            if let Some(overlap) = mine[i].intersection(&theirs[j]) {
                out.push(overlap);
            }
            if mine[i].end() < theirs[j].end() {
                i += 1;
            } else {
                j += 1;
            }
        }

        self.intervals = out;
        debug_assert!(self.valid());
    }

    /// Removes every value of `other` from the set.
    pub fn difference(&mut self, other: &Self)
    where
        T: Ord + Copy,
    {
        match (self.spanning_interval(), other.spanning_interval()) {
            (Some(mine), Some(theirs)) if mine.intersects(&theirs) => {}
            _ => return,
        }

        let mine = mem::take(&mut self.intervals);
        let subtrahends = other.as_slice();
        let mut out = Vec::with_capacity(mine.len() + 1);
        let mut j = 0;

        for &interval in &mine {
            let mut remainder = interval;

            // Skip subtrahends that end at or before the remainder.
            while j < subtrahends.len() && subtrahends[j].end() <= remainder.start() {
                j += 1;
            }

            let mut k = j;
            let mut consumed = false;
            while k < subtrahends.len() && subtrahends[k].start() < remainder.end() {
                let sub = subtrahends[k];
                if sub.start() > remainder.start() {
                    out.push(Interval::new(remainder.start(), sub.start()));
                }
                if sub.end() >= remainder.end() {
                    consumed = true;
                    break;
                }
                remainder.set_start(sub.end());
                k += 1;
            }
            if !consumed {
                out.push(remainder);
            }
            // A subtrahend that consumed this interval may reach the next
            // one too, so do not step past it.
            j = k;
        }

        self.intervals = out;
        debug_assert!(self.valid());
    }

    /// Removes every value of `interval` from the set.
    pub fn difference_interval(&mut self, interval: Interval<T>)
    where
        T: Ord + Copy,
    {
        if interval.is_empty() {
            return;
        }
        let lo = self.first_ending_after(interval.start());
        let hi = self.first_starting_at_or_after(interval.end());
        if lo >= hi {
            return;
        }

        // The affected run is intervals[lo..hi]. At most two residuals
        // survive: the head of the first and the tail of the last.
        let first = self.intervals[lo];
        let last = self.intervals[hi - 1];
        let mut residuals = Vec::with_capacity(2);
        if first.start() < interval.start() {
            residuals.push(Interval::new(first.start(), interval.start()));
        }
        if interval.end() < last.end() {
            residuals.push(Interval::new(interval.end(), last.end()));
        }
        self.intervals.splice(lo..hi, residuals);
        debug_assert!(self.valid());
    }

    /// Removes every value of `start..end` from the set.
    #[inline]
    pub fn difference_range(&mut self, range: Range<T>)
    where
        T: Ord + Copy,
    {
        self.difference_interval(range.into());
    }

    /// Replaces the set with the values of `bounds` that are not currently
    /// in the set.
    ///
    /// Built as `bounds` minus `self`, handed over with a constant-time
    /// storage swap.
    pub fn complement(&mut self, bounds: Interval<T>)
    where
        T: Ord + Copy,
    {
        let mut span = Self::from_interval(bounds);
        span.difference(self);
        self.swap(&mut span);
        debug_assert!(self.valid());
    }

    /// Returns `true` if some interval in the set contains `value`.
    #[inline]
    pub fn contains(&self, value: T) -> bool
    where
        T: Ord + Copy,
    {
        let index = self.first_starting_after(value);
        index > 0 && self.intervals[index - 1].contains(value)
    }

    /// Returns `true` if some single interval in the set wholly contains
    /// `interval`.
    ///
    /// Returns `false` for an empty argument, the convention inherited from
    /// [`Interval::contains_interval`]. A straddling query such as
    /// `[15, 35)` against `{[10, 20) [30, 40)}` is `false` as well: no one
    /// stored interval covers it.
    #[inline]
    pub fn contains_interval(&self, interval: Interval<T>) -> bool
    where
        T: Ord + Copy,
    {
        let index = self.first_starting_after(interval.start());
        index > 0 && self.intervals[index - 1].contains_interval(&interval)
    }

    /// Returns `true` if some single interval in the set wholly contains
    /// `start..end`.
    #[inline]
    pub fn contains_range(&self, range: Range<T>) -> bool
    where
        T: Ord + Copy,
    {
        self.contains_interval(range.into())
    }

    /// Returns `true` if every interval of `other` is wholly contained in
    /// some interval of this set.
    ///
    /// Returns `false` when `other` is empty, consistent with
    /// [`contains_interval`](Self::contains_interval).
    pub fn contains_set(&self, other: &Self) -> bool
    where
        T: Ord + Copy,
    {
        let (Some(mine), Some(theirs)) = (self.spanning_interval(), other.spanning_interval())
        else {
            return false;
        };
        if !mine.contains_interval(&theirs) {
            return false;
        }
        other.iter().all(|interval| self.contains_interval(*interval))
    }

    /// Returns `true` if this set and `other` share at least one value.
    pub fn intersects(&self, other: &Self) -> bool
    where
        T: Ord + Copy,
    {
        match (self.spanning_interval(), other.spanning_interval()) {
            (Some(mine), Some(theirs)) if mine.intersects(&theirs) => {}
            _ => return false,
        }

        let mine = self.as_slice();
        let theirs = other.as_slice();
        let (mut i, mut j) = (0, 0);
        while i < mine.len() && j < theirs.len() {
            if mine[i].intersects(&theirs[j]) {
                return true;
            }
            if mine[i].end() <= theirs[j].start() {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    /// Returns `true` if no value of `interval` is in the set.
    ///
    /// Empty intervals are disjoint from everything, even though the set
    /// does not contain them.
    pub fn is_disjoint(&self, interval: Interval<T>) -> bool
    where
        T: Ord + Copy,
    {
        if interval.is_empty() {
            return true;
        }
        let index = self.first_starting_after(interval.start());
        if index < self.intervals.len() && interval.end() > self.intervals[index].start() {
            return false;
        }
        index == 0 || self.intervals[index - 1].end() <= interval.start()
    }

    /// Returns the interval containing `value`, if any.
    #[inline]
    pub fn find(&self, value: T) -> Option<&Interval<T>>
    where
        T: Ord + Copy,
    {
        let index = self.first_starting_after(value);
        if index == 0 {
            return None;
        }
        let candidate = &self.intervals[index - 1];
        candidate.contains(value).then_some(candidate)
    }

    /// Returns the interval wholly containing `interval`, if any. An empty
    /// argument finds nothing.
    #[inline]
    pub fn find_interval(&self, interval: Interval<T>) -> Option<&Interval<T>>
    where
        T: Ord + Copy,
    {
        let index = self.first_starting_after(interval.start());
        if index == 0 {
            return None;
        }
        let candidate = &self.intervals[index - 1];
        candidate.contains_interval(&interval).then_some(candidate)
    }

    /// Returns the interval wholly containing `start..end`, if any.
    #[inline]
    pub fn find_range(&self, range: Range<T>) -> Option<&Interval<T>>
    where
        T: Ord + Copy,
    {
        self.find_interval(range.into())
    }

    /// Iterator positioned at the first interval that contains `value` or
    /// lies entirely after it.
    ///
    /// ```text
    ///   [10, 20)  [30, 40)
    ///   ^                    lower_bound(10), lower_bound(15)
    ///             ^          lower_bound(20), lower_bound(25)
    /// ```
    pub fn lower_bound(&self, value: T) -> Iter<'_, T>
    where
        T: Ord + Copy,
    {
        let mut index = self.first_starting_at_or_after(value);
        // The search keyed on starts alone, so the interval just before the
        // partition may still contain the value.
        if index > 0 && self.intervals[index - 1].contains(value) {
            index -= 1;
        }
        self.intervals[index..].iter()
    }

    /// Iterator positioned at the first interval that lies entirely after
    /// `value`.
    ///
    /// ```text
    ///   [10, 20)  [30, 40)
    ///             ^          upper_bound(10), upper_bound(25)
    /// ```
    pub fn upper_bound(&self, value: T) -> Iter<'_, T>
    where
        T: Ord + Copy,
    {
        self.intervals[self.first_starting_after(value)..].iter()
    }

    /// Sorts, dedups, and coalesces an arbitrary pile of intervals into
    /// canonical form. Empty inputs are dropped.
    fn coalesce_unsorted(intervals: &mut Vec<Interval<T>>)
    where
        T: Ord + Copy,
    {
        intervals.retain(|interval| !interval.is_empty());
        if intervals.len() < 2 {
            return;
        }
        intervals.sort_unstable_by_key(|interval| interval.start());

        let mut write = 0;
        for read in 1..intervals.len() {
            if intervals[write].end() >= intervals[read].start() {
                if intervals[read].end() > intervals[write].end() {
                    let end = intervals[read].end();
                    intervals[write].set_end(end);
                }
            } else {
                write += 1;
                intervals[write] = intervals[read];
            }
        }
        intervals.truncate(write + 1);
    }

    /// Appends to a sorted coalesced output, merging into the tail when the
    /// next interval overlaps or touches it. The next interval must not
    /// start before the tail does.
    #[inline]
    fn push_coalesced(out: &mut Vec<Interval<T>>, next: Interval<T>)
    where
        T: Ord + Copy,
    {
        if let Some(last) = out.last_mut() {
            if last.end() >= next.start() {
                if next.end() > last.end() {
                    last.set_end(next.end());
                }
                return;
            }
        }
        out.push(next);
    }

    /// Integrity predicate behind the `debug_assert!` at the end of each
    /// mutator: non-empty entries, strictly ordered, with a gap between
    /// every neighboring pair.
    fn valid(&self) -> bool
    where
        T: Ord + Copy,
    {
        self.intervals.iter().all(|interval| !interval.is_empty())
            && self
                .intervals
                .windows(2)
                .all(|pair| pair[0].end() < pair[1].start())
    }
}

impl<T: fmt::Display> fmt::Display for IntervalSet<T> {
    /// Formats the set as `{ [a1, b1) [a2, b2) }`. Intended for humans and
    /// logs; not a stable wire format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for interval in &self.intervals {
            write!(f, " {}", interval)?;
        }
        write!(f, " }}")
    }
}

impl<T: Ord + Copy> From<Interval<T>> for IntervalSet<T> {
    #[inline]
    fn from(interval: Interval<T>) -> Self {
        Self::from_interval(interval)
    }
}

impl<T: Ord + Copy> From<Vec<Interval<T>>> for IntervalSet<T> {
    #[inline]
    fn from(intervals: Vec<Interval<T>>) -> Self {
        Self::from_vec(intervals)
    }
}

impl<T: Ord + Copy> FromIterator<Interval<T>> for IntervalSet<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Ord + Copy> Extend<Interval<T>> for IntervalSet<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = Interval<T>>>(&mut self, iter: I) {
        for interval in iter {
            self.add(interval);
        }
    }
}

impl<T> Deref for IntervalSet<T> {
    type Target = [Interval<T>];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.intervals
    }
}

impl<'a, T> IntoIterator for &'a IntervalSet<T> {
    type Item = &'a Interval<T>;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

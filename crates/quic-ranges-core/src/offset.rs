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

//! Typed units for stream byte bookkeeping.
//!
//! `StreamOffset` is an absolute byte position within a stream and
//! `ByteCount` is a distance between two such positions. Keeping the two
//! apart at the type level rules out the classic bookkeeping slips: adding
//! two offsets, or treating a length as a position. Offsets are totally
//! ordered and copyable, which is all the interval set requires of its
//! element type; subtraction between offsets yields a `ByteCount` for
//! callers that measure spans.

use crate::interval::Interval;
use num_traits::{CheckedAdd, CheckedSub, SaturatingAdd, SaturatingSub, Zero};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// An absolute byte offset within a stream.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct StreamOffset(u64);

/// A half-open range of stream bytes.
pub type OffsetInterval = Interval<StreamOffset>;

impl std::fmt::Display for StreamOffset {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StreamOffset({})", self.0)
    }
}

impl From<u64> for StreamOffset {
    #[inline]
    fn from(v: u64) -> Self {
        StreamOffset(v)
    }
}

impl StreamOffset {
    #[inline]
    pub const fn new(v: u64) -> Self {
        StreamOffset(v)
    }

    #[inline]
    pub const fn zero() -> Self {
        StreamOffset(0)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn checked_add(self, len: ByteCount) -> Option<Self> {
        self.0.checked_add(len.0).map(StreamOffset)
    }

    #[inline]
    pub fn checked_sub(self, len: ByteCount) -> Option<Self> {
        self.0.checked_sub(len.0).map(StreamOffset)
    }

    #[inline]
    pub fn saturating_add(self, len: ByteCount) -> Self {
        StreamOffset(self.0.saturating_add(len.0))
    }

    #[inline]
    pub fn saturating_sub(self, len: ByteCount) -> Self {
        StreamOffset(self.0.saturating_sub(len.0))
    }

    /// Returns `[self, self + len)`, or `None` on overflow.
    #[inline]
    pub fn span_of(self, len: ByteCount) -> Option<OffsetInterval> {
        self.checked_add(len)
            .map(|end| OffsetInterval::new(self, end))
    }
}

impl Add<ByteCount> for StreamOffset {
    type Output = StreamOffset;

    #[inline]
    fn add(self, rhs: ByteCount) -> Self::Output {
        StreamOffset(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in StreamOffset + ByteCount"),
        )
    }
}

impl Add<StreamOffset> for ByteCount {
    type Output = StreamOffset;

    #[inline]
    fn add(self, rhs: StreamOffset) -> Self::Output {
        rhs + self
    }
}

impl Sub<ByteCount> for StreamOffset {
    type Output = StreamOffset;

    #[inline]
    fn sub(self, rhs: ByteCount) -> Self::Output {
        StreamOffset(
            self.0
                .checked_sub(rhs.0)
                .expect("underflow in StreamOffset - ByteCount"),
        )
    }
}

impl Sub<StreamOffset> for StreamOffset {
    type Output = ByteCount;

    #[inline]
    fn sub(self, rhs: StreamOffset) -> Self::Output {
        ByteCount::new(self.value().abs_diff(rhs.value()))
    }
}

impl AddAssign<ByteCount> for StreamOffset {
    #[inline]
    fn add_assign(&mut self, rhs: ByteCount) {
        self.0 = self
            .0
            .checked_add(rhs.0)
            .expect("overflow in StreamOffset += ByteCount");
    }
}

impl SubAssign<ByteCount> for StreamOffset {
    #[inline]
    fn sub_assign(&mut self, rhs: ByteCount) {
        self.0 = self
            .0
            .checked_sub(rhs.0)
            .expect("underflow in StreamOffset -= ByteCount");
    }
}

/// A count of stream bytes, the distance between two offsets.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct ByteCount(u64);

impl std::fmt::Display for ByteCount {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ByteCount({})", self.0)
    }
}

impl From<u64> for ByteCount {
    #[inline]
    fn from(v: u64) -> Self {
        ByteCount(v)
    }
}

impl ByteCount {
    #[inline]
    pub const fn new(v: u64) -> Self {
        ByteCount(v)
    }

    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(ByteCount)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(ByteCount)
    }

    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        ByteCount(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        ByteCount(self.0.saturating_sub(rhs.0))
    }
}

impl Zero for ByteCount {
    #[inline]
    fn zero() -> Self {
        ByteCount::new(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for ByteCount {
    type Output = ByteCount;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        ByteCount(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in ByteCount + ByteCount"),
        )
    }
}

impl CheckedAdd for ByteCount {
    #[inline]
    fn checked_add(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(ByteCount)
    }
}

impl SaturatingAdd for ByteCount {
    #[inline]
    fn saturating_add(&self, rhs: &Self) -> Self {
        ByteCount(self.0.saturating_add(rhs.0))
    }
}

impl Sub for ByteCount {
    type Output = ByteCount;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        ByteCount(
            self.0
                .checked_sub(rhs.0)
                .expect("underflow in ByteCount - ByteCount"),
        )
    }
}

impl CheckedSub for ByteCount {
    #[inline]
    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(ByteCount)
    }
}

impl SaturatingSub for ByteCount {
    #[inline]
    fn saturating_sub(&self, rhs: &Self) -> Self {
        ByteCount(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for ByteCount {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self
            .0
            .checked_add(rhs.0)
            .expect("overflow in ByteCount += ByteCount");
    }
}

impl SubAssign for ByteCount {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self
            .0
            .checked_sub(rhs.0)
            .expect("underflow in ByteCount -= ByteCount");
    }
}

impl Sum for ByteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a ByteCount> for ByteCount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + *x)
    }
}

impl Interval<StreamOffset> {
    /// Returns the number of bytes this interval spans.
    #[inline]
    pub fn byte_count(&self) -> ByteCount {
        if self.is_empty() {
            ByteCount::zero()
        } else {
            self.end() - self.start()
        }
    }
}

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

//! Typed units for packet-number bookkeeping.
//!
//! `PacketNumber` is a position in the packet-number space and
//! `PacketCount` a distance within it. Packet numbers on the wire are
//! monotonically increasing u64 values, so like stream offsets they get
//! concrete newtypes rather than a generic parameter. Note the interval
//! set only needs ordering and copying from these types; the arithmetic
//! here serves callers that size gaps and ack blocks.

use crate::interval::Interval;
use num_traits::{CheckedAdd, CheckedSub, SaturatingAdd, SaturatingSub, Zero};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A packet number.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct PacketNumber(u64);

/// A half-open range of packet numbers.
pub type PacketInterval = Interval<PacketNumber>;

impl std::fmt::Display for PacketNumber {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PacketNumber({})", self.0)
    }
}

impl From<u64> for PacketNumber {
    #[inline]
    fn from(v: u64) -> Self {
        PacketNumber(v)
    }
}

impl PacketNumber {
    #[inline]
    pub const fn new(v: u64) -> Self {
        PacketNumber(v)
    }

    #[inline]
    pub const fn zero() -> Self {
        PacketNumber(0)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the next packet number, or `None` at the end of the space.
    #[inline]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(PacketNumber)
    }

    #[inline]
    pub fn checked_add(self, count: PacketCount) -> Option<Self> {
        self.0.checked_add(count.0).map(PacketNumber)
    }

    #[inline]
    pub fn checked_sub(self, count: PacketCount) -> Option<Self> {
        self.0.checked_sub(count.0).map(PacketNumber)
    }

    #[inline]
    pub fn saturating_add(self, count: PacketCount) -> Self {
        PacketNumber(self.0.saturating_add(count.0))
    }

    #[inline]
    pub fn saturating_sub(self, count: PacketCount) -> Self {
        PacketNumber(self.0.saturating_sub(count.0))
    }
}

impl Add<PacketCount> for PacketNumber {
    type Output = PacketNumber;

    #[inline]
    fn add(self, rhs: PacketCount) -> Self::Output {
        PacketNumber(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in PacketNumber + PacketCount"),
        )
    }
}

impl Sub<PacketCount> for PacketNumber {
    type Output = PacketNumber;

    #[inline]
    fn sub(self, rhs: PacketCount) -> Self::Output {
        PacketNumber(
            self.0
                .checked_sub(rhs.0)
                .expect("underflow in PacketNumber - PacketCount"),
        )
    }
}

impl Sub<PacketNumber> for PacketNumber {
    type Output = PacketCount;

    #[inline]
    fn sub(self, rhs: PacketNumber) -> Self::Output {
        PacketCount::new(self.value().abs_diff(rhs.value()))
    }
}

impl AddAssign<PacketCount> for PacketNumber {
    #[inline]
    fn add_assign(&mut self, rhs: PacketCount) {
        self.0 = self
            .0
            .checked_add(rhs.0)
            .expect("overflow in PacketNumber += PacketCount");
    }
}

impl SubAssign<PacketCount> for PacketNumber {
    #[inline]
    fn sub_assign(&mut self, rhs: PacketCount) {
        self.0 = self
            .0
            .checked_sub(rhs.0)
            .expect("underflow in PacketNumber -= PacketCount");
    }
}

/// A count of packet numbers, the distance between two of them.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct PacketCount(u64);

impl std::fmt::Display for PacketCount {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PacketCount({})", self.0)
    }
}

impl From<u64> for PacketCount {
    #[inline]
    fn from(v: u64) -> Self {
        PacketCount(v)
    }
}

impl PacketCount {
    #[inline]
    pub const fn new(v: u64) -> Self {
        PacketCount(v)
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
        self.0.checked_add(rhs.0).map(PacketCount)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(PacketCount)
    }

    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        PacketCount(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        PacketCount(self.0.saturating_sub(rhs.0))
    }
}

impl Zero for PacketCount {
    #[inline]
    fn zero() -> Self {
        PacketCount::new(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for PacketCount {
    type Output = PacketCount;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        PacketCount(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in PacketCount + PacketCount"),
        )
    }
}

impl CheckedAdd for PacketCount {
    #[inline]
    fn checked_add(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(PacketCount)
    }
}

impl SaturatingAdd for PacketCount {
    #[inline]
    fn saturating_add(&self, rhs: &Self) -> Self {
        PacketCount(self.0.saturating_add(rhs.0))
    }
}

impl Sub for PacketCount {
    type Output = PacketCount;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        PacketCount(
            self.0
                .checked_sub(rhs.0)
                .expect("underflow in PacketCount - PacketCount"),
        )
    }
}

impl CheckedSub for PacketCount {
    #[inline]
    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(PacketCount)
    }
}

impl SaturatingSub for PacketCount {
    #[inline]
    fn saturating_sub(&self, rhs: &Self) -> Self {
        PacketCount(self.0.saturating_sub(rhs.0))
    }
}

impl Interval<PacketNumber> {
    /// Returns the number of packet numbers this interval spans.
    #[inline]
    pub fn packet_count(&self) -> PacketCount {
        if self.is_empty() {
            PacketCount::zero()
        } else {
            self.end() - self.start()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_number_creation_and_next() {
        let pn = PacketNumber::new(7);
        assert_eq!(pn.value(), 7);
        assert_eq!(pn.next(), Some(PacketNumber::new(8)));
        assert_eq!(PacketNumber::new(u64::MAX).next(), None);
    }

    #[test]
    fn packet_number_display() {
        assert_eq!(format!("{}", PacketNumber::new(3)), "PacketNumber(3)");
        assert_eq!(format!("{}", PacketCount::new(3)), "PacketCount(3)");
    }

    #[test]
    fn packet_number_minus_packet_number_is_count() {
        let a = PacketNumber::new(30);
        let b = PacketNumber::new(12);
        assert_eq!(a - b, PacketCount::new(18));
        assert_eq!(b - a, PacketCount::new(18));
    }

    #[test]
    fn packet_number_checked_arithmetic_at_bounds() {
        assert_eq!(
            PacketNumber::new(u64::MAX).checked_add(PacketCount::new(1)),
            None
        );
        assert_eq!(PacketNumber::zero().checked_sub(PacketCount::new(1)), None);
        assert_eq!(
            PacketNumber::zero().saturating_sub(PacketCount::new(4)),
            PacketNumber::zero()
        );
    }

    #[test]
    #[should_panic(expected = "underflow in PacketNumber - PacketCount")]
    fn packet_number_minus_count_panics_on_underflow() {
        let _ = PacketNumber::new(0) - PacketCount::new(1);
    }

    #[test]
    fn packet_count_of_interval() {
        let iv = PacketInterval::new(PacketNumber::new(5), PacketNumber::new(9));
        assert_eq!(iv.packet_count(), PacketCount::new(4));
        let empty = PacketInterval::new(PacketNumber::new(9), PacketNumber::new(5));
        assert_eq!(empty.packet_count(), PacketCount::zero());
    }
}

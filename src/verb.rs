// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `pathref`.
//
// `pathref` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `pathref` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `pathref`. If not, see <https://www.gnu.org/licenses/>.

//! Small value types that describe path contents.

use super::PathError;

use bytemuck::NoUninit;

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A path construction command.
///
/// Each verb consumes a fixed number of points from the point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum Verb {
    /// Begin a new contour at one point.
    Move = 0,

    /// A straight line to one point.
    Line = 1,

    /// A quadratic Bézier curve through one control point to an end point.
    Quad = 2,

    /// A rational quadratic curve, with one control point, an end point and a weight.
    Conic = 3,

    /// A cubic Bézier curve through two control points to an end point.
    Cubic = 4,

    /// Close the current contour.
    Close = 5,
}

impl Verb {
    /// The number of points this verb appends to the point sequence.
    #[inline]
    pub const fn point_count(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quad | Verb::Conic => 2,
            Verb::Cubic => 3,
            Verb::Close => 0,
        }
    }

    /// The segment mask bit for this verb, if it draws a segment.
    pub(crate) const fn segment_bit(self) -> SegmentMask {
        match self {
            Verb::Line => SegmentMask::LINE,
            Verb::Quad => SegmentMask::QUAD,
            Verb::Conic => SegmentMask::CONIC,
            Verb::Cubic => SegmentMask::CUBIC,
            Verb::Move | Verb::Close => SegmentMask::EMPTY,
        }
    }
}

impl TryFrom<u8> for Verb {
    type Error = PathError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => Verb::Move,
            1 => Verb::Line,
            2 => Verb::Quad,
            3 => Verb::Conic,
            4 => Verb::Cubic,
            5 => Verb::Close,
            tag => return Err(PathError::InvalidVerbTag(tag)),
        })
    }
}

/// The set of segment kinds that appear in a path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentMask(u8);

impl SegmentMask {
    /// No segments at all.
    pub const EMPTY: SegmentMask = SegmentMask(0);

    /// At least one line.
    pub const LINE: SegmentMask = SegmentMask(1 << 0);

    /// At least one quadratic curve.
    pub const QUAD: SegmentMask = SegmentMask(1 << 1);

    /// At least one conic.
    pub const CONIC: SegmentMask = SegmentMask(1 << 2);

    /// At least one cubic curve.
    pub const CUBIC: SegmentMask = SegmentMask(1 << 3);

    /// Whether every segment kind in `other` is also in this mask.
    #[inline]
    pub const fn contains(self, other: SegmentMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the mask is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the path contains any curved segment.
    #[inline]
    pub const fn has_curves(self) -> bool {
        self.0 & (Self::QUAD.0 | Self::CONIC.0 | Self::CUBIC.0) != 0
    }

    /// The raw bits of the mask.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for SegmentMask {
    type Output = SegmentMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        SegmentMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for SegmentMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SegmentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (SegmentMask::LINE, "LINE"),
            (SegmentMask::QUAD, "QUAD"),
            (SegmentMask::CONIC, "CONIC"),
            (SegmentMask::CUBIC, "CUBIC"),
        ];

        let mut set = f.debug_set();
        for (bit, name) in names {
            if self.contains(bit) {
                set.entry(&format_args!("{}", name));
            }
        }
        set.finish()
    }
}

/// The rule used to decide which points are inside of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FillType {
    /// Inside if the winding number is non-zero.
    #[default]
    Winding = 0,

    /// Inside if the winding number is odd.
    EvenOdd = 1,

    /// Inside if the winding number is zero.
    InverseWinding = 2,

    /// Inside if the winding number is even.
    InverseEvenOdd = 3,
}

impl FillType {
    /// Whether this fill type paints the outside of the path.
    #[inline]
    pub const fn is_inverse(self) -> bool {
        matches!(self, FillType::InverseWinding | FillType::InverseEvenOdd)
    }

    /// Whether this fill type uses the even-odd rule.
    #[inline]
    pub const fn is_even_odd(self) -> bool {
        matches!(self, FillType::EvenOdd | FillType::InverseEvenOdd)
    }

    /// Flip between the inverse and regular form of this fill type.
    #[inline]
    pub const fn toggle_inverse(self) -> FillType {
        match self {
            FillType::Winding => FillType::InverseWinding,
            FillType::EvenOdd => FillType::InverseEvenOdd,
            FillType::InverseWinding => FillType::Winding,
            FillType::InverseEvenOdd => FillType::EvenOdd,
        }
    }

    /// The non-inverse form of this fill type.
    #[inline]
    pub const fn base(self) -> FillType {
        if self.is_inverse() {
            self.toggle_inverse()
        } else {
            self
        }
    }
}

/// The direction in which a closed contour winds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathDirection {
    /// Clockwise, in a y-down coordinate space.
    #[default]
    Cw,

    /// Counter-clockwise, in a y-down coordinate space.
    Ccw,
}

impl PathDirection {
    /// The other direction.
    #[inline]
    pub const fn reversed(self) -> PathDirection {
        match self {
            PathDirection::Cw => PathDirection::Ccw,
            PathDirection::Ccw => PathDirection::Cw,
        }
    }
}

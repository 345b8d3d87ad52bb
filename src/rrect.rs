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

//! Rounded rectangles with independent elliptical corners.

use kurbo::{Rect, RoundedRect, Vec2};

/// One of the four corners of a rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    /// The top-left corner.
    UpperLeft = 0,

    /// The top-right corner.
    UpperRight = 1,

    /// The bottom-right corner.
    LowerRight = 2,

    /// The bottom-left corner.
    LowerLeft = 3,
}

/// The simplest description that fits a rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RRectKind {
    /// The rectangle has zero width or height.
    Empty,

    /// Every radius is zero.
    Rect,

    /// The corners meet in the middle of each side; this is an ellipse.
    Oval,

    /// Every corner has the same radii.
    Simple,

    /// Anything else.
    Complex,
}

/// A rectangle with an elliptical radius at each corner.
///
/// The radii are always normalized: they are finite, non-negative, and no two adjacent
/// radii add up to more than the side they share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RRect {
    /// The sorted bounding rectangle.
    rect: Rect,

    /// The x and y radius of each corner, indexed by [`Corner`].
    radii: [Vec2; 4],
}

impl Default for RRect {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            radii: [Vec2::ZERO; 4],
        }
    }
}

impl RRect {
    /// A rounded rectangle without any rounding.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect, [Vec2::ZERO; 4])
    }

    /// An ellipse inscribed in `rect`.
    pub fn from_oval(rect: Rect) -> Self {
        let rect = rect.abs();
        let radius = Vec2::new(rect.width() / 2.0, rect.height() / 2.0);
        Self::new(rect, [radius; 4])
    }

    /// A rounded rectangle where every corner has the same radii.
    pub fn from_rect_xy(rect: Rect, rx: f64, ry: f64) -> Self {
        Self::new(rect, [Vec2::new(rx, ry); 4])
    }

    /// A rounded rectangle with the radii in [`Corner`] order.
    pub fn new(rect: Rect, radii: [Vec2; 4]) -> Self {
        let rect = rect.abs();
        if !is_finite_rect(rect) {
            return Self::default();
        }

        let mut radii = radii.map(|radius| {
            let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
            let (x, y) = (clean(radius.x), clean(radius.y));
            if x == 0.0 || y == 0.0 {
                Vec2::ZERO
            } else {
                Vec2::new(x, y)
            }
        });

        // Shrink every radius by the same factor until each side can hold its two corners.
        let (width, height) = (rect.width(), rect.height());
        let mut scale = 1.0f64;
        let mut fit = |limit: f64, a: f64, b: f64| {
            if a + b > limit {
                scale = scale.min(limit / (a + b));
            }
        };
        fit(width, radii[0].x, radii[1].x);
        fit(height, radii[1].y, radii[2].y);
        fit(width, radii[2].x, radii[3].x);
        fit(height, radii[3].y, radii[0].y);

        if scale < 1.0 {
            for radius in &mut radii {
                *radius = *radius * scale;
            }
        }

        Self { rect, radii }
    }

    /// The bounding rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The radii of one corner.
    #[inline]
    pub fn radii(&self, corner: Corner) -> Vec2 {
        self.radii[corner as usize]
    }

    /// The radii of every corner, in [`Corner`] order.
    #[inline]
    pub fn all_radii(&self) -> [Vec2; 4] {
        self.radii
    }

    /// Classify this rounded rectangle.
    pub fn kind(&self) -> RRectKind {
        if self.rect.width() <= 0.0 || self.rect.height() <= 0.0 {
            return RRectKind::Empty;
        }

        let first = self.radii[0];
        let all_equal = self.radii.iter().all(|r| *r == first);

        if self.radii.iter().all(|r| *r == Vec2::ZERO) {
            RRectKind::Rect
        } else if all_equal
            && first.x >= self.rect.width() / 2.0
            && first.y >= self.rect.height() / 2.0
        {
            RRectKind::Oval
        } else if all_equal {
            RRectKind::Simple
        } else {
            RRectKind::Complex
        }
    }

    /// Whether the rectangle has zero width or height.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind() == RRectKind::Empty
    }

    /// Whether this is a plain rectangle.
    #[inline]
    pub fn is_rect(&self) -> bool {
        self.kind() == RRectKind::Rect
    }

    /// Whether this is an ellipse.
    #[inline]
    pub fn is_oval(&self) -> bool {
        self.kind() == RRectKind::Oval
    }

    /// Move this rounded rectangle by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            rect: self.rect + offset,
            radii: self.radii,
        }
    }
}

impl From<RoundedRect> for RRect {
    fn from(rounded: RoundedRect) -> Self {
        let radii = rounded.radii();
        let corner = |r: f64| Vec2::new(r, r);
        Self::new(
            rounded.rect(),
            [
                corner(radii.top_left),
                corner(radii.top_right),
                corner(radii.bottom_right),
                corner(radii.bottom_left),
            ],
        )
    }
}

impl From<Rect> for RRect {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

fn is_finite_rect(rect: Rect) -> bool {
    rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_kinds() {
        let rect = Rect::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(RRect::from_rect(rect).kind(), RRectKind::Rect);
        assert_eq!(RRect::from_oval(rect).kind(), RRectKind::Oval);
        assert_eq!(RRect::from_rect_xy(rect, 2.0, 3.0).kind(), RRectKind::Simple);
        assert_eq!(
            RRect::from_rect(Rect::new(0.0, 0.0, 0.0, 5.0)).kind(),
            RRectKind::Empty
        );

        let complex = RRect::new(
            rect,
            [
                Vec2::new(1.0, 1.0),
                Vec2::new(2.0, 2.0),
                Vec2::ZERO,
                Vec2::new(1.0, 1.0),
            ],
        );
        assert_eq!(complex.kind(), RRectKind::Complex);
    }

    #[test]
    fn radii_are_scaled_to_fit() {
        let rrect = RRect::from_rect_xy(Rect::new(0.0, 0.0, 10.0, 10.0), 10.0, 10.0);
        assert_eq!(rrect.radii(Corner::UpperLeft), Vec2::new(5.0, 5.0));
        assert!(rrect.is_oval());
    }

    #[test]
    fn degenerate_radii_are_zeroed() {
        let rrect = RRect::new(
            Rect::new(10.0, 10.0, 0.0, 0.0),
            [
                Vec2::new(-1.0, 2.0),
                Vec2::new(f64::NAN, 1.0),
                Vec2::new(3.0, 0.0),
                Vec2::new(1.0, 1.0),
            ],
        );
        assert_eq!(rrect.rect(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(rrect.radii(Corner::UpperLeft), Vec2::ZERO);
        assert_eq!(rrect.radii(Corner::UpperRight), Vec2::ZERO);
        assert_eq!(rrect.radii(Corner::LowerRight), Vec2::ZERO);
        assert_eq!(rrect.radii(Corner::LowerLeft), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn converts_from_kurbo() {
        let rounded = RoundedRect::new(0.0, 0.0, 8.0, 8.0, 2.0);
        let rrect = RRect::from(rounded);
        assert_eq!(rrect.kind(), RRectKind::Simple);
        assert_eq!(rrect.radii(Corner::LowerLeft), Vec2::new(2.0, 2.0));
    }
}

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

//! Rational quadratic curves.

use arrayvec::ArrayVec;
use kurbo::{Point, Rect, Vec2};

/// The largest power of two a conic is split into when approximating it with quads.
pub const MAX_QUAD_POW2: u32 = 5;

/// The most quads a conic is ever approximated with.
pub const MAX_QUADS: usize = 1 << MAX_QUAD_POW2;

/// The weight of a conic that traces a quarter of a circle.
pub const QUARTER_CIRCLE_WEIGHT: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// A rational quadratic Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    /// The start point, control point and end point.
    pub points: [Point; 3],

    /// The weight of the control point.
    pub weight: f64,
}

impl Conic {
    /// Create a new conic.
    #[inline]
    pub fn new(p0: Point, p1: Point, p2: Point, weight: f64) -> Self {
        Self {
            points: [p0, p1, p2],
            weight,
        }
    }

    /// Evaluate the curve at `t` in `0..=1`.
    pub fn eval(&self, t: f64) -> Point {
        let [p0, p1, p2] = self.points;
        let mt = 1.0 - t;
        let (b0, b1, b2) = (mt * mt, 2.0 * self.weight * t * mt, t * t);
        let denom = b0 + b1 + b2;

        let numer = p0.to_vec2() * b0 + p1.to_vec2() * b1 + p2.to_vec2() * b2;
        (numer / denom).to_point()
    }

    /// Split the curve in half.
    ///
    /// Both halves share the same weight, `sqrt(1/2 + w/2)`.
    pub fn chop(&self) -> [Conic; 2] {
        let [p0, p1, p2] = self.points.map(Point::to_vec2);
        let w = self.weight;
        let scale = 1.0 / (1.0 + w);
        let new_weight = (0.5 + 0.5 * w).sqrt();

        let a = ((p0 + p1 * w) * scale).to_point();
        let mid = ((p0 + p1 * (2.0 * w) + p2) * (0.5 * scale)).to_point();
        let b = ((p1 * w + p2) * scale).to_point();

        [
            Conic::new(p0.to_point(), a, mid, new_weight),
            Conic::new(mid, b, p2.to_point(), new_weight),
        ]
    }

    /// How many times the curve has to be halved before quads approximate it within
    /// `tolerance`.
    pub fn quad_pow2(&self, tolerance: f64) -> u32 {
        if !(tolerance > 0.0) || !self.is_finite() {
            return 0;
        }

        let [p0, p1, p2] = self.points;
        let a = self.weight - 1.0;
        let k = a / (4.0 * (2.0 + a));
        let x = k * (p0.x - 2.0 * p1.x + p2.x);
        let y = k * (p0.y - 2.0 * p1.y + p2.y);

        let mut error = x.hypot(y);
        let mut pow2 = 0;
        while pow2 < MAX_QUAD_POW2 && error > tolerance {
            error *= 0.25;
            pow2 += 1;
        }
        pow2
    }

    /// Approximate the curve with quads, as `(control, end)` pairs.
    ///
    /// The start of the first quad is the start of the conic.
    pub fn to_quads(&self, tolerance: f64) -> ArrayVec<(Point, Point), MAX_QUADS> {
        let mut quads = ArrayVec::new();
        self.subdivide(self.quad_pow2(tolerance), &mut quads);
        quads
    }

    fn subdivide(&self, level: u32, out: &mut ArrayVec<(Point, Point), MAX_QUADS>) {
        if level == 0 {
            out.push((self.points[1], self.points[2]));
            return;
        }

        for half in self.chop() {
            half.subdivide(level - 1, out);
        }
    }

    fn is_finite(&self) -> bool {
        self.weight.is_finite()
            && self
                .points
                .iter()
                .all(|pt| pt.x.is_finite() && pt.y.is_finite())
    }
}

/// A point on the unit circle at `degrees`, clockwise from the positive x axis.
///
/// Multiples of 90 degrees land exactly on the axes.
pub(crate) fn unit_vector(degrees: f64) -> Vec2 {
    if degrees % 90.0 == 0.0 {
        let quadrant = (degrees / 90.0) as i64;
        return match quadrant.rem_euclid(4) {
            0 => Vec2::new(1.0, 0.0),
            1 => Vec2::new(0.0, 1.0),
            2 => Vec2::new(-1.0, 0.0),
            _ => Vec2::new(0.0, -1.0),
        };
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

/// Map a point on the unit circle onto the ellipse inscribed in `oval`.
pub(crate) fn map_to_oval(oval: Rect, unit: Vec2) -> Point {
    let center = oval.center();
    Point::new(
        center.x + unit.x * oval.width() / 2.0,
        center.y + unit.y * oval.height() / 2.0,
    )
}

/// Break an arc of the ellipse in `oval` into conics of at most 90 degrees each.
///
/// `sweep` is clamped to a full turn either way.
pub(crate) fn arc_conics(oval: Rect, start: f64, sweep: f64) -> ArrayVec<Conic, 4> {
    let sweep = sweep.clamp(-360.0, 360.0);
    let spans = ((sweep.abs() / 90.0).ceil() as usize).clamp(1, 4);
    let step = sweep / spans as f64;
    let weight = (step / 2.0).to_radians().cos();

    let mut conics = ArrayVec::new();
    for i in 0..spans {
        let a0 = start + step * i as f64;
        let a1 = if i + 1 == spans { start + sweep } else { a0 + step };

        let p0 = unit_vector(a0);
        let p2 = unit_vector(a1);
        let control = (p0 + p2) / (2.0 * weight * weight);

        conics.push(Conic::new(
            map_to_oval(oval, p0),
            map_to_oval(oval, control),
            map_to_oval(oval, p2),
            weight,
        ));
    }

    conics
}

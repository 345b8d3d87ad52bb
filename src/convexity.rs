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

//! Deciding whether a path is convex.

use super::iter::{Segment, Segments};
use super::{GeometryBuffer, Verb};

use kurbo::{Point, Vec2};

/// Whether a path is known to be convex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Convexity {
    /// Not computed yet.
    #[default]
    Unknown = 0,

    /// A single contour that never turns back on itself.
    Convex = 1,

    /// Anything else.
    Concave = 2,
}

impl Convexity {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Convexity::Convex,
            2 => Convexity::Concave,
            _ => Convexity::Unknown,
        }
    }

    /// Classify the contents of a buffer.
    pub(crate) fn compute(buffer: &GeometryBuffer) -> Self {
        // Trailing moves don't draw anything.
        let drawn = buffer
            .verbs()
            .iter()
            .rposition(|verb| *verb != Verb::Move)
            .map_or(0, |last| last + 1);
        if drawn == 0 {
            return Convexity::Convex;
        }

        let points = &buffer.points()[..buffer
            .verbs()
            .iter()
            .take(drawn)
            .map(|verb| verb.point_count())
            .sum::<usize>()];
        if !points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()) {
            return Convexity::Concave;
        }

        if turns_back_on_itself(points) {
            return Convexity::Concave;
        }

        let mut contours = 0;
        let mut state = Convexicator::default();

        for segment in Segments::new(buffer).take(drawn) {
            match segment {
                Segment::Move(pt) => {
                    contours += 1;
                    if contours > 1 {
                        return Convexity::Concave;
                    }
                    state.add_point(pt);
                }
                Segment::Line(line) => state.add_point(line.p1),
                Segment::Quad(quad) => {
                    state.add_point(quad.p1);
                    state.add_point(quad.p2);
                }
                Segment::Conic(conic) => {
                    state.add_point(conic.points[1]);
                    state.add_point(conic.points[2]);
                }
                Segment::Cubic(cubic) => {
                    state.add_point(cubic.p1);
                    state.add_point(cubic.p2);
                    state.add_point(cubic.p3);
                }
                Segment::Close(line) => state.add_point(line.p1),
            }

            if state.concave {
                return Convexity::Concave;
            }
        }

        state.close();
        if state.concave {
            Convexity::Concave
        } else {
            Convexity::Convex
        }
    }
}

/// Whether the points change direction along either axis more than a convex shape can.
fn turns_back_on_itself(points: &[Point]) -> bool {
    let mut changes = [0u32; 2];
    let mut signs: [Option<bool>; 2] = [None, None];
    let mut last: Option<Point> = None;

    // Walk the closed loop, so the edge back to the first point counts too.
    for &pt in points.iter().chain(points.first()) {
        let prev = match last.replace(pt) {
            Some(prev) => prev,
            None => continue,
        };

        let delta = pt - prev;
        for (axis, value) in [delta.x, delta.y].into_iter().enumerate() {
            if value == 0.0 {
                continue;
            }

            let negative = value < 0.0;
            if signs[axis] != Some(negative) {
                if signs[axis].is_some() {
                    changes[axis] += 1;
                }
                signs[axis] = Some(negative);
            }
        }
    }

    changes.iter().any(|count| *count > 3)
}

/// Tracks the turning direction along a single contour.
#[derive(Default)]
struct Convexicator {
    /// The first point of the contour.
    first: Option<Point>,

    /// The last point added.
    current: Point,

    /// The last edge that turned significantly.
    last_edge: Option<Vec2>,

    /// The first edge of the contour.
    first_edge: Option<Vec2>,

    /// The sign of the first significant turn.
    turn: i8,

    /// The number of times the edge direction reversed.
    reversals: u32,

    /// Whether the contour is known to be concave.
    concave: bool,
}

impl Convexicator {
    fn add_point(&mut self, pt: Point) {
        if self.first.is_none() {
            self.first = Some(pt);
            self.current = pt;
            return;
        }

        let edge = pt - self.current;
        if edge.x == 0.0 && edge.y == 0.0 {
            return;
        }

        let prev = self.current;
        self.current = pt;

        match self.last_edge {
            None => {
                self.first_edge = Some(edge);
                self.last_edge = Some(edge);
            }
            Some(_) => self.add_edge(prev, edge),
        }
    }

    fn add_edge(&mut self, prev: Point, edge: Vec2) {
        let last_edge = match self.last_edge {
            Some(last_edge) => last_edge,
            None => return,
        };

        let cross = last_edge.cross(edge);
        let largest = [prev.x, prev.y, self.current.x, self.current.y]
            .iter()
            .fold(0.0f64, |largest, v| largest.max(v.abs()));

        if cross.abs() <= largest * 16.0 * f64::EPSILON {
            // Colinear. Going straight back counts as a reversal.
            if last_edge.dot(edge) < 0.0 {
                self.reversals += 1;
                if self.reversals > 2 {
                    self.concave = true;
                }
            }
            return;
        }

        let sign = if cross > 0.0 { 1 } else { -1 };
        if self.turn == 0 {
            self.turn = sign;
        } else if self.turn != sign {
            self.concave = true;
        }
        self.last_edge = Some(edge);
    }

    fn close(&mut self) {
        if let (Some(first), Some(first_edge)) = (self.first, self.first_edge) {
            self.add_point(first);
            let prev = self.current;
            self.add_edge(prev, first_edge);
        }
    }
}

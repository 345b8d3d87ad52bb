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

//! Iterating over the segments of a path.

use super::conic::{Conic, MAX_QUADS};
use super::{GeometryBuffer, Verb};

use arrayvec::ArrayVec;
use kurbo::{CubicBez, Line, PathEl, Point, QuadBez};

use std::iter::FusedIterator;
use std::slice;

/// One verb of a path, with its start point resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Start a new contour.
    Move(Point),

    /// A straight line.
    Line(Line),

    /// A quadratic Bézier curve.
    Quad(QuadBez),

    /// A rational quadratic curve.
    Conic(Conic),

    /// A cubic Bézier curve.
    Cubic(CubicBez),

    /// Close the contour, with the implied line from the last point back to its start.
    Close(Line),
}

impl Segment {
    /// The point this segment ends on.
    pub fn end(&self) -> Point {
        match self {
            Segment::Move(pt) => *pt,
            Segment::Line(line) | Segment::Close(line) => line.p1,
            Segment::Quad(quad) => quad.p2,
            Segment::Conic(conic) => conic.points[2],
            Segment::Cubic(cubic) => cubic.p3,
        }
    }

    /// Convert this segment into `kurbo` path elements.
    ///
    /// Conics are approximated by quads within `tolerance`.
    pub fn to_path_els(&self, tolerance: f64) -> ArrayVec<PathEl, MAX_QUADS> {
        let mut els = ArrayVec::new();

        match self {
            Segment::Move(pt) => els.push(PathEl::MoveTo(*pt)),
            Segment::Line(line) => els.push(PathEl::LineTo(line.p1)),
            Segment::Quad(quad) => els.push(PathEl::QuadTo(quad.p1, quad.p2)),
            Segment::Conic(conic) => els.extend(
                conic
                    .to_quads(tolerance)
                    .into_iter()
                    .map(|(ctrl, end)| PathEl::QuadTo(ctrl, end)),
            ),
            Segment::Cubic(cubic) => els.push(PathEl::CurveTo(cubic.p1, cubic.p2, cubic.p3)),
            Segment::Close(_) => els.push(PathEl::ClosePath),
        }

        els
    }
}

/// An iterator over the segments of a path.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    /// All of the points.
    points: &'a [Point],

    /// The remaining verbs.
    verbs: slice::Iter<'a, Verb>,

    /// The remaining conic weights.
    weights: slice::Iter<'a, f64>,

    /// The index of the next unread point.
    cursor: usize,

    /// The point the previous segment ended on.
    last: Point,

    /// The first point of the current contour.
    contour_start: Point,
}

impl<'a> Segments<'a> {
    /// Iterate over the segments in a valid buffer.
    pub fn new(buffer: &'a GeometryBuffer) -> Self {
        Self {
            points: buffer.points(),
            verbs: buffer.verbs().iter(),
            weights: buffer.conic_weights().iter(),
            cursor: 0,
            last: Point::ORIGIN,
            contour_start: Point::ORIGIN,
        }
    }

    fn take<const N: usize>(&mut self) -> [Point; N] {
        let mut pts = [Point::ORIGIN; N];
        pts.copy_from_slice(&self.points[self.cursor..self.cursor + N]);
        self.cursor += N;
        pts
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = match self.verbs.next()? {
            Verb::Move => {
                let [pt] = self.take();
                self.contour_start = pt;
                Segment::Move(pt)
            }
            Verb::Line => {
                let [p1] = self.take();
                Segment::Line(Line::new(self.last, p1))
            }
            Verb::Quad => {
                let [p1, p2] = self.take();
                Segment::Quad(QuadBez::new(self.last, p1, p2))
            }
            Verb::Conic => {
                let [p1, p2] = self.take();
                let weight = *self
                    .weights
                    .next()
                    .expect("every conic verb has a weight");
                Segment::Conic(Conic::new(self.last, p1, p2, weight))
            }
            Verb::Cubic => {
                let [p1, p2, p3] = self.take();
                Segment::Cubic(CubicBez::new(self.last, p1, p2, p3))
            }
            Verb::Close => Segment::Close(Line::new(self.last, self.contour_start)),
        };

        self.last = segment.end();
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.verbs.size_hint()
    }
}

impl ExactSizeIterator for Segments<'_> {}

impl FusedIterator for Segments<'_> {}

/// An iterator over a path as `kurbo` path elements.
#[derive(Debug, Clone)]
pub struct PathElements<'a> {
    /// The segments left to convert.
    segments: Segments<'a>,

    /// Elements produced by the last segment that haven't been returned yet.
    pending: arrayvec::IntoIter<PathEl, MAX_QUADS>,

    /// The tolerance for approximating conics.
    tolerance: f64,
}

impl<'a> PathElements<'a> {
    pub(crate) fn new(segments: Segments<'a>, tolerance: f64) -> Self {
        Self {
            segments,
            pending: ArrayVec::new().into_iter(),
            tolerance,
        }
    }
}

impl Iterator for PathElements<'_> {
    type Item = PathEl;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(el) = self.pending.next() {
                return Some(el);
            }

            let segment = self.segments.next()?;
            self.pending = segment.to_path_els(self.tolerance).into_iter();
        }
    }
}

impl FusedIterator for PathElements<'_> {}

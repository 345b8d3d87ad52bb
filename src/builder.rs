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

//! Building new paths.

use super::geometry::{Bounds, ShapeInfo, SharedGeometry};
use super::iter::{Segment, Segments};
use super::{Convexity, FillType, GeometryBuffer, GeometryEditor, Path, Verb};

use kurbo::{Affine, PathEl, Point, Rect, Vec2};

use std::mem;
use std::sync::Arc;

/// How [`PathBuilder::add_path`] joins the added path to the existing contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddPathMode {
    /// Add the path's contours as new contours.
    #[default]
    Append,

    /// Join the path's first contour to the current one with a line.
    Extend,
}

/// Accumulates geometry for a new [`Path`].
///
/// The builder owns its storage outright; nothing is shared until
/// [`PathBuilder::snapshot`] or [`PathBuilder::detach`] is called.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    /// The geometry built so far.
    pub(crate) buffer: GeometryBuffer,

    /// The fill type for the finished path.
    fill_type: FillType,

    /// Whether the finished path is volatile.
    is_volatile: bool,

    /// The index of the point of the most recent move.
    last_move_index: Option<usize>,

    /// Whether the next segment has to be preceded by a move.
    needs_move: bool,

    /// The shape the contents were built as, if they are exactly one shape.
    pub(crate) shape: Option<ShapeInfo>,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self {
            buffer: GeometryBuffer::new(),
            fill_type: FillType::Winding,
            is_volatile: false,
            last_move_index: None,
            needs_move: true,
            shape: None,
        }
    }

    /// Create a new builder whose path will use `fill_type`.
    pub fn with_fill_type(fill_type: FillType) -> Self {
        Self {
            fill_type,
            ..Self::new()
        }
    }

    /// The fill type for the finished path.
    #[inline]
    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    /// Set the fill type for the finished path.
    pub fn set_fill_type(&mut self, fill_type: FillType) -> &mut Self {
        self.fill_type = fill_type;
        self
    }

    /// Flip between the inverse and regular form of the fill type.
    pub fn toggle_inverse_fill_type(&mut self) -> &mut Self {
        self.fill_type = self.fill_type.toggle_inverse();
        self
    }

    /// Whether the finished path is volatile.
    #[inline]
    pub fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    /// Mark the finished path as volatile, meaning it shouldn't be used as a cache key.
    pub fn set_is_volatile(&mut self, is_volatile: bool) -> &mut Self {
        self.is_volatile = is_volatile;
        self
    }

    /// The points so far.
    #[inline]
    pub fn points(&self) -> &[Point] {
        self.buffer.points()
    }

    /// The verbs so far.
    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        self.buffer.verbs()
    }

    /// The conic weights so far.
    #[inline]
    pub fn conic_weights(&self) -> &[f64] {
        self.buffer.conic_weights()
    }

    /// Whether nothing has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The last point added.
    #[inline]
    pub fn last_point(&self) -> Option<Point> {
        self.buffer.last_point()
    }

    /// Iterate over the segments so far.
    pub fn segments(&self) -> Segments<'_> {
        Segments::new(&self.buffer)
    }

    /// The bounds of every point added so far.
    pub fn compute_bounds(&self) -> Rect {
        Bounds::compute(self.buffer.points()).rect
    }

    /// Hint that more points and verbs are about to be added.
    pub fn reserve(&mut self, extra_points: usize, extra_verbs: usize) -> &mut Self {
        self.buffer.reserve(extra_points, extra_verbs, 0);
        self
    }

    /// Whether the builder holds nothing, or a single move that the next shape will absorb.
    pub(crate) fn is_blank(&self) -> bool {
        matches!(self.buffer.verbs(), [] | [Verb::Move])
    }

    /// Begin a new contour at `pt`.
    ///
    /// A move directly after another move replaces it.
    pub fn move_to(&mut self, pt: impl Into<Point>) -> &mut Self {
        let pt = pt.into();
        self.shape = None;

        if self.buffer.last_verb() == Some(Verb::Move) {
            let points = self.buffer.points_mut();
            let last = points.len() - 1;
            points[last] = pt;
        } else {
            self.last_move_index = Some(self.buffer.points().len());
            self.buffer.grow_for_verb(Verb::Move, 0.0)[0] = pt;
        }

        self.needs_move = false;
        self
    }

    /// Add a move back to the last contour's start point if the next segment needs one.
    pub(crate) fn inject_move_if_needed(&mut self) {
        if self.needs_move {
            let pt = self
                .last_move_index
                .map_or(Point::ORIGIN, |index| self.buffer.points()[index]);
            self.move_to(pt);
        }
    }

    /// Add a line to `pt`.
    pub fn line_to(&mut self, pt: impl Into<Point>) -> &mut Self {
        self.inject_move_if_needed();
        self.shape = None;
        self.buffer.grow_for_verb(Verb::Line, 0.0)[0] = pt.into();
        self
    }

    /// Add a quadratic curve through `p1` to `p2`.
    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) -> &mut Self {
        self.inject_move_if_needed();
        self.shape = None;
        let pts = self.buffer.grow_for_verb(Verb::Quad, 0.0);
        pts[0] = p1.into();
        pts[1] = p2.into();
        self
    }

    /// Add a conic through `p1` to `p2` with `weight`.
    ///
    /// Weights that don't describe a real conic degrade to simpler segments: a weight of
    /// zero, less than zero, or NaN becomes a line to `p2`, an infinite weight becomes lines to
    /// `p1` and `p2`, and a weight of one becomes a quad.
    pub fn conic_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>, weight: f64) -> &mut Self {
        let (p1, p2) = (p1.into(), p2.into());

        if !(weight > 0.0) {
            self.line_to(p2)
        } else if weight.is_infinite() {
            self.line_to(p1).line_to(p2)
        } else if weight == 1.0 {
            self.quad_to(p1, p2)
        } else {
            self.inject_move_if_needed();
            self.shape = None;
            let pts = self.buffer.grow_for_verb(Verb::Conic, weight);
            pts[0] = p1;
            pts[1] = p2;
            self
        }
    }

    /// Add a cubic curve through `p1` and `p2` to `p3`.
    pub fn cubic_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> &mut Self {
        self.inject_move_if_needed();
        self.shape = None;
        let pts = self.buffer.grow_for_verb(Verb::Cubic, 0.0);
        pts[0] = p1.into();
        pts[1] = p2.into();
        pts[2] = p3.into();
        self
    }

    /// Close the current contour.
    ///
    /// Closing an empty builder, or closing twice in a row, does nothing.
    pub fn close(&mut self) -> &mut Self {
        match self.buffer.last_verb() {
            None | Some(Verb::Close) => {}
            Some(_) => {
                self.shape = None;
                self.buffer.grow_for_verb(Verb::Close, 0.0);
            }
        }

        self.needs_move = true;
        self
    }

    /// The point relative segments are measured from.
    fn relative_origin(&self) -> Vec2 {
        self.buffer.last_point().unwrap_or(Point::ORIGIN).to_vec2()
    }

    /// Begin a new contour, relative to the last point.
    pub fn r_move_to(&mut self, delta: impl Into<Vec2>) -> &mut Self {
        let origin = self.relative_origin();
        self.move_to((origin + delta.into()).to_point())
    }

    /// Add a line, relative to the last point.
    pub fn r_line_to(&mut self, delta: impl Into<Vec2>) -> &mut Self {
        self.inject_move_if_needed();
        let origin = self.relative_origin();
        self.line_to((origin + delta.into()).to_point())
    }

    /// Add a quadratic curve, relative to the last point.
    pub fn r_quad_to(&mut self, d1: impl Into<Vec2>, d2: impl Into<Vec2>) -> &mut Self {
        self.inject_move_if_needed();
        let origin = self.relative_origin();
        self.quad_to(
            (origin + d1.into()).to_point(),
            (origin + d2.into()).to_point(),
        )
    }

    /// Add a conic, relative to the last point.
    pub fn r_conic_to(
        &mut self,
        d1: impl Into<Vec2>,
        d2: impl Into<Vec2>,
        weight: f64,
    ) -> &mut Self {
        self.inject_move_if_needed();
        let origin = self.relative_origin();
        self.conic_to(
            (origin + d1.into()).to_point(),
            (origin + d2.into()).to_point(),
            weight,
        )
    }

    /// Add a cubic curve, relative to the last point.
    pub fn r_cubic_to(
        &mut self,
        d1: impl Into<Vec2>,
        d2: impl Into<Vec2>,
        d3: impl Into<Vec2>,
    ) -> &mut Self {
        self.inject_move_if_needed();
        let origin = self.relative_origin();
        self.cubic_to(
            (origin + d1.into()).to_point(),
            (origin + d2.into()).to_point(),
            (origin + d3.into()).to_point(),
        )
    }

    /// Replace the last point, or begin a contour there if there are no points.
    pub fn set_last_point(&mut self, pt: impl Into<Point>) -> &mut Self {
        let pt = pt.into();
        match self.buffer.points_mut().last_mut() {
            Some(last) => {
                *last = pt;
                self.shape = None;
                self
            }
            None => self.move_to(pt),
        }
    }

    /// Add lines through every point in `points`.
    pub fn polyline_to(&mut self, points: &[Point]) -> &mut Self {
        if points.is_empty() {
            return self;
        }

        self.inject_move_if_needed();
        self.shape = None;
        let (pts, _) = self.buffer.grow_for_repeated_verb(Verb::Line, points.len());
        pts.copy_from_slice(points);
        self
    }

    /// Add a contour through every point in `points`.
    pub fn add_polygon(&mut self, points: &[Point], close: bool) -> &mut Self {
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return self,
        };

        self.buffer.reserve(points.len(), points.len() + 1, 0);
        self.move_to(*first).polyline_to(rest);
        if close {
            self.close();
        }
        self
    }

    /// Add the contents of `path`, moved by `offset`.
    pub fn add_path(&mut self, path: &Path, offset: Vec2, mode: AddPathMode) -> &mut Self {
        let source = path.geometry();
        if source.is_empty() {
            return self;
        }

        self.shape = None;
        match mode {
            AddPathMode::Append => {
                let base = self.buffer.points().len();
                for pt in self.buffer.grow_for_verbs_in(source.buffer()) {
                    *pt += offset;
                }

                // Find the last move among the added verbs.
                let mut index = base;
                for verb in source.verbs() {
                    if *verb == Verb::Move {
                        self.last_move_index = Some(index);
                    }
                    index += verb.point_count();
                }
                self.needs_move = source.buffer().last_verb() == Some(Verb::Close);
            }

            AddPathMode::Extend => {
                let mut first = true;
                for segment in Segments::new(source.buffer()) {
                    match segment {
                        Segment::Move(pt) if first && !self.buffer.is_empty() => {
                            self.inject_move_if_needed();
                            self.line_to(pt + offset);
                        }
                        Segment::Move(pt) => {
                            self.move_to(pt + offset);
                        }
                        Segment::Line(line) => {
                            self.line_to(line.p1 + offset);
                        }
                        Segment::Quad(quad) => {
                            self.quad_to(quad.p1 + offset, quad.p2 + offset);
                        }
                        Segment::Conic(conic) => {
                            self.conic_to(
                                conic.points[1] + offset,
                                conic.points[2] + offset,
                                conic.weight,
                            );
                        }
                        Segment::Cubic(cubic) => {
                            self.cubic_to(cubic.p1 + offset, cubic.p2 + offset, cubic.p3 + offset);
                        }
                        Segment::Close(_) => {
                            self.close();
                        }
                    }
                    first = false;
                }
            }
        }

        self
    }

    /// Move every point by `offset`.
    pub fn offset(&mut self, offset: Vec2) -> &mut Self {
        for pt in self.buffer.points_mut() {
            *pt += offset;
        }
        self.shape = self.shape.map(|shape| shape.translated(offset));
        self
    }

    /// Map every point through `transform`.
    pub fn transform(&mut self, transform: Affine) -> &mut Self {
        for pt in self.buffer.points_mut() {
            *pt = transform * *pt;
        }
        self.shape = None;
        self
    }

    /// Clear the builder, including its fill type and volatility.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Build a path from a copy of the contents, leaving the builder as it is.
    pub fn snapshot(&self) -> Path {
        self.make_path(self.buffer.clone())
    }

    /// Build a path from the contents, and reset the builder.
    pub fn detach(&mut self) -> Path {
        let buffer = mem::take(&mut self.buffer);
        let path = self.make_path(buffer);
        self.reset();
        path
    }

    fn make_path(&self, buffer: GeometryBuffer) -> Path {
        if buffer.is_empty() {
            return Path::new()
                .with_fill_type(self.fill_type)
                .with_volatile(self.is_volatile);
        }

        let mut geometry = Arc::new(SharedGeometry::from_buffer(buffer));
        let mut convexity = Convexity::Unknown;

        if let Some(shape) = self.shape {
            GeometryEditor::new(&mut geometry).set_shape(shape);
            if matches!(shape, ShapeInfo::Oval(_) | ShapeInfo::RRect(_)) {
                convexity = Convexity::Convex;
            }
        }

        // Readers on other threads then never race to fill the cache.
        geometry.bounds();

        Path::from_geometry(geometry, self.fill_type, self.is_volatile, convexity)
    }
}

impl PartialEq for PathBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.fill_type == other.fill_type
            && self.buffer.verbs() == other.buffer.verbs()
            && self.buffer.points() == other.buffer.points()
            && self.buffer.conic_weights() == other.buffer.conic_weights()
    }
}

impl From<&Path> for PathBuilder {
    fn from(path: &Path) -> Self {
        let buffer = path.geometry().buffer().clone();

        let mut last_move_index = None;
        let mut index = 0;
        for verb in buffer.verbs() {
            if *verb == Verb::Move {
                last_move_index = Some(index);
            }
            index += verb.point_count();
        }

        Self {
            needs_move: matches!(buffer.last_verb(), None | Some(Verb::Close)),
            buffer,
            fill_type: path.fill_type(),
            is_volatile: path.is_volatile(),
            last_move_index,
            shape: None,
        }
    }
}

impl Extend<PathEl> for PathBuilder {
    fn extend<I: IntoIterator<Item = PathEl>>(&mut self, iter: I) {
        for el in iter {
            match el {
                PathEl::MoveTo(pt) => self.move_to(pt),
                PathEl::LineTo(pt) => self.line_to(pt),
                PathEl::QuadTo(p1, p2) => self.quad_to(p1, p2),
                PathEl::CurveTo(p1, p2, p3) => self.cubic_to(p1, p2, p3),
                PathEl::ClosePath => self.close(),
            };
        }
    }
}

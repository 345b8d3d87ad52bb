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

//! Canonical shapes for the path builder.
//!
//! Ovals and rounded rectangles are traced with conics of weight `sqrt(2) / 2`, one per
//! quarter turn. A shape added to a blank builder is recorded, so that the finished path
//! can report what it was built as.

use super::conic::{self, QUARTER_CIRCLE_WEIGHT};
use super::geometry::{OvalInfo, RRectInfo, ShapeInfo};
use super::{PathBuilder, PathDirection, RRect, RRectKind};

use kurbo::{Point, Rect, Vec2};

/// Distances at or below this are treated as zero.
const NEARLY_ZERO: f64 = 1.0 / 4096.0;

/// Walks a fixed loop of points in either direction.
struct PointLoop<const N: usize> {
    /// The points, clockwise.
    points: [Point; N],

    /// The index of the current point.
    index: usize,

    /// How far to move on each step.
    step: usize,
}

impl<const N: usize> PointLoop<N> {
    fn new(points: [Point; N], direction: PathDirection, start: u32) -> Self {
        Self {
            points,
            index: start as usize % N,
            step: match direction {
                PathDirection::Cw => 1,
                PathDirection::Ccw => N - 1,
            },
        }
    }

    fn current(&self) -> Point {
        self.points[self.index]
    }

    fn advance(&mut self) -> Point {
        self.index = (self.index + self.step) % N;
        self.points[self.index]
    }
}

/// The corners of a rectangle, clockwise from the top left.
fn rect_points(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// The points where an oval touches its rectangle, clockwise from the top.
fn oval_points(oval: Rect) -> [Point; 4] {
    let center = oval.center();
    [
        Point::new(center.x, oval.y0),
        Point::new(oval.x1, center.y),
        Point::new(center.x, oval.y1),
        Point::new(oval.x0, center.y),
    ]
}

/// The points where the corners of a rounded rectangle meet its edges, clockwise from the
/// end of the top-left corner.
fn rrect_points(rrect: &RRect) -> [Point; 8] {
    let Rect { x0, y0, x1, y1 } = rrect.rect();
    let [ul, ur, lr, ll] = rrect.all_radii();
    [
        Point::new(x0 + ul.x, y0),
        Point::new(x1 - ur.x, y0),
        Point::new(x1, y0 + ur.y),
        Point::new(x1, y1 - lr.y),
        Point::new(x1 - lr.x, y1),
        Point::new(x0 + ll.x, y1),
        Point::new(x0, y1 - ll.y),
        Point::new(x0, y0 + ul.y),
    ]
}

/// The rectangle index the corner control points start behind.
fn corner_start(start: u32, direction: PathDirection) -> u32 {
    match direction {
        PathDirection::Cw => start,
        PathDirection::Ccw => start + 1,
    }
}

fn normalize(v: Vec2) -> Option<Vec2> {
    let length = v.hypot();
    if length > 0.0 && length.is_finite() {
        Some(v / length)
    } else {
        None
    }
}

impl PathBuilder {
    /// Add a closed rectangle, starting at its top left corner.
    pub fn add_rect(&mut self, rect: Rect, direction: PathDirection) -> &mut Self {
        self.add_rect_with_start(rect, direction, 0)
    }

    /// Add a closed rectangle, starting at corner `start`, clockwise from the top left.
    pub fn add_rect_with_start(
        &mut self,
        rect: Rect,
        direction: PathDirection,
        start: u32,
    ) -> &mut Self {
        let mut corners = PointLoop::new(rect_points(rect), direction, start);

        self.buffer.reserve(4, 5, 0);
        self.move_to(corners.current());
        for _ in 0..3 {
            self.line_to(corners.advance());
        }
        self.close()
    }

    /// Add a closed oval, starting at its right edge.
    pub fn add_oval(&mut self, oval: Rect, direction: PathDirection) -> &mut Self {
        self.add_oval_with_start(oval, direction, 1)
    }

    /// Add a closed oval, starting at point `start`, clockwise from the top.
    pub fn add_oval_with_start(
        &mut self,
        oval: Rect,
        direction: PathDirection,
        start: u32,
    ) -> &mut Self {
        let is_only_shape = self.is_blank();

        let mut edges = PointLoop::new(oval_points(oval), direction, start);
        let mut corners =
            PointLoop::new(rect_points(oval), direction, corner_start(start, direction));

        self.buffer.reserve(9, 6, 4);
        self.move_to(edges.current());
        for _ in 0..4 {
            self.conic_to(corners.advance(), edges.advance(), QUARTER_CIRCLE_WEIGHT);
        }
        self.close();

        if is_only_shape {
            self.shape = Some(ShapeInfo::Oval(OvalInfo {
                bounds: oval,
                direction,
                start: start % 4,
            }));
        }
        self
    }

    /// Add a closed circle.
    ///
    /// Negative radii add nothing.
    pub fn add_circle(
        &mut self,
        center: impl Into<Point>,
        radius: f64,
        direction: PathDirection,
    ) -> &mut Self {
        if radius >= 0.0 {
            let center = center.into();
            let oval = Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            );
            self.add_oval(oval, direction);
        }
        self
    }

    /// Add a closed rounded rectangle, starting at the bottom of its top-left corner.
    pub fn add_rrect(&mut self, rrect: impl Into<RRect>, direction: PathDirection) -> &mut Self {
        let start = match direction {
            PathDirection::Cw => 6,
            PathDirection::Ccw => 7,
        };
        self.add_rrect_with_start(rrect, direction, start)
    }

    /// Add a closed rounded rectangle, starting at point `start`.
    ///
    /// The eight points are where the corners meet the edges, clockwise from the end of the
    /// top-left corner on the top edge. Rounded rectangles that are really rectangles or
    /// ovals are added as those shapes.
    pub fn add_rrect_with_start(
        &mut self,
        rrect: impl Into<RRect>,
        direction: PathDirection,
        start: u32,
    ) -> &mut Self {
        let rrect = rrect.into();
        let bounds = rrect.rect();

        match rrect.kind() {
            RRectKind::Empty | RRectKind::Rect => {
                return self.add_rect_with_start(bounds, direction, (start + 1) / 2);
            }
            RRectKind::Oval => return self.add_oval_with_start(bounds, direction, start / 2),
            RRectKind::Simple | RRectKind::Complex => {}
        }

        let is_only_shape = self.is_blank();

        // Odd points start a corner when going clockwise, even points when going back.
        let starts_with_conic = (start & 1 == 1) == (direction == PathDirection::Cw);

        let mut edges = PointLoop::new(rrect_points(&rrect), direction, start);
        let mut corners =
            PointLoop::new(rect_points(bounds), direction, corner_start(start / 2, direction));

        self.buffer.reserve(13, 10, 4);
        self.move_to(edges.current());
        if starts_with_conic {
            for _ in 0..3 {
                self.conic_to(corners.advance(), edges.advance(), QUARTER_CIRCLE_WEIGHT);
                self.line_to(edges.advance());
            }
            self.conic_to(corners.advance(), edges.advance(), QUARTER_CIRCLE_WEIGHT);
        } else {
            for _ in 0..4 {
                self.line_to(edges.advance());
                self.conic_to(corners.advance(), edges.advance(), QUARTER_CIRCLE_WEIGHT);
            }
        }
        self.close();

        if is_only_shape {
            self.shape = Some(ShapeInfo::RRect(RRectInfo {
                rrect,
                direction,
                start: start % 8,
            }));
        }
        self
    }

    /// Add an arc of the oval inscribed in `oval` as a new contour.
    ///
    /// Angles are in degrees, clockwise from the positive x axis. A sweep of a full turn or
    /// more that starts on a quarter turn is added as an oval.
    pub fn add_arc(&mut self, oval: Rect, start_angle: f64, sweep_angle: f64) -> &mut Self {
        if !(oval.x0 < oval.x1 && oval.y0 < oval.y1) || sweep_angle == 0.0 {
            return self;
        }

        if sweep_angle.abs() >= 360.0 {
            let quarters = start_angle / 90.0;
            let rounded = quarters.round();
            if (quarters - rounded).abs() <= NEARLY_ZERO {
                // Point 1 of an oval is at zero degrees.
                let start = (rounded + 1.0).rem_euclid(4.0) as u32;
                let direction = if sweep_angle > 0.0 {
                    PathDirection::Cw
                } else {
                    PathDirection::Ccw
                };
                return self.add_oval_with_start(oval, direction, start);
            }
        }

        self.arc_to(oval, start_angle, sweep_angle, true)
    }

    /// Add an arc of the oval inscribed in `oval`.
    ///
    /// The arc is joined to the current contour with a line unless `force_move` is set or
    /// the builder is empty. The sweep is clamped to one full turn.
    pub fn arc_to(
        &mut self,
        oval: Rect,
        start_angle: f64,
        sweep_angle: f64,
        force_move: bool,
    ) -> &mut Self {
        if oval.width() < 0.0 || oval.height() < 0.0 {
            return self;
        }

        let force_move = force_move || self.buffer.verbs().is_empty();
        let join = |this: &mut Self, pt: Point| {
            if force_move {
                this.move_to(pt);
            } else if this
                .last_point()
                .map_or(true, |last| (last - pt).hypot() > NEARLY_ZERO)
            {
                this.line_to(pt);
            }
        };

        // Arcs that collapse to a single point.
        if sweep_angle == 0.0 && (start_angle == 0.0 || start_angle == 360.0) {
            join(self, Point::new(oval.x1, oval.center().y));
            return self;
        }
        if oval.width() == 0.0 && oval.height() == 0.0 {
            join(self, Point::new(oval.x1, oval.y0));
            return self;
        }
        if sweep_angle == 0.0 {
            join(self, conic::map_to_oval(oval, conic::unit_vector(start_angle)));
            return self;
        }

        let conics = conic::arc_conics(oval, start_angle, sweep_angle);
        self.buffer.reserve(conics.len() * 2 + 1, conics.len() + 1, conics.len());
        join(self, conics[0].points[0]);
        for conic in &conics {
            self.conic_to(conic.points[1], conic.points[2], conic.weight);
        }

        self
    }

    /// Add a line towards `p1`, rounded into the line from `p1` to `p2` with an arc of
    /// `radius`.
    ///
    /// Degenerate input, where the three points don't describe a corner, adds a line to `p1`.
    pub fn arc_to_tangent(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        radius: f64,
    ) -> &mut Self {
        let (p1, p2) = (p1.into(), p2.into());
        self.inject_move_if_needed();

        if radius == 0.0 {
            return self.line_to(p1);
        }

        let start = self.last_point().unwrap_or(Point::ORIGIN);
        let (before, after) = match (normalize(p1 - start), normalize(p2 - p1)) {
            (Some(before), Some(after)) => (before, after),
            _ => return self.line_to(p1),
        };

        let cos = before.dot(after);
        let sin = before.cross(after);
        if sin.abs() <= NEARLY_ZERO {
            return self.line_to(p1);
        }

        let dist = (radius * (1.0 - cos) / sin).abs();
        let weight = (0.5 + 0.5 * cos).sqrt();

        self.line_to(p1 - before * dist)
            .conic_to(p1, p1 + after * dist, weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Corner, Verb};

    fn assert_near(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn rect_winds_both_ways() {
        let rect = Rect::new(0.0, 0.0, 10.0, 5.0);

        let mut builder = PathBuilder::new();
        builder.add_rect(rect, PathDirection::Cw);
        assert_eq!(
            builder.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Line, Verb::Close]
        );
        assert_eq!(
            builder.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(0.0, 5.0)
            ]
        );

        let mut builder = PathBuilder::new();
        builder.add_rect_with_start(rect, PathDirection::Ccw, 2);
        assert_eq!(
            builder.points(),
            &[
                Point::new(10.0, 5.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(0.0, 5.0)
            ]
        );
    }

    #[test]
    fn ovals_are_four_conics() {
        let oval = Rect::new(0.0, 0.0, 20.0, 10.0);
        let mut builder = PathBuilder::new();
        builder.add_oval(oval, PathDirection::Cw);

        assert_eq!(
            builder.verbs(),
            &[
                Verb::Move,
                Verb::Conic,
                Verb::Conic,
                Verb::Conic,
                Verb::Conic,
                Verb::Close
            ]
        );
        assert_eq!(builder.conic_weights(), &[QUARTER_CIRCLE_WEIGHT; 4]);
        assert_eq!(builder.points()[0], Point::new(20.0, 5.0));
        assert_eq!(builder.points()[1], Point::new(20.0, 10.0));
        assert_eq!(builder.points()[2], Point::new(10.0, 10.0));
        assert_eq!(builder.compute_bounds(), oval);

        assert_eq!(
            builder.shape,
            Some(ShapeInfo::Oval(OvalInfo {
                bounds: oval,
                direction: PathDirection::Cw,
                start: 1
            }))
        );
    }

    #[test]
    fn counter_clockwise_ovals() {
        let oval = Rect::new(-1.0, -1.0, 1.0, 1.0);
        let mut builder = PathBuilder::new();
        builder.add_oval_with_start(oval, PathDirection::Ccw, 0);

        assert_eq!(builder.points()[0], Point::new(0.0, -1.0));
        assert_eq!(builder.points()[1], Point::new(-1.0, -1.0));
        assert_eq!(builder.points()[2], Point::new(-1.0, 0.0));
    }

    #[test]
    fn shapes_are_only_recorded_on_blank_builders() {
        let oval = Rect::new(0.0, 0.0, 4.0, 4.0);

        let mut builder = PathBuilder::new();
        builder.move_to((100.0, 100.0)).add_oval(oval, PathDirection::Cw);
        assert!(builder.shape.is_some());
        assert_eq!(builder.verbs()[0], Verb::Move);
        assert_eq!(builder.verbs().len(), 6);

        let mut builder = PathBuilder::new();
        builder.move_to((0.0, 0.0)).line_to((1.0, 1.0));
        builder.add_oval(oval, PathDirection::Cw);
        assert!(builder.shape.is_none());

        let mut builder = PathBuilder::new();
        builder.add_oval(oval, PathDirection::Cw).line_to((9.0, 9.0));
        assert!(builder.shape.is_none());
    }

    #[test]
    fn rrect_falls_back_to_simpler_shapes() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

        let mut builder = PathBuilder::new();
        builder.add_rrect(RRect::from_rect(rect), PathDirection::Cw);
        assert_eq!(builder.verbs().len(), 5);
        assert!(builder.shape.is_none());
        // Start 6 collapses to the bottom-left corner.
        assert_eq!(builder.points()[0], Point::new(0.0, 10.0));

        let mut builder = PathBuilder::new();
        builder.add_rrect(RRect::from_oval(rect), PathDirection::Cw);
        assert!(matches!(builder.shape, Some(ShapeInfo::Oval(info)) if info.start == 3));
    }

    #[test]
    fn rrect_corners() {
        let rrect = RRect::from_rect_xy(Rect::new(0.0, 0.0, 20.0, 10.0), 2.0, 3.0);

        let mut builder = PathBuilder::new();
        builder.add_rrect_with_start(rrect, PathDirection::Cw, 0);
        // Starting on an edge: four lines and four conics.
        assert_eq!(builder.verbs().len(), 10);
        assert_eq!(builder.points()[0], Point::new(2.0, 0.0));
        assert_eq!(builder.points()[1], Point::new(18.0, 0.0));
        assert_eq!(builder.points()[2], Point::new(20.0, 0.0));
        assert_eq!(builder.points()[3], Point::new(20.0, 3.0));
        assert_eq!(
            builder.shape,
            Some(ShapeInfo::RRect(RRectInfo {
                rrect,
                direction: PathDirection::Cw,
                start: 0
            }))
        );

        let mut builder = PathBuilder::new();
        builder.add_rrect(rrect, PathDirection::Cw);
        assert_eq!(builder.verbs().len(), 10);
        assert_eq!(builder.points()[0], Point::new(0.0, 7.0));
        assert_eq!(builder.points()[1], Point::new(0.0, 3.0));
        assert_eq!(builder.points()[2], Point::new(0.0, 0.0));
        assert_eq!(builder.points()[3], Point::new(2.0, 0.0));
        assert_eq!(rrect.radii(Corner::LowerLeft), Vec2::new(2.0, 3.0));

        let mut builder = PathBuilder::new();
        builder.add_rrect_with_start(rrect, PathDirection::Cw, 7);
        // Starting at a corner: the final line is implied by the close.
        assert_eq!(builder.verbs().len(), 9);
        assert_eq!(builder.points()[0], Point::new(0.0, 3.0));
        assert_eq!(builder.points()[1], Point::new(0.0, 0.0));
        assert_eq!(builder.points()[2], Point::new(2.0, 0.0));

        let mut builder = PathBuilder::new();
        builder.add_rrect(rrect, PathDirection::Ccw);
        assert_eq!(builder.verbs().len(), 10);
        assert_eq!(builder.points()[0], Point::new(0.0, 3.0));
        assert_eq!(builder.points()[1], Point::new(0.0, 7.0));
        assert_eq!(builder.points()[2], Point::new(0.0, 10.0));
        assert_eq!(builder.points()[3], Point::new(2.0, 10.0));
    }

    #[test]
    fn circles() {
        let mut builder = PathBuilder::new();
        builder.add_circle((5.0, 5.0), 5.0, PathDirection::Cw);
        assert_eq!(builder.compute_bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));

        let mut builder = PathBuilder::new();
        builder.add_circle((5.0, 5.0), -1.0, PathDirection::Cw);
        assert!(builder.is_empty());
    }

    #[test]
    fn full_arcs_become_ovals() {
        let oval = Rect::new(0.0, 0.0, 10.0, 10.0);

        let mut builder = PathBuilder::new();
        builder.add_arc(oval, 90.0, 360.0);
        assert!(matches!(
            builder.shape,
            Some(ShapeInfo::Oval(OvalInfo { start: 2, direction: PathDirection::Cw, .. }))
        ));

        let mut builder = PathBuilder::new();
        builder.add_arc(oval, -90.0, -720.0);
        assert!(matches!(
            builder.shape,
            Some(ShapeInfo::Oval(OvalInfo { start: 0, direction: PathDirection::Ccw, .. }))
        ));

        let mut builder = PathBuilder::new();
        builder.add_arc(oval, 45.0, 360.0);
        assert!(builder.shape.is_none());
        assert_eq!(builder.conic_weights().len(), 4);
    }

    #[test]
    fn partial_arcs() {
        let oval = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut builder = PathBuilder::new();
        builder.add_arc(oval, 0.0, 180.0);

        assert_eq!(builder.verbs(), &[Verb::Move, Verb::Conic, Verb::Conic]);
        assert_near(builder.points()[0], Point::new(10.0, 5.0));
        assert_near(*builder.points().last().unwrap(), Point::new(0.0, 5.0));

        builder.arc_to(oval, 180.0, 90.0, false);
        // The arc continues from the last point without a joining line.
        assert_eq!(builder.verbs().len(), 4);

        let mut empty = PathBuilder::new();
        empty.add_arc(Rect::new(0.0, 0.0, 0.0, 10.0), 0.0, 90.0);
        empty.add_arc(oval, 0.0, 0.0);
        assert!(empty.is_empty());
    }

    #[test]
    fn lone_point_arcs() {
        let oval = Rect::new(0.0, 0.0, 10.0, 4.0);
        let mut builder = PathBuilder::new();
        builder.arc_to(oval, 0.0, 0.0, false);
        assert_eq!(builder.verbs(), &[Verb::Move]);
        assert_eq!(builder.points(), &[Point::new(10.0, 2.0)]);

        builder.arc_to(Rect::new(3.0, 3.0, 3.0, 3.0), 45.0, 90.0, false);
        assert_eq!(builder.verbs(), &[Verb::Move, Verb::Line]);
        assert_eq!(builder.points()[1], Point::new(3.0, 3.0));
    }

    #[test]
    fn tangent_arcs_round_corners() {
        let mut builder = PathBuilder::new();
        builder
            .move_to((0.0, 0.0))
            .arc_to_tangent((10.0, 0.0), (10.0, 10.0), 5.0);

        assert_eq!(builder.verbs(), &[Verb::Move, Verb::Line, Verb::Conic]);
        assert_near(builder.points()[1], Point::new(5.0, 0.0));
        assert_near(builder.points()[2], Point::new(10.0, 0.0));
        assert_near(builder.points()[3], Point::new(10.0, 5.0));
        assert!((builder.conic_weights()[0] - QUARTER_CIRCLE_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn degenerate_tangent_arcs_are_lines() {
        let mut builder = PathBuilder::new();
        builder.move_to((0.0, 0.0));
        builder.arc_to_tangent((5.0, 0.0), (10.0, 0.0), 3.0);
        builder.arc_to_tangent((5.0, 0.0), (5.0, 5.0), 3.0);
        builder.arc_to_tangent((6.0, 0.0), (6.0, 0.0), 3.0);
        builder.arc_to_tangent((7.0, 0.0), (7.0, 7.0), 0.0);

        assert_eq!(
            builder.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Line, Verb::Line]
        );
    }
}

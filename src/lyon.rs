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

//! Feeding paths to `lyon` tessellators.

use super::conic::MAX_QUADS;
use super::iter::{Segment, Segments};
use super::{ConvertOptions, Path};

use arrayvec::ArrayVec;
use kurbo::Point;
use lyon_tessellation::path::{Event, PathEvent};

fn convert_point(pt: Point) -> lyon_tessellation::path::geom::Point<f32> {
    let (x, y): (f64, f64) = pt.into();
    [x as f32, y as f32].into()
}

/// Turns segments into `lyon` path events, one batch per segment.
struct EventConverter<'a> {
    /// The segments left to convert.
    segments: Segments<'a>,

    /// The first point of the open subpath, if there is one.
    first: Option<Point>,

    /// The last point that we processed.
    last: Point,

    /// The tolerance for approximating conics.
    tolerance: f64,
}

impl EventConverter<'_> {
    /// End the open subpath, if there is one.
    fn end(&mut self, close: bool) -> Option<PathEvent> {
        self.first.take().map(|first| Event::End {
            last: convert_point(self.last),
            first: convert_point(first),
            close,
        })
    }

    /// Begin a subpath at the last point if a segment arrives without one.
    fn ensure_begun(&mut self, events: &mut ArrayVec<PathEvent, MAX_QUADS>) {
        if self.first.is_none() {
            self.first = Some(self.last);
            events.push(Event::Begin {
                at: convert_point(self.last),
            });
        }
    }
}

impl Iterator for EventConverter<'_> {
    type Item = ArrayVec<PathEvent, MAX_QUADS>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut events = ArrayVec::new();

        let segment = match self.segments.next() {
            Some(segment) => segment,
            None => {
                // Every subpath has to be ended.
                events.extend(self.end(false));
                return if events.is_empty() { None } else { Some(events) };
            }
        };

        match segment {
            Segment::Move(pt) => {
                events.extend(self.end(false));
                self.first = Some(pt);
                events.push(Event::Begin {
                    at: convert_point(pt),
                });
            }

            Segment::Line(line) => {
                self.ensure_begun(&mut events);
                events.push(Event::Line {
                    from: convert_point(line.p0),
                    to: convert_point(line.p1),
                });
            }

            Segment::Quad(quad) => {
                self.ensure_begun(&mut events);
                events.push(Event::Quadratic {
                    from: convert_point(quad.p0),
                    ctrl: convert_point(quad.p1),
                    to: convert_point(quad.p2),
                });
            }

            Segment::Conic(conic) => {
                self.ensure_begun(&mut events);
                let mut from = conic.points[0];
                for (ctrl, to) in conic.to_quads(self.tolerance) {
                    events.push(Event::Quadratic {
                        from: convert_point(from),
                        ctrl: convert_point(ctrl),
                        to: convert_point(to),
                    });
                    from = to;
                }
            }

            Segment::Cubic(cubic) => {
                self.ensure_begun(&mut events);
                events.push(Event::Cubic {
                    from: convert_point(cubic.p0),
                    ctrl1: convert_point(cubic.p1),
                    ctrl2: convert_point(cubic.p2),
                    to: convert_point(cubic.p3),
                });
            }

            Segment::Close(_) => events.extend(self.end(true)),
        }

        self.last = segment.end();
        Some(events)
    }
}

impl Path {
    /// The path as a stream of `lyon` path events, ready for tessellation.
    ///
    /// Conics are replaced by quadratic curves within the tolerance of `options`.
    pub fn lyon_events(&self, options: ConvertOptions) -> impl Iterator<Item = PathEvent> + '_ {
        EventConverter {
            segments: self.segments(),
            first: None,
            last: Point::ORIGIN,
            tolerance: options.tolerance,
        }
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathBuilder, PathDirection};
    use kurbo::Rect;

    #[test]
    fn every_subpath_is_ended() {
        let mut builder = PathBuilder::new();
        builder
            .move_to((0.0, 0.0))
            .line_to((1.0, 0.0))
            .move_to((5.0, 5.0))
            .line_to((6.0, 5.0))
            .close();
        let path = builder.detach();

        let events: Vec<_> = path.lyon_events(ConvertOptions::default()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], Event::Begin { .. }));
        assert!(matches!(events[2], Event::End { close: false, .. }));
        assert!(matches!(events[3], Event::Begin { .. }));
        assert!(matches!(events[5], Event::End { close: true, .. }));
    }

    #[test]
    fn conics_become_quadratics() {
        let mut builder = PathBuilder::new();
        builder.add_oval(Rect::new(0.0, 0.0, 100.0, 100.0), PathDirection::Cw);
        let path = builder.detach();

        let events: Vec<_> = path.lyon_events(ConvertOptions::default()).collect();
        assert!(matches!(events.first(), Some(Event::Begin { .. })));
        assert!(matches!(events.last(), Some(Event::End { close: true, .. })));
        assert!(events[1..events.len() - 1]
            .iter()
            .all(|event| matches!(event, Event::Quadratic { .. })));
    }

    #[test]
    fn raw_segments_after_close_begin_a_subpath() {
        use crate::{FillType, Verb};

        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let path = Path::try_from_raw(
            &points,
            &[Verb::Move, Verb::Line, Verb::Close, Verb::Line],
            &[],
            FillType::Winding,
        )
        .unwrap();

        let events: Vec<_> = path.lyon_events(ConvertOptions::default()).collect();
        assert_eq!(events.len(), 6);
        match events[3] {
            Event::Begin { at } => assert_eq!((at.x, at.y), (0.0, 0.0)),
            other => panic!("unexpected event {:?}", other),
        }
    }
}

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

//! Converting paths for the `tiny-skia` rasterizer.

use super::iter::Segment;
use super::{ConvertOptions, FillType, Path};

impl Path {
    /// Convert this path into a `tiny-skia` path.
    ///
    /// Returns `None` if the path is empty or `tiny-skia` rejects it, for instance because
    /// it doesn't cover any area.
    pub fn to_tiny_skia(&self, options: ConvertOptions) -> Option<tiny_skia::Path> {
        let mut builder = tiny_skia::PathBuilder::with_capacity(
            self.verbs().len(),
            self.points().len(),
        );

        for segment in self.segments() {
            match segment {
                Segment::Move(pt) => builder.move_to(pt.x as f32, pt.y as f32),
                Segment::Line(line) => builder.line_to(line.p1.x as f32, line.p1.y as f32),
                Segment::Quad(quad) => builder.quad_to(
                    quad.p1.x as f32,
                    quad.p1.y as f32,
                    quad.p2.x as f32,
                    quad.p2.y as f32,
                ),
                Segment::Conic(conic) => {
                    for (ctrl, end) in conic.to_quads(options.tolerance) {
                        builder.quad_to(ctrl.x as f32, ctrl.y as f32, end.x as f32, end.y as f32);
                    }
                }
                Segment::Cubic(cubic) => builder.cubic_to(
                    cubic.p1.x as f32,
                    cubic.p1.y as f32,
                    cubic.p2.x as f32,
                    cubic.p2.y as f32,
                    cubic.p3.x as f32,
                    cubic.p3.y as f32,
                ),
                Segment::Close(_) => builder.close(),
            }
        }

        builder.finish()
    }

    /// The `tiny-skia` fill rule for this path.
    ///
    /// `tiny-skia` has no inverse fill rules, so inverse fills map to their regular form.
    pub fn tiny_skia_fill_rule(&self) -> tiny_skia::FillRule {
        match self.fill_type().base() {
            FillType::EvenOdd => tiny_skia::FillRule::EvenOdd,
            _ => tiny_skia::FillRule::Winding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathBuilder, PathDirection};
    use kurbo::Rect;

    #[test]
    fn rects_convert() {
        let mut builder = PathBuilder::with_fill_type(FillType::InverseEvenOdd);
        builder.add_rect(Rect::new(1.0, 2.0, 11.0, 12.0), PathDirection::Cw);
        let path = builder.detach();

        let converted = path.to_tiny_skia(ConvertOptions::default()).unwrap();
        let bounds = converted.bounds();
        assert_eq!(
            (bounds.left(), bounds.top(), bounds.right(), bounds.bottom()),
            (1.0, 2.0, 11.0, 12.0)
        );
        assert_eq!(path.tiny_skia_fill_rule(), tiny_skia::FillRule::EvenOdd);
    }

    #[test]
    fn ovals_convert() {
        let mut builder = PathBuilder::new();
        builder.add_oval(Rect::new(0.0, 0.0, 8.0, 4.0), PathDirection::Cw);
        let path = builder.detach();

        let converted = path.to_tiny_skia(ConvertOptions::default()).unwrap();
        assert!(converted.len() > 5);
    }

    #[test]
    fn empty_paths_do_not_convert() {
        assert!(Path::new().to_tiny_skia(ConvertOptions::default()).is_none());
    }
}

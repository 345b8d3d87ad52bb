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

//! Exclusive, copy-on-write access to a shared geometry.

use super::geometry::{ArcInfo, Bounds, OvalInfo, RRectInfo, ShapeInfo, SharedGeometry};
use super::Verb;

use kurbo::{Point, Rect};

use std::sync::Arc;

/// The only way to change the contents of a [`SharedGeometry`].
///
/// Creating an editor over a geometry that is shared with anyone else first replaces the
/// slot with a private copy, so other holders never see the change. Every editor starts by
/// invalidating the cached bounds, identity and shape classification.
///
/// The appenders trust their caller. The verb sequence is checked when the editor is
/// dropped, in debug builds only.
#[derive(Debug)]
pub struct GeometryEditor<'a> {
    /// The geometry being edited.
    geometry: &'a mut SharedGeometry,

    /// Whether verbs were rewritten in place, so the segment mask is stale.
    verbs_rewritten: bool,
}

impl<'a> GeometryEditor<'a> {
    /// Start editing the geometry in `slot`.
    pub fn new(slot: &'a mut Arc<SharedGeometry>) -> Self {
        Self::with_reserve(slot, 0, 0, 0)
    }

    /// Start editing the geometry in `slot`, leaving room for more data.
    pub fn with_reserve(
        slot: &'a mut Arc<SharedGeometry>,
        extra_verbs: usize,
        extra_points: usize,
        extra_conics: usize,
    ) -> Self {
        let forked = Arc::get_mut(slot).is_none();
        if forked {
            tracing::trace!(
                verbs = slot.verbs().len(),
                points = slot.points().len(),
                "forking shared geometry for editing"
            );

            // The old geometry keeps its identity for whoever else holds it.
            *slot = Arc::new(slot.fork(extra_verbs, extra_points, extra_conics));
        }

        let geometry = Arc::get_mut(slot).expect("geometry is uniquely owned after forking");
        if !forked {
            // Nobody else can observe the old contents, so the identity ends here.
            geometry.retire_identity();
            geometry
                .buffer_mut()
                .reserve(extra_points, extra_verbs, extra_conics);
        }

        geometry.invalidate();

        #[cfg(debug_assertions)]
        geometry.attach_editor();

        Self {
            geometry,
            verbs_rewritten: false,
        }
    }

    /// The geometry being edited.
    #[inline]
    pub fn geometry(&self) -> &SharedGeometry {
        self.geometry
    }

    /// Append a verb and return its points, ready to be written.
    pub fn grow_for_verb(&mut self, verb: Verb, weight: f64) -> &mut [Point] {
        self.geometry.buffer_mut().grow_for_verb(verb, weight)
    }

    /// Append `count` copies of a verb, returning the new points and conic weights.
    pub fn grow_for_repeated_verb(&mut self, verb: Verb, count: usize) -> (&mut [Point], &mut [f64]) {
        self.geometry
            .buffer_mut()
            .grow_for_repeated_verb(verb, count)
    }

    /// Append every verb of `other`, returning a copy of its points to adjust.
    pub fn grow_for_verbs_in(&mut self, other: &SharedGeometry) -> &mut [Point] {
        self.geometry.buffer_mut().grow_for_verbs_in(other.buffer())
    }

    /// Discard the contents and resize to exactly these counts.
    ///
    /// Every entry must be overwritten through [`GeometryEditor::verbs_mut`],
    /// [`GeometryEditor::points_mut`] and [`GeometryEditor::conic_weights_mut`].
    pub fn reset_to_size(&mut self, verb_count: usize, point_count: usize, conic_count: usize) {
        self.geometry
            .buffer_mut()
            .reset_to_size(verb_count, point_count, conic_count);
        self.verbs_rewritten = true;
    }

    /// Mutable access to the points.
    #[inline]
    pub fn points_mut(&mut self) -> &mut [Point] {
        self.geometry.buffer_mut().points_mut()
    }

    /// Mutable access to the verbs.
    #[inline]
    pub fn verbs_mut(&mut self) -> &mut [Verb] {
        self.verbs_rewritten = true;
        self.geometry.buffer_mut().verbs_mut()
    }

    /// Mutable access to the conic weights.
    #[inline]
    pub fn conic_weights_mut(&mut self) -> &mut [f64] {
        self.geometry.buffer_mut().conic_weights_mut()
    }

    /// Record that the geometry is an oval.
    ///
    /// The caller must have built exactly that oval.
    pub fn set_is_oval(&mut self, info: OvalInfo) {
        #[cfg(debug_assertions)]
        debug_assert!(
            verify::on_ellipse(self.geometry.points(), self.geometry.verbs(), info.bounds, false),
            "geometry claimed to be an oval is not one: {:?}",
            info
        );

        self.geometry.set_shape(ShapeInfo::Oval(info));
    }

    /// Record that the geometry is a rounded rectangle.
    ///
    /// The caller must have built exactly that rounded rectangle.
    pub fn set_is_rrect(&mut self, info: RRectInfo) {
        #[cfg(debug_assertions)]
        debug_assert!(
            verify::on_rect_boundary(
                self.geometry.points(),
                self.geometry.verbs(),
                info.rrect.rect()
            ),
            "geometry claimed to be a rounded rectangle is not one: {:?}",
            info
        );

        self.geometry.set_shape(ShapeInfo::RRect(info));
    }

    /// Record that the geometry is an arc.
    ///
    /// The caller must have built exactly that arc.
    pub fn set_is_arc(&mut self, info: ArcInfo) {
        #[cfg(debug_assertions)]
        debug_assert!(
            verify::on_ellipse(self.geometry.points(), self.geometry.verbs(), info.oval, true),
            "geometry claimed to be an arc is not one: {:?}",
            info
        );

        self.geometry.set_shape(ShapeInfo::Arc(info));
    }

    /// Record whichever classification `shape` holds.
    pub(crate) fn set_shape(&mut self, shape: ShapeInfo) {
        match shape {
            ShapeInfo::Oval(info) => self.set_is_oval(info),
            ShapeInfo::RRect(info) => self.set_is_rrect(info),
            ShapeInfo::Arc(info) => self.set_is_arc(info),
        }
    }

    /// Supply known bounds so they don't have to be computed.
    ///
    /// The rectangle must be sorted and cover every point.
    pub fn set_bounds(&mut self, rect: Rect) {
        debug_assert!(rect.x0 <= rect.x1 && rect.y0 <= rect.y1, "unsorted bounds {:?}", rect);

        let is_finite =
            rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite();
        self.geometry.set_bounds(Bounds { rect, is_finite });
    }
}

impl Drop for GeometryEditor<'_> {
    fn drop(&mut self) {
        if self.verbs_rewritten {
            self.geometry.buffer_mut().recompute_segment_mask();
        }

        if !std::thread::panicking() {
            debug_assert!(
                self.geometry.buffer().is_valid(),
                "editor left an invalid geometry behind"
            );
        }

        #[cfg(debug_assertions)]
        self.geometry.detach_editor();
    }
}

/// Debug checks for shape classification claims.
#[cfg(debug_assertions)]
mod verify {
    use super::super::Verb;
    use kurbo::{Point, Rect};

    /// The points verbs end on, skipping control points.
    fn end_points<'a>(points: &'a [Point], verbs: &'a [Verb]) -> impl Iterator<Item = Point> + 'a {
        let mut cursor = 0;
        verbs.iter().filter_map(move |verb| {
            let count = verb.point_count();
            cursor += count;
            match count {
                0 => None,
                _ => points.get(cursor - 1).copied(),
            }
        })
    }

    fn is_finite(rect: Rect) -> bool {
        rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite()
    }

    /// Every end point lies on the ellipse inscribed in `oval`, or at its center.
    pub(super) fn on_ellipse(points: &[Point], verbs: &[Verb], oval: Rect, allow_center: bool) -> bool {
        let (rx, ry) = (oval.width() / 2.0, oval.height() / 2.0);
        if !is_finite(oval) || rx <= 0.0 || ry <= 0.0 {
            return true;
        }

        let center = oval.center();
        end_points(points, verbs).all(|pt| {
            let (dx, dy) = ((pt.x - center.x) / rx, (pt.y - center.y) / ry);
            let on_curve = (dx * dx + dy * dy - 1.0).abs() <= 1e-3;
            on_curve || (allow_center && dx.abs() <= 1e-6 && dy.abs() <= 1e-6)
        })
    }

    /// Every end point lies on an edge of `rect`.
    pub(super) fn on_rect_boundary(points: &[Point], verbs: &[Verb], rect: Rect) -> bool {
        if !is_finite(rect) {
            return true;
        }

        let tolerance = 1e-6 * (1.0 + rect.width().max(rect.height()));
        end_points(points, verbs).all(|pt| {
            let inside = pt.x >= rect.x0 - tolerance
                && pt.x <= rect.x1 + tolerance
                && pt.y >= rect.y0 - tolerance
                && pt.y <= rect.y1 + tolerance;
            let edge = (pt.x - rect.x0)
                .abs()
                .min((pt.x - rect.x1).abs())
                .min((pt.y - rect.y0).abs())
                .min((pt.y - rect.y1).abs());
            inside && edge <= tolerance
        })
    }
}

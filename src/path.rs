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

//! The user-facing path value.

use super::geometry::{ArcInfo, ArcKind, OvalInfo, RRectInfo, ShapeInfo, SharedGeometry};
use super::iter::Segments;
use super::listener::{ChangeListener, GenerationId, Subscription};
use super::{
    Convexity, FillType, GeometryBuffer, GeometryEditor, PathBuilder, PathDirection, PathError,
    SegmentMask, Verb,
};

use kurbo::{Affine, Point, Rect, Vec2};

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// A 2D path.
///
/// Cloning a path is cheap: the clone shares its geometry until one of the two is edited.
#[derive(Debug)]
pub struct Path {
    /// The points, verbs and weights, possibly shared with other paths.
    geometry: Arc<SharedGeometry>,

    /// The fill rule.
    fill_type: FillType,

    /// Whether this path is expected to change often.
    is_volatile: bool,

    /// The cached [`Convexity`].
    convexity: AtomicU8,
}

impl Clone for Path {
    fn clone(&self) -> Self {
        Self {
            geometry: self.geometry.clone(),
            fill_type: self.fill_type,
            is_volatile: self.is_volatile,
            convexity: AtomicU8::new(self.convexity.load(Ordering::Relaxed)),
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Path {
    pub(crate) fn from_geometry(
        geometry: Arc<SharedGeometry>,
        fill_type: FillType,
        is_volatile: bool,
        convexity: Convexity,
    ) -> Self {
        Self {
            geometry,
            fill_type,
            is_volatile,
            convexity: AtomicU8::new(convexity as u8),
        }
    }

    /// An empty path.
    ///
    /// Every empty path shares one geometry, so this never allocates.
    pub fn new() -> Self {
        Self::from_geometry(
            SharedGeometry::empty(),
            FillType::Winding,
            false,
            Convexity::Unknown,
        )
    }

    /// This path with a different fill type.
    pub fn with_fill_type(mut self, fill_type: FillType) -> Self {
        self.fill_type = fill_type;
        self
    }

    /// This path with a different volatility.
    pub fn with_volatile(mut self, is_volatile: bool) -> Self {
        self.is_volatile = is_volatile;
        self
    }

    /// Build a path from raw points, verbs and conic weights.
    ///
    /// The verbs must start with a move and consume exactly the points and weights supplied.
    /// The path is not volatile; use [`Path::with_volatile`] to mark it otherwise.
    pub fn try_from_raw(
        points: &[Point],
        verbs: &[Verb],
        conic_weights: &[f64],
        fill_type: FillType,
    ) -> Result<Path, PathError> {
        super::error::validate(verbs, points.len(), conic_weights.len())?;
        if verbs.is_empty() {
            return Ok(Path::new().with_fill_type(fill_type));
        }

        let mut geometry = SharedGeometry::empty();
        {
            let mut editor = GeometryEditor::new(&mut geometry);
            editor.reset_to_size(verbs.len(), points.len(), conic_weights.len());
            editor.verbs_mut().copy_from_slice(verbs);
            editor.points_mut().copy_from_slice(points);
            editor.conic_weights_mut().copy_from_slice(conic_weights);
        }

        Ok(Path::from_geometry(
            geometry,
            fill_type,
            false,
            Convexity::Unknown,
        ))
    }

    /// Build a path from owned raw data without copying it.
    pub fn try_from_vecs(
        points: Vec<Point>,
        verbs: Vec<Verb>,
        conic_weights: Vec<f64>,
        fill_type: FillType,
    ) -> Result<Path, PathError> {
        super::error::validate(&verbs, points.len(), conic_weights.len())?;
        if verbs.is_empty() {
            return Ok(Path::new().with_fill_type(fill_type));
        }

        let buffer = GeometryBuffer::from_parts(points, verbs, conic_weights);
        Ok(Path::from_geometry(
            Arc::new(SharedGeometry::from_buffer(buffer)),
            fill_type,
            false,
            Convexity::Unknown,
        ))
    }

    /// Build a path from raw data with verbs encoded as bytes.
    pub fn try_from_raw_bytes(
        points: &[Point],
        verb_bytes: &[u8],
        conic_weights: &[f64],
        fill_type: FillType,
    ) -> Result<Path, PathError> {
        let verbs = verb_bytes
            .iter()
            .map(|&tag| Verb::try_from(tag))
            .collect::<Result<Vec<_>, _>>()?;

        Self::try_from_vecs(points.to_vec(), verbs, conic_weights.to_vec(), fill_type)
    }

    /// Build a path from raw data, falling back to an empty path if it is malformed.
    ///
    /// Like [`Path::try_from_raw`], the result is not volatile until [`Path::with_volatile`]
    /// says so.
    pub fn from_raw(
        points: &[Point],
        verbs: &[Verb],
        conic_weights: &[f64],
        fill_type: FillType,
    ) -> Path {
        match Self::try_from_raw(points, verbs, conic_weights, fill_type) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!("rejecting raw path data: {}", err);
                Path::new()
            }
        }
    }

    /// The geometry this path shares.
    #[inline]
    pub fn geometry(&self) -> &Arc<SharedGeometry> {
        &self.geometry
    }

    /// The points, in traversal order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        self.geometry.points()
    }

    /// The verbs, in traversal order.
    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        self.geometry.verbs()
    }

    /// The verbs as their byte tags.
    pub fn verb_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.geometry.verbs())
    }

    /// The conic weights, one per conic verb.
    #[inline]
    pub fn conic_weights(&self) -> &[f64] {
        self.geometry.conic_weights()
    }

    /// Whether the path holds no verbs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    /// The last point of the path.
    pub fn last_point(&self) -> Option<Point> {
        self.geometry.buffer().last_point()
    }

    /// The kinds of segment in the path.
    #[inline]
    pub fn segment_mask(&self) -> SegmentMask {
        self.geometry.segment_mask()
    }

    /// The tight bounds over every point, including control points.
    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    /// Whether every point is finite.
    pub fn is_finite(&self) -> bool {
        self.geometry.is_finite()
    }

    /// The oval this path was built as, if any.
    pub fn is_oval(&self) -> Option<OvalInfo> {
        self.geometry.is_oval()
    }

    /// The rounded rectangle this path was built as, if any.
    pub fn is_rrect(&self) -> Option<RRectInfo> {
        self.geometry.is_rrect()
    }

    /// The arc this path was built as, if any.
    pub fn is_arc(&self) -> Option<ArcInfo> {
        self.geometry.is_arc()
    }

    /// The generation ID of the geometry, with the fill type folded in.
    pub fn gen_id(&self) -> u32 {
        self.geometry.gen_id(self.fill_type)
    }

    /// The identity of the geometry, regardless of fill type.
    pub fn geometry_id(&self) -> GenerationId {
        self.geometry.generation_id()
    }

    /// Register `listener` to be told when the current geometry identity is retired.
    pub fn add_change_listener(&self, listener: impl ChangeListener) -> Subscription {
        self.geometry.add_change_listener(listener)
    }

    /// Start editing the geometry of this path, forking it if it is shared.
    pub fn edit(&mut self) -> GeometryEditor<'_> {
        self.edit_with_reserve(0, 0, 0)
    }

    /// Start editing, leaving room for more data.
    pub fn edit_with_reserve(
        &mut self,
        extra_verbs: usize,
        extra_points: usize,
        extra_conics: usize,
    ) -> GeometryEditor<'_> {
        *self.convexity.get_mut() = Convexity::Unknown as u8;
        GeometryEditor::with_reserve(&mut self.geometry, extra_verbs, extra_points, extra_conics)
    }

    /// Move every point by `offset`.
    ///
    /// Shape classification and convexity survive the move.
    pub fn offset(&mut self, offset: Vec2) {
        if self.is_empty() {
            return;
        }

        let shape = self.geometry.shape();
        let convexity = *self.convexity.get_mut();
        {
            let mut editor = self.edit();
            for pt in editor.points_mut() {
                *pt += offset;
            }
            if let Some(shape) = shape {
                editor.set_shape(shape.translated(offset));
            }
        }
        *self.convexity.get_mut() = convexity;
    }

    /// Map every point through `transform`.
    pub fn transform(&mut self, transform: Affine) {
        if self.is_empty() {
            return;
        }

        for pt in self.edit().points_mut() {
            *pt = transform * *pt;
        }
    }

    /// A copy of this path mapped through `transform`.
    pub fn transformed(&self, transform: Affine) -> Path {
        let mut path = self.clone();
        path.transform(transform);
        path
    }

    /// The fill rule.
    #[inline]
    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    /// Change the fill rule.
    ///
    /// The geometry is untouched, so the geometry identity stays the same.
    pub fn set_fill_type(&mut self, fill_type: FillType) {
        self.fill_type = fill_type;
    }

    /// Flip between the inverse and regular form of the fill rule.
    pub fn toggle_inverse_fill_type(&mut self) {
        self.fill_type = self.fill_type.toggle_inverse();
    }

    /// Whether this path is expected to change often.
    #[inline]
    pub fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    /// Mark this path as volatile, meaning it shouldn't be used as a cache key.
    pub fn set_is_volatile(&mut self, is_volatile: bool) {
        self.is_volatile = is_volatile;
    }

    /// Clear the path, releasing its geometry.
    pub fn reset(&mut self) {
        *self = Path::new();
    }

    /// Clear the path, keeping its allocation if it isn't shared.
    pub fn rewind(&mut self) {
        match Arc::get_mut(&mut self.geometry) {
            Some(geometry) => geometry.reset(),
            None => self.geometry = SharedGeometry::empty(),
        }

        self.fill_type = FillType::Winding;
        self.is_volatile = false;
        *self.convexity.get_mut() = Convexity::Unknown as u8;
    }

    /// Whether the path is a single convex contour, computing it if needed.
    pub fn convexity(&self) -> Convexity {
        match Convexity::from_u8(self.convexity.load(Ordering::Relaxed)) {
            Convexity::Unknown => {
                let convexity = Convexity::compute(self.geometry.buffer());
                self.convexity.store(convexity as u8, Ordering::Relaxed);
                convexity
            }
            known => known,
        }
    }

    /// Whether the path is a single convex contour.
    pub fn is_convex(&self) -> bool {
        self.convexity() == Convexity::Convex
    }

    /// Iterate over the segments of the path.
    pub fn segments(&self) -> Segments<'_> {
        Segments::new(self.geometry.buffer())
    }

    /// Build the path for drawing an arc of the oval inscribed in `arc.oval`.
    ///
    /// Sweeps of more than ten turns are reduced. If the path will be filled without any
    /// effects applied, sweeps of a full turn or more become the whole oval. The path is
    /// classified as the arc it draws.
    pub fn arc(arc: ArcInfo, fill_without_effects: bool) -> Path {
        let ArcInfo {
            oval,
            start_angle,
            mut sweep_angle,
            kind,
        } = arc;
        if !(oval.x0 < oval.x1 && oval.y0 < oval.y1) || sweep_angle == 0.0 {
            return Path::new();
        }

        if sweep_angle.abs() > 3600.0 {
            sweep_angle = 3600f64.copysign(sweep_angle) + sweep_angle % 360.0;
        }

        let mut builder = PathBuilder::new();
        builder.set_is_volatile(true);

        if fill_without_effects && sweep_angle.abs() >= 360.0 {
            builder.add_oval(oval, PathDirection::Cw);
            return builder.detach();
        }

        let is_wedge = kind == ArcKind::Wedge;
        let convex = if is_wedge {
            sweep_angle.abs() <= 180.0
        } else {
            sweep_angle.abs() <= 360.0
        };

        if is_wedge {
            builder.move_to(oval.center());
        }

        // Building a full turn at a time keeps the sweep from wrapping around.
        let mut force_move = !is_wedge;
        let mut start = start_angle;
        let mut remaining = sweep_angle;
        let half_turn = 180f64.copysign(sweep_angle);
        while remaining.abs() >= 360.0 {
            builder.arc_to(oval, start, half_turn, force_move);
            start += half_turn;
            builder.arc_to(oval, start, half_turn, false);
            start += half_turn;
            force_move = false;
            remaining -= 2.0 * half_turn;
        }
        builder.arc_to(oval, start, remaining, force_move);

        if is_wedge {
            builder.close();
        }

        builder.shape = Some(ShapeInfo::Arc(ArcInfo {
            oval,
            start_angle,
            sweep_angle,
            kind,
        }));

        let path = builder.detach();
        let convexity = if convex {
            Convexity::Convex
        } else {
            Convexity::Concave
        };
        path.convexity.store(convexity as u8, Ordering::Relaxed);
        path
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.fill_type == other.fill_type
            && (Arc::ptr_eq(&self.geometry, &other.geometry) || *self.geometry == *other.geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn square() -> Path {
        let mut builder = PathBuilder::new();
        builder.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
        builder.detach()
    }

    #[test]
    fn empty_paths_share_geometry() {
        let a = Path::new();
        let b = Path::default();
        assert!(Arc::ptr_eq(a.geometry(), b.geometry()));
        assert!(a.is_empty());
        assert_eq!(a.bounds(), Rect::ZERO);
        assert_eq!(a, b);
    }

    #[test]
    fn raw_paths_start_out_non_volatile() {
        let points = [Point::new(0.0, 0.0), Point::new(4.0, 4.0)];
        let verbs = [Verb::Move, Verb::Line];

        let path = Path::from_raw(&points, &verbs, &[], FillType::EvenOdd);
        assert!(!path.is_volatile());

        let volatile = Path::try_from_raw(&points, &verbs, &[], FillType::EvenOdd)
            .unwrap()
            .with_volatile(true);
        assert!(volatile.is_volatile());
        assert_eq!(volatile.fill_type(), FillType::EvenOdd);
        assert_eq!(volatile.points(), &points);
    }

    #[test]
    fn raw_paths_are_validated() {
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let path =
            Path::try_from_raw(&points, &[Verb::Move, Verb::Line], &[], FillType::EvenOdd).unwrap();
        assert_eq!(path.points(), &points);
        assert_eq!(path.fill_type(), FillType::EvenOdd);
        assert!(path.segment_mask().contains(SegmentMask::LINE));

        assert_eq!(
            Path::try_from_raw(&points, &[Verb::Line, Verb::Line], &[], FillType::Winding),
            Err(PathError::MissingInitialMove(Verb::Line))
        );

        let fallback = Path::from_raw(&points, &[Verb::Move], &[], FillType::Winding);
        assert!(fallback.is_empty());
    }

    #[test]
    fn raw_bytes_are_decoded() {
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let path =
            Path::try_from_raw_bytes(&points, &[0, 3, 5], &[0.5], FillType::Winding).unwrap();
        assert_eq!(path.verbs(), &[Verb::Move, Verb::Conic, Verb::Close]);
        assert_eq!(path.verb_bytes(), &[0, 3, 5]);

        assert_eq!(
            Path::try_from_raw_bytes(&points, &[0, 9], &[], FillType::Winding),
            Err(PathError::InvalidVerbTag(9))
        );
    }

    #[test]
    fn fill_type_changes_gen_id_but_not_geometry_id() {
        let mut path = square();
        let (gen_id, geometry_id) = (path.gen_id(), path.geometry_id());

        path.set_fill_type(FillType::InverseWinding);
        assert_ne!(path.gen_id(), gen_id);
        assert_eq!(path.geometry_id(), geometry_id);

        path.toggle_inverse_fill_type();
        assert_eq!(path.gen_id(), gen_id);
    }

    #[test]
    fn offset_keeps_classification() {
        let mut builder = PathBuilder::new();
        builder.add_oval(Rect::new(0.0, 0.0, 2.0, 2.0), PathDirection::Ccw);
        let mut path = builder.detach();
        assert_eq!(path.convexity(), Convexity::Convex);

        path.offset(Vec2::new(3.0, 4.0));
        let info = path.is_oval().unwrap();
        assert_eq!(info.bounds, Rect::new(3.0, 4.0, 5.0, 6.0));
        assert_eq!(info.direction, PathDirection::Ccw);
        assert_eq!(path.bounds(), Rect::new(3.0, 4.0, 5.0, 6.0));
        assert_eq!(path.convexity(), Convexity::Convex);
    }

    #[test]
    fn transform_drops_classification() {
        let mut builder = PathBuilder::new();
        builder.add_oval(Rect::new(0.0, 0.0, 2.0, 2.0), PathDirection::Cw);
        let path = builder.detach();

        let scaled = path.transformed(Affine::scale(2.0));
        assert!(scaled.is_oval().is_none());
        assert!(path.is_oval().is_some());
        assert_eq!(scaled.bounds(), Rect::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn rewind_reuses_unique_geometry() {
        let mut path = square();
        let before = Arc::as_ptr(path.geometry());
        path.rewind();
        assert!(path.is_empty());
        assert_eq!(Arc::as_ptr(path.geometry()), before);

        let mut shared = square();
        let _other = shared.clone();
        shared.rewind();
        assert!(Arc::ptr_eq(shared.geometry(), Path::new().geometry()));
    }

    #[test]
    fn reset_notifies_listeners() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut path = square();
        let _sub = path.add_change_listener({
            let count = count.clone();
            move |_: GenerationId| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        path.reset();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(path.is_empty());
    }

    #[test]
    fn convexity_is_cached_and_reset_by_edits() {
        let mut path = square();
        assert!(path.is_convex());

        {
            let mut editor = path.edit();
            editor.points_mut()[2] = Point::new(2.0, 2.0);
        }
        assert_eq!(path.convexity.load(Ordering::Relaxed), Convexity::Unknown as u8);
        assert_eq!(path.convexity(), Convexity::Concave);
    }

    #[test]
    fn open_arcs() {
        let oval = Rect::new(0.0, 0.0, 10.0, 10.0);
        let info = ArcInfo {
            oval,
            start_angle: 0.0,
            sweep_angle: 90.0,
            kind: ArcKind::Open,
        };
        let path = Path::arc(info, false);

        assert_eq!(path.verbs(), &[Verb::Move, Verb::Conic]);
        assert_eq!(path.is_arc(), Some(info));
        assert!(path.is_volatile());
        assert!(path.is_convex());
    }

    #[test]
    fn wedges() {
        let oval = Rect::new(0.0, 0.0, 10.0, 10.0);
        let path = Path::arc(
            ArcInfo {
                oval,
                start_angle: 0.0,
                sweep_angle: 270.0,
                kind: ArcKind::Wedge,
            },
            false,
        );

        assert_eq!(path.verbs()[0], Verb::Move);
        assert_eq!(path.points()[0], Point::new(5.0, 5.0));
        assert_eq!(path.verbs()[1], Verb::Line);
        assert_eq!(path.verbs().last(), Some(&Verb::Close));
        assert_eq!(path.convexity(), Convexity::Concave);
        assert!(path.is_arc().is_some());
    }

    #[test]
    fn full_arcs() {
        let oval = Rect::new(0.0, 0.0, 10.0, 10.0);
        let info = ArcInfo {
            oval,
            start_angle: 30.0,
            sweep_angle: 720.0,
            kind: ArcKind::Open,
        };

        let filled = Path::arc(info, true);
        assert!(filled.is_oval().is_some());

        let stroked = Path::arc(info, false);
        assert!(stroked.is_arc().is_some());
        assert_eq!(stroked.verbs()[0], Verb::Move);
        assert!(stroked.verbs()[1..].iter().all(|verb| *verb == Verb::Conic));

        let huge = Path::arc(
            ArcInfo {
                sweep_angle: -100_000.0,
                ..info
            },
            false,
        );
        let sweep = huge.is_arc().unwrap().sweep_angle;
        assert_eq!(sweep, -3600.0 + (-100_000.0f64 % 360.0));

        let nothing = Path::arc(
            ArcInfo {
                sweep_angle: 0.0,
                ..info
            },
            false,
        );
        assert!(nothing.is_empty());
    }
}

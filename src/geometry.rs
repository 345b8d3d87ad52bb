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

//! Shared, immutable path geometry with a lazily assigned identity.

use super::listener::{ChangeListener, GenerationId, ListenerRegistry, Subscription};
use super::{FillType, GeometryBuffer, PathDirection, RRect, SegmentMask, Verb};

use kurbo::{Point, Rect, Vec2};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// The number of low bits of a generation ID that identify the geometry.
///
/// The bits above these hold the fill type in [`SharedGeometry::gen_id`].
pub(crate) const GEN_ID_BITS: u32 = 30;

/// The mask for the geometry part of a generation ID.
const GEN_ID_MASK: u32 = (1 << GEN_ID_BITS) - 1;

/// The identity shared by every empty geometry.
pub(crate) const EMPTY_GEN_ID: u32 = 1;

/// The identity of a geometry whose identity has not been computed yet.
const UNASSIGNED_GEN_ID: u32 = 0;

/// Allocate a fresh generation ID.
fn next_gen_id() -> u32 {
    static NEXT_ID: AtomicU32 = AtomicU32::new(EMPTY_GEN_ID + 1);

    loop {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed) & GEN_ID_MASK;
        if id != UNASSIGNED_GEN_ID && id != EMPTY_GEN_ID {
            return id;
        }
    }
}

/// The cached bounds of a geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    /// The tight bounds over all points, or the empty rectangle.
    pub(crate) rect: Rect,

    /// Whether every coordinate is finite.
    pub(crate) is_finite: bool,
}

impl Bounds {
    /// Compute the bounds of a point set.
    pub(crate) fn compute(points: &[Point]) -> Self {
        let is_finite = points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite());

        let rect = match points {
            _ if !is_finite => Rect::ZERO,
            [] | [_] => Rect::ZERO,
            [first, rest @ ..] => rest.iter().fold(
                Rect::from_points(*first, *first),
                |rect, pt| Rect {
                    x0: rect.x0.min(pt.x),
                    y0: rect.y0.min(pt.y),
                    x1: rect.x1.max(pt.x),
                    y1: rect.y1.max(pt.y),
                },
            ),
        };

        Self { rect, is_finite }
    }
}

/// The recorded classification of an oval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OvalInfo {
    /// The rectangle the oval is inscribed in.
    pub bounds: Rect,

    /// The direction the oval winds in.
    pub direction: PathDirection,

    /// The index of the starting point, from 0 (top center) to 3 (left center).
    pub start: u32,
}

/// The recorded classification of a rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RRectInfo {
    /// The rounded rectangle.
    pub rrect: RRect,

    /// The direction the rounded rectangle winds in.
    pub direction: PathDirection,

    /// The index of the starting point, from 0 to 7, clockwise from the top-left corner's
    /// end on the top edge.
    pub start: u32,
}

/// Whether an arc is open or is joined to the center of its oval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcKind {
    /// Only the arc itself.
    Open,

    /// The arc, joined by lines to the center of the oval.
    Wedge,
}

/// The recorded classification of an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcInfo {
    /// The rectangle the oval containing the arc is inscribed in.
    pub oval: Rect,

    /// The angle the arc starts at, in degrees clockwise from the positive x axis.
    pub start_angle: f64,

    /// The angle the arc sweeps through, in degrees.
    pub sweep_angle: f64,

    /// Whether the arc is open or a wedge.
    pub kind: ArcKind,
}

/// The shape a geometry was constructed as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ShapeInfo {
    Oval(OvalInfo),
    RRect(RRectInfo),
    Arc(ArcInfo),
}

impl ShapeInfo {
    /// The same shape, moved by `offset`.
    pub(crate) fn translated(self, offset: Vec2) -> Self {
        match self {
            ShapeInfo::Oval(info) => ShapeInfo::Oval(OvalInfo {
                bounds: info.bounds + offset,
                ..info
            }),
            ShapeInfo::RRect(info) => ShapeInfo::RRect(RRectInfo {
                rrect: info.rrect.translated(offset),
                ..info
            }),
            ShapeInfo::Arc(info) => ShapeInfo::Arc(ArcInfo {
                oval: info.oval + offset,
                ..info
            }),
        }
    }
}

/// A shared, reference-counted path geometry.
///
/// The contents are immutable while the geometry is shared. Mutation goes through a
/// [`GeometryEditor`](crate::GeometryEditor), which forks the geometry if anyone else holds
/// a reference to it.
#[derive(Debug)]
pub struct SharedGeometry {
    /// The points, verbs and weights.
    buffer: GeometryBuffer,

    /// The generation ID, or zero if it has not been computed yet.
    gen_id: AtomicU32,

    /// The bounds, computed on first use.
    bounds: OnceLock<Bounds>,

    /// The shape this geometry was constructed as, if one was recorded.
    shape: Option<ShapeInfo>,

    /// Listeners waiting for this identity to be retired.
    listeners: ListenerRegistry,

    /// The number of editors attached to this geometry.
    #[cfg(debug_assertions)]
    editors: usize,
}

impl Default for SharedGeometry {
    fn default() -> Self {
        Self::from_buffer(GeometryBuffer::new())
    }
}

impl SharedGeometry {
    /// Wrap a buffer in a new geometry with an unassigned identity.
    pub fn from_buffer(buffer: GeometryBuffer) -> Self {
        Self {
            buffer,
            gen_id: AtomicU32::new(UNASSIGNED_GEN_ID),
            bounds: OnceLock::new(),
            shape: None,
            listeners: ListenerRegistry::default(),
            #[cfg(debug_assertions)]
            editors: 0,
        }
    }

    /// The process-wide empty geometry.
    ///
    /// The returned handle always shares its geometry with a static reference, so editing
    /// it always forks.
    pub fn empty() -> Arc<SharedGeometry> {
        static EMPTY: OnceLock<Arc<SharedGeometry>> = OnceLock::new();

        EMPTY
            .get_or_init(|| {
                let geometry = SharedGeometry::default();
                geometry.gen_id.store(EMPTY_GEN_ID, Ordering::Relaxed);
                geometry.bounds.get_or_init(|| Bounds::compute(&[]));
                Arc::new(geometry)
            })
            .clone()
    }

    /// Copy this geometry's contents into a new geometry.
    ///
    /// Identity, listeners and shape classification are not carried over.
    pub(crate) fn fork(&self, extra_verbs: usize, extra_points: usize, extra_conics: usize) -> Self {
        Self::from_buffer(
            self.buffer
                .clone_with_reserve(extra_points, extra_verbs, extra_conics),
        )
    }

    /// The underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &GeometryBuffer {
        &self.buffer
    }

    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> &mut GeometryBuffer {
        &mut self.buffer
    }

    /// The points, in traversal order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        self.buffer.points()
    }

    /// The verbs, in traversal order.
    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        self.buffer.verbs()
    }

    /// The conic weights, one per conic verb.
    #[inline]
    pub fn conic_weights(&self) -> &[f64] {
        self.buffer.conic_weights()
    }

    /// The kinds of segment in the geometry.
    #[inline]
    pub fn segment_mask(&self) -> SegmentMask {
        self.buffer.segment_mask()
    }

    /// Whether the geometry holds no verbs or points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub(crate) fn cached_bounds(&self) -> Bounds {
        *self.bounds.get_or_init(|| Bounds::compute(self.buffer.points()))
    }

    /// The tight bounds over every point, including control points.
    ///
    /// Geometries with fewer than two points, or with a non-finite point, have empty
    /// bounds.
    pub fn bounds(&self) -> Rect {
        self.cached_bounds().rect
    }

    /// Whether every point is finite.
    pub fn is_finite(&self) -> bool {
        self.cached_bounds().is_finite
    }

    /// The oval this geometry was constructed as, if one was recorded.
    pub fn is_oval(&self) -> Option<OvalInfo> {
        match self.shape {
            Some(ShapeInfo::Oval(info)) => Some(info),
            _ => None,
        }
    }

    /// The rounded rectangle this geometry was constructed as, if one was recorded.
    pub fn is_rrect(&self) -> Option<RRectInfo> {
        match self.shape {
            Some(ShapeInfo::RRect(info)) => Some(info),
            _ => None,
        }
    }

    /// The arc this geometry was constructed as, if one was recorded.
    pub fn is_arc(&self) -> Option<ArcInfo> {
        match self.shape {
            Some(ShapeInfo::Arc(info)) => Some(info),
            _ => None,
        }
    }

    pub(crate) fn shape(&self) -> Option<ShapeInfo> {
        self.shape
    }

    /// The identity of this geometry's contents, assigning one if needed.
    ///
    /// Empty geometries always share the same identity.
    pub fn generation_id(&self) -> GenerationId {
        let raw = match self.gen_id.load(Ordering::Acquire) {
            UNASSIGNED_GEN_ID => {
                let fresh = if self.buffer.is_empty() {
                    EMPTY_GEN_ID
                } else {
                    next_gen_id()
                };

                // Whoever gets here first decides the identity.
                match self.gen_id.compare_exchange(
                    UNASSIGNED_GEN_ID,
                    fresh,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => fresh,
                    Err(winner) => winner,
                }
            }
            raw => raw,
        };

        GenerationId::from_raw(raw).expect("generation IDs are never zero once assigned")
    }

    /// The generation ID with `fill_type` folded into the high bits.
    ///
    /// This keeps a fill-rule-only change visible to caches that key on a single integer.
    pub fn gen_id(&self, fill_type: FillType) -> u32 {
        self.generation_id().get() | (fill_type as u32) << GEN_ID_BITS
    }

    /// Whether this geometry has the identity shared by every empty geometry.
    fn has_empty_identity(&self) -> bool {
        self.generation_id().get() == EMPTY_GEN_ID
    }

    /// Register `listener` to be told when this identity is retired.
    ///
    /// Empty geometries are never retired in a way a cache can observe, so listeners on them
    /// are dropped immediately and never called.
    pub fn add_change_listener(&self, listener: impl ChangeListener) -> Subscription {
        self.add_boxed_listener(Box::new(listener))
    }

    pub(crate) fn add_boxed_listener(&self, listener: Box<dyn ChangeListener>) -> Subscription {
        if self.has_empty_identity() {
            tracing::trace!("ignoring change listener on an empty geometry");
            return Subscription::inert();
        }

        self.listeners.add(listener)
    }

    /// The number of listeners waiting on this identity.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Notify every listener that the current identity is gone.
    pub(crate) fn retire_identity(&self) {
        if let Some(id) = GenerationId::from_raw(self.gen_id.load(Ordering::Acquire)) {
            self.listeners.notify_all_and_clear(id);
        }
    }

    /// Forget every cached value derived from the buffer.
    pub(crate) fn invalidate(&mut self) {
        self.bounds.take();
        *self.gen_id.get_mut() = UNASSIGNED_GEN_ID;
        self.shape = None;
    }

    pub(crate) fn set_shape(&mut self, shape: ShapeInfo) {
        self.shape = Some(shape);
    }

    pub(crate) fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds.take();
        self.bounds.get_or_init(|| bounds);
    }

    /// Clear this geometry back to the empty state.
    ///
    /// Listeners on the old identity are notified, and the geometry takes the identity shared
    /// by every empty geometry.
    pub fn reset(&mut self) {
        self.retire_identity();
        self.invalidate();
        self.buffer.clear();
        *self.gen_id.get_mut() = EMPTY_GEN_ID;
        self.bounds.get_or_init(|| Bounds::compute(&[]));
    }

    #[cfg(debug_assertions)]
    pub(crate) fn attach_editor(&mut self) {
        debug_assert_eq!(self.editors, 0, "a geometry may only have one editor at a time");
        self.editors += 1;
    }

    #[cfg(debug_assertions)]
    pub(crate) fn detach_editor(&mut self) {
        debug_assert!(self.editors > 0);
        self.editors -= 1;
    }
}

impl PartialEq for SharedGeometry {
    fn eq(&self, other: &Self) -> bool {
        let (ours, theirs) = (
            self.gen_id.load(Ordering::Acquire),
            other.gen_id.load(Ordering::Acquire),
        );
        if ours != UNASSIGNED_GEN_ID && ours == theirs {
            return true;
        }

        self.buffer.verbs() == other.buffer.verbs()
            && self.buffer.points() == other.buffer.points()
            && self.buffer.conic_weights() == other.buffer.conic_weights()
    }
}

impl Drop for SharedGeometry {
    fn drop(&mut self) {
        self.retire_identity();
    }
}

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

//! The raw storage for path points, verbs and conic weights.

use super::{SegmentMask, Verb};

use kurbo::Point;

/// Append-oriented storage for the three parallel sequences that make up a path.
///
/// Points and verbs are kept in their own growable buffers, both in forward order. Appending
/// a verb also appends the points it consumes, so the two sequences always stay in step as
/// long as callers fill in every point they are handed.
///
/// The appenders trust their caller: they do not check that the verb sequence makes sense.
/// Use [`GeometryBuffer::is_valid`] in debug code to check the invariants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffer {
    /// The points, in traversal order.
    points: Vec<Point>,

    /// The verbs, in traversal order.
    verbs: Vec<Verb>,

    /// One weight per conic verb.
    conic_weights: Vec<f64>,

    /// The kinds of segment that have been appended so far.
    segment_mask: SegmentMask,
}

impl GeometryBuffer {
    /// Create a new, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new buffer with room for the given number of points, verbs and conics.
    pub fn with_capacity(points: usize, verbs: usize, conics: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            verbs: Vec::with_capacity(verbs),
            conic_weights: Vec::with_capacity(conics),
            segment_mask: SegmentMask::EMPTY,
        }
    }

    /// The points of this buffer.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The verbs of this buffer, in the order they were appended.
    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// The conic weights of this buffer.
    #[inline]
    pub fn conic_weights(&self) -> &[f64] {
        &self.conic_weights
    }

    /// The kinds of segment in this buffer.
    #[inline]
    pub fn segment_mask(&self) -> SegmentMask {
        self.segment_mask
    }

    /// Whether this buffer holds no verbs and no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty() && self.points.is_empty()
    }

    /// The last point, if there is one.
    #[inline]
    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// The last verb, if there is one.
    #[inline]
    pub fn last_verb(&self) -> Option<Verb> {
        self.verbs.last().copied()
    }

    /// Mutable access to the points.
    ///
    /// Writing points never changes the verb sequence, so this cannot break the invariants.
    #[inline]
    pub(crate) fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    /// Mutable access to the verbs.
    ///
    /// The segment mask must be refreshed with [`GeometryBuffer::recompute_segment_mask`]
    /// after rewriting verbs.
    #[inline]
    pub(crate) fn verbs_mut(&mut self) -> &mut [Verb] {
        &mut self.verbs
    }

    /// Mutable access to the conic weights.
    #[inline]
    pub(crate) fn conic_weights_mut(&mut self) -> &mut [f64] {
        &mut self.conic_weights
    }

    /// Append a verb and return the points it consumes, ready to be written.
    ///
    /// `weight` is only recorded if `verb` is [`Verb::Conic`].
    pub fn grow_for_verb(&mut self, verb: Verb, weight: f64) -> &mut [Point] {
        self.verbs.push(verb);
        if verb == Verb::Conic {
            self.conic_weights.push(weight);
        }
        self.segment_mask |= verb.segment_bit();

        let start = self.points.len();
        self.points
            .resize(start + verb.point_count(), Point::ORIGIN);
        &mut self.points[start..]
    }

    /// Append `count` copies of a verb.
    ///
    /// Returns the new points and, for conics, the new weights. The weights slice is empty
    /// for every other verb.
    pub fn grow_for_repeated_verb(
        &mut self,
        verb: Verb,
        count: usize,
    ) -> (&mut [Point], &mut [f64]) {
        self.verbs.extend(std::iter::repeat(verb).take(count));
        if count > 0 {
            self.segment_mask |= verb.segment_bit();
        }

        let weight_start = self.conic_weights.len();
        if verb == Verb::Conic {
            self.conic_weights.resize(weight_start + count, 1.0);
        }

        let point_start = self.points.len();
        self.points
            .resize(point_start + verb.point_count() * count, Point::ORIGIN);

        (
            &mut self.points[point_start..],
            &mut self.conic_weights[weight_start..],
        )
    }

    /// Append every verb and weight of `other`, returning the new points for the caller to
    /// write. The new points start out as a copy of `other`'s points.
    pub fn grow_for_verbs_in(&mut self, other: &GeometryBuffer) -> &mut [Point] {
        self.verbs.extend_from_slice(&other.verbs);
        self.conic_weights.extend_from_slice(&other.conic_weights);
        self.segment_mask |= other.segment_mask;

        let start = self.points.len();
        self.points.extend_from_slice(&other.points);
        &mut self.points[start..]
    }

    /// Hint that this many extra points, verbs and conics are about to be appended.
    ///
    /// This never changes the contents of the buffer.
    pub fn reserve(&mut self, extra_points: usize, extra_verbs: usize, extra_conics: usize) {
        self.points.reserve(extra_points);
        self.verbs.reserve(extra_verbs);
        self.conic_weights.reserve(extra_conics);
    }

    /// Discard the contents of this buffer and resize it to exactly these counts.
    ///
    /// The old allocation is reused where possible. The new entries hold placeholder values
    /// that the caller is expected to overwrite.
    pub fn reset_to_size(&mut self, verb_count: usize, point_count: usize, conic_count: usize) {
        self.clear();
        self.verbs.resize(verb_count, Verb::Move);
        self.points.resize(point_count, Point::ORIGIN);
        self.conic_weights.resize(conic_count, 1.0);
    }

    /// Remove every point, verb and weight, keeping the allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        self.verbs.clear();
        self.conic_weights.clear();
        self.segment_mask = SegmentMask::EMPTY;
    }

    /// Rebuild the segment mask from the verbs.
    pub(crate) fn recompute_segment_mask(&mut self) {
        self.segment_mask = self
            .verbs
            .iter()
            .fold(SegmentMask::EMPTY, |mask, verb| mask | verb.segment_bit());
    }

    /// Clone this buffer, leaving room for more data in the clone.
    pub(crate) fn clone_with_reserve(
        &self,
        extra_points: usize,
        extra_verbs: usize,
        extra_conics: usize,
    ) -> Self {
        let mut points = Vec::with_capacity(self.points.len() + extra_points);
        points.extend_from_slice(&self.points);
        let mut verbs = Vec::with_capacity(self.verbs.len() + extra_verbs);
        verbs.extend_from_slice(&self.verbs);
        let mut conic_weights = Vec::with_capacity(self.conic_weights.len() + extra_conics);
        conic_weights.extend_from_slice(&self.conic_weights);

        Self {
            points,
            verbs,
            conic_weights,
            segment_mask: self.segment_mask,
        }
    }

    /// Check the verb, point and weight invariants.
    pub fn is_valid(&self) -> bool {
        if super::error::validate(&self.verbs, self.points.len(), self.conic_weights.len())
            .is_err()
        {
            return false;
        }

        let mask = self
            .verbs
            .iter()
            .fold(SegmentMask::EMPTY, |mask, verb| mask | verb.segment_bit());
        mask == self.segment_mask
    }

    /// Build a buffer from parts that have already been validated.
    pub(crate) fn from_parts(
        points: Vec<Point>,
        verbs: Vec<Verb>,
        conic_weights: Vec<f64>,
    ) -> Self {
        let mut buffer = Self {
            points,
            verbs,
            conic_weights,
            segment_mask: SegmentMask::EMPTY,
        };
        buffer.recompute_segment_mask();
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_for_verb_appends_points() {
        let mut buffer = GeometryBuffer::new();
        buffer.grow_for_verb(Verb::Move, 0.0)[0] = Point::new(1.0, 2.0);

        let pts = buffer.grow_for_verb(Verb::Conic, 0.5);
        assert_eq!(pts.len(), 2);
        pts[0] = Point::new(3.0, 4.0);
        pts[1] = Point::new(5.0, 6.0);

        buffer.grow_for_verb(Verb::Line, 0.75)[0] = Point::new(7.0, 8.0);

        assert_eq!(buffer.verbs(), &[Verb::Move, Verb::Conic, Verb::Line]);
        assert_eq!(buffer.points().len(), 4);
        assert_eq!(buffer.conic_weights(), &[0.5]);
        assert!(buffer.segment_mask().contains(SegmentMask::CONIC | SegmentMask::LINE));
        assert!(buffer.is_valid());
    }

    #[test]
    fn repeated_verbs() {
        let mut buffer = GeometryBuffer::new();
        buffer.grow_for_verb(Verb::Move, 0.0);

        let (pts, weights) = buffer.grow_for_repeated_verb(Verb::Conic, 3);
        assert_eq!(pts.len(), 6);
        assert_eq!(weights.len(), 3);
        weights.copy_from_slice(&[0.1, 0.2, 0.3]);

        let (pts, weights) = buffer.grow_for_repeated_verb(Verb::Cubic, 2);
        assert_eq!(pts.len(), 6);
        assert!(weights.is_empty());

        assert_eq!(buffer.verbs().len(), 6);
        assert_eq!(buffer.points().len(), 13);
        assert_eq!(buffer.conic_weights(), &[0.1, 0.2, 0.3]);
        assert!(buffer.is_valid());
    }

    #[test]
    fn reserve_does_not_change_contents() {
        let mut buffer = GeometryBuffer::new();
        buffer.grow_for_verb(Verb::Move, 0.0);
        let before = buffer.clone();

        buffer.reserve(100, 50, 10);
        assert_eq!(buffer, before);
        assert!(buffer.points.capacity() >= 101);
    }

    #[test]
    fn reset_to_size_discards_contents() {
        let mut buffer = GeometryBuffer::new();
        buffer.grow_for_verb(Verb::Move, 0.0);
        buffer.grow_for_verb(Verb::Cubic, 0.0);

        buffer.reset_to_size(2, 2, 0);
        assert_eq!(buffer.verbs().len(), 2);
        assert_eq!(buffer.points().len(), 2);
        assert!(buffer.conic_weights().is_empty());
        assert!(buffer.segment_mask().is_empty());

        buffer.verbs_mut()[1] = Verb::Line;
        buffer.recompute_segment_mask();
        assert!(buffer.is_valid());
    }

    #[test]
    fn stale_mask_bits_are_invalid() {
        let mut buffer = GeometryBuffer::new();
        buffer.grow_for_verb(Verb::Move, 0.0);
        buffer.grow_for_verb(Verb::Line, 0.0);
        assert!(buffer.is_valid());

        buffer.segment_mask |= SegmentMask::CUBIC;
        assert!(!buffer.is_valid());

        buffer.recompute_segment_mask();
        assert!(buffer.is_valid());
    }

    #[test]
    fn invalid_sequences_are_detected() {
        let mut buffer = GeometryBuffer::new();
        buffer.grow_for_verb(Verb::Line, 0.0);
        assert!(!buffer.is_valid());
    }
}

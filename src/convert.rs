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

//! Conversions between paths and `kurbo` shapes.

use super::iter::PathElements;
use super::{Path, PathBuilder};

use kurbo::{BezPath, PathEl, Point, Rect, Shape};

/// Options shared by every conversion out of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    /// The maximum distance between a conic and the quadratic curves replacing it.
    pub tolerance: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { tolerance: 0.25 }
    }
}

impl ConvertOptions {
    /// Options with the given tolerance.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Path {
    /// Convert this path into a `kurbo` path.
    pub fn to_bez_path(&self, options: ConvertOptions) -> BezPath {
        BezPath::from_vec(self.path_elements(options.tolerance).collect())
    }
}

impl Shape for Path {
    type PathElementsIter<'iter> = PathElements<'iter>;

    fn path_elements(&self, tolerance: f64) -> Self::PathElementsIter<'_> {
        PathElements::new(self.segments(), tolerance)
    }

    fn area(&self) -> f64 {
        self.to_bez_path(ConvertOptions::default()).area()
    }

    fn perimeter(&self, accuracy: f64) -> f64 {
        self.to_bez_path(ConvertOptions::with_tolerance(accuracy))
            .perimeter(accuracy)
    }

    fn winding(&self, pt: Point) -> i32 {
        self.to_bez_path(ConvertOptions::default()).winding(pt)
    }

    fn bounding_box(&self) -> Rect {
        self.bounds()
    }
}

impl FromIterator<PathEl> for Path {
    fn from_iter<I: IntoIterator<Item = PathEl>>(iter: I) -> Self {
        let mut builder = PathBuilder::new();
        builder.extend(iter);
        builder.detach()
    }
}

impl From<&BezPath> for Path {
    fn from(path: &BezPath) -> Self {
        path.iter().collect()
    }
}

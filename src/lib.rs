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

//! Shared, copy-on-write path geometry for 2D renderers.
//!
//! A [`Path`] is a cheap value: cloning it shares the underlying [`SharedGeometry`], and the
//! geometry is only copied when one of the clones is edited. Each geometry has a lazily
//! assigned [`GenerationId`] that stands in for its contents, so renderers can key caches on
//! it. Caches are told when an identity is retired through a [`ChangeListener`].
//!
//! Paths are built with a [`PathBuilder`], which also knows how to add canonical shapes like
//! ovals and rounded rectangles. A path built as exactly one of those shapes remembers it,
//! so that renderers can take a fast path for it.
//!
//! ```
//! use pathref::{PathBuilder, Verb};
//! use pathref::kurbo::Rect;
//!
//! let mut builder = PathBuilder::new();
//! builder.move_to((0.0, 0.0)).line_to((10.0, 0.0)).line_to((10.0, 10.0)).close();
//! let path = builder.detach();
//!
//! assert_eq!(path.verbs(), &[Verb::Move, Verb::Line, Verb::Line, Verb::Close]);
//! assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
//!
//! // Clones share their geometry, and with it their identity.
//! let copy = path.clone();
//! assert_eq!(copy.gen_id(), path.gen_id());
//! ```
//!
//! ## Features
//!
//! - `tiny-skia` (default): convert paths with [`Path::to_tiny_skia`].
//! - `lyon` (default): tessellate paths with the events from [`Path::lyon_events`].

#![forbid(unsafe_code, rust_2018_idioms)]

pub use kurbo;

mod buffer;
mod builder;
mod conic;
mod convert;
mod convexity;
mod editor;
mod error;
mod geometry;
mod iter;
mod listener;
mod path;
mod rrect;
mod shapes;
mod verb;

#[cfg(feature = "lyon")]
mod lyon;

#[cfg(feature = "tiny-skia")]
mod skia;

pub use buffer::GeometryBuffer;
pub use builder::{AddPathMode, PathBuilder};
pub use conic::{Conic, MAX_QUADS, MAX_QUAD_POW2, QUARTER_CIRCLE_WEIGHT};
pub use convert::ConvertOptions;
pub use convexity::Convexity;
pub use editor::GeometryEditor;
pub use error::PathError;
pub use geometry::{ArcInfo, ArcKind, OvalInfo, RRectInfo, SharedGeometry};
pub use iter::{PathElements, Segment, Segments};
pub use listener::{ChangeListener, GenerationId, Subscription};
pub use path::Path;
pub use rrect::{Corner, RRect, RRectKind};
pub use verb::{FillType, PathDirection, SegmentMask, Verb};

static_assertions::assert_impl_all!(Path: Send, Sync, Clone);
static_assertions::assert_impl_all!(SharedGeometry: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send, Sync);
static_assertions::assert_impl_all!(GeometryBuffer: Send, Sync, Clone);
static_assertions::assert_not_impl_any!(GeometryEditor<'static>: Clone);

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

use pathref::kurbo::{Point, Rect};
use pathref::{FillType, Path, PathBuilder, PathDirection};
use pathref_cache::PathCache;

fn square(size: f64) -> Path {
    let mut builder = PathBuilder::new();
    builder.add_rect(Rect::new(0.0, 0.0, size, size), PathDirection::Cw);
    builder.detach()
}

#[test]
fn hits_and_misses() {
    let mut cache = PathCache::new();
    let a = square(1.0);
    let b = square(2.0);

    assert_eq!(cache.insert(&a, "a"), Ok(None));
    assert_eq!(cache.get(&a), Some(&"a"));
    assert_eq!(cache.get(&a.clone()), Some(&"a"));
    assert_eq!(cache.get(&b), None);
    assert_eq!(cache.insert(&a, "a2"), Ok(Some("a")));
    assert_eq!(cache.len(), 1);
}

#[test]
fn fill_types_are_cached_separately() {
    let mut cache = PathCache::new();
    let winding = square(1.0);
    let even_odd = winding.clone().with_fill_type(FillType::EvenOdd);

    cache.insert(&winding, 1).unwrap();
    assert_eq!(cache.get(&even_odd), None);
    cache.insert(&even_odd, 2).unwrap();
    assert_eq!(cache.get(&winding), Some(&1));
    assert_eq!(cache.get(&even_odd), Some(&2));
    assert_eq!(cache.len(), 2);
}

#[test]
fn volatile_paths_are_refused() {
    let mut cache = PathCache::new();
    let path = square(1.0).with_volatile(true);
    assert_eq!(cache.insert(&path, 7), Err(7));
    assert!(cache.is_empty());
}

#[test]
fn dropped_paths_are_purged() {
    let mut cache = PathCache::new();
    let keep = square(1.0);
    let lose = square(2.0);
    cache.insert(&keep, "keep").unwrap();
    cache.insert(&lose, "lose").unwrap();
    cache
        .insert(&lose.clone().with_fill_type(FillType::InverseWinding), "inverse")
        .unwrap();

    assert!(!cache.has_stale());
    drop(lose);
    assert!(cache.has_stale());

    assert_eq!(cache.purge_stale(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&keep), Some(&"keep"));
    assert_eq!(cache.purge_stale(), 0);
}

#[test]
fn edited_paths_miss() {
    let mut cache = PathCache::new();
    let mut path = square(1.0);
    cache.insert(&path, ()).unwrap();

    path.edit().points_mut()[0] = Point::new(-1.0, -1.0);
    assert_eq!(cache.get(&path), None);
    assert_eq!(cache.purge_stale(), 1);
    assert!(cache.is_empty());
}

#[test]
fn removing_cancels_the_subscription() {
    let mut cache = PathCache::new();
    let path = square(1.0);
    cache.insert(&path, 1).unwrap();
    assert_eq!(path.geometry().listener_count(), 1);

    assert_eq!(cache.remove(&path), Some(1));
    assert_eq!(path.geometry().listener_count(), 0);
}

#[test]
fn dropping_the_cache_cancels_subscriptions() {
    let path = square(3.0);
    {
        let mut cache = PathCache::new();
        cache.insert(&path, 1).unwrap();
        assert_eq!(path.geometry().listener_count(), 1);
    }
    assert_eq!(path.geometry().listener_count(), 0);
}

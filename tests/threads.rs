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

//! Shared geometry read from many threads at once.

use pathref::kurbo::{Point, Rect};
use pathref::{GenerationId, Path, PathBuilder, PathDirection};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn racing_readers_agree_on_the_identity() {
    // Raw paths assign their identity and bounds lazily.
    let points = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(-1.0, 2.0)];
    let path = Path::from_raw(
        &points,
        &[pathref::Verb::Move, pathref::Verb::Line, pathref::Verb::Line],
        &[],
        pathref::FillType::Winding,
    );
    let barrier = Arc::new(Barrier::new(THREADS));

    let results: Vec<_> = (0..THREADS)
        .map(|_| {
            let path = path.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (path.gen_id(), path.bounds(), path.is_convex())
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let first = results[0];
    assert!(results.iter().all(|result| *result == first));
    assert_eq!(first.0, path.gen_id());
    assert_eq!(first.1, Rect::new(-1.0, 0.0, 3.0, 4.0));
}

#[test]
fn the_last_thread_to_let_go_notifies() {
    let mut builder = PathBuilder::new();
    builder.add_oval(Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
    let path = builder.detach();
    let id = path.geometry_id();

    let calls = Arc::new(AtomicUsize::new(0));
    let _sub = path.add_change_listener({
        let calls = calls.clone();
        move |retired: GenerationId| {
            assert_eq!(retired, id);
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let path = path.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                assert!(path.is_oval().is_some());
                drop(path);
            })
        })
        .collect();
    drop(path);

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn threads_edit_their_own_copies() {
    let mut builder = PathBuilder::new();
    builder.move_to((0.0, 0.0)).line_to((1.0, 0.0));
    let shared = builder.detach();
    let original_id = shared.gen_id();

    let ids: Vec<_> = (0..THREADS)
        .map(|i| {
            let mut path = shared.clone();
            thread::spawn(move || {
                let mut builder = PathBuilder::from(&path);
                builder.line_to((i as f64, 10.0));
                path = builder.detach();
                path.gen_id()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(shared.gen_id(), original_id);
    assert_eq!(shared.points().len(), 2);
    for (i, id) in ids.iter().enumerate() {
        assert_ne!(*id, original_id);
        assert!(ids[i + 1..].iter().all(|other| other != id));
    }
}

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

//! Notifications for when a geometry identity is retired.
//!
//! Caches keyed on a [`GenerationId`] register a [`ChangeListener`] with the geometry that
//! owns the identity. Once that identity can no longer be observed, either because the
//! geometry was dropped or because it was edited in place, every listener is called exactly
//! once with the retired identity and then forgotten.

use std::fmt;
use std::mem;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

/// An opaque identity for the contents of a shared geometry.
///
/// Two geometries with the same identity are guaranteed to have the same contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationId(NonZeroU32);

impl GenerationId {
    pub(crate) fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw value of this identity.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Something that wants to know when a geometry identity is retired.
///
/// Listeners are called at most once, from whichever thread drops or edits the geometry. They
/// only receive the identity, never the geometry itself, so they cannot reenter it.
pub trait ChangeListener: Send + 'static {
    /// The identity `id` will never be observed again.
    fn retired(self: Box<Self>, id: GenerationId);
}

impl<F: FnOnce(GenerationId) + Send + 'static> ChangeListener for F {
    fn retired(self: Box<Self>, id: GenerationId) {
        (*self)(id)
    }
}

/// The list of listeners shared between a registry and its subscriptions.
#[derive(Default)]
struct Listeners {
    /// The key to give to the next listener.
    next_key: u64,

    /// The registered listeners, in registration order.
    entries: Vec<(u64, Box<dyn ChangeListener>)>,
}

/// A thread-safe list of one-shot listeners.
///
/// The shared list is only allocated once the first listener is added, since most
/// geometries are never observed by a cache.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    inner: OnceLock<Arc<Mutex<Listeners>>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl ListenerRegistry {
    /// Register a listener.
    pub(crate) fn add(&self, listener: Box<dyn ChangeListener>) -> Subscription {
        let inner = self.inner.get_or_init(Default::default);
        let mut list = lock(inner);

        let key = list.next_key;
        list.next_key += 1;
        list.entries.push((key, listener));

        Subscription {
            key,
            registry: Arc::downgrade(inner),
        }
    }

    /// The number of listeners waiting for a notification.
    pub(crate) fn len(&self) -> usize {
        self.inner.get().map_or(0, |inner| lock(inner).entries.len())
    }

    /// Call every registered listener with `id`, then forget all of them.
    ///
    /// The list is drained before any listener runs, so a listener that registers a new
    /// listener on another geometry (or this one, through a fresh handle) cannot deadlock.
    /// Listeners added after the drain are kept for the next notification.
    pub(crate) fn notify_all_and_clear(&self, id: GenerationId) {
        let inner = match self.inner.get() {
            Some(inner) => inner,
            None => return,
        };

        let drained = mem::take(&mut lock(inner).entries);
        if drained.is_empty() {
            return;
        }

        tracing::debug!(id = %id, count = drained.len(), "notifying geometry listeners");
        for (_, listener) in drained {
            listener.retired(id);
        }
    }
}

/// A handle to a registered listener.
///
/// Dropping a subscription leaves the listener registered. Call [`Subscription::cancel`] when
/// the listening side is torn down so that it isn't notified about identities it no longer
/// tracks.
///
/// Discarding the subscription without binding it is flagged:
///
/// ```compile_fail
/// #![deny(unused_must_use)]
/// use pathref::{GenerationId, Path};
///
/// fn watch(path: &Path) {
///     path.add_change_listener(|_: GenerationId| {});
/// }
/// ```
#[derive(Debug)]
#[must_use = "dropping a subscription gives up the only way to cancel its listener"]
pub struct Subscription {
    /// The key of the listener in the list.
    key: u64,

    /// The list that holds the listener.
    ///
    /// This is weak so that an outstanding subscription never keeps a retired list alive.
    registry: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// A subscription that is not attached to any list.
    pub(crate) fn inert() -> Self {
        Self {
            key: 0,
            registry: Weak::new(),
        }
    }

    /// Whether the listener is still waiting to be notified.
    pub fn is_pending(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |inner| {
                lock(&inner).entries.iter().any(|(key, _)| *key == self.key)
            })
    }

    /// Remove the listener without notifying it.
    ///
    /// Returns `true` if the listener was still registered.
    pub fn cancel(self) -> bool {
        let inner = match self.registry.upgrade() {
            Some(inner) => inner,
            None => return false,
        };

        let removed = {
            let mut list = lock(&inner);
            list.entries
                .iter()
                .position(|(key, _)| *key == self.key)
                .map(|index| list.entries.remove(index))
        };

        // Run the listener's destructor outside of the lock.
        removed.is_some()
    }
}

fn lock(inner: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // Listeners run outside of the lock, so a poisoned lock still holds a consistent list.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

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

//! A cache for data derived from [`pathref`] paths, like tessellations or GPU buffers.
//!
//! Entries are keyed on the geometry identity of a path and its fill type. When a
//! geometry identity is retired, its entries are marked as stale, and the next call to
//! [`PathCache::purge_stale`] evicts them.

#![forbid(unsafe_code, rust_2018_idioms)]

use ahash::RandomState;
use hashbrown::hash_map::{Entry, HashMap};

use pathref::{FillType, GenerationId, Path, Subscription};

use std::mem;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Identities that were retired but not purged yet.
type Inbox = Mutex<Vec<GenerationId>>;

/// Everything cached for one geometry.
struct Slot<V> {
    /// The values, one per fill type.
    values: [Option<V>; 4],

    /// The listener watching this geometry.
    subscription: Subscription,
}

impl<V> Slot<V> {
    fn len(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

/// A cache of values derived from paths.
pub struct PathCache<V> {
    /// The cached values, by geometry.
    slots: HashMap<GenerationId, Slot<V>, RandomState>,

    /// Where listeners report retired identities.
    inbox: Arc<Inbox>,
}

impl<V> Default for PathCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PathCache<V> {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self {
            slots: HashMap::with_hasher(RandomState::new()),
            inbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Cache `value` for `path`, returning the value it replaced.
    ///
    /// Volatile paths are expected to change before they are drawn again, so they are
    /// refused and the value is handed back.
    pub fn insert(&mut self, path: &Path, value: V) -> Result<Option<V>, V> {
        if path.is_volatile() {
            return Err(value);
        }

        let id = path.geometry_id();
        let slot = match self.slots.entry(id) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let inbox = Arc::downgrade(&self.inbox);
                let subscription = path.add_change_listener(move |id: GenerationId| report(&inbox, id));
                slot.insert(Slot {
                    values: [None, None, None, None],
                    subscription,
                })
            }
        };

        Ok(slot.values[fill_index(path.fill_type())].replace(value))
    }

    /// The cached value for `path`, if there is one.
    pub fn get(&self, path: &Path) -> Option<&V> {
        self.slots
            .get(&path.geometry_id())
            .and_then(|slot| slot.values[fill_index(path.fill_type())].as_ref())
    }

    /// Remove the cached value for `path`.
    pub fn remove(&mut self, path: &Path) -> Option<V> {
        let id = path.geometry_id();
        let slot = self.slots.get_mut(&id)?;
        let value = slot.values[fill_index(path.fill_type())].take();

        if slot.len() == 0 {
            if let Some(slot) = self.slots.remove(&id) {
                slot.subscription.cancel();
            }
        }

        value
    }

    /// Evict every entry whose geometry was retired, returning how many values were dropped.
    pub fn purge_stale(&mut self) -> usize {
        let retired = mem::take(&mut *self.inbox.lock().unwrap_or_else(PoisonError::into_inner));
        if retired.is_empty() {
            return 0;
        }

        let evicted: usize = retired
            .iter()
            .filter_map(|id| self.slots.remove(id))
            .map(|slot| slot.len())
            .sum();

        tracing::debug!(
            retired = retired.len(),
            evicted,
            remaining = self.slots.len(),
            "purged stale path cache entries"
        );
        evicted
    }

    /// Whether a retired geometry is waiting to be purged.
    pub fn has_stale(&self) -> bool {
        !self
            .inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// The number of cached values.
    pub fn len(&self) -> usize {
        self.slots.values().map(Slot::len).sum()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.subscription.cancel();
        }
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<V> Drop for PathCache<V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<V> std::fmt::Debug for PathCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathCache")
            .field("geometries", &self.slots.len())
            .field("values", &self.len())
            .finish()
    }
}

fn fill_index(fill_type: FillType) -> usize {
    fill_type as usize
}

fn report(inbox: &Weak<Inbox>, id: GenerationId) {
    // The cache may already be gone.
    if let Some(inbox) = inbox.upgrade() {
        inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
    }
}

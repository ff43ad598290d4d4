// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared area registry and its read-side snapshot.

use core::hash::Hash;

use hashbrown::{HashMap, HashSet, hash_map};
use kurbo::{PathEl, Point, Rect, RoundedRectRadii, Size};
use parking_lot::RwLock;

use crate::area::{Area, AreaShape};

/// Shared map of key to [`Area`], written by trackers and read by the renderer.
///
/// Each field of an area is updated independently; the last write to a field
/// wins. All state lives behind a single lock, so every read observes the
/// registry as it stood between two mutations.
///
/// ## Change tracking
///
/// The registry keeps a **revision** counter that bumps once per effective
/// change. Registries built with [`with_dirty_tracking`](Self::with_dirty_tracking)
/// also keep the set of keys that changed or were cleared since the last call to
/// [`take_dirty`](Self::take_dirty). Writing a value that is already stored
/// changes neither.
///
/// Values are compared bit for bit, so re-sending a NaN coordinate is not a
/// change, while `0.0` and `-0.0` are distinct.
///
/// Mutators return `true` when they changed observable state.
pub struct AreaRegistry<K> {
    inner: RwLock<Inner<K>>,
}

struct Inner<K> {
    areas: HashMap<K, Area<K>>,
    /// `None` unless dirty tracking was requested.
    dirty: Option<HashSet<K>>,
    revision: u64,
}

impl<K> Inner<K>
where
    K: Clone + Eq + Hash,
{
    fn touch(&mut self, key: &K) {
        self.revision = self.revision.wrapping_add(1);
        if let Some(dirty) = &mut self.dirty {
            dirty.get_or_insert_with(key, K::clone);
        }
    }

    /// Applies `apply` to the area for `key`, creating it if needed.
    ///
    /// `apply` returns whether it changed the area.
    fn modify(&mut self, key: K, apply: impl FnOnce(&mut Area<K>) -> bool) -> bool {
        let created = !self.areas.contains_key(&key);
        let area = self
            .areas
            .entry(key)
            .or_insert_with_key(|key| Area::new(key.clone()));
        let changed = apply(area) || created;
        if changed {
            let key = area.key.clone();
            self.touch(&key);
        }
        changed
    }
}

impl<K> core::fmt::Debug for AreaRegistry<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("AreaRegistry")
            .field("areas", &inner.areas.len())
            .field("dirty", &inner.dirty.as_ref().map(HashSet::len))
            .field("revision", &inner.revision)
            .finish_non_exhaustive()
    }
}

impl<K> Default for AreaRegistry<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Bitwise equality for stored geometry.
trait SameBits {
    fn same_bits(&self, other: &Self) -> bool;
}

impl SameBits for f64 {
    fn same_bits(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl SameBits for Point {
    fn same_bits(&self, other: &Self) -> bool {
        self.x.same_bits(&other.x) && self.y.same_bits(&other.y)
    }
}

impl SameBits for Size {
    fn same_bits(&self, other: &Self) -> bool {
        self.width.same_bits(&other.width) && self.height.same_bits(&other.height)
    }
}

impl SameBits for RoundedRectRadii {
    fn same_bits(&self, other: &Self) -> bool {
        self.top_left.same_bits(&other.top_left)
            && self.top_right.same_bits(&other.top_right)
            && self.bottom_right.same_bits(&other.bottom_right)
            && self.bottom_left.same_bits(&other.bottom_left)
    }
}

impl SameBits for PathEl {
    fn same_bits(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MoveTo(a), Self::MoveTo(b)) | (Self::LineTo(a), Self::LineTo(b)) => {
                a.same_bits(b)
            }
            (Self::QuadTo(a1, a2), Self::QuadTo(b1, b2)) => a1.same_bits(b1) && a2.same_bits(b2),
            (Self::CurveTo(a1, a2, a3), Self::CurveTo(b1, b2, b3)) => {
                a1.same_bits(b1) && a2.same_bits(b2) && a3.same_bits(b3)
            }
            (Self::ClosePath, Self::ClosePath) => true,
            _ => false,
        }
    }
}

impl SameBits for AreaShape {
    fn same_bits(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rectangle, Self::Rectangle) => true,
            (Self::RoundedRectangle(a), Self::RoundedRectangle(b)) => a.same_bits(b),
            (Self::Path(a), Self::Path(b)) => {
                let (a, b) = (a.elements(), b.elements());
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_bits(b))
            }
            _ => false,
        }
    }
}

impl<T: SameBits> SameBits for Option<T> {
    fn same_bits(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_bits(b),
            (None, None) => true,
            _ => false,
        }
    }
}

fn replace<T: SameBits>(slot: &mut T, value: T) -> bool {
    if slot.same_bits(&value) {
        false
    } else {
        *slot = value;
        true
    }
}

impl<K> AreaRegistry<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty registry with room for `capacity` areas.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                areas: HashMap::with_capacity(capacity),
                dirty: None,
                revision: 0,
            }),
        }
    }

    /// Enables dirty-key tracking for [`take_dirty`](Self::take_dirty).
    ///
    /// Changed and cleared keys accumulate until drained, so only enable this
    /// when something calls `take_dirty` regularly.
    #[must_use]
    pub fn with_dirty_tracking(self) -> Self {
        let mut inner = self.inner.into_inner();
        inner.dirty.get_or_insert_with(HashSet::new);
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Returns `true` if this registry records dirty keys.
    #[must_use]
    pub fn tracks_dirty(&self) -> bool {
        self.inner.read().dirty.is_some()
    }

    /// Sets the root-space position of the area for `key`.
    pub fn update_area_position(&self, key: K, position: Point) -> bool {
        let mut inner = self.inner.write();
        let changed = inner.modify(key, |area| replace(&mut area.position, Some(position)));
        if changed {
            tracing::trace!(revision = inner.revision, ?position, "area position updated");
        }
        changed
    }

    /// Sets the size of the area for `key`.
    pub fn update_area_size(&self, key: K, size: Size) -> bool {
        let mut inner = self.inner.write();
        let changed = inner.modify(key, |area| replace(&mut area.size, Some(size)));
        if changed {
            tracing::trace!(revision = inner.revision, ?size, "area size updated");
        }
        changed
    }

    /// Sets the clip shape of the area for `key`.
    pub fn update_area_shape(&self, key: K, shape: AreaShape) -> bool {
        let mut inner = self.inner.write();
        let changed = inner.modify(key, |area| replace(&mut area.shape, shape));
        if changed {
            tracing::trace!(revision = inner.revision, "area shape updated");
        }
        changed
    }

    /// Sets position and size of the area for `key` in one step.
    ///
    /// Readers see either both new values or neither.
    pub fn update_area_bounds(&self, key: K, bounds: Rect) -> bool {
        let mut inner = self.inner.write();
        let changed = inner.modify(key, |area| {
            let moved = replace(&mut area.position, Some(bounds.origin()));
            let resized = replace(&mut area.size, Some(bounds.size()));
            moved | resized
        });
        if changed {
            tracing::trace!(revision = inner.revision, ?bounds, "area bounds updated");
        }
        changed
    }

    /// Removes the area for `key`, if any.
    ///
    /// All fields go with it; a later update under the same key starts from a
    /// fresh area.
    pub fn clear_area(&self, key: &K) -> bool {
        let mut inner = self.inner.write();
        if inner.areas.remove(key).is_none() {
            return false;
        }
        inner.touch(key);
        tracing::trace!(revision = inner.revision, "area cleared");
        true
    }

    /// Removes every area.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        if inner.areas.is_empty() {
            return;
        }
        let Inner {
            areas,
            dirty,
            revision,
        } = &mut *inner;
        let removed = areas.len();
        match dirty {
            Some(dirty) => dirty.extend(areas.drain().map(|(key, _)| key)),
            None => areas.clear(),
        }
        *revision = revision.wrapping_add(1);
        tracing::debug!(removed, revision = *revision, "all areas cleared");
    }

    /// Returns a copy of the area for `key`.
    #[must_use]
    pub fn area(&self, key: &K) -> Option<Area<K>> {
        self.inner.read().areas.get(key).cloned()
    }

    /// Returns `true` if an area is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().areas.contains_key(key)
    }

    /// Number of registered areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().areas.len()
    }

    /// Returns `true` if no areas are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().areas.is_empty()
    }

    /// Current revision. Bumps on every effective change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    /// Returns a point-in-time copy of every registered area.
    #[must_use]
    pub fn snapshot(&self) -> AreaSnapshot<K> {
        let inner = self.inner.read();
        AreaSnapshot {
            areas: inner.areas.clone(),
            revision: inner.revision,
        }
    }

    /// Returns a snapshot only if the registry changed since `revision`.
    ///
    /// Pass the [`AreaSnapshot::revision`] of the previous snapshot.
    #[must_use]
    pub fn snapshot_if_changed(&self, revision: u64) -> Option<AreaSnapshot<K>> {
        let inner = self.inner.read();
        (inner.revision != revision).then(|| AreaSnapshot {
            areas: inner.areas.clone(),
            revision: inner.revision,
        })
    }

    /// Drains the keys that changed or were cleared since the previous call.
    ///
    /// Always empty unless the registry was built
    /// [`with_dirty_tracking`](Self::with_dirty_tracking).
    pub fn take_dirty(&self) -> Vec<K> {
        let mut inner = self.inner.write();
        match &mut inner.dirty {
            Some(dirty) => dirty.drain().collect(),
            None => Vec::new(),
        }
    }
}

/// Point-in-time view of an [`AreaRegistry`].
///
/// Order of areas is unspecified. Lookups by key are hashed.
#[derive(Clone, Debug)]
pub struct AreaSnapshot<K> {
    areas: HashMap<K, Area<K>>,
    revision: u64,
}

impl<K> AreaSnapshot<K> {
    /// Registry revision this snapshot was taken at.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of areas in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Returns `true` if the snapshot holds no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Iterates over all areas, including partially populated ones.
    pub fn iter(&self) -> hash_map::Values<'_, K, Area<K>> {
        self.areas.values()
    }

    /// Iterates over the areas that can contribute blur output.
    ///
    /// See [`Area::is_valid`].
    pub fn valid(&self) -> impl Iterator<Item = &Area<K>> + '_ {
        self.areas.values().filter(|area| area.is_valid())
    }

    /// Returns the area registered under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Area<K>>
    where
        K: Eq + Hash,
    {
        self.areas.get(key)
    }
}

impl<'a, K> IntoIterator for &'a AreaSnapshot<K> {
    type Item = &'a Area<K>;
    type IntoIter = hash_map::Values<'a, K, Area<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.values()
    }
}

impl<K> IntoIterator for AreaSnapshot<K> {
    type Item = Area<K>;
    type IntoIter = hash_map::IntoValues<K, Area<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.into_values()
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element tracker translating lifecycle events into registry updates.
//!
//! ## Usage
//!
//! 1) Build a [`TrackerConfig`] from a key and a shared registry, then call
//!    [`TrackerConfig::create`] when the element enters the tree under this feature.
//! 2) Forward the host's callbacks through [`LayoutLifecycle`].
//! 3) When the caller's parameters change in place, call [`TrackerConfig::update`]
//!    (or [`LayoutLifecycle::on_configuration_changed`]) with the new config.
//!
//! ## Minimal example
//!
//! ```
//! use std::sync::Arc;
//!
//! use kurbo::{Point, Size};
//! use understory_backdrop::{AreaRegistry, LayoutLifecycle, TrackerConfig};
//!
//! let registry = Arc::new(AreaRegistry::new());
//! let mut tracker = TrackerConfig::new("card", &registry).create();
//!
//! tracker.on_attach();
//! tracker.on_placed(Point::new(10.0, 20.0));
//! tracker.on_remeasured(Size::new(100.0, 50.0));
//! assert!(registry.area(&"card").unwrap().is_valid());
//!
//! tracker.on_detach();
//! assert!(registry.is_empty());
//! ```

use core::hash::Hash;
use std::sync::{Arc, Weak};

use kurbo::{Point, Size};

use crate::area::AreaShape;
use crate::lifecycle::LayoutLifecycle;
use crate::registry::AreaRegistry;

/// Lifecycle state of an [`AreaTracker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// Not in the layout tree, or recycled. Nothing is reported for the key.
    #[default]
    Detached,
    /// In the tree; the shape has been reported.
    Attached,
    /// A root position has been reported at least once since attaching.
    Placed,
}

/// Caller-supplied parameters of a tracker: identity, target registry, and shape.
///
/// Two configs are equal when they carry equal keys and shapes and point at the
/// same registry instance.
pub struct TrackerConfig<K> {
    key: K,
    registry: Weak<AreaRegistry<K>>,
    shape: AreaShape,
}

impl<K> TrackerConfig<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a config reporting under `key` into `registry`, with no clipping.
    #[must_use]
    pub fn new(key: K, registry: &Arc<AreaRegistry<K>>) -> Self {
        Self {
            key,
            registry: Arc::downgrade(registry),
            shape: AreaShape::Rectangle,
        }
    }

    /// Sets the clip shape.
    #[must_use]
    pub fn with_shape(mut self, shape: AreaShape) -> Self {
        self.shape = shape;
        self
    }

    /// The identity areas are reported under.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The clip shape.
    pub fn shape(&self) -> &AreaShape {
        &self.shape
    }

    /// Builds a detached tracker for this config.
    #[must_use]
    pub fn create(self) -> AreaTracker<K> {
        AreaTracker {
            key: self.key,
            registry: self.registry,
            shape: self.shape,
            state: TrackerState::Detached,
        }
    }

    /// Applies this config to an existing tracker.
    pub fn update(self, tracker: &mut AreaTracker<K>) {
        tracker.on_configuration_changed(self);
    }
}

impl<K: Clone> Clone for TrackerConfig<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            registry: self.registry.clone(),
            shape: self.shape.clone(),
        }
    }
}

impl<K: PartialEq> PartialEq for TrackerConfig<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && Weak::ptr_eq(&self.registry, &other.registry)
            && self.shape == other.shape
    }
}

impl<K: core::fmt::Debug> core::fmt::Debug for TrackerConfig<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("key", &self.key)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Reports one element's geometry into an [`AreaRegistry`].
///
/// The tracker holds only a weak reference to its registry. Once the registry
/// is dropped every event becomes a no-op.
pub struct AreaTracker<K> {
    key: K,
    registry: Weak<AreaRegistry<K>>,
    shape: AreaShape,
    state: TrackerState,
}

impl<K> AreaTracker<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a detached tracker. Equivalent to building a [`TrackerConfig`].
    #[must_use]
    pub fn new(key: K, registry: &Arc<AreaRegistry<K>>, shape: AreaShape) -> Self {
        TrackerConfig::new(key, registry).with_shape(shape).create()
    }

    /// The identity this tracker currently reports under.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The configured clip shape.
    pub fn shape(&self) -> &AreaShape {
        &self.shape
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// The target registry, if it is still alive.
    pub fn registry(&self) -> Option<Arc<AreaRegistry<K>>> {
        self.registry.upgrade()
    }

    fn with_registry(&self, f: impl FnOnce(&AreaRegistry<K>)) {
        match self.registry.upgrade() {
            Some(registry) => f(&registry),
            None => tracing::trace!("area registry dropped; ignoring lifecycle event"),
        }
    }
}

impl<K> LayoutLifecycle for AreaTracker<K>
where
    K: Clone + Eq + Hash,
{
    type Config = TrackerConfig<K>;

    fn on_attach(&mut self) {
        self.with_registry(|registry| {
            registry.update_area_shape(self.key.clone(), self.shape.clone());
        });
        self.state = TrackerState::Attached;
    }

    fn on_placed(&mut self, root_position: Point) {
        self.with_registry(|registry| {
            registry.update_area_position(self.key.clone(), root_position);
        });
        // A stray placement still reports its field but does not attach the node.
        if self.state != TrackerState::Detached {
            self.state = TrackerState::Placed;
        }
    }

    fn on_remeasured(&mut self, size: Size) {
        self.with_registry(|registry| {
            registry.update_area_size(self.key.clone(), size);
        });
    }

    fn on_reset(&mut self) {
        self.with_registry(|registry| {
            registry.clear_area(&self.key);
        });
        self.state = TrackerState::Detached;
    }

    fn on_detach(&mut self) {
        self.with_registry(|registry| {
            registry.clear_area(&self.key);
        });
        self.state = TrackerState::Detached;
    }

    fn on_configuration_changed(&mut self, config: TrackerConfig<K>) {
        let TrackerConfig {
            key,
            registry,
            shape,
        } = config;
        // The old identity is abandoned by the host; nothing else will clear it.
        if key != self.key || !Weak::ptr_eq(&registry, &self.registry) {
            self.with_registry(|old| {
                if old.clear_area(&self.key) {
                    tracing::debug!("cleared stale area after tracker was repurposed");
                }
            });
        }
        self.key = key;
        self.registry = registry;
        self.shape = shape;
        self.with_registry(|registry| {
            registry.update_area_shape(self.key.clone(), self.shape.clone());
        });
    }
}

impl<K: core::fmt::Debug> core::fmt::Debug for AreaTracker<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AreaTracker")
            .field("key", &self.key)
            .field("shape", &self.shape)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LayoutEvent;
    use kurbo::RoundedRectRadii;

    fn rounded(radius: f64) -> AreaShape {
        AreaShape::RoundedRectangle(RoundedRectRadii::from_single_radius(radius))
    }

    #[test]
    fn new_tracker_is_detached_and_silent() {
        let registry = Arc::new(AreaRegistry::new());
        let tracker = AreaTracker::new(1_u32, &registry, AreaShape::Rectangle);
        assert_eq!(tracker.state(), TrackerState::Detached);
        assert!(registry.is_empty());
    }

    #[test]
    fn state_follows_lifecycle() {
        let registry = Arc::new(AreaRegistry::new());
        let mut tracker = AreaTracker::new(1_u32, &registry, rounded(4.0));

        tracker.on_attach();
        assert_eq!(tracker.state(), TrackerState::Attached);
        assert_eq!(registry.area(&1).unwrap().shape(), &rounded(4.0));

        tracker.on_remeasured(Size::new(5.0, 5.0));
        assert_eq!(tracker.state(), TrackerState::Attached);

        tracker.on_placed(Point::new(1.0, 2.0));
        assert_eq!(tracker.state(), TrackerState::Placed);

        tracker.on_reset();
        assert_eq!(tracker.state(), TrackerState::Detached);
        assert!(registry.is_empty());
    }

    #[test]
    fn out_of_order_events_only_touch_their_field() {
        let registry = Arc::new(AreaRegistry::new());
        let mut tracker = AreaTracker::new(1_u32, &registry, rounded(2.0));

        tracker.handle(LayoutEvent::Remeasured(Size::new(8.0, 8.0)));
        tracker.handle(LayoutEvent::Placed(Point::new(3.0, 3.0)));
        let area = registry.area(&1).unwrap();
        assert!(area.shape().is_rectangle());
        assert_eq!(area.size(), Some(Size::new(8.0, 8.0)));

        tracker.handle(LayoutEvent::Attach);
        let area = registry.area(&1).unwrap();
        assert_eq!(area.shape(), &rounded(2.0));
        assert_eq!(area.position(), Some(Point::new(3.0, 3.0)));
    }

    #[test]
    fn placement_while_detached_keeps_state() {
        let registry = Arc::new(AreaRegistry::new());
        let mut tracker = AreaTracker::new(1_u32, &registry, AreaShape::Rectangle);

        tracker.on_placed(Point::new(4.0, 4.0));
        assert_eq!(tracker.state(), TrackerState::Detached);
        assert_eq!(registry.area(&1).unwrap().position(), Some(Point::new(4.0, 4.0)));

        tracker.on_attach();
        tracker.on_detach();
        tracker.on_placed(Point::new(5.0, 5.0));
        assert_eq!(tracker.state(), TrackerState::Detached);

        tracker.on_attach();
        tracker.on_placed(Point::new(6.0, 6.0));
        assert_eq!(tracker.state(), TrackerState::Placed);
    }

    #[test]
    fn shape_only_change_keeps_geometry() {
        let registry = Arc::new(AreaRegistry::new());
        let mut tracker = AreaTracker::new(1_u32, &registry, AreaShape::Rectangle);
        tracker.on_attach();
        tracker.on_placed(Point::new(1.0, 1.0));

        TrackerConfig::new(1, &registry)
            .with_shape(rounded(6.0))
            .update(&mut tracker);

        let area = registry.area(&1).unwrap();
        assert_eq!(area.shape(), &rounded(6.0));
        assert_eq!(area.position(), Some(Point::new(1.0, 1.0)));
        assert_eq!(tracker.state(), TrackerState::Placed);
    }

    #[test]
    fn moving_to_another_registry_clears_the_old_one() {
        let first = Arc::new(AreaRegistry::new());
        let second = Arc::new(AreaRegistry::new());
        let mut tracker = AreaTracker::new(1_u32, &first, AreaShape::Rectangle);
        tracker.on_attach();
        tracker.on_placed(Point::new(1.0, 1.0));

        TrackerConfig::new(1, &second).update(&mut tracker);

        assert!(first.is_empty());
        let area = second.area(&1).unwrap();
        assert_eq!(area.position(), None);
        assert!(Arc::ptr_eq(&tracker.registry().unwrap(), &second));
    }

    #[test]
    fn dropped_registry_makes_events_noops() {
        let registry = Arc::new(AreaRegistry::new());
        let mut tracker = AreaTracker::new(1_u32, &registry, AreaShape::Rectangle);
        tracker.on_attach();
        drop(registry);

        assert!(tracker.registry().is_none());
        tracker.on_placed(Point::ZERO);
        tracker.on_remeasured(Size::new(1.0, 1.0));
        tracker.on_detach();
        assert_eq!(tracker.state(), TrackerState::Detached);
    }

    #[test]
    fn config_equality_uses_registry_identity() {
        let first = Arc::new(AreaRegistry::new());
        let second = Arc::new(AreaRegistry::new());
        let a = TrackerConfig::new(1_u32, &first);

        assert_eq!(a, TrackerConfig::new(1, &first));
        assert_ne!(a, TrackerConfig::new(1, &second));
        assert_ne!(a, TrackerConfig::new(2, &first));
        assert_ne!(a, a.clone().with_shape(rounded(1.0)));
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_backdrop --heading-base-level=0

//! Understory Backdrop: a shared registry of screen areas for backdrop blur.
//!
//! A blur renderer needs to know which regions of the screen to sample from.
//! Each region belongs to one UI element, and that element moves, resizes,
//! changes its clip shape, or disappears as layout proceeds. This crate keeps
//! that bookkeeping consistent:
//!
//! - [`AreaRegistry`]: the shared map from an opaque key to an [`Area`]
//!   (root-space position, size, and [`AreaShape`]). Fields are merged
//!   independently, and readers take an [`AreaSnapshot`] that never mixes two
//!   half-applied updates.
//! - [`AreaTracker`]: a small per-element state machine implementing
//!   [`LayoutLifecycle`]. It turns attach/placement/measurement/reset/detach
//!   callbacks from the host layout engine into registry updates, and clears the
//!   old key when it is repurposed for another element.
//!
//! The crate does not render anything and does not drive layout. The host
//! engine calls the tracker synchronously; the renderer polls the registry.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kurbo::{Point, RoundedRectRadii, Size};
//! use understory_backdrop::{AreaRegistry, AreaShape, LayoutLifecycle, TrackerConfig};
//!
//! // One registry per rendering session, shared with every tracker.
//! let registry = Arc::new(AreaRegistry::new());
//!
//! let shape = AreaShape::RoundedRectangle(RoundedRectRadii::from_single_radius(12.0));
//! let mut toolbar = TrackerConfig::new(1_u32, &registry)
//!     .with_shape(shape.clone())
//!     .create();
//!
//! // Host layout engine callbacks.
//! toolbar.on_attach();
//! toolbar.on_placed(Point::new(10.0, 20.0));
//! toolbar.on_remeasured(Size::new(100.0, 50.0));
//!
//! // Renderer side.
//! let snapshot = registry.snapshot();
//! let area = snapshot.get(&1).unwrap();
//! assert_eq!(area.position(), Some(Point::new(10.0, 20.0)));
//! assert_eq!(area.size(), Some(Size::new(100.0, 50.0)));
//! assert_eq!(area.shape(), &shape);
//!
//! // Only re-read when something changed.
//! assert!(registry.snapshot_if_changed(snapshot.revision()).is_none());
//!
//! toolbar.on_detach();
//! assert!(registry.snapshot().is_empty());
//! ```
//!
//! ## Reuse
//!
//! When a host recycles a node for a different logical element, it typically
//! resets it and then hands it a new configuration. The tracker clears the area
//! under the old key (and on the old registry) before reporting under the new
//! one, so no stale area survives under an abandoned identity:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use understory_backdrop::{AreaRegistry, LayoutLifecycle, TrackerConfig};
//!
//! let registry = Arc::new(AreaRegistry::new());
//! let mut tracker = TrackerConfig::new("a", &registry).create();
//! tracker.on_attach();
//!
//! TrackerConfig::new("b", &registry).update(&mut tracker);
//! assert!(!registry.contains(&"a"));
//! assert!(registry.contains(&"b"));
//! ```
//!
//! ## Change tracking
//!
//! Renderers can poll in three ways: take a full [`AreaRegistry::snapshot`]
//! every frame, compare [`AreaRegistry::revision`] and call
//! [`AreaRegistry::snapshot_if_changed`], or drain the changed keys with
//! [`AreaRegistry::take_dirty`]. The last one needs a registry built with
//! [`AreaRegistry::with_dirty_tracking`], and that registry must be drained
//! regularly. Re-sending a value that is already stored (compared bit for bit)
//! does not count as a change.
//!
//! ## Logging
//!
//! Mutations are reported through [`tracing`] at `trace` level; the crate never
//! installs a subscriber.

mod area;
mod lifecycle;
mod registry;
mod tracker;

pub use area::{Area, AreaShape};
pub use lifecycle::{LayoutEvent, LayoutLifecycle};
pub use registry::{AreaRegistry, AreaSnapshot};
pub use tracker::{AreaTracker, TrackerConfig, TrackerState};

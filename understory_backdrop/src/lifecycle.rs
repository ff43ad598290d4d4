// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout lifecycle callbacks consumed from the host layout engine.
//!
//! The host calls these synchronously during its own passes. Implementors must
//! tolerate any ordering: a `placed` may arrive before `attach`, a `reset` may
//! arrive on a node that was never placed, and so on.

use kurbo::{Point, Size};

/// A single lifecycle event, for hosts that queue events before delivering them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutEvent {
    /// The element entered the live layout tree.
    Attach,
    /// The element's position in root coordinates was finalized.
    Placed(Point),
    /// The element's size changed.
    Remeasured(Size),
    /// The node is being recycled for a different logical element.
    Reset,
    /// The element left the live layout tree.
    Detach,
}

/// Callback contract between a host layout engine and a per-element node.
pub trait LayoutLifecycle {
    /// Caller-supplied parameters that can change without a detach/attach cycle.
    type Config;

    /// Called once when the element enters the live layout tree.
    fn on_attach(&mut self);

    /// Called when the element's position in root coordinates is finalized.
    fn on_placed(&mut self, root_position: Point);

    /// Called whenever the element's size changes.
    fn on_remeasured(&mut self, size: Size);

    /// Called when the node is recycled; identity may change with the next
    /// configuration update.
    fn on_reset(&mut self);

    /// Called once when the element leaves the live layout tree.
    fn on_detach(&mut self);

    /// Called when the caller-supplied parameters change in place.
    fn on_configuration_changed(&mut self, config: Self::Config);

    /// Dispatches `event` to the matching callback.
    fn handle(&mut self, event: LayoutEvent) {
        match event {
            LayoutEvent::Attach => self.on_attach(),
            LayoutEvent::Placed(position) => self.on_placed(position),
            LayoutEvent::Remeasured(size) => self.on_remeasured(size),
            LayoutEvent::Reset => self.on_reset(),
            LayoutEvent::Detach => self.on_detach(),
        }
    }
}

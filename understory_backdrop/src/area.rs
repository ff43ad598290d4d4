// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Area records: the geometry stored for one tracked element.

use kurbo::{BezPath, Point, Rect, RoundedRectRadii, Size};

/// Clip descriptor for an [`Area`].
///
/// The registry treats shapes as opaque values and only compares them for
/// equality. Interpreting a shape against the area bounds is up to the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AreaShape {
    /// No clipping: the full rectangle of the area.
    #[default]
    Rectangle,
    /// Rectangle with rounded corners.
    RoundedRectangle(RoundedRectRadii),
    /// Arbitrary outline, in coordinates local to the area origin.
    Path(BezPath),
}

impl AreaShape {
    /// Returns `true` if this shape does not clip the area.
    #[must_use]
    pub fn is_rectangle(&self) -> bool {
        matches!(self, Self::Rectangle)
    }
}

/// Current geometry of one tracked element.
///
/// Fields are filled in independently as lifecycle events arrive, so an area
/// may be partially populated. Position is expressed in the shared root
/// coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct Area<K> {
    pub(crate) key: K,
    pub(crate) position: Option<Point>,
    pub(crate) size: Option<Size>,
    pub(crate) shape: AreaShape,
}

impl<K> Area<K> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            position: None,
            size: None,
            shape: AreaShape::Rectangle,
        }
    }

    /// The identity this area is registered under.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Position in root coordinates, once the element has been placed.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Size, once the element has been measured.
    pub fn size(&self) -> Option<Size> {
        self.size
    }

    /// Clip shape. [`AreaShape::Rectangle`] until one is set.
    pub fn shape(&self) -> &AreaShape {
        &self.shape
    }

    /// Root-space bounds, when both position and size are known.
    pub fn bounds(&self) -> Option<Rect> {
        Some(Rect::from_origin_size(self.position?, self.size?))
    }

    /// Returns `true` if the area can contribute blur output.
    ///
    /// That requires a known position and a known, non-empty size.
    pub fn is_valid(&self) -> bool {
        self.position.is_some() && self.size.is_some_and(|size| !size.is_zero_area())
    }
}

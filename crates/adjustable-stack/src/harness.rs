#![forbid(unsafe_code)]

//! Size access for resizable elements.
//!
//! The resize engine never owns the elements it distributes space across.
//! Everything it learns about an element, and every size it commits, goes
//! through a [`ResizeHarness`]. Hosts implement the trait once per element
//! type (and per axis, if the element type is two-dimensional).
//!
//! [`StackItem`] and [`ItemHarness`] are a ready-made element/harness pair
//! used by [`AdjustableStack`](crate::AdjustableStack) and by tests.

use serde::{Deserialize, Serialize};

/// Read/write access to the size of a resizable element along the resize axis.
///
/// Implementations are stateless strategy objects; a single harness value is
/// shared by every element in a stack.
pub trait ResizeHarness<T> {
    /// Whether the element participates in resize distribution.
    ///
    /// Disabled elements contribute no resizable space and are skipped by
    /// element slices.
    fn is_enabled(&self, element: &T) -> bool;

    /// Floor size of the element.
    fn minimum_size(&self, element: &T) -> f64;

    /// Currently allocated size of the element.
    fn size(&self, element: &T) -> f64;

    /// Commit a new size.
    fn set_size(&self, element: &mut T, size: f64);

    /// How far the element can shrink before reaching its minimum.
    fn resizable_space(&self, element: &T) -> f64 {
        self.size(element) - self.minimum_size(element)
    }

    /// Grow (or shrink, for negative `delta`) the element without clamping.
    fn change_size(&self, element: &mut T, delta: f64) {
        let size = self.size(element);
        self.set_size(element, size + delta);
    }

    /// Apply `delta`, clamped so the element never ends below its minimum.
    ///
    /// Returns the delta that was actually applied. When the element already
    /// sits below its minimum the result is positive even for a negative
    /// request.
    fn try_resize(&self, element: &mut T, delta: f64) -> f64 {
        let original = self.size(element);
        let minimum = self.minimum_size(element);
        let resized = minimum.max(original + delta);
        debug_assert!(
            resized >= 0.0,
            "harness reported a negative minimum size ({minimum})"
        );
        self.set_size(element, resized);
        resized - original
    }
}

fn default_enabled() -> bool {
    true
}

/// Plain element record: a size, its floor, and a participation flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackItem {
    /// Allocated size along the stack axis.
    pub size: f64,
    /// Measured minimum size along the stack axis.
    pub minimum_size: f64,
    /// Whether the item takes part in resizing.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl StackItem {
    /// Create an enabled item.
    #[must_use]
    pub const fn new(size: f64, minimum_size: f64) -> Self {
        Self {
            size,
            minimum_size,
            enabled: true,
        }
    }

    /// Same item, excluded from resizing.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// `size - minimum_size`.
    #[must_use]
    pub fn resizable_space(&self) -> f64 {
        self.size - self.minimum_size
    }
}

impl Default for StackItem {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Harness for [`StackItem`] elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemHarness;

impl ResizeHarness<StackItem> for ItemHarness {
    fn is_enabled(&self, element: &StackItem) -> bool {
        element.enabled
    }

    fn minimum_size(&self, element: &StackItem) -> f64 {
        element.minimum_size
    }

    fn size(&self, element: &StackItem) -> f64 {
        element.size
    }

    fn set_size(&self, element: &mut StackItem, size: f64) {
        element.size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resizable_space_is_size_above_minimum() {
        let item = StackItem::new(120.0, 45.0);
        assert_eq!(ItemHarness.resizable_space(&item), 75.0);
        assert_eq!(item.resizable_space(), 75.0);
    }

    #[test]
    fn change_size_does_not_clamp() {
        let mut item = StackItem::new(10.0, 8.0);
        ItemHarness.change_size(&mut item, -5.0);
        assert_eq!(item.size, 5.0);
    }

    #[test]
    fn try_resize_clamps_at_minimum() {
        let mut item = StackItem::new(100.0, 60.0);
        let applied = ItemHarness.try_resize(&mut item, -55.0);
        assert_eq!(applied, -40.0);
        assert_eq!(item.size, 60.0);
    }

    #[test]
    fn try_resize_grows_freely() {
        let mut item = StackItem::new(100.0, 60.0);
        assert_eq!(ItemHarness.try_resize(&mut item, 25.0), 25.0);
        assert_eq!(item.size, 125.0);
    }

    #[test]
    fn try_resize_restores_undersized_element() {
        let mut item = StackItem::new(40.0, 50.0);
        let applied = ItemHarness.try_resize(&mut item, -5.0);
        assert_eq!(applied, 10.0);
        assert_eq!(item.size, 50.0);
    }

    #[test]
    fn disabled_item_reports_not_enabled() {
        let item = StackItem::new(10.0, 0.0).disabled();
        assert!(!ItemHarness.is_enabled(&item));
    }

    #[test]
    fn item_deserializes_with_default_enabled() {
        let item: StackItem =
            serde_json::from_str(r#"{"size":30.0,"minimum_size":10.0}"#).expect("valid item");
        assert!(item.enabled);
        assert_eq!(item, StackItem::new(30.0, 10.0));
    }
}

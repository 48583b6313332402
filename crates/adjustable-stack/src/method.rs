#![forbid(unsafe_code)]

//! Strategies for spreading a size change across an element slice.
//!
//! Both strategies take a signed request: positive grows the slice, negative
//! shrinks it. They return the change actually applied, which for shrinking
//! may be smaller in magnitude than requested when the slice runs out of
//! resizable space.
//!
//! # Invariants
//!
//! 1. A zero request never touches any element and returns `0.0`.
//! 2. No element is driven below its minimum size.
//! 3. Growing is always fully satisfied for a non-empty slice.

use serde::{Deserialize, Serialize};

use crate::harness::ResizeHarness;
use crate::slice::ElementSlice;

/// Distribution strategy for one side of a resizer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ResizeMethod {
    /// Leave the slice untouched.
    #[default]
    None,
    /// Sequential, front-loaded: grow the nearest element only, shrink the
    /// nearest element first and move on once it bottoms out.
    Cascade,
    /// Proportional: grow every element equally, shrink each in proportion
    /// to its share of the slice's resizable space.
    SqueezeExpand,
}

impl ResizeMethod {
    /// Apply `requested` to `slice`.
    ///
    /// `slice_space` is the current total resizable space of the slice; see
    /// [`ElementSlice::resizable_space`].
    pub fn run<T, H>(
        self,
        elements: &mut [T],
        slice: ElementSlice,
        harness: &H,
        requested: f64,
        slice_space: f64,
    ) -> f64
    where
        H: ResizeHarness<T> + ?Sized,
    {
        if requested == 0.0 {
            return 0.0;
        }
        match self {
            Self::None => 0.0,
            Self::Cascade => cascade(elements, slice, harness, requested),
            Self::SqueezeExpand => squeeze_expand(elements, slice, harness, requested, slice_space),
        }
    }
}

fn squeeze_expand<T, H>(
    elements: &mut [T],
    slice: ElementSlice,
    harness: &H,
    requested: f64,
    slice_space: f64,
) -> f64
where
    H: ResizeHarness<T> + ?Sized,
{
    if requested > 0.0 {
        if slice.is_empty() {
            return 0.0;
        }
        let share = requested / slice.len() as f64;
        let mut cursor = slice.cursor();
        while let Some(index) = cursor.next_index(elements, harness) {
            harness.change_size(&mut elements[index], share);
        }
        return requested;
    }

    // Never take more than the slice can give.
    let reduction = (-requested).min(slice_space);
    if reduction <= 0.0 {
        return 0.0;
    }

    let mut cursor = slice.cursor();
    while let Some(index) = cursor.next_index(elements, harness) {
        let element = &mut elements[index];
        let share = harness.resizable_space(element) / slice_space;
        harness.try_resize(element, -reduction * share);
    }

    -reduction
}

fn cascade<T, H>(elements: &mut [T], slice: ElementSlice, harness: &H, requested: f64) -> f64
where
    H: ResizeHarness<T> + ?Sized,
{
    let mut cursor = slice.cursor();

    if requested > 0.0 {
        let Some(first) = cursor.next_index(elements, harness) else {
            return 0.0;
        };
        harness.change_size(&mut elements[first], requested);
        return requested;
    }

    let mut remaining = -requested;
    while let Some(index) = cursor.next_index(elements, harness) {
        remaining += harness.try_resize(&mut elements[index], -remaining);
        if remaining <= 0.0 {
            break;
        }
    }

    requested + remaining
}

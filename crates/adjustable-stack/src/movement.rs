#![forbid(unsafe_code)]

//! A single resizer's share of a gesture.
//!
//! A [`ResizeMovement`] names a resizer relative to the one being dragged
//! (`index_offset`), a transformation of the raw drag delta, and the zone
//! whose strategies distribute the change on each side.
//!
//! # Edge policy
//!
//! Each side of the resizer either has its elements resized or lets its
//! stack edge follow the resizer:
//!
//! - The trailing edge follows when it may move, the gesture does not set
//!   [`ResizeFlags::PREFER_RESIZE_AFTER`], and there are elements before the
//!   resizer to resize. So resizer `i` of a start-aligned stack resizes
//!   element `i` and grows or shrinks the stack.
//! - Otherwise the leading edge follows under the mirrored conditions, so a
//!   stack aligned to its end resizes element `i + 1`.
//! - A side that is resized while shrinking may come up short. A movable edge
//!   on that side takes the remainder; with a fixed edge the movement is cut
//!   short to what the elements gave.
//!
//! [`ResizeMovement::execute`] reports how far each stack edge moved as an
//! [`EdgeShift`]; the change in total stack size is trailing edge
//! displacement minus leading edge displacement.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::harness::ResizeHarness;
use crate::info::{ResizeFlags, ResizeInfo};
use crate::method::ResizeMethod;
use crate::mode::ResizerMode;
use crate::slice::ElementSlice;

/// How a movement derives its own delta from the raw drag delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmountTransform {
    /// Pass the delta through.
    #[default]
    Maintain,
    /// Flip the sign.
    Negate,
    /// Opposite movement, rescaled from the space before the dragged resizer
    /// to the space after the target resizer.
    MirrorIntoAfter,
    /// Opposite movement, rescaled from the space after the dragged resizer
    /// to the space before the target resizer.
    MirrorIntoBefore,
}

impl AmountTransform {
    /// Transform `amount`.
    ///
    /// `active_space` and `target_space` are the resizable spaces before the
    /// dragged and the target resizer; `total_space` is the stack total.
    #[must_use]
    pub fn apply(self, amount: f64, active_space: f64, target_space: f64, total_space: f64) -> f64 {
        match self {
            Self::Maintain => amount,
            Self::Negate => -amount,
            Self::MirrorIntoAfter => -scale(amount, active_space, total_space - target_space),
            Self::MirrorIntoBefore => -scale(amount, total_space - active_space, target_space),
        }
    }
}

/// `input * current / original`, or `input` when either space is empty.
fn scale(input: f64, original: f64, current: f64) -> f64 {
    if original == 0.0 || current == 0.0 {
        return input;
    }
    input * current / original
}

/// Signed displacement of the two stack edges.
///
/// Positive values move an edge toward the end of the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeShift {
    pub start: f64,
    pub end: f64,
}

impl EdgeShift {
    /// Change in total stack size.
    #[must_use]
    pub fn stack_change(self) -> f64 {
        self.end - self.start
    }
}

impl AddAssign for EdgeShift {
    fn add_assign(&mut self, other: Self) {
        self.start += other.start;
        self.end += other.end;
    }
}

/// One resizer's adjustment within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeMovement {
    /// Target resizer relative to the dragged one.
    pub index_offset: isize,
    #[serde(default)]
    pub transform: AmountTransform,
    /// Zone whose strategies apply on each side of the target.
    pub mode: ResizerMode,
}

impl ResizeMovement {
    #[must_use]
    pub const fn new(index_offset: isize, transform: AmountTransform, mode: ResizerMode) -> Self {
        Self {
            index_offset,
            transform,
            mode,
        }
    }

    /// Absolute index of the resizer this movement drives.
    #[must_use]
    pub const fn target_index(&self, active_resizer_index: isize) -> isize {
        active_resizer_index.saturating_add(self.index_offset)
    }

    /// Delta this movement applies to resizer `target`.
    #[must_use]
    pub fn transformed_amount(&self, info: &ResizeInfo<'_>, target: isize) -> f64 {
        self.transform.apply(
            info.requested_change(),
            info.space_before_resizer(info.active_resizer_index()),
            info.space_before_resizer(target),
            info.total_resize_space(),
        )
    }

    /// Whether resizer `target` can move by the transformed delta without
    /// overrunning a fixed edge.
    #[must_use]
    pub fn is_valid(&self, target: isize, info: &ResizeInfo<'_>) -> bool {
        let flags = info.flags;
        if info.elements_before(target).is_empty() && !flags.can_move_start() {
            return false;
        }
        if info.elements_after(target).is_empty() && !flags.can_move_end() {
            return false;
        }

        let amount = self.transformed_amount(info, target);
        if amount > 0.0 {
            flags.can_move_end() || amount <= info.space_after_resizer(target)
        } else {
            flags.can_move_start() || -amount <= info.space_before_resizer(target)
        }
    }

    /// Move resizer `target`, returning how far each stack edge moved.
    ///
    /// With a fixed edge the resizer may stop short of the transformed
    /// delta when the shrinking side runs out of space.
    pub fn execute<T, H>(
        &self,
        elements: &mut [T],
        target: isize,
        info: &ResizeInfo<'_>,
        harness: &H,
    ) -> EdgeShift
    where
        H: ResizeHarness<T> + ?Sized,
    {
        let amount = self.transformed_amount(info, target);
        if amount == 0.0 {
            return EdgeShift::default();
        }

        let flags = info.flags;
        let mut before = Side {
            slice: info.elements_before(target),
            method: self.mode.methods().0,
            edge_movable: flags.can_move_start(),
            follows: false,
        };
        let mut after = Side {
            slice: info.elements_after(target),
            method: self.mode.methods().1,
            edge_movable: flags.can_move_end(),
            follows: false,
        };

        // An empty side pinned to a fixed edge leaves the resizer nowhere to go.
        if before.is_pinned() || after.is_pinned() {
            return EdgeShift::default();
        }
        if before.slice.is_empty() && after.slice.is_empty() {
            return EdgeShift::default();
        }

        // At most one edge follows the resizer, and only while something on
        // the opposite side can still be resized.
        after.follows = after.edge_movable
            && !flags.contains(ResizeFlags::PREFER_RESIZE_AFTER)
            && !before.slice.is_empty();
        before.follows = before.edge_movable
            && !flags.contains(ResizeFlags::PREFER_RESIZE_BEFORE)
            && !after.slice.is_empty()
            && !after.follows;

        if amount > 0.0 {
            let (moved, end_shift) = after.give_way(elements, harness, amount);
            let start_shift = before.take_up(elements, harness, moved);
            EdgeShift {
                start: start_shift,
                end: end_shift,
            }
        } else {
            let (moved, start_shift) = before.give_way(elements, harness, -amount);
            let end_shift = after.take_up(elements, harness, moved);
            EdgeShift {
                start: -start_shift,
                end: -end_shift,
            }
        }
    }
}

/// One side of a resizer during execution.
#[derive(Debug, Clone, Copy)]
struct Side {
    slice: ElementSlice,
    method: ResizeMethod,
    edge_movable: bool,
    /// The stack edge on this side moves with the resizer instead of the
    /// side's elements being resized.
    follows: bool,
}

impl Side {
    fn is_pinned(&self) -> bool {
        self.slice.is_empty() && !self.edge_movable
    }

    /// Shrink this side by up to `amount` so the resizer can move toward it.
    ///
    /// Returns how far the resizer moves and how far the adjacent stack edge
    /// moves with it, both as magnitudes.
    fn give_way<T, H>(&self, elements: &mut [T], harness: &H, amount: f64) -> (f64, f64)
    where
        H: ResizeHarness<T> + ?Sized,
    {
        if self.follows {
            return (amount, amount);
        }

        // Earlier movements of the same gesture may have resized this slice.
        let space = self.slice.resizable_space(elements, harness);
        let absorbed = -self
            .method
            .run(elements, self.slice, harness, -amount, space);
        if self.edge_movable {
            (amount, (amount - absorbed).max(0.0))
        } else {
            (absorbed, 0.0)
        }
    }

    /// Grow this side by `moved`; returns how far the adjacent edge moves
    /// instead when the side follows or has no elements.
    fn take_up<T, H>(&self, elements: &mut [T], harness: &H, moved: f64) -> f64
    where
        H: ResizeHarness<T> + ?Sized,
    {
        if self.follows || self.slice.is_empty() {
            return moved;
        }
        let space = self.slice.resizable_space(elements, harness);
        self.method.run(elements, self.slice, harness, moved, space);
        0.0
    }
}

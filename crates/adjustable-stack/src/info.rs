#![forbid(unsafe_code)]

//! Per-pass aggregate state for resize distribution.
//!
//! [`ResizeInfo`] is rebuilt at the start of every measure pass by scanning
//! the element list once, in order. It records, for each position, the
//! cumulative resizable space and the number of disabled elements seen so
//! far, which lets movements size their element slices and validate a
//! request without walking the list again.
//!
//! The per-element records live in a caller-provided buffer so the hot
//! layout path does not allocate. A `ResizeInfo` borrows that buffer for the
//! duration of one pass and is then dropped.
//!
//! # Resizer indices
//!
//! Resizer `i` sits after element `i`. Index `-1` is the stack's leading edge
//! and `len - 1` its trailing edge.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::harness::ResizeHarness;
use crate::slice::ElementSlice;

bitflags! {
    /// Edge and preference policy for one resize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ResizeFlags: u8 {
        /// The leading edge of the stack may move, growing or shrinking the
        /// stack instead of redistributing space among elements.
        const CAN_MOVE_STACK_START = 0b0001;
        /// The trailing edge of the stack may move.
        const CAN_MOVE_STACK_END   = 0b0010;
        /// Shrink the elements before a resizer even when the leading edge
        /// could absorb the change.
        const PREFER_RESIZE_BEFORE = 0b0100;
        /// Shrink the elements after a resizer even when the trailing edge
        /// could absorb the change.
        const PREFER_RESIZE_AFTER  = 0b1000;
    }
}

impl ResizeFlags {
    /// Both stack edges may move.
    pub const BOTH_EDGES: Self = Self::CAN_MOVE_STACK_START.union(Self::CAN_MOVE_STACK_END);

    /// Both sides are resized in preference to moving an edge.
    pub const PREFER_RESIZE: Self = Self::PREFER_RESIZE_BEFORE.union(Self::PREFER_RESIZE_AFTER);

    #[must_use]
    pub const fn can_move_start(self) -> bool {
        self.contains(Self::CAN_MOVE_STACK_START)
    }

    #[must_use]
    pub const fn can_move_end(self) -> bool {
        self.contains(Self::CAN_MOVE_STACK_END)
    }

    /// Lowest resizer index reachable under these flags.
    #[must_use]
    pub const fn first_resizer(self) -> isize {
        if self.can_move_start() { -1 } else { 0 }
    }

    /// Highest resizer index reachable under these flags for `count` elements.
    #[must_use]
    pub const fn last_resizer(self, count: usize) -> isize {
        let count = count as isize;
        if self.can_move_end() {
            count - 1
        } else {
            count - 2
        }
    }
}

/// Cumulative record for one element position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeElementInfo {
    /// Resizable space of enabled elements at or before this position.
    pub resizable_space_before: f64,
    /// Minimum size of enabled elements at or before this position.
    pub minimum_space_before: f64,
    /// Disabled elements strictly before this position.
    pub disabled_elements_before: usize,
}

/// Errors raised while building a [`ResizeInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeInfoError {
    /// More elements were added than the buffer can hold.
    CapacityExceeded { capacity: usize },
}

impl fmt::Display for ResizeInfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "resize info is at capacity ({capacity} elements)")
            }
        }
    }
}

impl std::error::Error for ResizeInfoError {}

/// Aggregate state of one measure pass.
#[derive(Debug)]
pub struct ResizeInfo<'buf> {
    entries: &'buf mut [ResizeElementInfo],
    len: usize,
    disabled_count: usize,
    active_resizer_index: isize,
    requested_change: f64,
    /// Edge and preference policy, widened by gestures during execution.
    pub flags: ResizeFlags,
}

impl<'buf> ResizeInfo<'buf> {
    /// Empty aggregate over `buffer`; capacity is `buffer.len()`.
    pub fn new(buffer: &'buf mut [ResizeElementInfo]) -> Self {
        Self {
            entries: buffer,
            len: 0,
            disabled_count: 0,
            active_resizer_index: 0,
            requested_change: 0.0,
            flags: ResizeFlags::empty(),
        }
    }

    /// Scan `elements` in order into `buffer`.
    pub fn build<T, H>(
        elements: &[T],
        harness: &H,
        buffer: &'buf mut [ResizeElementInfo],
    ) -> Result<Self, ResizeInfoError>
    where
        H: ResizeHarness<T> + ?Sized,
    {
        let mut info = Self::new(buffer);
        for element in elements {
            info.add_element(element, harness)?;
        }
        Ok(info)
    }

    /// Append the next element in list order.
    ///
    /// # Errors
    ///
    /// [`ResizeInfoError::CapacityExceeded`] when the buffer is already full.
    /// The buffer must hold one entry per element, so this means the caller
    /// sized it for a different element list; the pass should be abandoned
    /// rather than retried with the same buffer.
    pub fn add_element<T, H>(&mut self, element: &T, harness: &H) -> Result<(), ResizeInfoError>
    where
        H: ResizeHarness<T> + ?Sized,
    {
        if self.len >= self.entries.len() {
            return Err(ResizeInfoError::CapacityExceeded {
                capacity: self.entries.len(),
            });
        }

        let previous = self.len.checked_sub(1).map(|last| self.entries[last]);
        let enabled = harness.is_enabled(element);
        let (space, minimum) = if enabled {
            (
                harness.resizable_space(element),
                harness.minimum_size(element),
            )
        } else {
            (0.0, 0.0)
        };

        self.entries[self.len] = ResizeElementInfo {
            resizable_space_before: previous.map_or(0.0, |p| p.resizable_space_before) + space,
            minimum_space_before: previous.map_or(0.0, |p| p.minimum_space_before) + minimum,
            disabled_elements_before: self.disabled_count,
        };

        if !enabled {
            self.disabled_count += 1;
        }
        self.len += 1;
        Ok(())
    }

    /// Record which resizer moved and by how much.
    #[must_use]
    pub fn with_request(mut self, active_resizer_index: isize, requested_change: f64) -> Self {
        self.active_resizer_index = active_resizer_index;
        self.requested_change = requested_change;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ResizeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn active_resizer_index(&self) -> isize {
        self.active_resizer_index
    }

    /// Raw drag delta; positive moves the resizer toward the trailing edge.
    #[must_use]
    pub fn requested_change(&self) -> f64 {
        self.requested_change
    }

    /// Elements recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is anything to do this pass.
    #[must_use]
    pub fn has_request(&self) -> bool {
        self.requested_change != 0.0 && self.len > 0
    }

    /// Disabled elements strictly before element `index`.
    #[must_use]
    pub fn disabled_elements_before(&self, index: isize) -> usize {
        match usize::try_from(index) {
            Err(_) => 0,
            Ok(index) if index >= self.len => self.disabled_count,
            Ok(index) => self.entries[index].disabled_elements_before,
        }
    }

    /// Resizable space of the elements before resizer `resizer_index`.
    #[must_use]
    pub fn space_before_resizer(&self, resizer_index: isize) -> f64 {
        match usize::try_from(resizer_index) {
            Err(_) => 0.0,
            Ok(_) if self.len == 0 => 0.0,
            Ok(index) => self.entries[index.min(self.len - 1)].resizable_space_before,
        }
    }

    /// Resizable space of the elements after resizer `resizer_index`.
    #[must_use]
    pub fn space_after_resizer(&self, resizer_index: isize) -> f64 {
        self.total_resize_space() - self.space_before_resizer(resizer_index)
    }

    #[must_use]
    pub fn total_resize_space(&self) -> f64 {
        self.last().map_or(0.0, |last| last.resizable_space_before)
    }

    /// Sum of the minimum sizes of all enabled elements.
    #[must_use]
    pub fn total_minimum_space(&self) -> f64 {
        self.last().map_or(0.0, |last| last.minimum_space_before)
    }

    /// Total size of all enabled elements.
    #[must_use]
    pub fn total_space(&self) -> f64 {
        self.total_minimum_space() + self.total_resize_space()
    }

    /// Enabled elements before resizer `resizer_index`, nearest first.
    #[must_use]
    pub fn elements_before(&self, resizer_index: isize) -> ElementSlice {
        let last = self.len as isize - 1;
        let start = resizer_index.clamp(-1, last);
        let total = (start + 1) as usize;
        let enabled = total - self.disabled_elements_before(start + 1);
        ElementSlice::backward(start, enabled)
    }

    /// Enabled elements after resizer `resizer_index`, nearest first.
    #[must_use]
    pub fn elements_after(&self, resizer_index: isize) -> ElementSlice {
        let last = self.len as isize - 1;
        let start = resizer_index.clamp(-1, last) + 1;
        let total = self.len - start as usize;
        let disabled = self.disabled_count - self.disabled_elements_before(start);
        ElementSlice::forward(start, total - disabled)
    }

    fn last(&self) -> Option<&ResizeElementInfo> {
        self.len.checked_sub(1).map(|last| &self.entries[last])
    }
}

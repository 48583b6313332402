#![forbid(unsafe_code)]

//! Non-allocating views over runs of enabled elements.
//!
//! An [`ElementSlice`] describes "the elements before resizer `i`" (walked
//! backward, nearest first) or "the elements after resizer `i`" (walked
//! forward, nearest first). The slice stores only a start position, a
//! direction and the number of *enabled* elements it covers; disabled
//! elements are skipped during iteration and do not count toward the length.
//!
//! Slices are created by [`ResizeInfo`](crate::ResizeInfo), which knows how
//! many disabled elements sit on each side of a resizer.
//!
//! # Invariants
//!
//! 1. A cursor yields at most `len` indices.
//! 2. Every yielded index is in bounds and refers to an enabled element.
//! 3. A cursor that would step outside the list stops instead.

use crate::harness::ResizeHarness;

/// A view over consecutive enabled elements, starting at `start` and walking
/// in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSlice {
    start: isize,
    reverse: bool,
    len: usize,
}

impl ElementSlice {
    /// Slice walking toward the front of the list, beginning at `start`.
    #[must_use]
    pub const fn backward(start: isize, len: usize) -> Self {
        Self {
            start,
            reverse: true,
            len,
        }
    }

    /// Slice walking toward the back of the list, beginning at `start`.
    #[must_use]
    pub const fn forward(start: isize, len: usize) -> Self {
        Self {
            start,
            reverse: false,
            len,
        }
    }

    /// Number of enabled elements covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index-yielding cursor that does not hold a borrow of the element list
    /// between steps, so callers may mutate elements while walking.
    #[must_use]
    pub const fn cursor(&self) -> SliceCursor {
        let step = if self.reverse { -1 } else { 1 };
        SliceCursor {
            position: self.start - step,
            step,
            remaining: self.len,
        }
    }

    /// Read-only iteration over `(index, element)` pairs.
    pub fn iter<'a, T, H>(&self, elements: &'a [T], harness: &'a H) -> SliceIter<'a, T, H>
    where
        H: ResizeHarness<T> + ?Sized,
    {
        SliceIter {
            cursor: self.cursor(),
            elements,
            harness,
        }
    }

    /// Current resizable space of the covered elements.
    pub fn resizable_space<T, H>(&self, elements: &[T], harness: &H) -> f64
    where
        H: ResizeHarness<T> + ?Sized,
    {
        self.iter(elements, harness)
            .map(|(_, element)| harness.resizable_space(element))
            .sum()
    }
}

/// Lending cursor over an [`ElementSlice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceCursor {
    position: isize,
    step: isize,
    remaining: usize,
}

impl SliceCursor {
    /// Advance to the next enabled element and return its index.
    pub fn next_index<T, H>(&mut self, elements: &[T], harness: &H) -> Option<usize>
    where
        H: ResizeHarness<T> + ?Sized,
    {
        while self.remaining > 0 {
            self.position += self.step;
            let Some(element) = usize::try_from(self.position)
                .ok()
                .and_then(|index| elements.get(index))
            else {
                self.remaining = 0;
                return None;
            };
            if harness.is_enabled(element) {
                self.remaining -= 1;
                return usize::try_from(self.position).ok();
            }
        }
        None
    }

    /// Enabled elements still to be yielded.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }
}

/// Iterator returned by [`ElementSlice::iter`].
#[derive(Debug)]
pub struct SliceIter<'a, T, H: ?Sized> {
    cursor: SliceCursor,
    elements: &'a [T],
    harness: &'a H,
}

impl<'a, T, H> Iterator for SliceIter<'a, T, H>
where
    H: ResizeHarness<T> + ?Sized,
{
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor.next_index(self.elements, self.harness)?;
        Some((index, &self.elements[index]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining()))
    }
}

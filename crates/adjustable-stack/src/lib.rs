#![forbid(unsafe_code)]

//! Resize distribution for interactively resizable stacks.
//!
//! # Role
//! `adjustable-stack` decides how space moves between the items of a
//! one-dimensional stack when the user drags one of the resizers between
//! them. It does no rendering and knows nothing about pointers or axes: hosts
//! feed it drag deltas and read back item sizes.
//!
//! # Primary pieces
//! - **ResizeHarness**: how the engine reads and writes an element's size.
//! - **ResizeMethod**: cascade and squeeze/expand distribution over a slice.
//! - **ResizeMovement / ResizeGesture**: what a drag on one zone of a
//!   resizer does, validated all-or-nothing.
//! - **GestureTable**: the configurable `(zone, modifier) -> gesture` map.
//! - **AdjustableStack**: a ready-made driver with measure and arrange passes.
//!
//! # Example
//! ```
//! use adjustable_stack::{AdjustableStack, StackAlignment, StackConfig, StackItem};
//!
//! let config = StackConfig {
//!     alignment: StackAlignment::Stretch,
//!     resizer_thickness: 0.0,
//! };
//! let mut stack = AdjustableStack::new(config)
//!     .with_items(vec![StackItem::new(100.0, 20.0); 3]);
//!
//! stack.measure(300.0)?;
//! stack.drag(0, 30.0)?;
//! stack.measure(300.0)?;
//!
//! let sizes: Vec<f64> = stack.items().iter().map(|item| item.size).collect();
//! assert_eq!(sizes, vec![130.0, 70.0, 100.0]);
//! # Ok::<(), adjustable_stack::StackError>(())
//! ```

pub mod gesture;
pub mod harness;
pub mod info;
pub mod method;
pub mod mode;
pub mod movement;
pub mod slice;
pub mod stack;

pub use gesture::{GestureTable, GestureTableError, ResizeGesture};
pub use harness::{ItemHarness, ResizeHarness, StackItem};
pub use info::{ResizeElementInfo, ResizeFlags, ResizeInfo, ResizeInfoError};
pub use method::ResizeMethod;
pub use mode::{KeyModifiers, ResizerMode, ResizerModifier};
pub use movement::{AmountTransform, EdgeShift, ResizeMovement};
pub use slice::{ElementSlice, SliceCursor, SliceIter};
pub use stack::{
    AdjustableStack, DEFAULT_RESIZER_THICKNESS, Span, StackAlignment, StackArrangement,
    StackConfig, StackError,
};

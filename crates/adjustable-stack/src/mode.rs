#![forbid(unsafe_code)]

//! Resizer zones and drag modifiers.
//!
//! A resizer handle has three zones: the bar itself ([`ResizerMode::Default`])
//! and an arrow on either side. The zone picks the distribution strategy for
//! each side of the resizer; the held modifier keys pick how many resizers a
//! drag moves at once. Together they select a
//! [`ResizeGesture`](crate::ResizeGesture).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::info::ResizeFlags;
use crate::method::ResizeMethod;

/// Zone of a resizer the pointer is interacting with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResizerMode {
    /// Scale everything before the resizer, cascade after it.
    ArrowBefore,
    /// Cascade on both sides.
    Default,
    /// Cascade before the resizer, scale everything after it.
    ArrowAfter,
}

impl ResizerMode {
    /// Every zone, in leading-to-trailing order.
    pub const ALL: [Self; 3] = [Self::ArrowBefore, Self::Default, Self::ArrowAfter];

    /// `(before, after)` distribution strategies.
    #[must_use]
    pub const fn methods(self) -> (ResizeMethod, ResizeMethod) {
        match self {
            Self::ArrowBefore => (ResizeMethod::SqueezeExpand, ResizeMethod::Cascade),
            Self::Default => (ResizeMethod::Cascade, ResizeMethod::Cascade),
            Self::ArrowAfter => (ResizeMethod::Cascade, ResizeMethod::SqueezeExpand),
        }
    }

    /// Whether this zone means anything on resizer `index_in_parent` of a
    /// stack with `total_children` elements.
    #[must_use]
    pub fn is_accessible(self, index_in_parent: isize, total_children: usize, flags: ResizeFlags) -> bool {
        let total = isize::try_from(total_children).unwrap_or(isize::MAX);
        match self {
            Self::Default => {
                total_children >= 2
                    || (total_children == 1 && flags.intersects(ResizeFlags::BOTH_EDGES))
            }
            Self::ArrowBefore => {
                index_in_parent > -1 && (index_in_parent > 0 || flags.can_move_start())
            }
            Self::ArrowAfter => {
                index_in_parent < total
                    && (index_in_parent < total - 1 || flags.can_move_end())
            }
        }
    }
}

/// Modifier held during a drag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ResizerModifier {
    /// Move only the dragged resizer.
    #[default]
    None,
    /// Move the dragged resizer and a neighbour together, translating the
    /// element between them.
    Move,
    /// Move the dragged resizer and a neighbour in opposite directions,
    /// growing or shrinking the element between them in place.
    ShrinkGrow,
}

bitflags! {
    /// Keyboard modifiers as reported by the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

impl ResizerModifier {
    /// Control alone moves, Shift alone shrinks/grows; any other
    /// combination is a plain drag.
    #[must_use]
    pub fn from_keys(keys: KeyModifiers) -> Self {
        if keys == KeyModifiers::CTRL {
            Self::Move
        } else if keys == KeyModifiers::SHIFT {
            Self::ShrinkGrow
        } else {
            Self::None
        }
    }
}

#![forbid(unsafe_code)]

//! Stack driver: interaction state, measure, and arrange.
//!
//! [`AdjustableStack`] owns a list of [`StackItem`]s and turns pointer and
//! keyboard input into resize gestures. Input is only recorded when it
//! arrives; all sizing happens in [`AdjustableStack::measure`], which
//!
//! 1. raises every item to its minimum size,
//! 2. executes the pending drag (if any) through the [`GestureTable`],
//! 3. fits the stack to the available extent when it overflows, or when no
//!    edge may move and space is left over.
//!
//! [`AdjustableStack::arrange`] then lays items and resizers out end to end.
//!
//! # Resizers
//!
//! Resizer `i` follows item `i`. The leading resizer (`-1`) is only laid out
//! when the stack's leading edge may move, and the trailing one (`len - 1`)
//! only when its trailing edge may move; which edges move follows from
//! [`StackAlignment`].
//!
//! # Failure Modes
//!
//! - Resizer or item indices outside the stack are rejected with
//!   [`StackError::IndexOutOfRange`].
//! - A drag the active gesture cannot satisfy is dropped at measure time
//!   without changing any item.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gesture::{GestureTable, ResizeGesture};
use crate::harness::{ItemHarness, StackItem};
use crate::info::{ResizeElementInfo, ResizeFlags, ResizeInfo, ResizeInfoError};
use crate::mode::{KeyModifiers, ResizerMode, ResizerModifier};
use crate::movement::AmountTransform;

/// Default resizer thickness along the stack axis.
pub const DEFAULT_RESIZER_THICKNESS: f64 = 4.0;

/// Where the stack sits inside its slot, which decides the movable edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StackAlignment {
    /// Pinned to the leading side; the trailing edge moves.
    #[default]
    Start,
    /// Centered; both edges move.
    Center,
    /// Pinned to the trailing side; the leading edge moves.
    End,
    /// Fills the slot; neither edge moves.
    Stretch,
}

impl StackAlignment {
    #[must_use]
    pub const fn edge_flags(self) -> ResizeFlags {
        match self {
            Self::Start => ResizeFlags::CAN_MOVE_STACK_END,
            Self::Center => ResizeFlags::BOTH_EDGES,
            Self::End => ResizeFlags::CAN_MOVE_STACK_START,
            Self::Stretch => ResizeFlags::empty(),
        }
    }

    /// Offset of a stack leaving `free` space in its slot.
    fn offset(self, free: f64) -> f64 {
        let free = free.max(0.0);
        match self {
            Self::Start | Self::Stretch => 0.0,
            Self::Center => free / 2.0,
            Self::End => free,
        }
    }
}

/// Stack configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub alignment: StackAlignment,
    /// Extent each laid-out resizer occupies.
    pub resizer_thickness: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            alignment: StackAlignment::default(),
            resizer_thickness: DEFAULT_RESIZER_THICKNESS,
        }
    }
}

/// Errors raised by [`AdjustableStack`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// An item or resizer index outside the stack.
    IndexOutOfRange { index: isize, len: usize },
    /// The per-pass aggregate could not be built.
    Info(ResizeInfoError),
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a stack of {len} items")
            }
            Self::Info(err) => write!(f, "resize info: {err}"),
        }
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Info(err) => Some(err),
            Self::IndexOutOfRange { .. } => None,
        }
    }
}

impl From<ResizeInfoError> for StackError {
    fn from(err: ResizeInfoError) -> Self {
        Self::Info(err)
    }
}

/// A run along the stack axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub length: f64,
}

impl Span {
    #[must_use]
    pub const fn new(start: f64, length: f64) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// Output of [`AdjustableStack::arrange`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackArrangement {
    /// Total extent of items and laid-out resizers.
    pub extent: f64,
    /// One span per item, in list order.
    pub items: Vec<Span>,
    /// Laid-out resizers with their indices, in list order.
    pub resizers: Vec<(isize, Span)>,
}

impl StackArrangement {
    /// Span of resizer `index`, if it was laid out.
    #[must_use]
    pub fn resizer(&self, index: isize) -> Option<Span> {
        self.resizers
            .iter()
            .find(|(candidate, _)| *candidate == index)
            .map(|(_, span)| *span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    index: isize,
    mode: ResizerMode,
    modifier: ResizerModifier,
    delta: f64,
}

/// Interactively resizable stack of items.
#[derive(Debug, Clone)]
pub struct AdjustableStack {
    config: StackConfig,
    gestures: GestureTable,
    fit: ResizeGesture,
    items: Vec<StackItem>,
    info_buffer: Vec<ResizeElementInfo>,
    hovered: Option<(isize, ResizerMode)>,
    modifier: ResizerModifier,
    pending: Option<PendingResize>,
    /// Largest extent the user has sized the stack to.
    maximum_extent: f64,
    /// Extent returned by the last measure pass.
    extent: f64,
}

impl Default for AdjustableStack {
    fn default() -> Self {
        Self::new(StackConfig::default())
    }
}

impl AdjustableStack {
    #[must_use]
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            gestures: GestureTable::standard(),
            fit: ResizeGesture::new(ResizerMode::ArrowBefore, ResizerModifier::None)
                .with_movement(0, AmountTransform::Maintain, ResizerMode::ArrowBefore),
            items: Vec::new(),
            info_buffer: Vec::new(),
            hovered: None,
            modifier: ResizerModifier::None,
            pending: None,
            maximum_extent: 0.0,
            extent: 0.0,
        }
    }

    /// Replace the gesture table.
    #[must_use]
    pub fn with_gestures(mut self, gestures: GestureTable) -> Self {
        self.gestures = gestures;
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = StackItem>) -> Self {
        self.items.extend(items);
        self
    }

    #[must_use]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StackConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn gestures(&self) -> &GestureTable {
        &self.gestures
    }

    pub fn gestures_mut(&mut self) -> &mut GestureTable {
        &mut self.gestures
    }

    /// Edge flags implied by the configured alignment.
    #[must_use]
    pub fn edge_flags(&self) -> ResizeFlags {
        self.config.alignment.edge_flags()
    }

    #[must_use]
    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut StackItem> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Extent returned by the last [`measure`](Self::measure).
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.extent
    }

    #[must_use]
    pub fn maximum_extent(&self) -> f64 {
        self.maximum_extent
    }

    pub fn push(&mut self, item: StackItem) {
        let index = self.items.len();
        self.insert_unchecked(index, item);
    }

    /// Insert `item` before position `index`.
    ///
    /// An item with no size takes an even share of the last measured extent.
    /// Hover and any pending drag are cleared since resizer indices shift.
    pub fn insert(&mut self, index: usize, item: StackItem) -> Result<(), StackError> {
        if index > self.items.len() {
            return Err(self.out_of_range(index));
        }
        self.insert_unchecked(index, item);
        Ok(())
    }

    fn insert_unchecked(&mut self, index: usize, mut item: StackItem) {
        if item.size == 0.0 && !self.items.is_empty() && self.extent > 0.0 {
            item.size = self.extent / self.items.len() as f64;
        }
        self.items.insert(index, item);
        self.reset_interaction();
    }

    /// Remove and return the item at `index`.
    pub fn remove(&mut self, index: usize) -> Result<StackItem, StackError> {
        if index >= self.items.len() {
            return Err(self.out_of_range(index));
        }
        let item = self.items.remove(index);
        self.reset_interaction();
        Ok(item)
    }

    /// Point at zone `mode` of resizer `index`, or at nothing with `None`.
    pub fn hover(&mut self, index: isize, mode: Option<ResizerMode>) -> Result<(), StackError> {
        self.check_resizer(index)?;
        self.hovered = mode.map(|mode| (index, mode));
        Ok(())
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    #[must_use]
    pub fn hovered(&self) -> Option<(isize, ResizerMode)> {
        self.hovered
    }

    pub fn set_modifier(&mut self, modifier: ResizerModifier) {
        self.modifier = modifier;
    }

    /// Derive the modifier from the held keys.
    pub fn set_keys(&mut self, keys: KeyModifiers) {
        self.set_modifier(ResizerModifier::from_keys(keys));
    }

    #[must_use]
    pub fn modifier(&self) -> ResizerModifier {
        self.modifier
    }

    /// Queue a drag of resizer `index` by `delta`, applied on the next
    /// [`measure`](Self::measure).
    ///
    /// The zone is the hovered one when `index` is hovered, otherwise the
    /// bar itself. Consecutive drags of the same resizer under the same
    /// gesture accumulate; a drag under a different gesture replaces the
    /// queued one.
    pub fn drag(&mut self, index: isize, delta: f64) -> Result<(), StackError> {
        self.check_resizer(index)?;
        if delta == 0.0 || !delta.is_finite() {
            return Ok(());
        }

        let mode = match self.hovered {
            Some((hovered, mode)) if hovered == index => mode,
            _ => ResizerMode::Default,
        };
        let modifier = self.modifier;

        match &mut self.pending {
            Some(pending)
                if pending.index == index
                    && pending.mode == mode
                    && pending.modifier == modifier =>
            {
                pending.delta += delta;
            }
            slot => {
                *slot = Some(PendingResize {
                    index,
                    mode,
                    modifier,
                    delta,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn has_pending_drag(&self) -> bool {
        self.pending.is_some()
    }

    /// Size the items for a slot of extent `available` and return the
    /// stack's extent.
    ///
    /// With an unbounded slot the pending drag is still applied but the
    /// stack is never fitted.
    pub fn measure(&mut self, available: f64) -> Result<f64, StackError> {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "stack.measure",
            available,
            items = self.items.len(),
            pending = self.pending.is_some(),
        );
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        let harness = ItemHarness;
        let flags = self.edge_flags();

        for item in &mut self.items {
            item.size = item.size.max(item.minimum_size);
        }
        self.info_buffer
            .resize(self.items.len(), ResizeElementInfo::default());

        let bounded = available.is_finite();
        let mut free = available - self.content_extent();

        if let Some(pending) = self.pending.take() {
            let gesture = self.gestures.get(pending.mode, pending.modifier);
            let mut info = ResizeInfo::build(&self.items, &harness, &mut self.info_buffer)?
                .with_request(pending.index, pending.delta)
                .with_flags(flags);
            free -= gesture.execute(&mut self.items, &mut info, &harness);
            if bounded {
                self.maximum_extent = available - free;
            }
        }

        if !bounded {
            self.extent = self.content_extent();
            return Ok(self.extent);
        }

        let fixed_edges = !flags.intersects(ResizeFlags::BOTH_EDGES);
        if !self.items.is_empty()
            && (available < self.maximum_extent || (free != 0.0 && fixed_edges))
        {
            let info = ResizeInfo::build(&self.items, &harness, &mut self.info_buffer)?;
            // Never ask the fit to shrink past every item's minimum.
            let amount = free.max(-info.total_resize_space());
            let last = self.items.len() as isize - 1;
            let mut info = info
                .with_request(last, amount)
                .with_flags(ResizeFlags::CAN_MOVE_STACK_END);
            let change = self.fit.execute(&mut self.items, &mut info, &harness);
            free -= change;

            #[cfg(feature = "tracing")]
            tracing::debug!(message = "stack.fit", requested = amount, applied = change);
        }

        if free > 0.0 {
            self.maximum_extent = available - free;
        }
        self.extent = available - free;
        Ok(self.extent)
    }

    /// Lay items and resizers out inside a slot of extent `available`.
    #[must_use]
    pub fn arrange(&self, available: f64) -> StackArrangement {
        let flags = self.edge_flags();
        let thickness = self.resizer_thickness();
        let extent = self.content_extent();
        let mut cursor = if available.is_finite() {
            self.config.alignment.offset(available - extent)
        } else {
            0.0
        };

        let mut arrangement = StackArrangement {
            extent,
            items: Vec::with_capacity(self.items.len()),
            resizers: Vec::with_capacity(self.items.len() + 1),
        };

        if flags.can_move_start() && !self.items.is_empty() {
            arrangement.resizers.push((-1, Span::new(cursor, thickness)));
            cursor += thickness;
        }

        let last = self.items.len().saturating_sub(1);
        for (index, item) in self.items.iter().enumerate() {
            arrangement.items.push(Span::new(cursor, item.size));
            cursor += item.size;
            if flags.can_move_end() || index != last {
                arrangement
                    .resizers
                    .push((index as isize, Span::new(cursor, thickness)));
                cursor += thickness;
            }
        }

        arrangement
    }

    /// Zone each resizer shows for the hovered gesture, indexed by
    /// `resizer + 1`; `None` for resizers the gesture does not drive.
    #[must_use]
    pub fn resizer_modes(&self) -> Vec<Option<ResizerMode>> {
        let mut modes = vec![None; self.items.len() + 1];
        let Some((active, mode)) = self.hovered else {
            return modes;
        };

        let gesture = self.gestures.get(mode, self.modifier);
        for (target, movement) in
            gesture.reachable_movements(active, self.items.len(), self.edge_flags())
        {
            if let Some(slot) = slot_mut(&mut modes, target) {
                *slot = Some(movement.mode);
            }
        }
        if let Some(slot) = slot_mut(&mut modes, active) {
            if slot.is_none() {
                *slot = Some(mode);
            }
        }
        modes
    }

    /// Zones resizer `index` may offer.
    #[must_use]
    pub fn accessible_modes(&self, index: isize) -> Vec<ResizerMode> {
        let flags = self.edge_flags();
        ResizerMode::ALL
            .into_iter()
            .filter(|mode| mode.is_accessible(index, self.items.len(), flags))
            .collect()
    }

    /// Number of resizers laid out between and around the items.
    #[must_use]
    pub fn resizer_count(&self) -> usize {
        if self.items.is_empty() {
            return 0;
        }
        let flags = self.edge_flags();
        self.items.len() - 1 + usize::from(flags.can_move_start()) + usize::from(flags.can_move_end())
    }

    /// Items plus laid-out resizers.
    fn content_extent(&self) -> f64 {
        let items: f64 = self.items.iter().map(|item| item.size).sum();
        items + self.resizer_count() as f64 * self.resizer_thickness()
    }

    fn resizer_thickness(&self) -> f64 {
        self.config.resizer_thickness.max(0.0)
    }

    fn check_resizer(&self, index: isize) -> Result<(), StackError> {
        let last = self.items.len() as isize - 1;
        if self.items.is_empty() || !(-1..=last).contains(&index) {
            return Err(StackError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> StackError {
        StackError::IndexOutOfRange {
            index: isize::try_from(index).unwrap_or(isize::MAX),
            len: self.items.len(),
        }
    }

    fn reset_interaction(&mut self) {
        self.hovered = None;
        self.pending = None;
    }
}

fn slot_mut(modes: &mut [Option<ResizerMode>], resizer: isize) -> Option<&mut Option<ResizerMode>> {
    usize::try_from(resizer.saturating_add(1))
        .ok()
        .and_then(|slot| modes.get_mut(slot))
}

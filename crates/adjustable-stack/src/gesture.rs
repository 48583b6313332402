#![forbid(unsafe_code)]

//! Gestures: what a drag on a resizer zone does under a given modifier.
//!
//! A [`ResizeGesture`] bundles one or more [`ResizeMovement`]s. Executing a
//! gesture is all-or-nothing: every reachable movement is validated against
//! the pass's [`ResizeInfo`] before any element is touched, and a single
//! infeasible movement cancels the whole gesture with no side effects.
//!
//! Movements of one gesture share elements, so a set that validates one by
//! one can still conflict once applied in sequence. Sizes are snapshotted
//! before the first movement runs; if any target resizer ends away from its
//! transformed delta the snapshot is restored and the gesture reports no
//! change.
//!
//! Gestures are looked up in a [`GestureTable`], an explicit configuration
//! value owned by the layout that uses it. [`GestureTable::default`] holds the
//! standard nine gestures (three zones by three modifiers).
//!
//! # Failure Modes
//!
//! - An infeasible gesture is not an error: `execute` returns `0.0`.
//! - Registering the same `(mode, modifier)` pair twice is rejected with
//!   [`GestureTableError::DuplicateGesture`].

use std::cmp::Reverse;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::harness::ResizeHarness;
use crate::info::{ResizeFlags, ResizeInfo};
use crate::mode::{ResizerMode, ResizerModifier};
use crate::movement::{AmountTransform, EdgeShift, ResizeMovement};

static EMPTY_GESTURE: ResizeGesture = ResizeGesture {
    mode: ResizerMode::Default,
    modifier: ResizerModifier::None,
    flags: ResizeFlags::empty(),
    movements: Vec::new(),
};

/// A configured response to a `(zone, modifier)` combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeGesture {
    pub mode: ResizerMode,
    pub modifier: ResizerModifier,
    /// Merged into the pass flags while the gesture executes.
    #[serde(default)]
    pub flags: ResizeFlags,
    pub movements: Vec<ResizeMovement>,
}

impl ResizeGesture {
    /// Gesture with no movements.
    #[must_use]
    pub const fn new(mode: ResizerMode, modifier: ResizerModifier) -> Self {
        Self {
            mode,
            modifier,
            flags: ResizeFlags::empty(),
            movements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ResizeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_movement(
        mut self,
        index_offset: isize,
        transform: AmountTransform,
        mode: ResizerMode,
    ) -> Self {
        self.movements
            .push(ResizeMovement::new(index_offset, transform, mode));
        self
    }

    /// Whether the gesture moves nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Movements whose target resizer exists under `flags`, paired with the
    /// target index.
    ///
    /// Targets range over `[-1, count - 1]` when both edges may move and
    /// shrink by one at each fixed edge.
    pub fn reachable_movements(
        &self,
        active_resizer_index: isize,
        element_count: usize,
        flags: ResizeFlags,
    ) -> impl Iterator<Item = (isize, &ResizeMovement)> + '_ {
        let first = flags.first_resizer();
        let last = flags.last_resizer(element_count);
        self.movements.iter().filter_map(move |movement| {
            let target = movement.target_index(active_resizer_index);
            (first..=last).contains(&target).then_some((target, movement))
        })
    }

    /// Apply the gesture to `elements`, returning the change in total stack
    /// size.
    ///
    /// The gesture's flags are merged into `info.flags` first. If any
    /// reachable movement is infeasible, or the movements together cannot
    /// shift every target resizer by its full delta, nothing is changed and
    /// `0.0` is returned.
    pub fn execute<T, H>(&self, elements: &mut [T], info: &mut ResizeInfo<'_>, harness: &H) -> f64
    where
        H: ResizeHarness<T> + ?Sized,
    {
        debug_assert_eq!(
            info.len(),
            elements.len(),
            "resize info built for a different element list"
        );

        info.flags |= self.flags;
        let info: &ResizeInfo<'_> = info;
        let active = info.active_resizer_index();

        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "stack.gesture",
            mode = ?self.mode,
            modifier = ?self.modifier,
            active,
            requested = info.requested_change(),
            flags = info.flags.bits(),
        );
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        if !info.has_request() {
            return 0.0;
        }

        let mut reachable = self.reachable_movements(active, info.len(), info.flags);
        if let Some((_target, _movement)) =
            reachable.find(|(target, movement)| !movement.is_valid(*target, info))
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                message = "stack.gesture_rejected",
                target = _target,
                offset = _movement.index_offset,
            );
            return 0.0;
        }

        let mut planned: SmallVec<[Planned<'_>; 4]> = self
            .reachable_movements(active, info.len(), info.flags)
            .map(|(target, movement)| Planned {
                target,
                movement,
                amount: movement.transformed_amount(info, target),
            })
            .collect();
        // Movements leading in their direction of travel run first.
        planned.sort_by_key(|step| Reverse(step.lead()));

        let original: SmallVec<[f64; 16]> =
            elements.iter().map(|element| harness.size(element)).collect();
        let mut shift = EdgeShift::default();
        for step in &planned {
            shift += step.movement.execute(elements, step.target, info, harness);
        }

        if let Some((_target, _expected, _actual)) =
            shortfall(&planned, elements, &original, shift.start, harness)
        {
            for (element, &size) in elements.iter_mut().zip(&original) {
                harness.set_size(element, size);
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                message = "stack.gesture_rolled_back",
                target = _target,
                expected = _expected,
                actual = _actual,
            );
            return 0.0;
        }

        shift.stack_change()
    }
}

/// Relative tolerance when comparing a resizer's final shift with its
/// transformed delta.
const SHIFT_TOLERANCE: f64 = 1e-9;

/// A reachable movement with its resolved target and delta.
#[derive(Debug, Clone, Copy)]
struct Planned<'a> {
    target: isize,
    movement: &'a ResizeMovement,
    amount: f64,
}

impl Planned<'_> {
    /// Larger for resizers further ahead in the direction they move.
    fn lead(&self) -> isize {
        if self.amount < 0.0 {
            -self.target
        } else {
            self.target
        }
    }
}

/// First target whose resizer did not end up shifted by the sum of its
/// movements' deltas, as `(target, expected, actual)`.
fn shortfall<T, H>(
    planned: &[Planned<'_>],
    elements: &[T],
    original: &[f64],
    start_shift: f64,
    harness: &H,
) -> Option<(isize, f64, f64)>
where
    H: ResizeHarness<T> + ?Sized,
{
    planned.iter().find_map(|step| {
        let expected: f64 = planned
            .iter()
            .filter(|other| other.target == step.target)
            .map(|other| other.amount)
            .sum();
        let covered = usize::try_from(step.target + 1).unwrap_or(0);
        let actual = start_shift
            + elements
                .iter()
                .zip(original)
                .take(covered)
                .map(|(element, &size)| harness.size(element) - size)
                .sum::<f64>();
        let tolerance = SHIFT_TOLERANCE * expected.abs().max(1.0);
        ((actual - expected).abs() > tolerance).then_some((step.target, expected, actual))
    })
}

/// Errors raised while assembling a [`GestureTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureTableError {
    /// Two gestures were registered for the same combination.
    DuplicateGesture {
        mode: ResizerMode,
        modifier: ResizerModifier,
    },
}

impl fmt::Display for GestureTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateGesture { mode, modifier } => {
                write!(f, "gesture for {mode:?} + {modifier:?} registered twice")
            }
        }
    }
}

impl std::error::Error for GestureTableError {}

/// Lookup from `(zone, modifier)` to gesture.
///
/// Serializes as a list of gestures sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ResizeGesture>", into = "Vec<ResizeGesture>")]
pub struct GestureTable {
    gestures: FxHashMap<(ResizerMode, ResizerModifier), ResizeGesture>,
}

impl GestureTable {
    /// Table with no gestures; every lookup yields the inert gesture.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            gestures: FxHashMap::default(),
        }
    }

    /// Table with the standard nine gestures.
    #[must_use]
    pub fn standard() -> Self {
        use AmountTransform::{Maintain, MirrorIntoAfter, MirrorIntoBefore, Negate};
        use ResizerMode as Zone;
        use ResizerModifier as Held;

        let paired = ResizeFlags::PREFER_RESIZE;
        let gestures = [
            ResizeGesture::new(Zone::Default, Held::None).with_movement(0, Maintain, Zone::Default),
            ResizeGesture::new(Zone::Default, Held::Move)
                .with_flags(paired)
                .with_movement(-1, Maintain, Zone::Default)
                .with_movement(0, Maintain, Zone::Default),
            ResizeGesture::new(Zone::Default, Held::ShrinkGrow)
                .with_flags(paired)
                .with_movement(-1, Negate, Zone::Default)
                .with_movement(0, Maintain, Zone::Default),
            ResizeGesture::new(Zone::ArrowBefore, Held::None)
                .with_movement(0, Maintain, Zone::ArrowBefore),
            ResizeGesture::new(Zone::ArrowBefore, Held::Move)
                .with_flags(paired)
                .with_movement(0, Maintain, Zone::ArrowBefore)
                .with_movement(1, Maintain, Zone::ArrowAfter),
            ResizeGesture::new(Zone::ArrowBefore, Held::ShrinkGrow)
                .with_flags(paired)
                .with_movement(0, Maintain, Zone::ArrowBefore)
                .with_movement(1, MirrorIntoAfter, Zone::ArrowAfter),
            ResizeGesture::new(Zone::ArrowAfter, Held::None)
                .with_movement(0, Maintain, Zone::ArrowAfter),
            ResizeGesture::new(Zone::ArrowAfter, Held::Move)
                .with_flags(paired)
                .with_movement(-1, Maintain, Zone::ArrowBefore)
                .with_movement(0, Maintain, Zone::ArrowAfter),
            ResizeGesture::new(Zone::ArrowAfter, Held::ShrinkGrow)
                .with_flags(paired)
                .with_movement(-1, MirrorIntoBefore, Zone::ArrowBefore)
                .with_movement(0, Maintain, Zone::ArrowAfter),
        ];

        let mut table = Self::empty();
        for gesture in gestures {
            table.replace(gesture);
        }
        table
    }

    /// Build a table, rejecting duplicate combinations.
    pub fn from_gestures(
        gestures: impl IntoIterator<Item = ResizeGesture>,
    ) -> Result<Self, GestureTableError> {
        let mut table = Self::empty();
        for gesture in gestures {
            table.register(gesture)?;
        }
        Ok(table)
    }

    /// Add a gesture for a combination that has none yet.
    pub fn register(&mut self, gesture: ResizeGesture) -> Result<(), GestureTableError> {
        let key = (gesture.mode, gesture.modifier);
        if self.gestures.contains_key(&key) {
            return Err(GestureTableError::DuplicateGesture {
                mode: gesture.mode,
                modifier: gesture.modifier,
            });
        }
        self.gestures.insert(key, gesture);
        Ok(())
    }

    /// Add or overwrite a gesture, returning the one it displaced.
    pub fn replace(&mut self, gesture: ResizeGesture) -> Option<ResizeGesture> {
        self.gestures
            .insert((gesture.mode, gesture.modifier), gesture)
    }

    /// Remove the gesture for a combination.
    pub fn remove(&mut self, mode: ResizerMode, modifier: ResizerModifier) -> Option<ResizeGesture> {
        self.gestures.remove(&(mode, modifier))
    }

    #[must_use]
    pub fn try_get(&self, mode: ResizerMode, modifier: ResizerModifier) -> Option<&ResizeGesture> {
        self.gestures.get(&(mode, modifier))
    }

    /// Gesture for the combination, or an inert empty gesture.
    #[must_use]
    pub fn get(&self, mode: ResizerMode, modifier: ResizerModifier) -> &ResizeGesture {
        self.try_get(mode, modifier).unwrap_or(&EMPTY_GESTURE)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Gestures in `(mode, modifier)` order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&ResizeGesture> {
        let mut gestures: Vec<&ResizeGesture> = self.gestures.values().collect();
        gestures.sort_by_key(|gesture| (gesture.mode, gesture.modifier));
        gestures
    }
}

impl Default for GestureTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<ResizeGesture>> for GestureTable {
    type Error = GestureTableError;

    fn try_from(gestures: Vec<ResizeGesture>) -> Result<Self, Self::Error> {
        Self::from_gestures(gestures)
    }
}

impl From<GestureTable> for Vec<ResizeGesture> {
    fn from(table: GestureTable) -> Self {
        let mut gestures: Vec<ResizeGesture> = table.gestures.into_values().collect();
        gestures.sort_by_key(|gesture| (gesture.mode, gesture.modifier));
        gestures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{ItemHarness, StackItem};
    use crate::info::ResizeElementInfo;
    #[cfg(feature = "tracing")]
    use std::sync::{Arc, Mutex};
    #[cfg(feature = "tracing")]
    use tracing::Subscriber;
    #[cfg(feature = "tracing")]
    use tracing_subscriber::Layer;
    #[cfg(feature = "tracing")]
    use tracing_subscriber::layer::{Context, SubscriberExt};

    fn sizes(items: &[StackItem]) -> Vec<f64> {
        items.iter().map(|item| item.size).collect()
    }

    fn execute(
        items: &mut [StackItem],
        gesture: &ResizeGesture,
        active: isize,
        amount: f64,
        flags: ResizeFlags,
    ) -> f64 {
        let mut buffer = vec![ResizeElementInfo::default(); items.len()];
        let mut info = ResizeInfo::build(items, &ItemHarness, &mut buffer)
            .expect("sized buffer")
            .with_request(active, amount)
            .with_flags(flags);
        gesture.execute(items, &mut info, &ItemHarness)
    }

    #[test]
    fn standard_table_covers_every_combination() {
        let table = GestureTable::standard();
        assert_eq!(table.len(), 9);
        for mode in ResizerMode::ALL {
            for modifier in [
                ResizerModifier::None,
                ResizerModifier::Move,
                ResizerModifier::ShrinkGrow,
            ] {
                let gesture = table.get(mode, modifier);
                assert_eq!((gesture.mode, gesture.modifier), (mode, modifier));
                assert!(!gesture.is_empty());
            }
        }
    }

    #[test]
    fn unknown_combination_falls_back_to_inert_gesture() {
        let table = GestureTable::empty();
        let gesture = table.get(ResizerMode::ArrowAfter, ResizerModifier::Move);
        assert!(gesture.is_empty());
        assert!(table.try_get(ResizerMode::ArrowAfter, ResizerModifier::Move).is_none());

        let mut items = vec![StackItem::new(100.0, 0.0); 3];
        let change = execute(&mut items, gesture, 0, 25.0, ResizeFlags::empty());
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![100.0; 3]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let gesture = ResizeGesture::new(ResizerMode::Default, ResizerModifier::None);
        let err = GestureTable::from_gestures([gesture.clone(), gesture]).unwrap_err();
        assert_eq!(
            err,
            GestureTableError::DuplicateGesture {
                mode: ResizerMode::Default,
                modifier: ResizerModifier::None,
            }
        );
        assert_eq!(err.to_string(), "gesture for Default + None registered twice");
    }

    #[test]
    fn replace_returns_displaced_gesture() {
        let mut table = GestureTable::standard();
        let displaced = table.replace(ResizeGesture::new(ResizerMode::Default, ResizerModifier::None));
        assert_eq!(displaced.map(|g| g.movements.len()), Some(1));
        assert!(table.get(ResizerMode::Default, ResizerModifier::None).is_empty());
        assert!(table.remove(ResizerMode::Default, ResizerModifier::None).is_some());
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn reachable_range_depends_on_edges() {
        let table = GestureTable::standard();
        let gesture = table.get(ResizerMode::Default, ResizerModifier::Move);

        let fixed: Vec<isize> = gesture
            .reachable_movements(0, 3, ResizeFlags::empty())
            .map(|(target, _)| target)
            .collect();
        assert_eq!(fixed, vec![0]);

        let open: Vec<isize> = gesture
            .reachable_movements(0, 3, ResizeFlags::BOTH_EDGES)
            .map(|(target, _)| target)
            .collect();
        assert_eq!(open, vec![-1, 0]);

        let trailing: Vec<isize> = table
            .get(ResizerMode::ArrowBefore, ResizerModifier::Move)
            .reachable_movements(1, 3, ResizeFlags::empty())
            .map(|(target, _)| target)
            .collect();
        assert_eq!(trailing, vec![1]);
    }

    #[test]
    fn plain_drag_conserves_space_with_fixed_edges() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::None),
            0,
            20.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![120.0, 80.0, 100.0]);
    }

    #[test]
    fn move_translates_the_element_between_two_resizers() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::Move),
            1,
            10.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![110.0, 100.0, 90.0]);
    }

    #[test]
    fn move_resizes_neighbours_even_with_movable_end() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::Move),
            1,
            10.0,
            ResizeFlags::CAN_MOVE_STACK_END,
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![110.0, 100.0, 90.0]);
    }

    #[test]
    fn shrink_grow_grows_element_in_place() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::ShrinkGrow),
            1,
            10.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![90.0, 120.0, 90.0]);
    }

    #[test]
    fn infeasible_movement_cancels_whole_gesture() {
        let table = GestureTable::standard();
        let mut items = vec![
            StackItem::new(100.0, 50.0),
            StackItem::new(100.0, 50.0),
            StackItem::new(100.0, 90.0),
        ];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::Move),
            1,
            30.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn move_slides_element_without_resizing_it() {
        let table = GestureTable::standard();
        let mut items = vec![
            StackItem::new(100.0, 50.0),
            StackItem::new(50.0, 50.0),
            StackItem::new(100.0, 85.0),
        ];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::Move),
            1,
            10.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![110.0, 50.0, 90.0]);
    }

    #[test]
    fn shrink_grow_shrinks_element_in_place() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::ShrinkGrow),
            1,
            -20.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![120.0, 60.0, 120.0]);
    }

    #[test]
    fn shrink_past_element_minimum_is_rolled_back() {
        // Each movement fits on its own; together they need 120 from an
        // element that can give 50.
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::ShrinkGrow),
            1,
            -60.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);
        assert_eq!(sizes(&items), vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn rolled_back_gesture_restores_every_element() {
        let table = GestureTable::standard();
        let original = vec![
            StackItem::new(100.0, 50.0),
            StackItem::new(30.0, 0.0).disabled(),
            StackItem::new(100.0, 50.0),
            StackItem::new(100.0, 50.0),
        ];
        let mut items = original.clone();
        let change = execute(
            &mut items,
            table.get(ResizerMode::ArrowAfter, ResizerModifier::ShrinkGrow),
            2,
            -70.0,
            ResizeFlags::CAN_MOVE_STACK_END,
        );
        assert_eq!(change, 0.0);
        assert_eq!(items, original);
    }

    #[test]
    fn gesture_flags_are_merged_into_pass_flags() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 2];
        let mut buffer = vec![ResizeElementInfo::default(); items.len()];
        let mut info = ResizeInfo::build(&items, &ItemHarness, &mut buffer)
            .expect("sized buffer")
            .with_request(0, 5.0)
            .with_flags(ResizeFlags::CAN_MOVE_STACK_END);
        table
            .get(ResizerMode::Default, ResizerModifier::Move)
            .execute(&mut items, &mut info, &ItemHarness);
        assert!(info.flags.contains(ResizeFlags::PREFER_RESIZE | ResizeFlags::CAN_MOVE_STACK_END));
    }

    #[test]
    fn zero_request_changes_nothing() {
        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        for gesture in table.sorted() {
            let change = execute(&mut items, gesture, 1, 0.0, ResizeFlags::BOTH_EDGES);
            assert_eq!(change, 0.0);
        }
        assert_eq!(sizes(&items), vec![100.0; 3]);
    }

    #[test]
    fn table_round_trips_through_json() {
        let table = GestureTable::standard();
        let json = serde_json::to_string(&table).expect("serialize");
        let back: GestureTable = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, table);
    }

    #[cfg(feature = "tracing")]
    #[derive(Default)]
    struct GestureTraceState {
        saw_gesture_span: bool,
        saw_rejected_event: bool,
        saw_rolled_back_event: bool,
    }

    #[cfg(feature = "tracing")]
    struct GestureTraceCapture {
        state: Arc<Mutex<GestureTraceState>>,
    }

    #[cfg(feature = "tracing")]
    impl<S> Layer<S> for GestureTraceCapture
    where
        S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::Id,
            _ctx: Context<'_, S>,
        ) {
            if attrs.metadata().name() == "stack.gesture" {
                self.state.lock().expect("gesture trace lock").saw_gesture_span = true;
            }
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            struct Msg {
                message: Option<String>,
            }
            impl tracing::field::Visit for Msg {
                fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                    if field.name() == "message" {
                        self.message = Some(value.to_string());
                    }
                }

                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                    }
                }
            }
            let mut msg = Msg { message: None };
            event.record(&mut msg);
            let mut state = self.state.lock().expect("gesture trace lock");
            match msg.message.as_deref() {
                Some("stack.gesture_rejected") => state.saw_rejected_event = true,
                Some("stack.gesture_rolled_back") => state.saw_rolled_back_event = true,
                _ => {}
            }
        }
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn rejected_gesture_emits_span_and_event() {
        let state = Arc::new(Mutex::new(GestureTraceState::default()));
        let subscriber = tracing_subscriber::registry().with(GestureTraceCapture {
            state: Arc::clone(&state),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 90.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::None),
            0,
            50.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);

        let snapshot = state.lock().expect("gesture trace lock");
        assert!(snapshot.saw_gesture_span, "expected stack.gesture span");
        assert!(
            snapshot.saw_rejected_event,
            "expected stack.gesture_rejected debug event"
        );
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn rolled_back_gesture_emits_event() {
        let state = Arc::new(Mutex::new(GestureTraceState::default()));
        let subscriber = tracing_subscriber::registry().with(GestureTraceCapture {
            state: Arc::clone(&state),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let table = GestureTable::standard();
        let mut items = vec![StackItem::new(100.0, 50.0); 3];
        let change = execute(
            &mut items,
            table.get(ResizerMode::Default, ResizerModifier::ShrinkGrow),
            1,
            -60.0,
            ResizeFlags::empty(),
        );
        assert_eq!(change, 0.0);

        let snapshot = state.lock().expect("gesture trace lock");
        assert!(!snapshot.saw_rejected_event);
        assert!(
            snapshot.saw_rolled_back_event,
            "expected stack.gesture_rolled_back debug event"
        );
    }

    #[test]
    fn deserializing_duplicates_fails() {
        let json = r#"[
            {"mode":"Default","modifier":"None","movements":[]},
            {"mode":"Default","modifier":"None","movements":[]}
        ]"#;
        assert!(serde_json::from_str::<GestureTable>(json).is_err());
    }
}

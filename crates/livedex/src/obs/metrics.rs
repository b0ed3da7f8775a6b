use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, thread-local counters for index maintenance.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) indexes: BTreeMap<&'static str, IndexCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Construction
    pub indexes_built: u64,
    pub rows_scanned: u64,

    // Incremental maintenance
    pub index_inserts: u64,
    pub index_removes: u64,
    pub index_clears: u64,
    pub unique_violations: u64,

    // Collection dispatch
    pub added_events: u64,
    pub removed_events: u64,
    pub cleared_events: u64,
    pub observers_notified: u64,
}

///
/// IndexCounters
/// Per index-kind breakdown.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct IndexCounters {
    pub built: u64,
    pub rows_scanned: u64,
    pub inserts: u64,
    pub removes: u64,
    pub clears: u64,
    pub unique_violations: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters, suitable for serialization.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub indexes: BTreeMap<&'static str, IndexCounters>,
}

impl EventReport {
    /// Counters for one index kind, or zeroes if it never recorded anything.
    #[must_use]
    pub fn index(&self, kind: &str) -> IndexCounters {
        self.indexes.get(kind).cloned().unwrap_or_default()
    }
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        indexes: m.indexes.clone(),
    })
}

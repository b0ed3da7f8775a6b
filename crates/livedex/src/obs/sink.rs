//! Metrics sink boundary.
//!
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
//! This module is the only bridge between index maintenance and the
//! thread-local metrics state.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexKind {
    Index,
    UniqueIndex,
}

impl IndexKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::UniqueIndex => "unique_index",
        }
    }
}

///
/// NotifyKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotifyKind {
    Added,
    Removed,
    Cleared,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    IndexBuilt {
        kind: IndexKind,
        rows_scanned: u64,
    },
    IndexDelta {
        kind: IndexKind,
        inserts: u64,
        removes: u64,
    },
    IndexCleared {
        kind: IndexKind,
    },
    UniqueViolation,
    Notify {
        kind: NotifyKind,
        observers: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::IndexBuilt { kind, rows_scanned } => {
                metrics::with_state_mut(|m| {
                    m.ops.indexes_built = m.ops.indexes_built.saturating_add(1);
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);

                    let entry = m.indexes.entry(kind.label()).or_default();
                    entry.built = entry.built.saturating_add(1);
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::IndexDelta {
                kind,
                inserts,
                removes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inserts = m.ops.index_inserts.saturating_add(inserts);
                    m.ops.index_removes = m.ops.index_removes.saturating_add(removes);

                    let entry = m.indexes.entry(kind.label()).or_default();
                    entry.inserts = entry.inserts.saturating_add(inserts);
                    entry.removes = entry.removes.saturating_add(removes);
                });
            }

            MetricsEvent::IndexCleared { kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_clears = m.ops.index_clears.saturating_add(1);

                    let entry = m.indexes.entry(kind.label()).or_default();
                    entry.clears = entry.clears.saturating_add(1);
                });
            }

            MetricsEvent::UniqueViolation => {
                metrics::with_state_mut(|m| {
                    m.ops.unique_violations = m.ops.unique_violations.saturating_add(1);

                    let entry = m.indexes.entry(IndexKind::UniqueIndex.label()).or_default();
                    entry.unique_violations = entry.unique_violations.saturating_add(1);
                });
            }

            MetricsEvent::Notify { kind, observers } => {
                metrics::with_state_mut(|m| {
                    match kind {
                        NotifyKind::Added => {
                            m.ops.added_events = m.ops.added_events.saturating_add(1);
                        }
                        NotifyKind::Removed => {
                            m.ops.removed_events = m.ops.removed_events.saturating_add(1);
                        }
                        NotifyKind::Cleared => {
                            m.ops.cleared_events = m.ops.cleared_events.saturating_add(1);
                        }
                    }
                    m.ops.observers_notified = m.ops.observers_notified.saturating_add(observers);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // Clone out of the slot so a sink may itself install an override.
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset the current thread's metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
/// The previous sink is restored on every exit, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

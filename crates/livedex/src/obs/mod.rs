//! Observability: index maintenance counters and the sink they flow through.
//!
//! Index and collection code never touches `metrics` state directly; every
//! event goes through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, IndexCounters};
pub use sink::{
    IndexKind, MetricsEvent, MetricsSink, NotifyKind, metrics_report, metrics_reset_all,
    with_metrics_sink,
};

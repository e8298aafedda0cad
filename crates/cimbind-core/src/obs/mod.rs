//! Observability: runtime counters and the sink abstraction.
//!
//! Diagnostic reports of synthesized bindings live in `registry`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntitySummary, EventReport, EventState};
pub use sink::{
    MetricsEvent, MetricsSink, SynthKind, metrics_report, metrics_reset_all, with_metrics_sink,
};

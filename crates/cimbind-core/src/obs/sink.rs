//! Metrics sink boundary.
//!
//! Binding logic never touches `obs::metrics` directly; all
//! instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// SynthKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SynthKind {
    Entity,
    Factory,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Synthesized {
        entity_path: &'static str,
        kind: SynthKind,
        missing_members: u64,
    },
    PropertyRead {
        entity_path: &'static str,
    },
    PropertyWrite {
        entity_path: &'static str,
    },
    Invoke {
        entity_path: &'static str,
    },
    InvokeFault {
        entity_path: &'static str,
        status: u32,
    },
    Enumerate {
        entity_path: &'static str,
        count: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default sink writing into the process-wide metrics state.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::Synthesized {
                kind,
                missing_members,
                ..
            } => {
                match kind {
                    SynthKind::Entity => {
                        m.ops.entity_bindings = m.ops.entity_bindings.saturating_add(1);
                    }
                    SynthKind::Factory => {
                        m.ops.factory_bindings = m.ops.factory_bindings.saturating_add(1);
                    }
                }
                m.ops.missing_members = m.ops.missing_members.saturating_add(missing_members);
            }

            MetricsEvent::PropertyRead { entity_path } => {
                m.ops.property_reads = m.ops.property_reads.saturating_add(1);
                let entry = metrics::entity(m, entity_path);
                entry.property_reads = entry.property_reads.saturating_add(1);
            }

            MetricsEvent::PropertyWrite { entity_path } => {
                m.ops.property_writes = m.ops.property_writes.saturating_add(1);
                let entry = metrics::entity(m, entity_path);
                entry.property_writes = entry.property_writes.saturating_add(1);
            }

            MetricsEvent::Invoke { entity_path } => {
                m.ops.invocations = m.ops.invocations.saturating_add(1);
                let entry = metrics::entity(m, entity_path);
                entry.invocations = entry.invocations.saturating_add(1);
            }

            MetricsEvent::InvokeFault {
                entity_path,
                status,
            } => {
                m.ops.invocation_faults = m.ops.invocation_faults.saturating_add(1);
                let entry = metrics::entity(m, entity_path);
                entry.invocation_faults = entry.invocation_faults.saturating_add(1);
                entry.last_status = Some(status);
            }

            MetricsEvent::Enumerate { entity_path, count } => {
                m.ops.enumerations = m.ops.enumerations.saturating_add(1);
                m.ops.records_enumerated = m.ops.records_enumerated.saturating_add(count);
                let entry = metrics::entity(m, entity_path);
                entry.enumerations = entry.enumerations.saturating_add(1);
                entry.records_enumerated = entry.records_enumerated.saturating_add(count);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // clone out first so a sink may itself record without re-borrowing
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report(window_start_ms: Option<i64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary, thread-local metrics sink override.
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

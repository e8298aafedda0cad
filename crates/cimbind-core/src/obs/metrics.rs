use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{LazyLock, Mutex},
};

///
/// EventState
/// Ephemeral, in-memory counters for binding operations.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: i64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            entities: BTreeMap::new(),
            since_ms: Utc::now().timestamp_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Synthesis
    pub entity_bindings: u64,
    pub factory_bindings: u64,
    pub missing_members: u64,

    // Proxy traffic
    pub property_reads: u64,
    pub property_writes: u64,
    pub invocations: u64,
    pub invocation_faults: u64,

    // Factories
    pub enumerations: u64,
    pub records_enumerated: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub property_reads: u64,
    pub property_writes: u64,
    pub invocations: u64,
    pub invocation_faults: u64,
    pub enumerations: u64,
    pub records_enumerated: u64,
    /// Last non-zero status observed from this entity's methods.
    pub last_status: Option<u32>,
}

impl EntityCounters {
    const fn total_ops(&self) -> u64 {
        self.property_reads
            .saturating_add(self.property_writes)
            .saturating_add(self.invocations)
            .saturating_add(self.enumerations)
    }
}

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    f(&EVENT_STATE.lock().expect("metrics state lock poisoned"))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock().expect("metrics state lock poisoned"))
}

/// Reset all counters and restart the window.
pub fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Counters for one entity path, created on first use.
pub(crate) fn entity<'a>(m: &'a mut EventState, entity_path: &str) -> &'a mut EntityCounters {
    m.entities.entry(entity_path.to_string()).or_default()
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Counters since `since_ms`; `None` when the window started before
    /// the requested start.
    pub counters: Option<EventState>,
    /// Per-entity counters, busiest first.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub path: String,
    pub property_reads: u64,
    pub property_writes: u64,
    pub invocations: u64,
    pub invocation_faults: u64,
    pub enumerations: u64,
    pub avg_records_per_enumeration: f64,
    pub last_status: Option<u32>,
}

/// Build a report, optionally only if the window started at or after
/// `window_start_ms`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn report_window_start(window_start_ms: Option<i64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| snap.since_ms < start) {
        return EventReport::default();
    }

    let mut ranked: Vec<_> = snap.entities.iter().collect();
    ranked.sort_by(|(pa, a), (pb, b)| b.total_ops().cmp(&a.total_ops()).then_with(|| pa.cmp(pb)));

    let entity_counters = ranked
        .into_iter()
        .map(|(path, ops)| EntitySummary {
            path: path.clone(),
            property_reads: ops.property_reads,
            property_writes: ops.property_writes,
            invocations: ops.invocations,
            invocation_faults: ops.invocation_faults,
            enumerations: ops.enumerations,
            avg_records_per_enumeration: if ops.enumerations > 0 {
                ops.records_enumerated as f64 / ops.enumerations as f64
            } else {
                0.0
            },
            last_status: ops.last_status,
        })
        .collect();

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

#![allow(dead_code)]

use cimbind::prelude::*;
use cimbind_schema_storage::{Seeded, seeded_store};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness; `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A session over a freshly seeded store, plus the seeded record paths.
pub fn session() -> (Session, Seeded) {
    let (store, seeded) = connect();

    (Session::new(store), seeded)
}

/// The seeded store itself, for tests that need to steer it.
pub fn connect() -> (MemoryStore, Seeded) {
    init_tracing();

    seeded_store().expect("seeding the storage store should succeed")
}

//! Process-wide Type/Factory cache.
//!
//! Bindings are keyed by (store scope, declaration path). The maps live
//! for the process lifetime and are never torn down. Each key owns a slot
//! with its own synthesis lock, so concurrent first use of one declaration
//! synthesizes exactly once while unrelated declarations proceed in
//! parallel. Failed synthesis is not cached.
use crate::{
    error::Error,
    model::{EntityModel, FactoryModel},
    store::RemoteStore,
    synth::{EntityBinding, FactoryBinding},
};
use std::{
    collections::HashMap,
    fmt::Write as _,
    hash::Hash,
    sync::{Arc, LazyLock, Mutex, OnceLock, RwLock},
};
use tracing::debug;

type EntityKey = (String, &'static str);
type FactoryKey = (String, &'static str, Option<&'static str>);

static ENTITY_BINDINGS: LazyLock<Registry<EntityKey, EntityBinding>> =
    LazyLock::new(Registry::default);

static FACTORY_BINDINGS: LazyLock<Registry<FactoryKey, FactoryBinding>> =
    LazyLock::new(Registry::default);

///
/// Slot
/// Compute-once cell for one key.
///

struct Slot<T> {
    init: Mutex<()>,
    value: OnceLock<Arc<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            init: Mutex::new(()),
            value: OnceLock::new(),
        }
    }
}

///
/// Registry
///

struct Registry<K, T> {
    slots: RwLock<HashMap<K, Arc<Slot<T>>>>,
}

impl<K, T> Default for Registry<K, T> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Clone + Eq + Hash, T> Registry<K, T> {
    fn slot(&self, key: &K) -> Arc<Slot<T>> {
        if let Some(slot) = self
            .slots
            .read()
            .expect("binding registry lock poisoned")
            .get(key)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().expect("binding registry lock poisoned");
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    fn get_or_try_init(
        &self,
        key: &K,
        init: impl FnOnce() -> Result<T, Error>,
    ) -> Result<Arc<T>, Error> {
        let slot = self.slot(key);
        if let Some(value) = slot.value.get() {
            return Ok(Arc::clone(value));
        }

        let _guard = slot.init.lock().expect("binding slot lock poisoned");
        if let Some(value) = slot.value.get() {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(init()?);
        let _ = slot.value.set(Arc::clone(&value));

        Ok(value)
    }

    /// Published values with their keys.
    fn published(&self) -> Vec<(K, Arc<T>)> {
        self.slots
            .read()
            .expect("binding registry lock poisoned")
            .iter()
            .filter_map(|(key, slot)| slot.value.get().map(|v| (key.clone(), Arc::clone(v))))
            .collect()
    }
}

/// Synthesized binding of `model` against `store`, built on first use.
pub fn entity_binding(
    store: &dyn RemoteStore,
    model: &'static EntityModel,
) -> Result<Arc<EntityBinding>, Error> {
    let key = (store.scope().to_string(), model.path);

    ENTITY_BINDINGS.get_or_try_init(&key, || {
        debug!(scope = store.scope(), entity = model.path, "entity binding cache miss");
        EntityBinding::synthesize(store, model)
    })
}

/// Synthesized factory of `entity` against `store`, built on first use.
/// `factory` is `None` for the default factory.
pub fn factory_binding(
    store: &dyn RemoteStore,
    entity: &'static EntityModel,
    factory: Option<&'static FactoryModel>,
) -> Result<Arc<FactoryBinding>, Error> {
    let key = (store.scope().to_string(), entity.path, factory.map(|f| f.path));

    FACTORY_BINDINGS.get_or_try_init(&key, || {
        debug!(
            scope = store.scope(),
            entity = entity.path,
            factory = factory.map(|f| f.path),
            "factory binding cache miss"
        );
        let binding = entity_binding(store, entity)?;

        FactoryBinding::synthesize(binding, factory)
    })
}

/// Textual description of every synthesized binding, grouped by scope.
#[must_use]
pub fn report() -> String {
    render(None)
}

/// Textual description of the bindings synthesized for one scope.
#[must_use]
pub fn report_scope(scope: &str) -> String {
    render(Some(scope))
}

fn render(scope: Option<&str>) -> String {
    let in_scope = |s: &str| scope.is_none_or(|want| want == s);

    let mut entities = ENTITY_BINDINGS.published();
    entities.retain(|((s, _), _)| in_scope(s));
    entities.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut factories = FACTORY_BINDINGS.published();
    factories.retain(|((s, _, _), _)| in_scope(s));
    factories.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut out = String::new();
    let mut current: Option<&str> = None;
    for ((s, _), binding) in &entities {
        if current != Some(s.as_str()) {
            let _ = writeln!(out, "[{s}]");
            current = Some(s.as_str());
        }
        out.push_str(&binding.describe());
    }
    for ((s, _, _), binding) in &factories {
        let _ = write!(out, "[{s}] ");
        out.push_str(&binding.describe());
    }

    out
}

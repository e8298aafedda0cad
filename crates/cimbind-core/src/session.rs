use crate::{
    error::{Error, ErrorOrigin},
    factory::Factory,
    model::EntityModel,
    proxy::Proxy,
    registry,
    store::{RETURN_VALUE, RecordRef, RemoteStore},
    traits::{Entity, FactoryKind},
};
use serde::Deserialize;
use std::{
    fmt::{self, Debug},
    fs, io,
    path::Path,
    sync::Arc,
};
use tracing::debug;

///
/// SessionOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
    /// Enumerations include instances of descendant classes.
    pub enumerate_deep: bool,
    /// Enumerations only return instances that carry a path.
    pub ensure_locatable: bool,
    /// Name of the status output of remote methods.
    pub status_property: String,
    /// Refuse numeric width changes, even lossless ones.
    pub strict_numeric: bool,
}

impl SessionOptions {
    /// Parse options from TOML text; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|err| {
            Error::declaration(
                ErrorOrigin::Declaration,
                format!("invalid session options: {err}"),
            )
        })
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            enumerate_deep: true,
            ensure_locatable: true,
            status_property: RETURN_VALUE.to_string(),
            strict_numeric: false,
        }
    }
}

///
/// Session
///
/// Entry point binding one store scope to the process-wide binding cache.
/// Cheap to clone; every proxy carries the session it was built in, so
/// references resolve in the same scope as their owner.
///

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn RemoteStore>,
    options: SessionOptions,
}

impl Session {
    pub fn new(store: impl RemoteStore + 'static) -> Self {
        Self::with_options(store, SessionOptions::default())
    }

    pub fn with_options(store: impl RemoteStore + 'static, options: SessionOptions) -> Self {
        Self::from_shared(Arc::new(store), options)
    }

    #[must_use]
    pub fn from_shared(store: Arc<dyn RemoteStore>, options: SessionOptions) -> Self {
        Self {
            inner: Arc::new(SessionInner { store, options }),
        }
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    #[must_use]
    pub fn store(&self) -> &dyn RemoteStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        self.inner.store.scope()
    }

    /// Default factory of `E`: creation from the class template and
    /// enumeration, no keyed constructors.
    pub fn factory<E: Entity>(&self) -> Result<Factory<E>, Error> {
        let binding = registry::factory_binding(self.store(), E::MODEL, None)?;

        Ok(Factory::new(self.clone(), binding))
    }

    /// Declared factory `F`, with its keyed constructors.
    pub fn factory_of<F: FactoryKind>(&self) -> Result<Factory<F::Entity>, Error> {
        let binding =
            registry::factory_binding(self.store(), <F::Entity as Entity>::MODEL, Some(F::MODEL))?;

        Ok(Factory::new(self.clone(), binding))
    }

    /// Open a record by path as `E`.
    pub fn open<E: Entity>(&self, path: &str) -> Result<E, Error> {
        self.resolve(E::MODEL, path, ErrorOrigin::Store)
            .map(E::from_proxy)
    }

    /// Adapt a raw record obtained from the store as `E`.
    pub fn bind<E: Entity>(&self, record: RecordRef) -> Result<E, Error> {
        let binding = registry::entity_binding(self.store(), E::MODEL)?;

        Proxy::bind(self.clone(), binding, record).map(E::from_proxy)
    }

    /// Open `path` in this scope and bind it as `model`. A path that cannot
    /// be opened is a store fault, never a silent null.
    pub(crate) fn resolve(
        &self,
        model: &'static EntityModel,
        path: &str,
        origin: ErrorOrigin,
    ) -> Result<Proxy, Error> {
        debug!(scope = self.scope(), entity = model.path, path, "resolving reference");

        let binding = registry::entity_binding(self.store(), model)?;
        let record = self
            .store()
            .open(path)
            .map_err(|err| Error::store(origin, &format!("opening '{path}'"), err))?;

        Proxy::bind(self.clone(), binding, record)
    }

    /// Description of every binding synthesized for this scope.
    #[must_use]
    pub fn report(&self) -> String {
        registry::report_scope(self.scope())
    }

    /// Write `report()` to a file, for inspection.
    pub fn save_report(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.report())
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("scope", &self.scope())
            .field("options", &self.inner.options)
            .finish()
    }
}

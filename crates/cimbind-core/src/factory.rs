use crate::{
    collection::InstanceCollection,
    error::{Error, ErrorOrigin},
    obs::sink::{self, MetricsEvent},
    proxy::Proxy,
    session::Session,
    store::{ClassSchema, Query, RecordRef},
    synth::{FactoryBinding, marshal::{self, Site}},
    traits::Entity,
    value::Value,
};
use std::{fmt, marker::PhantomData, sync::Arc};
use tracing::debug;

///
/// Factory
///
/// Typed entry point for creating and enumerating instances of `E`.
/// The binding behind it is shared per (scope, declaration).
///

pub struct Factory<E: Entity> {
    session: Session,
    binding: Arc<FactoryBinding>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Factory<E> {
    pub(crate) const fn new(session: Session, binding: Arc<FactoryBinding>) -> Self {
        Self {
            session,
            binding,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn binding(&self) -> &Arc<FactoryBinding> {
        &self.binding
    }

    /// Remote class metadata captured at synthesis time.
    #[must_use]
    pub fn class_schema(&self) -> &ClassSchema {
        self.binding.entity().schema()
    }

    /// A fresh, uncommitted instance from the class template.
    pub fn create_instance(&self) -> Result<E, Error> {
        let record = self.spawn()?;

        self.wrap(record)
    }

    ///
    /// create_with
    ///
    /// A fresh instance with the keys of constructor `name` set from
    /// `args`, in declaration order. The instance is uncommitted.
    ///
    pub fn create_with(&self, name: &str, args: Vec<Value>) -> Result<E, Error> {
        let entity = self.binding.entity();
        let ctor = self.binding.constructor(name).ok_or_else(|| {
            Error::declaration(
                ErrorOrigin::Factory,
                format!("'{}' has no constructor '{name}'", entity.model().path),
            )
        })?;
        if args.len() != ctor.keys.len() {
            return Err(Error::declaration(
                ErrorOrigin::Factory,
                format!(
                    "constructor '{name}' of '{}' takes {} keys, got {}",
                    entity.class(),
                    ctor.keys.len(),
                    args.len()
                ),
            ));
        }

        let record = self.spawn()?;
        let strict = self.session.options().strict_numeric;
        for (key, arg) in ctor.keys.iter().zip(args) {
            let site = Site::new(ErrorOrigin::Factory, entity.class(), &key.remote);
            let wire = marshal::encode(
                &site,
                key.model.ty,
                key.model.wire(),
                key.remote_wire,
                strict,
                arg,
            )?;
            record.set(&key.remote, wire).map_err(|err| {
                Error::store(ErrorOrigin::Factory, &format!("setting key {site}"), err)
            })?;
        }

        self.wrap(record)
    }

    /// Every instance of the class, deep across descendants by default.
    pub fn get_instances(&self) -> Result<InstanceCollection<E>, Error> {
        self.enumerate(None)
    }

    /// Instances matching a store-specific filter expression.
    pub fn get_instances_where(&self, filter: &str) -> Result<InstanceCollection<E>, Error> {
        self.enumerate(Some(filter.to_string()))
    }

    /// Open an instance by path.
    pub fn open(&self, path: &str) -> Result<E, Error> {
        let entity = self.binding.entity();

        self.session
            .resolve(entity.model(), path, ErrorOrigin::Factory)
            .map(E::from_proxy)
    }

    /// Adapt a raw record as `E`.
    pub fn wrap(&self, record: RecordRef) -> Result<E, Error> {
        let entity = Arc::clone(self.binding.entity());

        Proxy::bind(self.session.clone(), entity, record).map(E::from_proxy)
    }

    fn spawn(&self) -> Result<RecordRef, Error> {
        let entity = self.binding.entity();

        self.session
            .store()
            .spawn_instance(&entity.class_path())
            .map_err(|err| {
                Error::store(
                    ErrorOrigin::Factory,
                    &format!("creating '{}'", entity.class()),
                    err,
                )
            })
    }

    fn enumerate(&self, filter: Option<String>) -> Result<InstanceCollection<E>, Error> {
        let entity = self.binding.entity();
        let options = self.session.options();
        let query = Query {
            filter,
            deep: options.enumerate_deep,
            locatable: options.ensure_locatable,
        };

        let records = self
            .session
            .store()
            .enumerate(&entity.class_path(), &query)
            .map_err(|err| {
                Error::store(
                    ErrorOrigin::Factory,
                    &format!("enumerating '{}'", entity.class()),
                    err,
                )
            })?;

        debug!(
            class = entity.class(),
            filter = query.filter.as_deref(),
            count = records.len(),
            "enumerated"
        );
        sink::record(MetricsEvent::Enumerate {
            entity_path: entity.model().path,
            count: records.len() as u64,
        });

        Ok(InstanceCollection::new(
            self.session.clone(),
            Arc::clone(entity),
            records,
        ))
    }
}

impl<E: Entity> Clone for Factory<E> {
    fn clone(&self) -> Self {
        Self::new(self.session.clone(), Arc::clone(&self.binding))
    }
}

impl<E: Entity> fmt::Debug for Factory<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("entity", &E::MODEL.path)
            .field("class", &self.binding.entity().class())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{ErrorKind, ErrorOrigin},
        session::{Session, SessionOptions},
        test_fixtures::{self, Element, Gadget, Other, SerialWidgetFactory, Widget, WidgetFactory},
        traits::Entity,
        value::Value,
    };

    fn session() -> Session {
        Session::new(test_fixtures::store())
    }

    #[test]
    fn created_instances_are_uncommitted_until_commit() {
        let session = session();
        let gadget = session.factory::<Gadget>().unwrap().create_instance().unwrap();

        assert_eq!(gadget.proxy().path().unwrap(), None);
        assert_eq!(gadget.serial().unwrap(), 0);

        gadget.base().set_id("g2".to_string()).unwrap();
        let path = gadget.proxy().commit().unwrap();
        assert!(path.ends_with("Test_Gadget.Id=\"g2\""));
        assert_eq!(gadget.proxy().path().unwrap(), Some(path));
    }

    #[test]
    fn keyed_constructors_set_their_keys() {
        let session = session();
        let widget = WidgetFactory::with_id(&session, "w9".to_string()).unwrap();

        assert_eq!(widget.base().id().unwrap(), "w9");
        assert_eq!(widget.proxy().path().unwrap(), None);
    }

    #[test]
    fn constructor_arity_is_checked() {
        let factory = session().factory_of::<WidgetFactory>().unwrap();

        let err = factory.create_with("with_id", Vec::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);

        let err = factory
            .create_with("with_name", vec![Value::from("x")])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
    }

    #[test]
    fn factories_with_missing_keys_fail_to_synthesize() {
        let err = session().factory_of::<SerialWidgetFactory>().unwrap_err();

        assert_eq!(err.kind, ErrorKind::SchemaMismatch);
        assert_eq!(err.origin, ErrorOrigin::Factory);
    }

    #[test]
    fn enumeration_is_deep_by_default() {
        let session = session();
        let widgets = session.factory::<Widget>().unwrap().get_instances().unwrap();
        assert_eq!(widgets.count(), 2);

        let elements = session.factory::<Element>().unwrap().get_instances().unwrap();
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn shallow_enumeration_skips_descendants() {
        let options = SessionOptions {
            enumerate_deep: false,
            ..SessionOptions::default()
        };
        let session = Session::with_options(test_fixtures::store(), options);

        let widgets = session.factory::<Widget>().unwrap().get_instances().unwrap();
        assert_eq!(widgets.len(), 1);
    }

    #[test]
    fn filters_narrow_enumeration() {
        let factory = session().factory::<Widget>().unwrap();

        let hits = factory.get_instances_where("Id = 's1'").unwrap();
        let ids: Vec<_> = hits.iter().map(|w| w.unwrap().base().id().unwrap()).collect();
        assert_eq!(ids, ["s1"]);

        let err = factory.get_instances_where("Id =").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Store(_)));
    }

    #[test]
    fn empty_enumeration_yields_nothing() {
        let others = session().factory::<Other>().unwrap();
        let none = others.get_instances_where("Id = 'nobody'").unwrap();

        assert_eq!(none.count(), 0);
        assert!(none.is_empty());
        assert!(none.iter().next().is_none());
    }

    #[test]
    fn open_binds_through_the_factory() {
        let factory = session().factory::<Gadget>().unwrap();
        let gadget = factory.open(test_fixtures::GADGET_PATH).unwrap();

        assert_eq!(gadget.serial().unwrap(), 7);
        assert_eq!(factory.class_schema().name, "Test_Gadget");
    }
}

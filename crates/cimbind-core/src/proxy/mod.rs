//! Proxy runtime.
//!
//! A `Proxy` is the generic interpreter behind every declared entity: it
//! pairs one backing record with the synthesized binding of a declaration
//! and performs property access and method invocation by consulting the
//! binding's member table.
mod identity;


use crate::{
    collection::InstanceCollection,
    error::{Error, ErrorOrigin},
    model::{EntityModel, LogicalType},
    obs::sink::{self, MetricsEvent},
    registry,
    session::Session,
    status,
    store::{PropertySet, RecordRef, system},
    synth::{
        EntityBinding, MethodSlot, PropertyBinding, PropertySlot,
        marshal::{self, Site},
    },
    traits::{Entity, Logical},
    value::{Value, WireValue},
};
use std::{
    fmt::{self, Debug},
    sync::{Arc, OnceLock},
};
use tracing::{trace, warn};

///
/// Proxy
///
/// A typed view's runtime: one record, one binding, one session.
/// Cloning shares the backing record handle and its identity key.
///

#[derive(Clone)]
pub struct Proxy {
    session: Session,
    binding: Arc<EntityBinding>,
    record: RecordRef,
    key: Arc<OnceLock<String>>,
}

impl Proxy {
    ///
    /// bind
    ///
    /// Adapt a raw record to `binding`. Fails fast when the record's class
    /// is neither the bound class nor a descendant of it.
    ///
    pub(crate) fn bind(
        session: Session,
        binding: Arc<EntityBinding>,
        record: RecordRef,
    ) -> Result<Self, Error> {
        identity::check(&binding, &record)?;

        let key = OnceLock::new();
        if let Some(path) = identity::record_key(&record) {
            let _ = key.set(path);
        }

        Ok(Self {
            session,
            binding,
            record,
            key: Arc::new(key),
        })
    }

    #[must_use]
    pub fn model(&self) -> &'static EntityModel {
        self.binding.model()
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn binding(&self) -> &Arc<EntityBinding> {
        &self.binding
    }

    #[must_use]
    pub const fn record(&self) -> &RecordRef {
        &self.record
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Read a declared property by logical name.
    pub fn get<T: Logical>(&self, name: &str) -> Result<T, Error> {
        let value = self.value(name)?;
        let found = value.label();
        let null = value.is_null();

        T::from_value(value).ok_or_else(|| {
            let (remote, ty) = self
                .binding
                .property(name)
                .map_or((name, T::TYPE), |p| (p.remote.as_str(), p.model.ty));
            let site = Site::new(ErrorOrigin::Property, self.binding.class(), remote);

            match ty {
                // a stored null reads as discriminant 0
                LogicalType::Enum(model) if null => site.invalid_cast(format_args!(
                    "value is null and enum {} has no variant with discriminant 0",
                    model.path
                )),
                _ => site.invalid_cast(format_args!("cannot read {found} as {}", ty.describe())),
            }
        })
    }

    /// Read a declared property as a dynamic value. References come back
    /// as bound proxies, timestamps decoded.
    pub fn value(&self, name: &str) -> Result<Value, Error> {
        let prop = self.property(name)?;
        let site = Site::new(ErrorOrigin::Property, self.binding.class(), &prop.remote);
        let declared = match prop.slot {
            PropertySlot::Bound { wire, .. } => wire,
            slot => return Err(self.unusable(prop, slot, &site)),
        };

        let raw = self
            .record
            .get(&prop.remote)
            .map_err(|err| Error::store(ErrorOrigin::Property, &format!("reading {site}"), err))?
            .unwrap_or(WireValue::Null);
        trace!(target_site = %site, wire = %raw.label(), "read");

        let value = marshal::decode(&self.session, &site, prop.model.ty, declared, raw)?;
        sink::record(MetricsEvent::PropertyRead {
            entity_path: self.model().path,
        });

        Ok(value)
    }

    /// Write a declared, writable property by logical name. The change is
    /// local to this handle until `commit`.
    pub fn set<T: Logical>(&self, name: &str, value: T) -> Result<(), Error> {
        let prop = self.property(name)?;
        let site = Site::new(ErrorOrigin::Property, self.binding.class(), &prop.remote);
        let (declared, remote) = match prop.slot {
            PropertySlot::Bound { wire, remote } => (wire, remote),
            slot => return Err(self.unusable(prop, slot, &site)),
        };
        if prop.model.access == crate::model::Access::ReadOnly {
            return Err(Error::declaration(
                ErrorOrigin::Property,
                format!("{site} is read-only"),
            ));
        }

        let strict = self.session.options().strict_numeric;
        let wire = marshal::encode(
            &site,
            prop.model.ty,
            declared,
            remote,
            strict,
            value.into_value(),
        )?;
        trace!(target_site = %site, wire = %wire.label(), "write");

        self.record
            .set(&prop.remote, wire)
            .map_err(|err| Error::store(ErrorOrigin::Property, &format!("writing {site}"), err))?;
        sink::record(MetricsEvent::PropertyWrite {
            entity_path: self.model().path,
        });

        Ok(())
    }

    fn property(&self, name: &str) -> Result<&PropertyBinding, Error> {
        self.binding.property(name).ok_or_else(|| {
            Error::declaration(
                ErrorOrigin::Property,
                format!("'{}' does not declare property '{name}'", self.model().path),
            )
        })
    }

    // Missing members fault as schema mismatches, incompatible ones as casts.
    fn unusable(&self, prop: &PropertyBinding, slot: PropertySlot, site: &Site<'_>) -> Error {
        match slot {
            PropertySlot::Mismatch { found, array } => site.invalid_cast(format_args!(
                "remote type is {found}{}, declared {}",
                if array { "[]" } else { "" },
                prop.model.ty.describe()
            )),
            _ => Error::schema_mismatch(
                ErrorOrigin::Property,
                format!(
                    "'{}' does not have property '{}'",
                    self.binding.class(),
                    prop.remote
                ),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Methods
    // ------------------------------------------------------------------

    ///
    /// invoke
    ///
    /// Call a declared method. `args` holds one value per input parameter
    /// (`In` and `InOut`), in declaration order. A non-zero status is an
    /// invocation fault; outputs are only read on success.
    ///
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Outcome, Error> {
        let method = self.binding.method(name).ok_or_else(|| {
            Error::declaration(
                ErrorOrigin::Method,
                format!("'{}' does not declare method '{name}'", self.model().path),
            )
        })?;
        let class = self.binding.class();
        let target = format!("'{class}'.'{}'", method.remote);

        let MethodSlot::Bound { params } = &method.slot else {
            return Err(Error::schema_mismatch(
                ErrorOrigin::Method,
                format!("'{class}' does not have method '{}'", method.remote),
            ));
        };

        let expected = method.model.inputs().count();
        if args.len() != expected {
            return Err(Error::declaration(
                ErrorOrigin::Method,
                format!("{target} takes {expected} arguments, got {}", args.len()),
            ));
        }

        // inputs
        let strict = self.session.options().strict_numeric;
        let mut inputs = PropertySet::new();
        let declared_inputs = params.iter().filter(|p| p.model.direction.is_input());
        for (param, arg) in declared_inputs.zip(args) {
            let Some(remote) = param.input else {
                continue;
            };
            let site = Site::new(ErrorOrigin::Method, class, &param.remote);
            let wire = marshal::encode(&site, param.model.ty, param.model.wire(), remote, strict, arg)?;
            inputs.insert(param.remote.clone(), wire);
        }

        sink::record(MetricsEvent::Invoke {
            entity_path: self.model().path,
        });
        let outputs = self
            .record
            .invoke(&method.remote, inputs)
            .map_err(|err| Error::store(ErrorOrigin::Method, &format!("invoking {target}"), err))?;

        // status
        let status_name = &self.session.options().status_property;
        let reported = outputs
            .get(status_name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                Error::missing_output(format!(
                    "{target} does not return status property '{status_name}'"
                ))
            })?;
        let code = status::code(reported).ok_or_else(|| {
            Error::invalid_cast(
                ErrorOrigin::Method,
                format!(
                    "{target} status '{status_name}' is {}, expected a 32-bit integer",
                    reported.label()
                ),
            )
        })?;
        if code != status::SUCCESS {
            warn!(target_site = %target, status = code, "remote method failed");
            sink::record(MetricsEvent::InvokeFault {
                entity_path: self.model().path,
                status: code,
            });
            return Err(Error::invocation_fault(code, &target));
        }

        // outputs
        let mut values = Vec::new();
        for param in params.iter().filter(|p| p.model.direction.is_output()) {
            let site = Site::new(ErrorOrigin::Method, class, &param.remote);
            let raw = required_output(&outputs, &target, &param.remote)?;
            let value = marshal::decode(&self.session, &site, param.model.ty, param.model.wire(), raw)?;
            values.push((param.model.name, value));
        }

        let returned = match &method.model.returns {
            Some(ret) => {
                let site = Site::new(ErrorOrigin::Method, class, ret.remote);
                let raw = required_output(&outputs, &target, ret.remote)?;
                Some(marshal::decode(&self.session, &site, ret.ty, ret.wire(), raw)?)
            }
            None => None,
        };

        Ok(Outcome {
            target,
            outputs: values,
            returned,
        })
    }

    // ------------------------------------------------------------------
    // System properties
    // ------------------------------------------------------------------

    fn system<T: Logical>(&self, name: &str) -> Result<T, Error> {
        let raw = self
            .record
            .get(name)
            .map_err(|err| Error::store(ErrorOrigin::Store, &format!("reading '{name}'"), err))?
            .unwrap_or(WireValue::Null);

        let value = Value::from_scalar_wire(raw);
        let found = value.label();
        T::from_value(value).ok_or_else(|| {
            Error::invalid_cast(
                ErrorOrigin::Property,
                format!("'{}'.'{name}': unexpected {found}", self.binding.class()),
            )
        })
    }

    /// The record's actual class, which may be a descendant of the bound one.
    pub fn class_name(&self) -> Result<String, Error> {
        self.system(system::CLASS)
    }

    pub fn superclass(&self) -> Result<Option<String>, Error> {
        self.system(system::SUPERCLASS)
    }

    pub fn dynasty(&self) -> Result<String, Error> {
        self.system(system::DYNASTY)
    }

    /// Ancestor classes, nearest first.
    pub fn derivation(&self) -> Result<Vec<String>, Error> {
        self.system(system::DERIVATION)
    }

    /// Full record path; `None` until the instance is committed.
    pub fn path(&self) -> Result<Option<String>, Error> {
        self.system(system::PATH)
    }

    pub fn relative_path(&self) -> Result<Option<String>, Error> {
        self.system(system::RELPATH)
    }

    pub fn namespace(&self) -> Result<String, Error> {
        self.system(system::NAMESPACE)
    }

    pub fn server(&self) -> Result<String, Error> {
        self.system(system::SERVER)
    }

    pub fn genus(&self) -> Result<i32, Error> {
        self.system(system::GENUS)
    }

    pub fn property_count(&self) -> Result<i32, Error> {
        self.system(system::PROPERTY_COUNT)
    }

    // ------------------------------------------------------------------
    // Lifecycle and traversal
    // ------------------------------------------------------------------

    /// Discard local edits and re-read the record.
    pub fn reload(&self) -> Result<(), Error> {
        self.record.reload().map_err(|err| {
            Error::store(
                ErrorOrigin::Store,
                &format!("reloading '{}'", self.binding.class()),
                err,
            )
        })
    }

    /// Write this handle back to the store, returning the record path.
    pub fn commit(&self) -> Result<String, Error> {
        let path = self.record.put().map_err(|err| {
            Error::store(
                ErrorOrigin::Store,
                &format!("committing '{}'", self.binding.class()),
                err,
            )
        })?;
        trace!(class = self.binding.class(), path = %path, "committed");
        let _ = self.key.set(path.to_ascii_lowercase());

        Ok(path)
    }

    /// Records associated with this one whose class is `E`'s class or a
    /// descendant of it.
    pub fn related<E: Entity>(&self) -> Result<InstanceCollection<E>, Error> {
        let binding = registry::entity_binding(self.session.store(), E::MODEL)?;
        let records = self.record.related(binding.class_name()).map_err(|err| {
            Error::store(
                ErrorOrigin::Collection,
                &format!("listing '{}' related to '{}'", binding.class(), self.binding.class()),
                err,
            )
        })?;

        Ok(InstanceCollection::new(self.session.clone(), binding, records))
    }

    ///
    /// view_as
    ///
    /// The same record seen through `model`, when `model` is this proxy's
    /// declaration or one of its declared ancestors. Uses the ancestor
    /// bindings captured at synthesis, so it never touches the store.
    ///
    #[must_use]
    pub fn view_as(&self, model: &'static EntityModel) -> Option<Self> {
        let mut binding = Some(&self.binding);
        while let Some(current) = binding {
            if current.model().path == model.path {
                return Some(Self {
                    session: self.session.clone(),
                    binding: Arc::clone(current),
                    record: Arc::clone(&self.record),
                    key: Arc::clone(&self.key),
                });
            }
            binding = current.parent();
        }

        None
    }

    /// Rebind the same record as another declaration, normally an ancestor.
    pub fn upcast<P: Entity>(&self) -> Result<P, Error> {
        let binding = registry::entity_binding(self.session.store(), P::MODEL)?;
        let proxy = Self::bind(self.session.clone(), binding, Arc::clone(&self.record))?;

        Ok(P::from_proxy(proxy))
    }
}

impl Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("entity", &self.model().path)
            .field("class", &self.binding.class())
            .field("path", &self.path().ok().flatten())
            .finish()
    }
}

fn required_output(outputs: &PropertySet, target: &str, name: &str) -> Result<WireValue, Error> {
    outputs
        .get(name)
        .cloned()
        .ok_or_else(|| Error::missing_output(format!("{target} does not return property '{name}'")))
}

///
/// Outcome
/// Result of a successful invocation: decoded outputs and return value.
///

#[derive(Clone, Debug)]
pub struct Outcome {
    target: String,
    outputs: Vec<(&'static str, Value)>,
    returned: Option<Value>,
}

impl Outcome {
    /// Output parameter by logical name.
    pub fn output<T: Logical>(&self, name: &str) -> Result<T, Error> {
        let value = self
            .outputs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                Error::declaration(
                    ErrorOrigin::Method,
                    format!("{} does not declare output '{name}'", self.target),
                )
            })?;

        self.lift(name, value)
    }

    /// The designated return value.
    pub fn returned<T: Logical>(&self) -> Result<T, Error> {
        let value = self.returned.clone().ok_or_else(|| {
            Error::declaration(
                ErrorOrigin::Method,
                format!("{} does not declare a return value", self.target),
            )
        })?;

        self.lift("return value", value)
    }

    #[must_use]
    pub fn outputs(&self) -> &[(&'static str, Value)] {
        &self.outputs
    }

    fn lift<T: Logical>(&self, name: &str, value: Value) -> Result<T, Error> {
        let found = value.label();

        T::from_value(value).ok_or_else(|| {
            Error::invalid_cast(
                ErrorOrigin::Method,
                format!("{} {name}: cannot read {found} as requested", self.target),
            )
        })
    }
}

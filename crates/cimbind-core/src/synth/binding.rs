use crate::{
    error::{Error, ErrorOrigin},
    model::{self, ClassPath, EntityModel, LogicalType, MethodModel, ParamModel, PropertyModel},
    obs::sink::{self, MetricsEvent, SynthKind},
    registry,
    store::{ClassSchema, MethodSchema, RemoteStore},
    value::WireType,
};
use std::{fmt::Write as _, sync::Arc};
use tracing::{debug, warn};

///
/// EntityBinding
///
/// The synthesized implementation of one entity declaration against one
/// store scope: every effective member resolved to a remote name and a
/// slot recording what the remote schema actually offers.
///
/// Bindings are immutable once built and shared by every proxy of the
/// declaration. A declaration with a parent holds the parent's binding,
/// so a proxy can always be viewed through any declared ancestor.
///

#[derive(Debug)]
pub struct EntityBinding {
    model: &'static EntityModel,
    parent: Option<Arc<Self>>,
    class: String,
    schema: ClassSchema,
    properties: Vec<PropertyBinding>,
    methods: Vec<MethodBinding>,
}

impl EntityBinding {
    ///
    /// synthesize
    ///
    /// Validate the declaration, query the remote class once, and bind
    /// every member. A missing class fails outright; missing members are
    /// recorded and only fault when used. The parent declaration is bound
    /// first (through the registry) and its remote class must be an
    /// ancestor of this one.
    ///
    pub fn synthesize(store: &dyn RemoteStore, model: &'static EntityModel) -> Result<Self, Error> {
        model::validate(model)?;
        let path = model.class_path().ok_or_else(|| {
            Error::declaration(
                ErrorOrigin::Declaration,
                format!("'{}' maps to malformed class '{}'", model.path, model.class),
            )
        })?;

        // the chain was validated above, so this recursion terminates
        let parent = model
            .parent
            .map(|p| registry::entity_binding(store, p.model()))
            .transpose()?;

        let schema = class_schema(store, &path)?;
        let class = path.to_string();

        if let Some(parent) = &parent
            && !descends_from(&schema, parent.class_name())
        {
            return Err(Error::schema_mismatch(
                ErrorOrigin::Synthesis,
                format!(
                    "'{}' extends '{}', but '{class}' does not derive from '{}'",
                    model.path,
                    parent.model().path,
                    parent.class()
                ),
            ));
        }

        let properties: Vec<_> = model
            .effective_properties()
            .into_iter()
            .map(|prop| PropertyBinding::bind(&class, &schema, prop))
            .collect();
        let methods: Vec<_> = model
            .effective_methods()
            .into_iter()
            .map(|method| MethodBinding::bind(&class, &schema, method))
            .collect();

        let missing = properties.iter().filter(|p| !p.is_bound()).count()
            + methods.iter().filter(|m| !m.is_bound()).count();
        debug!(
            entity = model.path,
            class = %class,
            properties = properties.len(),
            methods = methods.len(),
            missing,
            "synthesized entity binding"
        );
        sink::record(MetricsEvent::Synthesized {
            entity_path: model.path,
            kind: SynthKind::Entity,
            missing_members: missing as u64,
        });

        Ok(Self {
            model,
            parent,
            class,
            schema,
            properties,
            methods,
        })
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    /// Binding of the parent declaration, if there is one.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Remote class in `NAMESPACE:Class` form.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.schema.name
    }

    /// Remote class metadata captured at synthesis time.
    #[must_use]
    pub const fn schema(&self) -> &ClassSchema {
        &self.schema
    }

    #[must_use]
    pub fn class_path(&self) -> ClassPath<'_> {
        ClassPath {
            namespace: &self.schema.namespace,
            class_name: &self.schema.name,
        }
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertyBinding] {
        &self.properties
    }

    #[must_use]
    pub fn methods(&self) -> &[MethodBinding] {
        &self.methods
    }

    /// Property by logical name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyBinding> {
        self.properties.iter().find(|p| p.model.name == name)
    }

    /// Method by logical name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodBinding> {
        self.methods.iter().find(|m| m.model.name == name)
    }

    /// Whether a record of `class` with ancestors `derivation` can be
    /// viewed through this binding.
    #[must_use]
    pub fn accepts(&self, class: &str, derivation: &[String]) -> bool {
        let own = &self.schema.name;

        class.eq_ignore_ascii_case(own) || derivation.iter().any(|c| c.eq_ignore_ascii_case(own))
    }

    /// Multi-line description for diagnostic reports.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("{} -> {}\n", self.model.path, self.class);

        for prop in &self.properties {
            let _ = writeln!(
                out,
                "    {} {} -> {} : {} [{}]",
                prop.model.access,
                prop.model.name,
                prop.remote,
                prop.model.ty.describe(),
                prop.slot
            );
        }
        for method in &self.methods {
            let _ = write!(out, "    fn {} -> {}", method.model.name, method.remote);
            match &method.slot {
                MethodSlot::Missing => out.push_str(" [missing]\n"),
                MethodSlot::Bound { params } => {
                    let skipped = params.iter().filter(|p| p.is_skipped()).count();
                    let _ = writeln!(out, " [{} params, {skipped} skipped]", params.len());
                }
            }
        }

        out
    }
}

fn descends_from(schema: &ClassSchema, ancestor: &str) -> bool {
    schema.name.eq_ignore_ascii_case(ancestor)
        || schema
            .derivation
            .iter()
            .any(|c| c.eq_ignore_ascii_case(ancestor))
}

fn class_schema(store: &dyn RemoteStore, path: &ClassPath<'_>) -> Result<ClassSchema, Error> {
    store
        .class_schema(path)
        .map_err(|err| Error::store(ErrorOrigin::Synthesis, &format!("probing '{path}'"), err))?
        .ok_or_else(|| {
            Error::schema_mismatch(
                ErrorOrigin::Synthesis,
                format!("'{path}' is not defined by the remote store"),
            )
        })
}

///
/// PropertyBinding
///

#[derive(Debug)]
pub struct PropertyBinding {
    pub model: &'static PropertyModel,
    pub remote: String,
    pub slot: PropertySlot,
}

impl PropertyBinding {
    fn bind(class: &str, schema: &ClassSchema, prop: &'static PropertyModel) -> Self {
        let remote = prop.remote_name().into_owned();

        let Some(found) = schema.property(&remote) else {
            warn!(class, property = %remote, "declared property is not defined remotely");
            return Self {
                model: prop,
                remote,
                slot: PropertySlot::Missing,
            };
        };

        let wire = prop.wire();
        let slot = if compatible(prop.ty, wire, found.wire, found.array) {
            PropertySlot::Bound {
                wire,
                remote: found.wire,
            }
        } else {
            warn!(
                class,
                property = %remote,
                declared = %wire,
                found = %found.wire,
                "declared property does not match its remote type"
            );
            PropertySlot::Mismatch {
                found: found.wire,
                array: found.array,
            }
        };

        Self {
            model: prop,
            remote: found.name.clone(),
            slot,
        }
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self.slot, PropertySlot::Bound { .. })
    }
}

// Shape must agree; timestamps and references additionally need the exact
// remote tag, since no best-effort coercion exists for them.
fn compatible(ty: LogicalType, declared: WireType, found: WireType, array: bool) -> bool {
    if ty.is_array() != array {
        return false;
    }

    match ty.scalar() {
        LogicalType::Timestamp | LogicalType::Entity(_) => declared == found,
        _ => true,
    }
}

///
/// PropertySlot
///

#[derive(Clone, Copy, Debug, derive_more::Display)]
pub enum PropertySlot {
    /// Not defined remotely; every access is a schema mismatch.
    #[display("missing")]
    Missing,

    /// Defined with an incompatible representation; every access is an
    /// invalid cast.
    #[display("mismatch {found}{}", if *array { "[]" } else { "" })]
    Mismatch { found: WireType, array: bool },

    /// `wire` is the declared type, `remote` the store's.
    #[display("bound {remote}")]
    Bound { wire: WireType, remote: WireType },
}

///
/// MethodBinding
///

#[derive(Debug)]
pub struct MethodBinding {
    pub model: &'static MethodModel,
    pub remote: String,
    pub slot: MethodSlot,
}

impl MethodBinding {
    fn bind(class: &str, schema: &ClassSchema, method: &'static MethodModel) -> Self {
        let remote = method.remote_name().into_owned();

        let Some(signature) = schema.method(&remote) else {
            warn!(class, method = %remote, "declared method is not defined remotely");
            return Self {
                model: method,
                remote,
                slot: MethodSlot::Missing,
            };
        };

        let params = method
            .params
            .iter()
            .map(|param| ParamBinding::bind(class, signature, param))
            .collect();

        Self {
            model: method,
            remote: signature.name.clone(),
            slot: MethodSlot::Bound { params },
        }
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self.slot, MethodSlot::Bound { .. })
    }
}

///
/// MethodSlot
///

#[derive(Debug)]
pub enum MethodSlot {
    Missing,
    Bound { params: Vec<ParamBinding> },
}

///
/// ParamBinding
///
/// `input` holds the remote input type, or `None` when the signature
/// lacks the parameter and the argument is dropped.
///

#[derive(Debug)]
pub struct ParamBinding {
    pub model: &'static ParamModel,
    pub remote: String,
    pub input: Option<WireType>,
}

impl ParamBinding {
    fn bind(class: &str, signature: &MethodSchema, param: &'static ParamModel) -> Self {
        let remote = param.remote_name().into_owned();

        let input = if param.direction.is_input() {
            let found = signature.find_input(&remote).map(|p| p.wire);
            if found.is_none() {
                warn!(
                    class,
                    method = %signature.name,
                    parameter = %remote,
                    "declared parameter is not defined remotely, it will not be sent"
                );
            }
            found
        } else {
            None
        };

        Self {
            model: param,
            remote,
            input,
        }
    }

    /// An input the signature does not define.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.model.direction.is_input() && self.input.is_none()
    }
}

use crate::{
    error::{Error, ErrorOrigin},
    model::{self, ConstructorModel, FactoryModel, ParamModel},
    obs::sink::{self, MetricsEvent, SynthKind},
    synth::EntityBinding,
    value::WireType,
};
use std::{fmt::Write as _, sync::Arc};
use tracing::debug;

///
/// FactoryBinding
///
/// Synthesized factory over one entity binding. Entities without a
/// declared factory get a binding with no constructors.
///
/// Unlike entity members, every constructor key must exist remotely:
/// a keyed constructor with a missing key could never produce a record
/// that commits, so synthesis fails outright.
///

#[derive(Debug)]
pub struct FactoryBinding {
    entity: Arc<EntityBinding>,
    model: Option<&'static FactoryModel>,
    constructors: Vec<ConstructorBinding>,
}

impl FactoryBinding {
    pub fn synthesize(
        entity: Arc<EntityBinding>,
        model: Option<&'static FactoryModel>,
    ) -> Result<Self, Error> {
        let Some(model) = model else {
            return Ok(Self {
                entity,
                model: None,
                constructors: Vec::new(),
            });
        };

        model::validate_factory(model)?;
        if model.entity.model().path != entity.model().path {
            return Err(Error::declaration(
                ErrorOrigin::Factory,
                format!(
                    "'{}' produces '{}', not '{}'",
                    model.path,
                    model.entity.model().path,
                    entity.model().path
                ),
            ));
        }

        let constructors = model
            .constructors
            .iter()
            .map(|ctor| ConstructorBinding::bind(&entity, ctor))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            factory = model.path,
            class = entity.class(),
            constructors = constructors.len(),
            "synthesized factory binding"
        );
        sink::record(MetricsEvent::Synthesized {
            entity_path: entity.model().path,
            kind: SynthKind::Factory,
            missing_members: 0,
        });

        Ok(Self {
            entity,
            model: Some(model),
            constructors,
        })
    }

    #[must_use]
    pub const fn entity(&self) -> &Arc<EntityBinding> {
        &self.entity
    }

    #[must_use]
    pub const fn model(&self) -> Option<&'static FactoryModel> {
        self.model
    }

    #[must_use]
    pub fn constructors(&self) -> &[ConstructorBinding] {
        &self.constructors
    }

    #[must_use]
    pub fn constructor(&self, name: &str) -> Option<&ConstructorBinding> {
        self.constructors.iter().find(|c| c.model.name == name)
    }

    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = match self.model {
            Some(model) => format!("{} -> {}\n", model.path, self.entity.class()),
            None => format!("(default factory) -> {}\n", self.entity.class()),
        };

        for ctor in &self.constructors {
            let keys: Vec<_> = ctor.keys.iter().map(|k| k.remote.as_str()).collect();
            let _ = writeln!(out, "    new {}({})", ctor.model.name, keys.join(", "));
        }

        out
    }
}

///
/// ConstructorBinding
///

#[derive(Debug)]
pub struct ConstructorBinding {
    pub model: &'static ConstructorModel,
    pub keys: Vec<KeyBinding>,
}

impl ConstructorBinding {
    fn bind(entity: &EntityBinding, ctor: &'static ConstructorModel) -> Result<Self, Error> {
        let keys = ctor
            .keys
            .iter()
            .map(|key| KeyBinding::bind(entity, key))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { model: ctor, keys })
    }
}

///
/// KeyBinding
/// One constructor key resolved against the class's properties.
///

#[derive(Debug)]
pub struct KeyBinding {
    pub model: &'static ParamModel,
    pub remote: String,
    pub remote_wire: WireType,
}

impl KeyBinding {
    fn bind(entity: &EntityBinding, key: &'static ParamModel) -> Result<Self, Error> {
        let remote = key.remote_name();
        let found = entity.schema().property(&remote).ok_or_else(|| {
            Error::schema_mismatch(
                ErrorOrigin::Factory,
                format!("'{}' does not have key '{remote}'", entity.class()),
            )
        })?;

        if found.array != key.ty.is_array() {
            return Err(Error::schema_mismatch(
                ErrorOrigin::Factory,
                format!(
                    "'{}'.'{}' key shape does not match its declaration",
                    entity.class(),
                    found.name
                ),
            ));
        }

        Ok(Self {
            model: key,
            remote: found.name.clone(),
            remote_wire: found.wire,
        })
    }
}

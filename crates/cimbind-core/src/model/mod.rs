//! Static declaration descriptors.
//!
//! Entity and factory declarations are plain `'static` data: the remote
//! class a type maps to, its parent declaration, and per-member remote
//! names and wire overrides. The synthesis engine interprets these
//! descriptors against a live remote schema; nothing here talks to a store.
//!
//! In general:
//! - Declarations define *what is expected*
//! - `synth` decides *what is bound*
pub mod entity;
pub mod factory;
pub mod member;
pub mod types;

#[cfg(test)]
mod tests;

use crate::error::{Error, ErrorOrigin};
use std::collections::HashSet;

// re-exports
pub use entity::{ClassPath, EntityModel};
pub use factory::{ConstructorModel, FactoryModel};
pub use member::{Access, Direction, MethodModel, ParamModel, PropertyModel, ReturnModel};
pub use types::{Element, EntityRef, EnumModel, LogicalType};

///
/// validate
///
/// Check one entity declaration (and its parent chain) for problems that
/// no remote schema could fix. Runs once, before synthesis.
///
pub fn validate(model: &EntityModel) -> Result<(), Error> {
    let fail = |message: String| Error::declaration(ErrorOrigin::Declaration, message);

    if model.class_path().is_none() {
        return Err(fail(format!(
            "'{}' maps to malformed class '{}', expected NAMESPACE:Class",
            model.path, model.class
        )));
    }

    // parent chain must terminate and never revisit a declaration
    let mut seen = HashSet::from([model.path]);
    let mut depth = 0;
    for ancestor in model.ancestors() {
        depth += 1;
        if !seen.insert(ancestor.path) {
            return Err(fail(format!(
                "'{}' has a cyclic parent chain through '{}'",
                model.path, ancestor.path
            )));
        }
        if ancestor.class_path().is_none() {
            return Err(fail(format!(
                "'{}' inherits from '{}', which maps to malformed class '{}'",
                model.path, ancestor.path, ancestor.class
            )));
        }
    }
    if depth >= entity::MAX_DEPTH {
        return Err(fail(format!(
            "'{}' has a parent chain deeper than {}",
            model.path,
            entity::MAX_DEPTH
        )));
    }

    let mut names = HashSet::new();
    for prop in model.properties {
        if !names.insert(prop.name) {
            return Err(fail(format!(
                "'{}' declares property '{}' more than once",
                model.path, prop.name
            )));
        }
    }

    let mut names = HashSet::new();
    for method in model.methods {
        if !names.insert(method.name) {
            return Err(fail(format!(
                "'{}' declares method '{}' more than once",
                model.path, method.name
            )));
        }
        validate_params(model.path, method.name, method.params)?;
    }

    Ok(())
}

/// Check one factory declaration.
pub fn validate_factory(model: &FactoryModel) -> Result<(), Error> {
    let mut names = HashSet::new();
    for ctor in model.constructors {
        if !names.insert(ctor.name) {
            return Err(Error::declaration(
                ErrorOrigin::Declaration,
                format!(
                    "'{}' declares constructor '{}' more than once",
                    model.path, ctor.name
                ),
            ));
        }
        validate_params(model.path, ctor.name, ctor.keys)?;

        if let Some(key) = ctor.keys.iter().find(|k| k.direction != Direction::In) {
            return Err(Error::declaration(
                ErrorOrigin::Declaration,
                format!(
                    "'{}'.'{}' key '{}' must be an input",
                    model.path, ctor.name, key.name
                ),
            ));
        }
    }

    validate(model.entity.model())
}

fn validate_params(owner: &str, member: &str, params: &[ParamModel]) -> Result<(), Error> {
    let mut names = HashSet::new();
    let mut remotes = HashSet::new();
    for param in params {
        let remote = param.remote_name().to_ascii_lowercase();
        if !names.insert(param.name) || !remotes.insert(remote) {
            return Err(Error::declaration(
                ErrorOrigin::Declaration,
                format!(
                    "'{owner}'.'{member}' declares parameter '{}' more than once",
                    param.name
                ),
            ));
        }
    }

    Ok(())
}

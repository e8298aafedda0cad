use crate::model::{member::ParamModel, types::EntityRef};

///
/// FactoryModel
///
/// Static descriptor for a declared factory: the entity it produces and
/// its keyed constructors.
///

#[derive(Debug)]
pub struct FactoryModel {
    pub path: &'static str,
    pub entity: EntityRef,
    pub constructors: &'static [ConstructorModel],
}

impl FactoryModel {
    #[must_use]
    pub fn constructor(&self, name: &str) -> Option<&'static ConstructorModel> {
        self.constructors.iter().find(|c| c.name == name)
    }
}

///
/// ConstructorModel
///
/// A keyed `create_instance` overload. Each key is written into a fresh
/// class template before the record is materialised.
///

#[derive(Clone, Copy, Debug)]
pub struct ConstructorModel {
    pub name: &'static str,
    pub keys: &'static [ParamModel],
}

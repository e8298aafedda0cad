use crate::value::WireType;
use serde::{Deserialize, Serialize};

///
/// ClassSchema
///
/// Store-side description of a class. As returned by
/// `RemoteStore::class_schema` it is flattened: members include everything
/// inherited, and `derivation` lists ancestors nearest first.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClassSchema {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub derivation: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
    #[serde(default)]
    pub methods: Vec<MethodSchema>,
}

impl ClassSchema {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, wire: WireType) -> Self {
        self.properties.push(PropertySchema {
            key: true,
            ..PropertySchema::new(name, wire)
        });
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, wire: WireType) -> Self {
        self.properties.push(PropertySchema::new(name, wire));
        self
    }

    #[must_use]
    pub fn with_array(mut self, name: impl Into<String>, wire: WireType) -> Self {
        self.properties.push(PropertySchema {
            array: true,
            ..PropertySchema::new(name, wire)
        });
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodSchema) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodSchema> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertySchema> {
        self.properties.iter().filter(|p| p.key)
    }

    /// Whether this class is `class` or derives from it.
    #[must_use]
    pub fn is_a(&self, class: &str) -> bool {
        self.name.eq_ignore_ascii_case(class)
            || self.derivation.iter().any(|c| c.eq_ignore_ascii_case(class))
    }

    /// Root of the derivation chain.
    #[must_use]
    pub fn dynasty(&self) -> &str {
        self.derivation.last().unwrap_or(&self.name)
    }
}

///
/// PropertySchema
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PropertySchema {
    pub name: String,
    pub wire: WireType,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub key: bool,
}

impl PropertySchema {
    pub fn new(name: impl Into<String>, wire: WireType) -> Self {
        Self {
            name: name.into(),
            wire,
            array: false,
            key: false,
        }
    }
}

///
/// MethodSchema
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodSchema {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<PropertySchema>,
    #[serde(default)]
    pub outputs: Vec<PropertySchema>,
}

impl MethodSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn input(mut self, name: impl Into<String>, wire: WireType) -> Self {
        self.inputs.push(PropertySchema::new(name, wire));
        self
    }

    #[must_use]
    pub fn output(mut self, name: impl Into<String>, wire: WireType) -> Self {
        self.outputs.push(PropertySchema::new(name, wire));
        self
    }

    #[must_use]
    pub fn find_input(&self, name: &str) -> Option<&PropertySchema> {
        self.inputs.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn find_output(&self, name: &str) -> Option<&PropertySchema> {
        self.outputs.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

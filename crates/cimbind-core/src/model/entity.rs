use crate::model::{
    member::{MethodModel, PropertyModel},
    types::EntityRef,
};
use std::fmt::{self, Display};

///
/// EntityModel
///
/// Static descriptor for one entity declaration: which remote class it maps
/// to, its parent declaration, and its own (non-inherited) members.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified Rust type path (cache key and diagnostics).
    pub path: &'static str,
    /// Remote class in combined `NAMESPACE:Class` form.
    pub class: &'static str,
    pub parent: Option<EntityRef>,
    pub properties: &'static [PropertyModel],
    pub methods: &'static [MethodModel],
}

impl EntityModel {
    /// Parsed remote class path; `None` for a malformed declaration.
    #[must_use]
    pub fn class_path(&self) -> Option<ClassPath<'static>> {
        ClassPath::parse(self.class)
    }

    /// Parent chain, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent,
            remaining: MAX_DEPTH,
        }
    }

    /// Whether `self` is `other` or declares it as an ancestor.
    #[must_use]
    pub fn extends(&self, other: &Self) -> bool {
        self.path == other.path || self.ancestors().any(|m| m.path == other.path)
    }

    ///
    /// effective_properties
    ///
    /// Flattened property list: inherited members first (root downwards),
    /// then own members. A redeclared logical name replaces the inherited
    /// entry in place.
    ///
    #[must_use]
    pub fn effective_properties(&self) -> Vec<&'static PropertyModel> {
        let mut out: Vec<&'static PropertyModel> = Vec::new();
        for model in self.lineage() {
            for prop in model.properties {
                match out.iter_mut().find(|p| p.name == prop.name) {
                    Some(slot) => *slot = prop,
                    None => out.push(prop),
                }
            }
        }

        out
    }

    /// Flattened method list, with the same override rule as properties.
    #[must_use]
    pub fn effective_methods(&self) -> Vec<&'static MethodModel> {
        let mut out: Vec<&'static MethodModel> = Vec::new();
        for model in self.lineage() {
            for method in model.methods {
                match out.iter_mut().find(|m| m.name == method.name) {
                    Some(slot) => *slot = method,
                    None => out.push(method),
                }
            }
        }

        out
    }

    // root first, ending with self
    fn lineage(&self) -> Vec<&Self> {
        let mut chain: Vec<&Self> = vec![self];
        for ancestor in self.ancestors() {
            chain.push(ancestor);
        }
        chain.reverse();

        chain
    }
}

/// Upper bound on parent chain length; deeper chains are treated as cycles.
pub const MAX_DEPTH: usize = 32;

///
/// Ancestors
///

pub struct Ancestors {
    next: Option<EntityRef>,
    remaining: usize,
}

impl Iterator for Ancestors {
    type Item = &'static EntityModel;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let model = self.next?.model();
        self.next = model.parent;

        Some(model)
    }
}

///
/// ClassPath
/// Remote class address: namespace plus class name.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassPath<'a> {
    pub namespace: &'a str,
    pub class_name: &'a str,
}

impl<'a> ClassPath<'a> {
    ///
    /// parse
    ///
    /// Split `NAMESPACE:Class` at the last colon. Both halves must be
    /// non-empty.
    ///
    #[must_use]
    pub fn parse(text: &'a str) -> Option<Self> {
        let (namespace, class_name) = text.rsplit_once(':')?;
        if namespace.is_empty() || class_name.is_empty() {
            return None;
        }

        Some(Self {
            namespace,
            class_name,
        })
    }
}

impl Display for ClassPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.class_name)
    }
}

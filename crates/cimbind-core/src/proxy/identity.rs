//! Identity and equality of proxies.
//!
//! Two proxies are equal when they are bound to the same declaration and
//! their records carry the same path (case-insensitively). The path is
//! captured when a proxy is bound or committed and shared by its clones
//! and ancestor views, so committed proxies keep comparing and hashing by
//! path while the store is unreachable. Records without a known path
//! (uncommitted instances) fall back to handle identity.
use crate::{
    error::{Error, ErrorOrigin},
    proxy::Proxy,
    store::{RecordRef, system},
    synth::EntityBinding,
    value::WireValue,
};
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Reject records whose class is unrelated to the bound class.
pub(super) fn check(binding: &EntityBinding, record: &RecordRef) -> Result<(), Error> {
    let class = read(record, system::CLASS)?;
    let derivation = match read(record, system::DERIVATION)? {
        Some(WireValue::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_text().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    let class = class.as_ref().and_then(WireValue::as_text).unwrap_or_default();

    if binding.accepts(class, &derivation) {
        Ok(())
    } else {
        Err(Error::identity_mismatch(format!(
            "record of class '{class}' cannot be bound as '{}': expected '{}' or a descendant",
            binding.model().path,
            binding.class()
        )))
    }
}

fn read(record: &RecordRef, name: &str) -> Result<Option<WireValue>, Error> {
    let value = record
        .get(name)
        .map_err(|err| Error::store(ErrorOrigin::Synthesis, &format!("reading '{name}'"), err))?;

    Ok(value.filter(|v| !v.is_null()))
}

/// Lowercased record path, if the record has one and the store answers.
pub(super) fn record_key(record: &RecordRef) -> Option<String> {
    match record.get(system::PATH).ok().flatten() {
        Some(WireValue::String(path) | WireValue::Reference(path)) if !path.is_empty() => {
            Some(path.to_ascii_lowercase())
        }
        _ => None,
    }
}

fn path_key(proxy: &Proxy) -> Option<&str> {
    if let Some(key) = proxy.key.get() {
        return Some(key);
    }
    let key = record_key(proxy.record())?;

    Some(proxy.key.get_or_init(|| key))
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        if self.model().path != other.model().path {
            return false;
        }

        match (path_key(self), path_key(other)) {
            (Some(a), Some(b)) => a == b,
            _ => Arc::ptr_eq(self.record(), other.record()),
        }
    }
}

impl Eq for Proxy {}

impl Hash for Proxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model().path.hash(state);

        match path_key(self) {
            Some(path) => path.hash(state),
            None => Arc::as_ptr(self.record()).cast::<()>().hash(state),
        }
    }
}

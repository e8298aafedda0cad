//! In-memory store.
//!
//! A small, self-contained `RemoteStore` with class inheritance, key-based
//! paths, a `Prop = literal [AND ...]` filter language, associations, and
//! scriptable method handlers. Handles behave like remote object copies:
//! edits stay local until `put`, and `reload` discards them.
use crate::{
    model::ClassPath,
    store::{
        ClassSchema, PropertySet, Query, RETURN_VALUE, Record, RecordRef, RemoteStore,
        StoreError, system,
    },
    value::WireValue,
};
use std::{
    collections::HashMap,
    fmt::Write as _,
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

///
/// MethodHandler
///
/// Server-side body of a method: receives the record's properties
/// (mutable) and the inputs, returns the output set.
///

pub type MethodHandler =
    Arc<dyn Fn(&mut PropertySet, &PropertySet) -> Result<PropertySet, StoreError> + Send + Sync>;

///
/// MemoryStore
///

#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

struct Shared {
    scope: String,
    server: String,
    offline: AtomicBool,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    classes: Vec<ClassSchema>,
    records: Vec<Stored>,
    associations: Vec<(String, String)>,
    handlers: Vec<(String, String, MethodHandler)>,
}

struct Stored {
    path: String,
    namespace: String,
    class: String,
    values: PropertySet,
}

impl MemoryStore {
    /// Empty store. Each store gets its own scope, so bindings synthesized
    /// against one store are never reused for another.
    pub fn new(server: impl Into<String>) -> Self {
        let server = server.into();
        let scope = format!(
            "memory://{server}/{}",
            NEXT_SCOPE.fetch_add(1, Ordering::Relaxed)
        );

        Self {
            shared: Arc::new(Shared {
                scope,
                server,
                offline: AtomicBool::new(false),
                state: RwLock::new(State::default()),
            }),
        }
    }

    /// Define (or redefine) a class. Members are the class's own; parents
    /// are resolved within the same namespace.
    pub fn define(&self, schema: ClassSchema) {
        let mut state = self.shared.write();
        state
            .classes
            .retain(|c| !same_class(c, &schema.namespace, &schema.name));
        state.classes.push(schema);
    }

    ///
    /// insert
    ///
    /// Create and commit one instance of `class` (`NAMESPACE:Class`),
    /// returning its path.
    ///
    pub fn insert<'a>(
        &self,
        class: &str,
        values: impl IntoIterator<Item = (&'a str, WireValue)>,
    ) -> Result<String, StoreError> {
        let path = ClassPath::parse(class)
            .ok_or_else(|| StoreError::invalid_query(format!("malformed class '{class}'")))?;
        let record = self.spawn_instance(&path)?;
        for (name, value) in values {
            record.set(name, value)?;
        }

        record.put()
    }

    /// Associate two records; `related` walks associations both ways.
    pub fn associate(&self, left: &str, right: &str) {
        self.shared
            .write()
            .associations
            .push((left.to_string(), right.to_string()));
    }

    /// Install the body of `method` on `class` (`NAMESPACE:Class`).
    /// Descendant classes inherit it.
    pub fn on_invoke<F>(&self, class: &str, method: &str, handler: F)
    where
        F: Fn(&mut PropertySet, &PropertySet) -> Result<PropertySet, StoreError>
            + Send
            + Sync
            + 'static,
    {
        let class = ClassPath::parse(class).map_or(class, |p| p.class_name);
        let mut state = self.shared.write();
        state
            .handlers
            .retain(|(c, m, _)| !(c.eq_ignore_ascii_case(class) && m.eq_ignore_ascii_case(method)));
        state
            .handlers
            .push((class.to_string(), method.to_string(), Arc::new(handler)));
    }

    /// Simulate a lost connection: every operation fails as unavailable.
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of committed records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.shared.read().records.len()
    }
}

impl RemoteStore for MemoryStore {
    fn scope(&self) -> &str {
        &self.shared.scope
    }

    fn class_schema(&self, class: &ClassPath<'_>) -> Result<Option<ClassSchema>, StoreError> {
        self.shared.ensure_online()?;

        Ok(self.shared.read().flatten(class.namespace, class.class_name))
    }

    fn spawn_instance(&self, class: &ClassPath<'_>) -> Result<RecordRef, StoreError> {
        self.shared.ensure_online()?;

        let schema = self
            .shared
            .read()
            .flatten(class.namespace, class.class_name)
            .ok_or_else(|| StoreError::not_found(format!("class '{class}' is not defined")))?;
        let values = schema
            .properties
            .iter()
            .map(|p| (p.name.clone(), WireValue::Null))
            .collect();

        Ok(MemoryRecord::new(&self.shared, schema, values, None))
    }

    fn enumerate(&self, class: &ClassPath<'_>, query: &Query) -> Result<Vec<RecordRef>, StoreError> {
        self.shared.ensure_online()?;

        let state = self.shared.read();
        let target = state
            .flatten(class.namespace, class.class_name)
            .ok_or_else(|| StoreError::not_found(format!("class '{class}' is not defined")))?;
        let conditions = match &query.filter {
            Some(text) => parse_filter(text)?,
            None => Vec::new(),
        };

        let mut schemas: HashMap<String, ClassSchema> = HashMap::new();
        let mut out: Vec<RecordRef> = Vec::new();
        for stored in &state.records {
            if !stored.namespace.eq_ignore_ascii_case(&target.namespace) {
                continue;
            }
            let key = stored.class.to_ascii_lowercase();
            if !schemas.contains_key(&key) {
                let Some(schema) = state.flatten(&stored.namespace, &stored.class) else {
                    continue;
                };
                schemas.insert(key.clone(), schema);
            }
            let Some(schema) = schemas.get(&key) else {
                continue;
            };

            let in_scope = if query.deep {
                schema.is_a(&target.name)
            } else {
                schema.name.eq_ignore_ascii_case(&target.name)
            };
            if !in_scope || !matches_all(&conditions, &target, &stored.values)? {
                continue;
            }

            out.push(MemoryRecord::new(
                &self.shared,
                schema.clone(),
                stored.values.clone(),
                Some(stored.path.clone()),
            ));
        }

        Ok(out)
    }

    fn open(&self, path: &str) -> Result<RecordRef, StoreError> {
        self.shared.ensure_online()?;

        let state = self.shared.read();
        let stored = state
            .stored(path)
            .ok_or_else(|| StoreError::not_found(format!("no instance at '{path}'")))?;
        let schema = state
            .flatten(&stored.namespace, &stored.class)
            .ok_or_else(|| StoreError::not_found(format!("class of '{path}' is not defined")))?;

        Ok(MemoryRecord::new(
            &self.shared,
            schema,
            stored.values.clone(),
            Some(stored.path.clone()),
        ))
    }
}

impl Shared {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().expect("memory store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().expect("memory store lock poisoned")
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!(
                "server '{}' is not reachable",
                self.server
            )));
        }

        Ok(())
    }
}

impl State {
    ///
    /// flatten
    ///
    /// Resolve a class with everything it inherits. Members are ordered
    /// root first; a redeclared member replaces the inherited one.
    ///
    fn flatten(&self, namespace: &str, name: &str) -> Option<ClassSchema> {
        let mut chain: Vec<&ClassSchema> = Vec::new();
        let mut next = Some(name);
        while let Some(class) = next {
            let schema = self
                .classes
                .iter()
                .find(|c| same_class(c, namespace, class))?;
            if chain.iter().any(|c| c.name.eq_ignore_ascii_case(&schema.name)) {
                break;
            }
            chain.push(schema);
            next = schema.parent.as_deref();
        }

        let own = chain.first()?;
        let mut flat = ClassSchema {
            namespace: own.namespace.clone(),
            name: own.name.clone(),
            parent: own.parent.clone(),
            derivation: chain.iter().skip(1).map(|c| c.name.clone()).collect(),
            properties: Vec::new(),
            methods: Vec::new(),
        };
        for class in chain.iter().rev() {
            for prop in &class.properties {
                flat.properties
                    .retain(|p| !p.name.eq_ignore_ascii_case(&prop.name));
                flat.properties.push(prop.clone());
            }
            for method in &class.methods {
                flat.methods.retain(|m| !m.name.eq_ignore_ascii_case(&method.name));
                flat.methods.push(method.clone());
            }
        }

        Some(flat)
    }

    fn stored(&self, path: &str) -> Option<&Stored> {
        self.records.iter().find(|r| r.path.eq_ignore_ascii_case(path))
    }

    fn handler(&self, schema: &ClassSchema, method: &str) -> Option<MethodHandler> {
        std::iter::once(&schema.name)
            .chain(&schema.derivation)
            .find_map(|class| {
                self.handlers
                    .iter()
                    .find(|(c, m, _)| c.eq_ignore_ascii_case(class) && m.eq_ignore_ascii_case(method))
                    .map(|(_, _, h)| h.clone())
            })
    }
}

fn same_class(schema: &ClassSchema, namespace: &str, name: &str) -> bool {
    schema.namespace.eq_ignore_ascii_case(namespace) && schema.name.eq_ignore_ascii_case(name)
}

///
/// MemoryRecord
///

struct MemoryRecord {
    shared: Arc<Shared>,
    schema: ClassSchema,
    local: RwLock<Local>,
}

struct Local {
    values: PropertySet,
    path: Option<String>,
}

impl MemoryRecord {
    fn new(
        shared: &Arc<Shared>,
        schema: ClassSchema,
        values: PropertySet,
        path: Option<String>,
    ) -> RecordRef {
        Arc::new(Self {
            shared: Arc::clone(shared),
            schema,
            local: RwLock::new(Local { values, path }),
        })
    }

    fn local(&self) -> std::sync::RwLockReadGuard<'_, Local> {
        self.local.read().expect("memory record lock poisoned")
    }

    fn local_mut(&self) -> std::sync::RwLockWriteGuard<'_, Local> {
        self.local.write().expect("memory record lock poisoned")
    }

    fn system_property(&self, name: &str) -> Option<WireValue> {
        let text = |s: &str| WireValue::String(s.to_string());
        let schema = &self.schema;

        let value = match name.to_ascii_uppercase().as_str() {
            system::CLASS => text(&schema.name),
            system::SUPERCLASS => schema.derivation.first().map_or(WireValue::Null, |s| text(s)),
            system::DYNASTY => text(schema.dynasty()),
            system::DERIVATION => {
                WireValue::Array(schema.derivation.iter().map(|s| text(s)).collect())
            }
            system::PATH => self.local().path.as_deref().map_or(WireValue::Null, text),
            system::RELPATH => self
                .local()
                .path
                .as_deref()
                .and_then(|p| p.rsplit_once(':'))
                .map_or(WireValue::Null, |(_, rel)| text(rel)),
            system::NAMESPACE => text(&schema.namespace),
            system::SERVER => text(&self.shared.server),
            system::GENUS => WireValue::Sint32(system::GENUS_INSTANCE),
            system::PROPERTY_COUNT => {
                WireValue::Sint32(i32::try_from(schema.properties.len()).unwrap_or(i32::MAX))
            }
            _ => return None,
        };

        Some(value)
    }

    // Path from key values: `\\SERVER\NAMESPACE:Class.Key="v",Other=1`.
    fn key_path(&self, values: &PropertySet) -> Result<String, StoreError> {
        let schema = &self.schema;
        let mut path = format!(
            "\\\\{}\\{}:{}",
            self.shared.server, schema.namespace, schema.name
        );

        let mut keys = schema.keys().peekable();
        if keys.peek().is_none() {
            path.push_str("=@");
            return Ok(path);
        }

        for (i, key) in keys.enumerate() {
            let value = values.get(&key.name).filter(|v| !v.is_null()).ok_or_else(|| {
                StoreError::rejected(format!(
                    "key property '{}' of '{}' is not set",
                    key.name, schema.name
                ))
            })?;
            path.push(if i == 0 { '.' } else { ',' });
            let _ = write!(path, "{}={}", key.name, literal(value));
        }

        Ok(path)
    }
}

fn literal(value: &WireValue) -> String {
    match value {
        WireValue::Boolean(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        WireValue::Char16(c) => format!("\"{c}\""),
        other => match (other.as_i128(), other.as_text()) {
            (Some(v), _) => v.to_string(),
            (_, Some(s)) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            _ => format!("{other:?}"),
        },
    }
}

impl Record for MemoryRecord {
    fn get(&self, name: &str) -> Result<Option<WireValue>, StoreError> {
        self.shared.ensure_online()?;

        if system::is_system(name) {
            return Ok(self.system_property(name));
        }
        let Some(prop) = self.schema.property(name) else {
            return Ok(None);
        };

        Ok(Some(
            self.local()
                .values
                .get(&prop.name)
                .cloned()
                .unwrap_or(WireValue::Null),
        ))
    }

    fn set(&self, name: &str, value: WireValue) -> Result<(), StoreError> {
        self.shared.ensure_online()?;

        if system::is_system(name) {
            return Err(StoreError::rejected(format!(
                "system property '{name}' is read-only"
            )));
        }
        let prop = self.schema.property(name).ok_or_else(|| {
            StoreError::not_found(format!(
                "'{}' has no property '{name}'",
                self.schema.name
            ))
        })?;

        let shape_ok = match &value {
            WireValue::Null => true,
            WireValue::Array(_) => prop.array,
            _ => !prop.array,
        };
        if !shape_ok {
            return Err(StoreError::rejected(format!(
                "'{}'.'{}' expects {}{}",
                self.schema.name,
                prop.name,
                prop.wire,
                if prop.array { "[]" } else { "" }
            )));
        }
        let value = value
            .coerce(prop.wire, false)
            .map_err(|err| StoreError::rejected(format!("'{}'.'{}': {err}", self.schema.name, prop.name)))?;

        self.local_mut().values.insert(prop.name.clone(), value);

        Ok(())
    }

    fn invoke(&self, method: &str, inputs: PropertySet) -> Result<PropertySet, StoreError> {
        self.shared.ensure_online()?;

        let signature = self.schema.method(method).ok_or_else(|| {
            StoreError::not_found(format!(
                "method '{method}' is not implemented on '{}'",
                self.schema.name
            ))
        })?;

        let mut checked = PropertySet::new();
        for (name, value) in inputs.iter() {
            let param = signature.find_input(name).ok_or_else(|| {
                StoreError::rejected(format!(
                    "'{}'.'{}' has no parameter '{name}'",
                    self.schema.name, signature.name
                ))
            })?;
            let value = value.clone().coerce(param.wire, false).map_err(|err| {
                StoreError::rejected(format!(
                    "'{}'.'{}' parameter '{name}': {err}",
                    self.schema.name, signature.name
                ))
            })?;
            checked.insert(param.name.clone(), value);
        }

        let handler = self.shared.read().handler(&self.schema, &signature.name);
        let mut local = self.local_mut();
        let outputs = match handler {
            Some(handler) => handler(&mut local.values, &checked)?,
            None => PropertySet::new().with(RETURN_VALUE, WireValue::Uint32(0)),
        };

        // method bodies run server-side, so their effects are committed
        if let Some(path) = local.path.clone() {
            let mut state = self.shared.write();
            if let Some(stored) = state
                .records
                .iter_mut()
                .find(|r| r.path.eq_ignore_ascii_case(&path))
            {
                stored.values = local.values.clone();
            }
        }

        Ok(outputs)
    }

    fn reload(&self) -> Result<(), StoreError> {
        self.shared.ensure_online()?;

        let mut local = self.local_mut();
        let path = local
            .path
            .clone()
            .ok_or_else(|| StoreError::not_found("instance has not been committed"))?;
        let state = self.shared.read();
        let stored = state
            .stored(&path)
            .ok_or_else(|| StoreError::not_found(format!("no instance at '{path}'")))?;
        local.values = stored.values.clone();

        Ok(())
    }

    fn put(&self) -> Result<String, StoreError> {
        self.shared.ensure_online()?;

        let mut local = self.local_mut();
        let path = self.key_path(&local.values)?;

        let mut state = self.shared.write();
        let stored = Stored {
            path: path.clone(),
            namespace: self.schema.namespace.clone(),
            class: self.schema.name.clone(),
            values: local.values.clone(),
        };
        match state
            .records
            .iter_mut()
            .find(|r| r.path.eq_ignore_ascii_case(&path))
        {
            Some(existing) => *existing = stored,
            None => state.records.push(stored),
        }
        local.path = Some(path.clone());

        Ok(path)
    }

    fn related(&self, class: &str) -> Result<Vec<RecordRef>, StoreError> {
        self.shared.ensure_online()?;

        let Some(path) = self.local().path.clone() else {
            return Ok(Vec::new());
        };
        let state = self.shared.read();

        let mut seen: Vec<&str> = Vec::new();
        let mut out: Vec<RecordRef> = Vec::new();
        for (left, right) in &state.associations {
            let other = if left.eq_ignore_ascii_case(&path) {
                right
            } else if right.eq_ignore_ascii_case(&path) {
                left
            } else {
                continue;
            };
            if seen.iter().any(|s| s.eq_ignore_ascii_case(other)) {
                continue;
            }
            let Some(stored) = state.stored(other) else {
                continue;
            };
            let Some(schema) = state.flatten(&stored.namespace, &stored.class) else {
                continue;
            };
            if !schema.is_a(class) {
                continue;
            }

            seen.push(other);
            out.push(MemoryRecord::new(
                &self.shared,
                schema,
                stored.values.clone(),
                Some(stored.path.clone()),
            ));
        }

        Ok(out)
    }
}

///
/// Filter language
///
/// `Name = literal [AND Name = literal ...]`. Literals are quoted strings,
/// integers, or TRUE/FALSE. Text compares case-insensitively.
///

#[derive(Debug, PartialEq)]
enum Literal {
    Text(String),
    Int(i128),
    Bool(bool),
}

#[derive(Debug, PartialEq)]
struct Condition {
    name: String,
    literal: Literal,
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Eq,
}

fn tokenize(text: &str) -> Result<Vec<Token>, StoreError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '\'' | '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => s.extend(chars.next()),
                        Some(q) if q == c => break,
                        Some(other) => s.push(other),
                        None => {
                            return Err(StoreError::invalid_query(format!(
                                "unterminated string in '{text}'"
                            )));
                        }
                    }
                }
                tokens.push(Token::Quoted(s));
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '=' || c == '\'' || c == '"' {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(s));
            }
        }
    }

    Ok(tokens)
}

fn parse_filter(text: &str) -> Result<Vec<Condition>, StoreError> {
    let bad = || StoreError::invalid_query(format!("cannot parse filter '{text}'"));
    let mut tokens = tokenize(text)?.into_iter();
    let mut out = Vec::new();

    loop {
        let Some(Token::Word(name)) = tokens.next() else {
            return Err(bad());
        };
        if tokens.next() != Some(Token::Eq) {
            return Err(bad());
        }
        let literal = match tokens.next() {
            Some(Token::Quoted(s)) => Literal::Text(s),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("TRUE") => Literal::Bool(true),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("FALSE") => Literal::Bool(false),
            Some(Token::Word(w)) => Literal::Int(w.parse().map_err(|_| bad())?),
            _ => return Err(bad()),
        };
        out.push(Condition { name, literal });

        match tokens.next() {
            None => break,
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("AND") => {}
            Some(_) => return Err(bad()),
        }
    }

    Ok(out)
}

fn matches_all(
    conditions: &[Condition],
    target: &ClassSchema,
    values: &PropertySet,
) -> Result<bool, StoreError> {
    for condition in conditions {
        if target.property(&condition.name).is_none() {
            return Err(StoreError::invalid_query(format!(
                "'{}' has no property '{}'",
                target.name, condition.name
            )));
        }

        let hit = match (values.get(&condition.name), &condition.literal) {
            (None | Some(WireValue::Null), _) => false,
            (Some(WireValue::Boolean(v)), Literal::Bool(b)) => v == b,
            (Some(v), Literal::Int(i)) => v.as_i128() == Some(*i),
            (Some(WireValue::Char16(c)), Literal::Text(s)) => {
                s.chars().eq(std::iter::once(*c))
            }
            (Some(v), Literal::Text(s)) => v.as_text().is_some_and(|t| t.eq_ignore_ascii_case(s)),
            _ => false,
        };
        if !hit {
            return Ok(false);
        }
    }

    Ok(true)
}

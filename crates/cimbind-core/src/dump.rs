//! Debug dump of proxy graphs.
//!
//! Walks every declared property of a proxy, following references into
//! nested proxies. A record already on the dump is not expanded again;
//! identity is the record path, or the handle itself for uncommitted
//! instances. Member faults are printed inline instead of aborting.
use crate::{proxy::Proxy, value::Value};
use std::{collections::HashSet, fmt::Write as _, sync::Arc};

const INDENT: usize = 4;

/// Render `proxy` and everything reachable from it.
#[must_use]
pub fn dump(proxy: &Proxy) -> String {
    let mut dumper = Dumper::default();
    dumper.header(proxy);
    dumper.members(proxy, 1);

    dumper.out
}

#[derive(Eq, Hash, PartialEq)]
enum Identity {
    Path(String),
    Handle(usize),
}

impl Identity {
    fn of(proxy: &Proxy) -> Self {
        match proxy.path() {
            Ok(Some(path)) => Self::Path(path.to_ascii_lowercase()),
            _ => Self::Handle(Arc::as_ptr(proxy.record()).cast::<()>().addr()),
        }
    }
}

#[derive(Default)]
struct Dumper {
    out: String,
    visited: HashSet<Identity>,
}

impl Dumper {
    fn header(&mut self, proxy: &Proxy) {
        self.visited.insert(Identity::of(proxy));

        let name = proxy.model().path.rsplit("::").next().unwrap_or_default();
        let _ = write!(self.out, "{{{name}}}");
        match proxy.path() {
            Ok(Some(path)) => {
                let _ = writeln!(self.out, " {path}");
            }
            _ => self.out.push_str(" (uncommitted)\n"),
        }
    }

    fn members(&mut self, proxy: &Proxy, level: usize) {
        for prop in proxy.binding().properties() {
            self.indent(level);
            let _ = write!(self.out, "{}: ", prop.model.name);

            match proxy.value(prop.model.name) {
                Ok(value) => self.value(&value, level),
                Err(err) => {
                    let _ = writeln!(self.out, "<{}: {}>", err.kind, err.message);
                }
            }
        }
    }

    fn value(&mut self, value: &Value, level: usize) {
        match value {
            Value::Entity(proxy) => {
                if self.visited.contains(&Identity::of(proxy)) {
                    self.out.push_str("<-- bidirectional reference found\n");
                } else {
                    self.header(proxy);
                    self.members(proxy, level + 1);
                }
            }
            Value::List(items) if items.iter().any(|v| matches!(v, Value::Entity(_))) => {
                self.out.push('\n');
                for (i, item) in items.iter().enumerate() {
                    self.indent(level + 1);
                    let _ = write!(self.out, "[{i}]: ");
                    self.value(item, level + 1);
                }
            }
            scalar => {
                let _ = writeln!(self.out, "{}", scalar_text(scalar));
            }
        }
    }

    fn indent(&mut self, level: usize) {
        self.out.extend(std::iter::repeat_n(' ', level * INDENT));
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Uint(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Char(c) => format!("'{}'", c.escape_default()),
        Value::Text(s) => format!("{s:?}"),
        Value::Timestamp(ts) => ts.to_rfc3339(),
        Value::Entity(proxy) => proxy.model().path.to_string(),
        Value::List(items) => {
            let items: Vec<_> = items.iter().map(scalar_text).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

//! Native configuration syntax rendering.

use std::collections::BTreeMap;

use crate::address::{is_identifier, quoted};
use crate::synthesis::{Block, Body, Expression, ObjectKey, Structure};
use crate::value::Value;

const INDENT: &str = "  ";

/// Renders one block, including its trailing newline.
///
/// # Examples
///
/// ```
/// use graft::output::render_block;
/// use graft::synthesis::{Block, Expression};
/// use graft::Value;
///
/// let mut block = Block::new("resource", vec!["random_pet".into(), "name".into()]);
/// block.body.set_attribute("length", Expression::Literal(Value::int(2)));
/// block.body.set_attribute("prefix", Expression::Literal(Value::from("dev")));
///
/// assert_eq!(
///     render_block(&block),
///     "resource \"random_pet\" \"name\" {\n  length = 2\n  prefix = \"dev\"\n}\n"
/// );
/// ```
#[must_use]
pub fn render_block(block: &Block) -> String {
    let mut writer = HclWriter::default();
    writer.block(block, 0);
    writer.out
}

/// Renders the items of a body at the top level.
#[must_use]
pub fn render_body(body: &Body) -> String {
    let mut writer = HclWriter::default();
    writer.body(body, 0);
    writer.out
}

#[derive(Default)]
struct HclWriter {
    out: String,
}

impl HclWriter {
    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
    }

    fn body(&mut self, body: &Body, level: usize) {
        let widths = attribute_widths(&body.items);
        for (i, item) in body.items.iter().enumerate() {
            match item {
                Structure::Attribute(attr) => {
                    self.indent(level);
                    self.out.push_str(&attr.name);
                    self.pad(widths[i].saturating_sub(attr.name.chars().count()));
                    self.out.push_str(" = ");
                    self.expression(&attr.expr, level);
                    self.out.push('\n');
                }
                Structure::Block(block) => {
                    if i > 0 && body.items[i - 1] != Structure::Blank {
                        self.out.push('\n');
                    }
                    self.block(block, level);
                }
                Structure::Comment(text) => {
                    self.indent(level);
                    self.out.push('#');
                    if !text.is_empty() {
                        self.out.push(' ');
                        self.out.push_str(text);
                    }
                    self.out.push('\n');
                }
                Structure::Blank => self.out.push('\n'),
            }
        }
    }

    fn block(&mut self, block: &Block, level: usize) {
        self.indent(level);
        self.out.push_str(&block.block_type);
        for label in &block.labels {
            self.out.push(' ');
            self.string(label);
        }
        if block.body.is_empty() {
            self.out.push_str(" {}\n");
            return;
        }
        self.out.push_str(" {\n");
        self.body(&block.body, level + 1);
        self.indent(level);
        self.out.push_str("}\n");
    }

    fn expression(&mut self, expr: &Expression, level: usize) {
        match expr {
            Expression::Literal(value) => self.value(value, level),
            Expression::Traversal(parts) => self.out.push_str(&parts.join(".")),
            Expression::Index { collection, key } => {
                match collection.as_ref() {
                    Expression::Tuple(items) if !items.is_empty() => self.table(items, level),
                    other => self.expression(other, level),
                }
                self.out.push('[');
                self.expression(key, level);
                self.out.push(']');
            }
            Expression::Tuple(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expression(item, level);
                }
                self.out.push(']');
            }
            Expression::Object(entries) => {
                let entries: Vec<(String, &Expression)> = entries
                    .iter()
                    .map(|(key, value)| {
                        let key = match key {
                            ObjectKey::Identifier(name) => name.clone(),
                            ObjectKey::String(text) => quoted(text),
                        };
                        (key, value)
                    })
                    .collect();
                self.object(&entries, level, |w, expr, level| w.expression(expr, level));
            }
            Expression::FunctionCall { name, args } => {
                self.out.push_str(name);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expression(arg, level);
                }
                self.out.push(')');
            }
        }
    }

    /// A tuple written one element per line, as used for lookup tables.
    fn table(&mut self, items: &[Expression], level: usize) {
        self.out.push_str("[\n");
        for item in items {
            self.indent(level + 1);
            self.expression(item, level + 1);
            self.out.push_str(",\n");
        }
        self.indent(level);
        self.out.push(']');
    }

    fn object<T>(&mut self, entries: &[(String, T)], level: usize, write: impl Fn(&mut Self, &T, usize)) {
        if entries.is_empty() {
            self.out.push_str("{}");
            return;
        }
        let width = entries.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);
        self.out.push_str("{\n");
        for (key, value) in entries {
            self.indent(level + 1);
            self.out.push_str(key);
            self.pad(width - key.chars().count());
            self.out.push_str(" = ");
            write(self, value, level + 1);
            self.out.push('\n');
        }
        self.indent(level);
        self.out.push('}');
    }

    fn value(&mut self, value: &Value, level: usize) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.out.push_str(&n.to_string()),
            Value::String(s) => self.string(s),
            Value::List(items) | Value::Set(items) | Value::Tuple(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.value(item, level);
                }
                self.out.push(']');
            }
            Value::Map(entries) | Value::Object(entries) => {
                let entries = object_keys(entries);
                self.object(&entries, level, |w, value, level| w.value(value, level));
            }
        }
    }

    fn string(&mut self, s: &str) {
        self.out.push_str(&quoted(s));
    }

    fn pad(&mut self, n: usize) {
        for _ in 0..n {
            self.out.push(' ');
        }
    }
}

/// For each attribute item, the name width of the run of consecutive
/// attributes it belongs to. Other items get zero.
fn attribute_widths(items: &[Structure]) -> Vec<usize> {
    let mut widths = vec![0; items.len()];
    let mut start = 0;
    while start < items.len() {
        let end = items[start..]
            .iter()
            .position(|item| !matches!(item, Structure::Attribute(_)))
            .map_or(items.len(), |offset| start + offset);
        let width = items[start..end]
            .iter()
            .filter_map(|item| match item {
                Structure::Attribute(attr) => Some(attr.name.chars().count()),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        for w in &mut widths[start..end] {
            *w = width;
        }
        start = end + 1;
    }
    widths
}

fn object_keys(entries: &BTreeMap<String, Value>) -> Vec<(String, &Value)> {
    entries
        .iter()
        .map(|(key, value)| {
            let key = if is_identifier(key) { key.clone() } else { quoted(key) };
            (key, value)
        })
        .collect()
}

//! Structured configuration documents.
//!
//! Synthesis builds a tree of attributes, blocks and comments instead of
//! text. [`crate::output::hcl`] renders the tree to native syntax, and
//! [`Expression::evaluate`] interprets the small expression language the
//! synthesizer emits, which is how lookup tables are checked against the
//! instance data they came from.

use std::collections::BTreeMap;

use crate::address::InstanceKey;
use crate::value::Value;

/// Body of a generated configuration block.
pub type ConfigBlockBody = Body;

/// An ordered sequence of body items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    /// The items, in output order.
    pub items: Vec<Structure>,
}

/// One item of a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Structure {
    /// `name = expression`
    Attribute(Attribute),
    /// A nested block.
    Block(Block),
    /// A line comment (without the leading `#`).
    Comment(String),
    /// An empty line.
    Blank,
}

/// An attribute assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Assigned expression.
    pub expr: Expression,
}

/// A block with a type, labels and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block type, such as `resource` or `ebs_block_device`.
    pub block_type: String,
    /// Block labels.
    pub labels: Vec<String>,
    /// Block contents.
    pub body: Body,
}

impl Block {
    /// Creates an empty block.
    #[must_use]
    pub fn new(block_type: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            block_type: block_type.into(),
            labels,
            body: Body::default(),
        }
    }
}

impl Body {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the body has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an attribute assignment.
    pub fn set_attribute(&mut self, name: impl Into<String>, expr: Expression) {
        self.items.push(Structure::Attribute(Attribute {
            name: name.into(),
            expr,
        }));
    }

    /// Appends a nested block.
    pub fn append_block(&mut self, block: Block) {
        self.items.push(Structure::Block(block));
    }

    /// Appends a comment line.
    pub fn append_comment(&mut self, text: impl Into<String>) {
        self.items.push(Structure::Comment(text.into()));
    }

    /// Appends an empty line.
    pub fn append_blank(&mut self) {
        self.items.push(Structure::Blank);
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Expression> {
        self.items.iter().find_map(|item| match item {
            Structure::Attribute(attr) if attr.name == name => Some(&attr.expr),
            _ => None,
        })
    }

    /// Names of all attributes, in order.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Structure::Attribute(attr) => Some(attr.name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Nested blocks of one type, in order.
    #[must_use]
    pub fn blocks(&self, block_type: &str) -> Vec<&Block> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Structure::Block(block) if block.block_type == block_type => Some(block),
                _ => None,
            })
            .collect()
    }

    /// All comment lines, in order.
    #[must_use]
    pub fn comments(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Structure::Comment(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Key of an object constructor entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    /// A bare identifier key.
    Identifier(String),
    /// A quoted string key.
    String(String),
}

impl ObjectKey {
    /// The key's text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Identifier(s) | Self::String(s) => s,
        }
    }
}

/// The expressions synthesis can emit.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant value.
    Literal(Value),
    /// A variable traversal such as `count.index`.
    Traversal(Vec<String>),
    /// `collection[key]`
    Index {
        /// The collection being indexed.
        collection: Box<Expression>,
        /// The index or key.
        key: Box<Expression>,
    },
    /// `[a, b, c]`
    Tuple(Vec<Expression>),
    /// `{ k = v, ... }`
    Object(Vec<(ObjectKey, Expression)>),
    /// `name(args...)`
    FunctionCall {
        /// Function name.
        name: String,
        /// Arguments.
        args: Vec<Expression>,
    },
}

impl Expression {
    /// A traversal from dotted parts.
    #[must_use]
    pub fn traversal(parts: &[&str]) -> Self {
        Self::Traversal(parts.iter().map(ToString::to_string).collect())
    }

    /// Evaluates the expression as the instance with `key` would.
    ///
    /// `count.index` resolves for integer keys and `each.key` for string
    /// keys. Returns `None` when the expression refers to something that is
    /// not available for that key or indexes out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use graft::synthesis::Expression;
    /// use graft::{InstanceKey, Value};
    ///
    /// let table = Expression::Index {
    ///     collection: Box::new(Expression::Tuple(vec![
    ///         Expression::Literal(Value::from("foo")),
    ///         Expression::Literal(Value::from("bar")),
    ///     ])),
    ///     key: Box::new(Expression::traversal(&["count", "index"])),
    /// };
    /// assert_eq!(table.evaluate(&InstanceKey::Int(1)), Some(Value::from("bar")));
    /// assert_eq!(table.evaluate(&InstanceKey::String("a".into())), None);
    /// ```
    #[must_use]
    pub fn evaluate(&self, key: &InstanceKey) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Traversal(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                match (parts.as_slice(), key) {
                    (["count", "index"], InstanceKey::Int(i)) => Some(Value::int(*i)),
                    (["each", "key"], InstanceKey::String(s)) => Some(Value::String(s.clone())),
                    _ => None,
                }
            }
            Self::Index { collection, key: index } => {
                let collection = collection.evaluate(key)?;
                match (collection, index.evaluate(key)?) {
                    (Value::List(items) | Value::Tuple(items), Value::Number(n)) => {
                        let i = usize::try_from(n.as_u64()?).ok()?;
                        items.into_iter().nth(i)
                    }
                    (Value::Map(mut entries) | Value::Object(mut entries), Value::String(k)) => {
                        entries.remove(&k)
                    }
                    _ => None,
                }
            }
            Self::Tuple(items) => items
                .iter()
                .map(|item| item.evaluate(key))
                .collect::<Option<Vec<_>>>()
                .map(Value::Tuple),
            Self::Object(entries) => entries
                .iter()
                .map(|(k, v)| Some((k.as_str().to_string(), v.evaluate(key)?)))
                .collect::<Option<BTreeMap<_, _>>>()
                .map(Value::Object),
            Self::FunctionCall { name, args } => match (name.as_str(), args.as_slice()) {
                ("toset", [arg]) => {
                    let mut items = arg.evaluate(key)?.elements()?.to_vec();
                    items.sort_by_key(|v| v.to_json().to_string());
                    items.dedup();
                    Some(Value::Set(items))
                }
                _ => None,
            },
        }
    }
}

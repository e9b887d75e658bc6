//! Provider schema model.
//!
//! Schemas describe what a resource type's configuration and recorded state
//! look like: attributes with a value type and writability, and nested
//! block types with a nesting mode. They deserialize directly from the
//! provider schema JSON document (see [`catalog`]).

pub mod catalog;
pub mod implied;

#[cfg(test)]
mod proptests;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

pub use catalog::{ProviderSchemaCatalog, SchemaSource};
pub use implied::{implied_type, DecodeError};

/// Schema of one resource type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceSchema {
    /// Version of the schema; recorded state carries the version it was written under.
    #[serde(default)]
    pub version: u64,
    /// The resource's top-level block.
    pub block: BlockSchema,
}

impl ResourceSchema {
    /// Creates a resource schema.
    #[must_use]
    pub const fn new(version: u64, block: BlockSchema) -> Self {
        Self { version, block }
    }
}

/// Attributes and nested block types of one block.
///
/// # Examples
///
/// ```
/// use graft::schema::{BlockSchema, NestingMode, ValueType, Writability};
///
/// let block = BlockSchema::new()
///     .attribute("ami", ValueType::String, Writability::Required)
///     .attribute("arn", ValueType::String, Writability::ComputedOnly)
///     .nested(
///         "root_block_device",
///         NestingMode::List,
///         BlockSchema::new().attribute("volume_size", ValueType::Number, Writability::Optional),
///     );
/// assert_eq!(block.attributes.len(), 2);
/// assert!(block.attributes["ami"].is_writable());
/// assert!(!block.attributes["arn"].is_writable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlockSchema {
    /// Attributes by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSchema>,
    /// Nested block types by type name.
    #[serde(default, rename = "block_types")]
    pub nested_blocks: BTreeMap<String, NestedBlockSchema>,
}

impl BlockSchema {
    /// Creates an empty block schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        value_type: ValueType,
        writability: Writability,
    ) -> Self {
        self.attributes.insert(
            name.into(),
            AttributeSchema {
                value_type,
                writability,
            },
        );
        self
    }

    /// Adds a nested block type.
    #[must_use]
    pub fn nested(mut self, type_name: impl Into<String>, nesting: NestingMode, block: Self) -> Self {
        self.nested_blocks
            .insert(type_name.into(), NestedBlockSchema { block, nesting });
        self
    }
}

/// Whether an attribute may be written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writability {
    /// Must be set in configuration.
    Required,
    /// May be set in configuration.
    Optional,
    /// Only ever set by the provider.
    ComputedOnly,
}

/// Schema of one attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAttribute")]
pub struct AttributeSchema {
    /// The attribute's value type.
    pub value_type: ValueType,
    /// Whether the attribute can be written.
    pub writability: Writability,
}

impl AttributeSchema {
    /// Whether the attribute may appear in generated configuration.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(self.writability, Writability::Required | Writability::Optional)
    }
}

#[derive(Deserialize)]
struct RawAttribute {
    #[serde(rename = "type", default)]
    value_type: Option<ValueType>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    optional: bool,
}

impl From<RawAttribute> for AttributeSchema {
    fn from(raw: RawAttribute) -> Self {
        let writability = if raw.required {
            Writability::Required
        } else if raw.optional {
            Writability::Optional
        } else {
            Writability::ComputedOnly
        };
        Self {
            // Attributes described by a nested type carry no `type`.
            value_type: raw.value_type.unwrap_or(ValueType::Dynamic),
            writability,
        }
    }
}

/// Schema of one nested block type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedBlockSchema {
    /// The nested block's own schema.
    pub block: BlockSchema,
    /// How the block repeats.
    #[serde(rename = "nesting_mode")]
    pub nesting: NestingMode,
}

/// How a nested block type repeats within its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestingMode {
    /// At most one block.
    Single,
    /// An ordered sequence of blocks.
    List,
    /// An unordered collection of distinct blocks.
    Set,
    /// Blocks keyed by a single label.
    Map,
    /// A mode this library does not know how to represent.
    Unsupported(String),
}

impl From<&str> for NestingMode {
    fn from(s: &str) -> Self {
        match s {
            "single" => Self::Single,
            "list" => Self::List,
            "set" => Self::Set,
            "map" => Self::Map,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for NestingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

impl fmt::Display for NestingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::List => write!(f, "list"),
            Self::Set => write!(f, "set"),
            Self::Map => write!(f, "map"),
            Self::Unsupported(mode) => write!(f, "{mode}"),
        }
    }
}

/// Shape of a value.
///
/// Deserializes from the JSON type notation used in provider schemas:
/// `"string"`, `["list", "number"]`, `["object", {"a": "bool"}]` and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// A string.
    String,
    /// A number.
    Number,
    /// A boolean.
    Bool,
    /// Any value; the shape is taken from the data.
    Dynamic,
    /// A list of one element type.
    List(Box<ValueType>),
    /// A set of one element type.
    Set(Box<ValueType>),
    /// A map of one element type.
    Map(Box<ValueType>),
    /// An object with typed attributes.
    Object(BTreeMap<String, ValueType>),
    /// A tuple of positionally typed elements.
    Tuple(Vec<ValueType>),
}

impl ValueType {
    /// Parses the JSON type notation.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the notation is malformed.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, String> {
        use serde_json::Value as Json;

        match json {
            Json::String(name) => match name.as_str() {
                "string" => Ok(Self::String),
                "number" => Ok(Self::Number),
                "bool" => Ok(Self::Bool),
                "dynamic" => Ok(Self::Dynamic),
                other => Err(format!("unknown primitive type {other:?}")),
            },
            Json::Array(parts) => match parts.as_slice() {
                [Json::String(kind), inner] => match kind.as_str() {
                    "list" => Ok(Self::List(Box::new(Self::from_json(inner)?))),
                    "set" => Ok(Self::Set(Box::new(Self::from_json(inner)?))),
                    "map" => Ok(Self::Map(Box::new(Self::from_json(inner)?))),
                    "object" => {
                        let Json::Object(attrs) = inner else {
                            return Err("object type requires a map of attribute types".into());
                        };
                        attrs
                            .iter()
                            .map(|(name, ty)| Ok((name.clone(), Self::from_json(ty)?)))
                            .collect::<Result<_, String>>()
                            .map(Self::Object)
                    }
                    "tuple" => {
                        let Json::Array(elems) = inner else {
                            return Err("tuple type requires a list of element types".into());
                        };
                        elems
                            .iter()
                            .map(Self::from_json)
                            .collect::<Result<_, String>>()
                            .map(Self::Tuple)
                    }
                    other => Err(format!("unknown collection type {other:?}")),
                },
                // Object types may carry a third element listing optional attributes.
                [Json::String(kind), inner, Json::Array(_)] if kind == "object" => {
                    Self::from_json(&Json::Array(vec![Json::String(kind.clone()), inner.clone()]))
                }
                _ => Err(format!("malformed type expression {json}")),
            },
            _ => Err(format!("malformed type expression {json}")),
        }
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&json).map_err(D::Error::custom)
    }
}

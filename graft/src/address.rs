//! Resource and instance addressing.
//!
//! A [`ResourceAddress`] identifies a managed or data resource independent
//! of repetition, and an [`InstanceAddress`] pins down one concrete
//! occurrence of it through an [`InstanceKey`]. The derived orderings are
//! the ones plans are sorted by: mode, then type, then name, then key.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Whether a resource is managed or only read.
///
/// Modes order by their names, so data resources come before managed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceMode {
    /// A data resource that is only read.
    Data,
    /// A resource whose lifecycle is managed.
    Managed,
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Managed => write!(f, "managed"),
            Self::Data => write!(f, "data"),
        }
    }
}

impl ResourceMode {
    /// Parses the mode name used in state documents.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than `managed` or `data`.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "managed" => Ok(Self::Managed),
            "data" => Ok(Self::Data),
            other => Err(Error::InvalidAddress {
                input: other.to_string(),
                reason: "resource mode must be \"managed\" or \"data\"".to_string(),
            }),
        }
    }
}

/// Identity of a resource by mode, type and name.
///
/// # Examples
///
/// ```
/// use graft::{ResourceAddress, ResourceMode};
///
/// let addr: ResourceAddress = "aws_instance.web".parse().unwrap();
/// assert_eq!(addr.mode, ResourceMode::Managed);
/// assert_eq!(addr.to_string(), "aws_instance.web");
///
/// let data: ResourceAddress = "data.aws_ami.ubuntu".parse().unwrap();
/// assert_eq!(data.mode, ResourceMode::Data);
/// assert_eq!(data.to_string(), "data.aws_ami.ubuntu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceAddress {
    /// Managed or data.
    pub mode: ResourceMode,
    /// Resource type name, such as `aws_instance`.
    pub resource_type: String,
    /// Resource name local to its module.
    pub name: String,
}

impl ResourceAddress {
    /// Creates a managed resource address.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is not a valid identifier.
    pub fn managed(resource_type: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Self::new(ResourceMode::Managed, resource_type, name)
    }

    /// Creates a resource address with an explicit mode.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is not a valid identifier.
    pub fn new(
        mode: ResourceMode,
        resource_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let addr = Self {
            mode,
            resource_type: resource_type.into(),
            name: name.into(),
        };
        for part in [&addr.resource_type, &addr.name] {
            if !is_identifier(part) {
                return Err(Error::InvalidAddress {
                    input: addr.to_string(),
                    reason: format!("{part:?} is not a valid identifier"),
                });
            }
        }
        Ok(addr)
    }

    /// Returns the provider local name implied by the resource type.
    ///
    /// This is the type name up to its first underscore, so `aws_instance`
    /// implies `aws`. A type without an underscore implies itself.
    #[must_use]
    pub fn implied_provider(&self) -> &str {
        self.resource_type
            .split_once('_')
            .map_or(self.resource_type.as_str(), |(prefix, _)| prefix)
    }

    /// Returns the address of one instance of this resource.
    #[must_use]
    pub fn instance(&self, key: InstanceKey) -> InstanceAddress {
        InstanceAddress {
            resource: self.clone(),
            key,
        }
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == ResourceMode::Data {
            write!(f, "data.")?;
        }
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

impl FromStr for ResourceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        let invalid = |reason: &str| Error::InvalidAddress {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        match parts.as_slice() {
            ["data", ty, name] => Self::new(ResourceMode::Data, *ty, *name)
                .map_err(|_| invalid("type and name must be identifiers")),
            [ty, name] => Self::managed(*ty, *name)
                .map_err(|_| invalid("type and name must be identifiers")),
            _ => Err(invalid(
                "expected TYPE.NAME or data.TYPE.NAME (module paths and instance keys are not accepted)",
            )),
        }
    }
}

/// Distinguishes one repetition of a resource.
///
/// Keys order `None` first, then integers, then strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstanceKey {
    /// The resource is not repeated.
    None,
    /// Ordinal key of a `count` resource.
    Int(i64),
    /// Key of a `for_each` resource.
    String(String),
}

impl InstanceKey {
    /// A short name for the key's variant, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => "no key",
            Self::Int(_) => "integer key",
            Self::String(_) => "string key",
        }
    }

    /// Whether two keys use the same variant.
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int(i) => write!(f, "[{i}]"),
            Self::String(s) => write!(f, "[{}]", quoted(s)),
        }
    }
}

/// How a resource block repeats, derived from the shape of its instance keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RepeatMode {
    /// A single instance with no key.
    None,
    /// `count`, with integer keys.
    Count,
    /// `for_each`, with string keys.
    ForEach,
}

impl RepeatMode {
    /// The repeat mode an instance key implies.
    #[must_use]
    pub const fn of_key(key: &InstanceKey) -> Self {
        match key {
            InstanceKey::None => Self::None,
            InstanceKey::Int(_) => Self::Count,
            InstanceKey::String(_) => Self::ForEach,
        }
    }

    /// The kind of key instances of this mode carry.
    #[must_use]
    pub const fn key_kind(self) -> &'static str {
        match self {
            Self::None => "no key",
            Self::Count => "integer key",
            Self::ForEach => "string key",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Count => write!(f, "count"),
            Self::ForEach => write!(f, "for_each"),
        }
    }
}

/// One concrete occurrence of a resource.
///
/// # Examples
///
/// ```
/// use graft::{InstanceKey, ResourceAddress};
///
/// let web: ResourceAddress = "aws_instance.web".parse().unwrap();
/// assert_eq!(web.instance(InstanceKey::None).to_string(), "aws_instance.web");
/// assert_eq!(web.instance(InstanceKey::Int(2)).to_string(), "aws_instance.web[2]");
/// assert_eq!(
///     web.instance(InstanceKey::String("a".into())).to_string(),
///     "aws_instance.web[\"a\"]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceAddress {
    /// The resource this is an instance of.
    pub resource: ResourceAddress,
    /// The instance key.
    pub key: InstanceKey,
}

impl fmt::Display for InstanceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.resource, self.key)
    }
}

/// Whether `s` is a valid configuration identifier.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Quotes and escapes a string literal, including template sequences.
pub(crate) fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

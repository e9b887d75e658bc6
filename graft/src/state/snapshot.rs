//! State snapshots parsed from the JSON state document.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::{InstanceStateView, StateSource};
use crate::address::{InstanceAddress, InstanceKey, ResourceAddress, ResourceMode};
use crate::error::{Error, Result};
use crate::external::DocumentOrigin;

#[derive(Deserialize)]
struct StateDocument {
    values: Option<StateValues>,
}

#[derive(Deserialize)]
struct StateValues {
    root_module: Option<StateModule>,
}

#[derive(Deserialize)]
struct StateModule {
    #[serde(default)]
    resources: Vec<StateResource>,
}

#[derive(Deserialize)]
struct StateResource {
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    index: Option<serde_json::Value>,
    #[serde(default)]
    provider_name: String,
    #[serde(default)]
    schema_version: u64,
    #[serde(default)]
    values: serde_json::Value,
}

impl StateResource {
    fn into_view(self) -> Result<InstanceStateView> {
        let mode = ResourceMode::parse(&self.mode)?;
        let resource = ResourceAddress::new(mode, self.resource_type, self.name)?;
        let key = match self.index {
            None | Some(serde_json::Value::Null) => InstanceKey::None,
            Some(serde_json::Value::Number(n)) => {
                InstanceKey::Int(n.as_i64().ok_or_else(|| Error::InvalidState {
                    reason: format!("{resource} has non-integer index {n}"),
                })?)
            }
            Some(serde_json::Value::String(s)) => InstanceKey::String(s),
            Some(other) => {
                return Err(Error::InvalidState {
                    reason: format!("{resource} has invalid index {other}"),
                })
            }
        };
        Ok(InstanceStateView {
            address: resource.instance(key),
            provider: self.provider_name,
            schema_version: self.schema_version,
            values: self.values,
        })
    }
}

/// Tracked instances of the root module at one point in time.
///
/// A snapshot loaded from an origin re-reads it on [`StateSource::reload`];
/// one built in memory keeps its contents.
///
/// # Examples
///
/// ```
/// use graft::state::{StateSnapshot, StateSource};
///
/// let snapshot = StateSnapshot::from_json(r#"{
///     "format_version": "1.0",
///     "values": {"root_module": {"resources": [{
///         "address": "random_pet.name[0]",
///         "mode": "managed",
///         "type": "random_pet",
///         "name": "name",
///         "index": 0,
///         "provider_name": "registry.terraform.io/hashicorp/random",
///         "schema_version": 0,
///         "values": {"length": 2}
///     }]}}
/// }"#).unwrap();
///
/// let instances = snapshot.current_instances();
/// assert_eq!(instances.len(), 1);
/// assert_eq!(instances.iter().next().unwrap().to_string(), "random_pet.name[0]");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    origin: Option<DocumentOrigin>,
    instances: BTreeMap<InstanceAddress, InstanceStateView>,
}

impl StateSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON state document.
    ///
    /// A document without recorded values describes an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an instance has an
    /// invalid address or index.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: StateDocument = serde_json::from_str(json).map_err(|e| Error::InvalidState {
            reason: e.to_string(),
        })?;
        let resources = document
            .values
            .and_then(|v| v.root_module)
            .map(|m| m.resources)
            .unwrap_or_default();

        let mut snapshot = Self::new();
        for resource in resources {
            snapshot = snapshot.with_instance(resource.into_view()?);
        }
        Ok(snapshot)
    }

    /// Loads a snapshot from a file or command, remembering the origin for reloads.
    ///
    /// A state file that does not exist yet is an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin cannot be read or parsed.
    pub fn load(origin: DocumentOrigin) -> Result<Self> {
        let mut snapshot = Self::read(&origin)?;
        snapshot.origin = Some(origin);
        Ok(snapshot)
    }

    fn read(origin: &DocumentOrigin) -> Result<Self> {
        log::debug!("Reading state from {origin}");
        match origin.read()? {
            Some(json) if !json.trim().is_empty() => Self::from_json(&json),
            _ => Ok(Self::new()),
        }
    }

    /// Adds or replaces one instance.
    #[must_use]
    pub fn with_instance(mut self, view: InstanceStateView) -> Self {
        self.instances.insert(view.address.clone(), view);
        self
    }

    /// Number of tracked instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instances are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Addresses of every tracked managed resource.
    #[must_use]
    pub fn resources(&self) -> BTreeSet<ResourceAddress> {
        self.instances.keys().map(|a| a.resource.clone()).collect()
    }
}

impl StateSource for StateSnapshot {
    fn current_instances(&self) -> BTreeSet<InstanceAddress> {
        self.instances.keys().cloned().collect()
    }

    fn instance_view(&self, address: &InstanceAddress) -> Option<&InstanceStateView> {
        self.instances.get(address)
    }

    fn reload(&mut self) -> Result<()> {
        if let Some(origin) = &self.origin {
            self.instances = Self::read(origin)?.instances;
        }
        Ok(())
    }

    fn instances_of(&self, resource: &ResourceAddress) -> Vec<&InstanceStateView> {
        self.instances
            .values()
            .filter(|view| &view.address.resource == resource)
            .collect()
    }
}

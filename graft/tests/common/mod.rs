//! Common test utilities for integration tests.
//!
//! This module provides fixture builders for state and schema documents and
//! in-memory collaborators for driving the import executor.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use graft::error::CollaboratorError;
use graft::external::{Binder, ConfigSink};
use graft::state::{InstanceStateView, StateSnapshot, StateSource};
use graft::synthesis::Block;
use graft::{InstanceAddress, ProviderSchemaCatalog, ResourceAddress};
use serde_json::json;

/// Provider source address used by the fixtures.
pub const AWS: &str = "registry.terraform.io/hashicorp/aws";

/// One resource entry of a state document.
#[allow(dead_code)]
pub fn state_resource(
    resource_type: &str,
    name: &str,
    index: serde_json::Value,
    values: serde_json::Value,
) -> serde_json::Value {
    json!({
        "mode": "managed",
        "type": resource_type,
        "name": name,
        "index": index,
        "provider_name": AWS,
        "schema_version": 1,
        "values": values,
    })
}

/// A state document holding `resources` in its root module.
#[allow(dead_code)]
pub fn state_document(resources: Vec<serde_json::Value>) -> String {
    json!({
        "format_version": "1.0",
        "values": {"root_module": {"resources": resources}},
    })
    .to_string()
}

/// A schema document with `aws_instance` and `aws_vpc`.
#[allow(dead_code)]
pub fn schema_document() -> String {
    json!({
        "format_version": "1.0",
        "provider_schemas": {
            AWS: {
                "resource_schemas": {
                    "aws_instance": {
                        "version": 1,
                        "block": {
                            "attributes": {
                                "id": {"type": "string", "computed": true},
                                "ami": {"type": "string", "required": true},
                                "instance_type": {"type": "string", "optional": true},
                                "tags": {"type": ["map", "string"], "optional": true},
                            },
                            "block_types": {
                                "ebs_block_device": {
                                    "nesting_mode": "list",
                                    "block": {
                                        "attributes": {
                                            "device_name": {"type": "string", "required": true},
                                            "volume_size": {"type": "number", "optional": true},
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "aws_vpc": {
                        "version": 1,
                        "block": {
                            "attributes": {
                                "id": {"type": "string", "computed": true},
                                "cidr_block": {"type": "string", "optional": true},
                            }
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

/// The catalog parsed from [`schema_document`].
#[allow(dead_code)]
pub fn schema_catalog() -> ProviderSchemaCatalog {
    ProviderSchemaCatalog::from_json(&schema_document()).unwrap()
}

/// Parses a resource address.
#[allow(dead_code)]
pub fn addr(s: &str) -> ResourceAddress {
    s.parse().unwrap()
}

/// Binder that records calls and optionally fails for one address.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingBinder {
    pub calls: Vec<(String, String)>,
    pub fail_on: Option<String>,
}

#[allow(dead_code)]
impl RecordingBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(address: &str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(address.to_string()),
        }
    }
}

impl Binder for RecordingBinder {
    fn bind(&mut self, target: &InstanceAddress, id: &str) -> Result<(), CollaboratorError> {
        let address = target.to_string();
        if self.fail_on.as_deref() == Some(address.as_str()) {
            return Err(format!("remote object {id} does not exist").into());
        }
        self.calls.push((address, id.to_string()));
        Ok(())
    }
}

/// Sink that keeps appended blocks in memory, per file.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MemorySink {
    pub files: BTreeMap<PathBuf, Vec<Block>>,
}

#[allow(dead_code)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks_in(&self, filename: &str) -> &[Block] {
        self.files.get(Path::new(filename)).map_or(&[], Vec::as_slice)
    }
}

impl ConfigSink for MemorySink {
    fn append(&mut self, filename: &Path, block: &Block) -> Result<(), CollaboratorError> {
        self.files.entry(filename.to_path_buf()).or_default().push(block.clone());
        Ok(())
    }
}

/// State that switches to a second snapshot on reload, as if the bindings
/// had been recorded.
#[allow(dead_code)]
pub struct ReloadingState {
    current: StateSnapshot,
    after_reload: Option<StateSnapshot>,
    pub reloads: usize,
}

#[allow(dead_code)]
impl ReloadingState {
    pub fn new(before: StateSnapshot, after: StateSnapshot) -> Self {
        Self {
            current: before,
            after_reload: Some(after),
            reloads: 0,
        }
    }
}

impl StateSource for ReloadingState {
    fn current_instances(&self) -> BTreeSet<InstanceAddress> {
        self.current.current_instances()
    }

    fn instance_view(&self, address: &InstanceAddress) -> Option<&InstanceStateView> {
        self.current.instance_view(address)
    }

    fn reload(&mut self) -> graft::Result<()> {
        self.reloads += 1;
        if let Some(next) = self.after_reload.take() {
            self.current = next;
        }
        Ok(())
    }
}

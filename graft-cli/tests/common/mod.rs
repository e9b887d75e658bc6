//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builders that point graft at fixture documents
//! - State, schema and declarations fixtures

use assert_cmd::Command;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Provider source address used by the fixtures.
#[allow(dead_code)]
pub const AWS: &str = "registry.terraform.io/hashicorp/aws";

/// Every environment variable graft reads, cleared so the host cannot leak in.
const GRAFT_VARS: [&str; 11] = [
    "GRAFT_CONFIG_DIR",
    "GRAFT_LOG_MODE",
    "GRAFT_DECLARATIONS",
    "GRAFT_STATE_FILE",
    "GRAFT_STATE_COMMAND",
    "GRAFT_SCHEMA_FILE",
    "GRAFT_SCHEMA_COMMAND",
    "GRAFT_IMPORT_COMMAND",
    "GRAFT_DEFAULT_FILENAME",
    "GRAFT_OUTPUT_FORMAT",
    "GRAFT_AUTO_APPROVE",
];

/// Test environment rooted in a temporary directory.
///
/// Commands run with the temporary directory as their working directory, so
/// `graft.imports.yaml` and relative output files land there.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new, empty test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Create an environment with the standard state, schemas and declarations.
    pub fn with_fixtures() -> Self {
        let env = Self::new();
        env.write_state(&[vpc_resource()]);
        env.write("schemas.json", &schema_document());
        env.write("graft.imports.yaml", DECLARATIONS);
        env
    }

    /// A graft command isolated from the host's configuration.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("graft").expect("Failed to find graft binary");
        for var in GRAFT_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(&self.temp_path)
            .env("GRAFT_CONFIG_DIR", self.temp_path.join(".graft-user"));
        cmd
    }

    /// A graft command reading the fixture state and schema files, with an
    /// import command that always succeeds.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.env("GRAFT_STATE_FILE", self.path_of("state.json"))
            .env("GRAFT_SCHEMA_FILE", self.path_of("schemas.json"))
            .env("GRAFT_IMPORT_COMMAND", "true");
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Absolute path of a file in the environment.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.temp_path.join(name)
    }

    /// Write a file into the environment.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path_of(name);
        fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// Read a file from the environment.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path_of(name)).expect("Failed to read file")
    }

    /// Replace `state.json` with a state holding `resources`.
    pub fn write_state(&self, resources: &[serde_json::Value]) -> PathBuf {
        self.write("state.json", &state_document(resources))
    }

    /// Install an import command that replaces `state.json` with
    /// `after.json`, the way a real import records new instances.
    #[cfg(unix)]
    pub fn install_import_script(&self, after: &[serde_json::Value]) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        self.write("after.json", &state_document(after));
        let script = self.write(
            "import.sh",
            "#!/bin/sh\ncp \"$(dirname \"$0\")/after.json\" \"$(dirname \"$0\")/state.json\"\n",
        );
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        script
    }
}

/// Declarations importing two web instances and a VPC that is already
/// declared and tracked.
pub const DECLARATIONS: &str = "\
imports:
  - resource: aws_instance.web
    id: [i-0, i-1]
    source: web.tfy
  - resource: aws_vpc.main
    id: vpc-1
declared:
  - aws_vpc.main
";

/// One resource entry of a state document.
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

/// The tracked VPC.
pub fn vpc_resource() -> serde_json::Value {
    state_resource(
        "aws_vpc",
        "main",
        serde_json::Value::Null,
        json!({"id": "vpc-1", "cidr_block": "10.0.0.0/16"}),
    )
}

/// One web instance as recorded after import.
#[allow(dead_code)]
pub fn web_resource(index: i64, id: &str, instance_type: &str) -> serde_json::Value {
    state_resource(
        "aws_instance",
        "web",
        json!(index),
        json!({"id": id, "ami": "ami-1", "instance_type": instance_type}),
    )
}

/// A state document holding `resources` in its root module.
pub fn state_document(resources: &[serde_json::Value]) -> String {
    json!({
        "format_version": "1.0",
        "values": {"root_module": {"resources": resources}},
    })
    .to_string()
}

/// A schema document with `aws_instance` and `aws_vpc`.
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

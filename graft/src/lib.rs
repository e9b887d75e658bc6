#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # graft
//!
//! A library for importing existing infrastructure objects into tracked
//! state and writing configuration that matches what was imported.
//!
//! Importing happens in two steps. An [`ImportPlan`] is built by comparing
//! declared import targets against the instances already tracked in state
//! and the resources already declared in configuration. Executing the plan
//! binds each missing instance to its remote object, then synthesizes a
//! configuration block for every resource that had none, from the values
//! the binding recorded.
//!
//! ## Core Types
//!
//! - [`ResourceAddress`], [`InstanceAddress`] and [`InstanceKey`]: addresses
//!   of resources and their instances
//! - [`Value`]: a decoded attribute value
//! - [`ImportPlan`] and [`ImportExecutor`]: planning and applying imports
//! - [`synthesis`]: building configuration bodies from recorded values
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use graft::{InstanceKey, RepeatMode, ResourceAddress};
//!
//! let resource: ResourceAddress = "aws_instance.web".parse().unwrap();
//! let instance = resource.instance(InstanceKey::String("blue".to_string()));
//! assert_eq!(instance.to_string(), "aws_instance.web[\"blue\"]");
//! assert_eq!(RepeatMode::of_key(&instance.key), RepeatMode::ForEach);
//! ```

pub mod address;
pub mod config;
pub mod declarations;
pub mod error;
pub mod external;
pub mod logging;
pub mod operations;
pub mod output;
pub mod schema;
pub mod state;
pub mod synthesis;
pub mod value;

// Re-export key types at crate root for convenience
pub use address::{InstanceAddress, InstanceKey, RepeatMode, ResourceAddress, ResourceMode};
pub use config::{Config, ConfigBuilder, ResolvedConfig};
pub use declarations::Declarations;
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use operations::{
    build_plan, ConfigStub, ExecutionResult, ImportExecutor, ImportPlan, ImportPlanBuilder, ImportTarget,
    PlanAction, StateBinding,
};
pub use schema::{BlockSchema, ProviderSchemaCatalog, ResourceSchema, SchemaSource};
pub use state::{InstanceStateView, StateSnapshot, StateSource};
pub use synthesis::{generate_resource_block, synthesize, ConfigBlockBody};
pub use value::Value;

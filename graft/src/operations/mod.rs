//! Import operations using the plan-execute pattern.
//!
//! Importing is split into two phases:
//! 1. **Planning**: compares declared targets with tracked state and
//!    declared configuration, and builds a sorted [`ImportPlan`]
//! 2. **Execution**: binds instances, then synthesizes and appends
//!    configuration for resources that have none
//!
//! Keeping the phases apart lets a plan be shown and confirmed before
//! anything changes, and makes dry runs free.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use graft::operations::{DesiredIds, ImportPlanBuilder, ImportTarget};
//! use graft::ResourceAddress;
//! use serde_json::json;
//!
//! let targets = vec![ImportTarget::new(
//!     "aws_instance.web".parse::<ResourceAddress>().unwrap(),
//!     DesiredIds::from_raw(json!({"blue": "i-1", "green": "i-2"})),
//! )];
//!
//! let (plan, errors) = ImportPlanBuilder::new(targets).build_plan(&BTreeSet::new(), &BTreeSet::new());
//! assert!(errors.is_empty());
//!
//! let lines: Vec<String> = plan.actions().iter().map(|a| a.description()).collect();
//! assert_eq!(lines[0], "Import i-1 as aws_instance.web[\"blue\"]");
//! ```

pub mod builder;
pub mod executor;
pub mod plan;

#[cfg(test)]
mod proptests;

pub use builder::{build_plan, DesiredIds, FilenamePolicy, ImportPlanBuilder, ImportTarget};
pub use executor::{ExecutionResult, GeneratedConfig, ImportExecutor};
pub use plan::{ConfigStub, ImportPlan, PlanAction, StateBinding};

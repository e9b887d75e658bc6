//! Building import plans.
//!
//! The builder compares declared import targets against the instances
//! already tracked in state and the resources already declared in
//! configuration. Targets with malformed ids are reported and skipped; the
//! rest still contribute to the plan.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::plan::{ConfigStub, ImportPlan, StateBinding};
use crate::address::{InstanceAddress, InstanceKey, RepeatMode, ResourceAddress, ResourceMode};
use crate::error::Error;

const ID_SHAPE: &str = "must be a string, a list of strings, or a map of strings";

/// The remote object ids declared for one target.
///
/// The shape decides how the resource repeats: a single id means one
/// unkeyed instance, a list means `count` with keys `0..len`, and a map
/// means `for_each` with the map's keys.
#[derive(Debug, Clone, PartialEq)]
pub enum DesiredIds {
    /// One id.
    Single(serde_json::Value),
    /// One id per `count` index.
    List(Vec<serde_json::Value>),
    /// One id per `for_each` key.
    Map(BTreeMap<String, serde_json::Value>),
}

impl DesiredIds {
    /// Classifies raw declared ids by shape.
    #[must_use]
    pub fn from_raw(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Array(items) => Self::List(items),
            serde_json::Value::Object(entries) => Self::Map(entries.into_iter().collect()),
            other => Self::Single(other),
        }
    }

    /// The repetition this shape implies.
    #[must_use]
    pub const fn repeat_mode(&self) -> RepeatMode {
        match self {
            Self::Single(_) => RepeatMode::None,
            Self::List(_) => RepeatMode::Count,
            Self::Map(_) => RepeatMode::ForEach,
        }
    }

    /// Resolves every declared id to a string, keyed by instance key.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if any id is neither a string
    /// nor a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use graft::operations::DesiredIds;
    /// use graft::InstanceKey;
    /// use serde_json::json;
    ///
    /// let ids = DesiredIds::from_raw(json!(["i-1", 42])).normalize().unwrap();
    /// assert_eq!(ids[&InstanceKey::Int(0)], "i-1");
    /// assert_eq!(ids[&InstanceKey::Int(1)], "42");
    ///
    /// assert!(DesiredIds::from_raw(json!(true)).normalize().is_err());
    /// ```
    pub fn normalize(&self) -> Result<BTreeMap<InstanceKey, String>, String> {
        match self {
            Self::Single(raw) => Ok(BTreeMap::from([(InstanceKey::None, normalize_id(raw)?)])),
            Self::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    let index = i64::try_from(i).map_err(|_| "too many ids".to_string())?;
                    Ok((InstanceKey::Int(index), normalize_id(raw)?))
                })
                .collect(),
            Self::Map(entries) => entries
                .iter()
                .map(|(key, raw)| Ok((InstanceKey::String(key.clone()), normalize_id(raw)?)))
                .collect(),
        }
    }
}

/// Canonical string form of one id.
///
/// Numbers use their shortest decimal form without an exponent.
fn normalize_id(raw: &serde_json::Value) -> Result<String, String> {
    match raw {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                n.as_f64().map(|f| f.to_string()).ok_or_else(|| ID_SHAPE.to_string())
            }
        }
        _ => Err(ID_SHAPE.to_string()),
    }
}

/// One resource to import, as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportTarget {
    /// The managed resource to import into.
    pub address: ResourceAddress,
    /// The remote object ids to import.
    pub desired_ids: DesiredIds,
    /// The file the target was declared in, if known.
    pub source: Option<PathBuf>,
    /// Provider local name to use for the generated block, if declared.
    pub provider: Option<String>,
}

impl ImportTarget {
    /// Creates a target with no source file or provider.
    #[must_use]
    pub const fn new(address: ResourceAddress, desired_ids: DesiredIds) -> Self {
        Self {
            address,
            desired_ids,
            source: None,
            provider: None,
        }
    }

    /// Records the file the target was declared in.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records the provider local name to use.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Decides which file generated configuration goes to.
///
/// A target declared in `NAME<source_suffix>` gets its block written to
/// `NAME<config_suffix>` beside it. Anything else goes to the default file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePolicy {
    /// Destination for targets without a recognized source file.
    pub default_filename: PathBuf,
    /// Suffix of declaration files.
    pub source_suffix: String,
    /// Suffix that replaces it.
    pub config_suffix: String,
}

impl Default for FilenamePolicy {
    fn default() -> Self {
        Self {
            default_filename: PathBuf::from("imported.tf"),
            source_suffix: ".tfy".to_string(),
            config_suffix: ".tf".to_string(),
        }
    }
}

impl FilenamePolicy {
    /// Destination file for a target declared in `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use graft::operations::FilenamePolicy;
    ///
    /// let policy = FilenamePolicy::default();
    /// assert_eq!(policy.filename_for(Some(Path::new("net/vpc.tfy"))), PathBuf::from("net/vpc.tf"));
    /// assert_eq!(policy.filename_for(Some(Path::new("imports.yaml"))), PathBuf::from("imported.tf"));
    /// assert_eq!(policy.filename_for(None), PathBuf::from("imported.tf"));
    /// ```
    #[must_use]
    pub fn filename_for(&self, source: Option<&Path>) -> PathBuf {
        source
            .and_then(Path::to_str)
            .and_then(|s| s.strip_suffix(self.source_suffix.as_str()))
            .filter(|stem| !stem.is_empty() && !stem.ends_with(std::path::MAIN_SEPARATOR))
            .map_or_else(
                || self.default_filename.clone(),
                |stem| PathBuf::from(format!("{stem}{}", self.config_suffix)),
            )
    }
}

/// Builds an [`ImportPlan`] from declared targets.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use graft::operations::{DesiredIds, ImportPlanBuilder, ImportTarget};
/// use graft::{RepeatMode, ResourceAddress};
/// use serde_json::json;
///
/// let target = ImportTarget::new(
///     "aws_instance.web".parse::<ResourceAddress>().unwrap(),
///     DesiredIds::from_raw(json!(["i-1", "i-2"])),
/// );
/// let (plan, errors) = ImportPlanBuilder::new(vec![target]).build_plan(&BTreeSet::new(), &BTreeSet::new());
///
/// assert!(errors.is_empty());
/// assert_eq!(plan.state_bindings.len(), 2);
/// assert_eq!(plan.config_stubs[0].repeat_mode, RepeatMode::Count);
/// ```
#[derive(Debug, Clone)]
pub struct ImportPlanBuilder {
    targets: Vec<ImportTarget>,
    policy: FilenamePolicy,
}

impl ImportPlanBuilder {
    /// Creates a builder using the default filename policy.
    #[must_use]
    pub fn new(targets: Vec<ImportTarget>) -> Self {
        Self {
            targets,
            policy: FilenamePolicy::default(),
        }
    }

    /// Uses `policy` to choose destination files.
    #[must_use]
    pub fn with_filename_policy(mut self, policy: FilenamePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the plan, returning it sorted together with per-target errors.
    ///
    /// An instance is left out when its address is already tracked, and a
    /// target gets a config stub only when its resource is not declared yet.
    /// A target whose id shape disagrees with the keys of instances already
    /// tracked for its resource is skipped with an error.
    /// Repeated targets contribute each binding and stub once.
    #[must_use]
    pub fn build_plan(
        &self,
        existing_instances: &BTreeSet<InstanceAddress>,
        existing_config: &BTreeSet<ResourceAddress>,
    ) -> (ImportPlan, Vec<Error>) {
        let tracked: BTreeSet<String> = existing_instances.iter().map(ToString::to_string).collect();
        let mut planned: BTreeSet<String> = BTreeSet::new();
        let mut stubbed: BTreeSet<&ResourceAddress> = BTreeSet::new();
        let mut plan = ImportPlan::new();
        let mut errors = Vec::new();

        for target in &self.targets {
            if target.address.mode == ResourceMode::Data {
                errors.push(Error::InvalidAddress {
                    input: target.address.to_string(),
                    reason: "data resources cannot be imported".to_string(),
                });
                continue;
            }

            let ids = match target.desired_ids.normalize() {
                Ok(ids) => ids,
                Err(reason) => {
                    log::debug!("Skipping {}: {reason}", target.address);
                    errors.push(Error::InvalidId {
                        address: target.address.to_string(),
                        reason,
                    });
                    continue;
                }
            };
            let repeat_mode = target.desired_ids.repeat_mode();
            if existing_instances
                .iter()
                .any(|i| i.resource == target.address && RepeatMode::of_key(&i.key) != repeat_mode)
            {
                log::debug!("Skipping {}: tracked instances use another kind of key", target.address);
                errors.push(Error::MixedInstanceKeys {
                    resource: target.address.to_string(),
                });
                continue;
            }
            if ids.is_empty() {
                plan = plan.add_warning(format!("{} declares no ids, so no instances will be imported", target.address));
            }

            for (key, id) in ids {
                let instance = target.address.instance(key);
                let label = instance.to_string();
                if tracked.contains(&label) {
                    log::debug!("{label} is already tracked");
                    continue;
                }
                if planned.insert(label) {
                    plan = plan.add_binding(StateBinding { target: instance, id });
                }
            }

            if !existing_config.contains(&target.address) && stubbed.insert(&target.address) {
                plan = plan.add_stub(ConfigStub {
                    target: target.address.clone(),
                    repeat_mode,
                    filename: self.policy.filename_for(target.source.as_deref()),
                    provider: target.provider.clone(),
                });
            }
        }

        plan.sort();
        log::debug!(
            "Planned {} bindings and {} config stubs with {} errors",
            plan.state_bindings.len(),
            plan.config_stubs.len(),
            errors.len()
        );
        (plan, errors)
    }
}

/// Builds a sorted plan with the default filename policy.
#[must_use]
pub fn build_plan(
    targets: &[ImportTarget],
    existing_instances: &BTreeSet<InstanceAddress>,
    existing_config: &BTreeSet<ResourceAddress>,
) -> (ImportPlan, Vec<Error>) {
    ImportPlanBuilder::new(targets.to_vec()).build_plan(existing_instances, existing_config)
}

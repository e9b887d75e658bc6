//! Plan types for import operations.
//!
//! An [`ImportPlan`] lists what an import run will do without doing it:
//! which instances get bound to remote objects, and which resources get a
//! newly generated configuration block.

use std::path::PathBuf;

use crate::address::{InstanceAddress, RepeatMode, ResourceAddress};

/// Bind one instance address to an existing remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBinding {
    /// The instance that will track the object.
    pub target: InstanceAddress,
    /// Remote object id, as the provider understands it.
    pub id: String,
}

/// Generate a configuration block for a resource with none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStub {
    /// The resource to generate configuration for.
    pub target: ResourceAddress,
    /// How the generated block repeats.
    pub repeat_mode: RepeatMode,
    /// File the block is appended to.
    pub filename: PathBuf,
    /// Provider local name declared for the target, if any.
    pub provider: Option<String>,
}

/// A single action to be taken during plan execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    /// Bind an instance to a remote object.
    BindState(StateBinding),
    /// Generate and append a configuration block.
    GenerateConfig(ConfigStub),
}

impl PlanAction {
    /// Returns a human-readable description of this action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::BindState(binding) => {
                format!("Import {} as {}", binding.id, binding.target)
            }
            Self::GenerateConfig(stub) => match stub.repeat_mode {
                RepeatMode::None => format!(
                    "Add a resource block for {} to {}",
                    stub.target,
                    stub.filename.display()
                ),
                mode => format!(
                    "Add a resource block for {} using {mode} to {}",
                    stub.target,
                    stub.filename.display()
                ),
            },
        }
    }
}

/// A complete import plan.
///
/// Plans are built once per run and only changed afterwards by
/// [`ImportPlan::sort`], which orders bindings by instance address and
/// stubs by resource address so repeated runs print the same plan.
///
/// # Examples
///
/// ```
/// use graft::operations::{ImportPlan, StateBinding};
/// use graft::{InstanceKey, ResourceAddress};
///
/// let web: ResourceAddress = "aws_instance.web".parse().unwrap();
/// let mut plan = ImportPlan::new()
///     .add_binding(StateBinding { target: web.instance(InstanceKey::Int(1)), id: "i-2".into() })
///     .add_binding(StateBinding { target: web.instance(InstanceKey::Int(0)), id: "i-1".into() });
/// plan.sort();
///
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan.state_bindings[0].id, "i-1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Instances to bind, in execution order.
    pub state_bindings: Vec<StateBinding>,
    /// Configuration blocks to generate, in execution order.
    pub config_stubs: Vec<ConfigStub>,
    /// Warnings to communicate to the user.
    pub warnings: Vec<String>,
}

impl ImportPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state binding.
    #[must_use]
    pub fn add_binding(mut self, binding: StateBinding) -> Self {
        self.state_bindings.push(binding);
        self
    }

    /// Adds a configuration stub.
    #[must_use]
    pub fn add_stub(mut self, stub: ConfigStub) -> Self {
        self.config_stubs.push(stub);
        self
    }

    /// Adds a warning to the plan.
    #[must_use]
    pub fn add_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Checks if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state_bindings.is_empty() && self.config_stubs.is_empty()
    }

    /// Returns the number of actions in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state_bindings.len() + self.config_stubs.len()
    }

    /// Orders bindings by `(mode, type, name, key)` and stubs by
    /// `(mode, type, name)`.
    ///
    /// The sort is stable, so sorting a sorted plan changes nothing.
    pub fn sort(&mut self) {
        self.state_bindings.sort_by(|a, b| a.target.cmp(&b.target));
        self.config_stubs.sort_by(|a, b| a.target.cmp(&b.target));
    }

    /// Every action, bindings first.
    #[must_use]
    pub fn actions(&self) -> Vec<PlanAction> {
        self.state_bindings
            .iter()
            .cloned()
            .map(PlanAction::BindState)
            .chain(self.config_stubs.iter().cloned().map(PlanAction::GenerateConfig))
            .collect()
    }
}

//! Plan execution engine.
//!
//! This module implements the executor that takes an import plan, binds
//! instances through a [`Binder`], and writes generated configuration
//! through a [`ConfigSink`].

use std::path::PathBuf;

use crate::address::{InstanceAddress, ResourceAddress};
use crate::error::{Error, Result};
use crate::external::{Binder, ConfigSink};
use crate::schema::SchemaSource;
use crate::state::StateSource;
use crate::synthesis::{generate_resource_block, Block, GeneratedBlock};

use super::plan::{ConfigStub, ImportPlan, PlanAction};

/// A configuration block produced for one config stub.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConfig {
    /// The resource the block declares.
    pub target: ResourceAddress,
    /// The file it was appended to.
    pub filename: PathBuf,
    /// The block itself.
    pub block: Block,
}

/// Result of executing a plan.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,

    /// Whether this was a dry-run (no collaborators were invoked).
    pub dry_run: bool,

    /// Descriptions of actions that were taken (or would be taken in dry-run).
    pub actions_taken: Vec<String>,

    /// Warnings from the plan and from synthesis.
    pub warnings: Vec<String>,

    /// Instances bound to remote objects, in order.
    pub bound: Vec<InstanceAddress>,

    /// Configuration blocks that were appended, in order.
    pub generated: Vec<GeneratedConfig>,
}

impl ExecutionResult {
    /// Creates a successful execution result.
    fn success(
        plan: &ImportPlan,
        bound: Vec<InstanceAddress>,
        generated: Vec<GeneratedConfig>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            dry_run: false,
            actions_taken: plan.actions().iter().map(PlanAction::description).collect(),
            warnings,
            bound,
            generated,
        }
    }

    /// Creates a dry-run execution result.
    fn dry_run(plan: &ImportPlan) -> Self {
        Self {
            success: true,
            dry_run: true,
            actions_taken: plan.actions().iter().map(PlanAction::description).collect(),
            warnings: plan.warnings.clone(),
            bound: Vec::new(),
            generated: Vec::new(),
        }
    }
}

/// Executes import plans.
///
/// Bindings run first, in plan order, and the first failure stops the run;
/// instances bound before it stay bound. State is then reloaded so the new
/// instances are visible, every config stub is synthesized, and only when
/// all of them succeeded are the blocks appended. A missing schema or a
/// schema version mismatch therefore leaves every file untouched.
///
/// # Examples
///
/// ```
/// use graft::external::FileSink;
/// use graft::operations::{ImportExecutor, ImportPlan};
/// use graft::schema::ProviderSchemaCatalog;
/// use graft::state::StateSnapshot;
/// use graft::external::CommandBinder;
///
/// let mut binder = CommandBinder::new(vec!["terraform".into(), "import".into()]);
/// let mut state = StateSnapshot::new();
/// let schemas = ProviderSchemaCatalog::new();
/// let mut sink = FileSink::new();
///
/// let mut executor = ImportExecutor::new(&mut binder, &mut state, &schemas, &mut sink).dry_run();
/// let result = executor.execute(&ImportPlan::new()).unwrap();
/// assert!(result.dry_run);
/// ```
pub struct ImportExecutor<'a> {
    binder: &'a mut dyn Binder,
    state: &'a mut dyn StateSource,
    schemas: &'a dyn SchemaSource,
    sink: &'a mut dyn ConfigSink,
    dry_run: bool,
}

impl<'a> ImportExecutor<'a> {
    /// Creates a new executor over the given collaborators.
    #[must_use]
    pub fn new(
        binder: &'a mut dyn Binder,
        state: &'a mut dyn StateSource,
        schemas: &'a dyn SchemaSource,
        sink: &'a mut dyn ConfigSink,
    ) -> Self {
        Self {
            binder,
            state,
            schemas,
            sink,
            dry_run: false,
        }
    }

    /// Sets the executor to dry-run mode.
    ///
    /// In dry-run mode the plan is reported but no collaborator is called.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Executes a plan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BindFailed`] for the first binding that fails, a
    /// schema error if any stub cannot be synthesized, and
    /// [`Error::AppendFailed`] if a block cannot be written.
    pub fn execute(&mut self, plan: &ImportPlan) -> Result<ExecutionResult> {
        if self.dry_run {
            log::debug!("Dry run: {} actions not executed", plan.len());
            return Ok(ExecutionResult::dry_run(plan));
        }

        let mut bound = Vec::new();
        for binding in &plan.state_bindings {
            log::debug!("Binding {} to {:?}", binding.target, binding.id);
            self.binder
                .bind(&binding.target, &binding.id)
                .map_err(|source| Error::BindFailed {
                    address: binding.target.to_string(),
                    id: binding.id.clone(),
                    source,
                })?;
            bound.push(binding.target.clone());
        }

        if !bound.is_empty() {
            self.state.reload()?;
        }

        let mut warnings = plan.warnings.clone();
        let mut generated = Vec::new();
        for stub in &plan.config_stubs {
            let GeneratedBlock {
                block,
                warnings: stub_warnings,
            } = self.synthesize_stub(stub)?;
            warnings.extend(stub_warnings);
            generated.push(GeneratedConfig {
                target: stub.target.clone(),
                filename: stub.filename.clone(),
                block,
            });
        }

        for config in &generated {
            log::debug!("Appending {} to {}", config.target, config.filename.display());
            self.sink
                .append(&config.filename, &config.block)
                .map_err(|source| Error::AppendFailed {
                    filename: config.filename.clone(),
                    source,
                })?;
        }

        for warning in &warnings {
            log::warn!("{warning}");
        }
        Ok(ExecutionResult::success(plan, bound, generated, warnings))
    }

    fn synthesize_stub(&self, stub: &ConfigStub) -> Result<GeneratedBlock> {
        let views = self.state.instances_of(&stub.target);
        let provider = views
            .first()
            .map(|view| view.provider.clone())
            .filter(|p| !p.is_empty())
            .or_else(|| stub.provider.clone())
            .unwrap_or_else(|| stub.target.implied_provider().to_string());

        let schema = self
            .schemas
            .schema_for(&provider, &stub.target.resource_type)
            .ok_or_else(|| Error::SchemaNotFound {
                provider: provider.clone(),
                resource_type: stub.target.resource_type.clone(),
            })?;

        generate_resource_block(&stub.target, stub.repeat_mode, schema, &views)
    }
}

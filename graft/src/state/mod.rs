//! Recorded state of existing resource instances.
//!
//! The core reads state through the [`StateSource`] trait: which instances
//! are tracked, and for one instance its raw recorded data plus the schema
//! version it was written under. [`StateSnapshot`] implements it over the
//! JSON state document.

pub mod snapshot;

use std::collections::BTreeSet;

use crate::address::{InstanceAddress, ResourceAddress};
use crate::error::Result;

pub use snapshot::StateSnapshot;

/// Recorded data of one tracked instance.
///
/// `values` is raw JSON; decode it through the resource schema's implied
/// type before synthesizing from it.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceStateView {
    /// The instance this data belongs to.
    pub address: InstanceAddress,
    /// Provider that manages the instance, as recorded.
    pub provider: String,
    /// Schema version the data was recorded under.
    pub schema_version: u64,
    /// The recorded attribute values.
    pub values: serde_json::Value,
}

impl InstanceStateView {
    /// Local name of the recorded provider (the last segment of its source address).
    #[must_use]
    pub fn provider_local_name(&self) -> &str {
        self.provider.rsplit('/').next().unwrap_or(&self.provider)
    }
}

/// Read access to tracked state.
pub trait StateSource {
    /// Addresses of every tracked instance.
    fn current_instances(&self) -> BTreeSet<InstanceAddress>;

    /// Recorded data of one instance, if it is tracked.
    fn instance_view(&self, address: &InstanceAddress) -> Option<&InstanceStateView>;

    /// Re-reads state from its origin, picking up newly bound instances.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin can no longer be read.
    fn reload(&mut self) -> Result<()>;

    /// Recorded data of every instance of one resource, in key order.
    fn instances_of(&self, resource: &ResourceAddress) -> Vec<&InstanceStateView> {
        self.current_instances()
            .iter()
            .filter(|address| &address.resource == resource)
            .filter_map(|address| self.instance_view(address))
            .collect()
    }
}

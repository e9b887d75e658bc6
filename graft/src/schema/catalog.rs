//! Provider schema catalog.
//!
//! The catalog is read from the provider schema JSON document, either a
//! file or the output of a command such as `terraform providers schema -json`.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::ResourceSchema;
use crate::error::{Error, Result};
use crate::external::DocumentOrigin;

/// Looks up resource schemas by provider and resource type.
pub trait SchemaSource {
    /// Returns the schema for `resource_type` as served by `provider`.
    ///
    /// `provider` may be a full source address such as
    /// `registry.terraform.io/hashicorp/aws` or just its local name `aws`.
    fn schema_for(&self, provider: &str, resource_type: &str) -> Option<&ResourceSchema>;
}

#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    provider_schemas: BTreeMap<String, ProviderSchemas>,
}

#[derive(Deserialize)]
struct ProviderSchemas {
    #[serde(default)]
    resource_schemas: BTreeMap<String, ResourceSchema>,
}

/// Resource schemas of every provider in a schema document.
///
/// # Examples
///
/// ```
/// use graft::schema::{ProviderSchemaCatalog, SchemaSource};
///
/// let catalog = ProviderSchemaCatalog::from_json(r#"{
///     "format_version": "1.0",
///     "provider_schemas": {
///         "registry.terraform.io/hashicorp/random": {
///             "resource_schemas": {
///                 "random_pet": {"version": 0, "block": {"attributes": {}}}
///             }
///         }
///     }
/// }"#).unwrap();
///
/// assert!(catalog.schema_for("random", "random_pet").is_some());
/// assert!(catalog.schema_for("random", "random_id").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProviderSchemaCatalog {
    providers: BTreeMap<String, BTreeMap<String, ResourceSchema>>,
}

impl ProviderSchemaCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a provider schema JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or does not have
    /// the expected structure.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SchemaDocument =
            serde_json::from_str(json).map_err(|e| Error::InvalidSchema {
                reason: e.to_string(),
            })?;
        Ok(Self {
            providers: document
                .provider_schemas
                .into_iter()
                .map(|(provider, schemas)| (provider, schemas.resource_schemas))
                .collect(),
        })
    }

    /// Loads a catalog from a file or command.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin cannot be read, the document is
    /// invalid, or a schema file does not exist.
    pub fn load(origin: &DocumentOrigin) -> Result<Self> {
        log::debug!("Loading provider schemas from {origin}");
        match origin.read()? {
            Some(json) => Self::from_json(&json),
            None => Err(Error::NotFound {
                resource: format!("provider schema document {origin}"),
            }),
        }
    }

    /// Adds or replaces one resource schema.
    #[must_use]
    pub fn with_schema(
        mut self,
        provider: impl Into<String>,
        resource_type: impl Into<String>,
        schema: ResourceSchema,
    ) -> Self {
        self.providers
            .entry(provider.into())
            .or_default()
            .insert(resource_type.into(), schema);
        self
    }

    /// Names of all providers in the catalog.
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

impl SchemaSource for ProviderSchemaCatalog {
    fn schema_for(&self, provider: &str, resource_type: &str) -> Option<&ResourceSchema> {
        let suffix = format!("/{provider}");
        self.providers
            .iter()
            .filter(|(name, _)| name.as_str() == provider || name.ends_with(&suffix))
            .find_map(|(_, schemas)| schemas.get(resource_type))
    }
}

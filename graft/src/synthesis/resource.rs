//! Whole resource blocks for generated configuration.

use std::collections::{BTreeMap, BTreeSet};

use super::{count_length, synthesize, Block, Expression};
use crate::address::{InstanceKey, RepeatMode, ResourceAddress};
use crate::error::{Error, Result};
use crate::schema::{implied_type, ResourceSchema};
use crate::state::InstanceStateView;
use crate::value::Value;

/// A generated `resource` block and the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBlock {
    /// The block, ready to be rendered and appended.
    pub block: Block,
    /// Non-fatal problems the user should look at.
    pub warnings: Vec<String>,
}

/// Builds the `resource` block for `target` from the recorded state of its
/// instances.
///
/// The block starts with the repetition meta-argument (`count` or
/// `for_each`), then `provider` when the recorded provider is not the one
/// the resource type implies, then the synthesized attributes and nested
/// blocks. With no recorded instances the block holds only a placeholder
/// comment, and a warning says so.
///
/// # Errors
///
/// Returns an error if any instance was recorded under a different schema
/// version, its data does not fit the schema, or its key does not match
/// `repeat_mode`.
pub fn generate_resource_block(
    target: &ResourceAddress,
    repeat_mode: RepeatMode,
    schema: &ResourceSchema,
    views: &[&InstanceStateView],
) -> Result<GeneratedBlock> {
    for view in views {
        if view.schema_version != schema.version {
            return Err(Error::SchemaVersionMismatch {
                instance: view.address.to_string(),
                recorded: view.schema_version,
                current: schema.version,
            });
        }
    }

    let mut block = Block::new("resource", vec![target.resource_type.clone(), target.name.clone()]);
    let mut warnings = Vec::new();

    if views.is_empty() {
        block
            .body
            .append_comment(format!("No instances of {target} were found in state, so nothing was generated."));
        block.body.append_comment("Fill in this block by hand.");
        warnings.push(format!(
            "{target} has no recorded instances; its configuration block is an empty placeholder"
        ));
        return Ok(GeneratedBlock { block, warnings });
    }

    check_keys(target, repeat_mode, views)?;

    let implied = implied_type(&schema.block);
    let mut values = BTreeMap::new();
    for view in views {
        let value = implied.decode(&view.values).map_err(|e| Error::StateDecode {
            instance: view.address.to_string(),
            reason: e.to_string(),
        })?;
        values.insert(view.address.clone(), value);
    }

    match repeat_mode {
        RepeatMode::None => {}
        RepeatMode::Count => {
            let next = count_length(&target.to_string(), views.iter().map(|v| &v.address.key))?;
            block.body.set_attribute("count", Expression::Literal(Value::int(next)));
        }
        RepeatMode::ForEach => {
            let keys: BTreeSet<&str> = views
                .iter()
                .filter_map(|v| match &v.address.key {
                    InstanceKey::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            block
                .body
                .append_comment("The keys below are the ones found in state. Replace this set with the");
            block
                .body
                .append_comment("expression that should drive for_each.");
            block.body.set_attribute(
                "for_each",
                Expression::FunctionCall {
                    name: "toset".into(),
                    args: vec![Expression::Tuple(
                        keys.into_iter().map(|k| Expression::Literal(k.into())).collect(),
                    )],
                },
            );
            warnings.push(format!(
                "for_each of {target} lists the instance keys found in state; replace it with the expression that produces them"
            ));
        }
    }

    let providers: BTreeSet<&str> = views.iter().map(|v| v.provider_local_name()).collect();
    if let [provider] = providers.into_iter().collect::<Vec<_>>().as_slice() {
        if !provider.is_empty() && *provider != target.implied_provider() {
            block.body.set_attribute("provider", Expression::traversal(&[*provider]));
        }
    }

    let synthesized = synthesize(&schema.block, &values)?;
    if !block.body.is_empty() && !synthesized.body.is_empty() {
        block.body.append_blank();
    }
    block.body.items.extend(synthesized.body.items);
    warnings.extend(synthesized.warnings);

    Ok(GeneratedBlock { block, warnings })
}

fn check_keys(target: &ResourceAddress, repeat_mode: RepeatMode, views: &[&InstanceStateView]) -> Result<()> {
    let Some(first) = views.first() else {
        return Ok(());
    };
    if views.iter().any(|v| !v.address.key.same_kind(&first.address.key)) {
        return Err(Error::MixedInstanceKeys {
            resource: target.to_string(),
        });
    }
    let found = RepeatMode::of_key(&first.address.key);
    if found != repeat_mode {
        return Err(Error::InstanceKeyMismatch {
            resource: target.to_string(),
            expected: repeat_mode.key_kind().to_string(),
            found: found.key_kind().to_string(),
        });
    }
    Ok(())
}

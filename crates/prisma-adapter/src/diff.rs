//! Identity-based diff between two collections of related records.
//!
//! The target API expects relation changes as idempotent multi-verb bundles
//! rather than ordered patches, so the only thing that matters here is which
//! ids appear on which side. Items are matched by their `id` value; list
//! order never changes the outcome. Items with no id cannot be connected or
//! disconnected and are candidates for creation instead.

use std::collections::BTreeSet;

use introspection_snapshot::{SchemaError, Snapshot};
use serde_json::{json, Value};

use crate::error::Skip;

/// The four disjoint relation mutations computed from an old and a new
/// collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationDiff {
    /// Newly associated records, projected to `{id}`.
    pub to_add: Vec<Value>,
    /// Records no longer present, projected to `{id}`.
    pub to_remove: Vec<Value>,
    /// Records on both sides, reshaped as `{where: {id}, data}`.
    pub to_update: Vec<Value>,
    /// New records with no id, filtered to the create input's fields.
    pub to_create: Vec<Value>,
}

/// Diffs `old_items` against `new_items` for the relation whose input object
/// is named `relation_input`.
///
/// `to_update` data is filtered to the fields accepted by the relation's
/// `update` → `data` input, `to_create` to the fields of its `create` input.
/// A relation without one of those nested capabilities yields an empty list
/// for the corresponding verb; callers decide whether to send it.
pub fn diff_relation(
    snapshot: &Snapshot,
    relation_input: &str,
    old_items: &[Value],
    new_items: &[Value],
) -> Result<RelationDiff, SchemaError> {
    let old_ids: Vec<&Value> = old_items.iter().filter_map(item_id).collect();
    let new_ids: Vec<&Value> = new_items.iter().filter_map(item_id).collect();

    let update_fields = update_data_fields(snapshot, relation_input)?;
    let create_fields = create_fields(snapshot, relation_input)?;

    let mut diff = RelationDiff::default();

    for item in new_items {
        let Some(entry) = item.as_object() else {
            Skip::ParamShapeMismatch {
                field: relation_input,
                reason: "relation items must be objects",
            }
            .log();
            continue;
        };

        match item_id(item) {
            Some(id) if !old_ids.contains(&id) => diff.to_add.push(json!({ "id": id })),
            Some(id) => {
                if let Some(allowed) = &update_fields {
                    let data: serde_json::Map<_, _> = entry
                        .iter()
                        .filter(|(key, _)| key.as_str() != "id" && allowed.contains(key.as_str()))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect();
                    diff.to_update.push(json!({ "where": { "id": id }, "data": data }));
                }
            }
            None => {
                if let Some(allowed) = &create_fields {
                    let data: serde_json::Map<_, _> = entry
                        .iter()
                        .filter(|(key, _)| allowed.contains(key.as_str()))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect();
                    diff.to_create.push(Value::Object(data));
                }
            }
        }
    }

    for id in &old_ids {
        if !new_ids.contains(id) {
            diff.to_remove.push(json!({ "id": id }));
        }
    }

    Ok(diff)
}

fn item_id(item: &Value) -> Option<&Value> {
    match item.get("id") {
        None | Some(Value::Null) => None,
        Some(id) => Some(id),
    }
}

/// The field names accepted by the relation's `update` → `data` input, when
/// the schema offers nested updates at all.
fn update_data_fields<'a>(
    snapshot: &'a Snapshot,
    relation_input: &str,
) -> Result<Option<BTreeSet<&'a str>>, SchemaError> {
    let Some(update_input) = snapshot.find_input_field(relation_input, "update")? else {
        return Ok(None);
    };
    let Some(update_name) = update_input.name.as_deref() else {
        return Ok(None);
    };
    let Some(data_input) = snapshot.find_input_field(update_name, "data")? else {
        return Ok(None);
    };
    Ok(input_field_names(snapshot, data_input.name.as_deref()))
}

/// The field names accepted by the relation's `create` input, if any.
fn create_fields<'a>(
    snapshot: &'a Snapshot,
    relation_input: &str,
) -> Result<Option<BTreeSet<&'a str>>, SchemaError> {
    let Some(create_input) = snapshot.find_input_field(relation_input, "create")? else {
        return Ok(None);
    };
    Ok(input_field_names(snapshot, create_input.name.as_deref()))
}

fn input_field_names<'a>(
    snapshot: &'a Snapshot,
    type_name: Option<&str>,
) -> Option<BTreeSet<&'a str>> {
    let ty = snapshot.get(type_name?)?;
    Some(ty.input_fields.iter().map(|input| input.name.as_str()).collect())
}

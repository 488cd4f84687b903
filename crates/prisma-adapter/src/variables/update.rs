//! UPDATE: the same walk as CREATE against `<Type>UpdateInput`, with the
//! previous snapshot in hand. Relation lists are diffed against their
//! previous value to produce the full connect/disconnect/update/create
//! bundle; object fields either update an embedded record in place or
//! reconnect by unique key; to-one relations can clear with `disconnect`.

use introspection_snapshot::{SchemaError, Snapshot, Type};
use serde_json::{json, Value};

use crate::{
    diff::diff_relation, error::Skip, policy::AdapterPolicy, resource::Resource, JsonObject,
};

use super::{
    classify_list, connect_reference, id_objects, is_truthy, resource_declares_field, ListClass,
    MutationKind, Variables,
};

pub(super) fn build_update(
    snapshot: &Snapshot,
    policy: &AdapterPolicy,
    resource: &Resource,
    data: &JsonObject,
    previous_data: &JsonObject,
) -> Result<Variables, SchemaError> {
    let update_input = format!("{}UpdateInput", resource.type_name());
    let mut where_clause = JsonObject::new();
    let mut values = JsonObject::new();

    for (raw_key, value) in data {
        if let Some(items) = value.as_array() {
            // A collection can only be diffed against its previous value.
            let Some(previous) = previous_data.get(raw_key) else {
                Skip::ParamShapeMismatch { field: raw_key, reason: "no previous value to diff against" }
                    .log();
                continue;
            };
            let Some(previous_items) = previous.as_array() else {
                Skip::ParamShapeMismatch { field: raw_key, reason: "previous value is not a list" }
                    .log();
                continue;
            };

            let (key, new_items, old_items) = match raw_key.strip_suffix("Ids") {
                Some(stem) => (stem, id_objects(items), id_objects(previous_items)),
                None => (raw_key.as_str(), items.clone(), previous_items.clone()),
            };

            match classify_list(snapshot, &update_input, key, MutationKind::Update)? {
                ListClass::Undeclared => {}
                ListClass::ScalarList => {
                    values.insert(key.to_owned(), json!({ "set": new_items }));
                }
                ListClass::Relation { input_type } => {
                    let diff = diff_relation(snapshot, &input_type, &old_items, &new_items)?;
                    let nested_writes = policy.allows_nested_writes(resource.type_name());
                    let update = if nested_writes { diff.to_update } else { Vec::new() };
                    let create = if nested_writes { diff.to_create } else { Vec::new() };
                    values.insert(
                        key.to_owned(),
                        json!({
                            "connect": diff.to_add,
                            "disconnect": diff.to_remove,
                            "update": update,
                            "create": create,
                        }),
                    );
                }
            }
        } else if let Some(nested) = value.as_object() {
            if let Some(embedded) = policy.embedded_update(resource.type_name(), raw_key) {
                let embedded_data =
                    build_embedded_update(snapshot, policy, embedded, nested, previous_data, raw_key)?;
                values.insert(raw_key.clone(), json!({ "update": embedded_data }));
            } else if let Some(matched) = connect_reference(snapshot, &update_input, raw_key, nested)? {
                values.insert(raw_key.clone(), json!({ "connect": matched }));
            }
        } else {
            let input_type = snapshot
                .find_input_field(&update_input, raw_key)?
                .and_then(|input| input.name.as_deref());

            if input_type.is_some_and(|name| policy.clears_with_disconnect(name)) {
                // An object that became a non-object is a disconnect; any
                // other transition through this input sends nothing.
                let was_object = previous_data.get(raw_key).is_some_and(Value::is_object);
                let verb = if was_object { json!({ "disconnect": true }) } else { json!({}) };
                values.insert(raw_key.clone(), verb);
            } else if raw_key == "id" && is_truthy(value) {
                where_clause.insert("id".into(), value.clone());
            } else if resource_declares_field(snapshot, resource, raw_key) {
                values.insert(raw_key.clone(), value.clone());
            } else {
                Skip::SchemaLookupMiss { type_name: resource.type_name(), field: raw_key }.log();
            }
        }
    }

    let rewrites = policy.raw_id_list_rewrites(resource.type_name());
    if !rewrites.is_empty() {
        // The rewritten shape carries its identifier inside `data`.
        if let Some(id) = where_clause.remove("id") {
            values.insert("id".into(), id);
        }
        for rewrite in rewrites {
            values.remove(&rewrite.scalar_field);
            match data.get(&rewrite.source_param) {
                Some(raw) => {
                    values.insert(rewrite.relation_field.clone(), raw.clone());
                }
                None => {
                    values.remove(&rewrite.relation_field);
                }
            }
        }
        let mut variables = JsonObject::new();
        variables.insert("data".into(), Value::Object(values));
        return Ok(Variables(variables));
    }

    let mut variables = JsonObject::new();
    if !where_clause.is_empty() {
        variables.insert("where".into(), Value::Object(where_clause));
    }
    if !values.is_empty() {
        variables.insert("data".into(), Value::Object(values));
    }

    Ok(Variables(variables))
}

/// Re-enters the update walk for an embedded record (a to-one object the
/// API updates in place rather than reconnects), returning the nested
/// `data` payload. The embedded record's own id routes into the nested
/// `where` and is discarded.
fn build_embedded_update(
    snapshot: &Snapshot,
    policy: &AdapterPolicy,
    embedded_type: &str,
    data: &JsonObject,
    previous_data: &JsonObject,
    field: &str,
) -> Result<Value, SchemaError> {
    let ty = snapshot
        .get(embedded_type)
        .cloned()
        .unwrap_or_else(|| Type::empty_object(embedded_type));
    let embedded_resource = Resource::new(embedded_type, ty);

    let previous = previous_data
        .get(field)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let nested = build_update(snapshot, policy, &embedded_resource, data, &previous)?;
    Ok(nested
        .0
        .get("data")
        .cloned()
        .unwrap_or_else(|| Value::Object(JsonObject::new())))
}

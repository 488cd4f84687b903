//! CREATE: walks `params.data` against the resource's `<Type>CreateInput`,
//! emitting `set` for value lists, `connect`/`create` bundles for relation
//! lists, a unique-key `connect` for nested objects, and verbatim scalars
//! for declared columns. Unrecognized keys are dropped.

use introspection_snapshot::{SchemaError, Snapshot};
use serde_json::{json, Value};

use crate::{
    diff::diff_relation, error::Skip, policy::AdapterPolicy, resource::Resource, JsonObject,
};

use super::{
    classify_list, connect_reference, id_objects, is_truthy, resource_declares_field, ListClass,
    MutationKind, Variables,
};

pub(super) fn build_create(
    snapshot: &Snapshot,
    policy: &AdapterPolicy,
    resource: &Resource,
    data: &JsonObject,
) -> Result<Variables, SchemaError> {
    let create_input = format!("{}CreateInput", resource.type_name());
    let mut where_clause = JsonObject::new();
    let mut values = JsonObject::new();

    for (raw_key, value) in data {
        if let Some(items) = value.as_array() {
            // An `<X>Ids` key is shorthand for relation `<X>` given as ids.
            let (key, items) = match raw_key.strip_suffix("Ids") {
                Some(stem) => (stem, id_objects(items)),
                None => (raw_key.as_str(), items.clone()),
            };

            match classify_list(snapshot, &create_input, key, MutationKind::Create)? {
                ListClass::Undeclared => {}
                ListClass::ScalarList => {
                    values.insert(key.to_owned(), json!({ "set": items }));
                }
                ListClass::Relation { input_type } => {
                    let diff = diff_relation(snapshot, &input_type, &[], &items)?;
                    let create = if policy.allows_nested_writes(resource.type_name()) {
                        diff.to_create
                    } else {
                        Vec::new()
                    };
                    values.insert(
                        key.to_owned(),
                        json!({ "connect": diff.to_add, "create": create }),
                    );
                }
            }
        } else if let Some(nested) = value.as_object() {
            if let Some(matched) = connect_reference(snapshot, &create_input, raw_key, nested)? {
                values.insert(raw_key.clone(), json!({ "connect": matched }));
            }
        } else if raw_key == "id" && is_truthy(value) {
            where_clause.insert("id".into(), value.clone());
        } else if resource_declares_field(snapshot, resource, raw_key) {
            values.insert(raw_key.clone(), value.clone());
        } else {
            Skip::SchemaLookupMiss { type_name: resource.type_name(), field: raw_key }.log();
        }
    }

    // Some resources take their id-list relations as raw scalar arrays.
    let rewrites = policy.raw_id_list_rewrites(resource.type_name());
    if !rewrites.is_empty() {
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

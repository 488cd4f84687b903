//! The schema-driven variables compiler.
//!
//! One dispatch per operation kind; every arm is a pure function of the
//! snapshot, the policy, the resource and the validated params. The read
//! operations are a line or two each; the interesting work lives in
//! [`list`] (filter rewriting) and [`create`]/[`update`] (the per-field walk
//! deciding between scalar pass-through and the nested mutation verbs).

mod create;
mod list;
mod update;

use std::ops::{Deref, DerefMut};

use introspection_snapshot::{SchemaError, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::Skip,
    operation::Params,
    policy::AdapterPolicy,
    resource::Resource,
    JsonObject,
};

/// The variables payload matching a built document's declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Variables(pub JsonObject);

impl Variables {
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl Deref for Variables {
    type Target = JsonObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Variables {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Variables> for Value {
    fn from(variables: Variables) -> Self {
        variables.into_value()
    }
}

pub(crate) fn build(
    snapshot: &Snapshot,
    policy: &AdapterPolicy,
    resource: &Resource,
    params: &Params,
) -> Result<Variables, SchemaError> {
    match params {
        Params::GetList { filter, pagination, sort } => {
            list::build_get_list(snapshot, policy, resource, filter, *pagination, sort)
        }
        Params::GetMany { ids } => {
            let mut variables = JsonObject::new();
            variables.insert("where".into(), json!({ "id_in": ids }));
            Ok(Variables(variables))
        }
        Params::GetManyReference { target, id, sort } => {
            let reference = target.split('.').next().unwrap_or(target.as_str());
            let mut where_clause = JsonObject::new();
            where_clause.insert(reference.to_owned(), json!({ "id": id }));
            let mut variables = JsonObject::new();
            variables.insert("where".into(), Value::Object(where_clause));
            if let Some(sort) = sort {
                variables.insert("orderBy".into(), json!(format!("{}_{}", sort.field, sort.order)));
            }
            Ok(Variables(variables))
        }
        Params::GetOne { id } | Params::Delete { id } => {
            let mut variables = JsonObject::new();
            variables.insert("where".into(), json!({ "id": id }));
            Ok(Variables(variables))
        }
        Params::Create { data } => create::build_create(snapshot, policy, resource, data),
        Params::Update { data, previous_data } => {
            update::build_update(snapshot, policy, resource, data, previous_data)
        }
    }
}

/// Distinguishes the two mutation walks where the schema probes differ:
/// CREATE decides scalar lists by the presence of a `set` field, UPDATE by
/// the absence of `connect`. The upstream schema is inconsistent enough that
/// the two probes disagree on real types, so both are preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MutationKind {
    Create,
    Update,
}

/// How an array-valued params entry maps onto the mutation input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListClass {
    /// A plain value list, written through `set`.
    ScalarList,
    /// A relation list, written through the nested mutation verbs.
    Relation { input_type: String },
    /// Nothing on the mutation input accepts the key.
    Undeclared,
}

pub(crate) fn classify_list(
    snapshot: &Snapshot,
    mutation_input: &str,
    key: &str,
    kind: MutationKind,
) -> Result<ListClass, SchemaError> {
    let Some(relation_input) = snapshot.find_input_field(mutation_input, key)? else {
        Skip::SchemaLookupMiss { type_name: mutation_input, field: key }.log();
        return Ok(ListClass::Undeclared);
    };
    let Some(input_type) = relation_input.name.as_deref() else {
        return Ok(ListClass::Undeclared);
    };

    let scalar = match kind {
        MutationKind::Create => snapshot.input_field_exists(input_type, "set")?,
        MutationKind::Update => !snapshot.input_field_exists(input_type, "connect")?,
    };

    if scalar {
        Ok(ListClass::ScalarList)
    } else {
        Ok(ListClass::Relation { input_type: input_type.to_owned() })
    }
}

/// Resolves an object-valued params entry to the unique key accepted by the
/// relation's `connect` input: `{id: "x", name: "y"}` becomes `{id: "x"}`
/// when `id` is the connectable key. Only the first accepted key is kept.
pub(crate) fn connect_reference(
    snapshot: &Snapshot,
    mutation_input: &str,
    field: &str,
    value: &JsonObject,
) -> Result<Option<JsonObject>, SchemaError> {
    let Some(relation_input) = snapshot.find_input_field(mutation_input, field)? else {
        Skip::SchemaLookupMiss { type_name: mutation_input, field }.log();
        return Ok(None);
    };
    let Some(relation_name) = relation_input.name.as_deref() else {
        return Ok(None);
    };
    let Some(connect_input) = snapshot.find_input_field(relation_name, "connect")? else {
        Skip::SchemaLookupMiss { type_name: relation_name, field: "connect" }.log();
        return Ok(None);
    };
    let Some(connect_name) = connect_input.name.as_deref() else {
        return Ok(None);
    };

    for (key, unique) in value {
        if snapshot.input_field_exists(connect_name, key)? {
            let mut matched = JsonObject::new();
            matched.insert(key.clone(), unique.clone());
            return Ok(Some(matched));
        }
    }

    Ok(None)
}

/// Scalar pass-through consults the resource's object type as found in the
/// snapshot by name, not the registered descriptor.
pub(crate) fn resource_declares_field(snapshot: &Snapshot, resource: &Resource, key: &str) -> bool {
    snapshot
        .get(resource.type_name())
        .map(|ty| ty.field(key).is_some())
        .unwrap_or(false)
}

/// Coerces a raw id list into the `[{id}]` shape relation walks expect.
pub(crate) fn id_objects(ids: &[Value]) -> Vec<Value> {
    ids.iter().map(|id| json!({ "id": id })).collect()
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! GET_LIST: rewrites the caller's filter into the resource's where-input
//! vocabulary and attaches pagination and ordering.

use introspection_snapshot::{SchemaError, Snapshot};
use serde_json::{json, Value};

use crate::{
    operation::{Pagination, Sort},
    policy::AdapterPolicy,
    resource::Resource,
    JsonObject,
};

use super::{is_truthy, Variables};

pub(super) fn build_get_list(
    snapshot: &Snapshot,
    policy: &AdapterPolicy,
    resource: &Resource,
    filter: &JsonObject,
    pagination: Pagination,
    sort: &Sort,
) -> Result<Variables, SchemaError> {
    let where_input = format!("{}WhereInput", resource.type_name());
    let mut where_clause = JsonObject::new();

    for (key, value) in filter {
        // `ids` is the framework's shorthand for an identifier filter.
        if key == "ids" {
            where_clause.insert("id_in".into(), value.clone());
            continue;
        }

        // An array filter on a declared relation means "any of these ids".
        if value.is_array() {
            if snapshot.input_field_exists(&where_input, key)? {
                where_clause.insert(key.clone(), json!({ "id_in": value }));
                continue;
            }
        } else if let Some(nested) = value.as_object() {
            // Object filters go through the relation's `_some` quantifier
            // when the where-input has one, each sub-key as an `_in` match.
            let some_key = format!("{key}_some");
            if snapshot.input_field_exists(&where_input, &some_key)? {
                let mut some_filter = JsonObject::new();
                for (sub_key, sub_value) in nested {
                    some_filter.insert(format!("{sub_key}_in"), sub_value.clone());
                }
                where_clause.insert(some_key, Value::Object(some_filter));
                continue;
            }
        }

        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() > 1 {
            let head = parts[0];

            if parts[1] == "id" {
                let some_key = format!("{head}_some");
                if snapshot.input_field_exists(&where_input, &some_key)? {
                    where_clause.insert(some_key, json!({ "id": value }));
                } else {
                    where_clause.insert(head.to_owned(), json!({ "id": value }));
                }
                continue;
            }

            // Dotted keys on a numeric field carry stringly-typed values.
            if let Some(field) = resource.ty.field(head) {
                let parsed = match field.ty.named_type_name() {
                    Some("Int") => parse_int(value),
                    Some("Float") => parse_float(value),
                    _ => None,
                };
                if let Some(parsed) = parsed {
                    where_clause.insert(key.clone(), parsed);
                    continue;
                }
            }
        }

        where_clause.insert(key.clone(), value.clone());
    }

    // Soft-deleted records stay out of listings unless the caller filters on
    // status explicitly.
    if !where_clause.contains_key("status") {
        if let Some(status_not) = snapshot.find_input_field(&where_input, "status_not")? {
            let default = status_not
                .name
                .as_deref()
                .and_then(|enum_name| policy.status_not_default(enum_name));
            if let Some(default) = default {
                where_clause.insert("status_not".into(), Value::String(default.to_owned()));
            }
        }
    }

    let mut variables = JsonObject::new();
    variables.insert(
        "skip".into(),
        json!(pagination.page.saturating_sub(1) * pagination.per_page),
    );
    variables.insert("first".into(), json!(pagination.per_page));
    variables.insert("orderBy".into(), json!(format!("{}_{}", sort.field, sort.order)));

    for flag in policy.hoisted_filter_flags(resource.type_name()) {
        if where_clause.get(flag).is_some_and(is_truthy) {
            where_clause.remove(flag);
            variables.insert(flag.clone(), Value::Bool(true));
        }
    }

    variables.insert("where".into(), Value::Object(where_clause));

    Ok(Variables(variables))
}

fn parse_int(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

//! The seven data-provider operation kinds and their typed params.
//!
//! Callers usually hold an untyped params bag shaped by the resource
//! framework; [`Params::from_json`] validates it into the matching variant at
//! the boundary so the builders never probe for keys that were promised by
//! the operation's contract. Missing *optional* data inside a validated bag
//! (say, a `previousData` entry for one field) is still handled gracefully
//! downstream.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::{error::Error, JsonObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetList,
    GetOne,
    GetMany,
    GetManyReference,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::GetList => "GET_LIST",
            OperationKind::GetOne => "GET_ONE",
            OperationKind::GetMany => "GET_MANY",
            OperationKind::GetManyReference => "GET_MANY_REFERENCE",
            OperationKind::Create => "CREATE",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
        }
    }

    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            OperationKind::Create | OperationKind::Update | OperationKind::Delete
        )
    }

    /// The list-shaped reads sharing the `items`/`total` document layout.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            OperationKind::GetList | OperationKind::GetMany | OperationKind::GetManyReference
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page: u64,
    #[serde(rename = "perPage")]
    pub per_page: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: String,
}

/// Operation params, one variant per [`OperationKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    GetList {
        filter: JsonObject,
        pagination: Pagination,
        sort: Sort,
    },
    GetOne {
        id: Value,
    },
    GetMany {
        ids: Vec<Value>,
    },
    GetManyReference {
        target: String,
        id: Value,
        sort: Option<Sort>,
    },
    Create {
        data: JsonObject,
    },
    Update {
        data: JsonObject,
        previous_data: JsonObject,
    },
    Delete {
        id: Value,
    },
}

impl Params {
    pub fn kind(&self) -> OperationKind {
        match self {
            Params::GetList { .. } => OperationKind::GetList,
            Params::GetOne { .. } => OperationKind::GetOne,
            Params::GetMany { .. } => OperationKind::GetMany,
            Params::GetManyReference { .. } => OperationKind::GetManyReference,
            Params::Create { .. } => OperationKind::Create,
            Params::Update { .. } => OperationKind::Update,
            Params::Delete { .. } => OperationKind::Delete,
        }
    }

    /// Validates an untyped params bag into the shape `kind` requires.
    pub fn from_json(kind: OperationKind, params: Value) -> Result<Self, Error> {
        let mut bag = match params {
            Value::Object(map) => map,
            other => return Err(invalid(kind, format!("expected an object, got {other}"))),
        };

        match kind {
            OperationKind::GetList => Ok(Params::GetList {
                filter: take_object(&mut bag, kind, "filter")?.unwrap_or_default(),
                pagination: take_required(&mut bag, kind, "pagination")?,
                sort: take_required(&mut bag, kind, "sort")?,
            }),
            OperationKind::GetOne => Ok(Params::GetOne {
                id: take_value(&mut bag, kind, "id")?,
            }),
            OperationKind::GetMany => {
                let ids = match take_value(&mut bag, kind, "ids")? {
                    Value::Array(ids) => ids,
                    other => return Err(invalid(kind, format!("`ids` must be an array, got {other}"))),
                };
                Ok(Params::GetMany { ids })
            }
            OperationKind::GetManyReference => {
                let target = match take_value(&mut bag, kind, "target")? {
                    Value::String(target) => target,
                    other => {
                        return Err(invalid(kind, format!("`target` must be a string, got {other}")))
                    }
                };
                let sort = match bag.remove("sort") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(
                        serde_json::from_value(value)
                            .map_err(|err| invalid(kind, format!("`sort`: {err}")))?,
                    ),
                };
                Ok(Params::GetManyReference {
                    target,
                    id: take_value(&mut bag, kind, "id")?,
                    sort,
                })
            }
            OperationKind::Create => Ok(Params::Create {
                data: take_object(&mut bag, kind, "data")?
                    .ok_or_else(|| invalid(kind, "`data` is required".to_owned()))?,
            }),
            OperationKind::Update => Ok(Params::Update {
                data: take_object(&mut bag, kind, "data")?
                    .ok_or_else(|| invalid(kind, "`data` is required".to_owned()))?,
                previous_data: take_object(&mut bag, kind, "previousData")?.unwrap_or_default(),
            }),
            OperationKind::Delete => Ok(Params::Delete {
                id: take_value(&mut bag, kind, "id")?,
            }),
        }
    }
}

fn invalid(kind: OperationKind, reason: String) -> Error {
    Error::InvalidParams { kind, reason }
}

fn take_value(bag: &mut JsonObject, kind: OperationKind, key: &str) -> Result<Value, Error> {
    bag.remove(key)
        .ok_or_else(|| invalid(kind, format!("`{key}` is required")))
}

fn take_object(
    bag: &mut JsonObject,
    kind: OperationKind,
    key: &str,
) -> Result<Option<JsonObject>, Error> {
    match bag.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(invalid(kind, format!("`{key}` must be an object, got {other}"))),
    }
}

fn take_required<T: serde::de::DeserializeOwned>(
    bag: &mut JsonObject,
    kind: OperationKind,
    key: &str,
) -> Result<T, Error> {
    let value = take_value(bag, kind, key)?;
    serde_json::from_value(value).map_err(|err| invalid(kind, format!("`{key}`: {err}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validates_every_operation_kind() {
        let params = Params::from_json(
            OperationKind::GetList,
            json!({
                "filter": { "q": "foo" },
                "pagination": { "page": 2, "perPage": 25 },
                "sort": { "field": "name", "order": "ASC" }
            }),
        )
        .unwrap();
        assert_eq!(params.kind(), OperationKind::GetList);

        let params =
            Params::from_json(OperationKind::GetMany, json!({ "ids": ["a", "b"] })).unwrap();
        assert_eq!(params, Params::GetMany { ids: vec![json!("a"), json!("b")] });

        let params = Params::from_json(
            OperationKind::GetManyReference,
            json!({ "target": "author.id", "id": "author1" }),
        )
        .unwrap();
        assert!(matches!(params, Params::GetManyReference { sort: None, .. }));

        let params = Params::from_json(
            OperationKind::Update,
            json!({ "data": { "title": "Foo" } }),
        )
        .unwrap();
        // An absent previousData is an empty snapshot, not an error.
        assert!(matches!(
            params,
            Params::Update { ref previous_data, .. } if previous_data.is_empty()
        ));

        assert_eq!(
            Params::from_json(OperationKind::Delete, json!({ "id": "post1" })).unwrap(),
            Params::Delete { id: json!("post1") }
        );
    }

    #[test]
    fn rejects_missing_required_members() {
        let err = Params::from_json(OperationKind::GetList, json!({ "filter": {} })).unwrap_err();
        assert!(err.to_string().contains("pagination"));

        let err = Params::from_json(OperationKind::Create, json!({})).unwrap_err();
        assert!(err.to_string().contains("data"));

        let err = Params::from_json(OperationKind::GetMany, json!({ "ids": "nope" })).unwrap_err();
        assert!(err.to_string().contains("ids"));

        let err = Params::from_json(OperationKind::Delete, json!("post1")).unwrap_err();
        assert!(matches!(err, Error::InvalidParams { kind: OperationKind::Delete, .. }));
    }
}

//! A read-only index over a GraphQL type-system introspection snapshot.
//!
//! The snapshot is the standard `__schema` shape: a flat list of types, each
//! carrying its kind, fields and input fields, with `NON_NULL`/`LIST`
//! wrapping expressed through nested `ofType` references. Nothing here talks
//! to a server; the snapshot is decoded once and then only queried.
//!
//! Lookups distinguish two failure modes. A type or field that simply isn't
//! declared is an expected outcome (`Ok(None)`) that callers branch on. A
//! wrapper type with no inner type means the snapshot itself is corrupt and
//! is reported as a [`SchemaError`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{kind} wrapper is missing its inner type")]
    MissingInnerType { kind: TypeKind },
    #[error("malformed introspection document: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
            TypeKind::List => "LIST",
            TypeKind::NonNull => "NON_NULL",
        }
    }

    /// `LIST` and `NON_NULL` carry an `ofType` instead of a name.
    pub fn is_wrapper(self) -> bool {
        matches!(self, TypeKind::List | TypeKind::NonNull)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a type, possibly through wrapper kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Unwraps `NON_NULL` and `LIST` wrappers until a named type is reached.
    pub fn named_type(&self) -> Result<&TypeRef, SchemaError> {
        let mut current = self;
        while current.kind.is_wrapper() {
            current = current
                .of_type
                .as_deref()
                .ok_or(SchemaError::MissingInnerType { kind: current.kind })?;
        }
        Ok(current)
    }

    /// The name of the type behind any wrappers, when the chain is intact.
    pub fn named_type_name(&self) -> Option<&str> {
        self.named_type().ok().and_then(|ty| ty.name.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub args: Vec<InputValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub fields: Vec<Field>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub input_fields: Vec<InputValue>,
}

impl Type {
    /// An empty object type, for resources whose descriptor isn't in the
    /// snapshot.
    pub fn empty_object(name: impl Into<String>) -> Self {
        Type {
            kind: TypeKind::Object,
            name: name.into(),
            fields: Vec::new(),
            input_fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn input_field(&self, name: &str) -> Option<&InputValue> {
        self.input_fields.iter().find(|input| input.name == name)
    }
}

/// The immutable name → type index built from an introspection document.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    types: IndexMap<String, Type>,
}

impl Snapshot {
    /// Indexes the given types by name. Duplicate names keep the first
    /// definition.
    pub fn new(types: impl IntoIterator<Item = Type>) -> Self {
        let mut index = IndexMap::new();
        for ty in types {
            index.entry(ty.name.clone()).or_insert(ty);
        }
        Snapshot { types: index }
    }

    /// Decodes a snapshot from an introspection document. Accepts the full
    /// `{"data": {"__schema": ...}}` response, a bare `{"__schema": ...}`
    /// object, or the `{"types": [...]}` payload itself.
    pub fn from_introspection(value: serde_json::Value) -> Result<Self, SchemaError> {
        let payload: SchemaPayload = serde_json::from_value(unwrap_envelopes(value))?;
        Ok(Snapshot::new(payload.types))
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up `field` on the input object named `type_name` and resolves
    /// the field's type to its final named reference. Absence of the type or
    /// the field is an expected outcome, not an error.
    pub fn find_input_field(
        &self,
        type_name: &str,
        field: &str,
    ) -> Result<Option<&TypeRef>, SchemaError> {
        let Some(ty) = self.get(type_name) else {
            return Ok(None);
        };
        let Some(input) = ty.input_field(field) else {
            return Ok(None);
        };
        input.ty.named_type().map(Some)
    }

    pub fn input_field_exists(&self, type_name: &str, field: &str) -> Result<bool, SchemaError> {
        Ok(self.find_input_field(type_name, field)?.is_some())
    }
}

impl FromIterator<Type> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Type>>(iter: I) -> Self {
        Snapshot::new(iter)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let payload = SchemaPayload::deserialize(deserializer)?;
        Ok(Snapshot::new(payload.types))
    }
}

#[derive(Deserialize)]
struct SchemaPayload {
    #[serde(deserialize_with = "nullable_vec")]
    types: Vec<Type>,
}

fn unwrap_envelopes(mut value: serde_json::Value) -> serde_json::Value {
    for key in ["data", "__schema"] {
        if let Some(inner) = value.get_mut(key) {
            value = inner.take();
        }
    }
    value
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "types": [
                {
                    "kind": "INPUT_OBJECT",
                    "name": "PostWhereInput",
                    "inputFields": [
                        {
                            "name": "tags_some",
                            "type": { "kind": "INPUT_OBJECT", "name": "TagWhereInput" }
                        },
                        {
                            "name": "id_in",
                            "type": {
                                "kind": "LIST",
                                "ofType": {
                                    "kind": "NON_NULL",
                                    "ofType": { "kind": "SCALAR", "name": "ID" }
                                }
                            }
                        }
                    ]
                },
                {
                    "kind": "OBJECT",
                    "name": "Post",
                    "fields": [
                        { "name": "id", "type": { "kind": "SCALAR", "name": "ID" } }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn resolves_through_wrappers() {
        let ty: TypeRef = serde_json::from_value(json!({
            "kind": "NON_NULL",
            "ofType": {
                "kind": "LIST",
                "ofType": {
                    "kind": "NON_NULL",
                    "ofType": { "kind": "SCALAR", "name": "ID" }
                }
            }
        }))
        .unwrap();

        let named = ty.named_type().unwrap();
        assert_eq!(named.kind, TypeKind::Scalar);
        assert_eq!(named.name.as_deref(), Some("ID"));
        assert_eq!(ty.named_type_name(), Some("ID"));
    }

    #[test]
    fn broken_wrapper_chain_is_fatal() {
        let ty = TypeRef {
            kind: TypeKind::NonNull,
            name: None,
            of_type: None,
        };

        assert!(matches!(
            ty.named_type(),
            Err(SchemaError::MissingInnerType {
                kind: TypeKind::NonNull
            })
        ));
    }

    #[test]
    fn finds_input_fields_behind_wrappers() {
        let snapshot = snapshot();

        let field = snapshot
            .find_input_field("PostWhereInput", "id_in")
            .unwrap()
            .expect("declared field");
        assert_eq!(field.name.as_deref(), Some("ID"));

        assert!(snapshot.input_field_exists("PostWhereInput", "tags_some").unwrap());
    }

    #[test]
    fn absent_type_or_field_is_not_an_error() {
        let snapshot = snapshot();

        assert!(snapshot.find_input_field("MissingInput", "id").unwrap().is_none());
        assert!(snapshot.find_input_field("PostWhereInput", "missing").unwrap().is_none());
        // An object type has no input fields to find.
        assert!(snapshot.find_input_field("Post", "id").unwrap().is_none());
    }

    #[test]
    fn duplicate_type_names_keep_the_first_definition() {
        let snapshot = Snapshot::new([
            Type {
                kind: TypeKind::Scalar,
                name: "Clash".into(),
                fields: Vec::new(),
                input_fields: Vec::new(),
            },
            Type::empty_object("Clash"),
        ]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("Clash").unwrap().kind, TypeKind::Scalar);
    }

    #[test]
    fn decodes_every_envelope_shape() {
        let payload = json!({
            "types": [
                { "kind": "SCALAR", "name": "ID", "fields": null, "inputFields": null }
            ]
        });

        for document in [
            json!({ "data": { "__schema": payload.clone() } }),
            json!({ "__schema": payload.clone() }),
            payload,
        ] {
            let snapshot = Snapshot::from_introspection(document).unwrap();
            assert!(snapshot.get("ID").is_some());
        }

        assert!(matches!(
            Snapshot::from_introspection(json!({ "no_types": true })),
            Err(SchemaError::Decode(_))
        ));
    }
}

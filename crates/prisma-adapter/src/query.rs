//! Assembles the GraphQL document for an operation: a selection set derived
//! from the resource's object type, argument declarations mirroring the
//! introspected root field, and the per-kind top-level shape (`items`/`total`
//! aliasing for list reads, `data` aliasing otherwise).
//!
//! The AST is `graphql_parser`'s query document, built with default
//! positions and printed through its `Display` impl.

use graphql_parser::query as ast;
use introspection_snapshot::{Field, SchemaError, Snapshot, Type, TypeKind, TypeRef};

use crate::{
    operation::OperationKind,
    resource::{Resource, ResourceRegistry},
    JsonObject,
};

pub type QueryDocument = ast::Document<'static, String>;
pub type AstType = ast::Type<'static, String>;
pub type AstValue = ast::Value<'static, String>;
pub type AstSelection = ast::Selection<'static, String>;
pub type AstVariableDefinition = ast::VariableDefinition<'static, String>;

/// Maps an introspected type reference onto the AST type syntax, keeping
/// `!` and `[...]` wrapping intact (`[ID!]`, `Int!`, ...).
pub fn arg_type(ty: &TypeRef) -> Result<AstType, SchemaError> {
    let inner = || {
        ty.of_type
            .as_deref()
            .ok_or(SchemaError::MissingInnerType { kind: ty.kind })
    };

    Ok(match ty.kind {
        TypeKind::NonNull => AstType::NonNullType(Box::new(arg_type(inner()?)?)),
        TypeKind::List => AstType::ListType(Box::new(arg_type(inner()?)?)),
        _ => AstType::NamedType(ty.name.clone().unwrap_or_default()),
    })
}

/// The operation's typed variable declarations, one per root-field argument
/// whose name appears as a key of the variables map. The value may well be
/// null; only key presence matters.
pub fn variable_definitions(
    query: &Field,
    variables: &JsonObject,
) -> Result<Vec<AstVariableDefinition>, SchemaError> {
    query
        .args
        .iter()
        .filter(|arg| variables.contains_key(&arg.name))
        .map(|arg| {
            Ok(ast::VariableDefinition {
                position: Default::default(),
                name: arg.name.clone(),
                var_type: arg_type(&arg.ty)?,
                default_value: None,
            })
        })
        .collect()
}

/// The call-site bindings matching [`variable_definitions`], same filter,
/// same order.
pub fn call_arguments(query: &Field, variables: &JsonObject) -> Vec<(String, AstValue)> {
    query
        .args
        .iter()
        .filter(|arg| variables.contains_key(&arg.name))
        .map(|arg| (arg.name.clone(), ast::Value::Variable(arg.name.clone())))
        .collect()
}

/// Selects the resource's fields for an operation.
///
/// Scalar fields are kept unless internal (`_`-prefixed name or type) or the
/// identifier of a DELETE, which selects it separately. Object fields either
/// collapse to `{id}` when their type is a registered resource, or expand one
/// level into the linked type's own scalar fields.
pub fn selection_fields(
    snapshot: &Snapshot,
    resources: &ResourceRegistry,
    fields: &[Field],
    kind: OperationKind,
) -> Result<Vec<AstSelection>, SchemaError> {
    let mut selections = Vec::new();

    for field in fields {
        if kind == OperationKind::Delete && field.name == "id" {
            continue;
        }

        let named = field.ty.named_type()?;
        let type_name = named.name.as_deref().unwrap_or_default();
        if field.name.starts_with('_') || type_name.starts_with('_') {
            continue;
        }

        if named.kind != TypeKind::Object {
            selections.push(scalar_field(&field.name));
            continue;
        }

        if resources.contains_type(type_name) {
            selections.push(object_field(&field.name, vec![scalar_field("id")]));
            continue;
        }

        let Some(linked) = snapshot.get(type_name) else {
            tracing::debug!(type_name, "linked type not in snapshot, skipping field");
            continue;
        };
        let nested = linked_scalar_fields(linked)?;
        if !nested.is_empty() {
            selections.push(object_field(&field.name, nested));
        }
    }

    Ok(selections)
}

/// One level only: the linked type's scalar fields, nothing deeper.
fn linked_scalar_fields(linked: &Type) -> Result<Vec<AstSelection>, SchemaError> {
    let mut selections = Vec::new();

    for field in &linked.fields {
        let named = field.ty.named_type()?;
        let type_name = named.name.as_deref().unwrap_or_default();
        if field.name.starts_with('_') || type_name.starts_with('_') {
            continue;
        }
        if named.kind == TypeKind::Object {
            continue;
        }
        selections.push(scalar_field(&field.name));
    }

    Ok(selections)
}

pub fn build_document(
    snapshot: &Snapshot,
    resources: &ResourceRegistry,
    resource: &Resource,
    query: &Field,
    kind: OperationKind,
    variables: &JsonObject,
) -> Result<QueryDocument, SchemaError> {
    let variable_definitions = variable_definitions(query, variables)?;
    let arguments = call_arguments(query, variables);
    let fields = selection_fields(snapshot, resources, &resource.ty.fields, kind)?;

    let items = match kind {
        OperationKind::GetList | OperationKind::GetMany | OperationKind::GetManyReference => vec![
            aliased_field("items", &query.name, arguments.clone(), fields),
            aliased_field(
                "total",
                &format!("{}Connection", query.name),
                arguments,
                vec![object_field("aggregate", vec![scalar_field("count")])],
            ),
        ],
        OperationKind::GetOne | OperationKind::Create | OperationKind::Update => {
            vec![aliased_field("data", &query.name, arguments, fields)]
        }
        OperationKind::Delete => {
            vec![aliased_field("data", &query.name, arguments, vec![scalar_field("id")])]
        }
    };
    let selection_set = selection_set(items);

    let operation = if kind.is_mutation() {
        ast::OperationDefinition::Mutation(ast::Mutation {
            position: Default::default(),
            name: Some(query.name.clone()),
            variable_definitions,
            directives: Vec::new(),
            selection_set,
        })
    } else {
        ast::OperationDefinition::Query(ast::Query {
            position: Default::default(),
            name: Some(query.name.clone()),
            variable_definitions,
            directives: Vec::new(),
            selection_set,
        })
    };

    Ok(ast::Document {
        definitions: vec![ast::Definition::Operation(operation)],
    })
}

fn selection_set(items: Vec<AstSelection>) -> ast::SelectionSet<'static, String> {
    ast::SelectionSet {
        span: (Default::default(), Default::default()),
        items,
    }
}

fn scalar_field(name: &str) -> AstSelection {
    ast::Selection::Field(ast::Field {
        position: Default::default(),
        alias: None,
        name: name.to_owned(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: selection_set(Vec::new()),
    })
}

fn object_field(name: &str, items: Vec<AstSelection>) -> AstSelection {
    ast::Selection::Field(ast::Field {
        position: Default::default(),
        alias: None,
        name: name.to_owned(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: selection_set(items),
    })
}

fn aliased_field(
    alias: &str,
    name: &str,
    arguments: Vec<(String, AstValue)>,
    items: Vec<AstSelection>,
) -> AstSelection {
    ast::Selection::Field(ast::Field {
        position: Default::default(),
        alias: Some(alias.to_owned()),
        name: name.to_owned(),
        arguments,
        directives: Vec::new(),
        selection_set: selection_set(items),
    })
}

//! Document building: argument declarations, field selection and the
//! per-operation top-level shapes, asserted against the printed query text.

use graphql_parser::query as ast;
use prisma_adapter::{
    query::{arg_type, call_arguments, variable_definitions},
    Field, OperationBuilder, OperationKind, Resource, ResourceRegistry, Snapshot, Type, TypeRef,
};
use serde_json::{json, Value};

fn type_ref(value: Value) -> TypeRef {
    serde_json::from_value(value).expect("valid type ref fixture")
}

fn snapshot() -> Snapshot {
    serde_json::from_value(json!({
        "types": [
            {
                "kind": "OBJECT",
                "name": "linkedType",
                "fields": [
                    { "name": "foo", "type": { "kind": "SCALAR", "name": "bar" } }
                ]
            }
        ]
    }))
    .expect("valid snapshot fixture")
}

fn resources() -> ResourceRegistry {
    ResourceRegistry::new([Resource::new("Resource", Type::empty_object("resourceType"))])
}

fn command_resource() -> Resource {
    Resource::new(
        "Command",
        serde_json::from_value(json!({
            "kind": "OBJECT",
            "name": "Command",
            "fields": [
                { "name": "foo", "type": { "kind": "SCALAR", "name": "String" } },
                { "name": "foo1", "type": { "kind": "SCALAR", "name": "_foo" } },
                { "name": "_private", "type": { "kind": "SCALAR", "name": "String" } },
                { "name": "linked", "type": { "kind": "OBJECT", "name": "linkedType" } },
                { "name": "resource", "type": { "kind": "OBJECT", "name": "resourceType" } }
            ]
        }))
        .expect("valid type fixture"),
    )
}

fn query_field(name: &str) -> Field {
    serde_json::from_value(json!({
        "name": name,
        "type": { "kind": "OBJECT", "name": "Command" },
        "args": [
            {
                "name": "foo",
                "type": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "Int" } }
            },
            { "name": "barId", "type": { "kind": "SCALAR", "name": "ID" } },
            {
                "name": "barIds",
                "type": {
                    "kind": "LIST",
                    "ofType": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "ID" } }
                }
            },
            { "name": "bar", "type": { "kind": "SCALAR", "name": "String" } }
        ]
    }))
    .expect("valid query field fixture")
}

fn build(kind: OperationKind, query_name: &str) -> String {
    let snapshot = snapshot();
    let resources = resources();
    let builder = OperationBuilder::new(&snapshot, &resources);

    let variables = match json!({ "foo": "foo_value" }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };

    builder
        .build_document(&command_resource(), &query_field(query_name), kind, &variables)
        .expect("document build")
        .to_string()
}

#[test]
fn arg_type_preserves_wrapping() {
    let named = |name: &str| ast::Type::NamedType(name.to_owned());

    assert_eq!(
        arg_type(&type_ref(json!({ "kind": "SCALAR", "name": "foo" }))).unwrap(),
        named("foo")
    );
    assert_eq!(
        arg_type(&type_ref(json!({
            "kind": "NON_NULL",
            "ofType": { "kind": "SCALAR", "name": "ID" }
        })))
        .unwrap(),
        ast::Type::NonNullType(Box::new(named("ID")))
    );
    assert_eq!(
        arg_type(&type_ref(json!({
            "kind": "LIST",
            "ofType": { "kind": "SCALAR", "name": "ID" }
        })))
        .unwrap(),
        ast::Type::ListType(Box::new(named("ID")))
    );
    // [ID!]
    assert_eq!(
        arg_type(&type_ref(json!({
            "kind": "LIST",
            "ofType": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "ID" } }
        })))
        .unwrap(),
        ast::Type::ListType(Box::new(ast::Type::NonNullType(Box::new(named("ID")))))
    );
}

#[test]
fn argument_lists_filter_on_key_presence_and_stay_aligned() {
    let query = query_field("commands");
    let variables = match json!({ "foo": "foo_value", "barId": 100, "barIds": [101, 102], "unknown": true }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };

    let declarations = variable_definitions(&query, &variables).unwrap();
    let bindings = call_arguments(&query, &variables);

    let declared: Vec<&str> = declarations.iter().map(|def| def.name.as_str()).collect();
    let bound: Vec<&str> = bindings.iter().map(|(name, _)| name.as_str()).collect();

    // Same filter, same order; `bar` has no params key, `unknown` no arg.
    assert_eq!(declared, ["foo", "barId", "barIds"]);
    assert_eq!(declared, bound);

    assert_eq!(
        declarations[2].var_type,
        ast::Type::ListType(Box::new(ast::Type::NonNullType(Box::new(
            ast::Type::NamedType("ID".to_owned())
        ))))
    );

    // A key may be present with a falsy value and still count.
    let variables = match json!({ "foo": null }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    assert_eq!(variable_definitions(&query, &variables).unwrap().len(), 1);
}

#[test]
fn get_list_selects_items_and_a_count_aggregate() {
    insta::assert_snapshot!(build(OperationKind::GetList, "commands"), @r###"
    query commands($foo: Int!) {
      items: commands(foo: $foo) {
        foo
        linked {
          foo
        }
        resource {
          id
        }
      }
      total: commandsConnection(foo: $foo) {
        aggregate {
          count
        }
      }
    }
    "###);
}

#[test]
fn get_many_uses_the_list_shape() {
    insta::assert_snapshot!(build(OperationKind::GetMany, "commands"), @r###"
    query commands($foo: Int!) {
      items: commands(foo: $foo) {
        foo
        linked {
          foo
        }
        resource {
          id
        }
      }
      total: commandsConnection(foo: $foo) {
        aggregate {
          count
        }
      }
    }
    "###);
}

#[test]
fn get_many_reference_uses_the_list_shape() {
    insta::assert_snapshot!(build(OperationKind::GetManyReference, "commands"), @r###"
    query commands($foo: Int!) {
      items: commands(foo: $foo) {
        foo
        linked {
          foo
        }
        resource {
          id
        }
      }
      total: commandsConnection(foo: $foo) {
        aggregate {
          count
        }
      }
    }
    "###);
}

#[test]
fn get_one_aliases_the_record_as_data() {
    insta::assert_snapshot!(build(OperationKind::GetOne, "getCommand"), @r###"
    query getCommand($foo: Int!) {
      data: getCommand(foo: $foo) {
        foo
        linked {
          foo
        }
        resource {
          id
        }
      }
    }
    "###);
}

#[test]
fn update_is_a_mutation_with_the_data_alias() {
    insta::assert_snapshot!(build(OperationKind::Update, "updateCommand"), @r###"
    mutation updateCommand($foo: Int!) {
      data: updateCommand(foo: $foo) {
        foo
        linked {
          foo
        }
        resource {
          id
        }
      }
    }
    "###);
}

#[test]
fn create_is_a_mutation_with_the_data_alias() {
    insta::assert_snapshot!(build(OperationKind::Create, "createCommand"), @r###"
    mutation createCommand($foo: Int!) {
      data: createCommand(foo: $foo) {
        foo
        linked {
          foo
        }
        resource {
          id
        }
      }
    }
    "###);
}

#[test]
fn delete_selects_only_the_identifier() {
    insta::assert_snapshot!(build(OperationKind::Delete, "deleteCommand"), @r###"
    mutation deleteCommand($foo: Int!) {
      data: deleteCommand(foo: $foo) {
        id
      }
    }
    "###);
}

#[test]
fn built_operations_pair_document_and_variables() {
    let snapshot = snapshot();
    let resources = resources();
    let builder = OperationBuilder::new(&snapshot, &resources);

    let params = prisma_adapter::Params::from_json(OperationKind::Delete, json!({ "id": "post1" }))
        .expect("valid params");
    let operation = builder
        .build(&command_resource(), &query_field("deleteCommand"), &params)
        .expect("operation build");

    assert_eq!(operation.variables.into_value(), json!({ "where": { "id": "post1" } }));
    insta::assert_snapshot!(operation.document.to_string(), @r###"
    mutation deleteCommand {
      data: deleteCommand {
        id
      }
    }
    "###);
}

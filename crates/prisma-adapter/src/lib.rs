//! Translates CRUD-style data-provider operations into GraphQL documents
//! and variables for an API following the Prisma nested-mutation convention
//! (`connect`/`disconnect`/`set`/`update`/`create`), driven entirely by an
//! introspection snapshot of that API.
//!
//! Two engines do the work, both reading the same [`Snapshot`] and neither
//! calling the other: the variables builder compiles a flat params bag into
//! the nested mutation-input tree the schema expects, and the query builder
//! assembles the matching document. [`OperationBuilder::build`] runs both
//! and pairs the results; transport is someone else's job.
//!
//! ```
//! use prisma_adapter::{OperationBuilder, OperationKind, Params, Resource, ResourceRegistry, Snapshot};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), prisma_adapter::Error> {
//! let snapshot: Snapshot = serde_json::from_value(json!({
//!     "types": [{
//!         "kind": "OBJECT",
//!         "name": "Post",
//!         "fields": [
//!             { "name": "id", "type": { "kind": "SCALAR", "name": "ID" } },
//!             { "name": "title", "type": { "kind": "SCALAR", "name": "String" } }
//!         ]
//!     }]
//! })).expect("static fixture");
//!
//! let post = snapshot.get("Post").expect("declared above").clone();
//! let resources = ResourceRegistry::new([Resource::new("Post", post.clone())]);
//! let query: prisma_adapter::Field = serde_json::from_value(json!({
//!     "name": "post",
//!     "type": { "kind": "OBJECT", "name": "Post" },
//!     "args": [{ "name": "where", "type": { "kind": "INPUT_OBJECT", "name": "PostWhereUniqueInput" } }]
//! })).expect("static fixture");
//!
//! let builder = OperationBuilder::new(&snapshot, &resources);
//! let params = Params::from_json(OperationKind::GetOne, json!({ "id": "post1" }))?;
//! let operation = builder.build(&Resource::new("Post", post), &query, &params)?;
//!
//! assert_eq!(operation.variables.into_value(), json!({ "where": { "id": "post1" } }));
//! # Ok(())
//! # }
//! ```

pub mod diff;
mod error;
pub mod operation;
pub mod policy;
pub mod query;
pub mod resource;
pub mod variables;

pub use error::Error;
pub use introspection_snapshot::{
    Field, InputValue, SchemaError, Snapshot, Type, TypeKind, TypeRef,
};
pub use operation::{OperationKind, Pagination, Params, Sort};
pub use policy::{AdapterPolicy, RawIdListRewrite};
pub use query::QueryDocument;
pub use resource::{Resource, ResourceRegistry};
pub use variables::Variables;

pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// A ready-to-execute operation: the printable document and the variables
/// matching its declarations.
#[derive(Debug, Clone)]
pub struct BuiltOperation {
    pub document: QueryDocument,
    pub variables: Variables,
}

/// Builds operations against one introspected schema and resource registry.
///
/// Both inputs are read-only; building is pure and deterministic, so a
/// builder is freely shared and reused.
#[derive(Debug)]
pub struct OperationBuilder<'a> {
    snapshot: &'a Snapshot,
    resources: &'a ResourceRegistry,
    policy: AdapterPolicy,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(snapshot: &'a Snapshot, resources: &'a ResourceRegistry) -> Self {
        OperationBuilder {
            snapshot,
            resources,
            policy: AdapterPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AdapterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the document and variables for one operation. The variables
    /// are built first; the document's argument lists are filtered to the
    /// variables actually produced.
    pub fn build(
        &self,
        resource: &Resource,
        query: &Field,
        params: &Params,
    ) -> Result<BuiltOperation, Error> {
        let variables = self.build_variables(resource, params)?;
        let document = query::build_document(
            self.snapshot,
            self.resources,
            resource,
            query,
            params.kind(),
            &variables,
        )?;
        Ok(BuiltOperation { document, variables })
    }

    pub fn build_variables(&self, resource: &Resource, params: &Params) -> Result<Variables, Error> {
        variables::build(self.snapshot, &self.policy, resource, params).map_err(Error::from)
    }

    /// Builds only the document, against an externally supplied variables
    /// map (keys drive the argument presence filter).
    pub fn build_document(
        &self,
        resource: &Resource,
        query: &Field,
        kind: OperationKind,
        variables: &JsonObject,
    ) -> Result<QueryDocument, Error> {
        query::build_document(self.snapshot, self.resources, resource, query, kind, variables)
            .map_err(Error::from)
    }
}

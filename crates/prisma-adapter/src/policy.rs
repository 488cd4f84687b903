//! Per-deployment behavior the adapter cannot derive from the schema alone.
//!
//! The upstream API this adapter was written against carries a handful of
//! conventions that are policy, not schema: which types accept nested
//! writes, which enums have a soft-delete status to exclude from listings,
//! and a few fields with bespoke wire shapes. They are all injectable here
//! so the builders stay schema-generic; [`AdapterPolicy::default`]
//! reproduces the original deployment, [`AdapterPolicy::empty`] disables
//! every special case.

use std::collections::{BTreeMap, BTreeSet};

/// Replaces a scalar field and a relation field of one resource with the raw
/// id list supplied under `source_param`, bypassing the relation logic.
#[derive(Debug, Clone)]
pub struct RawIdListRewrite {
    /// Field dropped from the built data.
    pub scalar_field: String,
    /// Field overwritten with the raw id list.
    pub relation_field: String,
    /// Params key holding the raw id list.
    pub source_param: String,
}

#[derive(Debug, Clone)]
pub struct AdapterPolicy {
    nested_write_types: BTreeSet<String>,
    status_not_defaults: BTreeMap<String, String>,
    hoisted_filter_flags: BTreeMap<String, Vec<String>>,
    embedded_updates: BTreeMap<(String, String), String>,
    clear_disconnect_inputs: BTreeSet<String>,
    raw_id_list_rewrites: BTreeMap<String, Vec<RawIdListRewrite>>,
}

impl Default for AdapterPolicy {
    fn default() -> Self {
        AdapterPolicy::empty()
            .with_nested_write_type("LabTest")
            .with_nested_write_type("Batch")
            .with_nested_write_type("Brand")
            .with_status_not_default("ResourceStatus", "TRASH")
            .with_status_not_default("UserStatus", "DEACTIVE")
            .with_hoisted_filter_flag("Product", "has_duplicate")
            .with_embedded_update("User", "meta", "UserMeta")
            .with_clear_disconnect_input("AssetUpdateOneInput")
            .with_raw_id_list_rewrite(
                "ProductType",
                RawIdListRewrite {
                    scalar_field: "sub_type".into(),
                    relation_field: "sub_types".into(),
                    source_param: "sub_typeIds".into(),
                },
            )
            .with_raw_id_list_rewrite(
                "ProductType",
                RawIdListRewrite {
                    scalar_field: "consumption_methods".into(),
                    relation_field: "consumption_methods".into(),
                    source_param: "consumption_methodsIds".into(),
                },
            )
    }
}

impl AdapterPolicy {
    pub fn empty() -> Self {
        AdapterPolicy {
            nested_write_types: BTreeSet::new(),
            status_not_defaults: BTreeMap::new(),
            hoisted_filter_flags: BTreeMap::new(),
            embedded_updates: BTreeMap::new(),
            clear_disconnect_inputs: BTreeSet::new(),
            raw_id_list_rewrites: BTreeMap::new(),
        }
    }

    /// Whether to-many relations of `type_name` emit real `update`/`create`
    /// lists; other types send empty lists for those verbs.
    pub fn allows_nested_writes(&self, type_name: &str) -> bool {
        self.nested_write_types.contains(type_name)
    }

    pub fn with_nested_write_type(mut self, type_name: impl Into<String>) -> Self {
        self.nested_write_types.insert(type_name.into());
        self
    }

    /// The `status_not` value injected into list filters when the where-input
    /// declares the field through the given enum and no explicit `status`
    /// filter was supplied.
    pub fn status_not_default(&self, enum_name: &str) -> Option<&str> {
        self.status_not_defaults.get(enum_name).map(String::as_str)
    }

    pub fn with_status_not_default(
        mut self,
        enum_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.status_not_defaults.insert(enum_name.into(), value.into());
        self
    }

    /// Filter keys hoisted out of `where` to a top-level `true` variable
    /// when their value is truthy (non-null, non-false, non-zero, non-empty).
    pub fn hoisted_filter_flags(&self, type_name: &str) -> &[String] {
        self.hoisted_filter_flags
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn with_hoisted_filter_flag(
        mut self,
        type_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.hoisted_filter_flags
            .entry(type_name.into())
            .or_default()
            .push(key.into());
        self
    }

    /// The type updated in place when the given object-valued field is seen
    /// on an UPDATE, wrapped as `{field: {update: {...}}}`.
    pub fn embedded_update(&self, type_name: &str, field: &str) -> Option<&str> {
        self.embedded_updates
            .get(&(type_name.to_owned(), field.to_owned()))
            .map(String::as_str)
    }

    pub fn with_embedded_update(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        embedded_type: impl Into<String>,
    ) -> Self {
        self.embedded_updates
            .insert((type_name.into(), field.into()), embedded_type.into());
        self
    }

    /// To-one update inputs where an object → non-object transition emits
    /// `{disconnect: true}` instead of a value.
    pub fn clears_with_disconnect(&self, input_type: &str) -> bool {
        self.clear_disconnect_inputs.contains(input_type)
    }

    pub fn with_clear_disconnect_input(mut self, input_type: impl Into<String>) -> Self {
        self.clear_disconnect_inputs.insert(input_type.into());
        self
    }

    pub fn raw_id_list_rewrites(&self, type_name: &str) -> &[RawIdListRewrite] {
        self.raw_id_list_rewrites
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn with_raw_id_list_rewrite(
        mut self,
        type_name: impl Into<String>,
        rewrite: RawIdListRewrite,
    ) -> Self {
        self.raw_id_list_rewrites
            .entry(type_name.into())
            .or_default()
            .push(rewrite);
        self
    }
}

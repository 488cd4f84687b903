use introspection_snapshot::SchemaError;

use crate::operation::OperationKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid {kind} params: {reason}")]
    InvalidParams { kind: OperationKind, reason: String },
}

/// Why a params entry was left out of the built variables.
///
/// Both causes collapse to "skip the field" in the output; they are kept
/// distinct so the log line says whether the schema or the caller's params
/// were the odd one out.
#[derive(Debug)]
pub(crate) enum Skip<'a> {
    SchemaLookupMiss { type_name: &'a str, field: &'a str },
    ParamShapeMismatch { field: &'a str, reason: &'static str },
}

impl Skip<'_> {
    pub(crate) fn log(self) {
        match self {
            Skip::SchemaLookupMiss { type_name, field } => {
                tracing::debug!(type_name, field, "schema does not declare the field, skipping");
            }
            Skip::ParamShapeMismatch { field, reason } => {
                tracing::debug!(field, reason, "params are missing expected data, skipping");
            }
        }
    }
}

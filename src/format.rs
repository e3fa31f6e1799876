//! Response body shaping.
//!
//! Builds the final JSON-serializable map from an execution outcome:
//! `data` appears iff the data-present flag is set (even when the value is
//! null), `errors` iff the list is non-empty, `extensions` iff the engine
//! attached a payload.

use serde_json::{Map, Value};

use crate::engine::{ExecutionResult, GraphQLError};

/// Execution outcome plus whether a `data` key should be emitted at all.
///
/// `is_data_present == false` marks failure paths where no `data` key belongs
/// in the response, as opposed to an executed request whose data is null.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultData {
    pub is_data_present: bool,
    pub result: ExecutionResult,
}

impl ResultData {
    pub fn executed(result: ExecutionResult) -> Self {
        Self {
            is_data_present: true,
            result,
        }
    }

    pub fn failed(errors: Vec<GraphQLError>) -> Self {
        Self {
            is_data_present: false,
            result: ExecutionResult::from_errors(errors),
        }
    }
}

/// Shape the outcome into the response map, applying the pluggable per-error
/// formatter.
pub fn format_result(
    data: &ResultData,
    format_error: &dyn Fn(&GraphQLError) -> Map<String, Value>,
) -> Value {
    let mut map = Map::new();

    if data.is_data_present {
        map.insert(
            "data".into(),
            data.result.data.clone().unwrap_or(Value::Null),
        );
    }

    if !data.result.errors.is_empty() {
        let errors = data
            .result
            .errors
            .iter()
            .map(|error| Value::Object(format_error(error)))
            .collect();
        map.insert("errors".into(), Value::Array(errors));
    }

    if let Some(extensions) = &data.result.extensions {
        map.insert("extensions".into(), extensions.clone());
    }

    Value::Object(map)
}

//! Query-string side of request extraction.
//!
//! `query` and `operationName` are taken verbatim; `variables` must be JSON
//! text for an object. The reserved `raw` parameter (value ignored) opts the
//! request out of explorer rendering and is inspected separately by the
//! explorer negotiator.

use serde_json::{Map, Value};

use crate::error::RouteError;
use crate::request::GraphQLRequest;

/// Parse the raw query string into a partial request.
pub fn parse_query_string(raw_query: &str) -> Result<GraphQLRequest, RouteError> {
    let mut query = None;
    let mut operation_name = None;
    let mut variables = None;

    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        match key.as_ref() {
            "query" => query = Some(value.into_owned()),
            "operationName" => operation_name = Some(value.into_owned()),
            "variables" => variables = Some(parse_variables(&value)?),
            _ => {}
        }
    }

    Ok(GraphQLRequest {
        query,
        operation_name,
        variables,
    })
}

/// True if the query string carries the reserved `raw` parameter.
pub fn has_raw_flag(raw_query: &str) -> bool {
    url::form_urlencoded::parse(raw_query.as_bytes()).any(|(key, _)| key == "raw")
}

fn parse_variables(text: &str) -> Result<Map<String, Value>, RouteError> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(RouteError::InvalidVariablesJson),
    }
}

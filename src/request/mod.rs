//! GraphQL request extraction.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → body.rs (charset decode, content-type branch)
//!     → params.rs (query-string fields, raw flag)
//!     → merge (query string wins per field)
//!     → effective GraphQLRequest
//! ```
//!
//! # Design Decisions
//! - Body and query string are parsed independently and merged field-by-field
//! - Query-string values take precedence, so interactive UIs can override a
//!   POSTed body via the URL

pub mod body;
pub mod params;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use axum::body::Bytes;
use axum::http::request::Parts;

use crate::error::RouteError;

/// A normalized GraphQL request: the three transport-level fields, each
/// optional because they may arrive via either the body or the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLRequest {
    pub query: Option<String>,

    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    pub variables: Option<Map<String, Value>>,
}

impl GraphQLRequest {
    /// Merge two partial requests; `self` wins wherever both carry a field.
    pub fn merge(self, fallback: GraphQLRequest) -> GraphQLRequest {
        GraphQLRequest {
            query: self.query.or(fallback.query),
            operation_name: self.operation_name.or(fallback.operation_name),
            variables: self.variables.or(fallback.variables),
        }
    }
}

/// Extract the effective request from the URL and the raw body.
pub async fn parse_graphql_request(
    parts: &Parts,
    body: Bytes,
) -> Result<GraphQLRequest, RouteError> {
    let from_body = body::parse_body(parts.headers.get(axum::http::header::CONTENT_TYPE), body).await?;
    let from_params = params::parse_query_string(parts.uri.query().unwrap_or(""))?;
    Ok(from_params.merge(from_body))
}

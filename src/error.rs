//! Route-level error taxonomy.
//!
//! Every failure in the pipeline is a `RouteError` value threaded back
//! through `Result`; a single terminal step maps it to an HTTP status, an
//! optional `Allow` header and a GraphQL-shaped error list.

use axum::http::StatusCode;
use thiserror::Error;

use crate::engine::{GraphQLError, OperationKind};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("POST body sent invalid JSON.")]
    InvalidBodyJson,

    #[error("Variables are invalid JSON.")]
    InvalidVariablesJson,

    #[error("Must provide query string.")]
    MissingQuery,

    #[error("GraphQL only supports GET and POST requests.")]
    MethodNotAllowed,

    #[error("Can only perform a {kind} operation from a POST request.")]
    MutationOnGet { kind: OperationKind },

    /// Bad or missing operationName among multiple operations. Carries the
    /// engine-facing message verbatim.
    #[error("{0}")]
    UnknownOperation(String),

    /// Query text failed to parse.
    #[error("{}", .0.message)]
    Syntax(GraphQLError),

    /// Schema rule violations; one request can carry many.
    #[error("document failed validation")]
    Validation(Vec<GraphQLError>),

    /// The setup callback failed.
    #[error("{0}")]
    Setup(String),

    #[error("{0}")]
    Internal(String),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::InvalidBodyJson
            | RouteError::InvalidVariablesJson
            | RouteError::MissingQuery
            | RouteError::UnknownOperation(_)
            | RouteError::Syntax(_)
            | RouteError::Validation(_) => StatusCode::BAD_REQUEST,
            RouteError::MethodNotAllowed | RouteError::MutationOnGet { .. } => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            RouteError::Setup(_) | RouteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `Allow` header the response must carry, if any.
    pub fn allow(&self) -> Option<&'static str> {
        match self {
            RouteError::MethodNotAllowed => Some("GET, POST"),
            RouteError::MutationOnGet { .. } => Some("POST"),
            _ => None,
        }
    }

    /// The structured error list for the response body.
    pub fn into_errors(self) -> Vec<GraphQLError> {
        match self {
            RouteError::Syntax(error) => vec![error],
            RouteError::Validation(errors) => errors,
            RouteError::Setup(message) | RouteError::Internal(message) => {
                let message = if message.is_empty() {
                    "Internal server error".to_owned()
                } else {
                    message
                };
                vec![GraphQLError::new(message)]
            }
            other => vec![GraphQLError::new(other.to_string())],
        }
    }
}

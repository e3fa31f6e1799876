//! Execution engine boundary.
//!
//! # Responsibilities
//! - Define the collaborator interface the route drives (parse, validate, execute)
//! - Define the wire-level value types shared with the engine
//!
//! # Design Decisions
//! - The engine owns its schema and document representation; the route only
//!   needs operation names and kinds for HTTP-method validation
//! - `execute` is async so slow resolvers suspend instead of blocking

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::GraphQLRequest;

/// A source position attached to a GraphQL error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A GraphQL error in the specification shape: `message` plus optional
/// `locations`, `path` and `extensions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Location>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.locations.push(Location { line, column });
        self
    }

    /// The default per-error output shape: the specification map with empty
    /// `locations` and absent `path`/`extensions` omitted.
    pub fn to_specification(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut map = Map::new();
                map.insert("message".into(), Value::String(self.message.clone()));
                map
            }
        }
    }
}

/// The kind of a top-level operation definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and kind of one operation definition in a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    pub name: Option<String>,
    pub kind: OperationKind,
}

/// Input handed to [`Engine::execute`], assembled from the effective request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionInput {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
}

impl ExecutionInput {
    /// Build execution input from a request known to carry a query.
    pub fn from_request(request: &GraphQLRequest) -> Self {
        Self {
            query: request.query.clone().unwrap_or_default(),
            operation_name: request.operation_name.clone(),
            variables: request.variables.clone().unwrap_or_default(),
        }
    }
}

/// What the engine produced: top-level data, field errors and the optional
/// out-of-band extensions payload, all passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
    pub extensions: Option<Value>,
}

impl ExecutionResult {
    /// A result carrying only errors, no data.
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self {
            data: None,
            errors,
            extensions: None,
        }
    }
}

/// The GraphQL execution engine the route is mounted over.
///
/// The route never inspects documents beyond what [`Engine::operations`]
/// reports; parsing, validation and execution semantics belong entirely to
/// the implementation.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// The engine's parsed document representation.
    type Document: Send + Sync;

    /// Parse query text into a document, or return a syntax error.
    fn parse(&self, query: &str) -> Result<Self::Document, GraphQLError>;

    /// List the top-level operation definitions of a parsed document.
    fn operations(&self, document: &Self::Document) -> Vec<OperationInfo>;

    /// Run schema validation rules; an empty list means the document is valid.
    fn validate(&self, document: &Self::Document) -> Vec<GraphQLError>;

    /// Execute the request against the schema.
    async fn execute(&self, input: ExecutionInput) -> ExecutionResult;
}

//! GraphQL-over-HTTP binding for axum.
//!
//! Mounts a caller-supplied execution engine on a single route serving GET
//! and POST: request extraction from query string, JSON or raw GraphQL
//! bodies, method policy, optional GraphiQL explorer negotiation, and
//! spec-shaped JSON results.

pub mod config;
pub mod engine;
pub mod error;
pub mod explorer;
pub mod format;
pub mod handler;
pub mod request;
pub mod route;

pub use config::{GraphQLConfig, SetupError};
pub use engine::{
    Engine, ExecutionInput, ExecutionResult, GraphQLError, Location, OperationInfo, OperationKind,
};
pub use error::RouteError;
pub use request::GraphQLRequest;
pub use route::{graphql, graphql_with_setup};

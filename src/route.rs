//! Route mounting.
//!
//! Builds an axum `MethodRouter` for a single GraphQL path. The router
//! answers every HTTP method itself so the pipeline can reject non-GET/POST
//! requests with a proper `Allow` header instead of axum's bare 405.

use std::sync::Arc;

use axum::extract::State;
use axum::http::request::Parts;
use axum::response::Response;
use axum::routing::{any, MethodRouter};

use crate::config::{GraphQLConfig, SetupError, SetupFn};
use crate::engine::Engine;
use crate::handler::RequestHandler;
use crate::request::GraphQLRequest;

/// Mount a GraphQL engine with default configuration.
///
/// ```ignore
/// let app = Router::new().route("/graphql", graphql(engine));
/// ```
pub fn graphql<E: Engine>(engine: E) -> MethodRouter {
    route(RequestHandler::new(engine, None))
}

/// Mount a GraphQL engine with a per-request setup callback. The callback
/// sees the request head and the parsed GraphQL request and returns the
/// configuration to use for this request.
pub fn graphql_with_setup<E, F>(engine: E, setup: F) -> MethodRouter
where
    E: Engine,
    F: Fn(&Parts, &GraphQLRequest) -> Result<GraphQLConfig, SetupError> + Send + Sync + 'static,
{
    let setup: SetupFn = Arc::new(setup);
    route(RequestHandler::new(engine, Some(setup)))
}

fn route<E: Engine>(handler: RequestHandler<E>) -> MethodRouter {
    any(handle::<E>).with_state(Arc::new(handler))
}

async fn handle<E: Engine>(
    State(handler): State<Arc<RequestHandler<E>>>,
    request: axum::extract::Request,
) -> Response {
    handler.handle(request).await
}

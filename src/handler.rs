//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → collect body, parse request (body + query string merge)
//!     → resolve config (setup callback; best-effort retry with an empty
//!       request when parsing or the callback itself failed)
//!     → query present? → method policy → parse document → resolve operation
//!     → mutation-via-GET check → validate → execute (engine or override)
//!     → status selection → format → JSON or explorer HTML
//! ```
//!
//! # Design Decisions
//! - Every stage returns `Result<_, RouteError>`; one terminal step maps the
//!   error to status, `Allow` header and body
//! - Explorer-bound requests skip execution when the query is absent or a
//!   mutation arrives via GET; the page renders with a null result
//! - Null or absent top-level data after execution downgrades the status to
//!   500 while keeping the error list intact

use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::request::Parts;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::config::{GraphQLConfig, SetupFn};
use crate::engine::{Engine, ExecutionInput, OperationInfo, OperationKind};
use crate::error::RouteError;
use crate::explorer;
use crate::format::{format_result, ResultData};
use crate::request::{parse_graphql_request, GraphQLRequest};

/// Drives one HTTP request through the pipeline. Shared across requests;
/// holds only the engine and the setup callback, both immutable.
pub struct RequestHandler<E: Engine> {
    engine: Arc<E>,
    setup: Option<SetupFn>,
}

impl<E: Engine> RequestHandler<E> {
    pub fn new(engine: E, setup: Option<SetupFn>) -> Self {
        Self {
            engine: Arc::new(engine),
            setup,
        }
    }

    pub async fn handle(&self, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();

        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read request body");
                let config = self.resolve_config(&parts, &GraphQLRequest::default())
                    .unwrap_or_default();
                return self.respond_error(
                    &parts,
                    &GraphQLRequest::default(),
                    &config,
                    RouteError::Internal(err.to_string()),
                );
            }
        };

        let (request, config, early_error) = self.setup_request(&parts, bytes).await;
        let show_explorer = config.show_explorer && explorer::wants_explorer(&parts);

        let outcome = match early_error {
            Some(err) => Err(err),
            None => self.execute(&parts, &request, &config, show_explorer).await,
        };

        let (status, data, allow) = match outcome {
            Ok(Some(data)) => {
                // Null top-level data signals a runtime query error; the error
                // list still rides along in the payload.
                let status = if data.result.data.as_ref().map_or(true, Value::is_null) {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::OK
                };
                (status, Some(data), None)
            }
            Ok(None) => (StatusCode::OK, None, None),
            Err(err) => {
                let status = err.status();
                let allow = err.allow();
                tracing::debug!(%status, error = %err, "graphql request failed");
                (status, Some(ResultData::failed(err.into_errors())), allow)
            }
        };

        let formatted = data
            .as_ref()
            .map(|data| format_result(data, &*config.format_error));

        respond(status, allow, formatted, show_explorer, &config, &request)
    }

    /// Parse the request and resolve its config. Whatever fails, a config is
    /// always produced so explorer-mode and error-formatting preferences
    /// still apply to the error response.
    async fn setup_request(
        &self,
        parts: &Parts,
        body: Bytes,
    ) -> (GraphQLRequest, GraphQLConfig, Option<RouteError>) {
        match parse_graphql_request(parts, body).await {
            Ok(request) => match self.resolve_config(parts, &request) {
                Ok(config) => (request, config, None),
                Err(err) => {
                    let config = self
                        .resolve_config(parts, &GraphQLRequest::default())
                        .unwrap_or_default();
                    (request, config, Some(err))
                }
            },
            Err(err) => {
                let config = self
                    .resolve_config(parts, &GraphQLRequest::default())
                    .unwrap_or_default();
                (GraphQLRequest::default(), config, Some(err))
            }
        }
    }

    fn resolve_config(
        &self,
        parts: &Parts,
        request: &GraphQLRequest,
    ) -> Result<GraphQLConfig, RouteError> {
        match &self.setup {
            Some(setup) => setup(parts, request).map_err(|err| RouteError::Setup(err.to_string())),
            None => Ok(GraphQLConfig::default()),
        }
    }

    /// The linear pipeline from an effective request to an execution outcome.
    /// `Ok(None)` means execution was skipped for explorer rendering.
    async fn execute(
        &self,
        parts: &Parts,
        request: &GraphQLRequest,
        config: &GraphQLConfig,
        show_explorer: bool,
    ) -> Result<Option<ResultData>, RouteError> {
        let Some(query) = request.query.as_deref() else {
            if show_explorer {
                return Ok(None);
            }
            return Err(RouteError::MissingQuery);
        };

        check_method(&parts.method)?;

        let document = self.engine.parse(query).map_err(RouteError::Syntax)?;
        let operations = self.engine.operations(&document);
        let operation = resolve_operation(&operations, request.operation_name.as_deref())?;

        if parts.method == Method::GET && operation.kind != OperationKind::Query {
            if show_explorer {
                // Displayed in the explorer, never executed.
                return Ok(None);
            }
            return Err(RouteError::MutationOnGet {
                kind: operation.kind,
            });
        }

        let errors = self.engine.validate(&document);
        if !errors.is_empty() {
            return Err(RouteError::Validation(errors));
        }

        let result = match &config.execute_override {
            Some(execute) => execute(),
            None => {
                self.engine
                    .execute(ExecutionInput::from_request(request))
                    .await
            }
        };

        Ok(Some(ResultData::executed(result)))
    }

    fn respond_error(
        &self,
        parts: &Parts,
        request: &GraphQLRequest,
        config: &GraphQLConfig,
        err: RouteError,
    ) -> Response {
        let status = err.status();
        let allow = err.allow();
        let data = ResultData::failed(err.into_errors());
        let formatted = format_result(&data, &*config.format_error);
        let show_explorer = config.show_explorer && explorer::wants_explorer(parts);
        respond(status, allow, Some(formatted), show_explorer, config, request)
    }
}

fn check_method(method: &Method) -> Result<(), RouteError> {
    if method == Method::GET || method == Method::POST {
        Ok(())
    } else {
        Err(RouteError::MethodNotAllowed)
    }
}

/// Select "the" operation for HTTP-method validation. Execution itself
/// delegates operation selection to the engine.
fn resolve_operation<'a>(
    operations: &'a [OperationInfo],
    name: Option<&str>,
) -> Result<&'a OperationInfo, RouteError> {
    match name {
        Some(name) => operations
            .iter()
            .find(|operation| operation.name.as_deref() == Some(name))
            .ok_or_else(|| {
                RouteError::UnknownOperation(format!("Unknown operation named '{name}'."))
            }),
        None => {
            if operations.len() > 1 {
                return Err(RouteError::UnknownOperation(
                    "Must provide operation name if query contains multiple operations.".into(),
                ));
            }
            operations.first().ok_or_else(|| {
                RouteError::UnknownOperation("Must provide an operation.".into())
            })
        }
    }
}

/// Terminal state: exactly one of JSON body or explorer HTML.
fn respond(
    status: StatusCode,
    allow: Option<&'static str>,
    formatted: Option<Value>,
    show_explorer: bool,
    config: &GraphQLConfig,
    request: &GraphQLRequest,
) -> Response {
    let mut builder = axum::http::Response::builder().status(status);
    if let Some(allow) = allow {
        builder = builder.header(header::ALLOW, allow);
    }

    let result = if show_explorer {
        let html = (config.render_explorer)(formatted.as_ref(), request);
        builder
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Body::from(html))
    } else {
        // A missing result only happens on explorer paths, which were handled
        // above; an empty object keeps the JSON branch total.
        let body = formatted.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let json = serde_json::to_string(&body).unwrap_or_else(|_| "{}".to_owned());
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json))
    };

    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to build response");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

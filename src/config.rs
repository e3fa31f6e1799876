//! Per-request route configuration.
//!
//! A `GraphQLConfig` is produced fresh for each request, either from the
//! defaults or by a caller-supplied setup callback that sees the request
//! head and the parsed GraphQL request. When request parsing fails the
//! callback still runs with an empty request, so explorer and error-format
//! preferences apply to the error response too.

use std::fmt;
use std::sync::Arc;

use axum::http::request::Parts;
use serde_json::{Map, Value};

use crate::engine::{ExecutionResult, GraphQLError};
use crate::explorer;
use crate::request::GraphQLRequest;

/// Pluggable per-error output shape.
pub type ErrorFormatter = Arc<dyn Fn(&GraphQLError) -> Map<String, Value> + Send + Sync>;

/// Renders the explorer page from the pre-run result (if any) and the raw
/// parsed request, for pre-filling the UI.
pub type ExplorerRenderer = Arc<dyn Fn(Option<&Value>, &GraphQLRequest) -> String + Send + Sync>;

/// Replaces engine execution for this request.
pub type ExecuteOverride = Arc<dyn Fn() -> ExecutionResult + Send + Sync>;

pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-supplied per-request configuration hook.
pub type SetupFn =
    Arc<dyn Fn(&Parts, &GraphQLRequest) -> Result<GraphQLConfig, SetupError> + Send + Sync>;

#[derive(Clone)]
pub struct GraphQLConfig {
    pub(crate) format_error: ErrorFormatter,
    pub(crate) show_explorer: bool,
    pub(crate) execute_override: Option<ExecuteOverride>,
    pub(crate) render_explorer: ExplorerRenderer,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            format_error: Arc::new(GraphQLError::to_specification),
            show_explorer: false,
            execute_override: None,
            render_explorer: Arc::new(|result, request| {
                explorer::render::graphiql_html(result, request)
            }),
        }
    }
}

impl GraphQLConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable explorer rendering for requests that negotiate HTML.
    pub fn show_explorer(mut self, show: bool) -> Self {
        self.show_explorer = show;
        self
    }

    /// Replace the default specification-shape error formatter.
    pub fn format_error(
        mut self,
        formatter: impl Fn(&GraphQLError) -> Map<String, Value> + Send + Sync + 'static,
    ) -> Self {
        self.format_error = Arc::new(formatter);
        self
    }

    /// Bypass the engine and use this result instead.
    pub fn execute_override(
        mut self,
        execute: impl Fn() -> ExecutionResult + Send + Sync + 'static,
    ) -> Self {
        self.execute_override = Some(Arc::new(execute));
        self
    }

    /// Replace the default GraphiQL renderer.
    pub fn render_explorer(
        mut self,
        render: impl Fn(Option<&Value>, &GraphQLRequest) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render_explorer = Arc::new(render);
        self
    }
}

impl fmt::Debug for GraphQLConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLConfig")
            .field("show_explorer", &self.show_explorer)
            .field("execute_override", &self.execute_override.is_some())
            .finish_non_exhaustive()
    }
}

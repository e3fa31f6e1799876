//! Shared fixtures for integration tests: a deterministic test engine and a
//! real-listener server spin-up helper.

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::MethodRouter;
use axum::Router;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

use graphql_http::{
    graphql, Engine, ExecutionInput, ExecutionResult, GraphQLError, OperationInfo, OperationKind,
};

const KNOWN_FIELDS: &[&str] = &["test", "testBoolean", "thrower", "nonNullThrower", "writeTest"];

/// A hand-rolled engine over a fixed schema:
///
/// ```graphql
/// type Query {
///     test(who: String): String
///     testBoolean(value: Boolean): String
///     thrower: String
///     nonNullThrower: String!
/// }
/// type Mutation {
///     writeTest: Query
/// }
/// ```
///
/// Parsing is just enough GraphQL to split operation definitions and
/// top-level fields; execution resolves the fields deterministically.
pub struct TestEngine;

pub struct TestDocument {
    operations: Vec<(OperationInfo, String)>,
}

#[async_trait]
impl Engine for TestEngine {
    type Document = TestDocument;

    fn parse(&self, query: &str) -> Result<TestDocument, GraphQLError> {
        let mut operations = Vec::new();
        let mut rest = query.trim();
        if rest.is_empty() {
            return Err(GraphQLError::new("Syntax Error: Unexpected <EOF>.").at(1, 1));
        }

        while !rest.is_empty() {
            let (kind, name, after_head) = if rest.starts_with('{') {
                (OperationKind::Query, None, rest)
            } else {
                let end = ident_end(rest);
                let word = &rest[..end];
                let kind = match word {
                    "query" => OperationKind::Query,
                    "mutation" => OperationKind::Mutation,
                    "subscription" => OperationKind::Subscription,
                    _ => {
                        return Err(GraphQLError::new(format!(
                            "Syntax Error: Unexpected Name \"{word}\"."
                        ))
                        .at(1, 1))
                    }
                };

                let mut after = rest[end..].trim_start();
                let mut name = None;
                if after.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                    let end = ident_end(after);
                    name = Some(after[..end].to_owned());
                    after = after[end..].trim_start();
                }
                if after.starts_with('(') {
                    let close = matching(after, b'(', b')')?;
                    after = after[close + 1..].trim_start();
                }
                (kind, name, after)
            };

            if !after_head.starts_with('{') {
                return Err(GraphQLError::new("Syntax Error: Expected \"{\".").at(1, 1));
            }
            let close = matching(after_head, b'{', b'}')?;
            let selection = after_head[1..close].to_owned();
            operations.push((OperationInfo { name, kind }, selection));
            rest = after_head[close + 1..].trim_start();
        }

        Ok(TestDocument { operations })
    }

    fn operations(&self, document: &TestDocument) -> Vec<OperationInfo> {
        document.operations.iter().map(|(info, _)| info.clone()).collect()
    }

    fn validate(&self, document: &TestDocument) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        for (_, selection) in &document.operations {
            for field in field_names(selection) {
                if !KNOWN_FIELDS.contains(&field.as_str()) {
                    errors.push(
                        GraphQLError::new(format!(
                            "Cannot query field \"{field}\" on type \"Query\"."
                        ))
                        .at(1, 1),
                    );
                }
            }
        }
        errors
    }

    async fn execute(&self, input: ExecutionInput) -> ExecutionResult {
        let document = match self.parse(&input.query) {
            Ok(document) => document,
            Err(error) => return ExecutionResult::from_errors(vec![error]),
        };

        let selected = match input.operation_name.as_deref() {
            Some(name) => document
                .operations
                .iter()
                .find(|(info, _)| info.name.as_deref() == Some(name)),
            None => document.operations.first(),
        };
        let Some((_, selection)) = selected else {
            return ExecutionResult::from_errors(vec![GraphQLError::new("Unknown operation.")]);
        };

        let mut data = Map::new();
        let mut errors = Vec::new();
        let mut null_root = false;

        for (field, args) in top_level_fields(selection) {
            match field.as_str() {
                "test" => {
                    let who = arg_value("who", &args, &input.variables)
                        .unwrap_or_else(|| "World".to_owned());
                    data.insert(field, json!(format!("Hello {who}")));
                }
                "testBoolean" => {
                    let value = arg_value("value", &args, &input.variables)
                        .unwrap_or_else(|| "World".to_owned());
                    data.insert(field, json!(format!("Hello {value}")));
                }
                "thrower" => {
                    data.insert(field.clone(), Value::Null);
                    let mut error = GraphQLError::new("Throws!").at(1, 1);
                    error.path = Some(vec![json!(field)]);
                    errors.push(error);
                }
                "nonNullThrower" => {
                    // Error on a non-null field propagates to the root.
                    null_root = true;
                    let mut error = GraphQLError::new("Throws!").at(1, 1);
                    error.path = Some(vec![json!(field)]);
                    errors.push(error);
                }
                "writeTest" => {
                    data.insert(field, json!({"test": "Hello World"}));
                }
                _ => {}
            }
        }

        let data = if null_root {
            Some(Value::Null)
        } else {
            Some(Value::Object(data))
        };

        ExecutionResult {
            data,
            errors,
            extensions: None,
        }
    }
}

fn ident_end(text: &str) -> usize {
    text.find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(text.len())
}

fn matching(text: &str, open: u8, close: u8) -> Result<usize, GraphQLError> {
    let mut depth = 0i32;
    for (i, b) in text.bytes().enumerate() {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
    }
    Err(GraphQLError::new("Syntax Error: Expected Name, found <EOF>.").at(1, 1))
}

/// All field names in a selection, at any depth, skipping argument lists.
fn field_names(selection: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let bytes = selection.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '(' {
            match matching(&selection[i..], b'(', b')') {
                Ok(close) => i += close + 1,
                Err(_) => break,
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let end = i + ident_end(&selection[i..]);
            fields.push(selection[i..end].to_owned());
            i = end;
        } else {
            i += 1;
        }
    }
    fields
}

/// Top-level (field, argument-text) pairs of a selection set.
fn top_level_fields(selection: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let bytes = selection.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphabetic() || c == '_' {
            let end = i + ident_end(&selection[i..]);
            let name = selection[i..end].to_owned();
            i = end;
            while i < bytes.len() && (bytes[i] as char).is_whitespace() {
                i += 1;
            }
            let mut args = String::new();
            if i < bytes.len() && bytes[i] == b'(' {
                if let Ok(close) = matching(&selection[i..], b'(', b')') {
                    args = selection[i + 1..i + close].to_owned();
                    i += close + 1;
                }
                while i < bytes.len() && (bytes[i] as char).is_whitespace() {
                    i += 1;
                }
            }
            if i < bytes.len() && bytes[i] == b'{' {
                if let Ok(close) = matching(&selection[i..], b'{', b'}') {
                    i += close + 1;
                }
            }
            fields.push((name, args));
        } else {
            i += 1;
        }
    }
    fields
}

/// Resolve one argument: `$variable` references, quoted strings, or bare
/// literals rendered as text.
fn arg_value(name: &str, args: &str, variables: &Map<String, Value>) -> Option<String> {
    let rest = args.split(&format!("{name}:")).nth(1)?.trim_start();
    if let Some(var) = rest.strip_prefix('$') {
        let end = ident_end(var);
        let value = variables.get(&var[..end])?;
        Some(match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    } else if let Some(inner) = rest.strip_prefix('"') {
        let end = inner.find('"')?;
        Some(inner[..end].to_owned())
    } else {
        let end = rest
            .find(|c: char| c == ',' || c == ')' || c.is_whitespace())
            .unwrap_or(rest.len());
        Some(rest[..end].to_owned())
    }
}

/// Serve a mounted GraphQL route on an ephemeral port; returns the endpoint
/// URL.
pub async fn serve(route: MethodRouter) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let app = Router::new().route("/graphql", route);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/graphql")
}

/// Serve the test engine with default configuration.
#[allow(dead_code)]
pub async fn serve_default() -> String {
    serve(graphql(TestEngine)).await
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Parse a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: reqwest::Response) -> Value {
    response.json().await.unwrap()
}

/// The response shape of a single transport-level error (no locations).
#[allow(dead_code)]
pub fn errors_json(message: &str) -> Value {
    json!({"errors": [{"message": message}]})
}

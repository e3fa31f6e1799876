//! Default explorer page rendering.
//!
//! A GraphiQL page with the incoming request's query, variables and
//! operation name pre-filled, plus the pre-run result when execution already
//! happened. Everything is embedded as JSON inside a `<script>` block, with
//! `<` escaped so user-controlled query text cannot break out into markup.

use serde_json::Value;

use crate::request::GraphQLRequest;

const TEMPLATE: &str = include_str!("../../templates/explorer.html");

/// Render the GraphiQL page.
///
/// `result` is the already-formatted response map, or `None` when execution
/// was skipped (no query, or a mutation arriving via GET).
pub fn graphiql_html(result: Option<&Value>, request: &GraphQLRequest) -> String {
    let variables_text = request
        .variables
        .as_ref()
        .and_then(|map| serde_json::to_string_pretty(map).ok());
    let result_text = result.and_then(|value| serde_json::to_string_pretty(value).ok());

    TEMPLATE
        .replace("{{QUERY}}", &embed_text(request.query.as_deref()))
        .replace("{{VARIABLES}}", &embed_text(variables_text.as_deref()))
        .replace(
            "{{OPERATION_NAME}}",
            &embed_text(request.operation_name.as_deref()),
        )
        .replace("{{RESULT}}", &embed_text(result_text.as_deref()))
}

/// Embed an optional string as a script-safe JSON literal.
fn embed_text(text: Option<&str>) -> String {
    let json = match text.map(serde_json::to_string) {
        Some(Ok(json)) => json,
        _ => "null".to_owned(),
    };
    script_safe(json)
}

/// `<` must never appear verbatim inside the script block; the paragraph
/// separators are invalid in JavaScript string literals.
fn script_safe(json: String) -> String {
    json.replace('<', "\\u003c")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

//! Body side of request extraction.
//!
//! # Responsibilities
//! - Classify the declared Content-Type (application/graphql, application/json, other)
//! - Decode body bytes with the declared charset, or the per-type default
//! - Extract query/operationName/variables from JSON bodies, null-safe
//!
//! # Design Decisions
//! - Charset conversion runs under `spawn_blocking` so a large body never
//!   stalls the accept loop
//! - A leading-`{` pre-check gates JSON parsing; anything that fails it (or
//!   fails to parse) is reported as invalid JSON, arrays included
//! - Missing charset defaults to UTF-8 for JSON and ISO-8859-1 for everything
//!   else, the legacy HTTP default

use axum::body::Bytes;
use axum::http::HeaderValue;
use encoding_rs::{Encoding, UTF_8};
use mediatype::{MediaType, Name, ReadParams};
use serde_json::Value;

use crate::error::RouteError;
use crate::request::GraphQLRequest;

const APPLICATION: Name = Name::new_unchecked("application");
const GRAPHQL: Name = Name::new_unchecked("graphql");
const JSON: Name = Name::new_unchecked("json");
const CHARSET: Name = Name::new_unchecked("charset");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    GraphQL,
    Json,
    Other,
}

/// Parse the request body into a partial request.
pub async fn parse_body(
    content_type: Option<&HeaderValue>,
    body: Bytes,
) -> Result<GraphQLRequest, RouteError> {
    let header = content_type
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let (kind, charset) = classify(header.as_deref());

    let text = tokio::task::spawn_blocking(move || decode(&body, charset.as_deref(), kind))
        .await
        .map_err(|err| RouteError::Internal(err.to_string()))?;

    if text.trim().is_empty() {
        return Ok(GraphQLRequest::default());
    }

    match kind {
        BodyKind::Other => Ok(GraphQLRequest::default()),
        BodyKind::GraphQL => Ok(GraphQLRequest {
            query: Some(text),
            operation_name: None,
            variables: None,
        }),
        BodyKind::Json => parse_json_body(&text),
    }
}

/// Classify the Content-Type and pull out its charset parameter.
///
/// A missing or unparseable header counts as "other", which contributes
/// nothing to the request.
fn classify(content_type: Option<&str>) -> (BodyKind, Option<String>) {
    let Some(header) = content_type else {
        return (BodyKind::Other, None);
    };
    let Ok(media_type) = MediaType::parse(header) else {
        return (BodyKind::Other, None);
    };

    let charset = media_type
        .get_param(CHARSET)
        .map(|value| value.unquoted_str().into_owned());

    let kind = if media_type.ty != APPLICATION {
        BodyKind::Other
    } else if media_type.subty == GRAPHQL {
        BodyKind::GraphQL
    } else if media_type.subty == JSON {
        BodyKind::Json
    } else {
        BodyKind::Other
    };

    (kind, charset)
}

fn decode(bytes: &Bytes, charset: Option<&str>, kind: BodyKind) -> String {
    match charset.and_then(|label| Encoding::for_label(label.as_bytes())) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => match kind {
            BodyKind::Json => UTF_8.decode(bytes).0.into_owned(),
            _ => encoding_rs::mem::decode_latin1(bytes).into_owned(),
        },
    }
}

fn parse_json_body(text: &str) -> Result<GraphQLRequest, RouteError> {
    if !looks_like_json_object(text) {
        return Err(RouteError::InvalidBodyJson);
    }

    let value: Value = serde_json::from_str(text).map_err(|_| RouteError::InvalidBodyJson)?;
    if value.is_null() {
        return Ok(GraphQLRequest::default());
    }

    // Explicit nulls and wrongly-typed values are treated as absent fields.
    let query = value.get("query").and_then(Value::as_str).map(str::to_owned);
    let operation_name = value
        .get("operationName")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let variables = match value.get("variables") {
        Some(Value::Object(map)) => Some(map.clone()),
        _ => None,
    };

    Ok(GraphQLRequest {
        query,
        operation_name,
        variables,
    })
}

/// Object-opening brace as the first non-space character, with whitespace as
/// defined by RFC 7159: space, horizontal tab, line feed, carriage return.
fn looks_like_json_object(text: &str) -> bool {
    text.trim_start_matches([' ', '\t', '\n', '\r']).starts_with('{')
}

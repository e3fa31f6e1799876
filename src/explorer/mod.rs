//! Explorer content negotiation.
//!
//! # Responsibilities
//! - Honor the reserved `raw` query flag (always JSON)
//! - Weigh the Accept header restricted to `text/html` vs `application/json`
//! - Default to JSON whenever neither candidate survives
//!
//! # Design Decisions
//! - A pure comparison over the parsed media-type list, no framework helper
//! - All other offered media types are ignored for this decision
//! - Ties go to the earlier entry, so declaration order decides

pub mod render;

use axum::http::header::ACCEPT;
use axum::http::request::Parts;
use mediatype::names::{APPLICATION, HTML, JSON, TEXT};
use mediatype::{MediaTypeList, Name, ReadParams};

use crate::request::params;

const Q: Name = Name::new_unchecked("q");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Html,
}

/// Decide the response format for this request, assuming explorer rendering
/// is enabled by config.
pub fn negotiate(accept: Option<&str>, raw_requested: bool) -> ResponseFormat {
    if raw_requested {
        return ResponseFormat::Json;
    }
    let Some(accept) = accept else {
        return ResponseFormat::Json;
    };

    let mut best: Option<(ResponseFormat, f32)> = None;
    for media_type in MediaTypeList::new(accept).flatten() {
        let candidate = if media_type.ty == TEXT && media_type.subty == HTML {
            ResponseFormat::Html
        } else if media_type.ty == APPLICATION && media_type.subty == JSON {
            ResponseFormat::Json
        } else {
            continue;
        };

        let weight = media_type
            .get_param(Q)
            .and_then(|value| value.unquoted_str().parse::<f32>().ok())
            .unwrap_or(1.0);

        // Strictly greater, so the first candidate wins ties.
        if best.map_or(true, |(_, current)| weight > current) {
            best = Some((candidate, weight));
        }
    }

    best.map_or(ResponseFormat::Json, |(format, _)| format)
}

/// True if this request should receive the explorer page rather than JSON.
pub fn wants_explorer(parts: &Parts) -> bool {
    let raw = params::has_raw_flag(parts.uri.query().unwrap_or(""));
    let accept = parts
        .headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    let accept = if accept.is_empty() { None } else { Some(accept.as_str()) };
    negotiate(accept, raw) == ResponseFormat::Html
}

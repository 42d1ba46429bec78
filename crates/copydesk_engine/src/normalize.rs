use std::borrow::Cow;
use std::sync::LazyLock;

use copydesk_logging::{desk_debug, desk_info, desk_warn, log_preview};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::slug::derive_slug;
use crate::types::GenerationRequest;

/// Parsed content shorter than this is treated as a truncated response.
pub const MIN_CONTENT_CHARS: usize = 100;
/// Length of the meta description cut from raw text in the fallback.
pub const META_DESCRIPTION_CHARS: usize = 155;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("code fence pattern"));

// Inner `content` value of a JSON object serialized inside another `content` string.
static NESTED_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"content"\s*:\s*"(.*?)(?:"\s*,\s*"|"\s*\})"#).expect("nested content pattern")
});

/// Structured article extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedArticle {
    pub title: String,
    pub seo_title: String,
    pub slug: String,
    pub meta_description: String,
    /// Markdown body.
    pub content: String,
}

/// Extracts a structured article from raw model output.
///
/// Never fails: when no usable JSON object can be recovered the raw text is
/// wrapped as a minimal article (see [`raw_fallback`]).
pub fn normalize_response(raw: &str, request: &GenerationRequest) -> NormalizedArticle {
    let raw = raw.trim();
    desk_debug!(
        "Model response for '{}' ({} chars): {}",
        request.keyword,
        raw.chars().count(),
        log_preview(raw, 500)
    );

    let cleaned = strip_code_fences(raw);
    let Some(span) = json_span(&cleaned) else {
        desk_warn!("No JSON object in response for '{}'; using raw text", request.keyword);
        return raw_fallback(raw, request);
    };

    let data: Map<String, Value> = match serde_json::from_str(span) {
        Ok(data) => data,
        Err(err) => {
            desk_warn!(
                "Response for '{}' is not valid JSON ({}): {}",
                request.keyword,
                err,
                log_preview(span, 500)
            );
            return raw_fallback(raw, request);
        }
    };

    let content = string_field(&data, "content").map(|content| {
        if is_double_encoded(&content) {
            desk_warn!("Content for '{}' embeds its own JSON; unwrapping", request.keyword);
            repair_nested_content(&content).unwrap_or(content)
        } else {
            content
        }
    });
    let Some(content) = content.filter(|content| content.chars().count() >= MIN_CONTENT_CHARS)
    else {
        desk_warn!("Content for '{}' is missing or too short", request.keyword);
        return raw_fallback(raw, request);
    };

    let title = string_field(&data, "title").unwrap_or_else(|| request.fallback_title().to_string());
    let seo_title = string_field(&data, "seo_title")
        .unwrap_or_else(|| format!("{title} | {}", request.client_name));
    let slug = string_field(&data, "slug").unwrap_or_else(|| derive_slug(&request.keyword));
    let meta_description = string_field(&data, "meta_description").unwrap_or_default();

    desk_info!(
        "Parsed article title='{}' slug='{}' content_len={}",
        title,
        slug,
        content.chars().count()
    );

    NormalizedArticle {
        title,
        seo_title,
        slug,
        meta_description,
        content,
    }
}

/// Degraded article built from the unparsed text.
pub fn raw_fallback(raw: &str, request: &GenerationRequest) -> NormalizedArticle {
    let title = request.fallback_title().to_string();
    NormalizedArticle {
        content: format!("# {title}\n\n{raw}"),
        seo_title: format!("{title} | {}", request.client_name),
        slug: derive_slug(&request.keyword),
        meta_description: raw.chars().take(META_DESCRIPTION_CHARS).collect(),
        title,
    }
}

/// Removes fenced code-block markers (```` ``` ```` and ```` ```json ````) with trailing whitespace.
pub fn strip_code_fences(text: &str) -> Cow<'_, str> {
    if text.contains("```") {
        CODE_FENCE.replace_all(text, "")
    } else {
        Cow::Borrowed(text)
    }
}

/// Span from the first `{` to the last `}`, inclusive.
pub(crate) fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Symptom of the model serializing its whole answer into the `content` field.
pub(crate) fn is_double_encoded(content: &str) -> bool {
    content.contains("\"title\":") || content.contains("\"seo_title\":")
}

/// Pulls the inner `content` string out of a double-encoded body and unescapes
/// `\n` and `\"`. Returns `None` when the pattern does not match.
pub(crate) fn repair_nested_content(content: &str) -> Option<String> {
    let inner = NESTED_CONTENT.captures(content)?.get(1)?.as_str();
    Some(inner.replace("\\n", "\n").replace("\\\"", "\""))
}

pub(crate) fn string_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

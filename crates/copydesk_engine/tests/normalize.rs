use copydesk_engine::{normalize_response, GenerationRequest, GenerationResult, NormalizedArticle};
use pretty_assertions::assert_eq;
use serde_json::json;

fn request(keyword: &str) -> GenerationRequest {
    GenerationRequest::new(keyword, "Acme")
}

fn long_body() -> String {
    "full body text ".repeat(8)
}

#[test]
fn fenced_json_is_extracted() {
    let body = long_body();
    let payload = json!({
        "title": "T",
        "slug": "t",
        "content": body,
        "seo_title": "S",
        "meta_description": "M",
    });
    let raw = format!("```json\n{payload}\n```");

    let article = normalize_response(&raw, &request("widgets"));

    assert_eq!(
        article,
        NormalizedArticle {
            title: "T".to_string(),
            seo_title: "S".to_string(),
            slug: "t".to_string(),
            meta_description: "M".to_string(),
            content: body,
        }
    );
}

#[test]
fn plain_prose_becomes_raw_fallback() {
    let raw = "Just plain prose, no braces at all.";
    let article = normalize_response(raw, &request("widgets"));

    assert_eq!(article.title, "widgets");
    assert_eq!(article.slug, "widgets");
    assert_eq!(article.seo_title, "widgets | Acme");
    assert_eq!(article.content, "# widgets\n\nJust plain prose, no braces at all.");
    assert_eq!(article.meta_description, raw);
}

#[test]
fn prose_around_json_is_ignored() {
    let payload = json!({ "title": "Inside", "content": long_body() });
    let raw = format!("Sure! Here is your article:\n{payload}\nLet me know if you need edits.");

    let article = normalize_response(&raw, &request("coffee beans"));
    assert_eq!(article.title, "Inside");
    assert_eq!(article.content, long_body());
}

#[test]
fn missing_fields_default_independently() {
    let payload = json!({ "title": "Brewing Guide", "content": long_body() });
    let article = normalize_response(&payload.to_string(), &request("Coffee Beans"));

    assert_eq!(article.title, "Brewing Guide");
    assert_eq!(article.seo_title, "Brewing Guide | Acme");
    assert_eq!(article.slug, "coffee-beans");
    assert_eq!(article.meta_description, "");
}

#[test]
fn custom_title_wins_over_keyword_when_model_omits_title() {
    let mut req = request("coffee");
    req.custom_title = Some("My Title".to_string());
    let payload = json!({ "content": long_body(), "slug": "" });

    let article = normalize_response(&payload.to_string(), &req);
    assert_eq!(article.title, "My Title");
    assert_eq!(article.seo_title, "My Title | Acme");
    assert_eq!(article.slug, "coffee");
}

#[test]
fn short_content_falls_back_to_raw_text() {
    let raw = json!({ "title": "T", "content": "too short" }).to_string();
    let article = normalize_response(&raw, &request("widgets"));

    assert_eq!(article.title, "widgets");
    assert_eq!(article.content, format!("# widgets\n\n{raw}"));
}

#[test]
fn malformed_json_falls_back_to_raw_text() {
    let raw = r#"{"title": "T", "content": "unterminated"#.to_string() + "}";
    let article = normalize_response(&raw, &request("widgets"));
    assert_eq!(article.content, format!("# widgets\n\n{raw}"));
    assert_eq!(article.meta_description, raw);
}

#[test]
fn truncated_response_without_closing_brace_falls_back() {
    let raw = r##"{"title": "T", "content": "# Heading"##;
    let article = normalize_response(raw, &request("widgets"));
    assert!(article.content.starts_with("# widgets\n\n{"));
}

#[test]
fn meta_description_is_cut_to_155_chars() {
    let raw = "ก".repeat(400);
    let article = normalize_response(&raw, &request("widgets"));
    assert_eq!(article.meta_description.chars().count(), 155);
}

#[test]
fn double_encoded_content_is_unwrapped() {
    let inner_body = format!("# Real Heading\\n\\n{}", long_body());
    let nested = format!(
        r#"{{"title": "Inner", "seo_title": "Inner | Acme", "content": "{inner_body}", "slug": "inner"}}"#
    );
    let payload = json!({ "title": "Outer", "content": nested });

    let article = normalize_response(&payload.to_string(), &request("widgets"));

    assert_eq!(article.title, "Outer");
    assert!(article.content.starts_with("# Real Heading\n\nfull body text"));
    assert!(!article.content.contains("\"seo_title\":"));
}

#[test]
fn double_encoded_content_without_inner_match_is_kept() {
    let odd = format!("\"title\": dangling marker {}", long_body());
    let payload = json!({ "content": odd });
    let article = normalize_response(&payload.to_string(), &request("widgets"));
    assert_eq!(article.content, odd);
}

#[test]
fn normalizer_is_total() {
    let inputs = [
        String::new(),
        "   ".to_string(),
        "}{".to_string(),
        "{}".to_string(),
        "[1, 2, 3]".to_string(),
        "```json\n{\"content\": 42}\n```".to_string(),
        "{\"content\": null, \"title\": null}".to_string(),
        json!({ "content": long_body() }).to_string(),
    ];
    for keyword in ["widgets", "การตลาด", ""] {
        for raw in &inputs {
            let article = normalize_response(raw, &request(keyword));
            assert!(!article.content.is_empty(), "empty content for {raw:?}");
            assert!(!article.slug.is_empty(), "empty slug for {raw:?}");
        }
    }
}

#[test]
fn raw_generation_result_is_normalized_on_conversion() {
    let req = request("widgets");
    let article = GenerationResult::raw("no json here").into_article(&req).unwrap();
    assert_eq!(article.content, "# widgets\n\nno json here");

    let err = GenerationResult::failure("quota exceeded")
        .into_article(&req)
        .unwrap_err();
    assert_eq!(err, "quota exceeded");
}

#[test]
fn already_normalized_result_passes_through() {
    let req = request("widgets");
    let normalized = NormalizedArticle {
        title: "T".to_string(),
        seo_title: "S".to_string(),
        slug: "t".to_string(),
        meta_description: "M".to_string(),
        content: "# T\n\nbody".to_string(),
    };
    let article = GenerationResult::normalized(normalized.clone())
        .into_article(&req)
        .unwrap();
    assert_eq!(article, normalized);
}

#[test]
fn structured_result_without_slug_keeps_its_fields() {
    let req = request("widgets");
    let body = long_body();
    let result = GenerationResult {
        success: true,
        content: Some(body.clone()),
        title: Some("Widget Guide".to_string()),
        seo_title: Some("Widget Guide | Acme".to_string()),
        slug: None,
        meta_description: Some("Meta".to_string()),
        error: None,
    };

    let article = result.into_article(&req).unwrap();

    assert_eq!(
        article,
        NormalizedArticle {
            title: "Widget Guide".to_string(),
            seo_title: "Widget Guide | Acme".to_string(),
            slug: "widgets".to_string(),
            meta_description: "Meta".to_string(),
            content: body,
        }
    );
}

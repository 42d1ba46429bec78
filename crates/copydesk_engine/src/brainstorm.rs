use std::sync::LazyLock;

use copydesk_logging::{desk_info, desk_warn};
use regex::Regex;
use serde_json::Value;

use crate::generate::{language_label, AnthropicGenerator, GenerateError};

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("numbering pattern"));

const BRAINSTORM_SYSTEM_PROMPT: &str = "You are a creative content strategist.";

impl AnthropicGenerator {
    /// Asks the model for ten candidate article titles for `keyword`.
    pub async fn brainstorm_titles(
        &self,
        keyword: &str,
        language: &str,
        tone: &str,
    ) -> Result<Vec<String>, GenerateError> {
        let prompt = build_brainstorm_prompt(keyword, language, tone);
        let content = self
            .complete(BRAINSTORM_SYSTEM_PROMPT, &prompt, 1000, 0.8)
            .await?;
        let titles = parse_title_list(&content)?;
        desk_info!("Brainstormed {} titles for '{}'", titles.len(), keyword);
        Ok(titles)
    }
}

fn build_brainstorm_prompt(keyword: &str, language: &str, tone: &str) -> String {
    format!(
        r#"
You are an expert Content Strategist / SEO Specialist.
Your task is to brainstorm 10 catchy, high-CTR article titles for the keyword: "{keyword}".

Language: {language}
Tone: {tone}

Requirements:
- Titles must be engaging and clickable (Clickbait but honest).
- Optimized for SEO (include the keyword naturally if possible, or related terms).
- Varied styles (How-to, Listicle, Question, Deep Dive, etc.).
- Return strictly a JSON array of strings.

Example Output:
["7 วิธีทำการตลาดออนไลน์ให้ยอดขายพุ่ง", "การตลาดออนไลน์คืออะไร? คู่มือฉบับสมบูรณ์ 2024", ...]

Output:
"#,
        language = language_label(language),
    )
}

/// Parses the model's title list.
///
/// A JSON array is taken as-is; any other JSON value is an error. Text that is
/// not JSON at all falls back to one title per line longer than five
/// characters, with list numbering and quote characters removed.
pub fn parse_title_list(content: &str) -> Result<Vec<String>, GenerateError> {
    let cleaned = content.replace("```json", "").replace("```", "");
    match serde_json::from_str::<Value>(cleaned.trim()) {
        Ok(Value::Array(items)) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(title) => title,
                other => other.to_string(),
            })
            .collect()),
        Ok(_) => Err(GenerateError::InvalidFormat(
            "expected a JSON array of titles".to_string(),
        )),
        Err(err) => {
            desk_warn!("Title list is not JSON ({}); splitting lines", err);
            Ok(content
                .lines()
                .filter(|line| line.trim().chars().count() > 5)
                .map(|line| {
                    LEADING_NUMBER
                        .replace(line.trim(), "")
                        .replace(['"', '\''], "")
                })
                .collect())
        }
    }
}

use std::time::Duration;

use copydesk_logging::{desk_debug, desk_error, desk_info};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_response;
use crate::types::{GenerationRequest, GenerationResult};

const ANTHROPIC_VERSION: &str = "2023-06-01";

const ARTICLE_SYSTEM_PROMPT: &str = "You are a professional SEO content writer. You ALWAYS return valid JSON only, with no additional text or markdown code blocks. Your articles are always complete and well-structured.";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Missing Anthropic API Key")]
    MissingApiKey,
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned invalid format: {0}")]
    InvalidFormat(String),
}

/// The article-generation collaborator driven by the queue.
#[async_trait::async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 8192,
            temperature: 0.5,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Text completion against the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicGenerator {
    settings: GeneratorSettings,
    client: reqwest::Client,
}

impl AnthropicGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn request_headers(&self) -> Result<HeaderMap, GenerateError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(GenerateError::MissingApiKey)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|err| GenerateError::InvalidHeader(err.to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Sends one user prompt and returns the text blocks joined by newlines, trimmed.
    pub(crate) async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerateError> {
        let headers = self.request_headers()?;
        let url = format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens,
            temperature,
            system,
            messages: vec![InputMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl ArticleGenerator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        desk_info!(
            "Generating article keyword='{}' client='{}' language={}",
            request.keyword,
            request.client_name,
            request.language
        );
        let prompt = build_article_prompt(request);
        match self
            .complete(
                ARTICLE_SYSTEM_PROMPT,
                &prompt,
                self.settings.max_tokens,
                self.settings.temperature,
            )
            .await
        {
            Ok(raw) => {
                desk_debug!("Received {} chars for '{}'", raw.len(), request.keyword);
                GenerationResult::normalized(normalize_response(&raw, request))
            }
            Err(err) => {
                desk_error!("Article generation failed for '{}': {}", request.keyword, err);
                GenerationResult::failure(err.to_string())
            }
        }
    }
}

/// Display name for a language code used in prompts.
pub fn language_label(code: &str) -> &str {
    match code {
        "th" => "Thai (ภาษาไทย)",
        "en" => "English",
        other => other,
    }
}

pub fn build_article_prompt(request: &GenerationRequest) -> String {
    let client = &request.client_name;
    let title_line = match request.custom_title.as_deref() {
        Some(title) => format!("- Title: Use exactly \"{title}\""),
        None => "- Title: Create a catchy, SEO-friendly title".to_string(),
    };
    format!(
        r##"You are an expert SEO Content Writer. Create a high-quality article for "{client}".

REQUIREMENTS:
- Keyword: "{keyword}"
- Language: {language}
- Tone: {tone}
{title_line}

ARTICLE STRUCTURE (in Markdown):
1. Start with H1 title using #
2. Write an engaging introduction (2-3 paragraphs)
3. Use H2 (##) for main sections
4. Use H3 (###) for subsections if needed
5. Include bullet points or numbered lists where appropriate
6. End with a conclusion section

LENGTH: 1000-1500 words
IMPORTANT: Complete the entire article. Do not cut off mid-sentence.

OUTPUT FORMAT: Return ONLY a valid JSON object with NO additional text before or after:
{{
  "title": "Your H1 Title Here",
  "seo_title": "SEO Optimized Title | {client}",
  "slug": "url-friendly-slug",
  "meta_description": "Compelling 150-160 character summary",
  "content": "# Title\n\nIntroduction...\n\n## Section 1\n\nContent...\n\n## Conclusion\n\nFinal thoughts..."
}}

CRITICAL: Return ONLY the JSON object. No markdown code blocks, no explanations."##,
        keyword = request.keyword,
        language = language_label(&request.language),
        tone = request.tone,
    )
}

use copydesk_core::{GenerationTask, TaskId, TaskInput, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_response, NormalizedArticle};
use crate::slug::derive_slug;

/// Parameters passed to the article-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub keyword: String,
    pub client_name: String,
    pub language: String,
    pub tone: String,
    pub custom_title: Option<String>,
}

impl GenerationRequest {
    pub fn new(keyword: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            client_name: client_name.into(),
            language: "th".to_string(),
            tone: "Professional".to_string(),
            custom_title: None,
        }
    }

    /// Title used whenever the model does not supply one.
    pub fn fallback_title(&self) -> &str {
        self.custom_title.as_deref().unwrap_or(&self.keyword)
    }
}

impl From<&TaskInput> for GenerationRequest {
    fn from(input: &TaskInput) -> Self {
        Self {
            keyword: input.keyword.clone(),
            client_name: input.client_name.clone(),
            language: input.language.clone(),
            tone: input.tone.clone(),
            custom_title: input.custom_title.clone(),
        }
    }
}

/// Result shape of the generation collaborator.
///
/// `success = false` carries `error`. `success = true` carries `content`, and
/// may or may not carry the structured fields; when they are absent the
/// content is treated as raw model output and normalized by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub content: Option<String>,
    pub title: Option<String>,
    pub seo_title: Option<String>,
    pub slug: Option<String>,
    pub meta_description: Option<String>,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Successful result holding unparsed model output.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn normalized(article: NormalizedArticle) -> Self {
        Self {
            success: true,
            content: Some(article.content),
            title: Some(article.title),
            seo_title: Some(article.seo_title),
            slug: Some(article.slug),
            meta_description: Some(article.meta_description),
            error: None,
        }
    }

    /// Turns the collaborator result into the article to persist.
    ///
    /// Fails only when the collaborator reported failure. A result carrying any
    /// structured field counts as already normalized; its missing fields are
    /// filled one by one. Bare content is run through [`normalize_response`].
    pub fn into_article(self, request: &GenerationRequest) -> Result<NormalizedArticle, String> {
        if !self.success {
            return Err(self.error.unwrap_or_else(|| "Unknown error".to_string()));
        }
        let structured = [&self.title, &self.seo_title, &self.slug, &self.meta_description]
            .iter()
            .any(|field| field.is_some());
        let content = self.content.unwrap_or_default();
        if !structured || content.is_empty() {
            return Ok(normalize_response(&content, request));
        }

        let title = non_empty(self.title).unwrap_or_else(|| request.fallback_title().to_string());
        let seo_title = non_empty(self.seo_title)
            .unwrap_or_else(|| format!("{title} | {}", request.client_name));
        let slug = non_empty(self.slug).unwrap_or_else(|| derive_slug(&request.keyword));
        Ok(NormalizedArticle {
            title,
            seo_title,
            slug,
            meta_description: self.meta_description.unwrap_or_default(),
            content,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Queue notifications delivered to the handle owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    TasksQueued { task_ids: Vec<TaskId> },
    TaskUpdated(TaskUpdate),
    Drained,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub task_id: TaskId,
    pub keyword: String,
    pub status: TaskStatus,
    pub error: Option<String>,
}

impl From<&GenerationTask> for TaskUpdate {
    fn from(task: &GenerationTask) -> Self {
        Self {
            task_id: task.id,
            keyword: task.input.keyword.clone(),
            status: task.status,
            error: task.error.clone(),
        }
    }
}

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use copydesk_core::TaskInput;
use copydesk_logging::{desk_debug, desk_warn};
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedArticle;
use crate::persist::{AtomicFileWriter, PersistError};

pub type ArticleId = String;

/// Source of `created_at`/`updated_at` timestamps (RFC3339).
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Article not found: {0}")]
    NotFound(ArticleId),
    #[error("{0}")]
    Validation(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Ready,
    Published,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: ArticleId,
    #[serde(default)]
    pub client_id: Option<String>,
    pub keyword: String,
    pub title: String,
    /// Markdown body.
    pub content: String,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub brand_tone: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub meta_description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub client_id: Option<String>,
    pub keyword: String,
    pub title: String,
    pub content: String,
    pub status: ArticleStatus,
    pub language: String,
    pub brand_tone: String,
    pub slug: String,
    pub seo_title: String,
    pub meta_description: String,
}

impl NewArticle {
    /// Record for a freshly generated article, ready for review.
    pub fn from_generation(input: &TaskInput, article: NormalizedArticle) -> Self {
        let title = if article.title.is_empty() {
            input
                .custom_title
                .clone()
                .unwrap_or_else(|| input.keyword.clone())
        } else {
            article.title
        };
        Self {
            client_id: Some(input.client_id.clone()).filter(|id| !id.is_empty()),
            keyword: input.keyword.clone(),
            title,
            content: article.content,
            status: ArticleStatus::Ready,
            language: input.language.clone(),
            brand_tone: input.tone.clone(),
            slug: article.slug,
            seo_title: article.seo_title,
            meta_description: article.meta_description,
        }
    }
}

/// Field changes applied by an edit or a format repair. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleUpdate {
    pub title: String,
    pub content: String,
    pub seo_title: Option<String>,
    pub slug: Option<String>,
    pub meta_description: Option<String>,
}

/// The persistence collaborator.
#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert_article(&self, article: NewArticle) -> Result<StoredArticle, StoreError>;
    async fn update_article(
        &self,
        id: &str,
        update: ArticleUpdate,
    ) -> Result<StoredArticle, StoreError>;
    async fn fetch_article(&self, id: &str) -> Result<Option<StoredArticle>, StoreError>;
    async fn delete_article(&self, id: &str) -> Result<(), StoreError>;
    async fn set_status(&self, id: &str, status: ArticleStatus) -> Result<(), StoreError>;
    /// All articles, newest first.
    async fn list_articles(&self) -> Result<Vec<StoredArticle>, StoreError>;
}

/// One pretty-printed JSON file per article, `{id}.json`, in a single directory.
pub struct FileArticleStore {
    writer: AtomicFileWriter,
    clock: Clock,
    // Serializes read-modify-write cycles.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileArticleStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            clock: Arc::new(|| Utc::now().to_rfc3339()),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn filename(id: &str) -> Option<String> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| format!("{id}.json"))
    }

    fn read(&self, id: &str) -> Result<Option<StoredArticle>, StoreError> {
        let Some(filename) = Self::filename(id) else {
            return Ok(None);
        };
        let text = match fs::read_to_string(self.writer.dir().join(filename)) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn write(&self, article: &StoredArticle) -> Result<(), StoreError> {
        let filename =
            Self::filename(&article.id).ok_or_else(|| StoreError::NotFound(article.id.clone()))?;
        let content = serde_json::to_string_pretty(article)?;
        self.writer.write(&filename, &content)?;
        Ok(())
    }

    fn read_existing(&self, id: &str) -> Result<StoredArticle, StoreError> {
        self.read(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait::async_trait]
impl ArticleStore for FileArticleStore {
    async fn insert_article(&self, article: NewArticle) -> Result<StoredArticle, StoreError> {
        let _guard = self.write_lock.lock().await;
        let now = (self.clock)();
        let stored = StoredArticle {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: article.client_id,
            keyword: article.keyword,
            title: article.title,
            content: article.content,
            status: article.status,
            language: article.language,
            brand_tone: article.brand_tone,
            slug: article.slug,
            seo_title: article.seo_title,
            meta_description: article.meta_description,
            created_at: now.clone(),
            updated_at: now,
        };
        self.write(&stored)?;
        desk_debug!("Inserted article {} ('{}')", stored.id, stored.title);
        Ok(stored)
    }

    async fn update_article(
        &self,
        id: &str,
        update: ArticleUpdate,
    ) -> Result<StoredArticle, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut article = self.read_existing(id)?;
        article.title = update.title;
        article.content = update.content;
        if let Some(seo_title) = update.seo_title {
            article.seo_title = seo_title;
        }
        if let Some(slug) = update.slug {
            article.slug = slug;
        }
        if let Some(meta_description) = update.meta_description {
            article.meta_description = meta_description;
        }
        article.updated_at = (self.clock)();
        self.write(&article)?;
        Ok(article)
    }

    async fn fetch_article(&self, id: &str) -> Result<Option<StoredArticle>, StoreError> {
        self.read(id)
    }

    async fn delete_article(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let filename = Self::filename(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if self.writer.remove(&filename)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    async fn set_status(&self, id: &str, status: ArticleStatus) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut article = self.read_existing(id)?;
        article.status = status;
        article.updated_at = (self.clock)();
        self.write(&article)
    }

    async fn list_articles(&self) -> Result<Vec<StoredArticle>, StoreError> {
        let dir = self.writer.dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut articles = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|text| serde_json::from_str::<StoredArticle>(&text).map_err(Into::into));
            match parsed {
                Ok(article) => articles.push(article),
                Err(err) => desk_warn!("Skipping unreadable article file {:?}: {}", path, err),
            }
        }
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(articles)
    }
}

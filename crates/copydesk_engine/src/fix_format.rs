//! Repair of stored articles whose body is an accidentally persisted JSON blob.
use std::borrow::Cow;
use std::fmt;

use copydesk_logging::{desk_info, desk_warn};
use serde_json::{Map, Value};

use crate::normalize::{json_span, string_field, strip_code_fences};
use crate::store::{ArticleStore, ArticleUpdate, StoreError, StoredArticle};

/// Body mentions a `"content"` key and either starts with `{` or holds a ```` ```json ```` block.
pub fn looks_like_json_blob(content: &str) -> bool {
    content.contains("\"content\"")
        && (content.trim_start().starts_with('{') || content.contains("```json"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    Repaired(ArticleUpdate),
    NoFixNeeded,
    Failed(String),
}

/// Computes the repaired fields for one stored article without touching storage.
///
/// Each field extracted from the blob falls back to the article's current value.
/// A repair whose extracted body would still be flagged as a blob is refused, so
/// a second pass over a repaired article always reports `NoFixNeeded`.
pub fn repair_article(article: &StoredArticle) -> RepairOutcome {
    let body = article.content.as_str();
    if !looks_like_json_blob(body) {
        return RepairOutcome::NoFixNeeded;
    }

    let cleaned = if body.contains("```json") {
        strip_code_fences(body)
    } else {
        Cow::Borrowed(body)
    };
    let Some(span) = json_span(&cleaned) else {
        return RepairOutcome::Failed("Could not find valid JSON structure".to_string());
    };
    let Ok(parsed) = serde_json::from_str::<Map<String, Value>>(span) else {
        return RepairOutcome::Failed("Failed to parse JSON content".to_string());
    };

    let content = string_field(&parsed, "content").unwrap_or_else(|| body.to_string());
    if looks_like_json_blob(&content) {
        return RepairOutcome::Failed("Extracted content is still JSON".to_string());
    }

    RepairOutcome::Repaired(ArticleUpdate {
        title: string_field(&parsed, "title").unwrap_or_else(|| article.title.clone()),
        content,
        seo_title: Some(
            string_field(&parsed, "seo_title").unwrap_or_else(|| article.seo_title.clone()),
        ),
        slug: Some(string_field(&parsed, "slug").unwrap_or_else(|| article.slug.clone())),
        meta_description: Some(
            string_field(&parsed, "meta_description")
                .unwrap_or_else(|| article.meta_description.clone()),
        ),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Fixed {
        title: String,
        seo_title: String,
        slug: String,
    },
    NoFixNeeded,
    Failed(String),
}

impl fmt::Display for FixOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixOutcome::Fixed { title, .. } => write!(f, "Article format fixed successfully ({title})"),
            FixOutcome::NoFixNeeded => write!(f, "Article is not in JSON format, no fix needed"),
            FixOutcome::Failed(message) => write!(f, "{message}"),
        }
    }
}

/// Loads one article, repairs it and writes the result back.
pub async fn fix_article_format(store: &dyn ArticleStore, id: &str) -> FixOutcome {
    let article = match store.fetch_article(id).await {
        Ok(Some(article)) => article,
        Ok(None) => return FixOutcome::Failed("Article not found".to_string()),
        Err(err) => {
            desk_warn!("Could not load article {}: {}", id, err);
            return FixOutcome::Failed(err.to_string());
        }
    };

    match repair_article(&article) {
        RepairOutcome::NoFixNeeded => FixOutcome::NoFixNeeded,
        RepairOutcome::Failed(message) => FixOutcome::Failed(message),
        RepairOutcome::Repaired(update) => match store.update_article(id, update).await {
            Ok(updated) => {
                desk_info!("Fixed article format for {} ('{}')", id, updated.title);
                FixOutcome::Fixed {
                    title: updated.title,
                    seo_title: updated.seo_title,
                    slug: updated.slug,
                }
            }
            Err(err) => FixOutcome::Failed(err.to_string()),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkFixSummary {
    pub fixed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub total: usize,
}

/// Repairs each id in order; every id lands in exactly one counter.
pub async fn bulk_fix_format(store: &dyn ArticleStore, ids: &[String]) -> BulkFixSummary {
    let mut summary = BulkFixSummary {
        total: ids.len(),
        ..BulkFixSummary::default()
    };
    for id in ids {
        match fix_article_format(store, id).await {
            FixOutcome::Fixed { .. } => summary.fixed += 1,
            FixOutcome::NoFixNeeded => summary.skipped += 1,
            FixOutcome::Failed(message) => {
                desk_warn!("Format fix failed for {}: {}", id, message);
                summary.errored += 1;
            }
        }
    }
    desk_info!(
        "Bulk fix: fixed={} skipped={} errored={} total={}",
        summary.fixed,
        summary.skipped,
        summary.errored,
        summary.total
    );
    summary
}

/// Runs [`bulk_fix_format`] over every stored article.
pub async fn fix_all(store: &dyn ArticleStore) -> Result<BulkFixSummary, StoreError> {
    let ids: Vec<String> = store
        .list_articles()
        .await?
        .into_iter()
        .map(|article| article.id)
        .collect();
    Ok(bulk_fix_format(store, &ids).await)
}

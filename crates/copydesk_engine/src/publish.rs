use std::time::Duration;

use copydesk_logging::{desk_error, desk_info, desk_warn};
use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{ArticleStatus, ArticleStore, StoredArticle};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Article not found")]
    ArticleNotFound,
    #[error("Client WordPress settings not configured")]
    ClientNotConfigured,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("WP Error ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("storage error: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// An agency client and the credentials of its WordPress site.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub wp_url: Option<String>,
    #[serde(default)]
    pub wp_username: Option<String>,
    #[serde(default)]
    pub wp_app_password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Publish,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishReceipt {
    #[serde(rename = "id")]
    pub post_id: u64,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Serialize)]
struct PostPayload<'a> {
    title: &'a str,
    status: PublishStatus,
    content: String,
}

/// Markdown to HTML with tables, strikethrough and task lists enabled.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Posts articles to the WordPress REST API (`/wp-json/wp/v2/posts`).
#[derive(Debug, Clone)]
pub struct WordPressPublisher {
    client: reqwest::Client,
}

impl WordPressPublisher {
    pub fn new(request_timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    pub async fn publish(
        &self,
        article: &StoredArticle,
        client: &ClientProfile,
        status: PublishStatus,
    ) -> Result<PublishReceipt, PublishError> {
        let (Some(wp_url), Some(username), Some(password)) = (
            client.wp_url.as_deref().filter(|v| !v.is_empty()),
            client.wp_username.as_deref().filter(|v| !v.is_empty()),
            client.wp_app_password.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(PublishError::ClientNotConfigured);
        };

        let endpoint = format!("{}/wp-json/wp/v2/posts", wp_url.trim_end_matches('/'));
        // Application passwords are displayed with spaces; the API wants them removed.
        let password: String = password.chars().filter(|c| !c.is_whitespace()).collect();
        let payload = PostPayload {
            title: &article.title,
            status,
            content: markdown_to_html(&article.content),
        };

        desk_info!("Publishing article {} to {} ({:?})", article.id, endpoint, status);
        let response = self
            .client
            .post(&endpoint)
            .basic_auth(username, Some(password))
            .json(&payload)
            .send()
            .await?;

        let code = response.status();
        if !code.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or(body);
            desk_error!("WordPress rejected article {}: {} {}", article.id, code, message);
            return Err(PublishError::Remote {
                status: code.as_u16(),
                message,
            });
        }

        Ok(response.json::<PublishReceipt>().await?)
    }
}

/// Publishes a stored article to its client's site and records the new status.
///
/// Drafts keep the article `ready`; published posts mark it `published`.
/// Once the post exists remotely the receipt is returned even if the local
/// status update fails.
pub async fn publish_article(
    store: &dyn ArticleStore,
    publisher: &WordPressPublisher,
    clients: &[ClientProfile],
    id: &str,
    status: PublishStatus,
) -> Result<PublishReceipt, PublishError> {
    let article = store
        .fetch_article(id)
        .await?
        .ok_or(PublishError::ArticleNotFound)?;
    let client = article
        .client_id
        .as_deref()
        .and_then(|client_id| clients.iter().find(|client| client.id == client_id))
        .ok_or(PublishError::ClientNotConfigured)?;

    let receipt = publisher.publish(&article, client, status).await?;
    let stored_status = match status {
        PublishStatus::Draft => ArticleStatus::Ready,
        PublishStatus::Publish => ArticleStatus::Published,
    };
    if let Err(err) = store.set_status(id, stored_status).await {
        desk_warn!(
            "Post {} created for article {} but its status was not saved: {}",
            receipt.post_id,
            id,
            err
        );
    }
    desk_info!("Article {} is now post {} ({})", id, receipt.post_id, receipt.link);
    Ok(receipt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkPublishSummary {
    pub published: usize,
    pub failed: usize,
    pub total: usize,
}

/// Publishes each id in order; one rejected post never stops the rest.
pub async fn bulk_publish(
    store: &dyn ArticleStore,
    publisher: &WordPressPublisher,
    clients: &[ClientProfile],
    ids: &[String],
    status: PublishStatus,
) -> BulkPublishSummary {
    let mut summary = BulkPublishSummary {
        total: ids.len(),
        ..BulkPublishSummary::default()
    };
    for id in ids {
        match publish_article(store, publisher, clients, id, status).await {
            Ok(_) => summary.published += 1,
            Err(err) => {
                desk_error!("Failed to publish {}: {}", id, err);
                summary.failed += 1;
            }
        }
    }
    desk_info!(
        "Bulk publish ({:?}): {} ok, {} failed of {}",
        status,
        summary.published,
        summary.failed,
        summary.total
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::markdown_to_html;

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = markdown_to_html("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }
}

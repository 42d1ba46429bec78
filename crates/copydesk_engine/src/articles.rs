use copydesk_logging::{desk_info, desk_warn};

use crate::store::{ArticleStore, ArticleUpdate, StoreError, StoredArticle};

/// Applies a user edit. Empty title or content is rejected before storage is touched.
pub async fn update_article_checked(
    store: &dyn ArticleStore,
    id: &str,
    update: ArticleUpdate,
) -> Result<StoredArticle, StoreError> {
    if update.title.trim().is_empty() || update.content.trim().is_empty() {
        return Err(StoreError::Validation(
            "Title and Content are required".to_string(),
        ));
    }
    store.update_article(id, update).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkDeleteSummary {
    pub deleted: usize,
    pub failed: usize,
    pub total: usize,
}

/// Deletes every id independently; a failure never stops the batch.
pub async fn bulk_delete(store: &dyn ArticleStore, ids: &[String]) -> BulkDeleteSummary {
    let mut summary = BulkDeleteSummary {
        total: ids.len(),
        ..BulkDeleteSummary::default()
    };
    for id in ids {
        match store.delete_article(id).await {
            Ok(()) => summary.deleted += 1,
            Err(err) => {
                desk_warn!("Delete failed for article {}: {}", id, err);
                summary.failed += 1;
            }
        }
    }
    desk_info!(
        "Bulk delete: {} deleted, {} failed of {}",
        summary.deleted,
        summary.failed,
        summary.total
    );
    summary
}

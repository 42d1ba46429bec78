use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use copydesk_core::TaskInput;
use copydesk_engine::{
    bulk_delete, update_article_checked, ArticleStatus, ArticleStore, ArticleUpdate,
    FileArticleStore, NewArticle, NormalizedArticle, StoreError,
};
use tempfile::TempDir;

fn ticking_store(dir: &TempDir) -> FileArticleStore {
    let tick = Arc::new(AtomicU32::new(0));
    FileArticleStore::new(dir.path().join("articles")).with_clock(Arc::new(move || {
        let n = tick.fetch_add(1, Ordering::SeqCst);
        format!("2025-01-01T00:00:{n:02}+00:00")
    }))
}

fn input(keyword: &str) -> TaskInput {
    TaskInput {
        keyword: keyword.to_string(),
        custom_title: None,
        client_name: "Acme".to_string(),
        client_id: String::new(),
        language: "en".to_string(),
        tone: "Friendly".to_string(),
    }
}

fn generated(keyword: &str) -> NewArticle {
    NewArticle::from_generation(
        &input(keyword),
        NormalizedArticle {
            title: format!("About {keyword}"),
            seo_title: format!("About {keyword} | Acme"),
            slug: keyword.to_string(),
            meta_description: "summary".to_string(),
            content: format!("# About {keyword}\n\nBody."),
        },
    )
}

#[tokio::test]
async fn insert_then_fetch_round_trips_generated_article() {
    let dir = TempDir::new().unwrap();
    let store = ticking_store(&dir);

    let stored = store.insert_article(generated("coffee")).await.unwrap();
    assert_eq!(stored.status, ArticleStatus::Ready);
    assert_eq!(stored.client_id, None);
    assert_eq!(stored.brand_tone, "Friendly");
    assert_eq!(stored.created_at, stored.updated_at);

    let fetched = store.fetch_article(&stored.id).await.unwrap().unwrap();
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn missing_and_unsafe_ids_are_not_found() {
    let dir = TempDir::new().unwrap();
    let store = ticking_store(&dir);

    assert!(store.fetch_article("nope").await.unwrap().is_none());
    assert!(store.fetch_article("../escape").await.unwrap().is_none());
    assert!(matches!(
        store.delete_article("nope").await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_refreshes_timestamp_and_keeps_unset_fields() {
    let dir = TempDir::new().unwrap();
    let store = ticking_store(&dir);
    let stored = store.insert_article(generated("tea")).await.unwrap();

    let updated = store
        .update_article(
            &stored.id,
            ArticleUpdate {
                title: "New".to_string(),
                content: "New body".to_string(),
                slug: Some("new".to_string()),
                ..ArticleUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "New");
    assert_eq!(updated.slug, "new");
    assert_eq!(updated.seo_title, "About tea | Acme");
    assert!(updated.updated_at > stored.updated_at);
}

#[tokio::test]
async fn edit_requires_title_and_content() {
    let dir = TempDir::new().unwrap();
    let store = ticking_store(&dir);
    let stored = store.insert_article(generated("tea")).await.unwrap();

    let err = update_article_checked(
        &store,
        &stored.id,
        ArticleUpdate {
            title: "  ".to_string(),
            content: "body".to_string(),
            ..ArticleUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Title and Content are required");

    let unchanged = store.fetch_article(&stored.id).await.unwrap().unwrap();
    assert_eq!(unchanged, stored);
}

#[tokio::test]
async fn list_is_newest_first_and_status_can_change() {
    let dir = TempDir::new().unwrap();
    let store = ticking_store(&dir);
    let first = store.insert_article(generated("a")).await.unwrap();
    let second = store.insert_article(generated("b")).await.unwrap();

    store
        .set_status(&first.id, ArticleStatus::Published)
        .await
        .unwrap();

    let listed = store.list_articles().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);
    assert_eq!(listed[1].status, ArticleStatus::Published);
}

#[tokio::test]
async fn bulk_delete_attempts_every_id() {
    let dir = TempDir::new().unwrap();
    let store = ticking_store(&dir);
    let a = store.insert_article(generated("a")).await.unwrap();
    let b = store.insert_article(generated("b")).await.unwrap();

    let ids = vec![a.id.clone(), "missing".to_string(), b.id.clone()];
    let summary = bulk_delete(&store, &ids).await;

    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total, 3);
    assert!(store.list_articles().await.unwrap().is_empty());
}

use std::io::Read;
use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use copydesk_core::{parse_batch, BatchSettings, QueueViewModel, TaskStatus};
use copydesk_engine::{
    bulk_delete, bulk_fix_format, bulk_publish, fix_all, publish_article, AnthropicGenerator,
    ArticleStore, FileArticleStore, GenerationQueue, PublishStatus, QueueEvent,
    WordPressPublisher,
};
use copydesk_logging::{desk_info, desk_warn};

use crate::config::{AppConfig, API_KEY_VAR};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn api_key() -> Option<String> {
    std::env::var(API_KEY_VAR).ok().filter(|key| !key.is_empty())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn read_batch(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))
        }
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read batch from stdin")?;
            Ok(raw)
        }
    }
}

pub fn generate(
    config: &AppConfig,
    file: Option<&Path>,
    client: Option<&str>,
    language: String,
    tone: String,
) -> Result<()> {
    let mut settings = BatchSettings {
        language,
        tone,
        ..BatchSettings::default()
    };
    if let Some(key) = client {
        let profile = config
            .find_client(key)
            .with_context(|| format!("unknown client '{key}'"))?;
        settings.client_id = profile.id.clone();
        settings.client_name = profile.name.clone();
    }

    let inputs = parse_batch(&read_batch(file)?, &settings);
    if inputs.is_empty() {
        bail!("no keywords in batch");
    }
    if api_key().is_none() {
        desk_warn!("{} is not set; every task will fail", API_KEY_VAR);
    }

    let generator = AnthropicGenerator::new(config.generator_settings(api_key()))?;
    let store = FileArticleStore::new(config.store_dir.clone());
    let queue = GenerationQueue::new(
        Arc::new(generator),
        Arc::new(store),
        config.queue_settings(),
    )?;
    queue.enqueue(inputs);

    loop {
        let event = match queue.recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                bail!("generation queue stopped unexpectedly")
            }
        };
        match event {
            QueueEvent::TasksQueued { task_ids } => {
                println!("queued {} task(s)", task_ids.len());
            }
            QueueEvent::TaskUpdated(update) => match update.status {
                TaskStatus::Error => println!(
                    "[{}] {:<10} {}: {}",
                    update.task_id,
                    update.status.as_str(),
                    update.keyword,
                    update.error.as_deref().unwrap_or_default()
                ),
                status => println!(
                    "[{}] {:<10} {}",
                    update.task_id,
                    status.as_str(),
                    update.keyword
                ),
            },
            QueueEvent::Drained => break,
        }
    }

    print_summary(&queue.snapshot());
    Ok(())
}

fn print_summary(view: &QueueViewModel) {
    println!(
        "done: {} succeeded, {} failed, {} total",
        view.counts.success,
        view.counts.error,
        view.counts.total()
    );
    for row in view.tasks.iter().filter(|row| row.status == TaskStatus::Error) {
        println!(
            "  failed: {} ({})",
            row.keyword,
            row.error.as_deref().unwrap_or_default()
        );
    }
}

pub fn brainstorm(config: &AppConfig, keyword: &str, language: &str, tone: &str) -> Result<()> {
    let generator = AnthropicGenerator::new(config.generator_settings(api_key()))?;
    let titles = runtime()?.block_on(generator.brainstorm_titles(keyword, language, tone))?;
    for (index, title) in titles.iter().enumerate() {
        println!("{:>2}. {}", index + 1, title);
    }
    Ok(())
}

pub fn list(config: &AppConfig) -> Result<()> {
    let store = FileArticleStore::new(config.store_dir.clone());
    let articles = runtime()?.block_on(store.list_articles())?;
    if articles.is_empty() {
        println!("no articles in {:?}", config.store_dir);
        return Ok(());
    }
    for article in articles {
        let client = article
            .client_id
            .as_deref()
            .and_then(|id| config.find_client(id))
            .map_or("-", |client| client.name.as_str());
        println!(
            "{}  {:<9}  {:<16}  {}  {}",
            article.id,
            format!("{:?}", article.status).to_lowercase(),
            client,
            article.updated_at,
            article.title
        );
    }
    Ok(())
}

pub fn fix_format(config: &AppConfig, ids: &[String], all: bool) -> Result<()> {
    let store = FileArticleStore::new(config.store_dir.clone());
    let summary = runtime()?.block_on(async {
        if all {
            fix_all(&store).await
        } else {
            Ok(bulk_fix_format(&store, ids).await)
        }
    })?;
    desk_info!("Fix-format finished: {:?}", summary);
    println!(
        "fixed {}, skipped {}, errors {} (of {})",
        summary.fixed, summary.skipped, summary.errored, summary.total
    );
    Ok(())
}

pub fn delete(config: &AppConfig, ids: &[String]) -> Result<()> {
    let store = FileArticleStore::new(config.store_dir.clone());
    let summary = runtime()?.block_on(bulk_delete(&store, ids));
    println!(
        "deleted {}, failed {} (of {})",
        summary.deleted, summary.failed, summary.total
    );
    if summary.failed > 0 {
        bail!("{} article(s) could not be deleted", summary.failed);
    }
    Ok(())
}

pub fn publish(config: &AppConfig, ids: &[String], draft: bool) -> Result<()> {
    let store = FileArticleStore::new(config.store_dir.clone());
    let publisher = WordPressPublisher::new(config.request_timeout())?;
    let status = if draft {
        PublishStatus::Draft
    } else {
        PublishStatus::Publish
    };
    let runtime = runtime()?;

    if let [id] = ids {
        let receipt =
            runtime.block_on(publish_article(&store, &publisher, &config.clients, id, status))?;
        println!("post {} created: {}", receipt.post_id, receipt.link);
        return Ok(());
    }

    let summary =
        runtime.block_on(bulk_publish(&store, &publisher, &config.clients, ids, status));
    println!(
        "published {}, failed {} (of {})",
        summary.published, summary.failed, summary.total
    );
    if summary.failed > 0 {
        bail!("{} article(s) could not be published", summary.failed);
    }
    Ok(())
}

//! Copydesk engine: article generation, response normalization, storage,
//! format repair, publishing, and the serial generation queue.
mod articles;
mod brainstorm;
mod fix_format;
mod generate;
mod normalize;
mod persist;
mod publish;
mod queue;
mod slug;
mod store;
mod types;

pub use articles::{bulk_delete, update_article_checked, BulkDeleteSummary};
pub use brainstorm::parse_title_list;
pub use fix_format::{
    bulk_fix_format, fix_all, fix_article_format, looks_like_json_blob, repair_article,
    BulkFixSummary, FixOutcome, RepairOutcome,
};
pub use generate::{
    build_article_prompt, language_label, AnthropicGenerator, ArticleGenerator, GenerateError,
    GeneratorSettings,
};
pub use normalize::{
    normalize_response, raw_fallback, strip_code_fences, NormalizedArticle,
    META_DESCRIPTION_CHARS, MIN_CONTENT_CHARS,
};
pub use persist::{ensure_store_dir, AtomicFileWriter, PersistError};
pub use publish::{
    bulk_publish, markdown_to_html, publish_article, BulkPublishSummary, ClientProfile,
    PublishError, PublishReceipt, PublishStatus, WordPressPublisher,
};
pub use queue::{GenerationQueue, QueueError, QueueSettings};
pub use slug::derive_slug;
pub use store::{
    ArticleId, ArticleStatus, ArticleStore, ArticleUpdate, Clock, FileArticleStore, NewArticle,
    StoreError, StoredArticle,
};
pub use types::{GenerationRequest, GenerationResult, QueueEvent, TaskUpdate};

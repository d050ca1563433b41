//! Client-side view of the pipeline.
//!
//! Reads go through a small cache keyed by id. Every mutation is sent to the
//! backend unconditionally; on success the affected entries are dropped so
//! the next read refetches, on failure the cache is left as it was and the
//! error is returned unchanged.
use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::model::{
    Article, BatchPublishRequest, BatchSubmission, PublishRequest, PublishResult,
    PublishWithRetryRequest, Statistics, UploadReceipt, Verdict, WordPressStatistics,
};
use crate::api::{ApiError, ConsoleApi};
use crate::db::{self, Pool};
use crate::model::{ArticleAction, PublishStatus, VerdictAction};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("batch journal: {0:#}")]
    Journal(anyhow::Error),
}

impl ConsoleError {
    /// Backend `detail` if the failure came from a non-2xx response.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ConsoleError::Api(err) => err.detail(),
            ConsoleError::Journal(_) => None,
        }
    }
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub verdicts: Statistics,
    pub articles: Statistics,
    pub wordpress: WordPressStatistics,
}

pub struct Console<A: ConsoleApi> {
    api: A,
    journal: Option<Pool>,
    verdicts: Mutex<HashMap<i64, Verdict>>,
    articles: Mutex<HashMap<i64, Article>>,
}

impl<A: ConsoleApi> Console<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            journal: None,
            verdicts: Mutex::new(HashMap::new()),
            articles: Mutex::new(HashMap::new()),
        }
    }

    /// Record submitted batches in the local journal.
    pub fn with_journal(mut self, pool: Pool) -> Self {
        self.journal = Some(pool);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn verdict(&self, verdict_id: i64) -> Result<Verdict, ConsoleError> {
        if let Some(v) = self.verdicts.lock().await.get(&verdict_id) {
            return Ok(v.clone());
        }
        let verdict = self.api.get_verdict(verdict_id).await?;
        self.verdicts
            .lock()
            .await
            .insert(verdict_id, verdict.clone());
        Ok(verdict)
    }

    pub async fn article(&self, article_id: i64) -> Result<Article, ConsoleError> {
        if let Some(a) = self.articles.lock().await.get(&article_id) {
            return Ok(a.clone());
        }
        let article = self.api.get_article(article_id).await?;
        self.articles
            .lock()
            .await
            .insert(article_id, article.clone());
        Ok(article)
    }

    pub async fn is_verdict_cached(&self, verdict_id: i64) -> bool {
        self.verdicts.lock().await.contains_key(&verdict_id)
    }

    pub async fn is_article_cached(&self, article_id: i64) -> bool {
        self.articles.lock().await.contains_key(&article_id)
    }

    async fn invalidate_verdict(&self, verdict_id: i64) {
        if self.verdicts.lock().await.remove(&verdict_id).is_some() {
            debug!(verdict_id, "verdict cache invalidated");
        }
    }

    async fn invalidate_articles(&self, article_ids: &[i64]) {
        let mut cache = self.articles.lock().await;
        for id in article_ids {
            cache.remove(id);
        }
    }

    pub async fn upload(
        &self,
        file_name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<UploadReceipt, ConsoleError> {
        let receipt = self
            .api
            .upload_verdict(file_name, content, overwrite)
            .await?;
        self.invalidate_verdict(receipt.verdict_id).await;
        Ok(receipt)
    }

    /// Run a stage action. The request is sent even if the cached status does
    /// not offer the action.
    pub async fn perform(
        &self,
        verdict_id: i64,
        action: VerdictAction,
    ) -> Result<Option<Verdict>, ConsoleError> {
        if let Some(cached) = self.verdicts.lock().await.get(&verdict_id) {
            if !cached.status.permits(action) {
                debug!(
                    verdict_id,
                    action = action.as_str(),
                    status = %cached.status,
                    "action not offered for cached status; sending anyway"
                );
            }
        }

        let result = self.api.verdict_action(verdict_id, action).await;
        match result {
            Ok(verdict) => {
                self.invalidate_verdict(verdict_id).await;
                info!(verdict_id, action = action.as_str(), "verdict action accepted");
                Ok(verdict)
            }
            Err(err) => {
                warn!(verdict_id, action = action.as_str(), error = %err, "verdict action rejected");
                Err(err.into())
            }
        }
    }

    pub async fn publish(
        &self,
        article_id: i64,
        req: &PublishRequest,
    ) -> Result<PublishResult, ConsoleError> {
        let result = self.api.publish(article_id, req).await?;
        self.invalidate_articles(&[article_id]).await;
        Ok(result)
    }

    /// Publish letting the backend retry transient WordPress failures. One
    /// request, one terminal answer.
    pub async fn publish_with_retry(
        &self,
        article_id: i64,
        req: &PublishWithRetryRequest,
    ) -> Result<PublishResult, ConsoleError> {
        let result = self.api.publish_with_retry(article_id, req).await?;
        self.invalidate_articles(&[article_id]).await;
        Ok(result)
    }

    pub async fn unpublish(&self, article_id: i64) -> Result<Article, ConsoleError> {
        let article = self.api.unpublish(article_id).await?;
        self.invalidate_articles(&[article_id]).await;
        Ok(article)
    }

    pub async fn sync(&self, article_id: i64) -> Result<Article, ConsoleError> {
        let article = self.api.sync_article(article_id).await?;
        self.invalidate_articles(&[article_id]).await;
        Ok(article)
    }

    /// Start a batch publish and, when a journal is attached, remember it.
    pub async fn submit_batch(
        &self,
        req: &BatchPublishRequest,
    ) -> Result<BatchSubmission, ConsoleError> {
        let submission = self.api.batch_publish(req).await?;
        self.invalidate_articles(&req.article_ids).await;
        info!(
            batch_id = %submission.batch_id,
            total = submission.total,
            "batch publish submitted"
        );
        if let Some(pool) = &self.journal {
            db::record_submission(pool, &submission, req, Utc::now())
                .await
                .map_err(ConsoleError::Journal)?;
        }
        Ok(submission)
    }

    /// Verdict, article and WordPress statistics fetched concurrently.
    pub async fn dashboard(&self) -> Result<Dashboard, ConsoleError> {
        let (verdicts, articles, wordpress) = futures::try_join!(
            self.api.verdict_statistics(),
            self.api.article_statistics(),
            self.api.wordpress_statistics(None),
        )?;
        Ok(Dashboard {
            verdicts,
            articles,
            wordpress,
        })
    }
}

/// Stage actions offered for the verdict's current status.
pub fn available_actions(verdict: &Verdict) -> Vec<VerdictAction> {
    verdict.status.available_actions()
}

/// Article actions offered for the article's publishing state.
pub fn available_article_actions(article: &Article) -> Vec<ArticleAction> {
    if article.wordpress_post_id.is_some() {
        vec![ArticleAction::Sync, ArticleAction::Unpublish]
    } else {
        match article.publish_status {
            PublishStatus::Published => vec![ArticleAction::Unpublish],
            PublishStatus::Ready | PublishStatus::Failed => vec![ArticleAction::Publish],
            PublishStatus::Draft | PublishStatus::PendingReview => Vec::new(),
        }
    }
}

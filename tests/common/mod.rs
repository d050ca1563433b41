#![allow(dead_code)]

use async_trait::async_trait;
use legal_console::api::model::{
    Article, BatchProgress, BatchPublishRequest, BatchSubmission, PublishRequest, PublishResult,
    PublishWithRetryRequest, Statistics, UploadReceipt, Verdict, WordPressStatistics,
};
use legal_console::api::{ApiError, ConsoleApi};
use legal_console::model::{BatchStatus, VerdictAction, VerdictStatus};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn verdict(id: i64, status: VerdictStatus) -> Verdict {
    serde_json::from_value(json!({
        "id": id,
        "file_hash": format!("hash-{id}"),
        "status": status,
        "created_at": "2024-05-01T10:00:00",
        "updated_at": "2024-05-01T10:00:00"
    }))
    .unwrap()
}

pub fn article(id: i64) -> Article {
    serde_json::from_value(json!({
        "id": id,
        "verdict_id": id + 100,
        "title": format!("Article {id}"),
        "overall_score": 80,
        "publish_status": "ready",
        "created_at": "2024-05-01T10:00:00",
        "updated_at": "2024-05-01T10:00:00"
    }))
    .unwrap()
}

pub fn progress(status: BatchStatus, ok: &[i64], failed: &[i64], total: u32) -> BatchProgress {
    serde_json::from_value(json!({
        "status": status,
        "current": ok.len() + failed.len(),
        "total": total,
        "successful": ok,
        "failed": failed
            .iter()
            .map(|id| json!({"article_id": id, "error": "publish failed"}))
            .collect::<Vec<_>>()
    }))
    .unwrap()
}

pub fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        detail: "Batch not found".into(),
    }
}

fn next_status(action: VerdictAction) -> VerdictStatus {
    match action {
        VerdictAction::Anonymize | VerdictAction::ReAnonymize => VerdictStatus::Anonymized,
        VerdictAction::Analyze | VerdictAction::ReAnalyze => VerdictStatus::Analyzed,
        VerdictAction::GenerateArticle => VerdictStatus::ArticleCreated,
        VerdictAction::Reprocess | VerdictAction::Delete => VerdictStatus::Extracted,
    }
}

/// In-memory backend that enforces the verdict state machine and records
/// every call it receives.
#[derive(Clone, Default)]
pub struct RecordingApi {
    verdicts: Arc<Mutex<HashMap<i64, Verdict>>>,
    articles: Arc<Mutex<HashMap<i64, Article>>>,
    progress: Arc<Mutex<VecDeque<Result<BatchProgress, ApiError>>>>,
    publish_results: Arc<Mutex<VecDeque<Result<PublishResult, ApiError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    retry_requests: Arc<Mutex<Vec<PublishWithRetryRequest>>>,
}

impl RecordingApi {
    pub async fn with_verdict(self, v: Verdict) -> Self {
        self.verdicts.lock().await.insert(v.id, v);
        self
    }

    pub async fn with_article(self, a: Article) -> Self {
        self.articles.lock().await.insert(a.id, a);
        self
    }

    pub fn with_progress(responses: Vec<Result<BatchProgress, ApiError>>) -> Self {
        Self {
            progress: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    pub async fn push_publish_result(&self, r: Result<PublishResult, ApiError>) {
        self.publish_results.lock().await.push_back(r);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub async fn retry_requests(&self) -> Vec<PublishWithRetryRequest> {
        self.retry_requests.lock().await.clone()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }

    async fn next_publish_result(&self, article_id: i64) -> Result<PublishResult, ApiError> {
        let scripted = self.publish_results.lock().await.pop_front();
        let result = scripted.unwrap_or_else(|| {
            Ok(serde_json::from_value(json!({
                "success": true,
                "article_id": article_id,
                "wordpress_post_id": 500 + article_id,
                "wordpress_url": format!("https://blog.example/p/{}", 500 + article_id)
            }))
            .unwrap())
        })?;
        if result.success {
            if let Some(a) = self.articles.lock().await.get_mut(&article_id) {
                a.publish_status = legal_console::model::PublishStatus::Published;
                a.wordpress_post_id = result.wordpress_post_id;
                a.wordpress_url = result.wordpress_url.clone();
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl ConsoleApi for RecordingApi {
    async fn upload_verdict(
        &self,
        file_name: &str,
        _content: Vec<u8>,
        overwrite: bool,
    ) -> Result<UploadReceipt, ApiError> {
        self.record(format!("upload {file_name} overwrite={overwrite}"))
            .await;
        let hash = format!("hash-{file_name}");
        let mut verdicts = self.verdicts.lock().await;
        if let Some(existing) = verdicts.values().find(|v| v.file_hash == hash) {
            if !overwrite {
                return Err(ApiError::Status {
                    status: 409,
                    detail: format!("Verdict with this file already exists (ID: {})", existing.id),
                });
            }
        }
        let id = verdicts.keys().max().copied().unwrap_or(0) + 1;
        let mut v = verdict(id, VerdictStatus::Extracted);
        v.file_hash = hash.clone();
        verdicts.insert(id, v);
        Ok(UploadReceipt {
            message: "File uploaded successfully".into(),
            verdict_id: id,
            file_hash: hash,
            status: VerdictStatus::Extracted,
        })
    }

    async fn get_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.record(format!("get_verdict {verdict_id}")).await;
        self.verdicts
            .lock()
            .await
            .get(&verdict_id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                detail: "Verdict not found".into(),
            })
    }

    async fn verdict_action(
        &self,
        verdict_id: i64,
        action: VerdictAction,
    ) -> Result<Option<Verdict>, ApiError> {
        self.record(format!("action {verdict_id} {}", action.as_str()))
            .await;
        let mut verdicts = self.verdicts.lock().await;
        let current = verdicts.get(&verdict_id).ok_or(ApiError::Status {
            status: 404,
            detail: "Verdict not found".into(),
        })?;
        if !current.status.permits(action) {
            return Err(ApiError::Status {
                status: 400,
                detail: format!(
                    "Cannot {} verdict in status {}",
                    action.as_str(),
                    current.status
                ),
            });
        }
        if action == VerdictAction::Delete {
            verdicts.remove(&verdict_id);
            return Ok(None);
        }
        let updated = verdicts.get_mut(&verdict_id).map(|v| {
            v.status = next_status(action);
            v.clone()
        });
        Ok(updated)
    }

    async fn get_article(&self, article_id: i64) -> Result<Article, ApiError> {
        self.record(format!("get_article {article_id}")).await;
        self.articles
            .lock()
            .await
            .get(&article_id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                detail: "Article not found".into(),
            })
    }

    async fn publish(
        &self,
        article_id: i64,
        _req: &PublishRequest,
    ) -> Result<PublishResult, ApiError> {
        self.record(format!("publish {article_id}")).await;
        self.next_publish_result(article_id).await
    }

    async fn publish_with_retry(
        &self,
        article_id: i64,
        req: &PublishWithRetryRequest,
    ) -> Result<PublishResult, ApiError> {
        self.record(format!("publish_with_retry {article_id}")).await;
        self.retry_requests.lock().await.push(req.clone());
        self.next_publish_result(article_id).await
    }

    async fn unpublish(&self, article_id: i64) -> Result<Article, ApiError> {
        self.record(format!("unpublish {article_id}")).await;
        let mut articles = self.articles.lock().await;
        let a = articles.get_mut(&article_id).ok_or(ApiError::Status {
            status: 404,
            detail: "Article not found".into(),
        })?;
        a.publish_status = legal_console::model::PublishStatus::Ready;
        a.wordpress_post_id = None;
        a.wordpress_url = None;
        Ok(a.clone())
    }

    async fn sync_article(&self, article_id: i64) -> Result<Article, ApiError> {
        self.record(format!("sync {article_id}")).await;
        self.articles
            .lock()
            .await
            .get(&article_id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                detail: "Article not found".into(),
            })
    }

    async fn batch_publish(&self, req: &BatchPublishRequest) -> Result<BatchSubmission, ApiError> {
        self.record(format!("batch_publish {:?}", req.article_ids))
            .await;
        req.check().map_err(ApiError::Invalid)?;
        Ok(BatchSubmission {
            batch_id: Uuid::new_v4(),
            status: BatchStatus::Started,
            total: req.article_ids.len() as u32,
        })
    }

    async fn batch_progress(&self, batch_id: &str) -> Result<BatchProgress, ApiError> {
        self.record(format!("batch_progress {batch_id}")).await;
        self.progress
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn verdict_statistics(&self) -> Result<Statistics, ApiError> {
        self.record("verdict_statistics".into()).await;
        Ok(json!({"total": 3, "by_status": {"analyzed": 2, "failed": 1}})
            .as_object()
            .cloned()
            .unwrap_or_default())
    }

    async fn article_statistics(&self) -> Result<Statistics, ApiError> {
        self.record("article_statistics".into()).await;
        Ok(json!({"total": 2, "average_score": 81.5})
            .as_object()
            .cloned()
            .unwrap_or_default())
    }

    async fn wordpress_statistics(
        &self,
        site_id: Option<i64>,
    ) -> Result<WordPressStatistics, ApiError> {
        self.record(format!("wordpress_statistics {site_id:?}")).await;
        Ok(serde_json::from_value(json!({"total_published": 1, "total_sites": 1})).unwrap())
    }
}

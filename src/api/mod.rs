//! Typed gateway to the content pipeline backend (`/api/v1`).
//!
//! Every method maps one backend capability onto one HTTP request. The
//! client keeps no state besides the connection pool: no caching, no
//! client-side retries. Retry policy for publishing is a parameter that the
//! backend applies ([`ApiClient::publish_with_retry`]).
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::model::{PublishStatus, VerdictAction, VerdictStatus};

pub mod model;

use model::*;

const API_PREFIX: &str = "api/v1/";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-2xx status. `detail` is the backend's
    /// message, unmodified.
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected response from {route}: {source}")]
    Decode {
        route: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Rejected before sending.
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("invalid URL: {0}")]
    Url(String),
}

impl ApiError {
    /// Backend `detail` message for non-2xx responses.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Extract the message of an error response. String `detail` is returned
/// verbatim; structured `detail` (validation error lists) as its JSON text;
/// a non-JSON body as-is; an empty body as the status reason phrase.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(Value::String(detail)),
            ..
        }) => detail,
        Ok(ErrorBody {
            detail: Some(detail),
            ..
        }) if !detail.is_null() => detail.to_string(),
        _ if !body.trim().is_empty() => body.to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

/// Operations the console and the batch tracker depend on. [`ApiClient`] is
/// the HTTP implementation; tests substitute recording fakes.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn upload_verdict(
        &self,
        file_name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<UploadReceipt, ApiError>;

    async fn get_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError>;

    /// Run a stage action. Returns the verdict as the backend reports it
    /// afterwards, or `None` when the action removes it.
    async fn verdict_action(
        &self,
        verdict_id: i64,
        action: VerdictAction,
    ) -> Result<Option<Verdict>, ApiError>;

    async fn get_article(&self, article_id: i64) -> Result<Article, ApiError>;

    async fn publish(&self, article_id: i64, req: &PublishRequest)
        -> Result<PublishResult, ApiError>;

    async fn publish_with_retry(
        &self,
        article_id: i64,
        req: &PublishWithRetryRequest,
    ) -> Result<PublishResult, ApiError>;

    async fn unpublish(&self, article_id: i64) -> Result<Article, ApiError>;

    async fn sync_article(&self, article_id: i64) -> Result<Article, ApiError>;

    async fn batch_publish(&self, req: &BatchPublishRequest) -> Result<BatchSubmission, ApiError>;

    async fn batch_progress(&self, batch_id: &str) -> Result<BatchProgress, ApiError>;

    async fn verdict_statistics(&self) -> Result<Statistics, ApiError>;

    async fn article_statistics(&self) -> Result<Statistics, ApiError>;

    async fn wordpress_statistics(
        &self,
        site_id: Option<i64>,
    ) -> Result<WordPressStatistics, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ApiError::Url(format!("{base_url}: {e}")))?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(concat!("legal-console/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        Self::new(
            &cfg.api.base_url,
            cfg.api.token.clone(),
            Duration::from_secs(cfg.api.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, route: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(&format!("{API_PREFIX}{route}"))
            .map_err(|e| ApiError::Url(format!("{route}: {e}")))
    }

    fn request(&self, method: Method, route: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(route)?;
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn execute(&self, route: &str, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!(route, status = status.as_u16(), %detail, "api error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(res)
    }

    async fn fetch<T: DeserializeOwned>(&self, route: &str, builder: RequestBuilder) -> Result<T, ApiError> {
        let res = self.execute(route, builder).await?;
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            route: route.to_string(),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, route)?;
        self.fetch(route, builder).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, route)?.json(body);
        self.fetch(route, builder).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, route: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, route)?;
        self.fetch(route, builder).await
    }

    async fn delete(&self, route: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, route)?;
        self.execute(route, builder).await?;
        Ok(())
    }

    // -- verdicts ----------------------------------------------------------

    /// Upload a verdict document. With `overwrite = false` the backend rejects
    /// a file whose content hash already exists (409) and leaves the existing
    /// verdict untouched.
    pub async fn upload_verdict(
        &self,
        file_name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<UploadReceipt, ApiError> {
        let route = "verdicts/upload";
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(content_type(Path::new(file_name)))?;
        let form = Form::new().part("file", part);
        let builder = self
            .request(Method::POST, route)?
            .query(&[("overwrite", overwrite)])
            .multipart(form);
        let receipt: UploadReceipt = self.fetch(route, builder).await?;
        info!(
            verdict_id = receipt.verdict_id,
            file_hash = %receipt.file_hash,
            status = %receipt.status,
            "verdict uploaded"
        );
        Ok(receipt)
    }

    pub async fn list_verdicts(
        &self,
        query: ListQuery,
        status: Option<VerdictStatus>,
    ) -> Result<Page<VerdictSummary>, ApiError> {
        let route = "verdicts/";
        let mut params = vec![
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        let builder = self.request(Method::GET, route)?.query(&params);
        self.fetch(route, builder).await
    }

    pub async fn get_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.get(&format!("verdicts/{verdict_id}")).await
    }

    pub async fn delete_verdict(&self, verdict_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("verdicts/{verdict_id}")).await
    }

    pub async fn anonymize_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.post_empty(&format!("verdicts/{verdict_id}/anonymize")).await
    }

    pub async fn re_anonymize_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.post_empty(&format!("verdicts/{verdict_id}/re-anonymize")).await
    }

    pub async fn reprocess_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.post_empty(&format!("verdicts/{verdict_id}/reprocess")).await
    }

    pub async fn analyze_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.post_empty(&format!("articles/verdicts/{verdict_id}/analyze"))
            .await
    }

    pub async fn re_analyze_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.post_empty(&format!("articles/verdicts/{verdict_id}/re-analyze"))
            .await
    }

    /// Starts article generation; the verdict reaches `article_created` later.
    pub async fn generate_article(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        self.post_empty(&format!("articles/generate/{verdict_id}")).await
    }

    pub async fn verdict_statistics(&self) -> Result<Statistics, ApiError> {
        self.get("verdicts/statistics/overview").await
    }

    pub async fn anonymization_statistics(&self) -> Result<Statistics, ApiError> {
        self.get("verdicts/statistics/anonymization").await
    }

    pub async fn analysis_statistics(&self) -> Result<Statistics, ApiError> {
        self.get("articles/verdicts/statistics/analysis").await
    }

    // -- articles ----------------------------------------------------------

    pub async fn list_articles(
        &self,
        query: ListQuery,
        status: Option<PublishStatus>,
    ) -> Result<Page<ArticleSummary>, ApiError> {
        let route = "articles";
        let mut params = vec![
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        let builder = self.request(Method::GET, route)?.query(&params);
        self.fetch(route, builder).await
    }

    pub async fn get_article(&self, article_id: i64) -> Result<Article, ApiError> {
        let article: Article = self.get(&format!("articles/{article_id}")).await?;
        article.validate().map_err(ApiError::InvalidResponse)?;
        Ok(article)
    }

    pub async fn article_by_verdict(&self, verdict_id: i64) -> Result<Article, ApiError> {
        let article: Article = self
            .get(&format!("articles/by-verdict/{verdict_id}"))
            .await?;
        article.validate().map_err(ApiError::InvalidResponse)?;
        Ok(article)
    }

    pub async fn article_statistics(&self) -> Result<Statistics, ApiError> {
        self.get("articles/statistics/overview").await
    }

    // -- wordpress sites ---------------------------------------------------

    pub async fn list_sites(&self) -> Result<Vec<WordPressSite>, ApiError> {
        self.get("wordpress/sites").await
    }

    pub async fn get_site(&self, site_id: i64) -> Result<WordPressSite, ApiError> {
        self.get(&format!("wordpress/sites/{site_id}")).await
    }

    pub async fn create_site(&self, site: &SiteCreate) -> Result<WordPressSite, ApiError> {
        let created: WordPressSite = self.post("wordpress/sites", site).await?;
        info!(site_id = created.id, site = %created.site_name, "wordpress site created");
        Ok(created)
    }

    pub async fn update_site(&self, site_id: i64, update: &SiteUpdate) -> Result<WordPressSite, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Invalid("site update has no fields".into()));
        }
        let route = format!("wordpress/sites/{site_id}");
        let builder = self.request(Method::PUT, &route)?.json(update);
        self.fetch(&route, builder).await
    }

    pub async fn delete_site(&self, site_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("wordpress/sites/{site_id}")).await
    }

    pub async fn test_site(&self, site_id: i64) -> Result<SiteTestResult, ApiError> {
        self.get(&format!("wordpress/sites/{site_id}/test")).await
    }

    pub async fn site_categories(&self, site_id: i64) -> Result<Vec<WordPressCategory>, ApiError> {
        self.get(&format!("wordpress/sites/{site_id}/categories"))
            .await
    }

    pub async fn site_tags(&self, site_id: i64) -> Result<Vec<WordPressTag>, ApiError> {
        self.get(&format!("wordpress/sites/{site_id}/tags")).await
    }

    // -- publishing --------------------------------------------------------

    /// One publish attempt. Fails on the first error.
    pub async fn publish(&self, article_id: i64, req: &PublishRequest) -> Result<PublishResult, ApiError> {
        let result: PublishResult = self
            .post(&format!("wordpress/publish/{article_id}"), req)
            .await?;
        result.validate().map_err(ApiError::InvalidResponse)?;
        Ok(result)
    }

    /// Publish with the backend retrying transient failures up to
    /// `max_retries` times, `retry_delay` seconds apart. Exactly one request
    /// is sent; the response is terminal.
    pub async fn publish_with_retry(
        &self,
        article_id: i64,
        req: &PublishWithRetryRequest,
    ) -> Result<PublishResult, ApiError> {
        if !req.retry_delay.is_finite() || req.retry_delay < 0.0 {
            return Err(ApiError::Invalid(format!(
                "retry_delay must be a non-negative number of seconds (got {})",
                req.retry_delay
            )));
        }
        let route = format!("wordpress/articles/{article_id}/publish");
        let budget = retry_budget(self.timeout, req);
        debug!(article_id, budget_secs = budget.as_secs_f64(), "publish with retry");
        let builder = self
            .request(Method::POST, &route)?
            .json(req)
            .timeout(budget);
        let result: PublishResult = self.fetch(&route, builder).await?;
        result.validate().map_err(ApiError::InvalidResponse)?;
        Ok(result)
    }

    pub async fn unpublish(&self, article_id: i64) -> Result<Article, ApiError> {
        let article: Article = self
            .post_empty(&format!("wordpress/unpublish/{article_id}"))
            .await?;
        article.validate().map_err(ApiError::InvalidResponse)?;
        Ok(article)
    }

    /// Submit articles for asynchronous publishing; poll
    /// [`ApiClient::batch_progress`] with the returned id.
    pub async fn batch_publish(&self, req: &BatchPublishRequest) -> Result<BatchSubmission, ApiError> {
        req.check().map_err(ApiError::Invalid)?;
        let submission: BatchSubmission = self.post("wordpress/articles/batch-publish", req).await?;
        info!(
            batch_id = %submission.batch_id,
            total = submission.total,
            "batch submitted"
        );
        Ok(submission)
    }

    pub async fn batch_progress(&self, batch_id: &str) -> Result<BatchProgress, ApiError> {
        let progress: BatchProgress = self
            .get(&format!("wordpress/articles/batch-publish/{batch_id}/progress"))
            .await?;
        progress.validate().map_err(ApiError::InvalidResponse)?;
        Ok(progress)
    }

    pub async fn republish_failed(&self, req: &RepublishFailedRequest) -> Result<BatchPublishResult, ApiError> {
        let result: BatchPublishResult = self
            .post("wordpress/articles/republish-failed", req)
            .await?;
        result.validate().map_err(ApiError::InvalidResponse)?;
        Ok(result)
    }

    pub async fn validate_article(&self, article_id: i64) -> Result<ArticleValidation, ApiError> {
        self.get(&format!("wordpress/articles/{article_id}/validate"))
            .await
    }

    /// Reconcile the article's publish state with its WordPress post.
    pub async fn sync_article(&self, article_id: i64) -> Result<Article, ApiError> {
        let article: Article = self
            .post_empty(&format!("wordpress/articles/{article_id}/sync"))
            .await?;
        article.validate().map_err(ApiError::InvalidResponse)?;
        Ok(article)
    }

    pub async fn wordpress_statistics(&self, site_id: Option<i64>) -> Result<WordPressStatistics, ApiError> {
        let route = "wordpress/statistics";
        let mut builder = self.request(Method::GET, route)?;
        if let Some(site_id) = site_id {
            builder = builder.query(&[("site_id", site_id)]);
        }
        self.fetch(route, builder).await
    }

    /// Advisory schedule; nothing is published.
    pub async fn schedule_queue(&self, req: &QueueRequest) -> Result<PublishingQueue, ApiError> {
        if req.articles_per_day == 0 {
            return Err(ApiError::Invalid("articles_per_day must be > 0".into()));
        }
        self.post("wordpress/queue/schedule", req).await
    }

    pub async fn unpublished_articles(&self, min_score: u8, limit: u32) -> Result<Vec<ArticleSummary>, ApiError> {
        let route = "wordpress/articles/unpublished";
        let builder = self.request(Method::GET, route)?.query(&[
            ("min_score", u32::from(min_score)),
            ("limit", limit.clamp(1, MAX_PAGE_LIMIT)),
        ]);
        self.fetch(route, builder).await
    }
}

#[async_trait]
impl ConsoleApi for ApiClient {
    async fn upload_verdict(
        &self,
        file_name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<UploadReceipt, ApiError> {
        ApiClient::upload_verdict(self, file_name, content, overwrite).await
    }

    async fn get_verdict(&self, verdict_id: i64) -> Result<Verdict, ApiError> {
        ApiClient::get_verdict(self, verdict_id).await
    }

    async fn verdict_action(
        &self,
        verdict_id: i64,
        action: VerdictAction,
    ) -> Result<Option<Verdict>, ApiError> {
        let verdict = match action {
            VerdictAction::Anonymize => self.anonymize_verdict(verdict_id).await?,
            VerdictAction::ReAnonymize => self.re_anonymize_verdict(verdict_id).await?,
            VerdictAction::Analyze => self.analyze_verdict(verdict_id).await?,
            VerdictAction::ReAnalyze => self.re_analyze_verdict(verdict_id).await?,
            VerdictAction::GenerateArticle => self.generate_article(verdict_id).await?,
            VerdictAction::Reprocess => self.reprocess_verdict(verdict_id).await?,
            VerdictAction::Delete => {
                self.delete_verdict(verdict_id).await?;
                return Ok(None);
            }
        };
        Ok(Some(verdict))
    }

    async fn get_article(&self, article_id: i64) -> Result<Article, ApiError> {
        ApiClient::get_article(self, article_id).await
    }

    async fn publish(&self, article_id: i64, req: &PublishRequest) -> Result<PublishResult, ApiError> {
        ApiClient::publish(self, article_id, req).await
    }

    async fn publish_with_retry(
        &self,
        article_id: i64,
        req: &PublishWithRetryRequest,
    ) -> Result<PublishResult, ApiError> {
        ApiClient::publish_with_retry(self, article_id, req).await
    }

    async fn unpublish(&self, article_id: i64) -> Result<Article, ApiError> {
        ApiClient::unpublish(self, article_id).await
    }

    async fn sync_article(&self, article_id: i64) -> Result<Article, ApiError> {
        ApiClient::sync_article(self, article_id).await
    }

    async fn batch_publish(&self, req: &BatchPublishRequest) -> Result<BatchSubmission, ApiError> {
        ApiClient::batch_publish(self, req).await
    }

    async fn batch_progress(&self, batch_id: &str) -> Result<BatchProgress, ApiError> {
        ApiClient::batch_progress(self, batch_id).await
    }

    async fn verdict_statistics(&self) -> Result<Statistics, ApiError> {
        ApiClient::verdict_statistics(self).await
    }

    async fn article_statistics(&self) -> Result<Statistics, ApiError> {
        ApiClient::article_statistics(self).await
    }

    async fn wordpress_statistics(&self, site_id: Option<i64>) -> Result<WordPressStatistics, ApiError> {
        ApiClient::wordpress_statistics(self, site_id).await
    }
}

/// Time to wait for the single terminal answer of a publish-with-retry: one
/// client timeout per backend attempt plus the backend's growing pauses
/// (`retry_delay * n` after attempt `n`).
fn retry_budget(timeout: Duration, req: &PublishWithRetryRequest) -> Duration {
    let attempts = req.max_retries.max(1);
    let pauses = f64::from(attempts) * f64::from(attempts + 1) / 2.0;
    timeout.saturating_mul(attempts) + Duration::from_secs_f64(req.retry_delay * pauses)
}

fn content_type(file_path: &Path) -> &'static str {
    match file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
    {
        Some(ext) if ext == "pdf" => "application/pdf",
        Some(ext) if ext == "txt" => "text/plain",
        Some(ext) if ext == "doc" => "application/msword",
        Some(ext) if ext == "docx" => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

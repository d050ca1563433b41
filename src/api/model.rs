//! Wire shapes exchanged with the `/api/v1` backend.
//!
//! Responses are decoded leniently (optional fields default) but a few
//! invariants are checked after decoding; see the `validate` methods.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::model::{
    BatchStatus, PostStatus, PrivacyRiskLevel, PublishStatus, SeoPlugin, VerdictStatus,
};

/// Upper bound on the page size the backend accepts.
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Upper bound on the number of articles in one batch submission.
pub const MAX_BATCH_ARTICLES: usize = 100;

/// The backend emits naive UTC timestamps (`2024-05-01T10:00:00.123456`);
/// RFC 3339 is accepted as well.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|n| n.and_utc())
            })
    }

    pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use super::parse;
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            }
        }
    }
}

/// Error body returned by the backend on any non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// `skip`/`limit` query parameters; `limit` is clamped into `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub skip: u32,
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { skip: 0, limit: 50 }
    }
}

impl ListQuery {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictSummary {
    pub id: i64,
    pub file_hash: String,
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub case_number_display: Option<String>,
    #[serde(default)]
    pub court_name: Option<String>,
    #[serde(default)]
    pub court_level: Option<String>,
    #[serde(default)]
    pub judge_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub verdict_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub legal_area: Option<String>,
    pub status: VerdictStatus,
    #[serde(default)]
    pub requires_manual_review: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub id: i64,
    pub file_hash: String,
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub case_number_display: Option<String>,
    #[serde(default)]
    pub court_name: Option<String>,
    #[serde(default)]
    pub court_level: Option<String>,
    #[serde(default)]
    pub judge_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub verdict_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub legal_area: Option<String>,
    #[serde(default)]
    pub legal_sub_area: Option<String>,

    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub cleaned_text: Option<String>,
    #[serde(default)]
    pub anonymized_text: Option<String>,
    #[serde(default)]
    pub anonymization_report: Option<Value>,
    #[serde(default)]
    pub privacy_risk_level: Option<PrivacyRiskLevel>,

    #[serde(default)]
    pub key_facts: Option<Vec<String>>,
    #[serde(default)]
    pub legal_questions: Option<Vec<String>>,
    #[serde(default)]
    pub legal_principles: Option<Vec<String>>,
    #[serde(default)]
    pub compensation_amount: Option<f64>,
    #[serde(default)]
    pub compensation_breakdown: Option<Value>,
    #[serde(default)]
    pub relevant_laws: Option<Vec<Value>>,
    #[serde(default)]
    pub precedents_cited: Option<Vec<Value>>,
    #[serde(default)]
    pub practical_insights: Option<Vec<String>>,

    pub status: VerdictStatus,
    #[serde(default)]
    pub requires_manual_review: bool,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

/// Response to a verdict file upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    pub verdict_id: i64,
    pub file_hash: String,
    pub status: VerdictStatus,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityIssue {
    #[serde(rename = "type", default = "default_issue_kind")]
    pub kind: String,
    pub message: String,
}

fn default_issue_kind() -> String {
    "warning".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IssueRepr {
    Legacy(String),
    Structured(QualityIssue),
    Other(Value),
}

/// Older articles store issues as bare strings; those become warnings and
/// anything unrecognised is dropped.
fn quality_issues<'de, D>(d: D) -> Result<Option<Vec<QualityIssue>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<IssueRepr>> = Option::deserialize(d)?;
    Ok(raw.map(|items| {
        items
            .into_iter()
            .filter_map(|item| match item {
                IssueRepr::Legacy(message) => Some(QualityIssue {
                    kind: default_issue_kind(),
                    message,
                }),
                IssueRepr::Structured(issue) => Some(issue),
                IssueRepr::Other(_) => None,
            })
            .collect()
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub verdict_id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category_primary: Option<String>,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub overall_score: u8,
    pub publish_status: PublishStatus,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub verdict_id: i64,

    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,

    #[serde(default)]
    pub content_html: String,
    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(default)]
    pub focus_keyword: Option<String>,
    #[serde(default)]
    pub secondary_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub long_tail_keywords: Option<Vec<String>>,

    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub reading_time_minutes: Option<u32>,

    #[serde(default)]
    pub faq_items: Option<Vec<Value>>,
    #[serde(default)]
    pub common_mistakes: Option<Vec<Value>>,
    #[serde(default)]
    pub schema_article: Option<Value>,
    #[serde(default)]
    pub schema_faq: Option<Value>,
    #[serde(default)]
    pub internal_links: Option<Vec<Value>>,
    #[serde(default)]
    pub external_links: Option<Vec<Value>>,

    #[serde(default)]
    pub category_primary: Option<String>,
    #[serde(default)]
    pub categories_secondary: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub featured_image_prompt: Option<String>,
    #[serde(default)]
    pub featured_image_alt: Option<String>,

    #[serde(default)]
    pub content_score: u8,
    #[serde(default)]
    pub seo_score: u8,
    #[serde(default)]
    pub readability_score: u8,
    #[serde(default)]
    pub eeat_score: u8,
    #[serde(default)]
    pub overall_score: u8,
    #[serde(default, deserialize_with = "quality_issues")]
    pub quality_issues: Option<Vec<QualityIssue>>,

    pub publish_status: PublishStatus,
    #[serde(default)]
    pub wordpress_post_id: Option<i64>,
    #[serde(default)]
    pub wordpress_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Scores, in display order.
    pub fn scores(&self) -> [(&'static str, u8); 5] {
        [
            ("content", self.content_score),
            ("seo", self.seo_score),
            ("readability", self.readability_score),
            ("e-e-a-t", self.eeat_score),
            ("overall", self.overall_score),
        ]
    }

    /// WordPress id and URL travel together, and only a published article
    /// may carry them.
    pub fn validate(&self) -> Result<(), String> {
        for (name, score) in self.scores() {
            if score > 100 {
                return Err(format!(
                    "article {}: {name} score {score} is outside 0..=100",
                    self.id
                ));
            }
        }
        if self.wordpress_post_id.is_some() != self.wordpress_url.is_some() {
            return Err(format!(
                "article {}: wordpress_post_id and wordpress_url must be set together",
                self.id
            ));
        }
        if self.wordpress_post_id.is_some() && self.publish_status != PublishStatus::Published {
            return Err(format!(
                "article {}: has a WordPress post but publish_status is {}",
                self.id, self.publish_status
            ));
        }
        Ok(())
    }
}

/// Result of the pre-publish content check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleValidation {
    #[serde(default)]
    pub article_id: Option<i64>,
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// WordPress sites
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressSite {
    pub id: i64,
    pub site_name: String,
    pub site_url: String,
    pub api_username: String,
    #[serde(default)]
    pub seo_plugin: SeoPlugin,
    #[serde(default)]
    pub default_category_id: Option<i64>,
    #[serde(default)]
    pub default_author_id: Option<i64>,
    #[serde(default)]
    pub categories_map: Option<BTreeMap<String, i64>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Serialize)]
pub struct SiteCreate {
    pub site_name: String,
    pub site_url: String,
    pub api_username: String,
    pub api_password: String,
    pub seo_plugin: SeoPlugin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories_map: Option<BTreeMap<String, i64>>,
}

impl fmt::Debug for SiteCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteCreate")
            .field("site_name", &self.site_name)
            .field("site_url", &self.site_url)
            .field("api_username", &self.api_username)
            .field("seo_plugin", &self.seo_plugin)
            .finish_non_exhaustive()
    }
}

/// Partial site update; only the fields that are `Some` are sent.
#[derive(Clone, Default, Serialize)]
pub struct SiteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_plugin: Option<SeoPlugin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl fmt::Debug for SiteUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteUpdate")
            .field("site_name", &self.site_name)
            .field("site_url", &self.site_url)
            .field("api_username", &self.api_username)
            .field(
                "api_password",
                &self.api_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("seo_plugin", &self.seo_plugin)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

impl SiteUpdate {
    pub fn is_empty(&self) -> bool {
        self.site_name.is_none()
            && self.site_url.is_none()
            && self.api_username.is_none()
            && self.api_password.is_none()
            && self.seo_plugin.is_none()
            && self.default_category_id.is_none()
            && self.default_author_id.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteTestResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub site_info: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressTag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Single publish attempt; the backend does not retry.
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    pub site_id: i64,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_names: Option<Vec<String>>,
}

impl PublishRequest {
    pub fn new(site_id: i64, status: PostStatus) -> Self {
        Self {
            site_id,
            status,
            author_id: None,
            category_ids: None,
            tag_names: None,
        }
    }
}

/// Publish with a retry policy the backend applies on its side.
/// `retry_delay` is in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct PublishWithRetryRequest {
    pub site_id: i64,
    pub status: PostStatus,
    pub max_retries: u32,
    pub retry_delay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub article_id: i64,
    #[serde(default)]
    pub wordpress_post_id: Option<i64>,
    #[serde(default)]
    pub wordpress_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PublishResult {
    pub fn validate(&self) -> Result<(), String> {
        if self.success && self.wordpress_post_id.is_none() {
            return Err(format!(
                "publish of article {} reported success without a WordPress post id",
                self.article_id
            ));
        }
        if self.wordpress_post_id.is_some() != self.wordpress_url.is_some() {
            return Err(format!(
                "publish of article {}: wordpress_post_id and wordpress_url must be set together",
                self.article_id
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchPublishRequest {
    pub article_ids: Vec<i64>,
    pub site_id: i64,
    pub status: PostStatus,
    pub stop_on_error: bool,
}

impl BatchPublishRequest {
    /// 1..=100 distinct article ids.
    pub fn check(&self) -> Result<(), String> {
        if self.article_ids.is_empty() {
            return Err("batch must contain at least one article".into());
        }
        if self.article_ids.len() > MAX_BATCH_ARTICLES {
            return Err(format!(
                "cannot publish more than {MAX_BATCH_ARTICLES} articles at once (got {})",
                self.article_ids.len()
            ));
        }
        let mut seen = HashSet::with_capacity(self.article_ids.len());
        if let Some(dup) = self.article_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(format!("article {dup} appears more than once in the batch"));
        }
        Ok(())
    }
}

/// Acknowledgement of a batch submission. Publishing happens afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSubmission {
    pub batch_id: Uuid,
    pub status: BatchStatus,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchFailure {
    pub article_id: i64,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchProgress {
    pub status: BatchStatus,
    #[serde(default)]
    pub current: u32,
    pub total: u32,
    #[serde(default)]
    pub successful: Vec<i64>,
    #[serde(default)]
    pub failed: Vec<BatchFailure>,
    #[serde(default)]
    pub current_article_id: Option<i64>,
}

impl BatchProgress {
    /// Articles with a final outcome so far.
    pub fn completed(&self) -> u32 {
        u32::try_from(self.successful.len() + self.failed.len()).unwrap_or(u32::MAX)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.current > self.total {
            return Err(format!(
                "batch progress current {} exceeds total {}",
                self.current, self.total
            ));
        }
        if self.completed() > self.total {
            return Err(format!(
                "batch progress reports {} outcomes for {} articles",
                self.completed(),
                self.total
            ));
        }
        Ok(())
    }

    /// Aggregate outcome of a finished batch. `None` while still running.
    pub fn result(&self) -> Option<BatchPublishResult> {
        if !self.is_terminal() {
            return None;
        }
        Some(BatchPublishResult {
            successful: self.successful.clone(),
            failed: self.failed.clone(),
            total: self.total,
            success_count: u32::try_from(self.successful.len()).unwrap_or(u32::MAX),
            error_count: u32::try_from(self.failed.len()).unwrap_or(u32::MAX),
            message: None,
        })
    }
}

/// Per-article outcomes of a multi-article publish. Partial failure is data,
/// not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchPublishResult {
    #[serde(default)]
    pub successful: Vec<i64>,
    #[serde(default)]
    pub failed: Vec<BatchFailure>,
    pub total: u32,
    pub success_count: u32,
    pub error_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchPublishResult {
    pub fn validate(&self) -> Result<(), String> {
        let outcomes = u64::from(self.success_count) + u64::from(self.error_count);
        if outcomes > u64::from(self.total) {
            return Err(format!(
                "{outcomes} outcomes reported for a batch of {}",
                self.total
            ));
        }
        if self.success_count as usize != self.successful.len() {
            return Err(format!(
                "success_count {} does not match {} successful ids",
                self.success_count,
                self.successful.len()
            ));
        }
        if self.error_count as usize != self.failed.len() {
            return Err(format!(
                "error_count {} does not match {} failures",
                self.error_count,
                self.failed.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RepublishFailedRequest {
    pub site_id: i64,
    pub max_articles: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueRequest {
    pub site_id: i64,
    pub articles_per_day: u32,
    pub min_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedArticle {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub overall_score: u8,
    #[serde(default)]
    pub focus_keyword: Option<String>,
}

/// Advisory publishing schedule computed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishingQueue {
    pub site_id: i64,
    pub total_queued: u32,
    pub articles_per_day: u32,
    pub estimated_days: u32,
    #[serde(default)]
    pub articles: Vec<QueuedArticle>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Server-computed aggregate whose keys the console does not interpret.
pub type Statistics = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPublication {
    pub article_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub wordpress_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressStatistics {
    #[serde(default)]
    pub total_published: u64,
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub total_sites: u64,
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub recent_publications: Vec<RecentPublication>,
}

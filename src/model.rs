//! Domain enums shared by the gateway client, the console and the journal.
//!
//! The backend owns every state machine here; the client mirrors the legal
//! transitions only to decide which actions to offer.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a verdict as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    New,
    Uploaded,
    Processing,
    Extracting,
    Extracted,
    Cleaned,
    Anonymizing,
    Anonymized,
    Analyzing,
    Analyzed,
    ArticleCreated,
    Published,
    Failed,
}

impl VerdictStatus {
    pub const ALL: [VerdictStatus; 13] = [
        VerdictStatus::New,
        VerdictStatus::Uploaded,
        VerdictStatus::Processing,
        VerdictStatus::Extracting,
        VerdictStatus::Extracted,
        VerdictStatus::Cleaned,
        VerdictStatus::Anonymizing,
        VerdictStatus::Anonymized,
        VerdictStatus::Analyzing,
        VerdictStatus::Analyzed,
        VerdictStatus::ArticleCreated,
        VerdictStatus::Published,
        VerdictStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::New => "new",
            VerdictStatus::Uploaded => "uploaded",
            VerdictStatus::Processing => "processing",
            VerdictStatus::Extracting => "extracting",
            VerdictStatus::Extracted => "extracted",
            VerdictStatus::Cleaned => "cleaned",
            VerdictStatus::Anonymizing => "anonymizing",
            VerdictStatus::Anonymized => "anonymized",
            VerdictStatus::Analyzing => "analyzing",
            VerdictStatus::Analyzed => "analyzed",
            VerdictStatus::ArticleCreated => "article_created",
            VerdictStatus::Published => "published",
            VerdictStatus::Failed => "failed",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// True once text extraction has finished, i.e. the verdict has text the
    /// later stages can work on.
    pub fn is_extracted(&self) -> bool {
        !matches!(
            self,
            VerdictStatus::New
                | VerdictStatus::Uploaded
                | VerdictStatus::Processing
                | VerdictStatus::Extracting
        )
    }

    /// A background stage is running on the backend.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            VerdictStatus::Processing
                | VerdictStatus::Extracting
                | VerdictStatus::Anonymizing
                | VerdictStatus::Analyzing
        )
    }

    pub fn permits(&self, action: VerdictAction) -> bool {
        match action {
            VerdictAction::Anonymize => matches!(
                self,
                VerdictStatus::Extracted | VerdictStatus::Cleaned | VerdictStatus::Failed
            ),
            VerdictAction::ReAnonymize => matches!(
                self,
                VerdictStatus::Anonymized
                    | VerdictStatus::Analyzed
                    | VerdictStatus::ArticleCreated
                    | VerdictStatus::Failed
            ),
            VerdictAction::Analyze => {
                matches!(self, VerdictStatus::Anonymized | VerdictStatus::Analyzed)
            }
            VerdictAction::ReAnalyze => matches!(
                self,
                VerdictStatus::Analyzed | VerdictStatus::ArticleCreated | VerdictStatus::Published
            ),
            VerdictAction::GenerateArticle => matches!(self, VerdictStatus::Analyzed),
            VerdictAction::Reprocess => self.is_extracted() && !self.is_busy(),
            VerdictAction::Delete => true,
        }
    }

    /// Actions to offer for this status, in pipeline order.
    pub fn available_actions(&self) -> Vec<VerdictAction> {
        VerdictAction::ALL
            .into_iter()
            .filter(|a| self.permits(*a))
            .collect()
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage transition the console can request for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictAction {
    Anonymize,
    ReAnonymize,
    Analyze,
    ReAnalyze,
    GenerateArticle,
    Reprocess,
    Delete,
}

impl VerdictAction {
    pub const ALL: [VerdictAction; 7] = [
        VerdictAction::Anonymize,
        VerdictAction::ReAnonymize,
        VerdictAction::Analyze,
        VerdictAction::ReAnalyze,
        VerdictAction::GenerateArticle,
        VerdictAction::Reprocess,
        VerdictAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictAction::Anonymize => "anonymize",
            VerdictAction::ReAnonymize => "re-anonymize",
            VerdictAction::Analyze => "analyze",
            VerdictAction::ReAnalyze => "re-analyze",
            VerdictAction::GenerateArticle => "generate",
            VerdictAction::Reprocess => "reprocess",
            VerdictAction::Delete => "delete",
        }
    }
}

impl fmt::Display for VerdictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishing state of a generated article.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Draft,
    PendingReview,
    Ready,
    Published,
    Failed,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::PendingReview => "pending_review",
            PublishStatus::Ready => "ready",
            PublishStatus::Published => "published",
            PublishStatus::Failed => "failed",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        [
            PublishStatus::Draft,
            PublishStatus::PendingReview,
            PublishStatus::Ready,
            PublishStatus::Published,
            PublishStatus::Failed,
        ]
        .into_iter()
        .find(|st| st.as_str() == s)
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article-level actions offered by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleAction {
    Publish,
    Unpublish,
    Sync,
}

impl ArticleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleAction::Publish => "publish",
            ArticleAction::Unpublish => "unpublish",
            ArticleAction::Sync => "sync",
        }
    }
}

/// Post status requested from WordPress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Publish,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
            PostStatus::Private => "private",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "publish" => Some(PostStatus::Publish),
            "private" => Some(PostStatus::Private),
            _ => None,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeoPlugin {
    Yoast,
    Rankmath,
    #[default]
    None,
}

impl SeoPlugin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoPlugin::Yoast => "yoast",
            SeoPlugin::Rankmath => "rankmath",
            SeoPlugin::None => "none",
        }
    }

    pub fn parse_plugin(s: &str) -> Option<Self> {
        match s {
            "yoast" => Some(SeoPlugin::Yoast),
            "rankmath" => Some(SeoPlugin::Rankmath),
            "none" => Some(SeoPlugin::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyRiskLevel {
    Low,
    Medium,
    High,
}

/// Batch job status as reported by the progress endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Started,
    Pending,
    Processing,
    Completed,
    Error,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Started => "started",
            BatchStatus::Pending => "pending",
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
            BatchStatus::Error => "error",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        match s {
            "started" => Some(BatchStatus::Started),
            "pending" => Some(BatchStatus::Pending),
            "processing" => Some(BatchStatus::Processing),
            "completed" => Some(BatchStatus::Completed),
            "error" => Some(BatchStatus::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Error)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

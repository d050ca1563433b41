//! Journal entry model.

use chrono::{DateTime, Utc};

use crate::api::model::BatchProgress;
use crate::model::BatchStatus;

/// One submitted batch as last observed by this console.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub batch_id: String,
    pub site_id: i64,
    pub post_status: String,
    pub article_ids: Vec<i64>,
    pub total: u32,
    pub status: BatchStatus,
    /// High-water mark of articles with a final outcome.
    pub completed: u32,
    pub last_progress: Option<BatchProgress>,
    pub submitted_at: DateTime<Utc>,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub abandoned: bool,
}

impl JournalEntry {
    pub fn is_active(&self) -> bool {
        self.finished_at.is_none() && !self.abandoned
    }

    /// The backend has answered at least one progress lookup for this batch.
    pub fn observed(&self) -> bool {
        self.last_progress.is_some()
    }
}

//! Batch progress polling.
//!
//! The backend has no push channel for batch publishing; callers poll at
//! their own cadence. The tracker pairs each lookup with the local journal so
//! that the completed count never goes backwards and a 404 can be told apart
//! as pending, expired or unknown.
use anyhow::Result;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::api::model::BatchProgress;
use crate::api::ConsoleApi;
use crate::db::{self, JournalEntry, Pool};

/// Outcome of a single progress lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchLookup {
    Progress(BatchProgress),
    /// Submitted by this console but not yet visible on the backend.
    Pending,
    /// The backend dropped a batch it previously reported on.
    Expired { last: Option<BatchProgress> },
    NotFound,
}

/// How a [`BatchTracker::watch`] loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEnd {
    Finished(BatchProgress),
    Expired { last: Option<BatchProgress> },
    NotFound,
    TimedOut { last: Option<BatchProgress> },
}

pub struct BatchTracker<'a> {
    api: &'a dyn ConsoleApi,
    pool: &'a Pool,
    pending_grace: Duration,
}

impl<'a> BatchTracker<'a> {
    pub fn new(api: &'a dyn ConsoleApi, pool: &'a Pool, pending_grace: Duration) -> Self {
        Self {
            api,
            pool,
            pending_grace,
        }
    }

    /// One progress lookup.
    #[instrument(skip_all, fields(batch_id = %batch_id))]
    pub async fn poll(&self, batch_id: &str) -> Result<BatchLookup> {
        let entry = db::get_batch(self.pool, batch_id).await?;
        let now = Utc::now();

        let progress = match self.api.batch_progress(batch_id).await {
            Ok(progress) => progress,
            Err(err) if err.is_not_found() => return self.resolve_missing(batch_id, entry).await,
            Err(err) => return Err(err.into()),
        };

        let Some(entry) = entry else {
            debug!("batch not in journal; reporting progress as is");
            return Ok(BatchLookup::Progress(progress));
        };

        if progress.completed() < entry.completed {
            warn!(
                completed = progress.completed(),
                high_water = entry.completed,
                "progress went backwards; keeping last snapshot"
            );
            db::touch_polled(self.pool, batch_id, now).await?;
            return Ok(BatchLookup::Progress(
                entry.last_progress.unwrap_or(progress),
            ));
        }

        db::record_progress(self.pool, batch_id, &progress, now).await?;
        if progress.is_terminal() && entry.finished_at.is_none() {
            info!(
                status = %progress.status,
                successful = progress.successful.len(),
                failed = progress.failed.len(),
                "batch finished"
            );
        }
        Ok(BatchLookup::Progress(progress))
    }

    async fn resolve_missing(
        &self,
        batch_id: &str,
        entry: Option<JournalEntry>,
    ) -> Result<BatchLookup> {
        let now = Utc::now();
        let Some(entry) = entry else {
            return Ok(BatchLookup::NotFound);
        };

        if entry.observed() {
            info!("batch expired on the backend");
            db::mark_finished(self.pool, batch_id, now).await?;
            return Ok(BatchLookup::Expired {
                last: entry.last_progress,
            });
        }

        let age = (now - entry.submitted_at).to_std().unwrap_or_default();
        if age < self.pending_grace {
            debug!(age_ms = age.as_millis() as u64, "batch not visible yet");
            db::touch_polled(self.pool, batch_id, now).await?;
            return Ok(BatchLookup::Pending);
        }

        warn!(
            age_secs = age.as_secs(),
            "batch never appeared on the backend"
        );
        db::mark_finished(self.pool, batch_id, now).await?;
        Ok(BatchLookup::NotFound)
    }

    /// Poll every `interval` until the batch is terminal, gone, or `timeout`
    /// elapses. `on_progress` sees each snapshot whose completed count moved
    /// forward; a lower count is dropped even for batches outside the journal.
    pub async fn watch<F>(
        &self,
        batch_id: &str,
        interval: Duration,
        timeout: Duration,
        mut on_progress: F,
    ) -> Result<WatchEnd>
    where
        F: FnMut(&BatchProgress),
    {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut last: Option<BatchProgress> = None;

        loop {
            match self.poll(batch_id).await? {
                BatchLookup::Progress(progress) => {
                    let prev = last.as_ref().map(BatchProgress::completed);
                    if prev.is_some_and(|c| progress.completed() < c) {
                        // poll only clamps journaled batches
                        warn!(
                            batch_id,
                            completed = progress.completed(),
                            "completed count went backwards, keeping previous snapshot"
                        );
                        if progress.is_terminal() {
                            return Ok(WatchEnd::Finished(progress));
                        }
                    } else {
                        if prev != Some(progress.completed()) {
                            on_progress(&progress);
                        }
                        if progress.is_terminal() {
                            return Ok(WatchEnd::Finished(progress));
                        }
                        last = Some(progress);
                    }
                }
                BatchLookup::Pending => {}
                BatchLookup::Expired { last } => return Ok(WatchEnd::Expired { last }),
                BatchLookup::NotFound => return Ok(WatchEnd::NotFound),
            }

            if tokio::time::Instant::now() + interval > deadline {
                return Ok(WatchEnd::TimedOut { last });
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Poll each batch still tracked in the journal once. A failing batch
    /// is reported in its own slot and does not stop the others.
    #[instrument(skip_all)]
    pub async fn poll_active(&self) -> Result<Vec<(String, Result<BatchLookup>)>> {
        let active = db::list_active(self.pool).await?;
        let mut out = Vec::with_capacity(active.len());
        for entry in active {
            let lookup = self.poll(&entry.batch_id).await;
            if let Err(e) = &lookup {
                warn!(batch_id = %entry.batch_id, error = %e, "batch poll failed");
            }
            out.push((entry.batch_id, lookup));
        }
        Ok(out)
    }
}

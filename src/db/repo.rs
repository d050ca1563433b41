use super::model::JournalEntry;
use crate::api::model::{BatchProgress, BatchPublishRequest, BatchSubmission};
use crate::model::BatchStatus;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub type Pool = SqlitePool;

const ENTRY_COLUMNS: &str = "batch_id, site_id, post_status, article_ids, total, status, completed, \
     last_progress, submitted_at, last_polled_at, finished_at, abandoned";

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized)
        .await
        .with_context(|| format!("failed to open journal at {normalized}"))?;
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and ask SQLite to create the file. In-memory URLs are
/// left untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let query = match query_part {
        Some(q) if q.contains("mode=") => q.to_string(),
        Some(q) => format!("{q}&mode=rwc"),
        None => "mode=rwc".to_string(),
    };
    format!("sqlite://{expanded_path}?{query}")
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn entry_from_row(row: &SqliteRow) -> Result<JournalEntry> {
    let batch_id: String = row.try_get("batch_id")?;
    let status: String = row.try_get("status")?;
    let status = BatchStatus::parse_status(&status)
        .ok_or_else(|| anyhow!("batch {batch_id}: unknown status '{status}' in journal"))?;
    let article_ids: String = row.try_get("article_ids")?;
    let article_ids: Vec<i64> = serde_json::from_str(&article_ids)
        .with_context(|| format!("batch {batch_id}: corrupt article_ids"))?;
    let last_progress: Option<String> = row.try_get("last_progress")?;
    let last_progress = last_progress
        .map(|raw| serde_json::from_str::<BatchProgress>(&raw))
        .transpose()
        .with_context(|| format!("batch {batch_id}: corrupt last_progress"))?;
    let total: i64 = row.try_get("total")?;
    let completed: i64 = row.try_get("completed")?;

    Ok(JournalEntry {
        site_id: row.try_get("site_id")?,
        post_status: row.try_get("post_status")?,
        article_ids,
        total: u32::try_from(total).unwrap_or(0),
        status,
        completed: u32::try_from(completed).unwrap_or(0),
        last_progress,
        submitted_at: row.try_get("submitted_at")?,
        last_polled_at: row.try_get("last_polled_at")?,
        finished_at: row.try_get("finished_at")?,
        abandoned: row.try_get::<i64, _>("abandoned")? != 0,
        batch_id,
    })
}

/// Remember a submission. Recording the same batch id twice is a no-op.
#[instrument(skip_all)]
pub async fn record_submission(
    pool: &Pool,
    submission: &BatchSubmission,
    req: &BatchPublishRequest,
    submitted_at: DateTime<Utc>,
) -> Result<()> {
    let article_ids = serde_json::to_string(&req.article_ids)?;
    sqlx::query(
        "INSERT INTO batches (batch_id, site_id, post_status, article_ids, total, status, submitted_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) ON CONFLICT(batch_id) DO NOTHING",
    )
    .bind(submission.batch_id.to_string())
    .bind(req.site_id)
    .bind(req.status.as_str())
    .bind(article_ids)
    .bind(i64::from(submission.total))
    .bind(submission.status.as_str())
    .bind(submitted_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store an accepted progress snapshot. `completed` only ever grows; a
/// terminal status also stamps `finished_at` once.
#[instrument(skip_all)]
pub async fn record_progress(
    pool: &Pool,
    batch_id: &str,
    progress: &BatchProgress,
    polled_at: DateTime<Utc>,
) -> Result<()> {
    let snapshot = serde_json::to_string(progress)?;
    let finished_at = progress.is_terminal().then_some(polled_at);
    let res = sqlx::query(
        "UPDATE batches SET status = ?, completed = MAX(completed, ?), last_progress = ?, \
         last_polled_at = ?, finished_at = COALESCE(finished_at, ?) WHERE batch_id = ?",
    )
    .bind(progress.status.as_str())
    .bind(i64::from(progress.completed()))
    .bind(snapshot)
    .bind(polled_at)
    .bind(finished_at)
    .bind(batch_id)
    .execute(pool)
    .await?;
    if res.rows_affected() == 0 {
        return Err(anyhow!("batch {batch_id} is not in the journal"));
    }
    Ok(())
}

/// Note a poll that produced no new snapshot (pending, regressed).
#[instrument(skip_all)]
pub async fn touch_polled(pool: &Pool, batch_id: &str, polled_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE batches SET last_polled_at = ? WHERE batch_id = ?")
        .bind(polled_at)
        .bind(batch_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The backend no longer knows the batch; stop tracking it.
#[instrument(skip_all)]
pub async fn mark_finished(pool: &Pool, batch_id: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query(
        "UPDATE batches SET finished_at = COALESCE(finished_at, ?), last_polled_at = ? WHERE batch_id = ?",
    )
    .bind(at)
    .bind(at)
    .bind(batch_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Stop tracking a batch locally. The backend keeps publishing it; there is
/// no cancel route. Returns false for unknown ids.
#[instrument(skip_all)]
pub async fn abandon(pool: &Pool, batch_id: &str) -> Result<bool> {
    let res = sqlx::query("UPDATE batches SET abandoned = 1 WHERE batch_id = ?")
        .bind(batch_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn get_batch(pool: &Pool, batch_id: &str) -> Result<Option<JournalEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM batches WHERE batch_id = ?"
    ))
    .bind(batch_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(entry_from_row).transpose()
}

/// Batches still being tracked, oldest first.
#[instrument(skip_all)]
pub async fn list_active(pool: &Pool) -> Result<Vec<JournalEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM batches WHERE finished_at IS NULL AND abandoned = 0 \
         ORDER BY submitted_at ASC"
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(entry_from_row).collect()
}

/// Most recent submissions, newest first.
#[instrument(skip_all)]
pub async fn list_recent(pool: &Pool, limit: u32) -> Result<Vec<JournalEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM batches ORDER BY submitted_at DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    rows.iter().map(entry_from_row).collect()
}

pub async fn count_active(pool: &Pool) -> Result<i64> {
    let cnt: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM batches WHERE finished_at IS NULL AND abandoned = 0",
    )
    .fetch_one(pool)
    .await?;
    Ok(cnt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::BatchFailure;
    use crate::model::PostStatus;
    use uuid::Uuid;

    async fn setup_pool() -> Pool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn submission(total: u32) -> (BatchSubmission, BatchPublishRequest) {
        let sub = BatchSubmission {
            batch_id: Uuid::new_v4(),
            status: BatchStatus::Started,
            total,
        };
        let req = BatchPublishRequest {
            article_ids: (1..=i64::from(total)).collect(),
            site_id: 4,
            status: PostStatus::Draft,
            stop_on_error: false,
        };
        (sub, req)
    }

    fn progress(status: BatchStatus, ok: &[i64], failed: &[i64], total: u32) -> BatchProgress {
        BatchProgress {
            status,
            current: u32::try_from(ok.len() + failed.len()).unwrap(),
            total,
            successful: ok.to_vec(),
            failed: failed
                .iter()
                .map(|id| BatchFailure {
                    article_id: *id,
                    error: "boom".into(),
                })
                .collect(),
            current_article_id: None,
        }
    }

    #[test]
    fn prepare_sqlite_url_adds_create_mode() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("sqlite:///tmp/lc-test/console.db"),
            "sqlite:///tmp/lc-test/console.db?mode=rwc"
        );
        assert_eq!(
            prepare_sqlite_url("sqlite://./data/console.db?mode=ro"),
            "sqlite://./data/console.db?mode=ro"
        );
        assert_eq!(prepare_sqlite_url("postgres://x"), "postgres://x");
    }

    #[tokio::test]
    async fn submission_is_recorded_once() {
        let pool = setup_pool().await;
        let (sub, req) = submission(3);
        let id = sub.batch_id.to_string();

        record_submission(&pool, &sub, &req, Utc::now()).await.unwrap();
        record_submission(&pool, &sub, &req, Utc::now()).await.unwrap();

        let cnt: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batches")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(cnt, 1);

        let entry = get_batch(&pool, &id).await.unwrap().unwrap();
        assert_eq!(entry.article_ids, vec![1, 2, 3]);
        assert_eq!(entry.status, BatchStatus::Started);
        assert_eq!(entry.site_id, 4);
        assert!(entry.is_active());
        assert!(!entry.observed());
    }

    #[tokio::test]
    async fn progress_high_water_mark_never_decreases() {
        let pool = setup_pool().await;
        let (sub, req) = submission(3);
        let id = sub.batch_id.to_string();
        record_submission(&pool, &sub, &req, Utc::now()).await.unwrap();

        let p2 = progress(BatchStatus::Processing, &[1], &[2], 3);
        record_progress(&pool, &id, &p2, Utc::now()).await.unwrap();
        let p1 = progress(BatchStatus::Processing, &[1], &[], 3);
        record_progress(&pool, &id, &p1, Utc::now()).await.unwrap();

        let entry = get_batch(&pool, &id).await.unwrap().unwrap();
        assert_eq!(entry.completed, 2);
        assert!(entry.observed());
        assert!(entry.is_active());
    }

    #[tokio::test]
    async fn terminal_progress_finishes_batch() {
        let pool = setup_pool().await;
        let (sub, req) = submission(3);
        let id = sub.batch_id.to_string();
        record_submission(&pool, &sub, &req, Utc::now()).await.unwrap();

        let done = progress(BatchStatus::Completed, &[1, 3], &[2], 3);
        record_progress(&pool, &id, &done, Utc::now()).await.unwrap();

        let entry = get_batch(&pool, &id).await.unwrap().unwrap();
        assert_eq!(entry.status, BatchStatus::Completed);
        assert!(entry.finished_at.is_some());
        assert_eq!(entry.last_progress, Some(done));
        assert!(list_active(&pool).await.unwrap().is_empty());
        assert_eq!(list_recent(&pool, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn progress_for_unknown_batch_is_an_error() {
        let pool = setup_pool().await;
        let p = progress(BatchStatus::Processing, &[], &[], 1);
        assert!(record_progress(&pool, "missing", &p, Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn abandon_stops_tracking() {
        let pool = setup_pool().await;
        let (sub, req) = submission(2);
        let id = sub.batch_id.to_string();
        record_submission(&pool, &sub, &req, Utc::now()).await.unwrap();
        assert_eq!(count_active(&pool).await.unwrap(), 1);

        assert!(abandon(&pool, &id).await.unwrap());
        assert!(!abandon(&pool, "missing").await.unwrap());
        assert_eq!(count_active(&pool).await.unwrap(), 0);
        assert!(get_batch(&pool, &id).await.unwrap().unwrap().abandoned);
    }

    #[tokio::test]
    async fn mark_finished_keeps_first_timestamp() {
        let pool = setup_pool().await;
        let (sub, req) = submission(1);
        let id = sub.batch_id.to_string();
        record_submission(&pool, &sub, &req, Utc::now()).await.unwrap();

        let first = Utc::now();
        mark_finished(&pool, &id, first).await.unwrap();
        mark_finished(&pool, &id, first + chrono::Duration::seconds(60))
            .await
            .unwrap();
        let entry = get_batch(&pool, &id).await.unwrap().unwrap();
        assert_eq!(
            entry.finished_at.map(|t| t.timestamp()),
            Some(first.timestamp())
        );
    }
}

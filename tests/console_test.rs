mod common;

use common::{article, setup_pool, verdict, RecordingApi};
use legal_console::api::model::{BatchPublishRequest, PublishRequest, PublishWithRetryRequest};
use legal_console::console::{available_actions, available_article_actions, Console};
use legal_console::db;
use legal_console::model::{ArticleAction, PostStatus, PublishStatus, VerdictAction, VerdictStatus};

#[tokio::test]
async fn rejected_action_leaves_cached_status_unchanged() {
    let api = RecordingApi::default()
        .with_verdict(verdict(3, VerdictStatus::Analyzing))
        .await;
    let console = Console::new(api.clone());

    let before = console.verdict(3).await.unwrap();
    assert_eq!(before.status, VerdictStatus::Analyzing);
    assert!(!available_actions(&before).contains(&VerdictAction::Anonymize));

    let err = console
        .perform(3, VerdictAction::Anonymize)
        .await
        .unwrap_err();
    assert_eq!(
        err.detail(),
        Some("Cannot anonymize verdict in status analyzing")
    );

    // the request was still sent; the backend is the guard
    assert_eq!(api.count("action 3 anonymize").await, 1);
    assert!(console.is_verdict_cached(3).await);
    let after = console.verdict(3).await.unwrap();
    assert_eq!(after.status, VerdictStatus::Analyzing);
    assert_eq!(api.count("get_verdict 3").await, 1);
}

#[tokio::test]
async fn successful_action_invalidates_cached_verdict() {
    let api = RecordingApi::default()
        .with_verdict(verdict(4, VerdictStatus::Extracted))
        .await;
    let console = Console::new(api.clone());

    console.verdict(4).await.unwrap();
    let returned = console
        .perform(4, VerdictAction::Anonymize)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(returned.status, VerdictStatus::Anonymized);
    assert!(!console.is_verdict_cached(4).await);

    let refreshed = console.verdict(4).await.unwrap();
    assert_eq!(refreshed.status, VerdictStatus::Anonymized);
    assert_eq!(api.count("get_verdict 4").await, 2);
}

#[tokio::test]
async fn delete_returns_none_and_drops_cache() {
    let api = RecordingApi::default()
        .with_verdict(verdict(5, VerdictStatus::Failed))
        .await;
    let console = Console::new(api.clone());

    console.verdict(5).await.unwrap();
    assert!(console
        .perform(5, VerdictAction::Delete)
        .await
        .unwrap()
        .is_none());
    assert!(!console.is_verdict_cached(5).await);
    assert_eq!(console.verdict(5).await.unwrap_err().detail(), Some("Verdict not found"));
}

#[tokio::test]
async fn duplicate_upload_is_rejected_without_touching_cache() {
    let api = RecordingApi::default();
    let console = Console::new(api.clone());

    let first = console
        .upload("ruling.pdf", b"%PDF".to_vec(), false)
        .await
        .unwrap();
    let cached = console.verdict(first.verdict_id).await.unwrap();

    let err = console
        .upload("ruling.pdf", b"%PDF".to_vec(), false)
        .await
        .unwrap_err();
    assert_eq!(
        err.detail(),
        Some(format!("Verdict with this file already exists (ID: {})", first.verdict_id).as_str())
    );
    assert!(console.is_verdict_cached(cached.id).await);
    assert_eq!(
        api.calls().await.iter().filter(|c| c.contains("overwrite=false")).count(),
        2
    );
}

#[tokio::test]
async fn publish_with_retry_is_a_single_call() {
    let api = RecordingApi::default().with_article(article(7)).await;
    let console = Console::new(api.clone());

    let before = console.article(7).await.unwrap();
    assert_eq!(available_article_actions(&before), vec![ArticleAction::Publish]);

    let req = PublishWithRetryRequest {
        site_id: 1,
        status: PostStatus::Draft,
        max_retries: 3,
        retry_delay: 2.0,
    };
    let result = console.publish_with_retry(7, &req).await.unwrap();
    assert!(result.success);
    assert_eq!(api.count("publish_with_retry 7").await, 1);
    assert_eq!(api.retry_requests().await[0].max_retries, 3);

    let after = console.article(7).await.unwrap();
    assert_eq!(after.publish_status, PublishStatus::Published);
    assert_eq!(
        available_article_actions(&after),
        vec![ArticleAction::Sync, ArticleAction::Unpublish]
    );
}

#[test]
fn publish_offered_only_once_ready_or_failed() {
    let offered = |status| {
        let mut a = article(10);
        a.publish_status = status;
        available_article_actions(&a)
    };
    assert!(offered(PublishStatus::Draft).is_empty());
    assert!(offered(PublishStatus::PendingReview).is_empty());
    assert_eq!(offered(PublishStatus::Ready), vec![ArticleAction::Publish]);
    assert_eq!(offered(PublishStatus::Failed), vec![ArticleAction::Publish]);
    assert_eq!(offered(PublishStatus::Published), vec![ArticleAction::Unpublish]);
}

#[tokio::test]
async fn failed_publish_keeps_cached_article() {
    let api = RecordingApi::default().with_article(article(8)).await;
    api.push_publish_result(Err(legal_console::api::ApiError::Status {
        status: 500,
        detail: "WordPress error: timeout".into(),
    }))
    .await;
    let console = Console::new(api.clone());

    console.article(8).await.unwrap();
    let err = console
        .publish(8, &PublishRequest::new(1, PostStatus::Publish))
        .await
        .unwrap_err();
    assert_eq!(err.detail(), Some("WordPress error: timeout"));
    assert!(console.is_article_cached(8).await);
    assert_eq!(api.count("publish 8").await, 1);
}

#[tokio::test]
async fn unpublish_invalidates_article() {
    let api = RecordingApi::default().with_article(article(9)).await;
    let console = Console::new(api.clone());

    console
        .publish(9, &PublishRequest::new(1, PostStatus::Publish))
        .await
        .unwrap();
    console.article(9).await.unwrap();
    let article = console.unpublish(9).await.unwrap();
    assert_eq!(article.publish_status, PublishStatus::Ready);
    assert!(!console.is_article_cached(9).await);
}

#[tokio::test]
async fn batch_submission_is_journaled_and_invalidates_articles() {
    let pool = setup_pool().await;
    let api = RecordingApi::default()
        .with_article(article(1))
        .await
        .with_article(article(2))
        .await;
    let console = Console::new(api.clone()).with_journal(pool.clone());

    console.article(1).await.unwrap();
    console.article(2).await.unwrap();

    let req = BatchPublishRequest {
        article_ids: vec![1, 2, 3],
        site_id: 1,
        status: PostStatus::Draft,
        stop_on_error: false,
    };
    let sub = console.submit_batch(&req).await.unwrap();
    assert_eq!(sub.total, 3);
    assert!(!console.is_article_cached(1).await);
    assert!(!console.is_article_cached(2).await);

    let entry = db::get_batch(&pool, &sub.batch_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.article_ids, vec![1, 2, 3]);
    assert_eq!(entry.post_status, "draft");
    assert!(entry.is_active());
}

#[tokio::test]
async fn dashboard_fetches_all_statistics() {
    let api = RecordingApi::default();
    let console = Console::new(api.clone());

    let dash = console.dashboard().await.unwrap();
    assert_eq!(dash.verdicts["total"], 3);
    assert_eq!(dash.articles["total"], 2);
    assert_eq!(dash.wordpress.total_published, 1);

    let mut calls = api.calls().await;
    calls.sort();
    assert_eq!(
        calls,
        vec!["article_statistics", "verdict_statistics", "wordpress_statistics None"]
    );
}

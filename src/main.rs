use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use legal_console::api::model::{
    Article, BatchProgress, BatchPublishRequest, BatchPublishResult, ListQuery, PublishRequest,
    PublishResult, PublishWithRetryRequest, QueueRequest, RepublishFailedRequest, SiteCreate,
    SiteUpdate, Statistics, Verdict,
};
use legal_console::api::{ApiClient, ApiError};
use legal_console::config::{self, Config};
use legal_console::console::{self, Console, ConsoleError};
use legal_console::db::{self, JournalEntry, Pool};
use legal_console::model::{PostStatus, PublishStatus, SeoPlugin, VerdictAction, VerdictStatus};
use legal_console::tracker::{BatchLookup, BatchTracker, WatchEnd};

#[derive(Debug, Parser)]
#[command(author, version, about = "Administrative console for the legal content pipeline")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Court verdicts and their processing stages
    #[command(subcommand)]
    Verdicts(VerdictCmd),
    /// Generated SEO articles
    #[command(subcommand)]
    Articles(ArticleCmd),
    /// WordPress publishing targets
    #[command(subcommand)]
    Sites(SiteCmd),
    /// Publish one article
    Publish {
        article_id: i64,
        /// Let the backend retry transient WordPress failures
        #[arg(long)]
        retry: bool,
        #[command(flatten)]
        target: Target,
        /// Backend retry attempts (needs --retry)
        #[arg(long, requires = "retry")]
        max_retries: Option<u32>,
        /// Seconds between backend retries (needs --retry)
        #[arg(long, requires = "retry")]
        retry_delay: Option<f64>,
    },
    /// Remove an article's WordPress post
    Unpublish { article_id: i64 },
    /// Asynchronous multi-article publishing
    #[command(subcommand)]
    Batch(BatchCmd),
    /// Retry publishing of articles whose last attempt failed
    RepublishFailed {
        #[arg(long)]
        site: Option<i64>,
        #[arg(long, default_value_t = 10)]
        max: u32,
    },
    /// Compute an advisory publishing schedule
    Queue {
        #[arg(long)]
        site: Option<i64>,
        #[arg(long)]
        per_day: Option<u32>,
        #[arg(long)]
        min_score: Option<u8>,
    },
    /// Verdict, anonymization, analysis and article statistics
    Stats,
    /// Overview of verdicts, articles and WordPress publishing
    Dashboard,
    /// Write an example config file
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, ClapArgs)]
struct Target {
    /// WordPress site id (defaults to publishing.default_site_id)
    #[arg(long)]
    site: Option<i64>,
    /// draft, publish or private (defaults to publishing.status)
    #[arg(long)]
    status: Option<String>,
}

#[derive(Debug, ClapArgs)]
struct Paging {
    #[arg(long, default_value_t = 0)]
    skip: u32,
    #[arg(long, default_value_t = 50)]
    limit: u32,
    #[arg(long)]
    status: Option<String>,
}

#[derive(Debug, Subcommand)]
enum VerdictCmd {
    List(Paging),
    Show { id: i64 },
    Upload {
        file: PathBuf,
        /// Replace an existing verdict with the same content hash
        #[arg(long)]
        overwrite: bool,
    },
    Delete { id: i64 },
    Anonymize { id: i64 },
    ReAnonymize { id: i64 },
    Analyze { id: i64 },
    ReAnalyze { id: i64 },
    Generate { id: i64 },
    Reprocess { id: i64 },
    Stats,
}

#[derive(Debug, Subcommand)]
enum ArticleCmd {
    List(Paging),
    Show { id: i64 },
    ByVerdict { verdict_id: i64 },
    Stats,
    Validate { id: i64 },
    Sync { id: i64 },
    Unpublished {
        #[arg(long)]
        min_score: Option<u8>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
enum SiteCmd {
    List,
    Show { id: i64 },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        username: String,
        /// WordPress application password
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "none")]
        seo_plugin: String,
        #[arg(long)]
        default_category: Option<i64>,
        #[arg(long)]
        default_author: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        seo_plugin: Option<String>,
        #[arg(long)]
        default_category: Option<i64>,
        #[arg(long)]
        default_author: Option<i64>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete { id: i64 },
    Test { id: i64 },
    Categories { id: i64 },
    Tags { id: i64 },
}

#[derive(Debug, Subcommand)]
enum BatchCmd {
    /// Submit articles and return the batch id
    Submit {
        #[arg(long, value_delimiter = ',', required = true)]
        articles: Vec<i64>,
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        stop_on_error: bool,
        /// Keep polling until the batch finishes
        #[arg(long)]
        watch: bool,
    },
    /// Poll a batch once
    Progress { batch_id: String },
    /// Poll a batch until it finishes
    Watch {
        batch_id: String,
        #[arg(long)]
        interval_ms: Option<u64>,
        #[arg(long)]
        timeout_seconds: Option<u64>,
    },
    /// Batches recorded in the local journal
    List {
        /// Include finished and forgotten batches
        #[arg(long)]
        all: bool,
    },
    /// Stop tracking a batch locally
    Forget { batch_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

/// Backend `detail` when there is one, the full error chain otherwise.
fn describe(err: &anyhow::Error) -> String {
    let detail = err
        .downcast_ref::<ApiError>()
        .and_then(ApiError::detail)
        .or_else(|| err.downcast_ref::<ConsoleError>().and_then(ConsoleError::detail));
    match detail {
        Some(detail) => detail.to_string(),
        None => format!("{err:#}"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Command::InitConfig { force } => return init_config(&cli.config, force),
        other => other,
    };

    let cfg = config::load(Some(&cli.config))
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let client = ApiClient::from_config(&cfg)?;
    info!(base_url = %client.base_url(), "using backend");

    match command {
        Command::Verdicts(cmd) => verdicts(Console::new(client), cmd).await,
        Command::Articles(cmd) => articles(&cfg, Console::new(client), cmd).await,
        Command::Sites(cmd) => sites(&client, cmd).await,
        Command::Publish {
            article_id,
            retry,
            target,
            max_retries,
            retry_delay,
        } => {
            let console = Console::new(client);
            let (site_id, status) = resolve_target(&cfg, &target)?;
            let result = if retry {
                let req = PublishWithRetryRequest {
                    site_id,
                    status,
                    max_retries: max_retries.unwrap_or(cfg.publishing.max_retries),
                    retry_delay: retry_delay.unwrap_or(cfg.publishing.retry_delay_seconds),
                };
                console.publish_with_retry(article_id, &req).await?
            } else {
                console
                    .publish(article_id, &PublishRequest::new(site_id, status))
                    .await?
            };
            print_publish_result(&result);
            if !result.success {
                bail!(
                    "{}",
                    result
                        .error
                        .or(result.message)
                        .unwrap_or_else(|| "publish failed".into())
                );
            }
            Ok(())
        }
        Command::Unpublish { article_id } => {
            let article = Console::new(client).unpublish(article_id).await?;
            println!(
                "article {} is now {}",
                article.id, article.publish_status
            );
            Ok(())
        }
        Command::Batch(cmd) => batch(&cfg, client, cmd).await,
        Command::RepublishFailed { site, max } => {
            let site_id = resolve_site(&cfg, site)?;
            let result = client
                .republish_failed(&RepublishFailedRequest {
                    site_id,
                    max_articles: max,
                })
                .await?;
            print_batch_result(&result);
            Ok(())
        }
        Command::Queue {
            site,
            per_day,
            min_score,
        } => {
            let req = QueueRequest {
                site_id: resolve_site(&cfg, site)?,
                articles_per_day: per_day.unwrap_or(cfg.publishing.articles_per_day),
                min_score: min_score.unwrap_or(cfg.publishing.min_score),
            };
            let queue = client.schedule_queue(&req).await?;
            println!(
                "{} articles queued for site {}, {} per day, about {} days",
                queue.total_queued, queue.site_id, queue.articles_per_day, queue.estimated_days
            );
            for a in &queue.articles {
                println!(
                    "  #{:<6} score {:>3}  {}",
                    a.id, a.overall_score, a.title
                );
            }
            Ok(())
        }
        Command::Stats => {
            let (verdicts, anonymization, analysis, articles) = futures::try_join!(
                client.verdict_statistics(),
                client.anonymization_statistics(),
                client.analysis_statistics(),
                client.article_statistics(),
            )?;
            print_statistics("verdicts", &verdicts);
            print_statistics("anonymization", &anonymization);
            print_statistics("analysis", &analysis);
            print_statistics("articles", &articles);
            Ok(())
        }
        Command::Dashboard => {
            let dash = Console::new(client).dashboard().await?;
            print_statistics("verdicts", &dash.verdicts);
            print_statistics("articles", &dash.articles);
            println!("wordpress:");
            println!("  total_published: {}", dash.wordpress.total_published);
            println!("  total_articles: {}", dash.wordpress.total_articles);
            println!("  total_sites: {}", dash.wordpress.total_sites);
            for (status, n) in &dash.wordpress.by_status {
                println!("  {status}: {n}");
            }
            if !dash.wordpress.recent_publications.is_empty() {
                println!("recent publications:");
                for p in &dash.wordpress.recent_publications {
                    println!(
                        "  #{} {} {}",
                        p.article_id,
                        p.title.as_deref().unwrap_or("-"),
                        p.wordpress_url.as_deref().unwrap_or("")
                    );
                }
            }
            Ok(())
        }
        Command::InitConfig { .. } => {
            unreachable!("init-config returns before the config is loaded")
        }
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, config::example())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn resolve_site(cfg: &Config, site: Option<i64>) -> Result<i64> {
    site.or(cfg.publishing.default_site_id)
        .ok_or_else(|| anyhow!("no site given and publishing.default_site_id is not set"))
}

fn resolve_target(cfg: &Config, target: &Target) -> Result<(i64, PostStatus)> {
    let site_id = resolve_site(cfg, target.site)?;
    let status = match target.status.as_deref() {
        Some(s) => PostStatus::parse_status(s)
            .ok_or_else(|| anyhow!("unknown post status '{s}' (draft, publish, private)"))?,
        None => cfg.publishing.post_status(),
    };
    Ok((site_id, status))
}

fn parse_seo_plugin(s: &str) -> Result<SeoPlugin> {
    SeoPlugin::parse_plugin(s)
        .ok_or_else(|| anyhow!("unknown SEO plugin '{s}' (yoast, rankmath, none)"))
}

async fn open_journal(cfg: &Config) -> Result<Pool> {
    cfg.ensure_dirs()?;
    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;
    Ok(pool)
}

async fn verdicts(console: Console<ApiClient>, cmd: VerdictCmd) -> Result<()> {
    let action = match cmd {
        VerdictCmd::List(paging) => {
            let status = paging
                .status
                .as_deref()
                .map(|s| {
                    VerdictStatus::parse_status(s)
                        .ok_or_else(|| anyhow!("unknown verdict status '{s}'"))
                })
                .transpose()?;
            let page = console
                .api()
                .list_verdicts(ListQuery::new(paging.skip, paging.limit), status)
                .await?;
            println!(
                "verdicts {}-{} of {}",
                page.skip,
                page.skip + page.items.len() as u64,
                page.total
            );
            for v in &page.items {
                println!(
                    "  #{:<6} {:<16} {:<20} {}",
                    v.id,
                    v.status,
                    v.case_number_display
                        .as_deref()
                        .or(v.case_number.as_deref())
                        .unwrap_or("-"),
                    v.court_name.as_deref().unwrap_or("")
                );
            }
            return Ok(());
        }
        VerdictCmd::Show { id } => {
            let verdict = console.verdict(id).await?;
            print_verdict(&verdict);
            return Ok(());
        }
        VerdictCmd::Upload { file, overwrite } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("invalid file name: {}", file.display()))?
                .to_string();
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let receipt = console.upload(&file_name, content, overwrite).await?;
            println!(
                "uploaded verdict #{} ({}) status {}",
                receipt.verdict_id, receipt.file_hash, receipt.status
            );
            if !receipt.message.is_empty() {
                println!("{}", receipt.message);
            }
            return Ok(());
        }
        VerdictCmd::Stats => {
            let stats = console.api().verdict_statistics().await?;
            print_statistics("verdicts", &stats);
            return Ok(());
        }
        VerdictCmd::Delete { id } => (id, VerdictAction::Delete),
        VerdictCmd::Anonymize { id } => (id, VerdictAction::Anonymize),
        VerdictCmd::ReAnonymize { id } => (id, VerdictAction::ReAnonymize),
        VerdictCmd::Analyze { id } => (id, VerdictAction::Analyze),
        VerdictCmd::ReAnalyze { id } => (id, VerdictAction::ReAnalyze),
        VerdictCmd::Generate { id } => (id, VerdictAction::GenerateArticle),
        VerdictCmd::Reprocess { id } => (id, VerdictAction::Reprocess),
    };

    let (id, action) = action;
    match console.perform(id, action).await? {
        Some(verdict) => println!(
            "{} accepted for verdict #{}; status {}",
            action, verdict.id, verdict.status
        ),
        None => println!("verdict #{id} deleted"),
    }
    Ok(())
}

async fn articles(cfg: &Config, console: Console<ApiClient>, cmd: ArticleCmd) -> Result<()> {
    match cmd {
        ArticleCmd::List(paging) => {
            let status = paging
                .status
                .as_deref()
                .map(|s| {
                    PublishStatus::parse_status(s)
                        .ok_or_else(|| anyhow!("unknown publish status '{s}'"))
                })
                .transpose()?;
            let page = console
                .api()
                .list_articles(ListQuery::new(paging.skip, paging.limit), status)
                .await?;
            println!(
                "articles {}-{} of {}",
                page.skip,
                page.skip + page.items.len() as u64,
                page.total
            );
            for a in &page.items {
                println!(
                    "  #{:<6} {:<14} score {:>3}  {}",
                    a.id, a.publish_status, a.overall_score, a.title
                );
            }
        }
        ArticleCmd::Show { id } => {
            let article = console.article(id).await?;
            print_article(&article);
        }
        ArticleCmd::ByVerdict { verdict_id } => {
            let article = console.api().article_by_verdict(verdict_id).await?;
            print_article(&article);
        }
        ArticleCmd::Stats => {
            let stats = console.api().article_statistics().await?;
            print_statistics("articles", &stats);
        }
        ArticleCmd::Validate { id } => {
            let validation = console.api().validate_article(id).await?;
            if validation.valid {
                println!("article #{id} is ready to publish");
            } else {
                println!("article #{id} has {} problem(s):", validation.errors.len());
                for e in &validation.errors {
                    println!("  - {e}");
                }
            }
        }
        ArticleCmd::Sync { id } => {
            let article = console.sync(id).await?;
            println!(
                "article #{} synced; status {}{}",
                article.id,
                article.publish_status,
                article
                    .wordpress_url
                    .as_deref()
                    .map(|u| format!(" ({u})"))
                    .unwrap_or_default()
            );
        }
        ArticleCmd::Unpublished { min_score, limit } => {
            let min_score = min_score.unwrap_or(cfg.publishing.min_score);
            let items = console
                .api()
                .unpublished_articles(min_score, limit)
                .await?;
            println!("{} unpublished article(s) scoring >= {min_score}", items.len());
            for a in &items {
                println!(
                    "  #{:<6} score {:>3}  {}",
                    a.id, a.overall_score, a.title
                );
            }
        }
    }
    Ok(())
}

async fn sites(client: &ApiClient, cmd: SiteCmd) -> Result<()> {
    match cmd {
        SiteCmd::List => {
            for s in client.list_sites().await? {
                println!(
                    "  #{:<4} {:<24} {} {}",
                    s.id,
                    s.site_name,
                    s.site_url,
                    if s.is_active { "" } else { "(inactive)" }
                );
            }
        }
        SiteCmd::Show { id } => {
            let site = client.get_site(id).await?;
            println!("{}", serde_json::to_string_pretty(&site)?);
        }
        SiteCmd::Add {
            name,
            url,
            username,
            password,
            seo_plugin,
            default_category,
            default_author,
        } => {
            let req = SiteCreate {
                site_name: name,
                site_url: url,
                api_username: username,
                api_password: password,
                seo_plugin: parse_seo_plugin(&seo_plugin)?,
                default_category_id: default_category,
                default_author_id: default_author,
                categories_map: None,
            };
            let site = client.create_site(&req).await?;
            println!("created site #{} {}", site.id, site.site_name);
        }
        SiteCmd::Update {
            id,
            name,
            url,
            username,
            password,
            seo_plugin,
            default_category,
            default_author,
            active,
        } => {
            let update = SiteUpdate {
                site_name: name,
                site_url: url,
                api_username: username,
                api_password: password,
                seo_plugin: seo_plugin.as_deref().map(parse_seo_plugin).transpose()?,
                default_category_id: default_category,
                default_author_id: default_author,
                is_active: active,
            };
            let site = client.update_site(id, &update).await?;
            println!("updated site #{} {}", site.id, site.site_name);
        }
        SiteCmd::Delete { id } => {
            client.delete_site(id).await?;
            println!("site #{id} deleted");
        }
        SiteCmd::Test { id } => {
            let res = client.test_site(id).await?;
            println!(
                "site #{id}: {} {}",
                if res.success { "ok" } else { "FAILED" },
                res.message
            );
            if !res.success {
                bail!("connection test failed for site #{id}");
            }
        }
        SiteCmd::Categories { id } => {
            for c in client.site_categories(id).await? {
                println!("  #{:<5} {:<30} {}", c.id, c.name, c.slug);
            }
        }
        SiteCmd::Tags { id } => {
            for t in client.site_tags(id).await? {
                println!("  #{:<5} {:<30} {}", t.id, t.name, t.slug);
            }
        }
    }
    Ok(())
}

async fn batch(cfg: &Config, client: ApiClient, cmd: BatchCmd) -> Result<()> {
    let pool = open_journal(cfg).await?;
    let grace = Duration::from_secs(cfg.app.pending_grace_seconds);
    let interval = Duration::from_millis(cfg.app.poll_interval_ms);
    let timeout = Duration::from_secs(cfg.app.watch_timeout_seconds);

    match cmd {
        BatchCmd::Submit {
            articles,
            target,
            stop_on_error,
            watch,
        } => {
            let (site_id, status) = resolve_target(cfg, &target)?;
            let req = BatchPublishRequest {
                article_ids: articles,
                site_id,
                status,
                stop_on_error,
            };
            let console = Console::new(client).with_journal(pool.clone());
            let submission = console.submit_batch(&req).await?;
            println!(
                "batch {} {} ({} articles)",
                submission.batch_id, submission.status, submission.total
            );
            if watch {
                let tracker = BatchTracker::new(console.api(), &pool, grace);
                let end = tracker
                    .watch(
                        &submission.batch_id.to_string(),
                        interval,
                        timeout,
                        print_progress,
                    )
                    .await?;
                return report_watch_end(&end);
            }
        }
        BatchCmd::Progress { batch_id } => {
            let tracker = BatchTracker::new(&client, &pool, grace);
            match tracker.poll(&batch_id).await? {
                BatchLookup::Progress(p) => {
                    print_progress(&p);
                    if let Some(result) = p.result() {
                        print_batch_result(&result);
                    }
                }
                BatchLookup::Pending => {
                    println!("batch {batch_id} submitted; not visible on the backend yet")
                }
                BatchLookup::Expired { last } => {
                    println!("batch {batch_id} expired on the backend");
                    if let Some(p) = last {
                        println!("last seen:");
                        print_progress(&p);
                    }
                }
                BatchLookup::NotFound => bail!("batch {batch_id} not found"),
            }
        }
        BatchCmd::Watch {
            batch_id,
            interval_ms,
            timeout_seconds,
        } => {
            let tracker = BatchTracker::new(&client, &pool, grace);
            let end = tracker
                .watch(
                    &batch_id,
                    interval_ms.map(Duration::from_millis).unwrap_or(interval),
                    timeout_seconds.map(Duration::from_secs).unwrap_or(timeout),
                    print_progress,
                )
                .await?;
            return report_watch_end(&end);
        }
        BatchCmd::List { all } => {
            let entries = if all {
                db::list_recent(&pool, 50).await?
            } else {
                db::list_active(&pool).await?
            };
            if entries.is_empty() {
                println!("no batches");
            }
            for e in &entries {
                print_journal_entry(e);
            }
        }
        BatchCmd::Forget { batch_id } => {
            if db::abandon(&pool, &batch_id).await? {
                println!(
                    "stopped tracking batch {batch_id}; publishing continues on the backend"
                );
            } else {
                bail!("batch {batch_id} is not in the local journal");
            }
        }
    }
    Ok(())
}

fn report_watch_end(end: &WatchEnd) -> Result<()> {
    match end {
        WatchEnd::Finished(progress) => {
            if let Some(result) = progress.result() {
                print_batch_result(&result);
            }
            Ok(())
        }
        WatchEnd::Expired { last } => {
            println!("batch expired on the backend before it was seen finishing");
            if let Some(result) = last.as_ref().and_then(BatchProgress::result) {
                print_batch_result(&result);
            }
            Ok(())
        }
        WatchEnd::NotFound => bail!("batch not found"),
        WatchEnd::TimedOut { last } => {
            let done = last.as_ref().map_or(0, BatchProgress::completed);
            bail!("gave up waiting; {done} article(s) finished so far")
        }
    }
}

fn print_verdict(v: &Verdict) {
    println!("verdict #{} [{}]", v.id, v.status);
    if let Some(case) = v.case_number_display.as_deref().or(v.case_number.as_deref()) {
        println!("  case: {case}");
    }
    if let Some(court) = &v.court_name {
        println!("  court: {court}");
    }
    if let Some(area) = &v.legal_area {
        println!("  legal area: {area}");
    }
    if let Some(date) = v.verdict_date {
        println!("  date: {}", date.format("%Y-%m-%d"));
    }
    if v.requires_manual_review {
        println!("  requires manual review");
    }
    println!("  file hash: {}", v.file_hash);
    println!("  updated: {}", v.updated_at.to_rfc3339());
    let actions: Vec<&str> = console::available_actions(v)
        .into_iter()
        .map(|a| a.as_str())
        .collect();
    if actions.is_empty() {
        println!("  actions: none");
    } else {
        println!("  actions: {}", actions.join(", "));
    }
}

fn print_article(a: &Article) {
    println!("article #{} [{}] {}", a.id, a.publish_status, a.title);
    println!("  verdict: #{}", a.verdict_id);
    if let Some(kw) = &a.focus_keyword {
        println!("  focus keyword: {kw}");
    }
    if let Some(wc) = a.word_count {
        println!("  words: {wc}");
    }
    let scores: Vec<String> = a
        .scores()
        .iter()
        .map(|(name, s)| format!("{name} {s}"))
        .collect();
    println!("  scores: {}", scores.join(", "));
    for issue in a.quality_issues.iter().flatten() {
        println!("  {}: {}", issue.kind, issue.message);
    }
    if let Some(url) = &a.wordpress_url {
        println!("  wordpress: {url}");
    }
    let actions: Vec<&str> = console::available_article_actions(a)
        .into_iter()
        .map(|a| a.as_str())
        .collect();
    println!("  actions: {}", actions.join(", "));
}

fn print_publish_result(r: &PublishResult) {
    if r.success {
        println!(
            "article #{} published: post {} {}",
            r.article_id,
            r.wordpress_post_id.map(|id| id.to_string()).unwrap_or_default(),
            r.wordpress_url.as_deref().unwrap_or("")
        );
    } else {
        println!("article #{} was not published", r.article_id);
    }
    if let Some(attempts) = r.attempts {
        println!("  attempts: {attempts}");
    }
}

fn print_progress(p: &BatchProgress) {
    println!(
        "[{}] {}/{} done, {} ok, {} failed{}",
        p.status,
        p.completed(),
        p.total,
        p.successful.len(),
        p.failed.len(),
        p.current_article_id
            .map(|id| format!(", working on #{id}"))
            .unwrap_or_default()
    );
}

fn print_batch_result(r: &BatchPublishResult) {
    println!(
        "{} of {} published, {} failed",
        r.success_count, r.total, r.error_count
    );
    if let Some(msg) = &r.message {
        println!("  {msg}");
    }
    for f in &r.failed {
        println!("  #{}: {}", f.article_id, f.error);
    }
}

fn print_journal_entry(e: &JournalEntry) {
    let state = if e.abandoned {
        "forgotten".to_string()
    } else if e.finished_at.is_some() {
        format!("{} (finished)", e.status)
    } else {
        e.status.to_string()
    };
    println!(
        "  {} site {} {}/{} {} submitted {}",
        e.batch_id,
        e.site_id,
        e.completed,
        e.total,
        state,
        e.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_statistics(title: &str, stats: &Statistics) {
    println!("{title}:");
    for (key, value) in stats {
        match value {
            serde_json::Value::Object(map) => {
                println!("  {key}:");
                for (k, v) in map {
                    println!("    {k}: {v}");
                }
            }
            other => println!("  {key}: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_tuning_needs_retry_flag() {
        let parse = |args: &[&str]| {
            Cli::try_parse_from(["legal-console", "publish", "7"].iter().chain(args))
        };
        assert!(parse(&["--max-retries", "3"]).is_err());
        assert!(parse(&["--retry-delay", "1.5"]).is_err());

        let cli = parse(&["--retry", "--max-retries", "3", "--retry-delay", "1.5"]).unwrap();
        match cli.command {
            Command::Publish {
                retry,
                max_retries,
                retry_delay,
                ..
            } => {
                assert!(retry);
                assert_eq!(max_retries, Some(3));
                assert_eq!(retry_delay, Some(1.5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn init_config_runs_without_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let cli = Cli::try_parse_from([
            "legal-console",
            "--config",
            path.to_str().unwrap(),
            "init-config",
        ])
        .unwrap();

        run(cli).await.unwrap();
        assert!(config::load(Some(&path)).is_ok());
        assert!(init_config(&path, false).is_err());
        assert!(init_config(&path, true).is_ok());
    }
}

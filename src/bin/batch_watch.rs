use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use legal_console::api::ApiClient;
use legal_console::config;
use legal_console::db;
use legal_console::tracker::{BatchLookup, BatchTracker};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Poll every batch in the local journal until all of them have finished"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Poll each active batch once and exit
    #[arg(long)]
    once: bool,

    /// Give up after this many consecutive rounds in which every poll failed
    #[arg(long, default_value = "5")]
    max_failed_rounds: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let client = ApiClient::from_config(&cfg)?;
    let tracker = BatchTracker::new(
        &client,
        &pool,
        Duration::from_secs(cfg.app.pending_grace_seconds),
    );
    let interval = Duration::from_millis(cfg.app.poll_interval_ms);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(cfg.app.watch_timeout_seconds);

    let active = db::count_active(&pool).await?;
    info!(active_batches = active, "starting batch watch");
    if active == 0 {
        info!("no batches to watch, exiting");
        return Ok(());
    }

    let mut failed_rounds = 0u32;
    loop {
        let round = tracker.poll_active().await.and_then(|results| {
            let errors = results.iter().filter(|(_, r)| r.is_err()).count();
            for (batch_id, lookup) in &results {
                match lookup {
                    Ok(BatchLookup::Progress(p)) if p.is_terminal() => info!(
                        %batch_id,
                        status = %p.status,
                        successful = p.successful.len(),
                        failed = p.failed.len(),
                        "batch finished"
                    ),
                    Ok(BatchLookup::Progress(p)) => info!(
                        %batch_id,
                        completed = p.completed(),
                        total = p.total,
                        "batch progress"
                    ),
                    Ok(BatchLookup::Pending) => info!(%batch_id, "batch not visible yet"),
                    Ok(BatchLookup::Expired { .. }) => {
                        warn!(%batch_id, "batch expired before it was seen finishing")
                    }
                    Ok(BatchLookup::NotFound) => warn!(%batch_id, "batch unknown to the backend"),
                    // already logged by the tracker
                    Err(_) => {}
                }
            }
            if !results.is_empty() && errors == results.len() {
                anyhow::bail!("all {errors} batch polls failed");
            }
            Ok(())
        });

        match round {
            Ok(()) => failed_rounds = 0,
            Err(err) => {
                failed_rounds += 1;
                error!(?err, failed_rounds, "polling round failed");
                if failed_rounds >= args.max_failed_rounds {
                    error!(
                        threshold = args.max_failed_rounds,
                        "too many failed polling rounds, exiting"
                    );
                    anyhow::bail!("backend unreachable after {failed_rounds} rounds");
                }
            }
        }

        let remaining = db::count_active(&pool).await?;
        if remaining == 0 {
            info!("all batches finished");
            break;
        }
        if args.once {
            info!(remaining, "single round done");
            break;
        }
        if tokio::time::Instant::now() + interval > deadline {
            warn!(remaining, "watch timeout reached with batches still running");
            break;
        }
        tokio::time::sleep(interval).await;
    }

    Ok(())
}

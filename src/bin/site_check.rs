use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use legal_console::api::ApiClient;
use legal_console::config;

#[derive(Parser, Debug)]
#[command(about = "Test connectivity of configured WordPress sites")]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Site to test; all active sites when omitted
    #[arg(long)]
    site_id: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = config::load(Some(&args.config))?;
    let client = ApiClient::from_config(&cfg)?;

    let site_ids: Vec<i64> = match args.site_id {
        Some(id) => vec![id],
        None => client
            .list_sites()
            .await?
            .into_iter()
            .filter(|s| s.is_active)
            .map(|s| s.id)
            .collect(),
    };

    let mut failures = 0;
    for id in site_ids {
        let site = client.get_site(id).await?;
        let res = client.test_site(id).await?;
        println!(
            "{} #{} {} -> {}",
            if res.success { "ok  " } else { "FAIL" },
            site.id,
            site.site_url,
            res.message
        );
        if let Some(info) = res.site_info {
            println!("  {info}");
        }
        if !res.success {
            failures += 1;
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} site(s) failed the connection test");
    }
    Ok(())
}

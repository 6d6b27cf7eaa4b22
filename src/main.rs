//! Blend batch entrypoint: prints recommendations for the demo catalog.
//!
//! Usage: `blend [--season S] [--device D] [--user U]...`

use std::sync::Arc;

use anyhow::{Context as _, bail};
use mimalloc::MiMalloc;

use blend::cache::RedisCacheStore;
use blend::config::Config;
use blend::model::{Context, UserId};
use blend::provider::InMemoryDataProvider;
use blend::service::{RecommendationService, RecommendationStatus};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: blend [--season SEASON] [--device DEVICE] [--user USER_ID]...";

#[derive(Debug, Default)]
struct Args {
    season: Option<String>,
    device: Option<String>,
    users: Vec<UserId>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Option<Args>> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--season" => parsed.season = Some(args.next().context("--season needs a value")?),
            "--device" => parsed.device = Some(args.next().context("--device needs a value")?),
            "--user" => parsed.users.push(args.next().context("--user needs a value")?),
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
    }

    Ok(Some(parsed))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        weights = ?config.weights,
        top_k = config.top_k,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Blend starting"
    );

    let provider = Arc::new(InMemoryDataProvider::sample());
    let users = if args.users.is_empty() {
        provider.user_ids()
    } else {
        args.users
    };

    let mut service = RecommendationService::new(&config, provider).await?;
    if let Some(url) = &config.redis_url {
        match RedisCacheStore::connect(url).await {
            Ok(store) => service = service.with_cache_store(Arc::new(store)),
            Err(e) => tracing::warn!("Cache store unavailable: {}. Using in-process cache only.", e),
        }
    }

    let context = Context::new(args.season.as_deref(), args.device.as_deref());

    for user_id in &users {
        let result = match service.recommend_with_status(user_id, &context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Skipping user");
                continue;
            }
        };

        println!("Recommendations for user {user_id}:");
        if result.status == RecommendationStatus::NoSignal {
            println!("  (no recommendations available)");
            continue;
        }
        for (rank, entry) in result.list.iter().enumerate() {
            println!("  {}. item {} (score {:.3})", rank + 1, entry.item_id, entry.score);
            println!("     {}", entry.explanation());
        }
    }

    Ok(())
}

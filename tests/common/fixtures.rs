//! Test fixtures for integration tests.

use std::sync::Arc;

use blend::config::Config;
use blend::model::{Context, Item, User};
use blend::provider::InMemoryDataProvider;
use blend::service::RecommendationService;

pub const COLD_START_USER: &str = "5";

pub const WINTER: &str = "winter";

pub const MOBILE: &str = "mobile";

pub fn winter_mobile() -> Context {
    Context::new(Some(WINTER), Some(MOBILE))
}

pub fn sample_provider() -> Arc<InMemoryDataProvider> {
    Arc::new(InMemoryDataProvider::sample())
}

pub async fn sample_service(config: Config) -> (RecommendationService, Arc<InMemoryDataProvider>) {
    let provider = sample_provider();
    let service = RecommendationService::new(&config, provider.clone())
        .await
        .expect("sample service should build");
    (service, provider)
}

/// Builds `count` items `item-000..` with descending popularity and alternating seasons.
pub fn numbered_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| {
            let season = if i % 2 == 0 { WINTER } else { "summer" };
            Item::new(format!("item-{i:03}"), "Generated")
                .with_tags([format!("tag-{}", i % 5)])
                .with_popularity((count - i) as u64)
                .with_seasons([season])
        })
        .collect()
}

pub fn user_with_tags(id: &str, tags: &[&str]) -> User {
    User::new(id).with_preference_tags(tags.iter().copied())
}

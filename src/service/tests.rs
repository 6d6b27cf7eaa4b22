use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::*;
use crate::cache::{CacheStatus, InMemoryCacheStore};
use crate::combiner::{CombineError, WeightConfig};
use crate::config::{Config, ConfigError};
use crate::model::{Context, FactorVector, Interaction, Item, ItemId, User};
use crate::provider::{DataProvider, InMemoryDataProvider, ProviderError, ProviderResult};
use crate::scoring::{ItemFactors, Signal};

fn config_with(weights: WeightConfig) -> Config {
    Config {
        weights,
        ..Default::default()
    }
}

fn outdoor_provider() -> Arc<InMemoryDataProvider> {
    Arc::new(
        InMemoryDataProvider::new()
            .with_item(
                Item::new("A", "Outdoor")
                    .with_popularity(50)
                    .with_seasons(["winter"]),
            )
            .with_item(Item::new("B", "Outdoor").with_popularity(30))
            .with_item(Item::new("C", "Outdoor").with_popularity(10))
            .with_user(User::new("newcomer")),
    )
}

async fn service_for(provider: Arc<InMemoryDataProvider>, config: Config) -> RecommendationService {
    RecommendationService::new(&config, provider).await.unwrap()
}

/// Delegates to an in-memory provider after a fixed delay on candidate loading.
struct SlowProvider {
    inner: InMemoryDataProvider,
    delay: Duration,
}

#[async_trait]
impl DataProvider for SlowProvider {
    async fn get_user(&self, user_id: &str) -> ProviderResult<User> {
        self.inner.get_user(user_id).await
    }

    async fn get_candidate_items(
        &self,
        user: &User,
        context: &Context,
    ) -> ProviderResult<Vec<Item>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_candidate_items(user, context).await
    }

    async fn get_user_factors(&self, user: &User) -> ProviderResult<Option<FactorVector>> {
        self.inner.get_user_factors(user).await
    }

    async fn get_item_factors(&self) -> ProviderResult<ItemFactors> {
        self.inner.get_item_factors().await
    }

    async fn get_user_preference_tags(&self, user: &User) -> ProviderResult<BTreeSet<String>> {
        self.inner.get_user_preference_tags(user).await
    }

    async fn get_popularity_counts(&self) -> ProviderResult<HashMap<ItemId, u64>> {
        self.inner.get_popularity_counts().await
    }
}

#[tokio::test]
async fn test_cold_start_winter_mobile_ranks_seasonal_item_first() {
    let provider = outdoor_provider();
    let service = service_for(provider, config_with(WeightConfig::new(0.4, 0.3, 0.2, 0.1))).await;

    let context = Context::new(Some("winter"), Some("mobile"));
    let result = service
        .recommend_with_status("newcomer", &context)
        .await
        .unwrap();

    assert_eq!(result.status, RecommendationStatus::Ranked);
    assert_eq!(result.cache_status, Some(CacheStatus::Miss));
    assert_eq!(result.list.item_ids(), vec!["A", "B", "C"]);

    let top = result.list.first().unwrap();
    assert!((top.score - 1.0).abs() < 1e-6);
    assert_eq!(top.contribution(Signal::MatrixFactorization), None);
    assert_eq!(top.contribution(Signal::ContentBased), None);
}

#[tokio::test]
async fn test_second_request_is_cached() {
    let provider = outdoor_provider();
    let service = service_for(provider.clone(), Config::default()).await;
    let context = Context::new(Some("winter"), None);

    let first = service.recommend_with_status("newcomer", &context).await.unwrap();
    let second = service
        .recommend_with_status("newcomer", &context.clone().at(Utc::now()))
        .await
        .unwrap();

    assert_eq!(first.list, second.list);
    assert_eq!(second.cache_status, Some(CacheStatus::Hit));
    assert_eq!(provider.candidate_requests(), 1);
}

#[tokio::test]
async fn test_distinct_contexts_are_cached_separately() {
    let provider = outdoor_provider();
    let service = service_for(provider.clone(), Config::default()).await;

    service
        .recommend("newcomer", &Context::new(Some("winter"), None))
        .await
        .unwrap();
    service
        .recommend("newcomer", &Context::new(Some("summer"), None))
        .await
        .unwrap();

    assert_eq!(provider.candidate_requests(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_compute_once() {
    let provider = outdoor_provider();
    let service = Arc::new(service_for(provider.clone(), Config::default()).await);
    let context = Context::new(Some("winter"), Some("mobile"));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let service = Arc::clone(&service);
            let context = context.clone();
            tokio::spawn(async move { service.recommend("newcomer", &context).await.unwrap() })
        })
        .collect();

    let mut lists = Vec::new();
    for handle in handles {
        lists.push(handle.await.unwrap());
    }

    assert!(lists.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(provider.candidate_requests(), 1);
}

#[tokio::test]
async fn test_interacted_items_are_excluded() {
    let provider = outdoor_provider();
    provider.insert_user(
        User::new("returning").with_history(vec![Interaction::new("returning", "A", 1.0, Utc::now())]),
    );

    let service = service_for(provider.clone(), Config::default()).await;
    let list = service
        .recommend("returning", &Context::default())
        .await
        .unwrap();
    assert_eq!(list.item_ids(), vec!["B", "C"]);

    let keep_all = Config {
        exclude_interacted: false,
        ..Default::default()
    };
    let service = service_for(provider, keep_all).await;
    let list = service
        .recommend("returning", &Context::default())
        .await
        .unwrap();
    assert!(list.item_ids().contains(&"A"));
}

#[tokio::test]
async fn test_no_candidates_is_empty_and_not_cached() {
    let provider = Arc::new(InMemoryDataProvider::new().with_user(User::new("u")));
    let service = service_for(provider.clone(), Config::default()).await;

    for _ in 0..2 {
        let result = service
            .recommend_with_status("u", &Context::default())
            .await
            .unwrap();
        assert_eq!(result.status, RecommendationStatus::NoSignal);
        assert_eq!(result.cache_status, None);
        assert!(result.is_empty());
    }

    assert_eq!(provider.candidate_requests(), 2);
}

#[tokio::test]
async fn test_all_interacted_is_no_signal() {
    let provider = Arc::new(
        InMemoryDataProvider::new()
            .with_item(Item::new("A", "c").with_popularity(1))
            .with_user(User::new("u").with_history(vec![Interaction::new("u", "A", 1.0, Utc::now())])),
    );
    let service = service_for(provider, Config::default()).await;

    let list = service.recommend("u", &Context::default()).await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_unknown_user_is_error_and_not_cached() {
    let provider = outdoor_provider();
    let service = service_for(provider, Config::default()).await;

    let err = service
        .recommend("ghost", &Context::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::Provider(ProviderError::UnknownUser {
            user_id: "ghost".to_string()
        })
    );

    service.cache().run_pending_tasks().await;
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_provider_outage_fails_request_then_recovers() {
    let provider = outdoor_provider();
    let service = service_for(provider.clone(), Config::default()).await;

    provider.set_unavailable(Some("db down"));
    let err = service
        .recommend("newcomer", &Context::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Provider(ProviderError::Unavailable { .. })));

    provider.set_unavailable(None);
    let list = service
        .recommend("newcomer", &Context::default())
        .await
        .unwrap();
    assert_eq!(list.len(), 3);
}

#[tokio::test]
async fn test_timeout_aborts_and_caches_nothing() {
    let inner = InMemoryDataProvider::new()
        .with_item(Item::new("A", "c"))
        .with_user(User::new("u"));
    let provider = Arc::new(SlowProvider {
        inner,
        delay: Duration::from_millis(200),
    });
    let config = Config {
        request_timeout: Duration::from_millis(20),
        ..Default::default()
    };
    let service = RecommendationService::new(&config, provider).await.unwrap();

    let err = service
        .recommend("u", &Context::default())
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Timeout { timeout_ms: 20 });

    service.cache().run_pending_tasks().await;
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let provider = outdoor_provider();

    let err = RecommendationService::new(
        &config_with(WeightConfig::new(0.0, 0.0, 0.0, 0.0)),
        provider.clone(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Config(ConfigError::InvalidWeights(
            CombineError::InvalidWeightConfig { .. }
        ))
    ));

    let zero_top_k = Config {
        top_k: 0,
        ..Default::default()
    };
    assert!(RecommendationService::new(&zero_top_k, provider).await.is_err());
}

#[tokio::test]
async fn test_top_k_truncates() {
    let provider = outdoor_provider();
    let config = Config {
        top_k: 2,
        ..Default::default()
    };
    let service = service_for(provider, config).await;

    let list = service
        .recommend("newcomer", &Context::default())
        .await
        .unwrap();
    assert_eq!(list.item_ids(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_zero_weight_signal_is_not_scored() {
    let provider = outdoor_provider();
    let service = service_for(provider, config_with(WeightConfig::new(0.5, 0.5, 1.0, 0.0))).await;

    let list = service
        .recommend("newcomer", &Context::new(Some("winter"), None))
        .await
        .unwrap();

    for entry in &list {
        assert_eq!(entry.contribution(Signal::Contextual), None);
    }
}

#[tokio::test]
async fn test_clear_user_forces_recompute() {
    let provider = outdoor_provider();
    let service = service_for(provider.clone(), Config::default()).await;
    let context = Context::default();

    service.recommend("newcomer", &context).await.unwrap();
    assert_eq!(service.clear_user("newcomer").await, 1);
    assert_eq!(service.clear_user("newcomer").await, 0);

    let result = service
        .recommend_with_status("newcomer", &context)
        .await
        .unwrap();
    assert_eq!(result.cache_status, Some(CacheStatus::Miss));
    assert_eq!(provider.candidate_requests(), 2);
}

#[tokio::test]
async fn test_reload_item_factors_changes_ranking() {
    let provider = Arc::new(
        InMemoryDataProvider::new()
            .with_item(Item::new("a", "c"))
            .with_item(Item::new("b", "c"))
            .with_user(User::new("u"))
            .with_user_factors("u", vec![1.0, 0.0])
            .with_item_factors("a", vec![1.0, 0.0])
            .with_item_factors("b", vec![0.0, 1.0]),
    );
    let service = service_for(provider.clone(), config_with(WeightConfig::new(1.0, 0.0, 0.0, 0.0))).await;

    let before = service.recommend("u", &Context::default()).await.unwrap();
    assert_eq!(before.item_ids(), vec!["a", "b"]);

    provider.set_item_factors("a", vec![0.0, 1.0]);
    provider.set_item_factors("b", vec![2.0, 0.0]);
    assert_eq!(service.reload_item_factors().await.unwrap(), 2);

    let cached = service.recommend("u", &Context::default()).await.unwrap();
    assert_eq!(cached, before);

    service.clear_user("u").await;
    let after = service.recommend("u", &Context::default()).await.unwrap();
    assert_eq!(after.item_ids(), vec!["b", "a"]);
}

#[tokio::test]
async fn test_recommend_many_skips_failures() {
    let provider = Arc::new(InMemoryDataProvider::sample());
    let service = service_for(provider, Config::default()).await;

    let users = vec!["1".to_string(), "ghost".to_string(), "2".to_string()];
    let results = service
        .recommend_many(&users, &Context::new(Some("winter"), Some("mobile")))
        .await;

    let ids: Vec<&str> = results.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert!(results.iter().all(|(_, list)| !list.is_empty()));
}

#[tokio::test]
async fn test_sample_user_never_sees_own_history() {
    let provider = Arc::new(InMemoryDataProvider::sample());
    let service = service_for(provider, Config::default()).await;

    let list = service
        .recommend("1", &Context::new(Some("winter"), Some("mobile")))
        .await
        .unwrap();

    let ids = list.item_ids();
    assert!(!ids.contains(&"101"));
    assert!(!ids.contains(&"103"));
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_cache_store_is_shared_between_services() {
    let provider = outdoor_provider();
    let store = Arc::new(InMemoryCacheStore::new());
    let context = Context::new(Some("winter"), None);

    let first = service_for(provider.clone(), Config::default())
        .await
        .with_cache_store(store.clone());
    let computed = first
        .recommend_with_status("newcomer", &context)
        .await
        .unwrap();
    assert_eq!(computed.cache_status, Some(CacheStatus::Miss));

    let second = service_for(provider.clone(), Config::default())
        .await
        .with_cache_store(store.clone());
    let adopted = second
        .recommend_with_status("newcomer", &context)
        .await
        .unwrap();

    assert_eq!(adopted.cache_status, Some(CacheStatus::StoreHit));
    assert_eq!(adopted.list, computed.list);
    assert_eq!(provider.candidate_requests(), 1);
}

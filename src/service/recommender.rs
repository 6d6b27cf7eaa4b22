//! Request orchestration: hydrate inputs, score, normalize, combine, cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use super::error::{ServiceError, ServiceResult};
use super::types::Recommendations;
use crate::cache::{CacheKey, CacheStore, RecommendationCache};
use crate::combiner::{HybridCombiner, RecommendationList};
use crate::config::Config;
use crate::model::{Context, Item, ItemId, User, UserId};
use crate::provider::DataProvider;
use crate::scoring::{
    ContentBasedScorer, ContextualAdjuster, ItemFactors, MatrixFactorizationScorer,
    NormalizedScoreVector, PopularityScorer, ScoreVector, Signal, SignalScorer, normalize,
};

/// Produces cached, ranked recommendations for a user in a context.
///
/// Holds the only shared mutable state of the engine: the recommendation cache and the
/// item-factor table (swapped whole by [`reload_item_factors`](Self::reload_item_factors)).
pub struct RecommendationService {
    provider: Arc<dyn DataProvider>,
    cache: RecommendationCache,
    combiner: HybridCombiner,
    adjuster: ContextualAdjuster,
    item_factors: RwLock<Arc<ItemFactors>>,
    top_k: usize,
    request_timeout: Duration,
    exclude_interacted: bool,
}

impl RecommendationService {
    /// Validates `config`, builds the combiner and loads the item-factor table.
    pub async fn new(config: &Config, provider: Arc<dyn DataProvider>) -> ServiceResult<Self> {
        config.validate()?;
        let combiner = HybridCombiner::new(&config.weights)?;
        let item_factors = provider.get_item_factors().await?;

        info!(
            top_k = config.top_k,
            cache_ttl_secs = config.cache_ttl.as_secs(),
            item_factors = item_factors.len(),
            "Recommendation service ready"
        );

        Ok(Self {
            provider,
            cache: RecommendationCache::new(config.cache_capacity, config.cache_ttl),
            combiner,
            adjuster: ContextualAdjuster::new(config.context_boost),
            item_factors: RwLock::new(Arc::new(item_factors)),
            top_k: config.top_k,
            request_timeout: config.request_timeout,
            exclude_interacted: config.exclude_interacted,
        })
    }

    /// Writes computed lists through to `store` and consults it on in-process misses.
    pub fn with_cache_store(self, store: Arc<dyn CacheStore>) -> Self {
        Self {
            cache: self.cache.with_store(store),
            ..self
        }
    }

    #[inline]
    pub fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Returns up to `top_k` recommendations. No signal yields an empty list.
    pub async fn recommend(&self, user_id: &str, context: &Context) -> ServiceResult<RecommendationList> {
        Ok(self.recommend_with_status(user_id, context).await?.list)
    }

    /// Like [`recommend`](Self::recommend), also reporting ranking and cache status.
    #[instrument(
        skip(self, context),
        fields(user_id = %user_id, season = ?context.season(), device = ?context.device())
    )]
    pub async fn recommend_with_status(
        &self,
        user_id: &str,
        context: &Context,
    ) -> ServiceResult<Recommendations> {
        let key = CacheKey::for_request(user_id, context);
        let timeout = self.request_timeout;

        let compute = async {
            match tokio::time::timeout(timeout, self.compute(user_id, context)).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            }
        };

        match self.cache.get_or_compute(key, compute).await {
            Ok(lookup) => {
                let status = lookup.status();
                let list = lookup.into_list();
                info!(cache = %status, count = list.len(), "Recommendations served");
                Ok(Recommendations::ranked(user_id, list, status))
            }
            Err(shared) => {
                let err = ServiceError::from_shared(shared);
                if err.is_no_signal() {
                    info!("No signal produced candidates, returning empty list");
                    return Ok(Recommendations::no_signal(user_id));
                }
                warn!(error = %err, "Recommendation request failed");
                Err(err)
            }
        }
    }

    /// Serves several users concurrently. Failed users are logged and left out.
    #[instrument(skip(self, user_ids, context), fields(users = user_ids.len()))]
    pub async fn recommend_many(
        &self,
        user_ids: &[UserId],
        context: &Context,
    ) -> Vec<(UserId, RecommendationList)> {
        let results = join_all(
            user_ids
                .iter()
                .map(|user_id| self.recommend(user_id, context)),
        )
        .await;

        user_ids
            .iter()
            .zip(results)
            .filter_map(|(user_id, result)| match result {
                Ok(list) => Some((user_id.clone(), list)),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Skipping user");
                    None
                }
            })
            .collect()
    }

    /// Drops every cached list of `user_id`. Returns the number of in-process entries removed.
    #[instrument(skip(self))]
    pub async fn clear_user(&self, user_id: &str) -> usize {
        let removed = self.cache.invalidate_user(user_id).await;
        info!(removed, "Cleared cached recommendations");
        removed
    }

    /// Reloads the item-factor table from the provider. Cached lists keep their TTL.
    #[instrument(skip(self))]
    pub async fn reload_item_factors(&self) -> ServiceResult<usize> {
        let table = self.provider.get_item_factors().await?;
        let count = table.len();
        *self.item_factors.write() = Arc::new(table);
        info!(item_factors = count, "Item factors reloaded");
        Ok(count)
    }

    async fn compute(&self, user_id: &str, context: &Context) -> ServiceResult<RecommendationList> {
        let user = self.provider.get_user(user_id).await?;

        let (mut candidates, user_factors, preference_tags, popularity) = tokio::try_join!(
            self.provider.get_candidate_items(&user, context),
            self.provider.get_user_factors(&user),
            self.provider.get_user_preference_tags(&user),
            self.provider.get_popularity_counts(),
        )?;

        if self.exclude_interacted {
            let seen = user.interacted_items();
            candidates.retain(|item| !seen.contains(item.id.as_str()));
        }
        for item in &mut candidates {
            if let Some(count) = popularity.get(&item.id) {
                item.popularity = *count;
            }
        }
        debug!(
            candidates = candidates.len(),
            cold_start = user.is_cold_start(),
            "Candidates hydrated"
        );

        let user = User {
            preference_tags,
            ..user
        };
        let item_factors = self.item_factors.read().clone();
        let scorers = self.scorers(item_factors, user_factors);

        let vectors = self
            .run_scorers(scorers, Arc::new(user), Arc::new(candidates.clone()), context)
            .await?;

        let normalized: Vec<NormalizedScoreVector> = vectors
            .into_iter()
            .map(|vector| {
                let signal = vector.signal();
                let normalized = normalize(vector);
                if signal == Signal::Contextual {
                    normalized
                } else {
                    self.adjuster.adjust(normalized, &candidates, context)
                }
            })
            .collect();

        let counts: HashMap<ItemId, u64> = candidates
            .iter()
            .map(|item| (item.id.clone(), item.popularity))
            .collect();

        self.combiner
            .combine(&normalized, &counts, self.top_k)
            .map_err(ServiceError::from)
    }

    /// Scorers for every signal with a positive weight.
    fn scorers(
        &self,
        item_factors: Arc<ItemFactors>,
        user_factors: Option<Vec<f32>>,
    ) -> Vec<Arc<dyn SignalScorer>> {
        let all: [Arc<dyn SignalScorer>; 4] = [
            Arc::new(MatrixFactorizationScorer::new(item_factors, user_factors)),
            Arc::new(ContentBasedScorer::new()),
            Arc::new(PopularityScorer::new()),
            Arc::new(self.adjuster),
        ];

        all.into_iter()
            .filter(|scorer| self.combiner.weights().get(scorer.signal()) > 0.0)
            .collect()
    }

    /// Runs each scorer on the blocking pool and waits for all of them.
    async fn run_scorers(
        &self,
        scorers: Vec<Arc<dyn SignalScorer>>,
        user: Arc<User>,
        candidates: Arc<Vec<Item>>,
        context: &Context,
    ) -> ServiceResult<Vec<ScoreVector>> {
        let context = Arc::new(context.clone());

        let tasks = scorers.iter().map(|scorer| {
            let scorer = Arc::clone(scorer);
            let user = Arc::clone(&user);
            let candidates = Arc::clone(&candidates);
            let context = Arc::clone(&context);
            tokio::task::spawn_blocking(move || scorer.score(&user, &candidates, &context))
        });
        let results = join_all(tasks).await;

        scorers
            .iter()
            .zip(results)
            .map(|(scorer, result)| {
                result.map_err(|e| ServiceError::ScorerPanicked {
                    signal: scorer.signal(),
                    reason: e.to_string(),
                })
            })
            .inspect(|result| {
                if let Ok(vector) = result {
                    debug!(signal = %vector.signal(), scored = vector.len(), "Scorer finished");
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationService")
            .field("cache", &self.cache)
            .field("weights", self.combiner.weights())
            .field("top_k", &self.top_k)
            .field("request_timeout", &self.request_timeout)
            .field("exclude_interacted", &self.exclude_interacted)
            .finish_non_exhaustive()
    }
}

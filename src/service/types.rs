use serde::Serialize;

use crate::cache::CacheStatus;
use crate::combiner::RecommendationList;
use crate::model::UserId;

/// Outcome class of a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    /// At least one signal produced candidates; the list is ranked.
    Ranked,
    /// No signal produced any candidate. The list is empty and was not cached.
    NoSignal,
}

/// A recommendation list with how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub user_id: UserId,
    pub list: RecommendationList,
    pub status: RecommendationStatus,
    /// `None` when nothing went through the cache ([`RecommendationStatus::NoSignal`]).
    pub cache_status: Option<CacheStatus>,
}

impl Recommendations {
    pub(crate) fn ranked(user_id: &str, list: RecommendationList, cache_status: CacheStatus) -> Self {
        Self {
            user_id: user_id.to_string(),
            list,
            status: RecommendationStatus::Ranked,
            cache_status: Some(cache_status),
        }
    }

    pub(crate) fn no_signal(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            list: RecommendationList::empty(),
            status: RecommendationStatus::NoSignal,
            cache_status: None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

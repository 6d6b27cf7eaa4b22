//! Read-only access to users, items and model artifacts.
//!
//! The service is the only caller. Implementations may perform I/O; scorers never do.

pub mod error;
pub mod memory;


pub use error::{ProviderError, ProviderResult};
pub use memory::InMemoryDataProvider;

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::model::{Context, FactorVector, Item, ItemId, User};
use crate::scoring::ItemFactors;

#[async_trait]
/// Source of users, candidate items and latent factors.
pub trait DataProvider: Send + Sync {
    /// Loads a user with their interaction history.
    async fn get_user(&self, user_id: &str) -> ProviderResult<User>;

    /// Returns the items eligible for recommendation to `user` under `context`.
    async fn get_candidate_items(&self, user: &User, context: &Context)
    -> ProviderResult<Vec<Item>>;

    /// Returns the user's latent factors, or `None` for a cold-start user.
    async fn get_user_factors(&self, user: &User) -> ProviderResult<Option<FactorVector>>;

    /// Returns the full item-factor table.
    async fn get_item_factors(&self) -> ProviderResult<ItemFactors>;

    /// Returns the user's preference tags.
    async fn get_user_preference_tags(&self, user: &User) -> ProviderResult<BTreeSet<String>>;

    /// Returns raw interaction counts per item.
    async fn get_popularity_counts(&self) -> ProviderResult<HashMap<ItemId, u64>>;
}

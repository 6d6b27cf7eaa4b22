//! In-memory [`DataProvider`] with a small demo catalog.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::error::{ProviderError, ProviderResult};
use super::DataProvider;
use crate::model::{Context, FactorVector, Interaction, Item, ItemId, User, UserId};
use crate::scoring::ItemFactors;

const ALL_SEASONS: [&str; 4] = ["winter", "spring", "summer", "autumn"];

#[derive(Default)]
struct Catalog {
    users: HashMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    user_factors: HashMap<UserId, FactorVector>,
    item_factors: ItemFactors,
    unavailable: Option<String>,
}

/// Thread-safe in-memory provider.
///
/// Candidates are every catalog item, in id order. Preference tags fall back to the
/// tags of the items in the user's history when the user has none of their own.
#[derive(Default)]
pub struct InMemoryDataProvider {
    catalog: RwLock<Catalog>,
    candidate_requests: AtomicUsize,
}

impl std::fmt::Debug for InMemoryDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let catalog = self.catalog.read();
        f.debug_struct("InMemoryDataProvider")
            .field("users", &catalog.users.len())
            .field("items", &catalog.items.len())
            .field("item_factors", &catalog.item_factors.len())
            .finish()
    }
}

impl InMemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.insert_user(user);
        self
    }

    pub fn with_item(self, item: Item) -> Self {
        self.insert_item(item);
        self
    }

    pub fn with_user_factors(self, user_id: impl Into<UserId>, factors: FactorVector) -> Self {
        self.set_user_factors(user_id, factors);
        self
    }

    pub fn with_item_factors(self, item_id: impl Into<ItemId>, factors: FactorVector) -> Self {
        self.set_item_factors(item_id, factors);
        self
    }

    pub fn insert_user(&self, user: User) {
        self.catalog.write().users.insert(user.id.clone(), user);
    }

    pub fn insert_item(&self, item: Item) {
        self.catalog.write().items.insert(item.id.clone(), item);
    }

    pub fn set_user_factors(&self, user_id: impl Into<UserId>, factors: FactorVector) {
        self.catalog
            .write()
            .user_factors
            .insert(user_id.into(), factors);
    }

    pub fn set_item_factors(&self, item_id: impl Into<ItemId>, factors: FactorVector) {
        self.catalog
            .write()
            .item_factors
            .insert(item_id.into(), factors);
    }

    /// Makes every call fail with [`ProviderError::Unavailable`] until cleared with `None`.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.catalog.write().unavailable = reason.map(str::to_string);
    }

    /// Number of `get_candidate_items` calls served so far.
    pub fn candidate_requests(&self) -> usize {
        self.candidate_requests.load(Ordering::SeqCst)
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.catalog.read().users.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn check_available(catalog: &Catalog) -> ProviderResult<()> {
        match &catalog.unavailable {
            Some(reason) => Err(ProviderError::Unavailable {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Demo catalog: five users and five products with browsing and purchase history.
    ///
    /// User `"5"` has no history and no factors (cold start). Popularity is the number of
    /// recorded interactions per product.
    pub fn sample() -> Self {
        let items = [
            Item::new("101", "Electronics")
                .with_tags(["audio", "wireless", "bluetooth"])
                .with_seasons(["winter"])
                .with_devices(["mobile", "tablet"]),
            Item::new("102", "Accessories")
                .with_tags(["phone", "protection", "case"])
                .with_devices(["mobile"]),
            Item::new("103", "Fitness")
                .with_tags(["exercise", "mat", "yoga"])
                .with_seasons(["summer"])
                .with_devices(["tablet"]),
            Item::new("104", "Personal Care")
                .with_tags(["hygiene", "electric", "toothbrush"])
                .with_seasons(ALL_SEASONS)
                .with_devices(["mobile"]),
            Item::new("105", "Office Supplies")
                .with_tags(["work", "laptop", "stand"])
                .with_seasons(["autumn"])
                .with_devices(["desktop"]),
        ];

        // (user, item, strength, timestamp): browsing = 0.5, purchase = quantity
        let interactions = [
            ("1", "101", 0.5, "2025-03-04T10:00:00Z"),
            ("1", "103", 0.5, "2023-10-01T10:05:00Z"),
            ("1", "101", 1.0, "2025-03-04T10:00:00Z"),
            ("2", "102", 0.5, "2025-03-04T11:30:00Z"),
            ("2", "105", 2.0, "2025-03-04T12:00:00Z"),
            ("3", "104", 0.5, "2025-03-04T14:30:00Z"),
            ("3", "103", 1.0, "2025-03-04T12:00:00Z"),
            ("4", "105", 0.5, "2025-03-04T16:30:00Z"),
            ("4", "101", 1.0, "2025-03-04T12:00:00Z"),
        ];

        let mut popularity: HashMap<&str, u64> = HashMap::new();
        let mut histories: BTreeMap<&str, Vec<Interaction>> = BTreeMap::new();
        for (user_id, item_id, strength, ts) in interactions {
            *popularity.entry(item_id).or_default() += 1;
            histories.entry(user_id).or_default().push(Interaction::new(
                user_id,
                item_id,
                strength,
                parse_timestamp(ts),
            ));
        }
        for history in histories.values_mut() {
            history.sort_by_key(Interaction::timestamp);
        }

        let provider = Self::new();
        for item in items {
            let count = popularity.get(item.id.as_str()).copied().unwrap_or(0);
            provider.insert_item(item.with_popularity(count));
        }
        for user_id in ["1", "2", "3", "4", "5"] {
            let history = histories.remove(user_id).unwrap_or_default();
            provider.insert_user(User::new(user_id).with_history(history));
        }

        for (item_id, factors) in [
            ("101", [0.9, 0.1, 0.2]),
            ("102", [0.7, 0.0, 0.1]),
            ("103", [0.1, 0.9, 0.1]),
            ("104", [0.4, 0.3, 0.0]),
            ("105", [0.2, 0.1, 0.9]),
        ] {
            provider.set_item_factors(item_id, factors.to_vec());
        }
        for (user_id, factors) in [
            ("1", [0.8, 0.5, 0.1]),
            ("2", [0.3, 0.1, 0.9]),
            ("3", [0.2, 0.9, 0.1]),
            ("4", [0.9, 0.1, 0.3]),
        ] {
            provider.set_user_factors(user_id, factors.to_vec());
        }

        provider
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

#[async_trait]
impl DataProvider for InMemoryDataProvider {
    async fn get_user(&self, user_id: &str) -> ProviderResult<User> {
        let catalog = self.catalog.read();
        Self::check_available(&catalog)?;
        catalog
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownUser {
                user_id: user_id.to_string(),
            })
    }

    async fn get_candidate_items(
        &self,
        _user: &User,
        _context: &Context,
    ) -> ProviderResult<Vec<Item>> {
        self.candidate_requests.fetch_add(1, Ordering::SeqCst);
        let catalog = self.catalog.read();
        Self::check_available(&catalog)?;
        Ok(catalog.items.values().cloned().collect())
    }

    async fn get_user_factors(&self, user: &User) -> ProviderResult<Option<FactorVector>> {
        let catalog = self.catalog.read();
        Self::check_available(&catalog)?;
        Ok(catalog.user_factors.get(&user.id).cloned())
    }

    async fn get_item_factors(&self) -> ProviderResult<ItemFactors> {
        let catalog = self.catalog.read();
        Self::check_available(&catalog)?;
        Ok(catalog.item_factors.clone())
    }

    async fn get_user_preference_tags(&self, user: &User) -> ProviderResult<BTreeSet<String>> {
        let catalog = self.catalog.read();
        Self::check_available(&catalog)?;

        if !user.preference_tags.is_empty() {
            return Ok(user.preference_tags.clone());
        }

        Ok(user
            .interacted_items()
            .into_iter()
            .filter_map(|id| catalog.items.get(id))
            .flat_map(|item| item.tags.iter().cloned())
            .collect())
    }

    async fn get_popularity_counts(&self) -> ProviderResult<HashMap<ItemId, u64>> {
        let catalog = self.catalog.read();
        Self::check_available(&catalog)?;
        Ok(catalog
            .items
            .values()
            .map(|item| (item.id.clone(), item.popularity))
            .collect())
    }
}

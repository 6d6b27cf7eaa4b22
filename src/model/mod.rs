//! Domain types shared by scorers, the combiner and the service.
//!
//! Users, items and interactions are owned by the [`DataProvider`](crate::provider::DataProvider)
//! and are read-only from the engine's point of view. [`Context`] is supplied per request.


use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identifier.
pub type UserId = String;

/// Item identifier.
pub type ItemId = String;

/// Latent-factor vector produced by an external matrix-factorization model.
pub type FactorVector = Vec<f32>;

/// A single recorded user/item interaction. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    user_id: UserId,
    item_id: ItemId,
    strength: f32,
    timestamp: DateTime<Utc>,
}

impl Interaction {
    pub fn new(
        user_id: impl Into<UserId>,
        item_id: impl Into<ItemId>,
        strength: f32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            strength,
            timestamp,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A user as seen by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Interactions in chronological order.
    pub history: Vec<Interaction>,
    pub preference_tags: BTreeSet<String>,
}

impl User {
    /// Creates a user with no history and no preferences.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            history: Vec::new(),
            preference_tags: BTreeSet::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Interaction>) -> Self {
        self.history = history;
        self
    }

    pub fn with_preference_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preference_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the user has neither history nor preferences.
    pub fn is_cold_start(&self) -> bool {
        self.history.is_empty() && self.preference_tags.is_empty()
    }

    /// Returns the set of item ids the user has interacted with.
    pub fn interacted_items(&self) -> BTreeSet<&str> {
        self.history.iter().map(Interaction::item_id).collect()
    }
}

/// A catalog item with the attributes scorers read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub category: String,
    pub tags: BTreeSet<String>,
    /// Raw interaction count.
    pub popularity: u64,
    /// Seasons in which the item is promoted.
    pub seasons: BTreeSet<String>,
    /// Device classes the item is suited for.
    pub devices: BTreeSet<String>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_popularity(mut self, popularity: u64) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn with_seasons<I, S>(mut self, seasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seasons = seasons.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_devices<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.devices = devices.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn matches_season(&self, season: &str) -> bool {
        self.seasons.contains(season)
    }

    #[inline]
    pub fn matches_device(&self, device: &str) -> bool {
        self.devices.contains(device)
    }

    /// Returns `true` if the item carries the context's season or device flag.
    pub fn matches_context(&self, context: &Context) -> bool {
        context.season().is_some_and(|s| self.matches_season(s))
            || context.device().is_some_and(|d| self.matches_device(d))
    }
}

/// Request-time signal. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    season: Option<String>,
    device: Option<String>,
    timestamp: DateTime<Utc>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            season: None,
            device: None,
            timestamp: Utc::now(),
        }
    }
}

impl Context {
    /// Creates a context stamped with the current time.
    pub fn new(season: Option<&str>, device: Option<&str>) -> Self {
        Self {
            season: season.map(str::to_string),
            device: device.map(str::to_string),
            timestamp: Utc::now(),
        }
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn season(&self) -> Option<&str> {
        self.season.as_deref()
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of context dimensions (season, device) that are set.
    pub fn dimensions(&self) -> usize {
        usize::from(self.season.is_some()) + usize::from(self.device.is_some())
    }
}

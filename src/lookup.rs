use std::sync::Arc;

use serde::Serialize;

use crate::config::StoreConfig;
use crate::handle::{normalize, Handle};
use crate::profile::ProfileRecord;
use crate::store::{
    Comparison, Field, ProfileStore, QueryFilter, RestProfileStore,
};
use crate::Result;

const LOG_PREFIX: &str = "[lookup]";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupResult {
    pub profile: Option<ProfileRecord>,
    /// The handle actually matched; `None` only for empty input.
    pub resolved_handle: Option<Handle>,
}

/// One step of the lookup cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ExactUsername,
    ExactDisplayName,
    PartialDisplayName,
    PartialUsername,
}

impl Strategy {
    /// Cascade order, from the most to the least precise.
    pub const CASCADE: [Strategy; 4] = [
        Strategy::ExactUsername,
        Strategy::ExactDisplayName,
        Strategy::PartialDisplayName,
        Strategy::PartialUsername,
    ];

    pub fn filter(&self, handle: &Handle, limit: usize) -> QueryFilter {
        let (field, comparison) = match self {
            Strategy::ExactUsername => (Field::Username, Comparison::Equals),
            Strategy::ExactDisplayName => {
                (Field::DisplayName, Comparison::ILike)
            }
            Strategy::PartialDisplayName => {
                (Field::DisplayName, Comparison::IContains)
            }
            Strategy::PartialUsername => (Field::Username, Comparison::IContains),
        };
        QueryFilter::new(field, comparison, handle.as_str(), limit)
    }

    /// Picks the accepted candidate. Exact strategies re-check equality
    /// because the store may compare loosely (`ilike` treats `_` as a
    /// wildcard); partial strategies take the first row.
    fn select(
        &self,
        handle: &Handle,
        candidates: Vec<ProfileRecord>,
    ) -> Option<ProfileRecord> {
        let exact = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| v.to_lowercase() == handle.as_str())
                .unwrap_or(false)
        };

        match self {
            Strategy::ExactUsername => {
                candidates.into_iter().find(|r| exact(&r.username))
            }
            Strategy::ExactDisplayName => {
                candidates.into_iter().find(|r| exact(&r.display_name))
            }
            Strategy::PartialDisplayName | Strategy::PartialUsername => {
                candidates.into_iter().next()
            }
        }
    }
}

/// Resolves a handle to a profile through the ordered strategy cascade.
pub struct ProfileLookup {
    store: Arc<dyn ProfileStore>,
    page_size: usize,
}

impl ProfileLookup {
    pub fn new(store: Arc<dyn ProfileStore>, page_size: usize) -> Self {
        Self { store, page_size }
    }

    /// Lookup against the configured REST store.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let store = RestProfileStore::new(config)?;
        Ok(Self::new(Arc::new(store), config.page_size))
    }

    /// Never fails: store errors degrade to "no candidates" for the
    /// strategy that hit them and the cascade moves on.
    pub async fn lookup(&self, handle: &Handle) -> LookupResult {
        if handle.is_empty() {
            return LookupResult::default();
        }

        for strategy in Strategy::CASCADE {
            let filter = strategy.filter(handle, self.page_size);
            let candidates = match self.store.query(&filter).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!(
                        "{} {:?} failed for {}: {}",
                        LOG_PREFIX,
                        strategy,
                        handle,
                        e
                    );
                    Vec::new()
                }
            };

            if let Some(profile) = strategy.select(handle, candidates) {
                let resolved = profile
                    .canonical_name()
                    .map(normalize)
                    .unwrap_or_else(|| handle.clone());
                log::debug!(
                    "{} {} matched by {:?} as {}",
                    LOG_PREFIX,
                    handle,
                    strategy,
                    resolved
                );
                return LookupResult {
                    profile: Some(profile),
                    resolved_handle: Some(resolved),
                };
            }
            log::debug!("{} {:?} had no match for {}", LOG_PREFIX, strategy, handle);
        }

        LookupResult {
            profile: None,
            resolved_handle: Some(handle.clone()),
        }
    }
}

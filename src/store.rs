use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use url::Url;

use crate::config::StoreConfig;
use crate::profile::ProfileRecord;
use crate::{HeroError, Result};

const LOG_PREFIX: &str = "[store]";

/// Columns requested from the store; matches [`ProfileRecord`].
pub const SELECT_COLUMNS: &str =
    "username,display_name,pfp,jsonInput,level,title,rarity,wave";

/// Searchable columns of the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    DisplayName,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::DisplayName => "display_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Exact equality, as decided by the store
    Equals,
    /// Case-insensitive equality
    ILike,
    /// Case-insensitive substring
    IContains,
}

/// One filtered read against the profile store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub field: Field,
    pub comparison: Comparison,
    pub value: String,
    pub limit: usize,
}

impl QueryFilter {
    pub fn new(
        field: Field,
        comparison: Comparison,
        value: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            field,
            comparison,
            value: value.into(),
            limit,
        }
    }

    /// The filter as a PostgREST query parameter, e.g. `("username", "eq.alice")`.
    pub fn to_param(&self) -> (&'static str, String) {
        let condition = match self.comparison {
            Comparison::Equals => format!("eq.{}", self.value),
            Comparison::ILike => format!("ilike.{}", self.value),
            Comparison::IContains => format!("ilike.%{}%", self.value),
        };
        (self.field.column(), condition)
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (column, condition) = self.to_param();
        write!(f, "{}={} (limit {})", column, condition, self.limit)
    }
}

/// Filtered read access to an external collection of profile records.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Records matching `filter`, at most `filter.limit` of them, in the
    /// order chosen by the store.
    async fn query(&self, filter: &QueryFilter) -> Result<Vec<ProfileRecord>>;
}

/// [`ProfileStore`] over a PostgREST endpoint (e.g. Supabase).
pub struct RestProfileStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl RestProfileStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let base = config.url.as_ref().ok_or_else(|| {
            HeroError::Config("store.url is not configured".to_owned())
        })?;
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            HeroError::Config("store.api_key is not configured".to_owned())
        })?;

        let endpoint = table_endpoint(base, &config.table)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("apikey", sensitive(api_key)?);
        headers.insert(AUTHORIZATION, sensitive(&format!("Bearer {}", api_key))?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        log::debug!("{} querying {}", LOG_PREFIX, endpoint);
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

pub(crate) const USER_AGENT_VALUE: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        HeroError::Config("store.api_key is not a valid header value".to_owned())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// `{base}/{table}`, tolerating a trailing slash on the base.
fn table_endpoint(base: &Url, table: &str) -> Result<Url> {
    let mut endpoint = base.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| {
            HeroError::Config(format!("store.url {} cannot be a base", base))
        })?
        .pop_if_empty()
        .push(table);
    Ok(endpoint)
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn query(&self, filter: &QueryFilter) -> Result<Vec<ProfileRecord>> {
        let (column, condition) = filter.to_param();
        let limit = filter.limit.to_string();

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                (column, condition.as_str()),
                ("select", SELECT_COLUMNS),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{} {} answered {}", LOG_PREFIX, filter, status);
            return Ok(Vec::new());
        }

        let records: Vec<ProfileRecord> = response.json().await?;
        log::debug!("{} {} -> {} records", LOG_PREFIX, filter, records.len());
        Ok(records)
    }
}

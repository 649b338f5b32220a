use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use url::Url;

use crate::cache::ResolutionCache;
use crate::config::AvatarConfig;
use crate::handle::Handle;
use crate::store::USER_AGENT_VALUE;
use crate::{HeroError, Result};

const LOG_PREFIX: &str = "[avatar]";

/// Lower bound of the per-source soft timeout.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarSource {
    Cache,
    Remote,
    LocalFallback,
}

/// Outcome of avatar resolution. `url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarResolution {
    pub url: String,
    pub source: AvatarSource,
    pub timed_out: bool,
}

/// Fetches an image resource; success means it was retrieved and decodes.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<()>;
}

pub struct HttpImageLoader {
    client: reqwest::Client,
}

impl HttpImageLoader {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HeroError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        // Decoding blocks; off the runtime workers an expired timeout can
        // still drop the wait.
        tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(drop)
        })
        .await
        .map_err(anyhow::Error::from)??;
        Ok(())
    }
}

/// Ordered image endpoints; each candidate is a base URL with the handle
/// appended as a percent-encoded path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarSources {
    bases: Vec<Url>,
}

impl AvatarSources {
    pub fn new(bases: Vec<Url>) -> Self {
        Self { bases }
    }

    pub fn candidates(&self, handle: &Handle) -> Vec<String> {
        self.bases
            .iter()
            .filter_map(|base| {
                let mut url = base.clone();
                match url.path_segments_mut() {
                    Ok(mut segments) => {
                        segments.pop_if_empty().push(handle.as_str());
                    }
                    Err(_) => {
                        log::warn!("{} skipping opaque source {}", LOG_PREFIX, base);
                        return None;
                    }
                }
                Some(url.to_string())
            })
            .collect()
    }
}

/// Resolves a displayable avatar for a handle: cache, then each remote
/// source in order under a soft timeout, then the local fallback.
pub struct AvatarResolver {
    loader: Arc<dyn ImageLoader>,
    cache: Arc<ResolutionCache>,
    sources: AvatarSources,
    fallback: String,
}

impl AvatarResolver {
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        cache: Arc<ResolutionCache>,
        sources: AvatarSources,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            cache,
            sources,
            fallback: fallback.into(),
        }
    }

    /// Resolver over HTTP image sources as configured.
    pub fn from_config(
        config: &AvatarConfig,
        cache: Arc<ResolutionCache>,
    ) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpImageLoader::new()?),
            cache,
            AvatarSources::new(config.sources.clone()),
            config.fallback.clone(),
        ))
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Optimistic first-paint URL: the first remote candidate, unverified.
    pub fn initial_avatar_url(&self, handle: &Handle) -> String {
        if handle.is_empty() {
            return self.fallback.clone();
        }
        self.sources
            .candidates(handle)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub async fn resolve_avatar(
        &self,
        handle: &Handle,
        timeout: Duration,
    ) -> AvatarResolution {
        if handle.is_empty() {
            return AvatarResolution {
                url: self.fallback.clone(),
                source: AvatarSource::LocalFallback,
                timed_out: false,
            };
        }

        if let Some(url) = self.cache.get(handle) {
            return AvatarResolution {
                url,
                source: AvatarSource::Cache,
                timed_out: false,
            };
        }

        let timeout = timeout.max(MIN_TIMEOUT);
        for url in self.sources.candidates(handle) {
            // On expiry the load future is dropped, so a late success can
            // never reach the cache or the caller.
            match tokio::time::timeout(timeout, self.loader.load(&url)).await {
                Ok(Ok(())) => {
                    log::info!("{} {} resolved to {}", LOG_PREFIX, handle, url);
                    self.cache.set(handle.clone(), url.clone());
                    return AvatarResolution {
                        url,
                        source: AvatarSource::Remote,
                        timed_out: false,
                    };
                }
                Ok(Err(e)) => {
                    log::debug!("{} {} failed: {}", LOG_PREFIX, url, e);
                }
                Err(_) => {
                    log::debug!(
                        "{} {} timed out after {:?}",
                        LOG_PREFIX,
                        url,
                        timeout
                    );
                }
            }
        }

        log::info!(
            "{} every source failed for {}, using {}",
            LOG_PREFIX,
            handle,
            self.fallback
        );
        self.cache.set(handle.clone(), self.fallback.clone());
        AvatarResolution {
            url: self.fallback.clone(),
            source: AvatarSource::LocalFallback,
            timed_out: true,
        }
    }
}

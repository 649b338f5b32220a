use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::avatar::{AvatarResolution, AvatarResolver};
use crate::cache::ResolutionCache;
use crate::card::{self, Team};
use crate::config::{AvatarMode, Config};
use crate::handle::{normalize, Handle};
use crate::lookup::{LookupResult, ProfileLookup};
use crate::profile::ProfileRecord;
use crate::Result;

const LOG_PREFIX: &str = "[resolve]";

/// A profile that can be rendered as a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroCard {
    pub profile: ProfileRecord,
    pub resolved_handle: Handle,
    pub avatar_url: String,
    pub is_team: bool,
}

impl HeroCard {
    pub fn description(&self) -> String {
        card::hero_description(&self.resolved_handle, self.is_team)
    }

    pub fn badge(&self) -> String {
        card::badge(self.is_team, self.profile.wave.as_ref())
    }

    pub fn rarity_class(&self) -> String {
        card::rarity_class(self.profile.rarity.as_deref())
    }

    pub fn tagline(&self) -> String {
        card::tagline(self.is_team, self.profile.rarity.as_deref())
    }

    pub fn personal_link(&self, origin: &Url) -> String {
        card::personal_link(origin, &self.resolved_handle)
    }
}

/// The only terminal states a caller has to handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Resolution {
    /// Input was empty after normalization; nothing was looked up.
    NoInput,
    /// No profile, or a profile without an avatar; carries the requested
    /// handle.
    NotFound { handle: Handle },
    Found(HeroCard),
}

/// Facade over normalization, profile lookup and avatar resolution.
pub struct HeroResolver {
    lookup: ProfileLookup,
    avatars: AvatarResolver,
    mode: AvatarMode,
    avatar_timeout: Duration,
    team: Team,
}

impl HeroResolver {
    pub fn new(
        lookup: ProfileLookup,
        avatars: AvatarResolver,
        mode: AvatarMode,
        avatar_timeout: Duration,
        team: Team,
    ) -> Self {
        Self {
            lookup,
            avatars,
            mode,
            avatar_timeout,
            team,
        }
    }

    pub fn from_config(
        config: &Config,
        cache: Arc<ResolutionCache>,
    ) -> Result<Self> {
        Ok(Self::new(
            ProfileLookup::from_config(&config.store)?,
            AvatarResolver::from_config(&config.avatar, cache)?,
            config.avatar.mode,
            config.avatar.timeout(),
            Team::new(&config.card.team),
        ))
    }

    pub fn avatars(&self) -> &AvatarResolver {
        &self.avatars
    }

    pub async fn resolve(&self, raw: &str) -> Resolution {
        let handle = normalize(raw);
        if handle.is_empty() {
            log::debug!("{} empty input {:?}", LOG_PREFIX, raw);
            return Resolution::NoInput;
        }

        let LookupResult {
            profile,
            resolved_handle,
        } = self.lookup.lookup(&handle).await;

        let Some(profile) = profile else {
            log::info!("{} no profile for {}", LOG_PREFIX, handle);
            return Resolution::NotFound { handle };
        };
        let resolved_handle = resolved_handle.unwrap_or_else(|| handle.clone());

        let Some(avatar_url) = self.avatar_for(&profile, &resolved_handle).await
        else {
            log::info!(
                "{} {} matched {} but has no avatar",
                LOG_PREFIX,
                handle,
                resolved_handle
            );
            return Resolution::NotFound { handle };
        };

        let is_team = self.team.contains(&resolved_handle);
        log::info!(
            "{} {} resolved to {} (team: {})",
            LOG_PREFIX,
            handle,
            resolved_handle,
            is_team
        );
        Resolution::Found(HeroCard {
            profile,
            resolved_handle,
            avatar_url,
            is_team,
        })
    }

    async fn avatar_for(
        &self,
        profile: &ProfileRecord,
        handle: &Handle,
    ) -> Option<String> {
        match self.mode {
            AvatarMode::Profile => profile.avatar_ref(),
            AvatarMode::ProfileThenSources => match profile.avatar_ref() {
                Some(url) => Some(url),
                None => Some(self.resolve_avatar(handle).await.url),
            },
            AvatarMode::Sources => Some(self.resolve_avatar(handle).await.url),
        }
    }

    /// Avatar only, with the configured soft timeout.
    pub async fn resolve_avatar(&self, handle: &Handle) -> AvatarResolution {
        self.avatars
            .resolve_avatar(handle, self.avatar_timeout)
            .await
    }

    pub fn initial_avatar_url(&self, handle: &Handle) -> String {
        self.avatars.initial_avatar_url(handle)
    }
}

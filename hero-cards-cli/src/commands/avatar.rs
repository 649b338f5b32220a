use std::sync::Arc;
use std::time::Duration;

use hero_cards::{normalize, AvatarResolver, Config, ResolutionCache};

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "avatar", about = "Resolve a renderable avatar for a handle")]
pub struct Avatar {
    #[clap(help = "Handle whose avatar to resolve")]
    handle: String,
    #[clap(long, help = "Per-source timeout in milliseconds")]
    timeout_ms: Option<u64>,
    #[clap(long, action, help = "Print the resolution as JSON")]
    json: bool,
}

impl Avatar {
    pub async fn run(&self, config: &Config) -> Result<(), AppError> {
        let resolver = AvatarResolver::from_config(
            &config.avatar,
            Arc::new(ResolutionCache::new()),
        )?;
        let timeout = self
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.avatar.timeout());

        let resolution = resolver
            .resolve_avatar(&normalize(&self.handle), timeout)
            .await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        } else {
            println!("{}", resolution.url);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Args)]
#[clap(
    name = "initial-avatar",
    about = "Print the avatar URL to show before resolution completes"
)]
pub struct InitialAvatar {
    #[clap(help = "Handle whose avatar to guess")]
    handle: String,
}

impl InitialAvatar {
    pub fn run(&self, config: &Config) -> Result<(), AppError> {
        let resolver = AvatarResolver::from_config(
            &config.avatar,
            Arc::new(ResolutionCache::new()),
        )?;
        println!("{}", resolver.initial_avatar_url(&normalize(&self.handle)));
        Ok(())
    }
}

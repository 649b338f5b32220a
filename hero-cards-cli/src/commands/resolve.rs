use std::sync::Arc;

use hero_cards::card::not_found_message;
use hero_cards::{
    normalize, Config, HeroCard, HeroResolver, Resolution, ResolutionCache,
};
use url::Url;

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "resolve", about = "Resolve a handle to a hero card")]
pub struct Resolve {
    #[clap(help = "Handle to look up, with or without the leading @")]
    handle: String,
    #[clap(long, action, help = "Print the resolution as JSON")]
    json: bool,
}

impl Resolve {
    /// Configuration is only loaded once there is something to look up.
    pub async fn run<F>(&self, config: F) -> Result<(), AppError>
    where
        F: FnOnce() -> Result<Config, AppError>,
    {
        if normalize(&self.handle).is_empty() {
            return Err(AppError::NoInput);
        }

        let config = config()?;
        let origin = Url::parse(&config.card.origin).map_err(|e| {
            AppError::InvalidOrigin(config.card.origin.clone(), e)
        })?;
        let resolver =
            HeroResolver::from_config(&config, Arc::new(ResolutionCache::new()))?;

        let resolution = resolver.resolve(&self.handle).await;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            return Ok(());
        }

        match resolution {
            Resolution::NoInput => return Err(AppError::NoInput),
            Resolution::NotFound { handle } => {
                println!("{}", not_found_message(&handle))
            }
            Resolution::Found(card) => print_card(&card, &origin),
        }
        Ok(())
    }
}

fn print_card(card: &HeroCard, origin: &Url) {
    let name = card
        .profile
        .display_name
        .as_deref()
        .unwrap_or(card.resolved_handle.as_str());

    println!("{} (@{})", name, card.resolved_handle);
    println!("{} | {}", card.badge(), card.rarity_class());
    if let Some(title) = &card.profile.title {
        println!("Title:  {}", title);
    }
    if let Some(level) = &card.profile.level {
        println!("Level:  {}", level);
    }
    println!("Avatar: {}", card.avatar_url);
    println!("Link:   {}", card.personal_link(origin));
    println!();
    println!("{}", card.tagline());
    println!("{}", card.description());
}

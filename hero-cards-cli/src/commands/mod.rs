use std::path::Path;

use clap::Subcommand;
use hero_cards::Config;

use crate::AppError;

mod avatar;
mod normalize;
mod resolve;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Resolve(resolve::Resolve),
    Avatar(avatar::Avatar),
    InitialAvatar(avatar::InitialAvatar),
    Normalize(normalize::Normalize),
}

impl Commands {
    pub async fn run(&self, config: Option<&Path>) -> Result<(), AppError> {
        match self {
            Commands::Normalize(normalize) => normalize.run(),
            Commands::Resolve(resolve) => {
                resolve.run(|| load_config(config)).await
            }
            Commands::Avatar(avatar) => avatar.run(&load_config(config)?).await,
            Commands::InitialAvatar(initial) => {
                initial.run(&load_config(config)?)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    let config = Config::load(path)
        .map_err(|e| AppError::ConfigLoadError(e.to_string()))?;
    log::debug!("using store {:?}", config.store.url.as_ref().map(|u| u.as_str()));
    Ok(config)
}

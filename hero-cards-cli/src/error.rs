use hero_cards::HeroError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Enter a handle, e.g. `hero-cards resolve @alice`")]
    NoInput,

    #[error("Couldn't load configuration: {0}")]
    ConfigLoadError(String),

    #[error("Invalid card origin {0}: {1}")]
    InvalidOrigin(String, url::ParseError),

    #[error("Couldn't render JSON: {0}")]
    OutputError(#[from] serde_json::Error),

    #[error(transparent)]
    HeroError(#[from] HeroError),
}

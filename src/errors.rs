use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeroError>;

#[derive(Error, Debug)]
pub enum HeroError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Parsing error")]
    Parse,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for HeroError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<toml::de::Error> for HeroError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

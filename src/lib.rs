//! Resolution of social-network handles to hero cards.
//!
//! A handle is normalized, looked up in a profile store through a cascade
//! of increasingly fuzzy queries, and paired with an avatar that is always
//! renderable: the one stored with the profile, or one resolved from
//! handle-derived image sources under a soft timeout with a local fallback.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hero_cards::{Config, HeroResolver, Resolution, ResolutionCache};
//!
//! # async fn demo() -> hero_cards::Result<()> {
//! let config = Config::load(None)?;
//! let resolver =
//!     HeroResolver::from_config(&config, Arc::new(ResolutionCache::new()))?;
//! match resolver.resolve(" @Alice ").await {
//!     Resolution::Found(card) => println!("{}", card.avatar_url),
//!     Resolution::NotFound { handle } => println!("@{handle} not found"),
//!     Resolution::NoInput => println!("enter a handle"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod avatar;
pub mod cache;
pub mod card;
pub mod config;
mod errors;
pub mod handle;
pub mod lookup;
pub mod profile;
pub mod resolve;
pub mod store;

pub use avatar::{
    AvatarResolution, AvatarResolver, AvatarSource, AvatarSources,
    HttpImageLoader, ImageLoader,
};
pub use cache::ResolutionCache;
pub use config::{AvatarMode, Config};
pub use errors::{HeroError, Result};
pub use handle::{normalize, Handle};
pub use lookup::{LookupResult, ProfileLookup};
pub use profile::{EmbeddedPayload, ProfileRecord};
pub use resolve::{HeroCard, HeroResolver, Resolution};
pub use store::{ProfileStore, QueryFilter, RestProfileStore};

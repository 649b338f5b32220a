use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hero_cards::card::Team;
use hero_cards::store::Comparison;
use hero_cards::{
    normalize, AvatarMode, AvatarResolver, AvatarSource, AvatarSources,
    Config, HeroCard, HeroError, HeroResolver, ImageLoader, ProfileLookup,
    ProfileRecord, ProfileStore, QueryFilter, Resolution, ResolutionCache,
    Result,
};
use serde_json::json;

/// In-memory table evaluating filters the way PostgREST does.
struct MemoryStore {
    rows: Vec<ProfileRecord>,
    calls: AtomicUsize,
}

impl MemoryStore {
    fn new(rows: Vec<ProfileRecord>) -> Arc<Self> {
        Arc::new(Self {
            rows,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn query(&self, filter: &QueryFilter) -> Result<Vec<ProfileRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let needle = filter.value.to_lowercase();
        let (column, _) = filter.to_param();

        Ok(self
            .rows
            .iter()
            .filter(|row| {
                let value = match column {
                    "username" => row.username.as_deref(),
                    _ => row.display_name.as_deref(),
                };
                let Some(value) = value else { return false };
                match filter.comparison {
                    Comparison::Equals => value == filter.value,
                    Comparison::ILike => value.to_lowercase() == needle,
                    Comparison::IContains => {
                        value.to_lowercase().contains(&needle)
                    }
                }
            })
            .take(filter.limit)
            .cloned()
            .collect())
    }
}

/// Image loader whose sources all succeed or all fail immediately.
struct InstantLoader {
    ok: bool,
    calls: AtomicUsize,
}

impl InstantLoader {
    fn new(ok: bool) -> Arc<Self> {
        Arc::new(Self {
            ok,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageLoader for InstantLoader {
    async fn load(&self, _url: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.ok {
            Ok(())
        } else {
            Err(HeroError::Status(500))
        }
    }
}

fn row(username: &str, display_name: &str, pfp: Option<&str>) -> ProfileRecord {
    ProfileRecord {
        username: Some(username.to_owned()),
        display_name: Some(display_name.to_owned()),
        pfp: pfp.map(str::to_owned),
        ..Default::default()
    }
}

fn resolver(
    store: &Arc<MemoryStore>,
    loader: &Arc<InstantLoader>,
    mode: AvatarMode,
) -> HeroResolver {
    let config = Config::default();
    HeroResolver::new(
        ProfileLookup::new(store.clone(), config.store.page_size),
        AvatarResolver::new(
            loader.clone(),
            Arc::new(ResolutionCache::new()),
            AvatarSources::new(config.avatar.sources.clone()),
            config.avatar.fallback.clone(),
        ),
        mode,
        Duration::from_millis(650),
        Team::new(&config.card.team),
    )
}

fn expect_found(resolution: Resolution) -> HeroCard {
    match resolution {
        Resolution::Found(card) => card,
        other => panic!("expected a card, got {:?}", other),
    }
}

#[tokio::test]
async fn resolves_padded_handle_with_stored_avatar() {
    let store = MemoryStore::new(vec![row("alice", "Alice", Some("https://img/a.png"))]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    let card = expect_found(resolver.resolve(" @Alice ").await);

    assert_eq!(card.resolved_handle, normalize("alice"));
    assert_eq!(card.avatar_url, "https://img/a.png");
    assert!(!card.is_team);
    assert_eq!(store.calls(), 1);
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn unknown_handle_is_not_found() {
    let store = MemoryStore::new(vec![row("alice", "Alice", Some("https://img/a.png"))]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    let resolution = resolver.resolve("bob").await;

    assert_eq!(
        resolution,
        Resolution::NotFound {
            handle: normalize("bob")
        }
    );
    assert_eq!(store.calls(), 4);
}

#[tokio::test]
async fn empty_input_makes_no_calls() {
    let store = MemoryStore::new(vec![row("alice", "Alice", Some("https://img/a.png"))]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Sources);

    assert_eq!(resolver.resolve("").await, Resolution::NoInput);
    assert_eq!(resolver.resolve("  @ ").await, Resolution::NoInput);
    assert_eq!(store.calls(), 0);
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn found_without_avatar_is_not_found() {
    let store = MemoryStore::new(vec![row("carol", "Carol", None)]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    assert_eq!(
        resolver.resolve("@carol").await,
        Resolution::NotFound {
            handle: normalize("carol")
        }
    );
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn not_found_echoes_requested_handle_not_matched_one() {
    let store = MemoryStore::new(vec![row("carol_x", "Carol", None)]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    assert_eq!(
        resolver.resolve("Carol").await,
        Resolution::NotFound {
            handle: normalize("carol")
        }
    );
}

#[tokio::test]
async fn embedded_avatar_is_used() {
    let mut dave = row("dave", "Dave", None);
    dave.json_input = Some(json!("{\"pfp\": \"https://img/d.png\"}"));
    let store = MemoryStore::new(vec![dave]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    let card = expect_found(resolver.resolve("dave").await);

    assert_eq!(card.avatar_url, "https://img/d.png");
}

#[tokio::test]
async fn display_name_match_resolves_to_username() {
    let store = MemoryStore::new(vec![
        row("erin_on_x", "Erin", Some("https://img/e.png")),
        row("erin_two", "Erin Two", Some("https://img/e2.png")),
    ]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    let card = expect_found(resolver.resolve("ERIN").await);

    assert_eq!(card.resolved_handle, normalize("erin_on_x"));
    assert_eq!(card.avatar_url, "https://img/e.png");
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn profile_then_sources_falls_back_to_remote_avatar() {
    let store = MemoryStore::new(vec![row("frank", "Frank", None)]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::ProfileThenSources);

    let card = expect_found(resolver.resolve("frank").await);

    assert_eq!(card.avatar_url, "https://unavatar.io/x/frank");
    assert_eq!(loader.calls(), 1);

    let avatar = resolver.resolve_avatar(&normalize("frank")).await;
    assert_eq!(avatar.source, AvatarSource::Cache);
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn sources_mode_never_fails_to_render() {
    let store = MemoryStore::new(vec![row("gina", "Gina", Some("https://img/g.png"))]);
    let loader = InstantLoader::new(false);
    let resolver = resolver(&store, &loader, AvatarMode::Sources);

    let card = expect_found(resolver.resolve("gina").await);

    assert_eq!(card.avatar_url, "/pfp.png");
    assert_eq!(loader.calls(), 3);
}

#[tokio::test]
async fn team_members_get_the_team_card() {
    let store = MemoryStore::new(vec![row("CorCoder", "Cor", Some("https://img/c.png"))]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    let card = expect_found(resolver.resolve("corcoder").await);

    assert!(card.is_team);
    assert_eq!(card.badge(), "Union Team");
    assert_eq!(card.tagline(), "Union core contributor.");
}

#[tokio::test]
async fn initial_avatar_needs_no_network() {
    let store = MemoryStore::new(Vec::new());
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    assert_eq!(
        resolver.initial_avatar_url(&normalize("@Henry")),
        "https://unavatar.io/x/henry"
    );
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn resolution_serializes_with_outcome_tag() {
    let store = MemoryStore::new(vec![row("ivy", "Ivy", Some("https://img/i.png"))]);
    let loader = InstantLoader::new(true);
    let resolver = resolver(&store, &loader, AvatarMode::Profile);

    let found = serde_json::to_value(resolver.resolve("ivy").await).unwrap();
    assert_eq!(found["outcome"], "found");
    assert_eq!(found["resolved_handle"], "ivy");
    assert_eq!(found["avatar_url"], "https://img/i.png");

    let missing = serde_json::to_value(resolver.resolve("nobody").await).unwrap();
    assert_eq!(missing, json!({"outcome": "not-found", "handle": "nobody"}));

    let empty = serde_json::to_value(resolver.resolve("").await).unwrap();
    assert_eq!(empty, json!({"outcome": "no-input"}));
}

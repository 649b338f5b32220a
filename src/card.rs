//! Card copy and links rendered around a resolved profile.

use std::collections::HashSet;

use url::Url;

use crate::handle::{normalize, Handle};
use crate::profile::non_empty;

const DEFAULT_RARITY: &str = "common";

/// Handles that receive the golden team card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    members: HashSet<Handle>,
}

impl Team {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            members: members
                .into_iter()
                .map(|m| normalize(m.as_ref()))
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, handle: &Handle) -> bool {
        self.members.contains(handle)
    }
}

pub fn hero_description(handle: &Handle, is_team: bool) -> String {
    if is_team {
        format!(
            "Welcome back, @{handle}. \
             You are not just a Hero — you are the backbone of Union. \
             This golden card marks your place in the team shaping the future. \
             Lead, innovate, and keep building forward."
        )
    } else {
        format!(
            "Congrats, @{handle} — you are a chosen Union Hero. \
             Your contributions help shape the Union community. \
             Every tweet, every action, every transaction matters. \
             This card is your proof of participation in the movement."
        )
    }
}

/// Lowercased rarity tier, `"common"` when the record has none.
pub fn rarity_class(rarity: Option<&str>) -> String {
    rarity
        .map(str::trim)
        .and_then(non_empty)
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_RARITY.to_owned())
}

pub fn badge(is_team: bool, wave: Option<&serde_json::Number>) -> String {
    match (is_team, wave) {
        (true, _) => "Union Team".to_owned(),
        (false, Some(wave)) if wave.as_f64() != Some(0.0) => {
            format!("Wave {wave}")
        }
        (false, _) => "Union".to_owned(),
    }
}

pub fn tagline(is_team: bool, rarity: Option<&str>) -> String {
    if is_team {
        return "Union core contributor.".to_owned();
    }
    let class = rarity_class(rarity);
    let mut chars = class.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{capitalized} on the allowlist.")
}

/// Shareable link to a card, `{origin}/?handle={handle}`.
pub fn personal_link(origin: &Url, handle: &Handle) -> String {
    let mut link = origin.clone();
    link.set_path("/");
    link.set_fragment(None);
    link.query_pairs_mut()
        .clear()
        .append_pair("handle", handle.as_str());
    link.to_string()
}

pub fn not_found_message(handle: &Handle) -> String {
    format!("@{handle} — not on the list (yet)")
}

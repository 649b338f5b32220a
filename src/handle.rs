use std::fmt;

use serde::{Deserialize, Serialize};

/// A canonical handle, the only key used for lookups and caching.
///
/// The sole way to obtain one is [`normalize`], so any `Handle` in
/// circulation is already trimmed, lowercased and free of a leading `@`.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The empty handle means that no lookup is possible.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}

/// Canonicalize free-text input into a comparable handle.
///
/// Whitespace is trimmed, the text is lowercased and the leading `@` is
/// removed. A prefix like `"@ @x"` collapses completely, which keeps the
/// function idempotent for every input.
pub fn normalize(input: &str) -> Handle {
    let lowered = input.to_lowercase();
    let stripped = lowered
        .trim_start_matches(|c: char| c == '@' || c.is_whitespace())
        .trim_end();
    Handle(stripped.to_owned())
}

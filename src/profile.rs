use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

const LOG_PREFIX: &str = "[profile]";

/// Field of the embedded payload that carries an avatar reference.
const EMBEDDED_AVATAR_FIELD: &str = "pfp";

/// One entry of the profile store.
///
/// Descriptive fields are passed through untouched; only `pfp` and
/// `json_input` are interpreted, when extracting an avatar.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Top-level avatar reference.
    #[serde(default)]
    pub pfp: Option<String>,
    /// Structured payload, stored either as JSON text or as an object.
    #[serde(default, rename = "jsonInput")]
    pub json_input: Option<Value>,
    #[serde(default)]
    pub level: Option<Number>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub wave: Option<Number>,
}

/// What the embedded payload of a record turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedPayload {
    NoEmbedded,
    Parsed { avatar_ref: Option<String> },
    Unparseable,
}

impl EmbeddedPayload {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => EmbeddedPayload::NoEmbedded,
            Some(Value::String(text)) => {
                match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(map)) => EmbeddedPayload::Parsed {
                        avatar_ref: avatar_field(&map),
                    },
                    Ok(_) | Err(_) => EmbeddedPayload::Unparseable,
                }
            }
            Some(Value::Object(map)) => EmbeddedPayload::Parsed {
                avatar_ref: avatar_field(map),
            },
            Some(_) => EmbeddedPayload::Unparseable,
        }
    }

    pub fn avatar_ref(&self) -> Option<&str> {
        match self {
            EmbeddedPayload::Parsed { avatar_ref } => avatar_ref.as_deref(),
            EmbeddedPayload::NoEmbedded | EmbeddedPayload::Unparseable => None,
        }
    }
}

fn avatar_field(map: &serde_json::Map<String, Value>) -> Option<String> {
    map.get(EMBEDDED_AVATAR_FIELD)
        .and_then(Value::as_str)
        .and_then(non_empty)
        .map(str::to_owned)
}

pub(crate) fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl ProfileRecord {
    pub fn embedded(&self) -> EmbeddedPayload {
        EmbeddedPayload::from_value(self.json_input.as_ref())
    }

    /// Avatar reference of the record: the top-level `pfp`, else the one
    /// inside the embedded payload. Malformed payloads count as absent.
    pub fn avatar_ref(&self) -> Option<String> {
        if let Some(pfp) = self.pfp.as_deref().and_then(non_empty) {
            return Some(pfp.to_owned());
        }

        let embedded = self.embedded();
        if embedded == EmbeddedPayload::Unparseable {
            log::debug!(
                "{} ignoring unparseable embedded payload of {:?}",
                LOG_PREFIX,
                self.username
            );
        }
        embedded.avatar_ref().map(str::to_owned)
    }

    /// Username, else display name; empty strings count as absent.
    pub fn canonical_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .and_then(non_empty)
            .or_else(|| self.display_name.as_deref().and_then(non_empty))
    }
}

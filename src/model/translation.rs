use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::EngineError;

const PREFIX: &str = "translation_";

static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^translation_(?P<row>[0-9]+)$").expect("translation id pattern is valid")
});

/// Row index of a translation. Written as `translation_{row}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TranslationId(pub usize);

impl TranslationId {
    pub fn row(self) -> usize {
        self.0
    }
}

impl fmt::Display for TranslationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for TranslationId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::MalformedTranslationId { raw: s.to_string() };

        let caps = ID_RE.captures(s).ok_or_else(malformed)?;
        caps["row"]
            .parse::<usize>()
            .map(TranslationId)
            .map_err(|_| malformed())
    }
}

impl Serialize for TranslationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TranslationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One cell-level remapping inside a dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub id: TranslationId,
    pub column_id: String,
    /// Ordinal of the owning dictionary, unique among live dictionaries.
    pub dictionary_id: usize,
    pub from: Value,
    pub to: Value,
}

/// Entries of one column, ordered by row.
pub type Dictionary = BTreeMap<TranslationId, TranslationEntry>;

/// All dictionaries keyed by column id.
pub type Dictionaries = BTreeMap<String, Dictionary>;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A match-v5 match document. Only the fields the exporter reads are typed;
/// participants stay as raw objects and are read through [`Participant`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchDocument {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchMetadata {
    #[serde(deserialize_with = "lenient_string")]
    pub match_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub game_version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub game_mode: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub game_name: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub game_duration: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub game_start_timestamp: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_of_game_result: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub participants: Vec<Value>,
}

// Scalars of the wrong JSON type read as absent instead of failing the
// whole document.
fn lenient_string<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value.as_str().map(str::to_string))
}

fn lenient_int<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<i64>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(json_int(&value))
}

fn lenient_list<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Vec<Value>, D::Error> {
    match Value::deserialize(de)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

impl MatchDocument {
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).context("invalid match json")
    }

    /// "15.22.715.5130" -> "15.22". Shorter strings are returned untouched.
    pub fn catalog_version(&self) -> String {
        let full = self.info.game_version.as_deref().unwrap_or_default();
        catalog_version(full)
    }

    /// First participant whose `puuid` equals `puuid`.
    pub fn participant(&self, puuid: &str) -> Option<Participant<'_>> {
        self.info
            .participants
            .iter()
            .filter_map(Value::as_object)
            .map(Participant)
            .find(|p| p.str_field("puuid") == Some(puuid))
    }
}

pub fn catalog_version(full: &str) -> String {
    full.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// Borrowed view over one participant object with absent-tolerant accessors.
#[derive(Debug, Clone, Copy)]
pub struct Participant<'a>(&'a Map<String, Value>);

impl<'a> Participant<'a> {
    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.str_field(key).map(str::to_string)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        json_int(self.0.get(key)?)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key)?.as_bool()
    }

    pub fn challenge_int(&self, key: &str) -> Option<i64> {
        json_int(self.challenges()?.get(key)?)
    }

    pub fn challenge_float(&self, key: &str) -> Option<f64> {
        self.challenges()?.get(key)?.as_f64()
    }

    /// Item id held in `item{slot}`, or `None` for an empty slot.
    pub fn item_slot(&self, slot: usize) -> Option<String> {
        let value = self.0.get(&format!("item{slot}"))?;
        let id = match value {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64))?.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return None,
        };
        if id.is_empty() || id == "0" {
            return None;
        }
        Some(id)
    }

    fn challenges(&self) -> Option<&'a Map<String, Value>> {
        self.0.get("challenges")?.as_object()
    }
}

fn json_int(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().and_then(|n| i64::try_from(n).ok()))
        .or_else(|| value.as_f64().map(|f| f as i64))
}

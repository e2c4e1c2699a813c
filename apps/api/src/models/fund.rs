use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown when a fund does not state an amount.
pub const AMOUNT_FALLBACK: &str = "N/A";

/// A funding opportunity from the static catalog.
///
/// Catalog files are hand-curated, so every text field is lenient: a missing or
/// `null` value becomes the empty string and numbers are kept as their text.
/// Fields the service does not use are preserved in `extra` and echoed back to
/// clients. The embedding is read but never serialized into responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fund {
    #[serde(default, deserialize_with = "lenient_text")]
    pub fund_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub organization: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_type_and_topic: Option<Support>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub link: Option<String>,
    #[serde(default, skip_serializing)]
    pub embedding: Vec<f32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Fund {
    /// The amount cell text: the stated amount, or `N/A` when absent or blank.
    pub fn amount_text(&self) -> &str {
        self.amount
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(AMOUNT_FALLBACK)
    }

    /// The outbound link, if the catalog gives a non-blank one.
    pub fn link_url(&self) -> Option<&str> {
        self.link.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn support_text(&self) -> String {
        self.support_type_and_topic
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// The `support_type_and_topic` field, which catalog authors write in several shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Support {
    Scalar(String),
    List(Vec<Support>),
    Entry(SupportEntry),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for SupportEntry {
    /// `type — topic`, dropping whichever half is blank. An entry with neither
    /// half falls back to its JSON text so the cell is never silently empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [self.kind.as_deref(), self.topic.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
            f.write_str(&json)
        } else {
            f.write_str(&parts.join(" — "))
        }
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Support::Scalar(text) => f.write_str(text),
            Support::Entry(entry) => fmt::Display::fmt(entry, f),
            Support::List(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(ToString::to_string)
                    .filter(|s| !s.is_empty())
                    .collect();
                f.write_str(&rendered.join("; "))
            }
            Support::Other(Value::Null) => Ok(()),
            Support::Other(Value::String(text)) => f.write_str(text),
            Support::Other(other) => write!(f, "{other}"),
        }
    }
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(text_of)
        .unwrap_or_default())
}

fn lenient_opt_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(text_of))
}

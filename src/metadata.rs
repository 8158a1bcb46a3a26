use serde::Serialize;
use serde_json::Value;

/// Normalized metadata returned for every fetched url.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Metadata {
  pub title: Option<String>,
  pub uploader: Option<String>,
  pub upload_date: Option<String>,
  pub duration: Option<Duration>,
}

/// Durations are passed through in whatever shape the source reports:
/// ISO 8601 from the video api, seconds from yt-dlp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Duration {
  Iso8601(String),
  Seconds(serde_json::Number),
}

impl Duration {
  pub fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Number(n) => Some(Duration::Seconds(n.clone())),
      Value::String(s) => Some(Duration::Iso8601(s.clone())),
      _ => None,
    }
  }
}

// strings are taken as-is, numbers are stringified (yt-dlp sometimes
// reports numeric ids), anything else counts as absent.
pub fn string_value(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

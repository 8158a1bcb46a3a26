mod ytdlp;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{Error, Result};

pub use ytdlp::Ytdlp;

/// The raw info document a generic extractor reports for one url.
pub type InfoDict = Map<String, Value>;

#[async_trait]
pub trait MediaExtractor: Send + Sync {
  async fn extract(&self, url: &str) -> Result<InfoDict>;
}

// playlist-shaped results only contribute their first entry, the rest
// are dropped.
pub fn first_entry(mut info: InfoDict) -> Result<InfoDict> {
  let Some(entries) = info.remove("entries") else {
    return Ok(info);
  };

  match entries {
    Value::Array(entries) => match entries.into_iter().next() {
      Some(Value::Object(entry)) => Ok(entry),
      Some(_) => Err(Error::Extraction("malformed playlist entry".into())),
      None => Err(Error::Extraction("playlist has no entries".into())),
    },
    _ => Err(Error::Extraction("malformed playlist entries".into())),
  }
}

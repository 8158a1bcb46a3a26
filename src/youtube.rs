use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
  metadata::{Duration, Metadata},
  Error, Result,
};

const DATA_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

pub const VIDEO_PARTS: &str = "status,snippet,contentDetails";

static LIVESTREAM_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("^/live/([a-zA-Z0-9_-]+)").unwrap());

static SHORTENED_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("^/([a-zA-Z0-9_-]+)").unwrap());

#[async_trait]
pub trait VideoLookup: Send + Sync {
  async fn list_videos(&self, id: &str, parts: &str) -> Result<VideoList>;
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoList {
  #[serde(default)]
  pub items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
  #[serde(default)]
  pub snippet: Snippet,
  #[serde(default)]
  pub content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
  pub title: Option<String>,
  pub channel_title: Option<String>,
  pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentDetails {
  pub duration: Option<String>,
}

impl From<VideoItem> for Metadata {
  fn from(item: VideoItem) -> Self {
    Self {
      title: item.snippet.title,
      uploader: item.snippet.channel_title,
      upload_date: item.snippet.published_at,
      duration: item.content_details.duration.map(Duration::Iso8601),
    }
  }
}

/// YouTube Data API v3 client authenticated by a single api key.
pub struct DataApi {
  client: reqwest::Client,
  api_key: String,
}

impl DataApi {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_key: api_key.into(),
    }
  }
}

#[derive(Deserialize)]
struct ApiErrorBody {
  error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
  message: String,
}

#[async_trait]
impl VideoLookup for DataApi {
  async fn list_videos(&self, id: &str, parts: &str) -> Result<VideoList> {
    let resp = self
      .client
      .get(DATA_API_ENDPOINT)
      .query(&[("part", parts), ("id", id), ("key", self.api_key.as_str())])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
      return Err(Error::VideoApi { status, message });
    }

    Ok(resp.json::<VideoList>().await?)
  }
}

/// Pull the video id out of the known url shapes:
///
/// - `/watch?v=<id>`
/// - `/live/<id>`
/// - `/<id>` (youtu.be short links)
///
/// `/watch` without a non-empty `v` parameter is an error. Paths matching
/// none of the shapes give `None`.
pub fn extract_video_id(url: &Url) -> Result<Option<String>> {
  let path = url.path();

  if path == "/watch" {
    let id = url
      .query_pairs()
      .find(|(k, v)| k == "v" && !v.is_empty())
      .map(|(_, v)| v.into_owned())
      .ok_or_else(|| Error::MissingVideoId(url.to_string()))?;
    return Ok(Some(id));
  }

  let captured = LIVESTREAM_REGEX
    .captures(path)
    .or_else(|| SHORTENED_REGEX.captures(path))
    .map(|caps| caps[1].to_string());

  Ok(captured)
}

pub async fn fetch_youtube(
  api: &dyn VideoLookup,
  url: &Url,
) -> Result<Option<Metadata>> {
  // an unrecognized path still goes to the api, which finds nothing
  let video_id = extract_video_id(url)?.unwrap_or_default();
  debug!("looking up video {:?}", video_id);

  let list = api.list_videos(&video_id, VIDEO_PARTS).await?;
  Ok(list.items.into_iter().next().map(Into::into))
}

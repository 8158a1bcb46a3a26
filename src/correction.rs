//! Per-site fixes for fields yt-dlp reports wrong or not at all.
//!
//! Each site maps output fields to a [`Correction`] which is applied to
//! the raw info document after extraction. When yt-dlp fixes one of
//! these upstream the matching arm should be updated.

use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{extractor::InfoDict, metadata::string_value, Error, Result};

pub type Transform = fn(&InfoDict) -> Value;

#[derive(Clone, Copy)]
pub enum Correction {
  /// The field is wrong and has no substitute.
  Null,
  /// The right value lives under another field.
  Alias(&'static str),
  /// The value is computed from the whole document.
  Transform(Transform),
}

#[derive(Default)]
pub struct Preprocessed {
  /// Set when the extractor must be given a different url.
  pub url: Option<Url>,
  pub corrections: Vec<(&'static str, Correction)>,
}

// hosts that are only another name for a site handled below
const SITE_ALIASES: [(&str, &str); 1] = [("x", "https://twitter.com")];

const HOST_PREFIXES: [&str; 3] = ["www", "m", "mobile"];

pub fn preprocess(url: &Url) -> Result<Preprocessed> {
  match resolve_alias(url)? {
    Some(rewritten) => {
      let mut pre = site_corrections(&rewritten);
      pre.url = Some(rewritten);
      Ok(pre)
    }
    None => Ok(site_corrections(url)),
  }
}

// one hop at most: an alias pointing at another alias is refused
fn resolve_alias(url: &Url) -> Result<Option<Url>> {
  let Some(base) = alias_target(url) else {
    return Ok(None);
  };

  let rewritten = format!("{}{}", base, url.path());
  let rewritten = Url::parse(&rewritten)
    .map_err(|e| Error::InvalidUrl(rewritten.clone(), e))?;

  if alias_target(&rewritten).is_some() {
    return Err(Error::AliasCycle(url.to_string()));
  }

  Ok(Some(rewritten))
}

fn alias_target(url: &Url) -> Option<&'static str> {
  let site = site_key(url)?;
  SITE_ALIASES
    .iter()
    .find(|(alias, _)| *alias == site)
    .map(|(_, base)| *base)
}

/// First label of the host, ignoring `www.`-style prefixes.
pub fn site_key(url: &Url) -> Option<&str> {
  let host = url.host_str()?;
  let mut labels = host.split('.').peekable();
  let mut label = labels.next()?;

  while HOST_PREFIXES.contains(&label) && labels.peek().is_some() {
    label = labels.next()?;
  }

  Some(label)
}

fn site_corrections(url: &Url) -> Preprocessed {
  let mut corrections = Vec::new();

  match site_key(url) {
    Some("twitter") => {
      corrections.push(("channel", Correction::Alias("uploader_id")));
      corrections.push(("title", Correction::Transform(twitter_title)));

      // yt-dlp only gets the duration right for the first video of a
      // multi-video post
      if multi_video_index(url).is_some_and(|index| index != 1) {
        corrections.push(("duration", Correction::Null));
      }
    }
    Some("newgrounds") | Some("bilibili") => {
      corrections.push(("channel", Correction::Alias("uploader")));
    }
    Some("tiktok") => {
      corrections.push(("channel", Correction::Alias("uploader")));
      corrections.push(("title", Correction::Transform(tiktok_title)));
    }
    _ => (),
  }

  Preprocessed {
    url: None,
    corrections,
  }
}

// `.../video/<index>`
fn multi_video_index(url: &Url) -> Option<u64> {
  let mut segments = url.path_segments()?.rev();
  let index = segments.next()?;
  match segments.next() {
    Some("video") => index.parse().ok(),
    _ => None,
  }
}

// these sites have no real title, so one is made up from the uploader
// and a hash of whatever text yt-dlp found.
fn twitter_title(info: &InfoDict) -> Value {
  synthesize_title("X post", "uploader_id", info)
}

fn tiktok_title(info: &InfoDict) -> Value {
  synthesize_title("Tiktok video", "uploader", info)
}

fn synthesize_title(kind: &str, uploader_key: &str, info: &InfoDict) -> Value {
  let uploader = info
    .get(uploader_key)
    .and_then(string_value)
    .unwrap_or_else(|| "unknown".to_string());
  let title = info
    .get("title")
    .and_then(string_value)
    .unwrap_or_default();

  Value::String(format!("{kind} by {uploader} ({})", short_hash(&title)))
}

/// First 5 hex digits of the sha256 of `s`.
pub fn short_hash(s: &str) -> String {
  let digest = Sha256::digest(s.as_bytes());
  let mut hex = hex::encode(digest);
  hex.truncate(5);
  hex
}

pub fn apply(corrections: &[(&'static str, Correction)], info: &mut InfoDict) {
  for (field, correction) in corrections {
    let value = match correction {
      Correction::Null => Value::Null,
      Correction::Alias(source) => {
        info.get(*source).cloned().unwrap_or(Value::Null)
      }
      Correction::Transform(f) => f(info),
    };
    info.insert(field.to_string(), value);
  }
}

#[cfg(test)]
mod tests {
  use once_cell::sync::Lazy;
  use regex::Regex;
  use serde_json::json;

  use super::*;

  static TWITTER_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^X post by \S+ \([0-9a-f]{5}\)$").unwrap());

  fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
  }

  fn dict(value: Value) -> InfoDict {
    match value {
      Value::Object(map) => map,
      _ => panic!("not an object"),
    }
  }

  fn fields(pre: &Preprocessed) -> Vec<&str> {
    pre.corrections.iter().map(|(f, _)| *f).collect()
  }

  #[test]
  fn test_short_hash() {
    // sha256("hello") = 2cf24dba...
    assert_eq!(short_hash("hello"), "2cf24");
    assert_eq!(short_hash("hello"), short_hash("hello"));

    for s in ["a", "some longer title", "日本語"] {
      let h = short_hash(s);
      assert_eq!(h.len(), 5);
      assert!(h.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }
  }

  #[test]
  fn test_site_key() {
    assert_eq!(site_key(&url("https://twitter.com/a")), Some("twitter"));
    assert_eq!(site_key(&url("https://www.tiktok.com/@a")), Some("tiktok"));
    assert_eq!(site_key(&url("https://m.bilibili.com/v")), Some("bilibili"));
    assert_eq!(site_key(&url("https://x.com/a")), Some("x"));
    assert_eq!(site_key(&url("https://www/a")), Some("www"));
  }

  #[test]
  fn test_unknown_site_has_no_corrections() {
    let pre = preprocess(&url("https://odysee.com/@a:d/b:0")).unwrap();
    assert!(pre.url.is_none());
    assert!(pre.corrections.is_empty());
  }

  #[test]
  fn test_x_rewrites_to_twitter() {
    let pre = preprocess(&url("https://x.com/someone/status/1?s=20")).unwrap();

    assert_eq!(
      pre.url.as_ref().map(Url::as_str),
      Some("https://twitter.com/someone/status/1")
    );
    assert_eq!(fields(&pre), vec!["channel", "title"]);
  }

  #[test]
  fn test_twitter_multi_video_drops_duration() {
    let second =
      preprocess(&url("https://twitter.com/a/status/1/video/2")).unwrap();
    assert_eq!(fields(&second), vec!["channel", "title", "duration"]);

    let first =
      preprocess(&url("https://twitter.com/a/status/1/video/1")).unwrap();
    assert_eq!(fields(&first), vec!["channel", "title"]);

    let aliased = preprocess(&url("https://x.com/a/status/1/video/3")).unwrap();
    assert_eq!(fields(&aliased), vec!["channel", "title", "duration"]);
  }

  #[test]
  fn test_apply_twitter_corrections() {
    let pre = preprocess(&url("https://twitter.com/a/status/1/video/2")).unwrap();
    let mut info = dict(json!({
      "title": "doubleW - look at this",
      "uploader": "Double W",
      "uploader_id": "doubleWbrothers",
      "channel": null,
      "duration": 41.2,
    }));

    apply(&pre.corrections, &mut info);

    assert_eq!(info["channel"], json!("doubleWbrothers"));
    assert_eq!(info["duration"], Value::Null);
    let title = info["title"].as_str().unwrap();
    assert!(TWITTER_TITLE.is_match(title), "{title}");
    assert_eq!(
      title,
      format!(
        "X post by doubleWbrothers ({})",
        short_hash("doubleW - look at this")
      )
    );
  }

  #[test]
  fn test_apply_tiktok_corrections() {
    let pre = preprocess(&url("https://www.tiktok.com/@k/video/7338")).unwrap();
    let mut info = dict(json!({"title": "#pony", "uploader": "k"}));

    apply(&pre.corrections, &mut info);

    assert_eq!(info["channel"], json!("k"));
    assert_eq!(
      info["title"],
      json!(format!("Tiktok video by k ({})", short_hash("#pony")))
    );
  }

  #[test]
  fn test_alias_to_missing_field_is_null() {
    let pre = preprocess(&url("https://www.newgrounds.com/portal/view/1"))
      .unwrap();
    let mut info = dict(json!({"channel": "wrong"}));

    apply(&pre.corrections, &mut info);

    assert_eq!(info["channel"], Value::Null);
  }
}

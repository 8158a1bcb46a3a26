use std::{env, net::SocketAddr, str::FromStr};

use crate::{fetch::BatchMode, Error, Result};

const API_KEY_VARS: [&str; 2] = ["apikey", "YOUTUBE_API_KEY"];

#[derive(Debug, Clone)]
pub struct Config {
  pub api_key: String,
  pub listen_addr: SocketAddr,
  pub ytdlp_path: String,
  pub ytdlp_proxy: Option<String>,
  pub ytdlp_concurrency: usize,
  pub batch_mode: BatchMode,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let api_key = API_KEY_VARS
      .iter()
      .find_map(|key| get(*key).filter(|v| !v.is_empty()))
      .ok_or_else(|| Error::Config("apikey is not set".into()))?;

    let fail_fast: bool = parse_or(&get, "FETCH_FAIL_FAST", false)?;
    let batch_mode = if fail_fast {
      BatchMode::FailFast
    } else {
      BatchMode::Isolate
    };

    Ok(Self {
      api_key,
      listen_addr: parse_or(&get, "LISTEN_ADDR", ([0, 0, 0, 0], 8080).into())?,
      ytdlp_path: get("YTDLP_PATH").unwrap_or_else(|| "yt-dlp".into()),
      ytdlp_proxy: get("YTDLP_PROXY").filter(|v| !v.is_empty()),
      ytdlp_concurrency: parse_or(&get, "YTDLP_CONCURRENCY", 1)?,
      batch_mode,
    })
  }
}

fn parse_or<T: FromStr>(
  get: &impl Fn(&str) -> Option<String>,
  key: &str,
  default: T,
) -> Result<T> {
  match get(key) {
    None => Ok(default),
    Some(raw) => raw
      .parse()
      .map_err(|_| Error::Config(format!("{key} has invalid value {raw:?}"))),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn config(vars: &[(&str, &str)]) -> Result<Config> {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
  }

  #[test]
  fn test_defaults() {
    let config = config(&[("apikey", "k")]).unwrap();

    assert_eq!(config.api_key, "k");
    assert_eq!(config.listen_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(config.ytdlp_path, "yt-dlp");
    assert_eq!(config.ytdlp_proxy, None);
    assert_eq!(config.ytdlp_concurrency, 1);
    assert_eq!(config.batch_mode, BatchMode::Isolate);
  }

  #[test]
  fn test_overrides() {
    let config = config(&[
      ("YOUTUBE_API_KEY", "k2"),
      ("LISTEN_ADDR", "127.0.0.1:3000"),
      ("YTDLP_CONCURRENCY", "4"),
      ("FETCH_FAIL_FAST", "true"),
    ])
    .unwrap();

    assert_eq!(config.api_key, "k2");
    assert_eq!(config.listen_addr.port(), 3000);
    assert_eq!(config.ytdlp_concurrency, 4);
    assert_eq!(config.batch_mode, BatchMode::FailFast);
  }

  #[test]
  fn test_missing_key() {
    assert!(matches!(config(&[]), Err(Error::Config(_))));
    assert!(matches!(config(&[("apikey", "")]), Err(Error::Config(_))));
  }

  #[test]
  fn test_bad_value() {
    let err = config(&[("apikey", "k"), ("YTDLP_CONCURRENCY", "many")])
      .unwrap_err();
    assert!(err.to_string().contains("YTDLP_CONCURRENCY"));
  }
}

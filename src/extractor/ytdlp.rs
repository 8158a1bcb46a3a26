use std::{process::Stdio, sync::Arc};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::{process::Command, sync::Semaphore};
use tracing::debug;

use crate::{Error, Result};

use super::{first_entry, InfoDict, MediaExtractor};

/// yt-dlp backends allowed to handle a url. `generic` is the catch-all.
pub const ALLOWED_EXTRACTORS: [&str; 9] = [
  "twitter",
  "Newgrounds",
  "lbry",
  "TikTok",
  "PeerTube",
  "vimeo",
  "BiliBili",
  "dailymotion",
  "generic",
];

// used to remove cred info from proxy url before printing
static AUTH_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"//[^:/]+(:[^@]+)?@").unwrap());

// run yt-dlp command line to dump the info document of a url.
// requires yt-dlp executable to be in PATH, or YTDLP_PATH.
pub struct Ytdlp {
  program: String,
  proxy: Option<String>,
  // limits the number of yt-dlp processes at a time
  permits: Arc<Semaphore>,
}

impl Ytdlp {
  pub fn new(
    program: impl Into<String>,
    proxy: Option<String>,
    concurrency: usize,
  ) -> Self {
    Self {
      program: program.into(),
      proxy,
      permits: Arc::new(Semaphore::new(concurrency.max(1))),
    }
  }

  fn command(&self, url: &str) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd
      // emit the output as a single json object instead of jsonl
      .arg("--dump-single-json")
      .arg("--no-warnings")
      .arg("--use-extractors")
      .arg(ALLOWED_EXTRACTORS.join(","));

    if let Some(proxy) = &self.proxy {
      debug!("using proxy: {}", redact_proxy(proxy));
      cmd.arg("--proxy").arg(proxy);
    }

    cmd
      .arg("--")
      .arg(url)
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    cmd
  }
}

#[async_trait]
impl MediaExtractor for Ytdlp {
  async fn extract(&self, url: &str) -> Result<InfoDict> {
    let mut cmd = self.command(url);
    debug!("running yt-dlp for {}", url);

    let guard = self
      .permits
      .acquire()
      .await
      .map_err(|e| Error::Extraction(e.to_string()))?;
    let output = cmd.output().await?;
    drop(guard);

    detect_error(&output.stderr)?;
    if !output.status.success() {
      return Err(Error::Extraction(format!(
        "yt-dlp exited with {}",
        output.status
      )));
    }

    let info: InfoDict = serde_json::from_slice(&output.stdout)
      .map_err(|e| Error::Extraction(format!("bad yt-dlp output: {e}")))?;

    first_entry(info)
  }
}

fn redact_proxy(proxy: &str) -> String {
  AUTH_REGEX.replace(proxy, "//<REDACTED>@").into_owned()
}

fn detect_error(bytes: &[u8]) -> Result<()> {
  let s = String::from_utf8_lossy(bytes);
  match s.lines().find(|line| line.starts_with("ERROR:")) {
    Some(line) => Err(Error::Extraction(line.to_string())),
    None => Ok(()),
  }
}

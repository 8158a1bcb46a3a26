pub const YOUTUBE_DOMAINS: [&str; 4] =
  ["m.youtube.com", "www.youtube.com", "youtube.com", "youtu.be"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  /// Looked up through the YouTube Data API.
  VideoPlatform,
  /// Handed to yt-dlp.
  Generic,
}

impl Route {
  // exact, case-sensitive match on the authority as written. url parsing
  // would lowercase the host and drop a default port, so the raw input is
  // used instead.
  pub fn classify(url: &str) -> Self {
    match authority(url) {
      Some(host) if YOUTUBE_DOMAINS.contains(&host) => Route::VideoPlatform,
      _ => Route::Generic,
    }
  }
}

// text between `://` and the first `/`, `?` or `#`
fn authority(url: &str) -> Option<&str> {
  let (_, rest) = url.split_once("://")?;
  let end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());
  Some(&rest[..end])
}

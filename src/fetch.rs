use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  correction::{self, preprocess},
  extractor::{InfoDict, MediaExtractor},
  metadata::{string_value, Duration, Metadata},
  route::Route,
  youtube::{fetch_youtube, VideoLookup},
  Error, Result,
};

/// What a failing url does to the rest of its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
  /// The url gets `null` and the batch carries on.
  #[default]
  Isolate,
  /// The whole batch fails with the first error.
  FailFast,
}

pub struct Fetcher {
  videos: Box<dyn VideoLookup>,
  extractor: Box<dyn MediaExtractor>,
  mode: BatchMode,
}

impl Fetcher {
  pub fn new(
    videos: impl VideoLookup + 'static,
    extractor: impl MediaExtractor + 'static,
    mode: BatchMode,
  ) -> Self {
    Self {
      videos: Box::new(videos),
      extractor: Box::new(extractor),
      mode,
    }
  }

  // one url at a time, in input order
  pub async fn fetch_batch(
    &self,
    urls: &[String],
  ) -> Result<Vec<Option<Metadata>>> {
    info!("fetching {} urls", urls.len());
    let mut results = Vec::with_capacity(urls.len());

    for (index, url) in urls.iter().enumerate() {
      match self.fetch_one(url).await {
        Ok(meta) => results.push(meta),
        Err(e) if self.mode == BatchMode::Isolate => {
          warn!("failed to fetch {}: {}", url, e);
          results.push(None);
        }
        Err(e) => {
          return Err(Error::Batch {
            index,
            url: url.clone(),
            source: Box::new(e),
          })
        }
      }
    }

    Ok(results)
  }

  /// `Ok(None)` means the video api knows no such video.
  pub async fn fetch_one(&self, url: &str) -> Result<Option<Metadata>> {
    let parsed =
      Url::parse(url).map_err(|e| Error::InvalidUrl(url.to_string(), e))?;

    let route = Route::classify(url);
    debug!("fetching {} via {:?}", url, route);

    match route {
      Route::VideoPlatform => fetch_youtube(&*self.videos, &parsed).await,
      Route::Generic => self.fetch_generic(&parsed).await.map(Some),
    }
  }

  async fn fetch_generic(&self, url: &Url) -> Result<Metadata> {
    let pre = preprocess(url)?;
    let target = pre.url.as_ref().unwrap_or(url);

    let mut info = self.extractor.extract(target.as_str()).await?;
    correction::apply(&pre.corrections, &mut info);

    Ok(shape(&info))
  }
}

fn shape(info: &InfoDict) -> Metadata {
  Metadata {
    title: info.get("title").and_then(string_value),
    uploader: info.get("channel").and_then(string_value),
    upload_date: info.get("upload_date").and_then(string_value),
    duration: info.get("duration").and_then(Duration::from_value),
  }
}

pub async fn fetch_urls(
  State(fetcher): State<Arc<Fetcher>>,
  Json(urls): Json<Vec<String>>,
) -> Result<Json<Vec<Option<Metadata>>>> {
  let results = fetcher.fetch_batch(&urls).await?;
  Ok(Json(results))
}

use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use hyper::body::Bytes;
use tracing::{info, warn};

use crate::util::{Error, Result};

const USER_AGENT: &str = concat!("redoc-portal/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct FetchedResource {
  pub content_type: String,
  pub bytes: Bytes,
}

/// Retrieves remote resources for a portal build.
#[async_trait]
pub trait Fetch: Send + Sync {
  async fn fetch(&self, url: &str) -> Result<FetchedResource>;
}

pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client })
  }
}

#[async_trait]
impl Fetch for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<FetchedResource> {
    let wrap = |source| Error::Fetch {
      url: url.to_string(),
      source,
    };

    let res = self.client.get(url).send().await.map_err(wrap)?;
    let status = res.status();
    if !status.is_success() {
      return Err(Error::Status {
        url: url.to_string(),
        status,
      });
    }

    let content_type = res
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string)
      .unwrap_or_else(|| guess_content_type(url));
    let bytes = res.bytes().await.map_err(wrap)?;

    Ok(FetchedResource {
      content_type,
      bytes,
    })
  }
}

// falls back on the file extension of the url path
fn guess_content_type(url: &str) -> String {
  let path = url.split(['?', '#']).next().unwrap_or(url);
  mime_guess::from_path(path)
    .first_or_octet_stream()
    .essence_str()
    .to_string()
}

/// Logs every round trip of the wrapped fetcher.
pub struct LoggingFetcher<F> {
  inner: F,
}

impl<F> LoggingFetcher<F> {
  pub fn new(inner: F) -> Self {
    Self { inner }
  }
}

#[async_trait]
impl<F: Fetch> Fetch for LoggingFetcher<F> {
  async fn fetch(&self, url: &str) -> Result<FetchedResource> {
    info!("GET {}", url);
    let t = Instant::now();
    let result = self.inner.fetch(url).await;
    match &result {
      Ok(res) => info!(
        "GET {} -> {} ({} bytes, spent {:?})",
        url,
        res.content_type,
        res.bytes.len(),
        t.elapsed()
      ),
      Err(e) => warn!("GET {} failed (spent {:?}): {}", url, t.elapsed(), e),
    }
    result
  }
}


#[cfg(test)]
mod tests {
  use super::{testing::StaticFetcher, *};

  #[test]
  fn guesses_from_url_path() {
    assert_eq!(
      guess_content_type("https://fonts.gstatic.com/s/roboto/v30/a.ttf"),
      "font/ttf"
    );
    assert_eq!(
      guess_content_type("https://example.com/spec.json?v=2"),
      "application/json"
    );
    assert_eq!(
      guess_content_type("https://example.com/blob"),
      "application/octet-stream"
    );
  }

  #[test]
  fn client_errors_name_no_url() {
    assert!(HttpFetcher::new(Duration::from_secs(5)).is_ok());

    let source = reqwest::Client::new().get("not a url").build().unwrap_err();
    let message = Error::Client(source).to_string();
    assert!(message.starts_with("http client error: "), "{message}");
  }

  #[tokio::test]
  async fn logging_passes_results_through() {
    let fetcher = LoggingFetcher::new(
      StaticFetcher::default().with("https://a/x.js", "text/javascript", "x"),
    );

    let res = fetcher.fetch("https://a/x.js").await.unwrap();
    assert_eq!(res.content_type, "text/javascript");
    assert_eq!(res.bytes, Bytes::from_static(b"x"));

    let err = fetcher.fetch("https://a/missing").await.unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status == 404));
  }
}

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("fetch {url} failed: {source}")]
  Fetch {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("fetch {url} failed: unexpected status {status}")]
  Status { url: String, status: http::StatusCode },

  #[error("template error: {0}")]
  Template(#[from] handlebars::TemplateError),

  #[error("render error: {0}")]
  Render(#[from] handlebars::RenderError),

  #[error("template is not valid utf-8: {0}")]
  TemplateEncoding(#[from] std::str::Utf8Error),

  #[error("invalid font css: {0}")]
  FontFace(String),

  #[error("invalid route path `{0}`")]
  InvalidPath(String),

  #[error("http client error: {0}")]
  Client(#[source] reqwest::Error),

  #[error("missing bundled asset: {0}")]
  MissingAsset(&'static str),

  #[error("hyper error: {0}")]
  Hyper(#[from] hyper::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Joins url path segments, collapsing duplicate slashes. The result always
/// starts with `/`.
pub fn join_path(prefix: &str, name: &str) -> String {
  let mut out = String::with_capacity(prefix.len() + name.len() + 1);
  let segments = prefix.split('/').chain(name.split('/'));
  for segment in segments.filter(|s| !s.is_empty()) {
    out.push('/');
    out.push_str(segment);
  }
  if out.is_empty() {
    out.push('/');
  }
  out
}

/// Normalizes a user supplied route path, rejecting segments the router
/// would read as parameters.
pub fn route_path(path: &str) -> Result<String> {
  let path = join_path("", path);
  check_route_path(&path)?;
  Ok(path)
}

/// Paths must be absolute and free of `:param` or `*wildcard` segments.
pub fn check_route_path(path: &str) -> Result<()> {
  let literal = path
    .split('/')
    .all(|segment| !segment.starts_with([':', '*']));
  if path.starts_with('/') && literal {
    Ok(())
  } else {
    Err(Error::InvalidPath(path.to_string()))
  }
}

/// Leading hex characters of the sha-256 digest of `bytes`, used to name
/// content-addressed assets.
pub fn short_digest(bytes: &[u8]) -> String {
  let mut digest = hex::encode(Sha256::digest(bytes));
  digest.truncate(7);
  digest
}

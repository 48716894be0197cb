use axum::{
  http::{header::CONTENT_TYPE, HeaderValue},
  response::{IntoResponse, Response},
};
use hyper::body::Bytes;
use tracing::warn;

use crate::routes::Route;

const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Fixed response for one registered path.
#[derive(Clone)]
pub struct StaticResponse {
  content_type: HeaderValue,
  body: Bytes,
}

impl StaticResponse {
  pub fn new(path: &str, route: &Route) -> Self {
    let content_type = route
      .content_type
      .clone()
      .unwrap_or_else(|| default_content_type(path));
    let content_type = HeaderValue::from_str(&content_type).unwrap_or_else(|_| {
      warn!("invalid content type {:?} for {}", content_type, path);
      HeaderValue::from_static("application/octet-stream")
    });

    Self {
      content_type,
      body: route.body.clone(),
    }
  }
}

impl IntoResponse for StaticResponse {
  fn into_response(self) -> Response {
    ([(CONTENT_TYPE, self.content_type)], self.body).into_response()
  }
}

// Routes registered without a content type are guessed from their path, and
// extensionless paths are pages.
fn default_content_type(path: &str) -> String {
  mime_guess::from_path(path)
    .first()
    .map(|mime| mime.to_string())
    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

use std::collections::BTreeMap;

use hyper::body::Bytes;

/// A fixed response served for every request to one exact path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
  /// `None` leaves the content type to the serving default.
  pub content_type: Option<String>,
  pub body: Bytes,
}

impl Route {
  pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
    Self {
      content_type: Some(content_type.into()),
      body: body.into(),
    }
  }

  pub fn untyped(body: impl Into<Bytes>) -> Self {
    Self {
      content_type: None,
      body: body.into(),
    }
  }
}

/// Path to route mapping produced by a portal build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
  routes: BTreeMap<String, Route>,
}

impl RouteTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `route` at `path`, replacing any earlier registration.
  pub fn register(&mut self, path: impl Into<String>, route: Route) {
    self.routes.insert(path.into(), route);
  }

  pub fn get(&self, path: &str) -> Option<&Route> {
    self.routes.get(path)
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
    self.routes.iter().map(|(path, route)| (path.as_str(), route))
  }
}

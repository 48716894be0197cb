mod handler;

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tracing::{debug, info, warn};

use crate::{
  routes::RouteTable,
  util::{check_route_path, Result},
};

pub struct Server {
  bind_addr: SocketAddr,
  routes: RouteTable,
}

impl Server {
  pub fn new(bind_addr: SocketAddr, routes: RouteTable) -> Self {
    Self { bind_addr, routes }
  }

  pub async fn run(self) -> Result<()> {
    if self.routes.is_empty() {
      warn!("no routes registered");
    }
    let router = self.router()?;

    info!("listening on http://{}", self.bind_addr);
    axum::Server::bind(&self.bind_addr)
      .serve(router.into_make_service())
      .with_graceful_shutdown(shutdown_signal())
      .await?;

    Ok(())
  }

  fn router(&self) -> Result<Router> {
    let mut router = Router::new();
    for (path, route) in self.routes.iter() {
      check_route_path(path)?;
      debug!("route {}", path);
      let response = handler::StaticResponse::new(path, route);
      router = router.route(path, get(move || async move { response }));
    }
    Ok(router)
  }
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    info!("shutting down");
  }
}

#[cfg(test)]
mod tests {
  use axum::body::Body;
  use http::{header::CONTENT_TYPE, Request, StatusCode};
  use tower::ServiceExt;

  use super::*;
  use crate::{routes::Route, util::Error};

  fn server() -> Server {
    let mut routes = RouteTable::new();
    routes.register("/_/abc1234.js", Route::new("text/javascript", "SCRIPT"));
    routes.register("/v1/swagger.json", Route::new("application/json", "{}"));
    routes.register("/", Route::untyped("<html></html>"));
    Server::new(SocketAddr::from(([127, 0, 0, 1], 0)), routes)
  }

  async fn get_path(path: &str) -> http::Response<axum::body::BoxBody> {
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    server().router().unwrap().oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn serves_registered_bytes() {
    let res = get_path("/_/abc1234.js").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/javascript");

    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    assert_eq!(&body[..], b"SCRIPT");
  }

  #[tokio::test]
  async fn untyped_index_uses_serving_default() {
    let res = get_path("/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
  }

  #[test]
  fn relative_or_parameter_paths_are_errors() {
    for path in ["docs", "/docs/:page", "/_/*rest"] {
      let mut routes = RouteTable::new();
      routes.register(path, Route::untyped("x"));
      let server = Server::new(SocketAddr::from(([127, 0, 0, 1], 0)), routes);

      let err = server.router().unwrap_err();
      assert!(matches!(err, Error::InvalidPath(p) if p == path));
    }
  }

  #[tokio::test]
  async fn unknown_path_is_not_found() {
    let res = get_path("/_/missing.js").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }
}

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use tracing::info;

use crate::{
  config::{PortalConfig, DEFAULT_FAMILY, DEFAULT_PREFIX, DEFAULT_VERSION},
  fetch::{Fetch, HttpFetcher, LoggingFetcher},
  portal,
  routes::Route,
  server::Server,
  util::{route_path, Result},
};

const DEFAULT_SPEC_CONTENT_TYPE: &str = "application/json";

#[derive(Parser)]
/// serve a ReDoc documentation portal for an OpenAPI document
pub struct Cli {
  /// enable verbose logging
  #[arg(short, long, env = "REDOC_VERBOSE")]
  pub verbose: bool,

  /// listen address
  #[arg(short('l'), long, env = "REDOC_LISTEN", default_value = "0.0.0.0:9090")]
  listen: SocketAddr,

  /// upstream OpenAPI document url
  #[arg(
    long,
    env = "REDOC_URL",
    default_value = "https://petstore.swagger.io/v2/swagger.json"
  )]
  url: String,

  /// path the OpenAPI document is served at
  #[arg(long, env = "REDOC_SPEC", default_value = "/v1/swagger.json")]
  spec: String,

  /// path the documentation page is served at
  #[arg(long, env = "REDOC_INDEX", default_value = "/")]
  index: String,

  /// page title
  #[arg(long, env = "REDOC_TITLE")]
  title: Option<String>,

  /// redoc script version
  #[arg(long, env = "REDOC_VERSION", default_value = DEFAULT_VERSION)]
  redoc_version: String,

  /// Google Fonts family specification
  #[arg(long, env = "REDOC_FAMILY", default_value = DEFAULT_FAMILY)]
  family: String,

  /// path prefix for scripts, stylesheets and fonts
  #[arg(long, env = "REDOC_PREFIX", default_value = DEFAULT_PREFIX)]
  prefix: String,

  /// page template replacing the bundled one
  #[arg(long, env = "REDOC_TEMPLATE")]
  template: Option<PathBuf>,

  /// upstream request timeout in seconds
  #[arg(long, env = "REDOC_TIMEOUT", default_value_t = 30)]
  timeout: u64,
}

impl Cli {
  pub async fn run(self) -> Result<()> {
    let config = self.portal_config().await?;
    let spec_path = config.spec_path.clone();
    let fetch = self.fetcher()?;

    // get the OpenAPI document
    let spec = fetch.fetch(&self.url).await?;
    info!("retrieved {} ({} bytes)", self.url, spec.bytes.len());

    let mut routes = portal::build(&config, &*fetch).await?;

    let content_type = if spec.content_type.is_empty() {
      DEFAULT_SPEC_CONTENT_TYPE.to_string()
    } else {
      spec.content_type
    };
    routes.register(spec_path, Route::new(content_type, spec.bytes));

    Server::new(self.listen, routes).run().await
  }

  fn fetcher(&self) -> Result<Box<dyn Fetch>> {
    let http = HttpFetcher::new(Duration::from_secs(self.timeout))?;
    if self.verbose {
      Ok(Box::new(LoggingFetcher::new(http)))
    } else {
      Ok(Box::new(http))
    }
  }

  async fn portal_config(&self) -> Result<PortalConfig> {
    let mut config =
      PortalConfig::new(route_path(&self.spec)?, route_path(&self.index)?)
        .with_version(self.redoc_version.clone())
        .with_family(self.family.clone())
        .with_prefix(route_path(&self.prefix)?);

    if let Some(title) = &self.title {
      config = config.with_title(title.clone());
    }
    if let Some(path) = &self.template {
      config = config.with_template(tokio::fs::read(path).await?);
    }

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let cli = Cli::try_parse_from(["redoc-portal"]).unwrap();
    assert_eq!(cli.listen, SocketAddr::from(([0, 0, 0, 0], 9090)));
    assert_eq!(cli.spec, "/v1/swagger.json");
    assert_eq!(cli.index, "/");
    assert_eq!(cli.prefix, "/_/");
    assert_eq!(cli.timeout, 30);
    assert!(!cli.verbose);
  }

  #[tokio::test]
  async fn flags_reach_portal_config() {
    let cli = Cli::try_parse_from([
      "redoc-portal",
      "-v",
      "-l",
      "127.0.0.1:8080",
      "--spec",
      "/openapi.yaml",
      "--title",
      "Petstore",
      "--redoc-version",
      "2.1.3",
      "--prefix",
      "/assets",
    ])
    .unwrap();
    assert!(cli.verbose);

    let config = cli.portal_config().await.unwrap();
    assert_eq!(config.spec_path, "/openapi.yaml");
    assert_eq!(config.asset_prefix, "/assets");
    assert_eq!(config.extra_params["title"], "Petstore");
    assert!(config.script_url().contains("redoc@2.1.3/"));
    assert!(config.template.is_none());
  }

  #[tokio::test]
  async fn relative_paths_are_normalized() {
    let cli = Cli::try_parse_from([
      "redoc-portal",
      "--index",
      "docs",
      "--spec",
      "docs//openapi.json",
      "--prefix",
      "assets/",
    ])
    .unwrap();

    let config = cli.portal_config().await.unwrap();
    assert_eq!(config.index_path, "/docs");
    assert_eq!(config.spec_path, "/docs/openapi.json");
    assert_eq!(config.asset_prefix, "/assets");
  }

  #[tokio::test]
  async fn parameter_paths_are_rejected() {
    for args in [["--index", "/docs/:page"], ["--spec", "/v1/*rest"]] {
      let cli = Cli::try_parse_from(
        std::iter::once("redoc-portal").chain(args.iter().copied()),
      )
      .unwrap();

      let err = cli.portal_config().await.unwrap_err();
      assert!(matches!(err, crate::util::Error::InvalidPath(_)));
    }
  }
}

use std::{borrow::Cow, collections::BTreeMap};

use serde_json::Value;

use crate::util::{Error, Result};

pub const DEFAULT_FAMILY: &str = "Montserrat:300,400,700|Roboto:300,400,700";
pub const DEFAULT_VERSION: &str = "next";
pub const DEFAULT_PREFIX: &str = "/_/";
const DEFAULT_TITLE: &str = "ReDoc";

#[derive(rust_embed::RustEmbed)]
#[folder = "static/"]
struct StaticAsset;

/// The bundled index page template.
pub fn default_template() -> Result<Cow<'static, [u8]>> {
  StaticAsset::get("index.html")
    .map(|file| file.data)
    .ok_or(Error::MissingAsset("index.html"))
}

/// Settings for one portal build.
#[derive(Clone, Debug)]
pub struct PortalConfig {
  pub spec_path: String,
  pub index_path: String,
  /// `None` selects the bundled template.
  pub template: Option<Vec<u8>>,
  pub font_family: String,
  pub script_version: String,
  pub asset_prefix: String,
  pub extra_params: BTreeMap<String, Value>,
}

impl PortalConfig {
  pub fn new(
    spec_path: impl Into<String>,
    index_path: impl Into<String>,
  ) -> Self {
    let mut extra_params = BTreeMap::new();
    extra_params.insert("title".to_string(), Value::from(DEFAULT_TITLE));

    Self {
      spec_path: spec_path.into(),
      index_path: index_path.into(),
      template: None,
      font_family: DEFAULT_FAMILY.into(),
      script_version: DEFAULT_VERSION.into(),
      asset_prefix: DEFAULT_PREFIX.into(),
      extra_params,
    }
  }

  pub fn with_template(mut self, template: impl Into<Vec<u8>>) -> Self {
    self.template = Some(template.into());
    self
  }

  /// Google Fonts family specification, e.g. `Roboto:300,400|Lato:700`.
  pub fn with_family(mut self, family: impl Into<String>) -> Self {
    self.font_family = family.into();
    self
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.script_version = version.into();
    self
  }

  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.asset_prefix = prefix.into();
    self
  }

  /// Adds a template parameter. `spec`, `script` and `stylesheet` are
  /// computed during the build and cannot be overridden.
  pub fn with_param(
    mut self,
    key: impl Into<String>,
    value: impl Into<Value>,
  ) -> Self {
    self.extra_params.insert(key.into(), value.into());
    self
  }

  pub fn with_title(self, title: impl Into<String>) -> Self {
    self.with_param("title", title.into())
  }

  pub fn script_url(&self) -> String {
    format!(
      "https://cdn.jsdelivr.net/npm/redoc@{}/bundles/redoc.standalone.js",
      self.script_version
    )
  }

  pub fn template(&self) -> Result<Cow<'_, [u8]>> {
    match &self.template {
      Some(template) => Ok(Cow::Borrowed(template.as_slice())),
      None => default_template(),
    }
  }
}

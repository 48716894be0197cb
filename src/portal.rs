use futures_util::future::try_join_all;
use handlebars::Handlebars;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
  config::PortalConfig,
  fetch::Fetch,
  fonts::{build_font_routes, FontSource, GoogleFonts},
  routes::{Route, RouteTable},
  util::{join_path, short_digest, Error, Result},
};

const TEMPLATE_NAME: &str = "index.html";
const RESERVED_PARAMS: [&str; 3] = ["spec", "script", "stylesheet"];

/// Builds the portal routes, resolving fonts through Google Fonts.
pub async fn build(
  config: &PortalConfig,
  fetch: &dyn Fetch,
) -> Result<RouteTable> {
  build_with(config, fetch, &GoogleFonts::default()).await
}

/// Fetches the script and fonts, renders the index page and returns every
/// route of the portal. The first error aborts the build.
pub async fn build_with(
  config: &PortalConfig,
  fetch: &dyn Fetch,
  fonts: &dyn FontSource,
) -> Result<RouteTable> {
  let mut routes = RouteTable::new();
  let prefix = config.asset_prefix.as_str();

  // retrieve script
  let script_url = config.script_url();
  let script = fetch.fetch(&script_url).await?;
  info!("retrieved {} ({} bytes)", script_url, script.bytes.len());

  // retrieve fonts and collect the stylesheet
  let stylesheet = fetch_fonts(&mut routes, config, fetch, fonts).await?;

  let script_path = derived_path(prefix, &script.bytes, "js");
  routes.register(
    script_path.clone(),
    Route::new("text/javascript", script.bytes),
  );

  let stylesheet_path = derived_path(prefix, &stylesheet, "css");
  routes.register(stylesheet_path.clone(), Route::new("text/css", stylesheet));

  // the index keeps the serving default content type
  let index = render_index(config, &script_path, &stylesheet_path)?;
  routes.register(config.index_path.clone(), Route::untyped(index));

  info!(
    "portal built: {} routes (script {}, stylesheet {})",
    routes.len(),
    script_path,
    stylesheet_path
  );
  Ok(routes)
}

/// `{prefix}/{digest}.{ext}` where digest is derived from `bytes`.
pub fn derived_path(prefix: &str, bytes: &[u8], ext: &str) -> String {
  join_path(prefix, &format!("{}.{}", short_digest(bytes), ext))
}

async fn fetch_fonts(
  routes: &mut RouteTable,
  config: &PortalConfig,
  fetch: &dyn Fetch,
  fonts: &dyn FontSource,
) -> Result<Vec<u8>> {
  let prefix = config.asset_prefix.as_str();
  let faces = fonts.font_faces(&config.font_family, fetch).await?;
  let families = build_font_routes(prefix, &faces);

  let pending = families
    .iter()
    .flat_map(|family| &family.routes)
    .map(|route| async move {
      let res = fetch.fetch(&route.url).await?;
      Ok::<_, Error>((join_path(prefix, &route.path), res))
    });
  for (path, res) in try_join_all(pending).await? {
    debug!("font {} ({})", path, res.content_type);
    routes.register(path, Route::new(res.content_type, res.bytes));
  }

  let mut stylesheet = vec![];
  for family in families {
    debug!("{}: {} font files", family.family, family.routes.len());
    stylesheet.extend_from_slice(&family.css);
  }
  Ok(stylesheet)
}

fn render_index(
  config: &PortalConfig,
  script_path: &str,
  stylesheet_path: &str,
) -> Result<Vec<u8>> {
  let template = config.template()?;
  let template = std::str::from_utf8(&template)?;

  let mut hb = Handlebars::new();
  hb.set_strict_mode(true);
  hb.register_template_string(TEMPLATE_NAME, template)?;

  let params = template_params(config, script_path, stylesheet_path);
  Ok(hb.render(TEMPLATE_NAME, &params)?.into_bytes())
}

fn template_params(
  config: &PortalConfig,
  script_path: &str,
  stylesheet_path: &str,
) -> Map<String, Value> {
  let mut params = Map::new();
  params.insert("spec".into(), config.spec_path.clone().into());
  params.insert("script".into(), script_path.into());
  params.insert("stylesheet".into(), stylesheet_path.into());

  for (key, value) in &config.extra_params {
    if RESERVED_PARAMS.contains(&key.as_str()) {
      debug!("ignoring reserved template param {}", key);
      continue;
    }
    params.insert(key.clone(), value.clone());
  }
  params
}

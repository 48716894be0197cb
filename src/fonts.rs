use async_trait::async_trait;
use futures_util::future::try_join_all;
use tracing::debug;

use crate::{
  fetch::Fetch,
  util::{join_path, short_digest, Error, Result},
};

mod css;

pub use css::{parse_font_faces, rewrite_urls};

const GOOGLE_FONTS_CSS: &str = "https://fonts.googleapis.com/css";

/// One downloadable font variant and its css declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
  pub family: String,
  pub style: String,
  pub weight: String,
  /// Remote font files referenced by `css`, in declaration order.
  pub src: Vec<String>,
  pub css: String,
}

/// A font file to serve locally. `path` is relative to the asset prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontRoute {
  pub path: String,
  pub url: String,
}

#[derive(Debug)]
pub struct FamilyRoutes {
  pub family: String,
  pub css: Vec<u8>,
  pub routes: Vec<FontRoute>,
}

/// Resolves a font-family specification into font faces.
#[async_trait]
pub trait FontSource: Send + Sync {
  async fn font_faces(
    &self,
    family: &str,
    fetch: &dyn Fetch,
  ) -> Result<Vec<FontFace>>;
}

/// Resolves `Family:300,400|Other` specifications against the Google Fonts
/// css endpoint.
pub struct GoogleFonts {
  base_url: String,
}

impl Default for GoogleFonts {
  fn default() -> Self {
    Self {
      base_url: GOOGLE_FONTS_CSS.into(),
    }
  }
}

impl GoogleFonts {
  fn family_url(&self, family: &str) -> String {
    format!("{}?family={}", self.base_url, family.replace(' ', "+"))
  }

  async fn family_faces(
    &self,
    family: &str,
    fetch: &dyn Fetch,
  ) -> Result<Vec<FontFace>> {
    let res = fetch.fetch(&self.family_url(family)).await?;
    let stylesheet = std::str::from_utf8(&res.bytes)
      .map_err(|e| Error::FontFace(format!("{family}: {e}")))?;
    let faces = parse_font_faces(stylesheet)?;
    for face in &faces {
      debug!("font face {} {} {}", face.family, face.style, face.weight);
    }
    Ok(faces)
  }
}

#[async_trait]
impl FontSource for GoogleFonts {
  async fn font_faces(
    &self,
    family: &str,
    fetch: &dyn Fetch,
  ) -> Result<Vec<FontFace>> {
    let families = family.split('|').map(str::trim).filter(|f| !f.is_empty());
    let faces = try_join_all(families.map(|f| self.family_faces(f, fetch)));
    Ok(faces.await?.into_iter().flatten().collect())
  }
}

/// Groups faces by family in first-seen order, rewriting each remote font
/// url in the css to its local path under `prefix`.
pub fn build_font_routes(
  prefix: &str,
  faces: &[FontFace],
) -> Vec<FamilyRoutes> {
  let mut families: Vec<FamilyRoutes> = vec![];

  for face in faces {
    let idx = match families.iter().position(|f| f.family == face.family) {
      Some(idx) => idx,
      None => {
        families.push(FamilyRoutes {
          family: face.family.clone(),
          css: vec![],
          routes: vec![],
        });
        families.len() - 1
      }
    };
    let entry = &mut families[idx];

    let mut local = Vec::with_capacity(face.src.len());
    for url in &face.src {
      let path = font_file_name(&face.family, url);
      local.push((url.as_str(), join_path(prefix, &path)));
      if !entry.routes.iter().any(|r| r.path == path) {
        entry.routes.push(FontRoute {
          path,
          url: url.clone(),
        });
      }
    }
    let css = rewrite_urls(&face.css, |url| {
      local
        .iter()
        .find(|(remote, _)| *remote == url)
        .map(|(_, path)| path.clone())
    });

    if !entry.css.is_empty() {
      entry.css.push(b'\n');
    }
    entry.css.extend_from_slice(css.as_bytes());
  }

  families
}

// e.g. `fira-sans-1a2b3c4.woff2`
fn font_file_name(family: &str, url: &str) -> String {
  let slug = family
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("-")
    .to_ascii_lowercase();

  let file = url
    .split(['?', '#'])
    .next()
    .and_then(|path| path.rsplit('/').next())
    .unwrap_or_default();
  let ext = match file.rsplit_once('.') {
    Some((_, ext))
      if !ext.is_empty()
        && ext.len() <= 5
        && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
    {
      ext.to_ascii_lowercase()
    }
    _ => "font".to_string(),
  };

  format!("{}-{}.{}", slug, short_digest(url.as_bytes()), ext)
}

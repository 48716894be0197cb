use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::FontFace;
use crate::util::{Error, Result};

static FONT_FACE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"@font-face\s*\{[^}]*\}").expect("font-face regex"));
static FAMILY: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"font-family:\s*['"]?([^;'"]+?)['"]?\s*(;|\})"#)
    .expect("font-family regex")
});
static STYLE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"font-style:\s*([A-Za-z-]+)").expect("font-style regex")
});
static WEIGHT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"font-weight:\s*(\d+)").expect("font-weight regex"));
static SRC_URL: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).expect("url regex")
});

/// Splits a stylesheet into its `@font-face` declarations, in source order.
pub fn parse_font_faces(stylesheet: &str) -> Result<Vec<FontFace>> {
  FONT_FACE
    .find_iter(stylesheet)
    .map(|m| parse_block(m.as_str()))
    .collect()
}

fn parse_block(block: &str) -> Result<FontFace> {
  let capture = |re: &Regex| {
    re.captures(block)
      .and_then(|c| c.get(1))
      .map(|m| m.as_str().trim().to_string())
  };

  let family = capture(&FAMILY)
    .ok_or_else(|| Error::FontFace(format!("no font-family in `{block}`")))?;

  Ok(FontFace {
    family,
    style: capture(&STYLE).unwrap_or_else(|| "normal".into()),
    weight: capture(&WEIGHT).unwrap_or_else(|| "400".into()),
    src: source_urls(block),
    css: block.to_string(),
  })
}

// remote files only; inline `data:` fonts stay in the css
fn source_urls(block: &str) -> Vec<String> {
  let mut urls: Vec<String> = vec![];
  for c in SRC_URL.captures_iter(block) {
    let url = &c[1];
    if !url.starts_with("data:") && !urls.iter().any(|u| u == url) {
      urls.push(url.to_string());
    }
  }
  urls
}

/// Replaces every `url(...)` target for which `local` returns a path.
pub fn rewrite_urls(
  css: &str,
  local: impl Fn(&str) -> Option<String>,
) -> String {
  SRC_URL
    .replace_all(css, |c: &Captures| {
      let (whole, url) = (&c[0], &c[1]);
      match local(url) {
        Some(path) => whole.replacen(url, &path, 1),
        None => whole.to_string(),
      }
    })
    .into_owned()
}

/* src/server/engine/rust/src/document.rs */

//! HTML document serialization for server-rendered pages, and the inverse
//! used by the client to recover the embedded page state.

use std::fmt::Write;

use crate::escape::{escape_html, escape_json_for_script};
use crate::state::{LinkDescriptor, PageState};

/// `id` of the script element carrying the serialized page state.
pub const DATA_SCRIPT_ID: &str = "__PREMIX_DATA__";

const HEAD_MARKER: &str = "<!--premix:head-->";
const BODY_MARKER: &str = "<!--premix:body-->";
const SCRIPTS_MARKER: &str = "<!--premix:scripts-->";

/// Shell used when the application does not supply its own.
pub const DEFAULT_SHELL: &str = concat!(
  "<!DOCTYPE html><html><head>",
  "<meta charset=\"utf-8\">",
  "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
  "<!--premix:head--></head>",
  "<body><div id=\"root\"><!--premix:body--></div><!--premix:scripts--></body></html>",
);

/// Meta and link tags for the document head.
pub fn render_head(state: &PageState) -> String {
  let mut out = String::new();
  for (name, content) in &state.meta {
    if name == "title" {
      let _ = write!(out, "<title>{}</title>", escape_html(content));
    }
    let _ = write!(out, r#"<meta name="{}" content="{}">"#, escape_html(name), escape_html(content));
  }
  for link in &state.links {
    render_link(&mut out, link);
  }
  out
}

fn render_link(out: &mut String, link: &LinkDescriptor) {
  let href = escape_html(&link.href);
  if link.is_preload() {
    let _ = write!(out, r#"<link rel="{}""#, escape_html(&link.rel));
    if let Some(as_) = &link.as_ {
      let _ = write!(out, r#" as="{}""#, escape_html(as_));
    }
    let _ = write!(out, r#" href="{href}">"#);
    return;
  }
  if link.rel == "stylesheet" {
    let _ = write!(out, r#"<link rel="preload" as="style" href="{href}">"#);
  }
  let _ = write!(out, r#"<link rel="{}" href="{href}""#, escape_html(&link.rel));
  if let Some(as_) = &link.as_ {
    let _ = write!(out, r#" as="{}""#, escape_html(as_));
  }
  if let Some(media) = &link.media {
    let _ = write!(out, r#" media="{}""#, escape_html(media));
  }
  out.push('>');
}

/// Data script plus module entry script. Empty for pages that ship no JS.
pub fn render_scripts(state: &PageState, manifest_version: &str) -> String {
  if state.no_js {
    return String::new();
  }
  let json = serde_json::to_string(&state.to_json()).unwrap_or_else(|_| "{}".to_string());
  format!(
    r#"<script id="{DATA_SCRIPT_ID}" type="application/json" data-manifest="{}">{}</script><script type="module" src="{}"></script>"#,
    escape_html(manifest_version),
    escape_json_for_script(&json),
    escape_html(&state.script),
  )
}

/// Fill `shell` with the head tags, the rendered body and the scripts.
/// Missing markers fall back to insertion before `</head>` / `</body>`.
/// Slots are located in the shell itself, so markers inside the rendered
/// content are left as text.
pub fn render_document(shell: &str, state: &PageState, body: &str, manifest_version: &str) -> String {
  let head = render_head(state);
  let scripts = render_scripts(state, manifest_version);
  let mut slots = [
    Slot::find(shell, HEAD_MARKER, "</head>", &head),
    Slot::find(shell, BODY_MARKER, "</body>", body),
    Slot::find(shell, SCRIPTS_MARKER, "</body>", &scripts),
  ];
  slots.sort_by_key(|slot| slot.at);

  let mut html = String::with_capacity(shell.len() + head.len() + body.len() + scripts.len());
  let mut cursor = 0;
  for slot in &slots {
    html.push_str(shell.get(cursor..slot.at).unwrap_or_default());
    html.push_str(slot.content);
    cursor = cursor.max(slot.at + slot.replaced);
  }
  html.push_str(&shell[cursor..]);
  html
}

struct Slot<'a> {
  at: usize,
  /// Bytes of the shell the content replaces: the marker, or nothing.
  replaced: usize,
  content: &'a str,
}

impl<'a> Slot<'a> {
  fn find(shell: &str, marker: &str, fallback: &str, content: &'a str) -> Self {
    if let Some(at) = shell.find(marker) {
      Self { at, replaced: marker.len(), content }
    } else {
      let at = shell.rfind(fallback).unwrap_or(shell.len());
      Self { at, replaced: 0, content }
    }
  }
}

/// Recover the page state and manifest version from a rendered document.
pub fn extract_page_state(html: &str) -> Option<(PageState, Option<String>)> {
  let open = format!(r#"<script id="{DATA_SCRIPT_ID}""#);
  let start = html.find(&open)?;
  let tag_end = start + html[start..].find('>')?;
  let attrs = &html[start + open.len()..tag_end];
  let body_start = tag_end + 1;
  let body_end = body_start + html[body_start..].find("</script>")?;
  let state = serde_json::from_str(&html[body_start..body_end]).ok()?;
  Some((state, attribute(attrs, "data-manifest")))
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
  let needle = format!(r#"{name}=""#);
  let start = attrs.find(&needle)? + needle.len();
  let end = start + attrs[start..].find('"')?;
  Some(unescape_attr(&attrs[start..end]))
}

fn unescape_attr(s: &str) -> String {
  s.replace("&quot;", "\"")
    .replace("&#x27;", "'")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use serde_json::json;

  use super::*;
  use crate::state::LoaderData;

  fn state() -> PageState {
    PageState {
      meta: BTreeMap::from([
        ("description".to_string(), "A \"quoted\" page".to_string()),
        ("title".to_string(), "Posts".to_string()),
      ]),
      links: vec![
        LinkDescriptor::module_preload("/build/entry-client.js"),
        LinkDescriptor::stylesheet("/build/posts.css").with_media("all"),
      ],
      data: LoaderData::new(json!({ "html": "</script><script>alert(1)</script>" })),
      script: "/build/entry-client.js".into(),
      headers: BTreeMap::new(),
      no_js: false,
    }
  }

  #[test]
  fn head_tags() {
    let head = render_head(&state());
    assert!(head.contains("<title>Posts</title>"));
    assert!(head.contains(r#"<meta name="title" content="Posts">"#));
    assert!(head.contains(r#"<meta name="description" content="A &quot;quoted&quot; page">"#));
    assert!(head.contains(r#"<link rel="modulepreload" href="/build/entry-client.js">"#));
    assert!(head.contains(r#"<link rel="preload" as="style" href="/build/posts.css">"#));
    assert!(head.contains(r#"<link rel="stylesheet" href="/build/posts.css" media="all">"#));
  }

  #[test]
  fn document_embeds_recoverable_state() {
    let state = state();
    let html = render_document(DEFAULT_SHELL, &state, "<h1>Posts</h1>", "abc123");
    assert!(html.contains(r#"<div id="root"><h1>Posts</h1></div>"#));
    assert_eq!(html.matches("</script>").count(), 2);
    assert!(html.contains(r#"<script type="module" src="/build/entry-client.js"></script>"#));

    let (parsed, version) = extract_page_state(&html).unwrap();
    assert_eq!(parsed, state);
    assert_eq!(version.as_deref(), Some("abc123"));
  }

  #[test]
  fn embedded_state_matches_data_endpoint_json() {
    let state = state();
    let html = render_document(DEFAULT_SHELL, &state, "", "v");
    let (parsed, _) = extract_page_state(&html).unwrap();
    assert_eq!(parsed.to_json(), state.to_json());
  }

  #[test]
  fn no_js_omits_scripts() {
    let state = PageState { no_js: true, ..state() };
    let html = render_document(DEFAULT_SHELL, &state, "", "v");
    assert!(!html.contains(DATA_SCRIPT_ID));
    assert!(!html.contains("type=\"module\""));
    assert!(extract_page_state(&html).is_none());
  }

  #[test]
  fn custom_shell_without_markers() {
    let html = render_document("<html><head></head><body></body></html>", &state(), "<p>x</p>", "v");
    assert!(html.starts_with("<html><head><meta"));
    assert!(html.contains("<body><p>x</p><script id="));
    assert!(html.ends_with("</script></body></html>"));
  }

  #[test]
  fn markers_inside_the_body_stay_text() {
    let body = "<pre><!--premix:scripts--><!--premix:head--></pre>";
    let html = render_document(DEFAULT_SHELL, &state(), body, "v");
    assert!(html.contains(&format!(r#"<div id="root">{body}</div><script id="{DATA_SCRIPT_ID}""#)));
    assert_eq!(html.matches(DATA_SCRIPT_ID).count(), 1);
    assert_eq!(html.matches("<title>").count(), 1);
    assert!(html.ends_with("</script></body></html>"));
  }
}

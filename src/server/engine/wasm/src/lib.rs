/* src/server/engine/wasm/src/lib.rs */

// JS bindings over premix-engine so the browser runtime matches routes and
// reads page state with the same code as the server. Structured values cross
// the boundary as JSON strings; "null" means no result.

use premix_engine::{Params, RouteManifest};
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

// --- Matching ---

#[wasm_bindgen]
pub fn is_match(pattern: &str, path: &str) -> bool {
  premix_engine::is_match(pattern, path)
}

#[wasm_bindgen]
pub fn extract_params(pattern: &str, path: &str) -> String {
  match premix_engine::extract_params(pattern, path) {
    Some(params) => json!(params).to_string(),
    None => "null".to_string(),
  }
}

/// `{ "route": {...}, "params": {...} }` for the first matching page route.
#[wasm_bindgen]
pub fn match_route(manifest_json: &str, path: &str) -> String {
  let manifest: RouteManifest = match serde_json::from_str(manifest_json) {
    Ok(manifest) => manifest,
    Err(e) => return json!({ "error": e.to_string() }).to_string(),
  };
  let Some(route) = manifest.find(path) else {
    return "null".to_string();
  };
  let params = premix_engine::extract_params(&route.path, path).unwrap_or_default();
  json!({ "route": route, "params": params }).to_string()
}

/// Empty string when a parameter is missing.
#[wasm_bindgen]
pub fn build_path(pattern: &str, params_json: &str) -> String {
  let params: Params = serde_json::from_str(params_json).unwrap_or_default();
  premix_engine::build_path(pattern, &params).unwrap_or_default()
}

// --- Data endpoint ---

#[wasm_bindgen]
pub fn data_url(page_path: &str) -> String {
  premix_engine::data_url(page_path)
}

#[wasm_bindgen]
pub fn page_path_from_data_url(url: &str) -> Option<String> {
  premix_engine::page_path_from_data_url(url)
}

// --- Page state ---

/// `{ "state": {...}, "manifest": "..." }` recovered from a rendered document.
#[wasm_bindgen]
pub fn extract_page_state(html: &str) -> String {
  match premix_engine::extract_page_state(html) {
    Some((state, manifest)) => json!({ "state": state.to_json(), "manifest": manifest }).to_string(),
    None => Value::Null.to_string(),
  }
}

#[wasm_bindgen]
pub fn ascii_escape_json(json: &str) -> String {
  premix_engine::ascii_escape_json(json)
}

#[wasm_bindgen]
pub fn escape_html(text: &str) -> String {
  premix_engine::escape_html(text)
}

#[cfg(test)]
mod tests {
  use premix_engine::matcher::conformance::CASES;
  use premix_engine::{render_document, PageState, Route, DEFAULT_SHELL};

  use super::*;

  #[test]
  fn bindings_agree_with_conformance_vectors() {
    for case in CASES {
      assert_eq!(is_match(case.pattern, case.path), case.params.is_some());
      let params: Value = serde_json::from_str(&extract_params(case.pattern, case.path)).unwrap();
      match case.params {
        Some(pairs) => {
          for (name, value) in pairs {
            assert_eq!(params[name], *value, "{} vs {}", case.pattern, case.path);
          }
        }
        None => assert!(params.is_null()),
      }
    }
  }

  #[test]
  fn match_route_returns_route_and_params() {
    let manifest = RouteManifest::new(
      vec![
        Route { path: "/".into(), page_id: "index".into(), page_path: "app/pages/index.tsx".into() },
        Route { path: "/:post".into(), page_id: "$post".into(), page_path: "app/pages/$post.tsx".into() },
      ],
      vec![],
    );
    let manifest_json = serde_json::to_string(&manifest).unwrap();
    let matched: Value = serde_json::from_str(&match_route(&manifest_json, "/hello")).unwrap();
    assert_eq!(matched["route"]["pageId"], "$post");
    assert_eq!(matched["params"]["post"], "hello");
    assert_eq!(match_route(&manifest_json, "/a/b"), "null");
    assert!(match_route("{", "/").contains("error"));
  }

  #[test]
  fn build_path_and_data_urls() {
    assert_eq!(build_path("/posts/:post", r#"{"post":"a b"}"#), "/posts/a%20b");
    assert_eq!(build_path("/posts/:post", "{}"), "");
    assert_eq!(data_url("/"), "/_premix/data/index.json");
    assert_eq!(page_path_from_data_url("/_premix/data/about.json").as_deref(), Some("/about"));
  }

  #[test]
  fn page_state_round_trip() {
    let html = render_document(DEFAULT_SHELL, &PageState::default(), "", "v1");
    let out: Value = serde_json::from_str(&extract_page_state(&html)).unwrap();
    assert_eq!(out["manifest"], "v1");
    assert_eq!(out["state"]["data"]["props"], json!({}));
    assert_eq!(extract_page_state("<html></html>"), "null");
  }
}

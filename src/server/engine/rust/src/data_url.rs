/* src/server/engine/rust/src/data_url.rs */

/// Path prefix of the JSON data endpoint.
pub const DATA_PREFIX: &str = "/_premix/data";

/// Data endpoint URL for a page path. The root maps to `/index.json`.
pub fn data_url(page_path: &str) -> String {
  let path = strip_query(page_path);
  let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
  if path.is_empty() || path == "/" {
    return format!("{DATA_PREFIX}/index.json");
  }
  let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
  format!("{DATA_PREFIX}{path}.json")
}

/// Page path a data endpoint URL refers to, or `None` for anything that is not
/// a `.json` URL under the data prefix. Only the top-level `/index` is folded
/// to `/`; a nested `index` segment is a real path.
pub fn page_path_from_data_url(url: &str) -> Option<String> {
  let rest = strip_query(url).strip_prefix(DATA_PREFIX)?;
  let stem = rest.strip_suffix(".json")?;
  if !stem.starts_with('/') || stem.len() < 2 {
    return None;
  }
  if stem == "/index" {
    return Some("/".to_string());
  }
  Some(stem.to_string())
}

fn strip_query(url: &str) -> &str {
  url.split(['?', '#']).next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn root_maps_to_index() {
    assert_eq!(data_url("/"), "/_premix/data/index.json");
    assert_eq!(data_url(""), "/_premix/data/index.json");
    assert_eq!(page_path_from_data_url("/_premix/data/index.json").as_deref(), Some("/"));
  }

  #[test]
  fn nested_paths() {
    assert_eq!(data_url("/posts/hello"), "/_premix/data/posts/hello.json");
    assert_eq!(data_url("/posts/hello/?x=1"), "/_premix/data/posts/hello.json");
    assert_eq!(page_path_from_data_url("/_premix/data/posts/hello.json").as_deref(), Some("/posts/hello"));
    assert_eq!(page_path_from_data_url("/_premix/data/docs/index.json").as_deref(), Some("/docs/index"));
  }

  #[test]
  fn rejects_foreign_urls() {
    assert_eq!(page_path_from_data_url("/posts/hello.json"), None);
    assert_eq!(page_path_from_data_url("/_premix/data/posts"), None);
    assert_eq!(page_path_from_data_url("/_premix/data/.json"), None);
  }
}

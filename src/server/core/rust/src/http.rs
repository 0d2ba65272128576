/* src/server/core/rust/src/http.rs */

// Framework-neutral request/response values. Adapters convert to and from
// their own HTTP types at the edge.

use std::collections::BTreeMap;

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use premix_engine::Params;
use serde::Serialize;

pub type Query = BTreeMap<String, String>;

/// Request passed to server loaders, actions and API handlers.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
  pub method: String,
  /// Original URL: path plus query string.
  pub url: String,
  pub path: String,
  pub query: Query,
  /// Header names are lowercase.
  pub headers: BTreeMap<String, String>,
  pub params: Params,
  pub body: Bytes,
}

impl PageRequest {
  /// Build a request from a method and URL. Params are filled in after
  /// route matching.
  pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
    let url = url.into();
    let (path, query) = split_url(&url);
    Self { method: method.into(), path, query, url, ..Self::default() }
  }

  pub fn get(url: impl Into<String>) -> Self {
    Self::new("GET", url)
  }

  pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
    self.headers.insert(name.to_ascii_lowercase(), value.into());
    self
  }

  pub fn body(mut self, body: impl Into<Bytes>) -> Self {
    self.body = body.into();
    self
  }

  pub fn header_value(&self, name: &str) -> Option<&str> {
    self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
  }

  /// Body decoded as JSON.
  pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
    serde_json::from_slice(&self.body)
  }

  /// Body decoded as `application/x-www-form-urlencoded`.
  pub fn form(&self) -> Query {
    parse_query(&String::from_utf8_lossy(&self.body))
  }
}

/// Response produced by actions and API handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Bytes,
}

impl HttpResponse {
  pub fn new(status: u16) -> Self {
    Self { status, headers: Vec::new(), body: Bytes::new() }
  }

  pub fn ok() -> Self {
    Self::new(200)
  }

  pub fn text(body: impl Into<String>) -> Self {
    Self::ok().header("content-type", "text/plain; charset=utf-8").with_body(body.into())
  }

  pub fn html(body: impl Into<String>) -> Self {
    Self::ok().header("content-type", "text/html; charset=utf-8").with_body(body.into())
  }

  pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
    let body = serde_json::to_vec(value)?;
    Ok(Self::ok().header("content-type", "application/json").with_body(body))
  }

  pub fn redirect(location: impl Into<String>) -> Self {
    Self::new(303).header("location", location)
  }

  pub fn status(mut self, status: u16) -> Self {
    self.status = status;
    self
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
    self.body = body.into();
    self
  }
}

/// Split a request URL into its path and decoded query map.
pub fn split_url(url: &str) -> (String, Query) {
  let without_fragment = url.split('#').next().unwrap_or(url);
  match without_fragment.split_once('?') {
    Some((path, query)) => (non_empty_path(path), parse_query(query)),
    None => (non_empty_path(without_fragment), Query::new()),
  }
}

fn non_empty_path(path: &str) -> String {
  if path.is_empty() { "/".to_string() } else { path.to_string() }
}

/// Parse `a=1&b=two+words`. Later duplicates overwrite earlier ones.
pub fn parse_query(query: &str) -> Query {
  query
    .split('&')
    .filter(|pair| !pair.is_empty())
    .map(|pair| {
      let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
      (decode_component(key), decode_component(value))
    })
    .collect()
}

fn decode_component(raw: &str) -> String {
  let spaced = raw.replace('+', " ");
  percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_url_variants() {
    let (path, query) = split_url("/posts?page=2&q=hello+world#top");
    assert_eq!(path, "/posts");
    assert_eq!(query.get("page").map(String::as_str), Some("2"));
    assert_eq!(query.get("q").map(String::as_str), Some("hello world"));

    let (path, query) = split_url("?x");
    assert_eq!(path, "/");
    assert_eq!(query.get("x").map(String::as_str), Some(""));
  }

  #[test]
  fn request_builder() {
    let req = PageRequest::new("POST", "/todos?from=form").header("Content-Type", "text/plain").body("title=Buy+milk");
    assert_eq!(req.path, "/todos");
    assert_eq!(req.header_value("content-type"), Some("text/plain"));
    assert_eq!(req.form().get("title").map(String::as_str), Some("Buy milk"));
  }

  #[test]
  fn json_response() {
    let res = HttpResponse::json(&serde_json::json!({ "ok": true })).unwrap().status(201);
    assert_eq!(res.status, 201);
    assert_eq!(res.headers[0], ("content-type".to_string(), "application/json".to_string()));
    assert_eq!(&res.body[..], br#"{"ok":true}"#);
  }
}

/* src/server/engine/rust/src/state.rs */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `<link>` element the page wants in its head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
  pub rel: String,
  pub href: String,
  #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
  pub as_: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub media: Option<String>,
}

impl LinkDescriptor {
  pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
    Self { rel: rel.into(), href: href.into(), as_: None, media: None }
  }

  pub fn module_preload(href: impl Into<String>) -> Self {
    Self::new("modulepreload", href)
  }

  pub fn stylesheet(href: impl Into<String>) -> Self {
    Self::new("stylesheet", href)
  }

  pub fn with_as(mut self, as_: impl Into<String>) -> Self {
    self.as_ = Some(as_.into());
    self
  }

  pub fn with_media(mut self, media: impl Into<String>) -> Self {
    self.media = Some(media.into());
    self
  }

  pub fn is_preload(&self) -> bool {
    self.rel == "preload" || self.rel == "modulepreload"
  }
}

/// What a loader produced: props for the render function plus an optional
/// revalidation interval in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderData {
  #[serde(default = "empty_props")]
  pub props: Value,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub revalidate: Option<u64>,
}

fn empty_props() -> Value {
  Value::Object(serde_json::Map::new())
}

impl LoaderData {
  pub fn new(props: Value) -> Self {
    Self { props, revalidate: None }
  }

  pub fn revalidate(mut self, seconds: u64) -> Self {
    self.revalidate = Some(seconds);
    self
  }
}

impl Default for LoaderData {
  fn default() -> Self {
    Self::new(empty_props())
  }
}

/// Per-request state handed to the render function, embedded in the HTML
/// document and returned verbatim by the JSON data endpoint.
///
/// `headers` never leaves the server as JSON; it is applied to the HTTP
/// response instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
  #[serde(default)]
  pub meta: BTreeMap<String, String>,
  #[serde(default)]
  pub links: Vec<LinkDescriptor>,
  #[serde(default)]
  pub data: LoaderData,
  #[serde(default)]
  pub script: String,
  #[serde(skip)]
  pub headers: BTreeMap<String, String>,
  #[serde(default)]
  pub no_js: bool,
}

impl PageState {
  pub fn props(&self) -> &Value {
    &self.data.props
  }

  /// JSON form shared by the document and the data endpoint.
  pub fn to_json(&self) -> Value {
    serde_json::to_value(self).unwrap_or(Value::Null)
  }
}

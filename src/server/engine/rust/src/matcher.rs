/* src/server/engine/rust/src/matcher.rs */

// Route pattern matching. Patterns are `/`-separated; a segment starting with
// `:` binds exactly one non-empty path segment. No wildcards, no optionals.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub type Params = BTreeMap<String, String>;

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// True when `path` matches `pattern`.
pub fn is_match(pattern: &str, path: &str) -> bool {
  match_segments(pattern, path).is_some()
}

/// Named parameters bound by `pattern` against `path`, percent-decoded.
/// Returns `None` when the path does not match.
pub fn extract_params(pattern: &str, path: &str) -> Option<Params> {
  let raw = match_segments(pattern, path)?;
  Some(
    raw
      .into_iter()
      .map(|(name, value)| (name.to_string(), percent_decode_str(value).decode_utf8_lossy().into_owned()))
      .collect(),
  )
}

/// Substitute `params` into `pattern`, percent-encoding each value.
/// Returns `None` if a dynamic segment has no value.
pub fn build_path(pattern: &str, params: &Params) -> Option<String> {
  let mut segments = Vec::new();
  for segment in pattern.split('/') {
    match segment.strip_prefix(':') {
      Some(name) => {
        let value = params.get(name)?;
        segments.push(utf8_percent_encode(value, COMPONENT).to_string());
      }
      None => segments.push(segment.to_string()),
    }
  }
  Some(segments.join("/"))
}

/// Walk pattern and path segments in lockstep, collecting raw (still encoded)
/// parameter values. Matching happens before decoding so an encoded `%2F`
/// stays inside its segment.
fn match_segments<'p, 'u>(pattern: &'p str, path: &'u str) -> Option<Vec<(&'p str, &'u str)>> {
  let path = normalize(path);
  let mut pattern_segments = pattern.split('/');
  let mut path_segments = path.split('/');
  let mut params = Vec::new();

  loop {
    match (pattern_segments.next(), path_segments.next()) {
      (None, None) => return Some(params),
      (Some(expected), Some(actual)) => {
        if let Some(name) = expected.strip_prefix(':') {
          if actual.is_empty() {
            return None;
          }
          params.push((name, actual));
        } else if !expected.eq_ignore_ascii_case(actual) {
          return None;
        }
      }
      _ => return None,
    }
  }
}

/// Tolerate one trailing slash; treat the empty path as the root.
fn normalize(path: &str) -> &str {
  if path.is_empty() {
    return "/";
  }
  match path.strip_suffix('/') {
    Some(rest) if !rest.is_empty() => rest,
    _ => path,
  }
}

/// Matcher vectors shared by every crate that matches routes. Any
/// implementation of the matcher (native, wasm, or JS) must agree with these.
pub mod conformance {
  pub struct Case {
    pub pattern: &'static str,
    pub path: &'static str,
    /// `None` means the path must not match.
    pub params: Option<&'static [(&'static str, &'static str)]>,
  }

  pub const CASES: &[Case] = &[
    Case { pattern: "/", path: "/", params: Some(&[]) },
    Case { pattern: "/", path: "", params: Some(&[]) },
    Case { pattern: "/", path: "/about", params: None },
    Case { pattern: "/about", path: "/about", params: Some(&[]) },
    Case { pattern: "/about", path: "/about/", params: Some(&[]) },
    Case { pattern: "/about", path: "/About", params: Some(&[]) },
    Case { pattern: "/about", path: "/about/team", params: None },
    Case { pattern: "/about", path: "/abou", params: None },
    Case { pattern: "/:id", path: "/42", params: Some(&[("id", "42")]) },
    Case { pattern: "/:id", path: "/", params: None },
    Case { pattern: "/:id", path: "/a/b", params: None },
    Case { pattern: "/posts/:post", path: "/posts/hello-world", params: Some(&[("post", "hello-world")]) },
    Case { pattern: "/posts/:post", path: "/posts/a%2Fb", params: Some(&[("post", "a/b")]) },
    Case { pattern: "/posts/:post", path: "/posts/caf%C3%A9", params: Some(&[("post", "café")]) },
    Case { pattern: "/posts/:post", path: "/posts", params: None },
    Case { pattern: "/posts/:post", path: "/posts//", params: None },
    Case {
      pattern: "/users/:user/posts/:post",
      path: "/users/ada/posts/7",
      params: Some(&[("user", "ada"), ("post", "7")]),
    },
    Case { pattern: "/api/hello", path: "/api/hello", params: Some(&[]) },
  ];
}

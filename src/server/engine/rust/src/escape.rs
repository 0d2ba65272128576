/* src/server/engine/rust/src/escape.rs */

use std::fmt::Write;

/// Escape non-ASCII characters in a JSON string to `\uXXXX` sequences.
/// Supplementary-plane characters become surrogate pairs.
pub fn ascii_escape_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  for ch in json.chars() {
    if ch.is_ascii() {
      out.push(ch);
    } else {
      let mut buf = [0u16; 2];
      for unit in ch.encode_utf16(&mut buf) {
        let _ = write!(out, "\\u{unit:04x}");
      }
    }
  }
  out
}

/// JSON that is safe to place inside a `<script>` element: ASCII only, and
/// `<`, `>` and `&` escaped so `</script>` or `<!--` inside a string value
/// cannot terminate the element.
pub fn escape_json_for_script(json: &str) -> String {
  let ascii = ascii_escape_json(json);
  let mut out = String::with_capacity(ascii.len());
  for ch in ascii.chars() {
    match ch {
      '<' => out.push_str("\\u003c"),
      '>' => out.push_str("\\u003e"),
      '&' => out.push_str("\\u0026"),
      c => out.push(c),
    }
  }
  out
}

/// Escape text for HTML content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      c => out.push(c),
    }
  }
  out
}

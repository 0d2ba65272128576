/* src/cli/core/src/build/entry.rs */

// Generated route module consumed by the client entry. It carries the route
// table in precedence order and lazy imports for every page, so the bundler
// emits one chunk per page.

use std::fmt::Write;
use std::path::{Component, Path};

use premix_server::RouteManifest;
use serde_json::Value;

pub const ROUTES_MODULE: &str = "entry-client.tsx";

pub fn render_routes_module(manifest: &RouteManifest, import_prefix: &str) -> String {
  let mut out = String::from("// Generated by `premix build`. Do not edit.\n\n");
  let _ = writeln!(out, "export const manifestVersion = {};", js_string(&manifest.version));
  out.push_str("\nexport const routes = [\n");
  for route in &manifest.routes {
    let _ = writeln!(
      out,
      "  {{ path: {}, pageId: {}, page: () => import({}) }},",
      js_string(&route.path),
      js_string(&route.page_id),
      js_string(&format!("{import_prefix}{}", route.page_path)),
    );
  }
  out.push_str("];\n");
  out
}

/// Prefix that turns a project-relative path into one relative to `out_dir`.
pub fn import_prefix(base_dir: &Path, out_dir: &str) -> String {
  let out = Path::new(out_dir);
  if out.is_absolute() {
    let base = base_dir.to_string_lossy().replace('\\', "/");
    return format!("{}/", base.trim_end_matches('/'));
  }
  let depth = out.components().filter(|c| matches!(c, Component::Normal(_))).count();
  if depth == 0 { "./".to_string() } else { "../".repeat(depth) }
}

fn js_string(s: &str) -> String {
  Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
  use premix_server::Route;

  use super::*;

  #[test]
  fn prefix_from_out_dir_depth() {
    let base = Path::new("/srv/app");
    assert_eq!(import_prefix(base, ".premix/build"), "../../");
    assert_eq!(import_prefix(base, "./out"), "../");
    assert_eq!(import_prefix(base, "."), "./");
    assert_eq!(import_prefix(base, "/tmp/out"), "/srv/app/");
  }

  #[test]
  fn module_lists_routes_in_order() {
    let manifest = RouteManifest::new(
      vec![
        Route { path: "/".into(), page_id: "index".into(), page_path: "app/pages/index.tsx".into() },
        Route { path: "/:post".into(), page_id: "$post".into(), page_path: "app/pages/$post.tsx".into() },
      ],
      vec![],
    );
    let module = render_routes_module(&manifest, "../../");
    assert!(module.contains(&format!("export const manifestVersion = \"{}\";", manifest.version)));
    let index = module.find("import(\"../../app/pages/index.tsx\")").unwrap();
    let post = module.find("import(\"../../app/pages/$post.tsx\")").unwrap();
    assert!(index < post);
    assert!(module.contains("path: \"/:post\", pageId: \"$post\""));
  }
}

/* src/cli/core/src/config/tests.rs */

use std::time::Duration;

use super::*;

fn parse(toml_str: &str) -> PremixConfig {
  toml::from_str(toml_str).unwrap()
}

#[test]
fn parse_minimal_config() {
  let config = parse(
    r#"
[project]
name = "blog"
"#,
  );
  assert_eq!(config.project.name, "blog");
  assert_eq!(config.pages.root, "app/pages");
  assert_eq!(config.extensions(), ["tsx", "ts", "jsx", "js"]);
  assert_eq!(config.build.out_dir, ".premix/build");
  assert_eq!(config.build.public_dir, ".premix/public");
  assert_eq!(config.build.client_entry, "app/entry-client.tsx");
  assert_eq!(config.build.metafile, "meta.json");
  assert_eq!(config.build.public_path, "/build");
  assert!(config.build.bundler_command.is_none());
  assert_eq!(config.server.port, 3000);
  config.validate().unwrap();
}

#[test]
fn parse_full_config() {
  let config = parse(
    r#"
[project]
name = "shop"

[pages]
root = "src/pages"
extensions = ["tsx"]

[build]
out_dir = "out/build"
public_dir = "out/public"
client_entry = "src/client.tsx"
bundler_command = "node scripts/bundle.mjs"
metafile = "esbuild-meta.json"
public_path = "/assets"

[server]
port = 8080
revalidate_cap = 500
loader_timeout_ms = 2500
"#,
  );
  config.validate().unwrap();
  assert_eq!(config.pages.root, "src/pages");
  assert_eq!(config.build.bundler_command.as_deref(), Some("node scripts/bundle.mjs"));
  assert_eq!(config.server.port, 8080);

  let options = config.server_options();
  assert_eq!(options.build_dir, std::path::PathBuf::from("out/build"));
  assert_eq!(options.metafile_path(), std::path::PathBuf::from("out/build/esbuild-meta.json"));
  assert_eq!(options.public_path, "/assets");
  assert_eq!(options.pages_root, "src/pages");
  assert_eq!(options.loader_timeout, Some(Duration::from_millis(2500)));
  assert_eq!(options.revalidate_cap, Some(500));
}

#[test]
fn default_revalidate_cap_is_kept() {
  let config = parse("[project]\nname = \"x\"\n");
  assert_eq!(config.server_options().revalidate_cap, premix_server::ServerOptions::default().revalidate_cap);
}

#[test]
fn missing_project_is_rejected() {
  assert!(toml::from_str::<PremixConfig>("[pages]\nroot = \"app\"\n").is_err());
}

#[test]
fn validation_errors() {
  let cases = [
    ("[pages]\nextensions = []", "pages.extensions must not be empty"),
    ("[pages]\nextensions = [\".tsx\"]", "bare extensions"),
    ("[build]\npublic_path = \"build\"", "must start with '/'"),
    ("[build]\nout_dir = \"out\"\npublic_dir = \"out\"", "must differ"),
    ("[server]\nport = 0", "server.port"),
    ("[server]\nrevalidate_cap = 0", "revalidate_cap"),
  ];
  for (extra, expected) in cases {
    let config = parse(&format!("[project]\nname = \"x\"\n{extra}\n"));
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains(expected), "{extra:?}: {err}");
  }
}

#[test]
fn find_config_walks_upward() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"x\"\n").unwrap();
  let nested = dir.path().join("app/pages/posts");
  std::fs::create_dir_all(&nested).unwrap();

  let found = find_premix_config(&nested).unwrap();
  assert_eq!(found, dir.path().canonicalize().unwrap().join(CONFIG_FILE));
  assert_eq!(load_premix_config(&found).unwrap().project.name, "x");
}

#[test]
fn load_reports_invalid_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(CONFIG_FILE);
  std::fs::write(&path, "[project]\nname = \"x\"\n[server]\nport = 0\n").unwrap();
  let err = format!("{:#}", load_premix_config(&path).unwrap_err());
  assert!(err.contains("invalid"));
  assert!(err.contains("server.port"));
}

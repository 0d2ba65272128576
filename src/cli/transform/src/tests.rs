/* src/cli/transform/src/tests.rs */

use super::*;

fn client(source: &str) -> String {
  transform("app/pages/test.tsx", source).unwrap().client
}

#[test]
fn strips_loader_and_its_database_import() {
  let source = r#"import { db } from "../lib/db";
import { Link } from "premix";

export const serverLoader = async ({ params }) => {
  const posts = await db.posts.findMany();
  return { props: { posts } };
};

export default function Posts({ posts }) {
  return <Link href="/">{posts.length}</Link>;
}
"#;
  let out = transform("app/pages/posts.tsx", source).unwrap();
  assert!(!out.client.contains("db"));
  assert!(!out.client.contains("serverLoader"));
  assert!(out.client.starts_with("import { Link } from \"premix\";\n"));
  assert!(out.client.contains("export default function Posts"));
  assert_eq!(out.stripped, ["serverLoader"]);
  assert_eq!(out.server, source);
  assert_eq!(out.variant(Target::Server), source);
}

#[test]
fn action_and_its_only_import_are_removed() {
  let source = "import { db } from 'db'\nexport default () => null\nexport const action = () => db.write()\n";
  let out = transform("app/pages/index.tsx", source).unwrap();
  assert_eq!(out.client, "export default () => null\n");
  assert_eq!(out.stripped, ["action"]);
  assert_eq!(out.server, source);
}

#[test]
fn shadowed_local_does_not_keep_the_import() {
  let source = "import { db } from 'db';\n\
export const action = () => db.write();\n\
export default function Page() {\n  const db = 1;\n  return db;\n}\n";
  assert_eq!(client(source), "export default function Page() {\n  const db = 1;\n  return db;\n}\n");
}

#[test]
fn shadowing_parameter_does_not_keep_the_import() {
  let source = "import { db } from 'db';\n\
export async function serverLoader() { return db.read(); }\n\
export default function Page({ db }) { return db; }\n";
  assert_eq!(client(source), "export default function Page({ db }) { return db; }\n");
}

#[test]
fn module_level_use_keeps_the_import_despite_a_shadow() {
  let source = "import { db } from 'db';\n\
export const action = () => db.write();\n\
const label = db.name;\n\
export default function Page() { const db = label; return db; }\n";
  let out = client(source);
  assert!(out.starts_with("import { db } from 'db';\n"));
  assert!(!out.contains("action"));
}

#[test]
fn untouched_without_server_exports() {
  let source = "import unused from 'x';\nexport default () => null;\n";
  let out = transform("a.tsx", source).unwrap();
  assert_eq!(out.client, source);
  assert!(out.stripped.is_empty());
}

#[test]
fn unrelated_unused_and_side_effect_imports_survive() {
  let source = "import './global.css';\nimport unused from 'x';\nimport { fmt } from 'fmt';\n\
export const meta = () => ({ title: fmt('t') });\nexport default () => null;\n";
  let out = client(source);
  assert!(out.contains("import './global.css';"));
  assert!(out.contains("import unused from 'x';"));
  assert!(!out.contains("fmt"));
  assert!(!out.contains("meta"));
}

#[test]
fn function_exports_and_their_helpers() {
  let source = "function helper() { return 1; }\n\
export async function action({ body }) { return helper(); }\n\
export function headers() { return {}; }\n\
export default function Page() { return null; }\n";
  let out = client(source);
  assert_eq!(out, "export default function Page() { return null; }\n");
}

#[test]
fn self_referencing_helper_is_stripped() {
  let source = "function walk(n) { return n > 0 ? walk(n - 1) : 0; }\n\
function lonely(n) { return lonely(n); }\n\
export const staticLoader = () => ({ props: { depth: walk(3) } });\n\
export default function Page() { return null; }\n";
  let out = client(source);
  assert!(!out.contains("walk"));
  assert!(out.contains("function lonely(n)"));
}

#[test]
fn helpers_shared_with_the_page_are_kept() {
  let source = "import { format } from 'date';\n\
const label = (d) => format(d);\n\
export const serverLoader = () => ({ props: { today: label(new Date()) } });\n\
export default function Page({ today }) { return <p>{label(today)}</p>; }\n";
  let out = client(source);
  assert!(out.contains("import { format } from 'date';"));
  assert!(out.contains("const label = (d) => format(d);"));
  assert!(!out.contains("serverLoader"));
}

#[test]
fn transitive_chain_is_swept() {
  let source = "import secret from 'secret';\n\
const key = secret.key;\n\
const client = makeClient(key);\n\
export const serverLoader = () => client.load();\n\
export default () => null;\n";
  let out = client(source);
  assert_eq!(out, "export default () => null;\n");
}

#[test]
fn partial_import_is_rejoined() {
  let source = "import fs, { readFile, join } from 'node-lib';\n\
export const staticLoader = () => fs.stat(readFile('x'));\n\
export default () => join('a', 'b');\n";
  let out = client(source);
  assert!(out.starts_with("import { join } from 'node-lib';\n"));
}

#[test]
fn object_destructuring_exports() {
  let source = "const config = load();\n\
export const { meta, title } = config;\n\
export default () => title;\n";
  let out = transform("a.tsx", source).unwrap();
  assert!(out.client.contains("export const { title } = config;"));
  assert!(out.client.contains("const config = load();"));
  assert_eq!(out.stripped, ["meta"]);

  let source = "const config = load();\nexport const { meta, links } = config;\nexport default () => null;\n";
  assert_eq!(client(source), "export default () => null;\n");
}

#[test]
fn array_and_rest_destructuring_exports() {
  let source = "const items = all();\nexport const [first, ...links] = items;\nexport default () => first;\n";
  assert!(client(source).contains("export const [first] = items;"));

  let source = "const items = all();\nexport const [meta, ...rest] = items;\nexport default () => rest;\n";
  assert!(client(source).contains("export const [, ...rest] = items;"));

  let source = "const cfg = all();\nexport const { title, ...meta } = cfg;\nexport default () => title;\n";
  assert!(client(source).contains("export const { title } = cfg;"));
}

#[test]
fn multiple_declarators() {
  let source = "export const meta = () => ({ title: 'x' }), revalidate = 10;\nexport default () => null;\n";
  assert!(client(source).starts_with("export const revalidate = 10;\n"));
}

#[test]
fn export_specifiers() {
  let source = "const meta = () => ({});\nfunction Page() { return null; }\nexport { meta, Page as default };\n";
  let out = transform("a.tsx", source).unwrap();
  assert_eq!(out.client, "function Page() { return null; }\nexport { Page as default };\n");
  assert_eq!(out.stripped, ["meta"]);
}

#[test]
fn reexported_server_names() {
  let source = "export { action, default } from './shared';\n";
  assert_eq!(client(source), "export { default } from './shared';\n");
}

#[test]
fn export_star_is_rejected_with_position() {
  let source = "import x from 'y';\nexport * from './other';\n";
  let err = transform("app/pages/bad.tsx", source).unwrap_err();
  assert_eq!(
    err,
    TransformError::ExportAll {
      file: "app/pages/bad.tsx".into(),
      position: Position { line: 2, column: 1 },
      source: "./other".into(),
    }
  );
  let message = err.to_string();
  assert!(message.starts_with("app/pages/bad.tsx:2:1: "));
  assert!(message.contains("export { default } from './other'"));
}

#[test]
fn export_star_as_namespace_is_rejected() {
  let err = transform("a.tsx", "export * as ns from './ns';\n").unwrap_err();
  assert!(matches!(err, TransformError::ExportAll { .. }));
}

#[test]
fn parse_errors_are_reported() {
  let err = transform("app/pages/broken.tsx", "export const = ;").unwrap_err();
  assert_eq!(err.file(), "app/pages/broken.tsx");
  assert!(matches!(err, TransformError::Parse { ref diagnostics, .. } if !diagnostics.is_empty()));
}

#[test]
fn type_only_exports_are_left_alone() {
  let source = "export type { Meta } from './types';\nexport const links = () => [];\nexport default () => null;\n";
  let out = client(source);
  assert!(out.contains("export type { Meta } from './types';"));
  assert!(!out.contains("links"));
}

#[test]
fn target_parsing() {
  assert_eq!("client".parse::<Target>(), Ok(Target::Client));
  assert_eq!("server".parse::<Target>(), Ok(Target::Server));
  assert!("edge".parse::<Target>().is_err());
}

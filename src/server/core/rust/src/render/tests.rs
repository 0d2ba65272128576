/* src/server/core/rust/src/render/tests.rs */

use std::collections::BTreeMap;

use premix_engine::{extract_page_state, LinkDescriptor};
use serde_json::json;

use super::*;
use crate::metafile::AssetIndex;

fn route(path: &str, id: &str) -> Route {
  Route { path: path.into(), page_id: id.into(), page_path: format!("app/pages/{id}.tsx") }
}

fn assets() -> MetafileSource {
  let meta = json!({
    "outputs": {
      ".premix/public/build/entry-client.E1.js": {
        "entryPoint": "app/entry-client.tsx",
        "imports": [{ "path": ".premix/public/build/chunk-A.js", "kind": "import-statement" }],
        "inputs": {}
      },
      ".premix/public/build/chunk-A.js": { "imports": [], "inputs": {} },
      ".premix/public/build/pages/about.A1B2.js": {
        "entryPoint": "app/pages/about.tsx", "imports": [], "inputs": { "app/pages/about.tsx": {} }
      },
      ".premix/public/build/pages/about.A1B2.css": { "imports": [], "inputs": {} },
      ".premix/public/build/pages/$post.P1.js": {
        "entryPoint": "app/pages/$post.tsx", "imports": [], "inputs": { "app/pages/$post.tsx": {} }
      }
    }
  });
  MetafileSource::fixed(AssetIndex::parse(&meta.to_string(), ".premix/public", "app/entry-client.tsx").unwrap())
}

fn renderer() -> Renderer {
  let manifest =
    RouteManifest::new(vec![route("/", "index"), route("/about", "about"), route("/:post", "$post")], vec![]);
  let mut pages = PageRegistry::new();
  pages.insert("index", PageModule::new(|_| "<h1>Home</h1>".to_string()));
  pages.insert(
    "about",
    PageModule::new(|state| format!("<h1>{}</h1>", state.props()["title"].as_str().unwrap_or("")))
      .static_loader(|_| async { Ok(LoaderData::new(json!({ "title": "About" })).revalidate(10)) })
      .meta(|props| BTreeMap::from([("title".to_string(), props["title"].as_str().unwrap_or("").to_string())]))
      .headers(|_| BTreeMap::from([("cache-control".to_string(), "max-age=60".to_string())]))
      .links(|_| vec![LinkDescriptor::new("icon", "/favicon.ico")]),
  );
  pages.insert(
    "$post",
    PageModule::new(|state| state.props()["slug"].as_str().unwrap_or("").to_string())
      .server_loader(|req: PageRequest| async move {
        let slug = req.params.get("post").cloned().unwrap_or_default();
        if slug == "boom" {
          return Err(PremixError::internal("database unavailable"));
        }
        if slug == "gone" {
          return Err(PremixError::not_found("no such post"));
        }
        Ok(LoaderData::new(json!({ "slug": slug, "q": req.query.get("q") })))
      })
      .action(|req: PageRequest| async move {
        Ok(HttpResponse::text(format!("saved {}", req.params.get("post").cloned().unwrap_or_default())))
      }),
  );
  Renderer::new(Arc::new(manifest), Arc::new(pages), assets())
}

#[tokio::test]
async fn renders_static_page_with_links_meta_headers() {
  let page = renderer().render(PageRequest::get("/about?x=1")).await.unwrap();
  assert_eq!(page.route.page_id, "about");
  assert_eq!(page.state.meta["title"], "About");
  assert_eq!(page.state.headers["cache-control"], "max-age=60");
  assert_eq!(page.state.script, "/build/entry-client.E1.js");
  let hrefs: Vec<&str> = page.state.links.iter().map(|l| l.href.as_str()).collect();
  assert_eq!(
    hrefs,
    [
      "/build/entry-client.E1.js",
      "/build/pages/about.A1B2.js",
      "/build/chunk-A.js",
      "/build/pages/about.A1B2.css",
      "/favicon.ico"
    ]
  );
  assert_eq!(page.revalidate(), Some(10));
  assert!(page.is_static());
  assert_eq!(page.render(), "<h1>About</h1>");
}

#[tokio::test]
async fn server_loader_gets_decoded_params_and_query() {
  let page = renderer().render(PageRequest::get("/hello%20world?q=rust")).await.unwrap();
  assert_eq!(page.state.props()["slug"], "hello world");
  assert_eq!(page.state.props()["q"], "rust");
  assert_eq!(page.revalidate(), None);
  assert!(!page.is_static());
}

#[tokio::test]
async fn page_without_loader_gets_empty_props() {
  let page = renderer().render(PageRequest::get("/")).await.unwrap();
  assert_eq!(page.state.props(), &json!({}));
  assert_eq!(page.loader, LoaderKind::None);
}

#[tokio::test]
async fn unmatched_path_is_not_found() {
  let err = renderer().render(PageRequest::get("/a/b/c")).await.err().unwrap();
  assert!(err.is_not_found());
  assert_eq!(err.message(), "Page not found");
}

#[tokio::test]
async fn loader_failure_is_wrapped() {
  let err = renderer().render(PageRequest::get("/boom")).await.err().unwrap();
  assert_eq!(err.code(), "LOADER_FAILURE");
  assert_eq!(err.status(), 500);
  assert!(err.chain().iter().any(|c| c.contains("database unavailable")));
}

#[tokio::test]
async fn loader_client_errors_pass_through() {
  let err = renderer().render(PageRequest::get("/gone")).await.err().unwrap();
  assert_eq!(err.status(), 404);
  assert_eq!(err.message(), "no such post");
}

#[tokio::test]
async fn loader_timeout() {
  let manifest = RouteManifest::new(vec![route("/slow", "slow")], vec![]);
  let mut pages = PageRegistry::new();
  pages.insert(
    "slow",
    PageModule::new(|_| String::new()).server_loader(|_| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok(LoaderData::default())
    }),
  );
  let renderer =
    Renderer::new(Arc::new(manifest), Arc::new(pages), assets()).loader_timeout(Some(Duration::from_millis(20)));
  let err = renderer.render(PageRequest::get("/slow")).await.err().unwrap();
  assert_eq!(err.code(), "LOADER_TIMEOUT");
  assert_eq!(err.status(), 504);
}

#[tokio::test]
async fn document_and_json_agree() {
  let renderer = renderer();
  let page = renderer.render(PageRequest::get("/about")).await.unwrap();
  let html = renderer.document(&page);
  assert!(html.contains("<h1>About</h1>"));
  let (embedded, version) = extract_page_state(&html).unwrap();
  assert_eq!(embedded.to_json(), page.state.to_json());
  assert_eq!(version.as_deref(), Some(renderer.manifest().version.as_str()));
}

#[tokio::test]
async fn actions() {
  let renderer = renderer();
  let res = renderer.action(PageRequest::new("POST", "/my-post")).await.unwrap();
  assert_eq!(&res.body[..], b"saved my-post");

  let err = renderer.action(PageRequest::new("POST", "/about")).await.unwrap_err();
  assert!(err.is_not_found());
  assert_eq!(err.message(), "Loader doesn't exist");

  let err = renderer.action(PageRequest::new("POST", "/x/y")).await.unwrap_err();
  assert_eq!(err.message(), "Page not found");
}

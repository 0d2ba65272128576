/* src/server/core/rust/src/revalidate/tests.rs */

use std::sync::atomic::{AtomicUsize, Ordering};

use premix_engine::{LoaderData, Route, RouteManifest};
use serde_json::json;

use super::*;
use crate::metafile::{AssetIndex, MetafileSource};
use crate::page::PageModule;
use crate::registry::PageRegistry;

const TEN: Duration = Duration::from_secs(10);

#[test]
fn staleness_timeline() {
  let clock = Arc::new(ManualClock::default());
  let state = RevalidationState::new(clock.clone(), None);

  clock.set(Duration::from_secs(0));
  assert_eq!(state.check("/about", TEN), Decision::Initialized);

  clock.set(Duration::from_secs(5));
  assert_eq!(state.check("/about", TEN), Decision::Fresh);

  clock.set(Duration::from_secs(15));
  assert_eq!(state.check("/about", TEN), Decision::Regenerate);
  assert_eq!(state.check("/about", TEN), Decision::InFlight);
  state.finish("/about", true);

  clock.set(Duration::from_secs(20));
  assert_eq!(state.check("/about", TEN), Decision::Fresh);
  clock.set(Duration::from_secs(26));
  assert_eq!(state.check("/about", TEN), Decision::Regenerate);
}

#[test]
fn interval_is_remembered() {
  let state = RevalidationState::new(Arc::new(ManualClock::default()), None);
  assert_eq!(state.interval("/about"), None);
  state.check("/about", TEN);
  assert_eq!(state.interval("/about"), Some(TEN));
}

#[test]
fn failed_regeneration_retries_next_time() {
  let clock = Arc::new(ManualClock::default());
  let state = RevalidationState::new(clock.clone(), None);
  state.check("/", TEN);
  clock.set(Duration::from_secs(11));
  assert_eq!(state.check("/", TEN), Decision::Regenerate);
  state.finish("/", false);
  assert_eq!(state.check("/", TEN), Decision::Regenerate);
}

#[test]
fn cap_evicts_oldest() {
  let clock = Arc::new(ManualClock::default());
  let state = RevalidationState::new(clock.clone(), Some(2));
  for (i, url) in ["/a", "/b", "/c"].iter().enumerate() {
    clock.set(Duration::from_secs(i as u64));
    state.check(url, TEN);
  }
  assert_eq!(state.len(), 2);
  assert_eq!(state.check("/b", TEN), Decision::Fresh);
  assert_eq!(state.check("/a", TEN), Decision::Initialized);
}

fn renderer(renders: Arc<AtomicUsize>) -> Arc<Renderer> {
  renderer_for(PageModule::new(|state| format!("<p>{}</p>", state.props()["n"])).static_loader(move |_| {
    let n = renders.fetch_add(1, Ordering::SeqCst);
    async move { Ok(LoaderData::new(json!({ "n": n })).revalidate(10)) }
  }))
}

fn renderer_for(index: PageModule) -> Arc<Renderer> {
  let manifest = RouteManifest::new(
    vec![Route { path: "/".into(), page_id: "index".into(), page_path: "app/pages/index.tsx".into() }],
    vec![],
  );
  let mut pages = PageRegistry::new();
  pages.insert("index", index);
  let meta = r#"{"outputs":{".premix/public/build/entry.js":{"entryPoint":"app/entry-client.tsx","imports":[],"inputs":{}}}}"#;
  let assets = MetafileSource::fixed(AssetIndex::parse(meta, ".premix/public", "app/entry-client.tsx").unwrap());
  Arc::new(Renderer::new(Arc::new(manifest), Arc::new(pages), assets))
}

#[tokio::test]
async fn regenerates_html_and_json() {
  let dir = tempfile::tempdir().unwrap();
  let clock = Arc::new(ManualClock::default());
  let renders = Arc::new(AtomicUsize::new(0));
  let revalidator =
    Revalidator::new(renderer(renders.clone()), dir.path(), RevalidationState::new(clock.clone(), None));

  assert_eq!(revalidator.revalidate("/", TEN).await, Decision::Initialized);
  assert!(!dir.path().join("index.html").exists());

  clock.set(Duration::from_secs(15));
  assert_eq!(revalidator.revalidate("/", TEN).await, Decision::Regenerate);
  assert_eq!(renders.load(Ordering::SeqCst), 1);

  let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
  assert!(html.contains("<p>0</p>"));
  let json: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(dir.path().join("_premix/data/index.json")).unwrap()).unwrap();
  assert_eq!(json["data"]["props"]["n"], 0);
  assert!(json.get("headers").is_none());

  assert_eq!(revalidator.revalidate("/", TEN).await, Decision::Fresh);
}

fn exported_site() -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join("index.html"), "<p>exported</p>").unwrap();
  dir
}

async fn eventually(mut done: impl FnMut() -> bool) {
  for _ in 0..200 {
    if done() {
      return;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
  }
  panic!("background revalidation did not finish");
}

#[tokio::test]
async fn adopted_static_output_regenerates_past_its_interval() {
  let dir = exported_site();
  let clock = Arc::new(ManualClock::default());
  let renders = Arc::new(AtomicUsize::new(0));
  let revalidator =
    Revalidator::new(renderer(renders.clone()), dir.path(), RevalidationState::new(clock.clone(), None));

  assert_eq!(revalidator.adopt("/").await, Some(Decision::Initialized));
  assert_eq!(revalidator.state().interval("/"), Some(TEN));
  assert_eq!(std::fs::read_to_string(dir.path().join("index.html")).unwrap(), "<p>exported</p>");

  clock.set(Duration::from_secs(15));
  assert_eq!(revalidator.revalidate("/", TEN).await, Decision::Regenerate);
  assert_eq!(renders.load(Ordering::SeqCst), 2);
  assert!(std::fs::read_to_string(dir.path().join("index.html")).unwrap().contains("<p>1</p>"));
}

#[tokio::test]
async fn static_hits_keep_revalidating_exported_pages() {
  let dir = exported_site();
  let clock = Arc::new(ManualClock::default());
  let renders = Arc::new(AtomicUsize::new(0));
  let revalidator = Arc::new(Revalidator::new(
    renderer(renders.clone()),
    dir.path(),
    RevalidationState::new(clock.clone(), None),
  ));

  revalidator.spawn_static("/".to_string());
  eventually(|| revalidator.state().interval("/").is_some()).await;
  assert_eq!(renders.load(Ordering::SeqCst), 1);

  for (at, expected) in [(15, 2), (30, 3), (45, 4)] {
    clock.set(Duration::from_secs(at));
    revalidator.spawn_static("/".to_string());
    eventually(|| renders.load(Ordering::SeqCst) == expected).await;
    eventually(|| revalidator.state().check("/", TEN) == Decision::Fresh).await;
  }
  let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
  assert!(html.contains("<p>3</p>"), "{html}");
}

#[tokio::test]
async fn pages_without_an_interval_are_adopted_once() {
  let dir = exported_site();
  let renders = Arc::new(AtomicUsize::new(0));
  let counted = renders.clone();
  let index = PageModule::new(|_| "<p>plain</p>".to_string()).static_loader(move |_| {
    counted.fetch_add(1, Ordering::SeqCst);
    async move { Ok(LoaderData::new(json!({}))) }
  });
  let revalidator = Arc::new(Revalidator::new(
    renderer_for(index),
    dir.path(),
    RevalidationState::new(Arc::new(ManualClock::default()), None),
  ));

  assert_eq!(revalidator.adopt("/").await, None);
  revalidator.spawn_static("/".to_string());
  tokio::task::yield_now().await;
  assert_eq!(renders.load(Ordering::SeqCst), 1);
  assert!(revalidator.state().is_empty());
}

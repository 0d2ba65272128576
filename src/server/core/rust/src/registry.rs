/* src/server/core/rust/src/registry.rs */

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::errors::PremixError;
use crate::page::{BoxFuture, PageModule};

type LoadFn = Arc<dyn Fn() -> BoxFuture<Result<PageModule, PremixError>> + Send + Sync>;

enum Entry {
  Ready(Arc<PageModule>),
  Lazy { load: LoadFn, cell: OnceCell<Arc<PageModule>> },
}

/// Page modules keyed by page id. Lazy entries are loaded on first use and
/// kept for the life of the process; concurrent first requests share one load.
#[derive(Default)]
pub struct PageRegistry {
  entries: HashMap<String, Entry>,
}

impl PageRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, page_id: impl Into<String>, module: PageModule) {
    self.entries.insert(page_id.into(), Entry::Ready(Arc::new(module)));
  }

  pub fn insert_lazy<F, Fut>(&mut self, page_id: impl Into<String>, load: F)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageModule, PremixError>> + Send + 'static,
  {
    let load: LoadFn = Arc::new(move || Box::pin(load()));
    self.entries.insert(page_id.into(), Entry::Lazy { load, cell: OnceCell::new() });
  }

  pub fn contains(&self, page_id: &str) -> bool {
    self.entries.contains_key(page_id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Resolve a page module, loading it if needed. A failed load is not
  /// cached, so the next request retries.
  pub async fn get(&self, page_id: &str) -> Result<Arc<PageModule>, PremixError> {
    match self.entries.get(page_id) {
      None => Err(PremixError::internal(format!("no page module registered for '{page_id}'"))),
      Some(Entry::Ready(module)) => Ok(module.clone()),
      Some(Entry::Lazy { load, cell }) => {
        let module = cell.get_or_try_init(|| async { load().await.map(Arc::new) }).await?;
        Ok(module.clone())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  #[tokio::test]
  async fn lazy_module_loads_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let mut registry = PageRegistry::new();
    registry.insert_lazy("about", move || {
      let counter = counter.clone();
      async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(PageModule::new(|_| "about".to_string()))
      }
    });

    let (a, b) = tokio::join!(registry.get("about"), registry.get("about"));
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    registry.get("about").await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn failed_load_retries() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let mut registry = PageRegistry::new();
    registry.insert_lazy("flaky", move || {
      let n = counter.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Err(PremixError::internal("first load fails"))
        } else {
          Ok(PageModule::new(|_| String::new()))
        }
      }
    });
    assert!(registry.get("flaky").await.is_err());
    assert!(registry.get("flaky").await.is_ok());
  }

  #[tokio::test]
  async fn unknown_page() {
    let registry = PageRegistry::new();
    let Err(err) = registry.get("missing").await else {
      panic!("unknown page resolved");
    };
    assert_eq!(err.code(), "INTERNAL_ERROR");
  }
}

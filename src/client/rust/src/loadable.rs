/* src/client/rust/src/loadable.rs */

use std::cell::RefCell;
use std::collections::HashMap;

use premix_engine::Route;

use crate::error::ClientError;
use crate::ModuleImporter;

/// Page modules imported so far, keyed by page id.
pub struct LoadableCache<M> {
  modules: RefCell<HashMap<String, M>>,
}

impl<M: Clone> LoadableCache<M> {
  pub fn new() -> Self {
    Self { modules: RefCell::new(HashMap::new()) }
  }

  pub fn get(&self, page_id: &str) -> Option<M> {
    self.modules.borrow().get(page_id).cloned()
  }

  pub fn contains(&self, page_id: &str) -> bool {
    self.modules.borrow().contains_key(page_id)
  }

  /// Cached module for `route`, importing it on first use.
  pub async fn load<I>(&self, importer: &I, route: &Route) -> Result<M, ClientError>
  where
    I: ModuleImporter<Module = M>,
  {
    if let Some(module) = self.get(&route.page_id) {
      return Ok(module);
    }
    let module = importer.import(route).await?;
    self.modules.borrow_mut().entry(route.page_id.clone()).or_insert_with(|| module.clone());
    Ok(module)
  }
}

impl<M: Clone> Default for LoadableCache<M> {
  fn default() -> Self {
    Self::new()
  }
}

/* src/server/engine/rust/src/links.rs */

use std::collections::HashSet;

use crate::state::LinkDescriptor;

/// Asset URLs resolved from the bundler metafile for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLinks {
  /// Public URL of the client entry chunk.
  pub root_script: String,
  /// Public URL of the page's own chunk, when the bundler emitted one.
  pub page_chunk: Option<String>,
  /// Chunks the client entry imports statically, transitively.
  pub root_imports: Vec<String>,
  pub stylesheet: Option<String>,
}

/// Final link list for a page: module preloads (root entry, page chunk,
/// transitive imports), then the page stylesheet, then page-declared links.
/// Script preloads are left out when the page ships no JavaScript.
pub fn assemble_links(assets: &AssetLinks, page_links: Vec<LinkDescriptor>, no_js: bool) -> Vec<LinkDescriptor> {
  let mut links = Vec::with_capacity(page_links.len() + assets.root_imports.len() + 3);
  if !no_js {
    links.push(LinkDescriptor::module_preload(&assets.root_script));
    if let Some(chunk) = &assets.page_chunk {
      links.push(LinkDescriptor::module_preload(chunk));
    }
    links.extend(assets.root_imports.iter().map(LinkDescriptor::module_preload));
  }
  if let Some(css) = &assets.stylesheet {
    links.push(LinkDescriptor::stylesheet(css));
  }
  links.extend(page_links);
  unique_links(links)
}

/// Keep the first occurrence of each href.
pub fn unique_links(links: Vec<LinkDescriptor>) -> Vec<LinkDescriptor> {
  let mut seen = HashSet::new();
  links.into_iter().filter(|link| seen.insert(link.href.clone())).collect()
}

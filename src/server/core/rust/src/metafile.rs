/* src/server/core/rust/src/metafile.rs */

// Bundler metafile (esbuild `meta.json`) indexing: which chunks the client
// entry pulls in, which chunk belongs to a page source, and which stylesheet
// was bundled alongside it.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use premix_engine::AssetLinks;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::config::{Mode, ServerOptions};
use crate::errors::PremixError;

const STALE_BUILD: &str = "build artifacts missing or stale: rerun `premix build`";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metafile {
  #[serde(default)]
  pub inputs: BTreeMap<String, Value>,
  #[serde(default)]
  pub outputs: BTreeMap<String, MetafileOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafileOutput {
  #[serde(default)]
  pub entry_point: Option<String>,
  #[serde(default)]
  pub imports: Vec<ImportEdge>,
  #[serde(default)]
  pub inputs: BTreeMap<String, Value>,
  #[serde(default)]
  pub css_bundle: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportEdge {
  pub path: String,
  pub kind: String,
}

impl Metafile {
  pub fn parse(json: &str) -> Result<Self, PremixError> {
    serde_json::from_str(json)
      .map_err(|e| PremixError::configuration(format!("invalid bundler metafile: {STALE_BUILD}")).caused_by(&e))
  }

  /// Output chunk whose entry point is `source`.
  pub fn chunk_for(&self, source: &str) -> Option<&str> {
    self
      .outputs
      .iter()
      .find(|(_, out)| out.entry_point.as_deref() == Some(source))
      .map(|(name, _)| name.as_str())
  }

  /// Transitive `import-statement` closure of `chunk`, excluding `chunk`
  /// itself, in first-visit order. Cycles are visited once.
  pub fn static_imports(&self, chunk: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::from([chunk]);
    let mut order = Vec::new();
    let mut queue = VecDeque::from([chunk]);
    while let Some(current) = queue.pop_front() {
      let Some(output) = self.outputs.get(current) else {
        continue;
      };
      for edge in output.imports.iter().filter(|e| e.kind == "import-statement") {
        if seen.insert(edge.path.as_str()) {
          order.push(edge.path.clone());
          queue.push_back(edge.path.as_str());
        }
      }
    }
    order
  }

  /// Stylesheet emitted for the same page as `chunk`: the output's
  /// `cssBundle` when recorded, else a `.css` output sharing the chunk's stem.
  pub fn stylesheet_for(&self, chunk: &str) -> Option<&str> {
    let output = self.outputs.get(chunk)?;
    if let Some(css) = output.css_bundle.as_deref() {
      return Some(css);
    }

    let stem = chunk.rsplit_once('.').map_or(chunk, |(stem, _)| stem);
    let exact = format!("{stem}.css");
    self.outputs.get_key_value(exact.as_str()).map(|(name, _)| name.as_str())
  }

  /// Stylesheet for a page source: the output that consumed the source
  /// (its entry chunk first), then its paired stylesheet.
  pub fn stylesheet_for_source(&self, source: &str) -> Option<&str> {
    let chunk = self.chunk_for(source).or_else(|| {
      self
        .outputs
        .iter()
        .find(|(name, out)| !name.ends_with(".css") && out.inputs.contains_key(source))
        .map(|(name, _)| name.as_str())
    })?;
    self.stylesheet_for(chunk)
  }
}

/// Metafile plus the values every request needs, with chunk paths already
/// mapped to public URLs.
#[derive(Debug, Clone)]
pub struct AssetIndex {
  metafile: Metafile,
  public_dir: String,
  root_script: String,
  root_imports: Vec<String>,
}

impl AssetIndex {
  /// Fails when the client entry has no output chunk.
  pub fn new(metafile: Metafile, public_dir: &str, client_entry: &str) -> Result<Self, PremixError> {
    let public_dir = public_dir.replace('\\', "/").trim_start_matches("./").trim_end_matches('/').to_string();
    let root_chunk = metafile
      .chunk_for(client_entry)
      .ok_or_else(|| {
        PremixError::configuration(STALE_BUILD).context(format!("no output chunk for client entry '{client_entry}'"))
      })?
      .to_string();
    let mut index = Self { metafile, public_dir, root_script: String::new(), root_imports: Vec::new() };
    index.root_script = index.public_url(&root_chunk);
    index.root_imports =
      index.metafile.static_imports(&root_chunk).iter().map(|chunk| index.public_url(chunk)).collect();
    Ok(index)
  }

  pub fn parse(json: &str, public_dir: &str, client_entry: &str) -> Result<Self, PremixError> {
    Self::new(Metafile::parse(json)?, public_dir, client_entry)
  }

  pub fn metafile(&self) -> &Metafile {
    &self.metafile
  }

  /// Public URL of the client entry chunk.
  pub fn root_script(&self) -> &str {
    &self.root_script
  }

  pub fn root_imports(&self) -> &[String] {
    &self.root_imports
  }

  /// Strip the public directory from a chunk path.
  pub fn public_url(&self, chunk: &str) -> String {
    let chunk = chunk.replace('\\', "/");
    let chunk = chunk.trim_start_matches("./");
    let rest = if self.public_dir.is_empty() { chunk } else { chunk.strip_prefix(&self.public_dir).unwrap_or(chunk) };
    if rest.starts_with('/') { rest.to_string() } else { format!("/{rest}") }
  }

  /// Asset URLs for the page whose source is `page_path`.
  pub fn assets_for(&self, page_path: &str) -> AssetLinks {
    let page_chunk = self.metafile.chunk_for(page_path);
    let stylesheet = self.metafile.stylesheet_for_source(page_path);
    if stylesheet.is_none() {
      tracing::debug!(page = page_path, "no stylesheet bundled for page");
    }
    AssetLinks {
      root_script: self.root_script.clone(),
      page_chunk: page_chunk.map(|c| self.public_url(c)),
      root_imports: self.root_imports.clone(),
      stylesheet: stylesheet.map(|c| self.public_url(c)),
    }
  }
}

enum Source {
  Fixed(Arc<AssetIndex>),
  File { path: PathBuf, public_dir: String, client_entry: String, mode: Mode, cache: OnceCell<Arc<AssetIndex>> },
}

/// Where the renderer gets its asset index from. Development re-reads the
/// metafile on every call so rebuilds are picked up; production reads once.
pub struct MetafileSource {
  source: Source,
}

impl MetafileSource {
  pub fn from_options(options: &ServerOptions) -> Self {
    Self {
      source: Source::File {
        path: options.metafile_path(),
        public_dir: options.public_dir.to_string_lossy().into_owned(),
        client_entry: options.client_entry.clone(),
        mode: options.mode,
        cache: OnceCell::new(),
      },
    }
  }

  pub fn fixed(index: AssetIndex) -> Self {
    Self { source: Source::Fixed(Arc::new(index)) }
  }

  pub async fn index(&self) -> Result<Arc<AssetIndex>, PremixError> {
    match &self.source {
      Source::Fixed(index) => Ok(index.clone()),
      Source::File { path, public_dir, client_entry, mode, cache } => {
        if mode.is_dev() {
          return read_index(path, public_dir, client_entry).await.map(Arc::new);
        }
        let index = cache.get_or_try_init(|| async { read_index(path, public_dir, client_entry).await.map(Arc::new) }).await?;
        Ok(index.clone())
      }
    }
  }
}

async fn read_index(path: &Path, public_dir: &str, client_entry: &str) -> Result<AssetIndex, PremixError> {
  let json = tokio::fs::read_to_string(path)
    .await
    .map_err(|e| PremixError::configuration(STALE_BUILD).context(format!("reading {}", path.display())).caused_by(&e))?;
  AssetIndex::parse(&json, public_dir, client_entry)
}

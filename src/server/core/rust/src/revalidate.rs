/* src/server/core/rust/src/revalidate.rs */

// Stale-while-revalidate for static-loader pages. The first request for a URL
// only starts the clock; a later request past the interval regenerates the
// static HTML and JSON in the background while the current response goes out.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::errors::PremixError;
use crate::export::write_page;
use crate::http::PageRequest;
use crate::render::Renderer;

pub trait Clock: Send + Sync {
  /// Monotonic time since an arbitrary fixed origin.
  fn now(&self) -> Duration;
}

pub struct SystemClock {
  origin: Instant,
}

impl Default for SystemClock {
  fn default() -> Self {
    Self { origin: Instant::now() }
  }
}

impl Clock for SystemClock {
  fn now(&self) -> Duration {
    self.origin.elapsed()
  }
}

/// Clock advanced by hand, for tests.
#[derive(Default)]
pub struct ManualClock {
  now: Mutex<Duration>,
}

impl ManualClock {
  pub fn set(&self, at: Duration) {
    if let Ok(mut now) = self.now.lock() {
      *now = at;
    }
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Duration {
    self.now.lock().map(|now| *now).unwrap_or_default()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  /// First sighting of the URL; the timestamp was recorded.
  Initialized,
  /// Within the interval.
  Fresh,
  /// Past the interval; the caller now owns regeneration and must call
  /// [`RevalidationState::finish`].
  Regenerate,
  /// Another regeneration for this URL is running.
  InFlight,
}

struct Entry {
  last: Duration,
  interval: Duration,
  regenerating: bool,
}

/// Per-URL regeneration timestamps. The lock is never held across `.await`.
pub struct RevalidationState {
  entries: Mutex<HashMap<String, Entry>>,
  clock: Arc<dyn Clock>,
  cap: Option<usize>,
}

impl RevalidationState {
  pub fn new(clock: Arc<dyn Clock>, cap: Option<usize>) -> Self {
    Self { entries: Mutex::new(HashMap::new()), clock, cap }
  }

  pub fn check(&self, url: &str, interval: Duration) -> Decision {
    let now = self.clock.now();
    let Ok(mut entries) = self.entries.lock() else {
      return Decision::Fresh;
    };
    let Some(entry) = entries.get_mut(url) else {
      if let Some(cap) = self.cap {
        evict_oldest(&mut entries, cap.saturating_sub(1));
      }
      entries.insert(url.to_string(), Entry { last: now, interval, regenerating: false });
      return Decision::Initialized;
    };
    entry.interval = interval;
    if entry.regenerating {
      Decision::InFlight
    } else if now.saturating_sub(entry.last) > interval {
      entry.regenerating = true;
      Decision::Regenerate
    } else {
      Decision::Fresh
    }
  }

  /// Interval last declared for `url`, if it is tracked. Lets a request
  /// answered from static output still drive revalidation.
  pub fn interval(&self, url: &str) -> Option<Duration> {
    self.entries.lock().ok()?.get(url).map(|e| e.interval)
  }

  /// Clear the in-flight flag. Success also restarts the interval.
  pub fn finish(&self, url: &str, success: bool) {
    let now = self.clock.now();
    if let Ok(mut entries) = self.entries.lock()
      && let Some(entry) = entries.get_mut(url)
    {
      entry.regenerating = false;
      if success {
        entry.last = now;
      }
    }
  }

  pub fn len(&self) -> usize {
    self.entries.lock().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn evict_oldest(entries: &mut HashMap<String, Entry>, keep: usize) {
  while entries.len() > keep {
    let oldest = entries.iter().filter(|(_, e)| !e.regenerating).min_by_key(|(_, e)| e.last).map(|(k, _)| k.clone());
    match oldest {
      Some(key) => {
        entries.remove(&key);
      }
      None => break,
    }
  }
}

/// Drives regeneration: state check, re-render, persist to the static
/// output directory.
pub struct Revalidator {
  state: RevalidationState,
  renderer: Arc<Renderer>,
  public_dir: PathBuf,
  /// URLs whose static output is being adopted.
  adopting: Mutex<HashSet<String>>,
  /// URLs whose page declared no interval when adopted.
  settled: Mutex<HashSet<String>>,
}

impl Revalidator {
  pub fn new(renderer: Arc<Renderer>, public_dir: impl Into<PathBuf>, state: RevalidationState) -> Self {
    Self {
      state,
      renderer,
      public_dir: public_dir.into(),
      adopting: Mutex::new(HashSet::new()),
      settled: Mutex::new(HashSet::new()),
    }
  }

  pub fn state(&self) -> &RevalidationState {
    &self.state
  }

  /// Check `url` and regenerate it if stale. Returns the decision taken.
  pub async fn revalidate(&self, url: &str, interval: Duration) -> Decision {
    let decision = self.state.check(url, interval);
    if decision != Decision::Regenerate {
      return decision;
    }
    let result = self.regenerate(url).await;
    if let Err(err) = &result {
      tracing::error!(url, error = %err, chain = ?err.chain(), "error during regenerating page");
    } else {
      tracing::info!(url, "regenerated page");
    }
    self.state.finish(url, result.is_ok());
    decision
  }

  async fn regenerate(&self, url: &str) -> Result<(), PremixError> {
    let page = self.renderer.render(PageRequest::get(url)).await?;
    if !page.is_static() {
      return Ok(());
    }
    let html = self.renderer.document(&page);
    write_page(&self.public_dir, &page_path(url), &html, &page.state).await
  }

  /// Fire-and-forget revalidation after a response.
  pub fn spawn(self: &Arc<Self>, url: String, interval: Duration) {
    let this = self.clone();
    tokio::spawn(async move {
      this.revalidate(&url, interval).await;
    });
  }

  /// Revalidation for a request answered from static output. A tracked URL
  /// goes through [`Revalidator::spawn`] with its recorded interval. An
  /// untracked one (output from `export` or an earlier process) is adopted in
  /// the background.
  pub fn spawn_static(self: &Arc<Self>, url: String) {
    if let Some(interval) = self.state.interval(&url) {
      self.spawn(url, interval);
      return;
    }
    if contains(&self.settled, &url) || !insert(&self.adopting, &url) {
      return;
    }
    let this = self.clone();
    tokio::spawn(async move {
      this.adopt(&url).await;
      if let Ok(mut adopting) = this.adopting.lock() {
        adopting.remove(&url);
      }
    });
  }

  /// Render `url` once to learn its interval and start its clock. A page
  /// that no longer revalidates is remembered and left alone.
  pub async fn adopt(&self, url: &str) -> Option<Decision> {
    let page = match self.renderer.render(PageRequest::get(url)).await {
      Ok(page) => page,
      Err(err) => {
        tracing::error!(url, error = %err, chain = ?err.chain(), "error during adopting static page");
        return None;
      }
    };
    match page.revalidate().filter(|_| page.is_static()) {
      Some(seconds) => {
        tracing::debug!(url, seconds, "tracking static page");
        Some(self.state.check(url, Duration::from_secs(seconds)))
      }
      None => {
        insert(&self.settled, url);
        None
      }
    }
  }
}

fn contains(set: &Mutex<HashSet<String>>, url: &str) -> bool {
  set.lock().map(|s| s.contains(url)).unwrap_or(false)
}

fn insert(set: &Mutex<HashSet<String>>, url: &str) -> bool {
  set.lock().map(|mut s| s.insert(url.to_string())).unwrap_or(false)
}

fn page_path(url: &str) -> String {
  crate::http::split_url(url).0
}

#[cfg(test)]
mod tests;

/* demo/server-rust/src/posts.rs */

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
  pub slug: &'static str,
  pub title: &'static str,
  pub summary: &'static str,
  pub body: &'static str,
}

const POSTS: &[Post] = &[
  Post {
    slug: "hello-premix",
    title: "Hello, Premix",
    summary: "Pages are files, loaders run on the server.",
    body: "Every file under app/pages becomes a route. Dynamic segments start with a dollar sign.",
  },
  Post {
    slug: "revalidation",
    title: "Stale while revalidate",
    summary: "Static pages that refresh themselves.",
    body: "A static loader may return a revalidate interval. The cached page is served until it expires.",
  },
];

pub fn list() -> &'static [Post] {
  POSTS
}

pub fn find(slug: &str) -> Option<&'static Post> {
  POSTS.iter().find(|p| p.slug == slug)
}

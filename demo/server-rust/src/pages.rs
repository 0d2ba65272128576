/* demo/server-rust/src/pages.rs */

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use premix_server::premix_engine::escape_html;
use premix_server::{HttpResponse, LoaderData, PageModule, PageState, Params, PremixError};
use serde_json::{json, Value};

use crate::posts;

pub type Guestbook = Arc<Mutex<Vec<String>>>;

fn title(value: &str) -> BTreeMap<String, String> {
  BTreeMap::from([("title".to_string(), value.to_string())])
}

fn str_prop<'a>(state: &'a PageState, pointer: &str) -> &'a str {
  state.props().pointer(pointer).and_then(Value::as_str).unwrap_or_default()
}

pub fn index() -> PageModule {
  PageModule::new(|state| {
    let items: String = state
      .props()
      .get("posts")
      .and_then(Value::as_array)
      .into_iter()
      .flatten()
      .map(|post| {
        let slug = post.get("slug").and_then(Value::as_str).unwrap_or_default();
        let title = post.get("title").and_then(Value::as_str).unwrap_or_default();
        format!("<li><a href=\"/{}\">{}</a></li>", escape_html(slug), escape_html(title))
      })
      .collect();
    format!("<ul>{items}</ul>")
  })
  .meta(|_| title("Premix demo"))
  .static_loader(|_| async { Ok(LoaderData::new(json!({ "posts": posts::list() })).revalidate(60)) })
}

pub fn post() -> PageModule {
  PageModule::new(|state| {
    format!(
      "<article><h1>{}</h1><p>{}</p></article>",
      escape_html(str_prop(state, "/post/title")),
      escape_html(str_prop(state, "/post/body")),
    )
  })
  .meta(|props| {
    let mut meta = title(props.pointer("/post/title").and_then(Value::as_str).unwrap_or("Post"));
    if let Some(summary) = props.pointer("/post/summary").and_then(Value::as_str) {
      meta.insert("description".to_string(), summary.to_string());
    }
    meta
  })
  .load_paths(|| async {
    Ok(posts::list().iter().map(|p| Params::from([("post".to_string(), p.slug.to_string())])).collect())
  })
  .static_loader(|ctx| async move {
    let slug = ctx.params.get("post").map(String::as_str).unwrap_or_default();
    let post = posts::find(slug).ok_or_else(|| PremixError::not_found(format!("no post named {slug}")))?;
    Ok(LoaderData::new(json!({ "post": post })))
  })
}

pub fn guestbook(book: &Guestbook) -> PageModule {
  let read = book.clone();
  let write = book.clone();
  PageModule::new(|state| {
    let entries: String = state
      .props()
      .get("entries")
      .and_then(Value::as_array)
      .into_iter()
      .flatten()
      .filter_map(Value::as_str)
      .map(|name| format!("<li>{}</li>", escape_html(name)))
      .collect();
    format!("<form method=\"post\"><input name=\"name\"><button>Sign</button></form><ul>{entries}</ul>")
  })
  .meta(|_| title("Guestbook"))
  .headers(|_| BTreeMap::from([("cache-control".to_string(), "no-store".to_string())]))
  .server_loader(move |_| {
    let book = read.clone();
    async move {
      let entries = book.lock().map_err(|_| PremixError::internal("guestbook lock poisoned"))?.clone();
      Ok(LoaderData::new(json!({ "entries": entries })))
    }
  })
  .action(move |req| {
    let book = write.clone();
    async move {
      let name = req.form().get("name").map(|n| n.trim().to_string()).unwrap_or_default();
      if name.is_empty() {
        return Err(PremixError::bad_request("name is required"));
      }
      book.lock().map_err(|_| PremixError::internal("guestbook lock poisoned"))?.push(name);
      Ok(HttpResponse::redirect("/guestbook"))
    }
  })
}

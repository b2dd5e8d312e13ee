//! Upload page.

use std::fmt::Write;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::extract::Store;
use crate::handler::Result;
use crate::service::ServiceState;
use crate::service::store::StoredObject;
use crate::streaming::MediaPolicy;

/// Tracing target for the upload page.
const TRACING_TARGET: &str = "filecast_server::handler::index";

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>filecast</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }
li { margin-bottom: 1.5rem; }
img, video { display: block; max-width: 100%; margin-bottom: .5rem; }
</style>
</head>
<body>
<h1>filecast</h1>
<form action="/upload" method="POST" enctype="multipart/form-data">
<input type="file" name="file" required>
<button type="submit">Upload</button>
</form>
<hr>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

#[tracing::instrument(skip_all)]
async fn index(Store(store): Store) -> Result<Html<String>> {
    let objects = store.find().await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = objects.len(),
        "Rendering upload page"
    );

    Ok(Html(render_page(&objects)))
}

fn render_page(objects: &[StoredObject]) -> String {
    let mut page = String::from(PAGE_HEAD);

    if objects.is_empty() {
        page.push_str("<p>No files to show</p>\n");
    } else {
        page.push_str("<ul>\n");
        for object in objects {
            render_entry(&mut page, object);
        }
        page.push_str("</ul>\n");
    }

    page.push_str(PAGE_TAIL);
    page
}

fn render_entry(page: &mut String, object: &StoredObject) {
    let name = escape_html(&object.name);
    let id = escape_html(object.id.as_str());

    page.push_str("<li>\n");
    // Writing into a String cannot fail.
    let _ = if MediaPolicy::IMAGE.allows(&object.media_type) {
        writeln!(page, r#"<img src="/image/{name}" alt="{name}">"#)
    } else if MediaPolicy::VIDEO.allows(&object.media_type) {
        writeln!(page, r#"<video src="/video/{name}" controls preload="metadata"></video>"#)
    } else {
        writeln!(page, r#"<a href="/files/{name}">{name}</a>"#)
    };
    let _ = writeln!(
        page,
        r#"<small>{name} &middot; {} bytes</small>
<form method="POST" action="/files/{id}?_method=DELETE">
<button type="submit">Delete</button>
</form>"#,
        object.size_bytes
    );
    page.push_str("</li>\n");
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Returns a [`Router`] with the upload page.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::{create_test_server, seed};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[tokio::test]
    async fn empty_page_has_upload_form() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/").await;
        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="file""#));
        assert!(html.contains("No files to show"));
        Ok(())
    }

    #[tokio::test]
    async fn lists_images_videos_and_other_files() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let image = seed(&*store, "abc.png", "image/png", vec![1; 10]).await?;
        seed(&*store, "v1.mp4", "video/mp4", vec![2; 10]).await?;
        seed(&*store, "notes.txt", "text/plain", vec![3; 10]).await?;

        let html = server.get("/").await.text();
        assert!(html.contains(r#"<img src="/image/abc.png""#));
        assert!(html.contains(r#"<video src="/video/v1.mp4""#));
        assert!(html.contains(r#"<a href="/files/notes.txt">"#));
        assert!(html.contains(&format!(r#"action="/files/{}?_method=DELETE""#, image.id)));
        assert!(!html.contains("No files to show"));
        Ok(())
    }
}

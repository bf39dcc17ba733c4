//! Router checks against a temporary blog

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use inkpress::server::{router, ServerState};
use inkpress::Blog;

fn app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let posts = dir.path().join("posts");
    fs::create_dir_all(&posts).unwrap();
    fs::write(
        posts.join("a.mdx"),
        "---\nname: Post A\ndate: 2023-01-05\n---\n# Hello\n",
    )
    .unwrap();
    fs::write(posts.join("b.mdx"), "---\nname: Post B\nhidden: true\n---\nshh\n").unwrap();
    fs::write(posts.join("robots.txt"), "User-agent: *\n").unwrap();

    let blog = Blog::new(dir.path()).unwrap();
    let state = Arc::new(ServerState::new(&blog).unwrap());
    (dir, router(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_feed_route() {
    let (_dir, app) = app();
    let (status, content_type, body) = get(&app, "/feed.atom").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert_eq!(body.matches("<entry>").count(), 1);
    assert!(body.contains("Post A"));
    assert!(!body.contains("Post B"));

    // Serving again must not duplicate entries
    let (_, _, again) = get(&app, "/feed.atom").await;
    assert_eq!(again, body);
}

#[tokio::test]
async fn test_post_pages() {
    let (_dir, app) = app();
    let (status, _, body) = get(&app, "/a").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<h1 id="hello">Hello</h1>"#));
    assert!(!body.contains("this post is hidden"));

    let (status, _, body) = get(&app, "/b").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("this post is hidden"));
}

#[tokio::test]
async fn test_unknown_slug_is_404() {
    let (_dir, app) = app();
    let (status, _, body) = get(&app, "/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("nothing-here"));
}

#[tokio::test]
async fn test_index_and_assets() {
    let (_dir, app) = app();
    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Post A"));
    assert!(!body.contains("Post B"));

    let (status, _, body) = get(&app, "/robots.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User-agent: *\n");

    // Sources are never served raw
    let (status, _, _) = get(&app, "/a.mdx").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests() {
    let (_dir, app) = app();
    let (post, feed, index) = tokio::join!(get(&app, "/a"), get(&app, "/feed.atom"), get(&app, "/"));
    assert_eq!(post.0, StatusCode::OK);
    assert!(post.2.contains("Post A"));
    assert_eq!(feed.0, StatusCode::OK);
    assert_eq!(feed.2.matches("<entry>").count(), 1);
    assert_eq!(index.0, StatusCode::OK);
}

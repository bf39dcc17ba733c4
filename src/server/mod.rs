//! Development server rendering pages on demand

use anyhow::Result;
use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinError;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::loader::PostLoader;
use crate::content::{post_slug, ContentError, DocumentCompiler, PostIndex};
use crate::feed::Feed;
use crate::templates::PageRenderer;
use crate::Blog;

/// Server state, shared by every request
pub struct ServerState {
    blog: Blog,
    index: PostIndex,
    compiler: DocumentCompiler,
    renderer: PageRenderer,
    feed: RwLock<Feed>,
}

impl ServerState {
    /// Scan the content directory and prepare the shared render pipeline
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            index: blog.scan_index()?,
            compiler: blog.compiler(),
            renderer: PageRenderer::new(&blog.config)?,
            feed: RwLock::new(Feed::new(&blog.config)),
        })
    }

    fn loader(&self) -> PostLoader<'_> {
        PostLoader::new(&self.blog, &self.index)
    }
}

/// Build the router for the given state
pub fn router(state: Arc<ServerState>) -> Router {
    let feed_route = format!("/{}", state.blog.config.feed.path.trim_start_matches('/'));
    Router::new()
        .route("/", get(index_handler))
        .route(&feed_route, get(feed_handler))
        .route("/:slug", get(post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(blog)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run file reads and compilation on the blocking pool
async fn blocking<T, F>(
    state: &Arc<ServerState>,
    work: F,
) -> Result<Result<T, ContentError>, JoinError>
where
    T: Send + 'static,
    F: FnOnce(&ServerState) -> Result<T, ContentError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state)).await
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let posts = match blocking(&state, |s| s.loader().load_public_posts()).await {
        Ok(Ok(posts)) => posts,
        Ok(Err(e)) => return content_error(&state, None, e),
        Err(e) => return internal_error(e.into()),
    };
    match state.renderer.render_index(&posts) {
        Ok(html) => Html(html).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    request: Request,
) -> Response {
    let key = slug.clone();
    let rendered = match blocking(&state, move |s| s.loader().render_post(&key, &s.compiler)).await
    {
        Ok(Ok(rendered)) => rendered,
        // Top-level files such as `/favicon.ico` share the route with posts
        Ok(Err(e)) if e.is_not_found() => return serve_asset(&state, request, Some(&slug)).await,
        Ok(Err(e)) => return content_error(&state, Some(&slug), e),
        Err(e) => return internal_error(e.into()),
    };
    match state.renderer.render_post(&rendered) {
        Ok(html) => Html(html).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Repopulate the shared feed from the corpus and serve it
async fn feed_handler(State(state): State<Arc<ServerState>>) -> Response {
    let posts = match blocking(&state, |s| s.loader().load_posts()).await {
        Ok(Ok(posts)) => posts,
        Ok(Err(e)) => return content_error(&state, None, e),
        Err(e) => return internal_error(e.into()),
    };

    let xml = {
        let mut feed = state.feed.write().await;
        feed.add_posts(&posts, &state.blog.config);
        feed.to_atom()
    };

    match xml {
        Ok(xml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/xml")], xml).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Serve files from the content directory
async fn fallback_handler(State(state): State<Arc<ServerState>>, request: Request) -> Response {
    serve_asset(&state, request, None).await
}

async fn serve_asset(state: &ServerState, request: Request, slug: Option<&str>) -> Response {
    // Post sources are only ever served compiled
    if post_slug(std::path::Path::new(request.uri().path())).is_some() {
        return not_found(state, slug);
    }

    let mut service = ServeDir::new(&state.blog.content_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(state, slug),
        Ok(response) => response.into_response(),
        Err(e) => internal_error(e.into()),
    }
}

fn content_error(state: &ServerState, slug: Option<&str>, err: ContentError) -> Response {
    if !err.is_not_found() {
        return internal_error(err.into());
    }

    tracing::debug!("{}", err);
    not_found(state, slug)
}

fn not_found(state: &ServerState, slug: Option<&str>) -> Response {
    match state.renderer.render_not_found(slug) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    tracing::error!("{:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

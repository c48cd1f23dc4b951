//! Development server with preview mode and on-demand rendering

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::gateway::PreviewRef;
use crate::generator::Generator;
use crate::helpers::{is_valid_slug, url_for};
use crate::Blog;

/// Cookie carrying the preview ref between requests
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Server state
struct ServerState {
    blog: Blog,
    generator: Generator,
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    token: Option<String>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

/// Start the development server.
///
/// With `revalidate` the site is regenerated every `config.revalidate` seconds.
pub async fn start(blog: &Blog, ip: &str, port: u16, revalidate: bool, open: bool) -> Result<()> {
    let state = Arc::new(ServerState {
        blog: blog.clone(),
        generator: Generator::new(blog)?,
    });

    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if revalidate && blog.config.revalidate > 0 {
        let period = Duration::from_secs(blog.config.revalidate);
        tokio::spawn(revalidate_periodically(state, period));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    let config = state.blog.config.clone();
    let config = &config;
    let post_route = url_for(config, &format!("{}/:uid", config.post_dir.trim_matches('/')));

    Router::new()
        .route(&url_for(config, "api/preview"), get(preview_handler))
        .route(&url_for(config, "api/exit-preview"), get(exit_preview_handler))
        .route(&url_for(config, ""), get(index_handler))
        .route(&url_for(config, "index.html"), get(index_handler))
        .route(&post_route, get(post_handler))
        .route(&format!("{}/", post_route), get(post_handler))
        .route(&format!("{}/index.html", post_route), get(post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Regenerate the site on a fixed period until the server stops
async fn revalidate_periodically(state: Arc<ServerState>, period: Duration) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        interval.tick().await;
        tracing::info!("Revalidating...");
        match state.generator.generate().await {
            Ok(written) => tracing::info!("Revalidated {} posts", written),
            Err(e) => tracing::error!("Revalidation failed: {:#}", e),
        }
    }
}

/// Enter preview mode: store the token in a cookie and jump to the document
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PreviewParams>,
) -> Response {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return (StatusCode::UNAUTHORIZED, "Invalid preview token").into_response();
    };
    let preview = PreviewRef::new(token);

    let mut location = url_for(&state.blog.config, "");
    if let Some(id) = params.document_id.as_deref() {
        match state.blog.gateway.get_by_id(id, Some(&preview)).await {
            Ok(Some(document)) => {
                if let Some(uid) = document.uid.as_deref().filter(|u| is_valid_slug(u)) {
                    location = state.generator.post_url(uid);
                }
            }
            Ok(None) => tracing::warn!("Preview document {} not found", id),
            Err(e) => {
                tracing::error!("Failed to resolve preview document {}: {}", id, e);
                return (StatusCode::BAD_GATEWAY, "Failed to resolve preview").into_response();
            }
        }
    }

    tracing::info!("Preview mode on, redirecting to {}", location);
    (
        [(header::SET_COOKIE, preview_cookie(&preview))],
        Redirect::to(&location),
    )
        .into_response()
}

/// Leave preview mode
async fn exit_preview_handler(State(state): State<Arc<ServerState>>) -> Response {
    (
        [(header::SET_COOKIE, expired_preview_cookie())],
        Redirect::to(&url_for(&state.blog.config, "")),
    )
        .into_response()
}

async fn index_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if let Some(preview) = preview_from_headers(&headers) {
        return match state.generator.render_index(Some(&preview)).await {
            Ok(html) => Html(html).into_response(),
            Err(e) => server_error(e),
        };
    }

    let path = state.blog.public_dir.join("index.html");
    if let Some(html) = read_page(&path).await {
        return Html(html).into_response();
    }

    match state.generator.render_index(None).await {
        Ok(html) => {
            if let Err(e) = write_page(&path, &html).await {
                tracing::warn!("Failed to store {:?}: {}", path, e);
            }
            Html(html).into_response()
        }
        Err(e) => server_error(e),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Response {
    let preview = preview_from_headers(&headers);
    if !is_valid_slug(&uid) {
        return not_found(&state, preview.as_ref());
    }

    if let Some(preview) = preview {
        return match state.generator.render_post(&uid, Some(&preview)).await {
            Ok(Some(html)) => Html(html).into_response(),
            Ok(None) => not_found(&state, Some(&preview)),
            Err(e) => server_error(e),
        };
    }

    let path = state
        .blog
        .public_dir
        .join(state.blog.config.post_dir.trim_matches('/'))
        .join(&uid)
        .join("index.html");
    if let Some(html) = read_page(&path).await {
        return Html(html).into_response();
    }

    // Not generated yet: render now and keep it for the next request
    match state.generator.render_post(&uid, None).await {
        Ok(Some(html)) => {
            if let Err(e) = state.generator.write_post(&uid, &html) {
                tracing::warn!("Failed to store post {}: {}", uid, e);
            }
            Html(html).into_response()
        }
        Ok(None) => not_found(&state, None),
        Err(e) => server_error(e),
    }
}

/// Serve everything else from the public directory
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let preview = preview_from_headers(request.headers());
    let mut service = ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            not_found(&state, preview.as_ref())
        }
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

fn not_found(state: &ServerState, preview: Option<&PreviewRef>) -> Response {
    match state.generator.render_not_found(preview) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn server_error(error: anyhow::Error) -> Response {
    tracing::error!("Request failed: {:#}", error);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

async fn read_page(path: &std::path::Path) -> Option<String> {
    tokio::fs::read_to_string(path).await.ok()
}

async fn write_page(path: &std::path::Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await
}

/// Preview ref from the request cookies, if preview mode is on
fn preview_from_headers(headers: &HeaderMap) -> Option<PreviewRef> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == PREVIEW_COOKIE)
        .and_then(|(_, value)| percent_decode_str(value).decode_utf8().ok())
        .filter(|value| !value.is_empty())
        .map(|value| PreviewRef::new(value.into_owned()))
}

fn preview_cookie(preview: &PreviewRef) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        PREVIEW_COOKIE,
        utf8_percent_encode(preview.as_str(), NON_ALPHANUMERIC)
    )
}

fn expired_preview_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", PREVIEW_COOKIE)
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

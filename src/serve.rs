//! Live reload preview server.
//!
//! Serves the project root over HTTP, rebuilds the site when watched inputs
//! change, and tells open pages to reload through Server-Sent Events on
//! `GET /__livereload`. HTML responses get a small script injected that
//! listens on that stream.

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

use crate::generators::{BuildReport, Project, build_site};
use crate::pages::{build_error_page, inject_reload_script, not_found_page};
use crate::watch::Watcher;

/// Path of the reload event stream.
pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Preview server settings.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub open_browser: bool,
}

impl ServeOptions {
    /// Bind address in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// State shared between request handlers and the watcher thread.
pub struct ServerState {
    root: PathBuf,
    reload_tx: broadcast::Sender<u64>,
    last_error: RwLock<Option<String>>,
    shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(root: impl Into<PathBuf>) -> Arc<Self> {
        let (reload_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            root: root.into(),
            reload_tx,
            last_error: RwLock::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    /// Records the outcome of a build so HTML requests reflect it.
    pub fn record_build(&self, outcome: &Result<BuildReport>) {
        let message = match outcome {
            Ok(report) => {
                info!("Built {} pages", report.page_count());
                None
            }
            Err(e) => {
                error!("Build failed: {:#}", e);
                Some(format!("{:#}", e))
            }
        };
        *self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Message of the last failed build, if the last build failed.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifies connected pages that rebuild `generation` finished.
    pub fn notify_reload(&self, generation: u64) {
        // No receivers just means no page is open.
        let _ = self.reload_tx.send(generation);
    }

    /// Ends open event streams and stops the watcher.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Builds the router: the reload stream plus static files from the root.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(LIVERELOAD_PATH, get(handle_livereload))
        .fallback(handle_static)
        .with_state(state)
}

/// `GET /__livereload` handler.
///
/// Emits one `reload` event per finished rebuild, carrying its generation
/// number. The stream ends on server shutdown.
async fn handle_livereload(
    State(state): State<Arc<ServerState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let events = BroadcastStream::new(state.reload_tx.subscribe()).filter_map(
        |msg: Result<u64, BroadcastStreamRecvError>| {
            msg.ok()
                .map(|generation| Ok(Event::default().event("reload").data(generation.to_string())))
        },
    );
    let events =
        futures_util::StreamExt::take_until(events, state.shutdown.clone().cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Fallback handler serving files from the project root.
///
/// HTML documents are read directly so the reload script can be injected;
/// while the last build is failing they are replaced by the error page.
/// Everything else goes through `ServeDir`.
async fn handle_static(State(state): State<Arc<ServerState>>, request: Request) -> Response {
    let uri_path = request.uri().path().to_string();
    let target = html_target(&state.root, &uri_path);

    if target.is_some() || uri_path.ends_with('/') || uri_path.ends_with(".html") {
        if let Some(message) = state.last_error() {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(build_error_page(&message).into_string()),
            )
                .into_response();
        }

        if let Some(file) = target {
            return match tokio::fs::read_to_string(&file).await {
                Ok(html) => Html(inject_reload_script(&html)).into_response(),
                Err(e) => {
                    warn!("Failed to read {}: {}", file.display(), e);
                    not_found(&uri_path)
                }
            };
        }
    }

    match ServeDir::new(&state.root).oneshot(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&uri_path),
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn not_found(uri_path: &str) -> Response {
    debug!("Not found: {}", uri_path);
    (
        StatusCode::NOT_FOUND,
        Html(not_found_page(uri_path).into_string()),
    )
        .into_response()
}

/// Maps a request path to an HTML file under `root`.
///
/// The path is percent-decoded first, the same way `ServeDir` resolves it.
/// Directory paths resolve to their `index.html`. Paths with `..` or other
/// non-plain components never match.
fn html_target(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let mut candidate = root.join(relative);
    if candidate.is_dir() {
        candidate = candidate.join("index.html");
    }

    let is_html = candidate
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));

    (is_html && candidate.is_file()).then_some(candidate)
}

/// Starts the polling thread that rebuilds on change.
///
/// The baseline snapshot is taken before returning; edits made after this
/// call are always picked up. Each rebuild runs to completion before the
/// next poll, so builds never overlap.
fn spawn_watcher(
    project: Project,
    state: Arc<ServerState>,
    interval: Duration,
) -> std::io::Result<JoinHandle<()>> {
    let mut watcher = Watcher::for_project(&project);
    info!("Watching {} files for changes", watcher.tracked());

    std::thread::Builder::new()
        .name("topicpress-watch".to_string())
        .spawn(move || {
            let mut generation = 0u64;
            while !state.shutdown.is_cancelled() {
                std::thread::sleep(interval);

                let changed = watcher.changed();
                if changed.is_empty() {
                    continue;
                }
                for path in &changed {
                    info!("Changed: {}", path.display());
                }

                generation += 1;
                state.record_build(&build_site(&project));
                state.notify_reload(generation);
            }
        })
}

/// Builds the site, then serves it and rebuilds on change until Ctrl+C.
///
/// Build failures are logged and shown in the browser; they never stop
/// the server.
///
/// # Errors
///
/// Returns error if the watcher cannot start, the address cannot be bound,
/// or the server fails.
pub async fn serve(project: Project, options: ServeOptions) -> Result<()> {
    let state = ServerState::new(project.root.clone());
    state.record_build(&build_site(&project));

    let watcher = spawn_watcher(project, Arc::clone(&state), options.poll_interval)
        .context("Failed to start file watcher")?;

    let addr = options.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind preview server to {}", addr))?;
    let url = format!(
        "http://{}/",
        listener.local_addr().context("Failed to read bound address")?
    );
    info!("Serving {} at {}", state.root.display(), url);

    if options.open_browser
        && let Err(e) = open::that(&url)
    {
        warn!("Failed to open browser: {}", e);
    }

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, router(Arc::clone(&state)))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutting down");
            shutdown_state.shutdown();
        })
        .await
        .context("Preview server failed")?;

    state.shutdown();
    if !matches!(
        tokio::task::spawn_blocking(move || watcher.join()).await,
        Ok(Ok(()))
    ) {
        warn!("File watcher did not stop cleanly");
    }

    Ok(())
}

pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod types;

pub use handlers::AppState;
pub use lifecycle::{LifecycleEvent, LifecycleMachine, LifecycleState, ShutdownOutcome};

use crate::{Error, Result, config::{Config, ServerConfig}, llm};
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Request},
    routing::{get, post},
};
use std::{future::Future, path::Path, time::Duration};
use tokio::{net::TcpListener, task::JoinError};
use tokio_util::sync::CancellationToken;
use tower_http::{
    LatencyUnit,
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, error, info, info_span, warn};

pub async fn run(config: Config) -> Result<()> {
    // The landing page is a deployment precondition, fail before binding
    let index_html = load_index(&config.server.static_dir).await?;

    let app_state = AppState {
        llm: llm::connect(&config.llm),
        index_html,
    };

    let app = build_router(app_state, &config.server);

    let host = config.server.host.as_str();
    let port = config.server.port;
    info!("Starting server on {}:{}", host, port);

    let mut lifecycle = LifecycleMachine::new();
    let listener = match TcpListener::bind((host, port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}:{}: {}", host, port, e);
            lifecycle.transition(LifecycleEvent::Failed)?;
            return Err(e.into());
        }
    };

    serve_with_lifecycle(
        lifecycle,
        listener,
        app,
        shutdown_signal(),
        config.server.shutdown_grace(),
    )
    .await?;

    Ok(())
}

/// Reads `index.html` from the static directory.
pub async fn load_index(static_dir: &Path) -> Result<Bytes> {
    let index_path = static_dir.join("index.html");
    let contents = tokio::fs::read(&index_path).await.map_err(|e| {
        Error::config(format!(
            "Landing page {} could not be read: {}",
            index_path.display(),
            e
        ))
    })?;
    Ok(Bytes::from(contents))
}

pub fn build_router(app_state: AppState, config: &ServerConfig) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(middleware::REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unknown");
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
            )
        })
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    Router::new()
        .route("/", get(handlers::index))
        .route("/run", post(handlers::run))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(app_state)
}

/// Serves `app` on an already bound listener until `signal` resolves, then
/// stops accepting connections and waits up to `grace` for in-flight
/// requests before giving up on them.
///
/// On [`ShutdownOutcome::GraceElapsed`] only the accept loop is aborted.
/// Connection tasks spawned by `axum::serve` keep running their handlers
/// until they finish or the runtime shuts down, so an embedding caller that
/// keeps its runtime alive may still see backend calls in progress.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> Result<ShutdownOutcome>
where
    F: Future<Output = ()>,
{
    serve_with_lifecycle(LifecycleMachine::new(), listener, app, signal, grace).await
}

async fn serve_with_lifecycle<F>(
    mut lifecycle: LifecycleMachine,
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> Result<ShutdownOutcome>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    lifecycle.transition(LifecycleEvent::Bound)?;
    info!("Listening on {}", addr);

    let shutdown = CancellationToken::new();
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown.clone().cancelled_owned());
    let mut server_task = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut server_task => {
            lifecycle.transition(LifecycleEvent::Failed)?;
            join_result(joined)?;
            return Err(Error::internal("server stopped without a shutdown signal"));
        }
        _ = signal => {}
    }

    lifecycle.transition(LifecycleEvent::ShutdownRequested)?;
    info!(
        "Shutting down server, waiting up to {:?} for in-flight requests",
        grace
    );
    shutdown.cancel();

    let outcome = match tokio::time::timeout(grace, &mut server_task).await {
        Ok(joined) => {
            if let Err(e) = join_result(joined) {
                lifecycle.transition(LifecycleEvent::Failed)?;
                return Err(e);
            }
            lifecycle.transition(LifecycleEvent::Drained)?;
            ShutdownOutcome::Drained
        }
        Err(_) => {
            warn!(
                "Grace period of {:?} elapsed, abandoning in-flight requests",
                grace
            );
            server_task.abort();
            lifecycle.transition(LifecycleEvent::GraceElapsed)?;
            ShutdownOutcome::GraceElapsed
        }
    };

    info!("Server stopped ({:?})", outcome);
    Ok(outcome)
}

fn join_result(joined: std::result::Result<std::io::Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(result) => Ok(result?),
        Err(e) => Err(Error::internal(format!("server task failed: {}", e))),
    }
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

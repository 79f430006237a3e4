mod config;
mod error;
mod home;
mod store;
mod todo;

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use clap::Parser;
use eyre::WrapErr;
use tokio::{signal, time};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::{Args, Backend, REQUEST_TIMEOUT, SHUTDOWN_GRACE, SNAPSHOT_INTERVAL},
    home::Pages,
    store::{MemoryStore, MongoStore, TodoStore},
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let pages = Pages::load(&args.template)
        .wrap_err_with(|| format!("failed to load template {}", args.template.display()))?;

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    match args.backend {
        Backend::Mongo => {
            let store = MongoStore::connect(&args.mongo_uri, &args.database, &args.collection)
                .await
                .wrap_err_with(|| format!("failed to connect to {}", args.mongo_uri))?;
            let state = Arc::new(AppState::new(store, pages));

            serve(&args, app(state), handle).await?;
        }
        Backend::Memory => {
            let store = match &args.data_file {
                Some(path) => MemoryStore::load(path)
                    .wrap_err_with(|| format!("failed to load {}", path.display()))?,
                None => MemoryStore::new(),
            };
            let state = Arc::new(AppState::new(store, pages));

            let snapshots = tokio::spawn(store_periodically(state.clone()));
            let served = serve(&args, app(state.clone()), handle).await;
            snapshots.abort();

            if let Err(err) = state.store.store().await {
                tracing::error!("Failed to store data: {:?}", err);
            }
            served?;
        }
    }

    info!("server stopped");

    Ok(())
}

pub struct AppState<S> {
    pub store: S,
    pub pages: Pages,
}

impl<S: TodoStore> AppState<S> {
    pub fn new(store: S, pages: Pages) -> Self {
        Self { store, pages }
    }
}

pub fn app<S: TodoStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(home::home::<S>))
        .merge(todo::router::<S>())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                )),
        )
        .with_state(state)
}

async fn serve(args: &Args, app: Router, handle: Handle) -> eyre::Result<()> {
    let service = app.into_make_service();

    match args.tls() {
        Some((cert, key)) => {
            let config = RustlsConfig::from_pem_file(cert, key)
                .await
                .wrap_err("failed to load TLS certificate")?;

            info!(addr = %args.listen, "listening with tls");
            axum_server::bind_rustls(args.listen, config)
                .handle(handle)
                .serve(service)
                .await?;
        }
        None => {
            info!(addr = %args.listen, "listening");
            axum_server::bind(args.listen)
                .handle(handle)
                .serve(service)
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_on_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {:?}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {:?}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!(grace = ?SHUTDOWN_GRACE, "shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

async fn store_periodically(state: Arc<AppState<MemoryStore>>) {
    if let Some(path) = state.store.data_file() {
        info!(path = %path.display(), "storing snapshots");
    }

    loop {
        time::sleep(SNAPSHOT_INTERVAL).await;
        if let Err(err) = state.store.store().await {
            tracing::error!("Failed to store data: {:?}", err);
        }
    }
}

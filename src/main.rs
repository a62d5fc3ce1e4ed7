mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::apps::AppService;
use crate::features::categories::CategoryService;
use crate::features::downloads::{routes as downloads_routes, DownloadService};
use crate::features::storefront::{routes as storefront_routes, RealtimeReconciler, StorefrontService};
use crate::modules::realtime::{ChangeFeed, PgChangeListener};
use crate::modules::storage::{ImageStorage, MinIOClient};
use crate::modules::store::{CatalogStore, PgCatalogStore};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, download_mode={:?}",
        worker_threads,
        config.download.mode
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let minio_client = MinIOClient::new(config.minio.clone()).await?;
    tracing::info!("Image storage ready (bucket: {})", minio_client.bucket_name());
    let image_storage: Arc<dyn ImageStorage> = Arc::new(minio_client);

    let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));

    // Realtime: LISTEN on the trigger channel, fan out to the reconciler and websockets
    let feed = ChangeFeed::new(config.realtime.feed_capacity);
    let listener_task = PgChangeListener::new(
        pool.clone(),
        Arc::clone(&store),
        feed.clone(),
        config.realtime.resync_backoff,
    )
    .spawn();

    let reconciler = RealtimeReconciler::start(Arc::clone(&store), &feed, &config.realtime).await?;

    let storefront_service = Arc::new(StorefrontService::new(
        reconciler.subscribe(),
        Arc::clone(&store),
        feed.clone(),
    ));
    let download_service = Arc::new(DownloadService::new(
        Arc::clone(&store),
        config.download.clone(),
    )?);
    let category_service = Arc::new(CategoryService::new(Arc::clone(&store)));
    let app_service = Arc::new(AppService::new(Arc::clone(&store), image_storage));
    let admin_service = Arc::new(AdminService::new(Arc::clone(&store), feed.clone()));

    // Swagger UI, optionally behind basic auth
    let mut openapi = ApiDoc::openapi();
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(
                Arc::new(credentials),
                "swagger",
            )))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let admin = Router::new().nest(
        "/api/admin",
        admin_routes::routes(
            admin_service,
            category_service,
            app_service,
            Arc::new(config.admin.credentials()),
        ),
    );

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let public_routes = Router::new()
        .merge(storefront_routes::routes(storefront_service))
        .merge(downloads_routes::routes(download_service));

    let app = Router::new()
        .merge(swagger)
        .merge(admin)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(config.app.cors_allowed_origins.clone()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    // Long-lived websocket connections need dead peers noticed
    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down realtime components");
    listener_task.abort();
    reconciler.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

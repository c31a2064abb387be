mod config;

use anyhow::Result;
use config::AppConfig;
use pizzeria_api::{create_routes, AppState};
use pizzeria_db::{Database, OrderRepository};
use pizzeria_live::ConnectionRegistry;
use pizzeria_services::{OrderNotifier, OrderService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pizzeria_rs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🍕 Starting Pizzeria ordering backend");

    // Load configuration
    let config = AppConfig::new()?;
    info!("✅ Configuration loaded successfully");
    info!("📊 Database: {}", config.database_url());
    info!("🌐 Server will bind to: {}", config.server_addr());

    // Connect to the database and bring the schema up to date
    let database = Database::new(config.database_url(), config.database.max_connections).await?;
    database.run_migrations().await?;
    database.health_check().await?;
    info!("✅ Database connected, migrations applied");

    // Wire up the application state: one registry, one service stack,
    // constructed here and owned for the life of the process.
    let registry = Arc::new(ConnectionRegistry::new());
    let repository = Arc::new(OrderRepository::new(database.pool().clone()));
    let orders = OrderService::new(repository);
    let notifier = OrderNotifier::new(orders.clone(), registry.clone());

    let state = AppState {
        orders,
        notifier,
        registry,
    };

    let app = create_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    info!("✅ Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

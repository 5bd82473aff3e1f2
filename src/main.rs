mod model;
mod server;

use std::net::SocketAddr;

use crate::server::{
    config::Config, error::AppError, realtime::registry::ConnectionRegistry,
    scheduler::event_status, service::payment::gateway::PaymentGatewayClient, startup,
    state::AppState,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("Failed to start server: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let session_layer = startup::connect_to_session(&db).await?;
    let http_client = startup::setup_reqwest_client()?;
    let gateway = PaymentGatewayClient::new(http_client.clone(), &config);
    let registry = ConnectionRegistry::new();

    tracing::info!("Starting server");

    // Start event status scheduler
    let scheduler_db = db.clone();
    tokio::spawn(async move {
        if let Err(e) = event_status::start_scheduler(scheduler_db).await {
            tracing::error!("Event status scheduler error: {}", e);
        }
    });

    let state = AppState::new(db, http_client, gateway, registry, config.clone());

    let router = server::router::router(state).layer(session_layer);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

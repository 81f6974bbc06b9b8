use clap::Parser;
use gongzhu::{build_router, AppState, Config, RoomRegistry};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gongzhu=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let rules = config.rules();
    info!(play_rule = ?rules.play_rule, losing_score = rules.losing_score, "Starting gongzhu server");

    let app_state = AppState::in_memory(RoomRegistry::new(rules));
    let app = build_router(app_state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);
    axum::serve(listener, app).await
}

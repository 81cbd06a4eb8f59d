use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardfolio::server::{router, AppState};
use cardfolio::Cardfolio;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardfolio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut builder = Cardfolio::builder();
    if let Ok(path) = std::env::var("CARDFOLIO_DB") {
        builder = builder.db_path(path);
    }
    let folio = builder.build().expect("failed to open portfolio store");

    let state = Arc::new(AppState { folio });
    let app = router(state);

    let addr = std::env::var("CARDFOLIO_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

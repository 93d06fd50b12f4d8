use std::sync::Arc;

use notification_client::{
    metrics, Config, FileCredential, HttpNotificationApi, LogAlertSink, NotificationSession,
    SocketDeps, WsTransport,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        api = %config.api.base_url,
        socket = %config.socket.redacted_url(),
        token_path = %config.session.token_path.display(),
        "Starting notification client"
    );

    let credentials = Arc::new(FileCredential::new(config.session.token_path.clone()));
    let api = Arc::new(HttpNotificationApi::new(&config.api, credentials.clone())?);

    let deps = SocketDeps {
        transport: Arc::new(WsTransport::new(config.socket.connect_timeout)),
        credentials,
        alerts: Arc::new(LogAlertSink),
    };
    let session = NotificationSession::start(config.socket.clone(), deps).with_api(api);

    if let Some(service) = session.service() {
        if let Err(e) = service.load(config.api.initial_page_size, 0).await {
            tracing::warn!(error = %e, "initial notification load failed");
        }
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        unread = session.store().unread_count(),
        connected = session.socket().is_connected(),
        "Shutting down notification client"
    );

    session.end().await;
    tracing::debug!(metrics = %metrics::render(), "final metrics");
    Ok(())
}

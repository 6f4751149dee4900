//! Polls the admin dashboard and logs a line for every new quote, user,
//! enquiry or contact message. Stops on Ctrl-C.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use unitedpackers_api::{
    client::{AdminFeed, ApiClient, Session},
    config::WatchConfig,
    dashboard::DashboardPoller,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,unitedpackers_api=debug".into()),
        )
        .init();

    let config = WatchConfig::from_env()?;
    let session = match &config.session_file {
        Some(path) => Session::rehydrate(path).await?,
        None => Session::in_memory(),
    };
    if let Some(user) = session.user() {
        tracing::info!(email = %user.email, "reusing stored session");
    }

    let client = ApiClient::new(config.api_url.clone());
    let feed = AdminFeed::new(client, session, config.email.clone(), config.password.clone());
    let poller = DashboardPoller::new(feed);

    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(64);

    let handle = tokio::spawn(poller.run(
        Duration::from_secs(config.poll_secs),
        cancel.clone(),
        tx,
    ));

    let printer = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            tracing::info!(tab = %notification.tab, delta = notification.delta, "{}", notification.message);
        }
    });

    tokio::signal::ctrl_c().await?;
    cancel.cancel();

    let poller = handle.await?;
    printer.await?;
    tracing::info!(unread = poller.badges().total(), "admin watch stopped");
    Ok(())
}

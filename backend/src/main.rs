use anyhow::Context;
use tictactoe::{Config, Server, ops};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    tracing::info!("Starting server on {}", config.addr());
    let server = Server::bind(&config).await?;

    if let Some(addr) = config.ops_addr() {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind ops endpoint {addr}"))?;
        let app = ops::router(server.state());

        tracing::info!("Serving health and stats on {}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Ops endpoint stopped");
            }
        });
    }

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }

    Ok(())
}

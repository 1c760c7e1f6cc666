use mock_server::Service;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn bind(var: &str, default_port: &str) -> anyhow::Result<TcpListener> {
    let port = std::env::var(var).unwrap_or_else(|_| default_port.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, var, "listening");
    Ok(listener)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let posts = bind("POST_PORT", "8081").await?;
    let users = bind("USER_PORT", "8080").await?;
    tokio::try_join!(
        mock_server::run(posts, Service::Posts),
        mock_server::run(users, Service::Users),
    )?;
    Ok(())
}

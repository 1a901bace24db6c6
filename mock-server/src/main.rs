use mock_server::Credentials;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let credentials = Credentials::new(
        std::env::var("APP_ID").unwrap_or_else(|_| "test-app".to_string()),
        std::env::var("APP_SECRET").unwrap_or_else(|_| "test-secret".to_string()),
    );
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    mock_server::run(listener, credentials).await
}

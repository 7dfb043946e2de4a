use storefront_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "starting storefront server"
    );

    let state = ServerState::initialize(config).await?;
    Server::new(state).run().await
}

use boardkeep_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    boardkeep_observability::init();

    let config = AppConfig::from_env()?;
    let store = boardkeep_infra::store::connect(&config.store);
    let app = boardkeep_api::app::build_app(&config, store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

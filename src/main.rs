use tracing_subscriber::EnvFilter;
use webui_client::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("webui-client starting");

    let config = Config::from_env()?;
    config.log_startup();

    let state = AppState::from_config(config)?;

    let mut args = std::env::args().skip(1);
    let location = args.next().unwrap_or_else(|| "/".to_string());
    let fetch_path = args.next();

    let mut navigator = state.navigator();
    match navigator.navigate(&location) {
        Ok(matched) => {
            tracing::info!("{} -> {}", location, matched.view());
            tracing::info!("  Route: {}", serde_json::to_string(matched)?);
        }
        Err(e) => {
            tracing::warn!("{}", e);
            return Err(e.into());
        }
    }

    // Optional data request on behalf of the selected view
    if let Some(path) = fetch_path {
        let response = state.client.get(&path).await?;
        tracing::info!("GET {} -> {}", path, response.status());
    }

    Ok(())
}

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pizza_order_client::{
    client::ApiClient,
    config::AppConfig,
    controller::CartController,
    firebase::load_firebase_config,
    repository::HttpOrderRepository,
    services::cart_service::display_amount,
    state::MenuState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pizza_order_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let firebase = load_firebase_config(&config.firebase_config_path);
    tracing::info!(project_id = %firebase.project_id, "firebase project");

    let client = ApiClient::from_config(&config)?;
    tracing::info!(base_url = %client.base_url(), "using ordering backend");
    let controller = CartController::new(Arc::new(HttpOrderRepository::new(client)));

    let mut menu = controller.subscribe_menu();
    let state = menu.wait_for(|state| !state.is_loading()).await?.clone();

    match state {
        MenuState::Success(pizzas) => {
            for pizza in pizzas.iter().filter(|p| p.is_available) {
                let sizes = pizza
                    .sizes
                    .iter()
                    .map(|s| format!("{} ({}) ${}", s.name, s.diameter, display_amount(s.price)))
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::info!(id = %pizza.id, category = %pizza.category, "{}: {}", pizza.name, sizes);
            }
            Ok(())
        }
        MenuState::Error(message) => anyhow::bail!("failed to load menu: {message}"),
        MenuState::Loading => anyhow::bail!("menu is still loading"),
    }
}

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::clients::openai_client::OpenAIChatClient;
use crate::config::AppConfig;
use crate::handlers;
use crate::service::extraction::ExtractionService;
use crate::service::openai_service::{ChatModel, OpenAIService};
use crate::store;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

pub async fn run_api(config: AppConfig) {
    let openai_api_key = config
        .prop("OPENAI_API_KEY")
        .expect("OPENAI_API_KEY must be set for api mode");
    let database_url = config
        .prop("DATABASE_URL")
        .expect("DATABASE_URL must be set for api mode");

    let pool = match store::connect(&database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Failed to connect to database: {}", err);
            return;
        }
    };

    let client = OpenAIChatClient::new(openai_api_key).with_model(config.model());
    let model: Arc<dyn ChatModel> = Arc::new(OpenAIService::new(client));
    let service = Arc::new(ExtractionService::new(model));

    let bind_addr: SocketAddr = config
        .prop_or("BIND_ADDR", DEFAULT_BIND_ADDR)
        .parse()
        .expect("BIND_ADDR must be a host:port pair");

    let routes = handlers::routes(service, pool, config.timezone());
    info!(%bind_addr, "starting api server");
    warp::serve(routes).run(bind_addr).await;
}

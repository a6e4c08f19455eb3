mod agent;
mod ai;
mod config;
mod controllers;
mod prompts;
mod state;
mod tools;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use agent::ConversationGateway;
use ai::OpenAIClient;
use config::Config;
use state::FormState;
use tools::types::{ActionContext, SharedFormState};

/// Shared application state: the loaded configuration, the conversation
/// gateway, and the single form-state session every request operates on.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<ConversationGateway>,
    pub form: SharedFormState,
}

impl AppState {
    pub fn action_context(&self) -> ActionContext {
        ActionContext::new(self.form.clone())
    }
}

#[cfg(test)]
pub fn test_app_state() -> AppState {
    // Points the client at a closed port so any accidental upstream call in
    // a test fails fast instead of hitting the network.
    let config = Config {
        api_key: "test-key".to_string(),
        model: "gpt-4o".to_string(),
        api_base: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        port: 0,
    };
    let client = OpenAIClient::new(&config.api_key, &config.api_base, &config.model)
        .expect("test client");
    let registry = Arc::new(tools::create_default_registry());
    AppState {
        gateway: Arc::new(ConversationGateway::new(client, registry)),
        form: Arc::new(parking_lot::Mutex::new(FormState::new())),
        config,
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    let client = match OpenAIClient::new(&config.api_key, &config.api_base, &config.model) {
        Ok(client) => client,
        Err(e) => {
            log::error!("[MAIN] Failed to build OpenAI client: {}", e);
            std::process::exit(1);
        }
    };

    let registry = Arc::new(tools::create_default_registry());
    log::info!("[MAIN] Registered {} actions", registry.len());

    let gateway = Arc::new(ConversationGateway::new(client, registry));
    let form: SharedFormState = Arc::new(parking_lot::Mutex::new(FormState::new()));

    let app_state = web::Data::new(AppState {
        config,
        gateway,
        form,
    });

    log::info!("[MAIN] Starting {} on port {}", config::SERVICE_NAME, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(controllers::health::config)
            .configure(controllers::chat::config)
            .configure(controllers::state::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

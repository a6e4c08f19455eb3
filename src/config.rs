use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const OPENAI_API_BASE: &str = "OPENAI_API_BASE";
    pub const PORT: &str = "PORT";
}

/// Default values
pub mod defaults {
    pub const MODEL: &str = "gpt-4o";
    pub const API_BASE: &str = "https://api.openai.com/v1/chat/completions";
    pub const PORT: u16 = 5000;
}

pub const SERVICE_NAME: &str = "Deal-Fi AI Agent";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment. The API credential is the
    /// only fatal requirement; everything else has a default.
    pub fn from_env() -> Self {
        let api_key = env::var(env_vars::OPENAI_API_KEY).unwrap_or_default();
        if api_key.is_empty() {
            panic!(
                "{} not set. Create a .env file with {}=<your key>",
                env_vars::OPENAI_API_KEY,
                env_vars::OPENAI_API_KEY
            );
        }

        Self {
            api_key,
            model: env::var(env_vars::OPENAI_MODEL)
                .unwrap_or_else(|_| defaults::MODEL.to_string()),
            api_base: env::var(env_vars::OPENAI_API_BASE)
                .unwrap_or_else(|_| defaults::API_BASE.to_string()),
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
        }
    }
}

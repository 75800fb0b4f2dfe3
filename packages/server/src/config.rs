use anyhow::{Context, Result};

/// Server configuration, loaded from the environment.
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://shopper.db?mode=rwc".to_string());

        let port = std::env::var("PORT")
            .ok()
            .map(|raw| raw.parse::<u16>())
            .transpose()
            .context("PORT must be a number")?
            .unwrap_or(8000);

        let openai_api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;

        let openai_model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self {
            database_url,
            port,
            openai_api_key,
            openai_model,
        })
    }
}

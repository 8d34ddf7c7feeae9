use anyhow::Context;

const DEFAULT_PORT: u16 = 3000;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openrouter_api_key: String,
    pub openrouter_model: Option<String>,
    pub jwt_secret: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let openrouter_api_key =
            std::env::var("OPENROUTER_API_KEY").context("OPENROUTER_API_KEY must be set")?;
        let openrouter_model = std::env::var("OPENROUTER_MODEL").ok();
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            database_url,
            openrouter_api_key,
            openrouter_model,
            jwt_secret,
            port,
        })
    }
}

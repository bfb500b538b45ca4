use anyhow::Context;

/// Process configuration. Every field is required; startup fails fast when
/// one is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub payment_gateway_secret: String,
    pub payment_gateway_webhook_secret: String,
    pub frontend_url: String,
    pub port: u16,
    pub auth_token_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            payment_gateway_secret: require("PAYMENT_GATEWAY_SECRET")?,
            payment_gateway_webhook_secret: require("PAYMENT_GATEWAY_WEBHOOK_SECRET")?,
            frontend_url: require("FRONTEND_URL")?,
            port: require("PORT")?
                .parse()
                .context("PORT must be a valid port number")?,
            auth_token_secret: require("AUTH_TOKEN_SECRET")?,
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

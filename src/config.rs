use std::{env, net::SocketAddr};

use url::Url;

use crate::error::AppError;

const DEFAULT_RATES_API: &str = "https://v6.exchangerate-api.com/v6";
const DEFAULT_WEATHER_API: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub cookie_secret: String,
    pub exchange_rate_api_key: Option<String>,
    pub exchange_rate_api_base: Url,
    pub weather_api_base: Url,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://itinera.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-itinera-cookie-secret".to_string());

        let exchange_rate_api_key = env::var("EXCHANGE_RATE_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let exchange_rate_api_base = parse_url(
            "EXCHANGE_RATE_API_BASE",
            env::var("EXCHANGE_RATE_API_BASE").unwrap_or_else(|_| DEFAULT_RATES_API.to_string()),
        )?;
        let weather_api_base = parse_url(
            "WEATHER_API_BASE",
            env::var("WEATHER_API_BASE").unwrap_or_else(|_| DEFAULT_WEATHER_API.to_string()),
        )?;

        Ok(Self {
            database_url,
            listen_addr,
            cookie_secret,
            exchange_rate_api_key,
            exchange_rate_api_base,
            weather_api_base,
        })
    }
}

fn parse_url(name: &str, raw: String) -> Result<Url, AppError> {
    Url::parse(&raw).map_err(|err| AppError::Config(format!("invalid {name}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_urls() {
        let err = parse_url("WEATHER_API_BASE", "not a url".into()).unwrap_err();
        assert!(err.to_string().contains("WEATHER_API_BASE"));
    }
}

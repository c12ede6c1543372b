use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{rates::RateService, weather::WeatherService},
    store::Store,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
    pub rates: RateService,
    pub weather: WeatherService,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let rates = RateService::new(&config);
        let weather = WeatherService::new(&config);
        Self::with_services(config, db, rates, weather)
    }

    pub fn with_services(
        config: AppConfig,
        db: DbPool,
        rates: RateService,
        weather: WeatherService,
    ) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        Self {
            config,
            store: Store::new(db),
            rates,
            weather,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#![allow(dead_code)]

use std::{fmt, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use itinera::{
    auth,
    config::AppConfig,
    db::{init_pool, run_migrations},
    models::{trip::NewTrip, trip::Trip, user::User},
    routes::create_router,
    services::trips,
    state::AppState,
};
use tempfile::TempDir;
use url::Url;

/// An app state backed by a throwaway SQLite file.
pub struct TestApp {
    pub state: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestApp").finish()
    }
}

pub fn test_config(database_url: String) -> AppConfig {
    // Nothing listens on the discard port, so outbound calls fail fast.
    let unreachable = Url::parse("http://127.0.0.1:9/").expect("static url");
    AppConfig {
        database_url,
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cookie_secret: "test-cookie-secret".into(),
        exchange_rate_api_key: None,
        exchange_rate_api_base: unreachable.clone(),
        weather_api_base: unreachable,
    }
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir")?;
        let db_path = root.path().join("itinera-test.sqlite");
        let config = test_config(format!("sqlite://{}", db_path.to_string_lossy()));

        let db = init_pool(&config.database_url).await?;
        run_migrations(&db).await?;

        Ok(Self {
            state: AppState::new(config, db),
            _root: root,
        })
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn user(&self, name: &str, email: &str) -> User {
        auth::register_user(&self.state, name, email, "secret-pass")
            .await
            .expect("register user")
    }

    pub async fn trip(&self, owner: &User, start: &str, end: &str) -> Trip {
        let form = NewTrip {
            title: "Test trip".into(),
            destination: "Lisbon, Portugal".into(),
            start_date: Some(start.parse().expect("start date")),
            end_date: Some(end.parse().expect("end date")),
            total_budget: 500.0,
            ..Default::default()
        };
        let (trip, _) = trips::create_trip(&self.state.store, owner, &form)
            .await
            .expect("create trip");
        trip
    }
}

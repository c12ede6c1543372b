//! Current conditions and a 7-day forecast from an Open-Meteo compatible API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::AppConfig;

const FORECAST_DAYS: &str = "7";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("weather response malformed: {0}")]
    Malformed(String),
}

pub fn describe(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 | 53 | 55 => "Drizzle",
        61 | 63 => "Rain",
        65 => "Heavy Rain",
        71 | 73 => "Snow",
        75 => "Heavy Snow",
        80 | 81 => "Rain Showers",
        82 => "Heavy Rain Showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Unknown",
    }
}

pub fn icon(code: i64) -> &'static str {
    match code {
        0 => "wb_sunny",
        1..=3 => "cloud",
        45..=48 => "foggy",
        51..=67 => "water_drop",
        71..=77 => "ac_unit",
        80..=82 => "rainy",
        95.. => "thunderstorm",
        _ => "wb_sunny",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temp: i64,
    pub description: &'static str,
    pub weather_code: i64,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temp_max: i64,
    pub temp_min: i64,
    pub weather_code: i64,
    pub description: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub current: CurrentWeather,
    pub daily: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current: OpenMeteoCurrent,
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature_2m: f64,
    weather_code: i64,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weather_code: Vec<i64>,
}

impl Forecast {
    fn from_response(response: OpenMeteoResponse) -> Result<Self, WeatherError> {
        let daily = response.daily;
        let len = daily.time.len();
        if daily.temperature_2m_max.len() != len
            || daily.temperature_2m_min.len() != len
            || daily.weather_code.len() != len
        {
            return Err(WeatherError::Malformed(
                "daily series have different lengths".into(),
            ));
        }

        let days = daily
            .time
            .into_iter()
            .zip(daily.temperature_2m_max)
            .zip(daily.temperature_2m_min)
            .zip(daily.weather_code)
            .map(|(((date, max), min), code)| ForecastDay {
                date,
                temp_max: max.round() as i64,
                temp_min: min.round() as i64,
                weather_code: code,
                description: describe(code),
                icon: icon(code),
            })
            .collect();

        let code = response.current.weather_code;
        Ok(Self {
            current: CurrentWeather {
                temp: response.current.temperature_2m.round() as i64,
                description: describe(code),
                weather_code: code,
                icon: icon(code),
            },
            daily: days,
        })
    }
}

#[derive(Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    api_base: Url,
}

impl WeatherService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.weather_api_base.clone())
    }

    pub fn with_client(client: reqwest::Client, api_base: Url) -> Self {
        Self { client, api_base }
    }

    /// `Ok(None)` for the `(0, 0)` "no location" coordinate.
    pub async fn forecast(&self, lat: f64, lng: f64) -> Result<Option<Forecast>, WeatherError> {
        if lat == 0.0 && lng == 0.0 {
            return Ok(None);
        }
        let mut url = self.api_base.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &lat.to_string())
            .append_pair("longitude", &lng.to_string())
            .append_pair("current", "temperature_2m,relative_humidity_2m,weather_code")
            .append_pair("daily", "temperature_2m_max,temperature_2m_min,weather_code")
            .append_pair("timezone", "auto")
            .append_pair("forecast_days", FORECAST_DAYS);
        debug!(%url, "requesting forecast");

        let response: OpenMeteoResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Forecast::from_response(response).map(Some)
    }
}

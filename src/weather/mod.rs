//! Mountain weather observations for the selected station
//!
//! [`WeatherClient`] talks to the observation service, [`WeatherPanel`]
//! drives one fetch per selection and keeps the popup state.

pub mod client;
pub mod panel;

pub use client::{parse_weather_response, WeatherClient, WeatherObservation};
pub use panel::{WeatherPanel, WeatherState};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};

/// Errors surfaced in the popup in place of an observation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeatherError {
    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: u16, body: String },

    #[error("API Error: {message} (Code: {code})")]
    Api { code: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// One observation lookup: station id and hour (`YYYYMMDDHH00`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub obsid: String,
    pub tm: String,
}

impl WeatherRequest {
    pub fn new(obsid: impl Into<String>, tm: impl Into<String>) -> Self {
        Self {
            obsid: obsid.into(),
            tm: tm.into(),
        }
    }
}

/// Formats the hour containing `now`, minutes zeroed
pub fn observation_time<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H00").to_string()
}

/// Anything that can answer a [`WeatherRequest`]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(
        &self,
        request: &WeatherRequest,
    ) -> std::result::Result<Option<WeatherObservation>, WeatherError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Local};

    #[test]
    fn test_observation_time_zeroes_minutes() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = kst.with_ymd_and_hms(2025, 5, 13, 16, 47, 12).unwrap();
        assert_eq!(observation_time(now), "202505131600");

        let midnight = kst.with_ymd_and_hms(2025, 1, 2, 0, 5, 0).unwrap();
        assert_eq!(observation_time(midnight), "202501020000");
    }

    #[test]
    fn test_observation_time_shape() {
        let tm = observation_time(Local::now());
        assert_eq!(tm.len(), 12);
        assert!(tm.ends_with("00"));
        assert!(tm.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_error_messages() {
        let api = WeatherError::Api {
            code: "30".into(),
            message: "SERVICE KEY IS NOT REGISTERED ERROR.".into(),
        };
        assert_eq!(
            api.to_string(),
            "API Error: SERVICE KEY IS NOT REGISTERED ERROR. (Code: 30)"
        );

        let http = WeatherError::Http {
            status: 500,
            body: "oops".into(),
        };
        assert_eq!(http.to_string(), "HTTP error! status: 500, message: oops");
    }
}

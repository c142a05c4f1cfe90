use std::fmt;
use std::fmt::Formatter;
use crate::models::FailureKind;

#[derive(Debug)]
pub enum WeatherError {
    Fetch(String),
    Decode(String),
}

impl WeatherError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WeatherError::Fetch(_)  => FailureKind::Fetch,
            WeatherError::Decode(_) => FailureKind::Decode,
        }
    }
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WeatherError::Fetch(e)  => write!(f, "WeatherError::Fetch: {}", e),
            WeatherError::Decode(e) => write!(f, "WeatherError::Decode: {}", e),
        }
    }
}
impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self { WeatherError::Fetch(e.to_string()) }
}
impl From<serde_json::Error> for WeatherError {
    fn from(e: serde_json::Error) -> Self { WeatherError::Decode(e.to_string()) }
}

use std::fmt;
use std::fmt::Formatter;
use crate::initialization::ConfigError;
use crate::manager_weather::errors::WeatherError;

/// Errors that stop the dashboard from starting or running
///
#[derive(Debug)]
pub struct UnrecoverableError(pub String);

impl fmt::Display for UnrecoverableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UnrecoverableError: {}", self.0)
    }
}
impl From<std::io::Error> for UnrecoverableError {
    fn from(e: std::io::Error) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<ConfigError> for UnrecoverableError {
    fn from(e: ConfigError) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<WeatherError> for UnrecoverableError {
    fn from(e: WeatherError) -> Self { UnrecoverableError(e.to_string()) }
}

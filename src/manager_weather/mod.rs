pub mod errors;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use crate::initialization::WeatherSource;
use crate::manager_weather::errors::WeatherError;
use crate::models::WeatherRecord;

/// Anything that can deliver a batch of weather records
///
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns at most `limit` raw records, in no particular order
    async fn fetch(&self, limit: usize) -> Result<Vec<WeatherRecord>, WeatherError>;
}

/// Weather manager
///
/// Reads the latest records from the weather ETL API
pub struct Weather {
    client: Client,
    base_url: String,
}

impl Weather {

    /// Returns a new instance of Weather
    ///
    /// # Arguments
    ///
    /// * 'source' - weather endpoint configuration
    pub fn new(source: &WeatherSource) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(source.timeout)
            .build()?;

        Ok(Self { client, base_url: source.base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl RecordSource for Weather {

    /// Fetches the most recent records from the weather endpoint
    ///
    /// # Arguments
    ///
    /// * 'limit' - maximum number of records the endpoint should return
    async fn fetch(&self, limit: usize) -> Result<Vec<WeatherRecord>, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        let req = self.client.get(&url)
            .query(&[("limit", limit)])
            .send().await?;

        let status = req.status();
        if !status.is_success() {
            return Err(WeatherError::Fetch(format!("{} returned {}", url, status)));
        }

        let json = req.text().await?;
        let records: Vec<WeatherRecord> = serde_json::from_str(&json)?;

        if let Some(blank) = records.iter().position(|r| r.city.trim().is_empty()) {
            return Err(WeatherError::Decode(format!("record {} has an empty city", blank)));
        }

        debug!("fetched {} records from {}", records.len(), url);

        Ok(records)
    }
}

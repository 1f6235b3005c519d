use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::ingest::ShowSource;

pub const TVMAZE_API: &str = "https://api.tvmaze.com/";

/// Failures talking to the show listings API.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Connectivity { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Upstream { url: String, status: u16 },

    #[error("could not decode show list: {0}")]
    Parse(String),
}

/// One show as published by the listings API. Everything except the id is
/// optional, and the id itself is checked during normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShow {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<Option<String>>>,
    pub externals: Option<RawExternals>,
    pub rating: Option<RawRating>,
    pub network: Option<RawNetwork>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExternals {
    pub imdb: Option<String>,
    pub tvrage: Option<i32>,
    pub thetvdb: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRating {
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNetwork {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub country: Option<RawCountry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCountry {
    pub name: Option<String>,
    pub code: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Clone)]
pub struct TvMazeClient {
    client: Client,
    shows_url: Url,
}

impl TvMazeClient {
    /// Builds a client for the API rooted at `base_url`.
    pub fn with_shared_client(client: Client, base_url: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let shows_url = base.join("shows")?;

        Ok(Self { client, shows_url })
    }

    #[must_use]
    pub fn shows_url(&self) -> &Url {
        &self.shows_url
    }

    pub async fn get_shows(&self) -> Result<Vec<RawShow>, SourceError> {
        let url = self.shows_url.as_str();
        debug!("Fetching show list from {}", url);

        let response = self
            .client
            .get(self.shows_url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Connectivity {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Connectivity {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let shows: Vec<RawShow> =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;

        debug!("Show list contained {} records", shows.len());
        Ok(shows)
    }
}

#[async_trait::async_trait]
impl ShowSource for TvMazeClient {
    async fn fetch_shows(&self) -> Result<Vec<RawShow>, SourceError> {
        self.get_shows().await
    }
}

//! Movie metadata lookup (OMDb-compatible API).
//!
//! A sibling of the resolution core, not a dependency of it: the core
//! never calls this module, only front ends do. Base URL is injectable
//! so tests can point it at a local server.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::fetch::EmbedClient;

const DEFAULT_API_BASE: &str = "https://www.omdbapi.com/";

/// Brief record returned by keyword search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: Option<String>,
}

/// Full record for one title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<MovieSummary>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

/// OMDb-style metadata client.
pub struct MetadataClient {
    client: EmbedClient,
    api_base: String,
    api_key: String,
}

impl MetadataClient {
    pub fn new(client: EmbedClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Search titles by keyword. An empty result set is not an error.
    pub async fn search_by_keyword(&self, text: &str) -> Result<Vec<MovieSummary>> {
        let response = self
            .client
            .inner()
            .get(&self.api_base)
            .query(&[("apikey", self.api_key.as_str()), ("s", text), ("type", "movie")])
            .send()
            .await?;
        let body: SearchResponse = response.json().await?;

        if body.response != "True" {
            debug!(query = text, error = ?body.error, "search returned no results");
            return Ok(Vec::new());
        }
        Ok(body.search)
    }

    /// Full details for one identifier; `Ok(None)` when unknown.
    pub async fn get_details(&self, identifier: &str) -> Result<Option<MovieDetails>> {
        let response = self
            .client
            .inner()
            .get(&self.api_base)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("i", identifier),
                ("plot", "short"),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Network(format!(
                "metadata API returned HTTP {status}"
            )));
        }
        let body: serde_json::Value = response.json().await?;
        if body.get("Response").and_then(serde_json::Value::as_str) != Some("True") {
            debug!(identifier, "metadata API has no record");
            return Ok(None);
        }
        let details: MovieDetails =
            serde_json::from_value(body).map_err(|e| ResolveError::Parse(e.to_string()))?;
        Ok(Some(details))
    }
}

use std::sync::Arc;

use reqwest::Client;

use crate::constants::USER_AGENT;
use crate::error::{FetchError, Result};
use crate::models::{ObservationQuery, QueryParams};
use crate::table::{parse_table, Table};

/// Fetches comment-annotated CSV datasets and parses them into [`Table`]s.
///
/// Each call issues exactly one GET and owns its response; clones share the
/// underlying connection pool only.
#[derive(Clone)]
pub struct TabularFetcher {
    client: Arc<Client>,
}

impl TabularFetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Downloads `endpoint` with `params` as the query string and parses the body.
    ///
    /// There is no timeout or retry; wrap the future if bounded latency is needed.
    pub async fn fetch(&self, endpoint: &str, params: &QueryParams) -> Result<Table> {
        tracing::info!("Fetching {} with {} parameters", endpoint, params.len());

        let body = self.make_request(endpoint, params).await?;
        let table = parse_table(&body)?;

        tracing::info!(
            "Parsed {} rows with columns {:?}",
            table.len(),
            table.columns()
        );
        Ok(table)
    }

    /// Runs a KNMI observation query against its service.
    pub async fn observations(&self, query: &ObservationQuery) -> Result<Table> {
        self.fetch(query.endpoint(), &query.to_params()).await
    }

    /// Makes an HTTP GET request and returns the body as text
    async fn make_request(&self, endpoint: &str, params: &QueryParams) -> Result<String> {
        let query: Vec<(&str, &str)> = params.iter().collect();
        let response = self.client.get(endpoint).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "Request failed with status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        Ok(body)
    }
}

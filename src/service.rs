use anyhow::Result;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};

use crate::error::FetchError;
use crate::fetcher::TabularFetcher;
use crate::formatters::{format_table, format_table_json, format_variable_groups};
use crate::models::{GetObservationsRequest, ObservationQuery, OutputFormat};

/// KNMI observation service that handles MCP requests
#[derive(Clone)]
pub struct Knmi {
    fetcher: TabularFetcher,
    tool_router: ToolRouter<Self>,
}

impl Knmi {
    /// Creates a new KNMI service instance
    pub fn new() -> Result<Self> {
        Ok(Self::with_fetcher(TabularFetcher::new()?))
    }

    pub fn with_fetcher(fetcher: TabularFetcher) -> Self {
        Self {
            fetcher,
            tool_router: Self::tool_router(),
        }
    }
}

/// Maps fetch failures onto MCP errors
fn to_mcp_error(err: FetchError) -> McpError {
    match &err {
        FetchError::Transport(_) => {
            McpError::internal_error(format!("Failed to reach KNMI: {}", err), None)
        }
        FetchError::Parse(_) | FetchError::SchemaMismatch { .. } => {
            McpError::internal_error(format!("Unexpected KNMI response: {}", err), None)
        }
    }
}

#[tool_handler]
impl ServerHandler for Knmi {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-knmi".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Historical weather observations from the KNMI climatology services. \
                Provides hourly and daily station data for the Netherlands."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Knmi {
    /// Gets hourly or daily observations for one or more KNMI stations
    #[tool(description = "Get historical weather observations from KNMI. Provide a resolution ('hourly' or 'daily'), start and end dates (YYYYMMDD, or YYYYMMDDHH for hourly), colon separated variables or groups (e.g. 'TEMP', 'WIND', 'TG:TN:EV24') and colon separated station numbers (e.g. '240' for Schiphol, or 'ALL').")]
    async fn get_observations(
        &self,
        Parameters(request): Parameters<GetObservationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        if request.stations.trim().is_empty() {
            return Err(McpError::invalid_params(
                "At least one station must be given (e.g. '240'), or 'ALL'.",
                None,
            ));
        }

        let format = request.format;
        let query = ObservationQuery::from(request);
        tracing::info!(
            "Getting {:?} observations for stations {} ({} to {})",
            query.resolution,
            query.stations,
            query.start,
            query.end
        );

        let table = self
            .fetcher
            .observations(&query)
            .await
            .map_err(to_mcp_error)?;

        let formatted = match format {
            OutputFormat::Text => format_table(&table),
            OutputFormat::Json => format_table_json(&table).map_err(|e| {
                McpError::internal_error(format!("Failed to encode table: {}", e), None)
            })?,
        };

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Lists the variable groups KNMI understands
    #[tool(description = "List the KNMI variable groups (e.g. TEMP, WIND, PRCP) and the daily columns each one returns, with their meaning.")]
    async fn list_variable_groups(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Listing variable groups");
        Ok(CallToolResult::success(vec![Content::text(
            format_variable_groups(),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_keep_their_message() {
        let err = to_mcp_error(FetchError::SchemaMismatch {
            line: 4,
            expected: 3,
            found: 2,
        });
        assert!(err.message.contains("expected 3 fields, found 2"));

        let err = to_mcp_error(FetchError::Transport("connection refused".to_string()));
        assert!(err.message.starts_with("Failed to reach KNMI"));
    }
}

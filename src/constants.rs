/// User agent string for HTTP requests
pub const USER_AGENT: &str = "mcp-knmi-server/0.1.0";

/// KNMI climatology service for hourly observations
pub const KNMI_HOURLY_ENDPOINT: &str =
    "http://projects.knmi.nl/klimatologie/uurgegevens/getdata_uur.cgi";

/// KNMI climatology service for daily observations
pub const KNMI_DAILY_ENDPOINT: &str =
    "http://projects.knmi.nl/klimatologie/daggegevens/getdata_dag.cgi";

/// Marks commentary lines, including the column header line.
pub const COMMENT_MARKER: char = '#';

/// Field separator for both the header and the data rows.
pub const DELIMITER: char = ',';

/// Position of the date/time column promoted to the row index.
pub const INDEX_COLUMN: usize = 1;

/// Rows rendered by the text formatter before truncating.
pub const MAX_TEXT_ROWS: usize = 200;

use mcp_knmi_server::{FetchError, ObservationQuery, QueryParams, TabularFetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const BODY: &str = "\
# BRON: KONINKLIJK NEDERLANDS METEOROLOGISCH INSTITUUT (KNMI)
# STN,YYYYMMDD,   TG
#
  240,20190101,   85
  240,20190102,   90
";

fn fetcher() -> TabularFetcher {
    TabularFetcher::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

/// Serves a single canned HTTP response and hands back the request line.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/getdata_dag.cgi", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (url, handle)
}

#[tokio::test]
async fn fetches_and_indexes_rows() {
    let (url, server) = serve_once("200 OK", BODY).await;
    let params: QueryParams = [("stns", "240"), ("vars", "TEMP"), ("start", "20190101")]
        .into_iter()
        .collect();

    let table = fetcher().fetch(&url, &params).await.unwrap();

    assert_eq!(table.columns(), ["STN", "YYYYMMDD", "TG"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.first("20190102").unwrap().get("TG"), Some("90"));

    let request_line = server.await.unwrap();
    assert!(request_line.starts_with("GET /getdata_dag.cgi?"));
    assert!(request_line.contains("stns=240"));
    assert!(request_line.contains("vars=TEMP"));
    assert!(request_line.contains("start=20190101"));
}

#[tokio::test]
async fn observation_query_encodes_colon_lists() {
    let (url, server) = serve_once("200 OK", BODY).await;
    let query = ObservationQuery::daily_precipitation("240:260", "20190101", "20190102");

    fetcher().fetch(&url, &query.to_params()).await.unwrap();

    let request_line = server.await.unwrap();
    assert!(request_line.contains("stns=240%3A260"));
    assert!(request_line.contains("vars=PRCP"));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let (url, server) = serve_once("500 Internal Server Error", "oops").await;

    let err = fetcher().fetch(&url, &QueryParams::new()).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let err = fetcher().fetch(&url, &QueryParams::new()).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn html_error_page_is_a_parse_error() {
    let (url, server) = serve_once("200 OK", "<html><body>Service unavailable</body></html>").await;

    let err = fetcher().fetch(&url, &QueryParams::new()).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse(_)), "got {err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn misaligned_row_is_a_schema_mismatch() {
    let (url, server) = serve_once("200 OK", "# STN,YYYYMMDD,TG\n240,20190101\n").await;

    let err = fetcher().fetch(&url, &QueryParams::new()).await.unwrap_err();

    assert!(
        matches!(err, FetchError::SchemaMismatch { expected: 3, found: 2, .. }),
        "got {err:?}"
    );
    server.await.unwrap();
}

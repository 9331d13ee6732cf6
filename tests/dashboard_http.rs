use delivery_insights::data::Dataset;
use delivery_insights::web::{build_router, AppState};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const ORDERS_CSV: &str = "\
Order ID,Customer ID,Platform,Order Date & Time,Delivery Time (Minutes),Product Category,Order Value (INR),Customer Feedback,Service Rating,Delivery Delay,Refund Requested
ORD1,CUST1,Blinkit,19:45.0,20,Dairy,450,Quick and fresh delivery,5,No,No
ORD2,CUST2,Blinkit,20:10.0,35,Snacks,300,\"Stale chips, wrong item\",1,Yes,Yes
ORD3,CUST3,Zepto,21:05.0,31,Dairy,120,Wrong item delivered again,2,Yes,No
";

fn fixture_dataset() -> (tempfile::TempDir, Dataset) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("orders.csv");
    let mut file = std::fs::File::create(&path).expect("create csv");
    file.write_all(ORDERS_CSV.as_bytes()).expect("write csv");
    let dataset = Dataset::load(&path).expect("load dataset");
    (dir, dataset)
}

async fn spawn_server() -> (tempfile::TempDir, std::net::SocketAddr) {
    let (dir, dataset) = fixture_dataset();
    let app = build_router(AppState::new(Arc::new(dataset), 10));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (dir, addr)
}

async fn send_raw_bytes(addr: std::net::SocketAddr, path: &str) -> (u16, String, Vec<u8>) {
    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.expect("write");
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    let split = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("http response separator");
    let head = String::from_utf8_lossy(&response[..split]).to_string();
    let body = response[split + 4..].to_vec();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, head, body)
}

async fn send_raw(addr: std::net::SocketAddr, path: &str) -> (u16, String, String) {
    let (status, head, body) = send_raw_bytes(addr, path).await;
    (status, head, String::from_utf8(body).expect("utf8 body"))
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("json body")
}

#[tokio::test]
async fn healthz_reports_loaded_rows() {
    let (_dir, addr) = spawn_server().await;
    let (status, _, body) = send_raw(addr, "/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok rows=3");
}

#[tokio::test]
async fn summary_counts_breaches_over_thirty_minutes() {
    let (_dir, addr) = spawn_server().await;
    let (status, _, body) = send_raw(addr, "/api/summary").await;
    assert_eq!(status, 200);
    let summary = json(&body);
    assert_eq!(summary["kpis"]["total_orders"], 3);
    let rate = summary["kpis"]["sla_breach_rate"].as_f64().expect("rate");
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary["synthetic_timestamp_orders"], 3);
    assert_eq!(summary["hourly_orders"].as_array().map(Vec::len), Some(24));
}

#[tokio::test]
async fn platform_filter_narrows_the_summary() {
    let (_dir, addr) = spawn_server().await;
    let (_, _, body) = send_raw(addr, "/api/summary?platform=Zepto").await;
    let summary = json(&body);
    assert_eq!(summary["kpis"]["total_orders"], 1);
    assert_eq!(summary["kpis"]["sla_breach_rate"], 1.0);
}

#[tokio::test]
async fn unmatched_filter_returns_zero_kpis_and_empty_series() {
    let (_dir, addr) = spawn_server().await;
    let (status, _, body) = send_raw(addr, "/api/summary?platform=Nope").await;
    assert_eq!(status, 200);
    let summary = json(&body);
    assert_eq!(summary["kpis"]["total_orders"], 0);
    assert_eq!(summary["kpis"]["sla_breach_rate"], 0.0);
    assert_eq!(summary["sla_status"], serde_json::json!([]));
    assert_eq!(summary["breach_rate_by_platform"], serde_json::json!([]));
    assert_eq!(summary["hourly_orders"], serde_json::json!([]));

    let (_, _, body) = send_raw(addr, "/api/complaints?platform=Nope").await;
    assert_eq!(json(&body), serde_json::json!([]));
}

#[tokio::test]
async fn complaints_rank_low_rating_bigrams() {
    let (_dir, addr) = spawn_server().await;
    let (status, _, body) = send_raw(addr, "/api/complaints").await;
    assert_eq!(status, 200);
    let phrases = json(&body);
    assert_eq!(phrases[0]["phrase"], "wrong item");
    assert_eq!(phrases[0]["count"], 2);

    let (_, _, body) = send_raw(addr, "/api/complaints?limit=1").await;
    assert_eq!(json(&body).as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn options_list_distinct_platforms_and_categories() {
    let (_dir, addr) = spawn_server().await;
    let (_, _, body) = send_raw(addr, "/api/options").await;
    let options = json(&body);
    assert_eq!(options["platforms"], serde_json::json!(["Blinkit", "Zepto"]));
    assert_eq!(options["categories"], serde_json::json!(["Dairy", "Snacks"]));
}

#[tokio::test]
async fn dashboard_page_renders_kpis_and_filters() {
    let (_dir, addr) = spawn_server().await;
    let (status, head, body) = send_raw(addr, "/?platform=Blinkit").await;
    assert_eq!(status, 200);
    assert!(head.to_ascii_lowercase().contains("content-type: text/html"));
    assert!(body.contains("Quick Commerce Delivery Intelligence"));
    assert!(body.contains("<option value=\"Blinkit\" selected>Blinkit</option>"));
    assert!(body.contains("Executive Insights"));
}

#[tokio::test]
async fn insights_download_is_an_attachment() {
    let (_dir, addr) = spawn_server().await;
    let (status, head, body) = send_raw(addr, "/download/insights.txt?platform=Zepto").await;
    assert_eq!(status, 200);
    assert!(head
        .to_ascii_lowercase()
        .contains("content-disposition: attachment; filename=\"quick_commerce_insights.txt\""));
    assert!(body.contains("Total orders: 1"));
    assert!(body.contains("SLA breach rate: 100.00%"));
}

#[tokio::test]
async fn deck_download_is_a_zip_package() {
    let (_dir, addr) = spawn_server().await;
    let (status, head, body) = send_raw_bytes(addr, "/download/report.pptx").await;
    assert_eq!(status, 200);
    assert!(head.contains("quick_commerce_insights.pptx"));
    assert_eq!(&body[..2], b"PK");
}

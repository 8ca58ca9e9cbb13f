use std::path::Path;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use jobsheet_api::app::services::AppServices;
use jobsheet_core::FixedClock;
use jobsheet_infra::{AppConfig, InMemoryJobStore, JobStore, SqliteJobStore};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    clock: Arc<FixedClock>,
    output: tempfile::TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_store(|_| async { Arc::new(InMemoryJobStore::new()) as Arc<dyn JobStore> }).await
    }

    async fn spawn_sqlite() -> Self {
        Self::spawn_with_store(|dir| async move {
            let store = SqliteJobStore::connect_path(&dir.join("jobsheet.db"))
                .await
                .expect("failed to open sqlite store");
            Arc::new(store) as Arc<dyn JobStore>
        })
        .await
    }

    async fn spawn_with_store<F, Fut>(open_store: F) -> Self
    where
        F: FnOnce(std::path::PathBuf) -> Fut,
        Fut: std::future::Future<Output = Arc<dyn JobStore>>,
    {
        let output = tempfile::tempdir().expect("failed to create temp dir");
        let receipts = output.path().join("receipts");
        let receipts_str = receipts.to_string_lossy().into_owned();
        let config = AppConfig::from_lookup(|key| match key {
            "JOBSHEET_OUTPUT_DIR" => Some(receipts_str.clone()),
            "JOBSHEET_SHOP_NAME" => Some("Test Repairs".to_string()),
            "JOBSHEET_UTC_OFFSET" => Some("+05:30".to_string()),
            _ => None,
        })
        .expect("valid test config");

        // 2024-01-15 10:00 shop time.
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 4, 30, 0).unwrap()));
        let store = open_store(output.path().to_path_buf()).await;
        let services = AppServices::new(store, clock.clone(), &config);

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = jobsheet_api::app::build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            clock,
            output,
            handle,
        }
    }

    fn receipts_dir(&self) -> std::path::PathBuf {
        self.output.path().join("receipts")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn intake(customer: &str, phone: &str, serial: &str) -> serde_json::Value {
    json!({
        "customer_name": customer,
        "phone": phone,
        "model": "HP LaserJet P1108",
        "serial": serial,
        "symptom": "paper jam on every second page",
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: serde_json::Value) -> reqwest::Response {
    let res = client
        .post(format!("{}/jobsheets", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    srv.clock.advance(ChronoDuration::minutes(1));
    res
}

fn header<'a>(res: &'a reqwest::Response, name: &str) -> &'a str {
    res.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing {name} header"))
        .to_str()
        .unwrap()
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[tokio::test]
async fn health_is_ok_and_carries_request_id() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(uuid::Uuid::parse_str(header(&res, "x-request-id")).is_ok());
}

#[tokio::test]
async fn intake_returns_pdf_attachment_and_writes_receipt() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, intake("Asha Rao", "909-502-2199", "CN12345")).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(header(&res, "content-type"), "application/pdf");
    assert_eq!(header(&res, "x-jobsheet-code"), "20240115-001");
    assert_eq!(
        header(&res, "content-disposition"),
        "attachment; filename=\"jobsheet_20240115-001_Asha_Rao.pdf\""
    );

    let bytes = res.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let written = std::fs::read(srv.receipts_dir().join("jobsheet_20240115-001_Asha_Rao.pdf")).unwrap();
    assert_eq!(written, bytes.to_vec());
}

#[tokio::test]
async fn sequential_intakes_get_contiguous_codes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut codes = Vec::new();
    for i in 0..5 {
        let res = create(&client, &srv, intake(&format!("Customer {i}"), "9000000000", "SN")).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        codes.push(header(&res, "x-jobsheet-code").to_string());
    }

    let expected: Vec<String> = (1..=5).map(|n| format!("20240115-{n:03}")).collect();
    assert_eq!(codes, expected);
}

#[tokio::test]
async fn intake_date_follows_shop_offset() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // 20:00 UTC is 01:30 the next day at +05:30.
    srv.clock.set(Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap());
    let res = create(&client, &srv, intake("Late Night", "9000000000", "SN")).await;

    assert_eq!(header(&res, "x-jobsheet-code"), "20240116-001");
}

#[tokio::test]
async fn missing_fields_are_rejected_without_persisting() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({ "customer_name": "Asha", "phone": "  " })).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "missing required fields: phone, model, serial");

    let res = client.get(format!("{}/jobsheets", srv.base_url)).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(file_count(&srv.receipts_dir()), 0);

    // The next valid intake still starts at 001.
    let res = create(&client, &srv, intake("Asha", "9000000000", "SN")).await;
    assert_eq!(header(&res, "x-jobsheet-code"), "20240115-001");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/jobsheets", srv.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn search_filters_and_orders_newest_first() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, intake("Asha Rao", "9095022199", "CN-AAA")).await;
    create(&client, &srv, intake("Vikram", "98450 11111", "CN-BBB")).await;
    create(&client, &srv, intake("asha menon", "+91 80 2222", "XJ-CCC")).await;

    let res = client.get(format!("{}/jobsheets", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let codes: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["20240115-003", "20240115-002", "20240115-001"]);

    let res = client
        .get(format!("{}/jobsheets", srv.base_url))
        .query(&[("phone", "909-502-2199")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["customer_name"], "Asha Rao");
    assert_eq!(items[0]["created_at_local"], "2024-01-15 10:00:00");

    // Customer search is case-sensitive.
    let res = client
        .get(format!("{}/jobsheets", srv.base_url))
        .query(&[("customer", " Asha "), ("serial", "")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["code"], "20240115-001");

    let res = client
        .get(format!("{}/jobsheets", srv.base_url))
        .query(&[("serial", "CN-"), ("phone", "45 011111")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["customer_name"], "Vikram");
}

#[tokio::test]
async fn lookup_by_code() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, json!({
        "customer_name": "Asha Rao",
        "phone": "9095022199",
        "model": "Canon LBP2900",
        "serial": "CN-1",
    }))
    .await;

    let res = client
        .get(format!("{}/jobsheets/20240115-001", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "20240115-001");
    assert_eq!(body["date"], "2024-01-15");
    assert_eq!(body["daily_counter"], 1);
    assert_eq!(body["model"], "Canon LBP2900");
    assert_eq!(body["symptom"], "");
    assert_eq!(body["created_at"], "2024-01-15T04:30:00Z");

    let res = client
        .get(format!("{}/jobsheets/20240115-002", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = client
        .get(format!("{}/jobsheets/not-a-code", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_code");
}

#[tokio::test]
async fn receipt_can_be_downloaded_again() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, intake("!!!", "9095022199", "CN-1")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let original = res.bytes().await.unwrap();

    let res = client
        .get(format!("{}/jobsheets/20240115-001/receipt", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        header(&res, "content-disposition"),
        "attachment; filename=\"jobsheet_20240115-001_customer.pdf\""
    );
    let again = res.bytes().await.unwrap();
    assert!(again.starts_with(b"%PDF-"));
    assert_eq!(again.len(), original.len());
    assert_eq!(file_count(&srv.receipts_dir()), 1);

    let res = client
        .get(format!("{}/jobsheets/20240115-009/receipt", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sqlite_backed_intake_sequences_and_searches() {
    let srv = TestServer::spawn_sqlite().await;
    let client = reqwest::Client::new();

    for name in ["Asha", "Vikram", "Meera"] {
        let res = create(&client, &srv, intake(name, "080-2222-3333", "SN")).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/jobsheets", srv.base_url))
        .query(&[("phone", "08022223333")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["customer_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Meera", "Vikram", "Asha"]);
}

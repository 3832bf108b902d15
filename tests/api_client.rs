// HTTP-level tests for the blocking `ApiClient` against a wiremock server.
//
// The mock server lives on a multi-threaded tokio runtime; the blocking client
// is called from the test thread, outside any runtime context.

use batch_enrich_cli::api::{ApiClient, BatchApi};
use batch_enrich_cli::config::ClientConfig;
use batch_enrich_cli::error::ApiError;
use batch_enrich_cli::model::{EnrichmentFlags, UploadRequest};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime")
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::default().with_base_url(server.uri())).unwrap()
}

fn csv_request() -> UploadRequest {
    UploadRequest {
        flags: EnrichmentFlags::default(),
        file_name: "test-enrichment-flow.csv".into(),
        contents: b"payee,amount\r\nACME Corp,12.50\r\n".to_vec(),
    }
}

#[test]
fn upload_posts_multipart_and_reads_batch_id() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(header_regex(
                "content-type",
                "^multipart/form-data; boundary=----WebKitFormBoundary[0-9a-f]{32}$",
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"batchId": "b-77", "filename": "x.csv"})),
            )
            .expect(1)
            .mount(&server),
    );

    let receipt = client(&server).upload(&csv_request()).unwrap();

    assert_eq!(receipt.batch_id.as_str(), "b-77");
    assert_eq!(receipt.raw["filename"], "x.csv");

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.url.path(), "/api/upload");

    let content_type = request
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();

    let body = std::str::from_utf8(&request.body).unwrap();
    assert!(body.starts_with(&format!("--{boundary}\r\n")));
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    for field in [
        "enableFinexio",
        "enableMastercard",
        "enableGoogleAddress",
        "enableAkkio",
    ] {
        assert!(body.contains(&format!("name=\"{field}\"\r\n\r\ntrue\r\n")));
    }
    assert!(body.contains(
        "filename=\"test-enrichment-flow.csv\"\r\nContent-Type: text/csv\r\n\r\npayee,amount\r\nACME Corp,12.50\r\n\r\n"
    ));

    rt.block_on(server.verify());
}

#[test]
fn upload_failure_carries_status_and_body() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"not a csv"}"#))
            .mount(&server),
    );

    let err = client(&server).upload(&csv_request()).unwrap_err();

    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Status { status, body, .. }) => {
            assert_eq!(*status, 400);
            assert!(body.contains("not a csv"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn upload_without_identifier_is_reported() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
            .mount(&server),
    );

    let err = client(&server).upload(&csv_request()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::MissingBatchId { .. })
    ));
}

#[test]
fn list_batches_reads_records_leniently() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/api/upload/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": null, "status": "failed"},
                {"id": "b-0", "totalRecords": "12"},
                {"id": "b-1", "status": "completed", "processedRecords": 10.0, "totalRecords": 3},
                {"id": 2, "status": "processing"}
            ])))
            .expect(1)
            .mount(&server),
    );

    let batches = client(&server).list_batches().unwrap();

    let ids: Vec<&str> = batches.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b-0", "b-1", "2"]);
    assert_eq!(batches[0].total_records(), "12");
    assert!(batches[1].is_completed());
    assert_eq!(batches[1].processed_records(), "10");
    assert_eq!(batches[1].total_records(), "3");
    assert_eq!(batches[2].current_step(), "N/A");

    rt.block_on(server.verify());
}

#[test]
fn list_batches_rejection_is_a_status_error() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/api/upload/batches"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server),
    );

    let err = client(&server).list_batches().unwrap_err();

    let api_err = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_err.status(), Some(503));
}

//! In-process HTTP tests against the full router

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use domain_metrics::ports::CacheStore;
use domain_metrics::DashboardService;
use interface_api::{config::ApiConfig, create_router};
use test_utils::fixtures::sample_market;
use test_utils::{MemoryCacheStore, MemoryFactStore};

fn server_with(store: MemoryFactStore) -> TestServer {
    let service = DashboardService::new(Arc::new(store), Arc::new(MemoryCacheStore::new()));
    TestServer::new(create_router(service, ApiConfig::default())).unwrap()
}

fn sample_server() -> TestServer {
    server_with(sample_market().build())
}

#[tokio::test]
async fn health_endpoints_respond() {
    let server = sample_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let response = server.get("/health/ready").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn dashboard_returns_all_three_dimensions() {
    let server = sample_server();
    let response = server.get("/api/v1/dashboard").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["metadata"]["source"], "live");
    assert_eq!(body["metadata"]["as_of_date"], "2024-04-10");
    assert_eq!(body["client_balances"].as_array().unwrap().len(), 2);
    assert_eq!(body["fund_balances"].as_array().unwrap().len(), 3);
    assert_eq!(body["account_details"].as_array().unwrap().len(), 3);
    assert_eq!(body["kpi_metrics"]["active_clients"], 2);

    let first_client = &body["client_balances"][0];
    assert_eq!(first_client["client_id"], "CLT1");
    assert_eq!(first_client["client_name"], "Alpha Capital");
}

#[tokio::test]
async fn malformed_date_yields_a_problem_document() {
    let server = sample_server();
    let response = server
        .get("/api/v1/dashboard")
        .add_query_param("date", "not-a-date")
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-parameter");
    assert_eq!(body["status"], 400);
    assert!(body["detail"].as_str().unwrap().contains("not-a-date"));
    assert!(body["instance"].as_str().unwrap().starts_with("urn:uuid:"));
}

#[tokio::test]
async fn malformed_identifier_yields_a_problem_document() {
    let server = sample_server();
    let response = server
        .get("/api/v1/dashboard")
        .add_query_param("client_ids", "CLT1,bad id!")
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-parameter");
    assert!(body["detail"].as_str().unwrap().contains("bad id!"));
}

#[tokio::test]
async fn unknown_selection_source_is_rejected() {
    let server = sample_server();
    let response = server
        .get("/api/v1/dashboard")
        .add_query_param("selection_source", "portfolio")
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn selection_source_keeps_client_list_complete_over_http() {
    let server = sample_server();
    let response = server
        .get("/api/v1/dashboard")
        .add_query_param("client_ids", "CLT1")
        .add_query_param("selection_source", "client")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["client_balances"].as_array().unwrap().len(), 2);
    assert_eq!(body["fund_balances"].as_array().unwrap().len(), 2);
    assert_eq!(body["account_details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn client_drilldown_scopes_to_one_client() {
    let server = sample_server();
    let response = server.get("/api/v1/clients/CLT1").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["client_balances"].as_array().unwrap().len(), 1);
    assert_eq!(body["fund_balances"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn overlong_identifier_in_path_is_rejected() {
    let server = sample_server();
    let long_id = "A".repeat(65);
    let response = server.get(&format!("/api/v1/clients/{long_id}")).await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn pagination_round_trip_over_http() {
    let server = sample_server();

    let first = server
        .get("/api/v1/dashboard")
        .add_query_param("page_size", "2")
        .await;
    first.assert_status_ok();
    let body: Value = first.json();
    assert_eq!(body["account_details"].as_array().unwrap().len(), 2);
    let info = &body["pagination"]["account"];
    assert_eq!(info["has_more"], true);
    let cursor = info["next_cursor"].as_str().unwrap().to_string();

    let second = server
        .get("/api/v1/dashboard")
        .add_query_param("page_size", "2")
        .add_query_param("account_cursor", &cursor)
        .await;
    second.assert_status_ok();
    let body: Value = second.json();
    let accounts = body["account_details"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["account_id"], "ACC3");
    assert_eq!(body["pagination"]["account"]["has_more"], false);
}

#[tokio::test]
async fn export_count_without_filter_is_a_problem() {
    let server = sample_server();
    let response = server.get("/api/v1/export/count").await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/no-filter-supplied");
}

#[tokio::test]
async fn export_count_with_filter_reports_rows_and_ceiling() {
    let server = sample_server();
    let response = server
        .get("/api/v1/export/count")
        .add_query_param("fund_names", "Growth Fund")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["row_count"], 2);
    assert_eq!(body["ceiling"], 1_000_000);
}

#[tokio::test]
async fn export_over_ceiling_is_rejected_with_counts() {
    let service = DashboardService::new(
        Arc::new(sample_market().build()),
        Arc::new(MemoryCacheStore::new()),
    )
    .with_export_row_ceiling(2);
    let server = TestServer::new(create_router(service, ApiConfig::default())).unwrap();

    let response = server.get("/api/v1/export/rows").await;
    response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/download-too-large");
    assert!(body["detail"].as_str().unwrap().contains('4'));
    assert!(body["detail"].as_str().unwrap().contains('2'));
}

#[tokio::test]
async fn export_rows_include_baseline_deltas() {
    let server = sample_server();
    let response = server
        .get("/api/v1/export/rows")
        .add_query_param("fund_names", "Growth Fund")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["account_id"], "ACC1");
    assert_eq!(rows[0]["fund_ticker"], "GRW");
}

#[tokio::test]
async fn cached_snapshot_is_tagged_in_metadata() {
    let cache = Arc::new(MemoryCacheStore::new());
    let service = DashboardService::new(Arc::new(sample_market().build()), cache.clone());
    let snapshot = service.build_cache_snapshot(None).await.unwrap().unwrap();
    cache.replace(&snapshot).await.unwrap();
    let server = TestServer::new(create_router(service, ApiConfig::default())).unwrap();

    let response = server.get("/api/v1/dashboard").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["metadata"]["source"], "cached");
    assert!(body["metadata"]["materialized_at"].is_string());
}

#[tokio::test]
async fn empty_store_returns_an_empty_dashboard_not_an_error() {
    let server = server_with(MemoryFactStore::empty());
    let response = server.get("/api/v1/dashboard").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["client_balances"].as_array().unwrap().is_empty());
    assert!(body["charts"]["recent_history"].as_array().unwrap().is_empty());
    assert_eq!(body["metadata"]["as_of_date"], Value::Null);
}

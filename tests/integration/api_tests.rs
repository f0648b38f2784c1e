// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{create_test_app, domain_status, mock_llm_reply, seed_domain};
use axum::http::StatusCode;
use leadrs::domain::models::domain::DomainStatus;
use leadrs::domain::models::message::{DomainMessage, PushRequest};
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_works() {
    let app = create_test_app().await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn target_lifecycle() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/targets")
        .json(&json!({ "ip": "203.0.113.10", "name": "sakura" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["status"], "init");
    assert_eq!(created["current_page"], 1);
    let id = created["id"].as_i64().unwrap();

    let duplicate = app
        .server
        .post("/v1/targets")
        .json(&json!({ "ip": "203.0.113.10", "name": "again" }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = duplicate.json();
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["class"], "data_problem");

    let updated: Value = app
        .server
        .patch(&format!("/v1/targets/{}", id))
        .json(&json!({ "current_page": 3 }))
        .await
        .json();
    assert_eq!(updated["current_page"], 3);

    app.server
        .post(&format!("/v1/targets/{}/disable", id))
        .await
        .assert_status_ok();

    let active: Value = app.server.get("/v1/targets").await.json();
    assert_eq!(active.as_array().unwrap().len(), 0);

    let all: Value = app
        .server
        .get("/v1/targets")
        .add_query_param("include_disabled", "true")
        .await
        .json();
    assert_eq!(all[0]["status"], "disabled");
}

#[tokio::test]
async fn invalid_target_ip_is_rejected() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/targets")
        .json(&json!({ "ip": "not-an-ip", "name": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_domains_with_filters() {
    let app = create_test_app().await;
    seed_domain(&app.db, "shop-a.jp", "sakura", DomainStatus::Initialize).await;
    seed_domain(&app.db, "shop-b.jp", "sakura", DomainStatus::Done).await;
    seed_domain(&app.db, "blog.jp", "WIX", DomainStatus::Initialize).await;

    let page: Value = app
        .server
        .get("/v1/domains")
        .add_query_param("status", "initialize")
        .await
        .json();
    assert_eq!(page["total"], 2);
    assert!(page["domains"][0].get("raw_page").is_none());

    let page: Value = app
        .server
        .get("/v1/domains")
        .add_query_param("name", "shop")
        .add_query_param("target", "sakura")
        .await
        .json();
    assert_eq!(page["total"], 2);

    let bad = app
        .server
        .get("/v1/domains")
        .add_query_param("status", "exported")
        .await;
    bad.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_and_trash_domain() {
    let app = create_test_app().await;
    let domain = seed_domain(&app.db, "a.jp", "sakura", DomainStatus::CheckView).await;

    let updated: Value = app
        .server
        .patch(&format!("/v1/domains/{}", domain.id))
        .json(&json!({
            "status": "crawl_comp_info",
            "can_view": true,
            "phone": "090-1111-2222, 03-1234-5678"
        }))
        .await
        .json();
    assert_eq!(updated["status"], "crawl_comp_info");
    assert_eq!(updated["mobile_phone"], "090-1111-2222");
    assert_eq!(updated["landline_phone"], "03-1234-5678");

    let bad = app
        .server
        .patch(&format!("/v1/domains/{}", domain.id))
        .json(&json!({ "status": "archived" }))
        .await;
    bad.assert_status(StatusCode::BAD_REQUEST);

    let trashed: Value = app
        .server
        .post(&format!("/v1/domains/{}/trash", domain.id))
        .await
        .json();
    assert_eq!(trashed["status"], "trash");

    app.server
        .get("/v1/domains/9999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_enriches_domain_and_returns_no_content() {
    let app = create_test_app().await;
    mock_llm_reply(&app.llm, "建設業,山田 太郎,株式会社サンプル,東京都").await;
    let domain = seed_domain(&app.db, "a.jp", "sakura", DomainStatus::CrawlCompInfo).await;

    let push = PushRequest::wrap(&DomainMessage::new(domain.id)).unwrap();
    app.server
        .post("/v1/webhook/analyze")
        .json(&push)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let reloaded: Value = app
        .server
        .get(&format!("/v1/domains/{}", domain.id))
        .await
        .json();
    assert_eq!(reloaded["status"], "pending_output");
    assert_eq!(reloaded["company"], "株式会社サンプル");

    // Redelivery is a no-op but still acknowledged.
    app.server
        .post("/v1/webhook/analyze")
        .json(&push)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(
        domain_status(&app.db, domain.id).await,
        DomainStatus::PendingOutput
    );
}

#[tokio::test]
async fn webhook_rejects_bad_payload() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/webhook/analyze")
        .json(&json!({ "message": { "data": "%%%not-base64%%%" } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_surfaces_enrichment_failure() {
    let app = create_test_app().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&app.llm)
        .await;
    let domain = seed_domain(&app.db, "a.jp", "sakura", DomainStatus::CrawlCompInfo).await;

    let push = PushRequest::wrap(&DomainMessage::new(domain.id)).unwrap();
    let response = app.server.post("/v1/webhook/analyze").json(&push).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["class"], "retry_later");
    assert_eq!(
        domain_status(&app.db, domain.id).await,
        DomainStatus::CrawlCompInfo
    );
}

#[tokio::test]
async fn polling_and_output_endpoints() {
    let app = create_test_app().await;
    let fresh = seed_domain(&app.db, "new.jp", "sakura", DomainStatus::Initialize).await;
    let ready = seed_domain(&app.db, "ready.jp", "sakura", DomainStatus::PendingOutput).await;

    let report: Value = app.server.post("/v1/pipeline/polling").await.json();
    assert_eq!(report["selected"], 1);
    assert_eq!(report["dispatched"], json!([fresh.id]));
    assert_eq!(app.channel.published_ids(), vec![fresh.id]);
    assert_eq!(domain_status(&app.db, fresh.id).await, DomainStatus::CheckView);

    let report: Value = app.server.post("/v1/pipeline/output").await.json();
    assert_eq!(report["exported"], 1);
    assert_eq!(report["flipped"], 1);
    assert_eq!(domain_status(&app.db, ready.id).await, DomainStatus::Done);

    let empty: Value = app.server.post("/v1/pipeline/output").await.json();
    assert_eq!(empty["exported"], 0);
}

#[tokio::test]
async fn batch_analyze_endpoint() {
    let app = create_test_app().await;
    mock_llm_reply(&app.llm, "飲食業,なし,株式会社Y,大阪府").await;
    let a = seed_domain(&app.db, "a.jp", "sakura", DomainStatus::CrawlCompInfo).await;
    let b = seed_domain(&app.db, "b.jp", "sakura", DomainStatus::CrawlCompInfo).await;

    let report: Value = app.server.post("/v1/pipeline/analyze").await.json();
    assert_eq!(report["selected"], 2);
    assert_eq!(report["failed"], json!([]));
    assert_eq!(domain_status(&app.db, a.id).await, DomainStatus::PendingOutput);
    assert_eq!(domain_status(&app.db, b.id).await, DomainStatus::PendingOutput);
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{create_test_app, mock_llm_reply};
use axum::http::StatusCode;
use leadrs::domain::models::message::{DomainMessage, PushRequest};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// 端到端流程：抓取 → 派发 → 外部阶段 → 富化 → 导出
#[tokio::test]
async fn domain_travels_the_whole_pipeline() {
    let app = create_test_app().await;

    Mock::given(method("GET"))
        .and(path("/reverseip/"))
        .and(query_param("host", "203.0.113.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "domain_count": "2",
                "domains": [
                    { "name": "Alpha.jp", "last_resolved": "2025-01-01" },
                    { "name": "beta.jp", "last_resolved": "2025-01-01" }
                ]
            }
        })))
        .mount(&app.view_dns)
        .await;
    mock_llm_reply(&app.llm, "建設業,山田 太郎,株式会社アルファ,東京都").await;

    app.server
        .post("/v1/targets")
        .json(&json!({ "ip": "203.0.113.10", "name": "sakura" }))
        .await
        .assert_status(StatusCode::CREATED);

    // Crawl
    let sweep: Value = app.server.post("/v1/pipeline/fetch").await.json();
    assert_eq!(sweep["inserted"], 2);
    assert_eq!(sweep["failed"], json!([]));
    let targets: Value = app.server.get("/v1/targets").await.json();
    assert_eq!(targets[0]["status"], "fetched");
    assert_eq!(targets[0]["current_page"], 1);
    assert!(!targets[0]["last_full_scan_at"].is_null());

    // Fan-out
    let fan_out: Value = app.server.post("/v1/pipeline/polling").await.json();
    assert_eq!(fan_out["dispatched"].as_array().unwrap().len(), 2);

    let page: Value = app
        .server
        .get("/v1/domains")
        .add_query_param("name", "alpha")
        .await
        .json();
    let alpha = &page["domains"][0];
    assert_eq!(alpha["name"], "alpha.jp");
    assert_eq!(alpha["status"], "check_view");
    let id = alpha["id"].as_i64().unwrap() as i32;
    assert!(app.channel.published_ids().contains(&id));

    // External viewability stage
    app.server
        .patch(&format!("/v1/domains/{}", id))
        .json(&json!({
            "status": "crawl_comp_info",
            "can_view": true,
            "is_japan": true,
            "title": "アルファ建設",
            "phone": "03-1111-2222,080-3333-4444",
            "raw_page": "会社概要 代表取締役 山田 太郎"
        }))
        .await
        .assert_status_ok();

    // Enrichment via push delivery
    let push = PushRequest::wrap(&DomainMessage::new(id)).unwrap();
    app.server
        .post("/v1/webhook/analyze")
        .json(&push)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let enriched: Value = app.server.get(&format!("/v1/domains/{}", id)).await.json();
    assert_eq!(enriched["status"], "pending_output");
    assert_eq!(enriched["mobile_phone"], "080-3333-4444");
    assert_eq!(enriched["landline_phone"], "03-1111-2222");
    assert_eq!(enriched["industry"], "建設業");

    // Export
    let export: Value = app.server.post("/v1/pipeline/output").await.json();
    assert_eq!(export["exported"], 1);
    assert_eq!(export["flipped"], 1);

    let done: Value = app.server.get(&format!("/v1/domains/{}", id)).await.json();
    assert_eq!(done["status"], "done");

    let batch_dir = std::fs::read_dir(app.export_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let rows: Value =
        serde_json::from_slice(&std::fs::read(batch_dir.join("sakura.json")).unwrap()).unwrap();
    assert_eq!(rows[0]["name"], "alpha.jp");
    assert_eq!(rows[0]["company"], "株式会社アルファ");
}

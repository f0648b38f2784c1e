// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use leadrs::domain::services::llm_service::{EnrichmentClient, LLMService};
use leadrs::domain::services::reverse_ip_service::ReverseIpClient;
use leadrs::infrastructure::clients::view_dns_client::ViewDnsClient;
use leadrs::utils::errors::ErrorKind;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn view_dns(server: &MockServer, api_key: Option<&str>) -> ViewDnsClient {
    ViewDnsClient::new(
        &server.uri(),
        api_key.map(str::to_string),
        100,
        Duration::from_secs(5),
    )
    .unwrap()
}

fn llm(server: &MockServer, api_key: Option<&str>) -> LLMService {
    LLMService::new_with_config(
        api_key.map(str::to_string),
        "test-model".to_string(),
        format!("{}/", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn view_dns_lookup_sends_query_and_parses_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverseip/"))
        .and(query_param("host", "203.0.113.10"))
        .and(query_param("apikey", "secret"))
        .and(query_param("page", "2"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "tool": "reverseip_PRO", "host": "203.0.113.10" },
            "response": {
                "domain_count": "10001",
                "domains": [
                    { "name": "Example.JP", "last_resolved": "2025-01-01" },
                    { "name": "shop.example.jp", "last_resolved": "2025-02-01" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = view_dns(&server, Some("secret"))
        .lookup("203.0.113.10", 2)
        .await
        .unwrap();
    assert_eq!(page.total_count().unwrap(), 10001);
    assert_eq!(page.names(), vec!["example.jp", "shop.example.jp"]);
}

#[tokio::test]
async fn view_dns_error_status_is_external() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let err = view_dns(&server, Some("secret"))
        .lookup("203.0.113.10", 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalApi);
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn view_dns_requires_api_key() {
    let server = MockServer::start().await;
    let err = view_dns(&server, None)
        .lookup("203.0.113.10", 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalApi);
}

#[tokio::test]
async fn llm_enrich_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer secret"))
        .and(body_string_contains("test-model"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": " 建設業 , なし , 株式会社サンプル , 東京都 " } }]
        })))
        .mount(&server)
        .await;

    let result = llm(&server, Some("secret")).enrich("会社概要").await.unwrap();
    assert_eq!(result.industry.as_deref(), Some("建設業"));
    assert_eq!(result.president, None);
    assert_eq!(result.company.as_deref(), Some("株式会社サンプル"));
    assert_eq!(result.prefecture.as_deref(), Some("東京都"));
}

#[tokio::test]
async fn llm_malformed_or_empty_reply_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let result = llm(&server, Some("secret")).enrich("page").await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn llm_error_status_is_external() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = llm(&server, Some("secret")).enrich("page").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalApi);

    let err = llm(&server, None).enrich("page").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalApi);
}

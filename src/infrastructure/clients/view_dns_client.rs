// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::reverse_ip_service::{ReverseIpClient, ReverseIpPage};
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE: &str = "ViewDNS";

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Deserialize)]
struct ReverseIpResponse {
    response: ReverseIpPage,
}

/// ViewDNS 反查客户端
///
/// 所有请求共享一个进程内限流器，避免触发远端的配额限制。
pub struct ViewDnsClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    limiter: DirectRateLimiter,
}

impl ViewDnsClient {
    /// 创建客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - 接口根地址，例如 `https://api.viewdns.info`
    /// * `api_key` - API密钥
    /// * `requests_per_second` - 每秒请求上限，0 按 1 处理
    /// * `timeout` - 单次请求超时
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        requests_per_second: u32,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::external(SERVICE, e))?;
        let endpoint = Url::parse(&format!("{}/reverseip/", base_url.trim_end_matches('/')))
            .map_err(|e| PipelineError::Validation(format!("invalid reverse-IP base url: {}", e)))?;
        let quota =
            Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            endpoint,
            api_key,
            limiter: RateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl ReverseIpClient for ViewDnsClient {
    async fn lookup(&self, host: &str, page: i32) -> Result<ReverseIpPage, PipelineError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PipelineError::external(SERVICE, "API key not configured"))?;

        self.limiter.until_ready().await;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("host", host)
            .append_pair("apikey", api_key)
            .append_pair("page", &page.to_string())
            .append_pair("output", "json");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::external(
                SERVICE,
                format!("{} - {}", status, error_text),
            ));
        }

        let body: ReverseIpResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;

        debug!(
            host,
            page,
            domain_count = %body.response.domain_count,
            returned = body.response.domains.len(),
            "Reverse-IP page fetched"
        );
        Ok(body.response)
    }
}

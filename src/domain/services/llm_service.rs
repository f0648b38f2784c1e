// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrichment::{EnrichmentResult, NOT_FOUND_SENTINEL};
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "LLM";

/// 富化客户端特质
///
/// 输入网页正文，输出行业、代表人、公司名和都道府县四个字段。
/// 回复格式不合法时返回空结果而不是错误。
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    async fn enrich(&self, raw_page: &str) -> Result<EnrichmentResult, PipelineError>;
}

/// LLM服务 - 通过兼容 OpenAI 的 chat completions 接口做富化
///
/// # 配置
///
/// 由 `llm` 配置段提供：
/// - `api_key` - LLM API密钥
/// - `model` - 使用的模型名称
/// - `api_base_url` - LLM API基础URL
pub struct LLMService {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
}

#[async_trait]
impl EnrichmentClient for LLMService {
    async fn enrich(&self, raw_page: &str) -> Result<EnrichmentResult, PipelineError> {
        match self.complete(raw_page).await? {
            Some(reply) => {
                let result = EnrichmentResult::parse(&reply);
                if result.is_empty() {
                    debug!(reply = %reply, "Enrichment reply carried no usable fields");
                }
                Ok(result)
            }
            None => Ok(EnrichmentResult::default()),
        }
    }
}

impl LLMService {
    pub fn new_with_config(
        api_key: Option<String>,
        model: String,
        api_base_url: String,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::external(SERVICE, e))?;

        Ok(Self {
            client,
            api_key,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn prompt(raw_page: &str) -> String {
        format!(
            "以下のウェブページの本文から、業種、代表者名、会社名、都道府県を抽出してください。\
            回答は「業種,代表者名,会社名,都道府県」の形式で、カンマ区切りの1行のみで返してください。\
            見つからない項目は「{sentinel}」と書いてください。\n\n本文:\n{page}",
            sentinel = NOT_FOUND_SENTINEL,
            page = raw_page
        )
    }

    /// 调用 chat completions 接口
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(String))` - 模型回复的文本
    /// * `Ok(None)` - 接口成功但没有任何候选回复
    /// * `Err(PipelineError)` - 密钥未配置、网络错误或非2xx响应
    async fn complete(&self, raw_page: &str) -> Result<Option<String>, PipelineError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| PipelineError::external(SERVICE, "LLM API key not configured"))?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You extract company information from Japanese web pages. Reply with exactly one comma-separated line."
                },
                {
                    "role": "user",
                    "content": Self::prompt(raw_page)
                }
            ],
            "temperature": 0.0
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request_body)
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;

        Ok(body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string))
    }
}

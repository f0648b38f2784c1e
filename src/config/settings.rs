// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、Redis、服务器、外部服务和流水线调度等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 反查服务配置
    pub reverse_ip: ReverseIpSettings,
    /// LLM配置
    pub llm: LlmSettings,
    /// 消息通道配置
    pub channel: ChannelSettings,
    /// 导出配置
    pub export: ExportSettings,
    /// 流水线配置
    pub pipeline: PipelineSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Redis配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    /// Prometheus 监听地址
    pub listen_addr: String,
}

/// 反查服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseIpSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// 远端固定的每页条数
    pub page_size: u64,
    /// 每秒请求上限
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

/// LLM配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

/// 消息通道配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSettings {
    /// 队列名称
    pub topic: String,
    /// 处理中列表名称
    pub processing_list: String,
    /// 队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 是否启动拉取消费者
    pub consumer_enabled: bool,
}

/// 导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    /// 导出目录
    pub output_dir: String,
}

/// 流水线配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 每次派发读取的 initialize 域名数
    pub polling_batch_size: u64,
    /// 工作池并发上限
    pub max_concurrency: usize,
    /// 混合抓取的页数预算
    pub fetch_quota: u32,
    /// 混合抓取中有界目标所占比例
    pub bounded_ratio: f64,
    /// 无界目标专用抓取的页数预算
    pub unbounded_quota: u32,
    /// 每个原子单元的期限（秒）
    pub unit_timeout_secs: u64,
    /// 派发时首个失败即中止整批
    pub fan_out_fail_fast: bool,
    /// RawPage 保存前截断到的字符数
    pub raw_page_max_chars: usize,
    /// 周期任务间隔（秒），0 表示不启动
    pub schedule_interval_secs: u64,
}

impl PipelineSettings {
    pub fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `LEADRS__` 前缀的环境变量，后者优先。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LEADRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 只包含默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.url", "postgres://localhost/leadrs")?
            .set_default("database.max_connections", 50)?
            .set_default("database.min_connections", 5)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .set_default("reverse_ip.base_url", "https://api.viewdns.info")?
            .set_default("reverse_ip.page_size", 10_000)?
            .set_default("reverse_ip.requests_per_second", 2)?
            .set_default("reverse_ip.timeout_secs", 60)?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.timeout_secs", 60)?
            .set_default("channel.topic", "domain-pipeline")?
            .set_default("channel.processing_list", "domain-pipeline:processing")?
            .set_default("channel.poll_interval_ms", 1000)?
            .set_default("channel.consumer_enabled", true)?
            .set_default("export.output_dir", "./exports")?
            .set_default("pipeline.polling_batch_size", 300)?
            .set_default("pipeline.max_concurrency", 20)?
            .set_default("pipeline.fetch_quota", 100)?
            .set_default("pipeline.bounded_ratio", 0.8)?
            .set_default("pipeline.unbounded_quota", 500)?
            .set_default("pipeline.unit_timeout_secs", 120)?
            .set_default("pipeline.fan_out_fail_fast", false)?
            .set_default("pipeline.raw_page_max_chars", 8000)?
            .set_default("pipeline.schedule_interval_secs", 600)
    }
}

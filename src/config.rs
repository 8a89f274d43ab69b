use std::time::Duration;

use tokio::sync::Semaphore;

use crate::orchestrator::RetryPolicy;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的准考证数量
    pub max_concurrent_tasks: usize,
    /// 成绩查询接口地址
    pub results_api_url: String,
    /// 单个准考证的最大尝试次数（0 表示无限重试）
    pub max_attempts: u32,
    /// 重试退避的初始等待（毫秒）
    pub retry_base_delay_ms: u64,
    /// 重试退避的最大等待（毫秒）
    pub retry_max_delay_ms: u64,
    /// 单次请求超时（秒，0 表示不限制）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 5,
            results_api_url: "https://www.ncb.edu.cn/portal/exam/getNoAccPersonPage".to_string(),
            max_attempts: 5,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 8_000,
            request_timeout_secs: 30,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，无法解析的值回退为默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        Self {
            max_concurrent_tasks: lookup("MAX_CONCURRENT_TASKS").and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_tasks),
            results_api_url: lookup("RESULTS_API_URL").unwrap_or(default.results_api_url),
            max_attempts: lookup("MAX_ATTEMPTS").and_then(|v| v.parse().ok()).unwrap_or(default.max_attempts),
            retry_base_delay_ms: lookup("RETRY_BASE_DELAY_MS").and_then(|v| v.parse().ok()).unwrap_or(default.retry_base_delay_ms),
            retry_max_delay_ms: lookup("RETRY_MAX_DELAY_MS").and_then(|v| v.parse().ok()).unwrap_or(default.retry_max_delay_ms),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            verbose_logging: lookup("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 并发上限，至少为 1，且不超过 Semaphore 能容纳的许可数
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_tasks.clamp(1, Semaphore::MAX_PERMITS)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            (self.max_attempts > 0).then_some(self.max_attempts),
            Duration::from_millis(self.retry_base_delay_ms),
            Duration::from_millis(self.retry_max_delay_ms),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

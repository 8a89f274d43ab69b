/// 成绩查询 API 客户端
///
/// 封装与成绩查询接口相关的调用逻辑
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::models::result_record::ResultsData;
use crate::models::{ResultRecord, ResultsQuery};

/// 成绩查询能力
#[async_trait]
pub trait ResultsFetcher: Send + Sync {
    async fn fetch_results(
        &self,
        national_id: &str,
        exam_ticket_number: &str,
    ) -> Result<Vec<ResultRecord>, FetchError>;
}

/// 成绩查询接口客户端
pub struct ResultsClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ResultsClient {
    /// 创建新的成绩查询客户端
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| FetchError::Transport {
            endpoint: config.results_api_url.clone(),
            source,
        })?;

        Ok(Self {
            client,
            endpoint: config.results_api_url.clone(),
        })
    }
}

#[async_trait]
impl ResultsFetcher for ResultsClient {
    async fn fetch_results(
        &self,
        national_id: &str,
        exam_ticket_number: &str,
    ) -> Result<Vec<ResultRecord>, FetchError> {
        let query = ResultsQuery::new(national_id, exam_ticket_number);
        let transport = |source| FetchError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("成绩查询响应 ({} 字节): 准考证 {}", body.len(), exam_ticket_number);

        parse_results_body(&self.endpoint, &body)
    }
}

/// 解析成绩查询响应
///
/// `data` 缺失或为 null 视为失败；`data.page.records` 为空数组则是"没有成绩"的正常结果。
pub fn parse_results_body(endpoint: &str, body: &[u8]) -> Result<Vec<ResultRecord>, FetchError> {
    let schema = |source| FetchError::Schema {
        endpoint: endpoint.to_string(),
        source,
    };

    let mut value: Value = serde_json::from_slice(body).map_err(schema)?;

    let data = match value.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => data,
        _ => {
            return Err(FetchError::MissingData {
                endpoint: endpoint.to_string(),
            })
        }
    };

    let data: ResultsData = serde_json::from_value(data).map_err(schema)?;
    Ok(data.page.records)
}

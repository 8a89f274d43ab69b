//! 准考证处理流程 - 流程层
//!
//! 核心职责：定义"一份准考证"一次尝试的完整处理流程
//!
//! 流程顺序：
//! 1. 提取身份信息（姓名 / 身份证号 / 准考证号）
//! 2. 刷新进度行
//! 3. 查询成绩
//! 4. 每条成绩记录配上姓名，作为排名条目返回
//!
//! 失败直接返回错误，是否重试由编排层决定。

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::ResultsFetcher;
use crate::error::AppResult;
use crate::models::ReportEntry;
use crate::services::IdentityExtractor;
use crate::utils::Progress;
use crate::workflow::TicketCtx;

/// 准考证处理流程
///
/// 不持有任何可变状态，可在多个任务间共享
pub struct TicketFlow {
    extractor: Arc<dyn IdentityExtractor>,
    fetcher: Arc<dyn ResultsFetcher>,
    progress: Progress,
}

impl TicketFlow {
    pub fn new(
        extractor: Arc<dyn IdentityExtractor>,
        fetcher: Arc<dyn ResultsFetcher>,
        progress: Progress,
    ) -> Self {
        Self {
            extractor,
            fetcher,
            progress,
        }
    }

    pub async fn run(&self, ctx: &TicketCtx) -> AppResult<Vec<ReportEntry>> {
        let identity = self.extractor.extract(&ctx.file).await?;
        debug!("{} 识别到考生 {}", ctx, identity);

        self.progress.fetching(&identity.name);

        let records = self
            .fetcher
            .fetch_results(&identity.national_id, &identity.exam_ticket_number)
            .await?;

        info!("{} ✓ {} 共 {} 条成绩记录", ctx, identity.name, records.len());

        Ok(records
            .into_iter()
            .map(|result| ReportEntry::new(identity.name.clone(), result))
            .collect())
    }
}

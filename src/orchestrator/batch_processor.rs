//! 批量准考证处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量准考证的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **目录扫描**：列出目录下所有文件（不按扩展名过滤）
//! 2. **并发控制**：使用 Semaphore 限制同时进行的尝试数量
//! 3. **失败重试**：单次尝试失败后释放名额，按重试策略重新排队
//! 4. **结果汇总**：任务通过 channel 上报结果，唯一的消费者负责汇总
//! 5. **全局统计**：所有任务结束（channel 关闭）后排序并统计
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个准考证的细节，委托给 `TicketFlow`
//! - **隔离 panic**：每次尝试单独 spawn，panic 视为一次失败

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::clients::{ResultsClient, ResultsFetcher};
use crate::config::Config;
use crate::error::{AppError, AppResult, DirectoryError};
use crate::models::{FailedTask, ReportEntry, RunReport, TaskOutcome};
use crate::orchestrator::{Aggregator, RetryPolicy};
use crate::services::{IdentityExtractor, PdfIdentityExtractor};
use crate::utils::{logging, Progress};
use crate::workflow::{TicketCtx, TicketFlow};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<TicketFlow>,
    retry: RetryPolicy,
    progress: Progress,
}

impl App {
    /// 使用 PDF 提取器和真实接口初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let fetcher = ResultsClient::new(&config)?;
        Ok(Self::with_services(
            config,
            Arc::new(PdfIdentityExtractor::new()),
            Arc::new(fetcher),
            Progress::for_stdout(),
        ))
    }

    /// 使用指定的提取器和查询客户端创建应用
    pub fn with_services(
        config: Config,
        extractor: Arc<dyn IdentityExtractor>,
        fetcher: Arc<dyn ResultsFetcher>,
        progress: Progress,
    ) -> Self {
        let retry = config.retry_policy();
        Self {
            config,
            flow: Arc::new(TicketFlow::new(extractor, fetcher, progress)),
            retry,
            progress,
        }
    }

    /// 覆盖配置中的重试策略
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 运行应用主逻辑：扫描目录、处理全部准考证、返回排好序的结果
    pub async fn run(&self, dir: &Path) -> AppResult<RunReport> {
        logging::log_startup(&self.config, dir);

        let file_names = list_ticket_files(dir).await?;
        logging::log_files_found(file_names.len());

        let total = file_names.len();
        let report = self.process_files(dir, file_names).await;

        logging::print_final_stats(&report, total);
        Ok(report)
    }

    /// 处理所有准考证，全部结束后返回汇总结果
    pub async fn process_files(&self, dir: &Path, file_names: Vec<String>) -> RunReport {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (idx, file_name) in file_names.iter().enumerate() {
            let ctx = TicketCtx::new(dir, file_name, idx + 1);
            let flow = Arc::clone(&self.flow);
            let semaphore = Arc::clone(&semaphore);
            let retry = self.retry;
            let tx = tx.clone();

            tokio::spawn(async move {
                let finished = run_until_settled(flow, semaphore, retry, ctx).await;
                // 接收端在所有发送端释放前不会关闭
                let _ = tx.send(finished);
            });
        }
        drop(tx);

        let mut aggregator = Aggregator::new();
        while let Some(finished) = rx.recv().await {
            aggregator.accept(finished);
            debug!("已完成 {}/{}", aggregator.settled(), file_names.len());
        }

        self.progress.clear();
        aggregator.finish()
    }
}

/// 列出目录下的全部文件名（按名称排序）
/// 检查命令行是否给出了准考证目录
///
/// # 参数
/// - `dir`: 命令行参数中的目录，可能缺省
///
/// # 返回
/// 给出的目录；缺省时返回 [`DirectoryError::Missing`]
pub fn require_ticket_dir(dir: Option<PathBuf>) -> Result<PathBuf, DirectoryError> {
    dir.ok_or(DirectoryError::Missing)
}

pub async fn list_ticket_files(dir: &Path) -> Result<Vec<String>, DirectoryError> {
    let path_text = dir.display().to_string();

    let metadata = match tokio::fs::metadata(dir).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DirectoryError::NotADirectory { path: path_text })
        }
        Err(source) => return Err(DirectoryError::Unreadable { path: path_text, source }),
    };
    if !metadata.is_dir() {
        return Err(DirectoryError::NotADirectory { path: path_text });
    }

    let unreadable = |source| DirectoryError::Unreadable {
        path: path_text.clone(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;

    let mut file_names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        file_names.push(entry.file_name().to_string_lossy().into_owned());
    }
    file_names.sort();

    Ok(file_names)
}

/// 反复尝试直到成功或重试策略放弃
async fn run_until_settled(
    flow: Arc<TicketFlow>,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
    mut ctx: TicketCtx,
) -> Result<TaskOutcome, FailedTask> {
    loop {
        match run_attempt(&flow, &semaphore, &ctx).await {
            Ok(entries) => {
                if ctx.attempt > 1 {
                    info!("{} ✓ 重试后成功", ctx);
                }
                return Ok(TaskOutcome {
                    file: ctx.file,
                    attempts: ctx.attempt,
                    entries,
                });
            }
            Err(err) => {
                let reason = err.to_string();
                logging::log_attempt_failed(&ctx.file, ctx.attempt, retry.max_attempts(), &reason);

                if !retry.should_retry(ctx.attempt) {
                    logging::log_gave_up(&ctx.file, ctx.attempt, &reason);
                    return Err(FailedTask {
                        file: ctx.file,
                        attempts: ctx.attempt,
                        last_error: reason,
                    });
                }

                let delay = retry.backoff(ctx.attempt);
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                ctx = ctx.next_attempt();
            }
        }
    }
}

/// 占用一个并发名额执行一次尝试
async fn run_attempt(
    flow: &Arc<TicketFlow>,
    semaphore: &Arc<Semaphore>,
    ctx: &TicketCtx,
) -> AppResult<Vec<ReportEntry>> {
    let permit = Arc::clone(semaphore)
        .acquire_owned()
        .await
        .map_err(|e| AppError::task_aborted(ctx.file_name(), e.to_string()))?;

    let flow = Arc::clone(flow);
    let attempt_ctx = ctx.clone();
    let handle = tokio::spawn(async move {
        let _permit = permit;
        flow.run(&attempt_ctx).await
    });

    match handle.await {
        Ok(result) => result,
        Err(e) => Err(AppError::task_aborted(ctx.file_name(), e.to_string())),
    }
}

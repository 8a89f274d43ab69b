//! # Exam Score Rank
//!
//! 批量读取准考证 PDF，查询职业技能等级证书考试成绩，并输出成绩排名
//!
//! ## 架构设计
//!
//! ### ① 能力层（Services / Clients）
//! - `services::identity_extractor` - 从准考证第一页提取姓名、身份证号、准考证号
//! - `clients::results_client` - 调用成绩查询接口
//!
//! ### ② 流程层（Workflow）
//! - `TicketCtx` - 上下文封装（文件 + 第几次尝试）
//! - `TicketFlow` - 一次尝试的流程编排（提取 → 进度 → 查询 → 组装）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator::batch_processor` - 并发控制、失败重试、结果上报
//! - `orchestrator::aggregator` - 汇总与排序
//!
//! ### ④ 输出
//! - `report` - 渲染排名文本
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ResultsClient, ResultsFetcher};
pub use config::Config;
pub use error::{AppError, AppResult, DirectoryError, ExtractionError, FetchError};
pub use models::{FailedTask, Identity, ReportEntry, ResultRecord, RunReport, TaskOutcome};
pub use orchestrator::{App, RetryPolicy};
pub use services::{IdentityExtractor, PdfIdentityExtractor};
pub use workflow::{TicketCtx, TicketFlow};

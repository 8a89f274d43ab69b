//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量准考证处理器
//! - 扫描目录，每个文件一个任务
//! - 控制并发数量（Semaphore）
//! - 按重试策略重新排队失败的任务
//! - 通过 channel 把结果交给汇总器
//!
//! ### `aggregator` - 成绩汇总
//! - 按完成顺序接收结果
//! - 全部结束后展平、排序
//!
//! ### `retry` - 重试策略
//! - 最大尝试次数与指数退避
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<文件>)
//!     ↓
//! workflow::TicketFlow (处理单个准考证的一次尝试)
//!     ↓
//! services / clients (能力层：提取身份 / 查询成绩)
//! ```

pub mod aggregator;
pub mod batch_processor;
pub mod retry;

// 重新导出主要类型
pub use aggregator::Aggregator;
pub use batch_processor::{list_ticket_files, require_ticket_dir, App};
pub use retry::RetryPolicy;

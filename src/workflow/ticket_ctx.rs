//! 准考证处理上下文
//!
//! 封装"我正在处理第几个准考证的第几次尝试"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 准考证处理上下文
#[derive(Debug, Clone)]
pub struct TicketCtx {
    /// 准考证文件完整路径
    pub file: PathBuf,

    /// 文件序号（从1开始，仅用于日志显示）
    pub file_index: usize,

    /// 当前是第几次尝试（从1开始）
    pub attempt: u32,
}

impl TicketCtx {
    pub fn new(dir: &Path, file_name: &str, file_index: usize) -> Self {
        Self {
            file: dir.join(file_name),
            file_index,
            attempt: 1,
        }
    }

    /// 下一次尝试的上下文
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

impl Display for TicketCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[准考证 #{} {} 第{}次]",
            self.file_index,
            self.file_name(),
            self.attempt
        )
    }
}

//! 单行进度提示
//!
//! 在终端同一行上刷新"正在获取 [姓名] 的成绩结果..."

use std::io::{self, IsTerminal, Write};

use colored::Colorize;

/// 清除当前行
const CLEAR_LINE: &str = "\r\x1b[2K";

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// 仅当标准输出是终端时显示进度，重定向到文件时保持输出干净
    pub fn for_stdout() -> Self {
        Self::new(io::stdout().is_terminal())
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// 显示正在查询的考生
    pub fn fetching(&self, name: &str) {
        if self.enabled {
            write_stdout(&fetching_line(name));
        }
    }

    /// 清掉进度行，避免和最终排名混在一起
    pub fn clear(&self) {
        if self.enabled {
            write_stdout(CLEAR_LINE);
        }
    }
}

fn fetching_line(name: &str) -> String {
    format!(
        "{}正在获取 [{}] 的成绩结果...",
        CLEAR_LINE,
        name.bright_blue().bold()
    )
}

fn write_stdout(text: &str) {
    let mut out = io::stdout().lock();
    // 进度行写失败不影响查询
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

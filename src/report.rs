//! 成绩排名输出
//!
//! 纯函数：同一个 `RunReport` 多次渲染得到完全相同的文本

use std::fmt::Write;

use colored::Colorize;

use crate::models::{ReportEntry, RunReport};

impl RunReport {
    /// 渲染排名文本，`color` 为 false 时不输出任何颜色控制符
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();

        out.push_str("\n🚩 考试成绩排名\n\n");

        if self.entries.is_empty() {
            out.push_str("（没有查询到任何成绩记录）\n");
        }

        for (index, entry) in self.entries.iter().enumerate() {
            let _ = writeln!(out, "{}", render_entry(index + 1, entry, color));
        }

        if !self.failures.is_empty() {
            let _ = writeln!(out, "\n⚠️ 以下 {} 个文件未能获取成绩\n", self.failures.len());
            for failed in &self.failures {
                let line = format!(
                    "{}\t尝试 {} 次\t{}",
                    failed.file.display(),
                    failed.attempts,
                    failed.last_error
                );
                let _ = writeln!(out, "{}", paint(line, color, |s| s.yellow().to_string()));
            }
        }

        out.push('\n');
        out
    }
}

fn render_entry(rank: usize, entry: &ReportEntry, color: bool) -> String {
    let prefix = paint(format!("[{}]", rank), color, |s| s.bright_black().to_string());
    let body = format!(
        "{}\t{}\t{}",
        entry.name,
        entry.result.cert_result_label(),
        entry.result.score
    );
    let body = if entry.result.is_passed() {
        paint(body, color, |s| s.green().to_string())
    } else {
        paint(body, color, |s| s.red().to_string())
    };
    format!("{}\t{}", prefix, body)
}

fn paint(text: String, color: bool, style: impl Fn(&str) -> String) -> String {
    if color {
        style(&text)
    } else {
        text
    }
}

//! 成绩汇总
//!
//! 只有一个消费者持有 `Aggregator`，按任务完成顺序接收结果，
//! 全部任务结束后再统一排序。

use crate::models::{FailedTask, RunReport, TaskOutcome};

#[derive(Debug, Default)]
pub struct Aggregator {
    outcomes: Vec<TaskOutcome>,
    failures: Vec<FailedTask>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接收一个已结束的任务
    pub fn accept(&mut self, finished: Result<TaskOutcome, FailedTask>) {
        match finished {
            Ok(outcome) => self.outcomes.push(outcome),
            Err(failed) => self.failures.push(failed),
        }
    }

    /// 已结束的任务数
    pub fn settled(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// 展平并排序
    pub fn finish(self) -> RunReport {
        let mut entries: Vec<_> = self
            .outcomes
            .into_iter()
            .flat_map(|outcome| outcome.entries)
            .collect();
        entries.sort_by(|a, b| a.rank_cmp(b));

        let mut failures = self.failures;
        failures.sort_by(|a, b| a.file.cmp(&b.file));

        RunReport { entries, failures }
    }
}

use std::cmp::Ordering;
use std::path::PathBuf;

use crate::models::ResultRecord;

/// 排名中的一行：考生姓名 + 一条成绩记录
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub result: ResultRecord,
}

impl ReportEntry {
    pub fn new(name: impl Into<String>, result: ResultRecord) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }

    /// 排名顺序：分数降序，同分按姓名、考试名称、证书名称
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .result
            .score_value()
            .total_cmp(&self.result.score_value())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.result.plan_name.cmp(&other.result.plan_name))
            .then_with(|| self.result.certificate_name.cmp(&other.result.certificate_name))
    }
}

/// 单个准考证任务成功后的输出
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub file: PathBuf,
    /// 成功时已经尝试的次数（含本次）
    pub attempts: u32,
    pub entries: Vec<ReportEntry>,
}

/// 重试耗尽后的失败记录
#[derive(Debug, Clone, PartialEq)]
pub struct FailedTask {
    pub file: PathBuf,
    pub attempts: u32,
    pub last_error: String,
}

/// 一次运行的最终结果（已排序）
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub entries: Vec<ReportEntry>,
    pub failures: Vec<FailedTask>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

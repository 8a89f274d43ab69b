use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 准考证目录错误（致命，启动阶段）
    #[error("目录错误: {0}")]
    Directory(#[from] DirectoryError),
    /// 准考证信息提取错误
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 成绩查询错误
    #[error("查询错误: {0}")]
    Fetch(#[from] FetchError),
    /// 单次尝试异常终止（panic 或被取消）
    #[error("任务异常终止 ({file}): {reason}")]
    TaskAborted { file: String, reason: String },
}

/// 准考证目录错误
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// 未指定目录
    #[error("未指定准考证目录")]
    Missing,
    /// 路径不存在或不是目录
    #[error("不是有效的目录: {path}")]
    NotADirectory { path: String },
    /// 无法读取目录
    #[error("无法读取目录 ({path}): {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 准考证中的身份字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    NationalId,
    ExamTicketNumber,
}

impl IdentityField {
    /// 准考证上对应的标签文字
    pub fn label(&self) -> &'static str {
        match self {
            IdentityField::Name => "学生姓名",
            IdentityField::NationalId => "身份证号",
            IdentityField::ExamTicketNumber => "准考证号",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 准考证信息提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 文档无法读取或解析
    #[error("无法读取准考证 ({path}): {source}")]
    DocumentUnreadable {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文档没有任何页面
    #[error("准考证没有页面: {path}")]
    EmptyDocument { path: String },
    /// 缺少必要字段
    #[error("获取信息失败或不完整，缺少: {}", join_fields(.missing))]
    IncompleteIdentity { missing: Vec<IdentityField> },
}

fn join_fields(fields: &[IdentityField]) -> String {
    fields
        .iter()
        .map(IdentityField::label)
        .collect::<Vec<_>>()
        .join("、")
}

/// 成绩查询错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 接口返回非成功状态码
    #[error("接口返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应中没有 data 字段
    #[error("响应缺少 data 字段 ({endpoint})")]
    MissingData { endpoint: String },
    /// 响应结构不符合预期
    #[error("响应结构不符 ({endpoint}): {source}")]
    Schema {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// 创建任务异常终止错误
    pub fn task_aborted(file: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::TaskAborted {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

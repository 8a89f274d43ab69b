use std::fmt::Display;

/// 准考证上的考生身份信息
///
/// 三个字段均非空，由 [`crate::services::identity_extractor::parse_identity`] 构建
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// 学生姓名
    pub name: String,
    /// 身份证号
    pub national_id: String,
    /// 准考证号
    pub exam_ticket_number: String,
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} 准考证#{}]", self.name, self.exam_ticket_number)
    }
}

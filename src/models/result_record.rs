//! 成绩查询接口的请求与响应结构

use serde::{Deserialize, Deserializer, Serialize};

/// 证书获得结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertResult {
    /// eg. 已通过 / 未通过
    pub label: String,
}

/// 证书等级
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateGrade {
    /// eg. 中级
    #[serde(default)]
    pub msg: String,
}

/// 单条成绩记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub cert_result: CertResult,
    /// 考试名称，eg. 2024年6月Web前端开发职业技能等级证书考试
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan_name: String,
    /// 证书名称，eg. Web前端开发职业技能等级证书
    #[serde(default, deserialize_with = "null_as_default")]
    pub certificate_name: String,
    /// 分数，eg. "39.00"
    #[serde(rename = "realPassMark", deserialize_with = "score_string")]
    pub score: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certificate_grade: CertificateGrade,
}

impl ResultRecord {
    pub fn cert_result_label(&self) -> &str {
        &self.cert_result.label
    }

    pub fn certificate_grade_label(&self) -> &str {
        &self.certificate_grade.msg
    }

    /// 是否通过
    pub fn is_passed(&self) -> bool {
        matches!(self.cert_result.label.trim(), "已通过" | "通过")
    }

    /// 用于排序的分数，无法解析或非有限值视为最低分
    pub fn score_value(&self) -> f64 {
        self.score
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NEG_INFINITY)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 分数可能是字符串也可能是数字，统一为两位小数的字符串
fn score_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Text(String),
        Number(f64),
    }

    Ok(match RawScore::deserialize(deserializer)? {
        RawScore::Text(text) => text,
        RawScore::Number(value) => format!("{:.2}", value),
    })
}

/// 成绩查询请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub exam_number: String,
    pub id_card_no: String,
    pub id_card_type: &'static str,
    pub limit: u32,
    pub page: u32,
    pub stud_name: Option<String>,
}

impl ResultsQuery {
    pub fn new(national_id: &str, exam_ticket_number: &str) -> Self {
        Self {
            exam_number: exam_ticket_number.to_string(),
            id_card_no: national_id.to_string(),
            id_card_type: "1",
            limit: 10,
            page: 1,
            stud_name: None,
        }
    }
}

/// 响应中的 `data` 部分
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsData {
    pub page: ResultsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsPage {
    pub records: Vec<ResultRecord>,
}

//! 准考证信息提取服务 - 业务能力层
//!
//! 只负责"从一份准考证中读出姓名、身份证号、准考证号"，不关心查询和排名

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use regex::Regex;
use tracing::debug;

use crate::error::{ExtractionError, IdentityField};
use crate::models::Identity;

/// 身份信息提取能力
#[async_trait]
pub trait IdentityExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Identity, ExtractionError>;
}

/// 基于 PDF 第一页文本的提取器
#[derive(Debug, Default, Clone)]
pub struct PdfIdentityExtractor;

impl PdfIdentityExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityExtractor for PdfIdentityExtractor {
    async fn extract(&self, path: &Path) -> Result<Identity, ExtractionError> {
        let owned = path.to_path_buf();
        let path_text = path.display().to_string();

        // lopdf 是同步解析，放到阻塞线程池
        let fragments = tokio::task::spawn_blocking(move || first_page_fragments(&owned))
            .await
            .map_err(|e| ExtractionError::DocumentUnreadable {
                path: path_text.clone(),
                source: Box::new(e),
            })??;

        debug!("{} 第一页共 {} 个文本片段", path_text, fragments.len());

        parse_identity(fragments.iter().map(String::as_str))
    }
}

/// 读取第一页的文本片段
///
/// # 参数
/// - `path`: PDF 文件路径
///
/// # 返回
/// 第一页按文本绘制指令切分的片段，空片段已去掉
fn first_page_fragments(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let path_text = path.display().to_string();
    let unreadable = |e: lopdf::Error| ExtractionError::DocumentUnreadable {
        path: path_text.clone(),
        source: Box::new(e),
    };

    let doc = Document::load(path).map_err(unreadable)?;

    let first_page = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| ExtractionError::EmptyDocument {
            path: path_text.clone(),
        })?;

    page_fragments(&doc, first_page).map_err(unreadable)
}

/// 遍历页面内容流，每个文本绘制指令产生一个片段
///
/// 同一个 BT/ET 块里的多行文字也会各自成为独立片段，
/// 不依赖 `Document::extract_text` 只在 ET 处换行的行为。
fn page_fragments(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(doc) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!("字体 {} 编码无法识别: {}", String::from_utf8_lossy(&name), e);
                None
            }
        })
        .collect();

    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut encoding: Option<&Encoding> = None;

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|font| encodings.get(font));
            }
            "Tj" | "TJ" | "'" | "\"" => {
                flush_fragment(&mut current, &mut fragments);
                // " 的前两个操作数是字距和词距
                let skip = if operation.operator == "\"" { 2 } else { 0 };
                match encoding {
                    Some(encoding) => {
                        for operand in operation.operands.iter().skip(skip) {
                            collect_text(&mut current, encoding, operand);
                        }
                    }
                    None => debug!("{} 指令前没有可用字体，跳过", operation.operator),
                }
                flush_fragment(&mut current, &mut fragments);
            }
            "Td" | "TD" | "T*" | "Tm" | "ET" => flush_fragment(&mut current, &mut fragments),
            _ => {}
        }
    }
    flush_fragment(&mut current, &mut fragments);

    Ok(fragments)
}

fn collect_text(text: &mut String, encoding: &Encoding, operand: &Object) {
    match operand {
        Object::String(bytes, _) => match Document::decode_text(encoding, bytes) {
            Ok(decoded) => text.push_str(&decoded),
            Err(e) => debug!("文本解码失败: {}", e),
        },
        Object::Array(items) => {
            for item in items {
                collect_text(text, encoding, item);
            }
        }
        // TJ 中较大的负间距视为空格
        Object::Integer(offset) if *offset < -100 => text.push(' '),
        Object::Real(offset) if *offset < -100.0 => text.push(' '),
        _ => {}
    }
}

fn flush_fragment(current: &mut String, fragments: &mut Vec<String>) {
    if !current.trim().is_empty() {
        fragments.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn label_patterns() -> &'static [(IdentityField, Regex)] {
    static PATTERNS: OnceLock<Vec<(IdentityField, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            IdentityField::Name,
            IdentityField::NationalId,
            IdentityField::ExamTicketNumber,
        ]
        .into_iter()
        .map(|field| {
            let pattern = format!(r"^\s*{}\s*[：:]\s*(\S.*?)\s*$", field.label());
            // 标签是固定文字，编译不会失败
            let re = Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid label pattern {pattern}: {e}"));
            (field, re)
        })
        .collect()
    })
}

/// 从文本片段中解析身份信息
///
/// 每个片段依次匹配三个标签，同一标签出现多次时以第一次为准。
/// 任一字段缺失则返回 [`ExtractionError::IncompleteIdentity`]。
pub fn parse_identity<'a, I>(fragments: I) -> Result<Identity, ExtractionError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut name = None;
    let mut national_id = None;
    let mut exam_ticket_number = None;

    for fragment in fragments {
        for (field, re) in label_patterns() {
            let Some(value) = re.captures(fragment).and_then(|c| c.get(1)) else {
                continue;
            };
            let slot = match field {
                IdentityField::Name => &mut name,
                IdentityField::NationalId => &mut national_id,
                IdentityField::ExamTicketNumber => &mut exam_ticket_number,
            };
            if slot.is_none() {
                *slot = Some(value.as_str().to_string());
            }
        }
    }

    match (name, national_id, exam_ticket_number) {
        (Some(name), Some(national_id), Some(exam_ticket_number)) => Ok(Identity {
            name,
            national_id,
            exam_ticket_number,
        }),
        (name, national_id, exam_ticket_number) => {
            let missing = [
                (IdentityField::Name, name.is_none()),
                (IdentityField::NationalId, national_id.is_none()),
                (IdentityField::ExamTicketNumber, exam_ticket_number.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            Err(ExtractionError::IncompleteIdentity { missing })
        }
    }
}

// ==========================================
// 表格数据入库工具 - 分隔文本读取器
// ==========================================
// 解析规则:
// - 首个非空行为表头，列标签去重后保持顺序
// - 分隔符从表头行嗅探（逗号/制表符/分号/竖线）
// - 短行补 NULL，长行截断，均不报错
// - 仅未闭合引号视为解析错误
// ==========================================

use crate::domain::{NamedTable, Record};
use crate::error::{IngestError, IngestResult};
use crate::identifier::{disambiguate_labels, normalize_identifier};
use csv::ReaderBuilder;
use serde_json::Value;
use std::path::Path;

/// 分隔符候选，按优先级（出现次数相同则取靠前者）
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

/// 读取一个分隔文本文件为一张逻辑表
///
/// 表名由文件路径经 [`normalize_identifier`] 推导。
/// 文件整体读入后在内存中解析（一次读取即为本管道唯一的 I/O 挂起点）。
pub async fn read_delimited(path: &Path) -> IngestResult<NamedTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.display().to_string()));
    }

    let name = normalize_identifier(&path.to_string_lossy())?;

    tracing::debug!("按分隔文本读取: {}", path.display());
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);

    let delimiter = sniff_delimiter(&text);

    // csv crate 对未闭合引号静默容忍（读到文件尾），此处显式检出
    if has_unterminated_quote(&text, delimiter) {
        return Err(IngestError::ParseError {
            path: path.display().to_string(),
            message: "未闭合的引号字段".to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let labels = disambiguate_labels(&headers);

    let mut rows: Vec<Record> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // 短行补 NULL；超出表头的多余字段丢弃
        let row: Record = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let value = match record.get(idx).map(str::trim) {
                    Some(field) if !field.is_empty() => Value::String(field.to_string()),
                    _ => Value::Null,
                };
                (label.clone(), value)
            })
            .collect();

        // 跳过完全空白的行
        if row.iter().all(|(_, v)| v.is_null()) {
            continue;
        }

        rows.push(row);
    }

    Ok(NamedTable::new(name, labels, rows))
}

/// 从表头行嗅探分隔符（引号内的字符不计入）
fn sniff_delimiter(text: &str) -> u8 {
    let header_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best = b',';
    let mut best_count = 0usize;
    for candidate in DELIMITER_CANDIDATES {
        let mut count = 0usize;
        let mut in_quotes = false;
        for b in header_line.bytes() {
            match b {
                b'"' => in_quotes = !in_quotes,
                _ if b == candidate && !in_quotes => count += 1,
                _ => {}
            }
        }
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// 检测未闭合的引号字段（文件结束时仍处于引号内）
fn has_unterminated_quote(text: &str, delimiter: u8) -> bool {
    let bytes = text.as_bytes();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == b'"' {
                // 双引号转义
                if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                    i += 2;
                    continue;
                }
                in_quotes = false;
            }
        } else if b == b'"' && at_field_start {
            in_quotes = true;
            at_field_start = false;
        } else if b == delimiter || b == b'\n' || b == b'\r' {
            at_field_start = true;
        } else {
            at_field_start = false;
        }
        i += 1;
    }
    in_quotes
}

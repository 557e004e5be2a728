// ==========================================
// 表格数据入库工具 - 标识符规范化
// ==========================================
// 职责: 文件路径/工作表名 → 合法数据库/表标识符
// 纯函数，无 I/O
// ==========================================

use crate::error::{IngestError, IngestResult};
use std::path::Path;

/// 将任意路径或名称规范化为合法标识符
///
/// 规则:
/// - 去除目录与扩展名
/// - 转小写
/// - `[a-z0-9_]` 之外的连续字符压缩为单个下划线
/// - 去除首尾下划线
/// - 以数字开头时前置下划线
///
/// 幂等: `normalize_identifier(normalize_identifier(x)) == normalize_identifier(x)`
pub fn normalize_identifier(input: &str) -> IngestResult<String> {
    if input.trim().is_empty() {
        return Err(IngestError::InvalidPath("输入为空".to_string()));
    }

    // 去除目录与扩展名
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(input);

    sanitize(input, stem)
}

/// 将显式给定的名称（非文件路径）规范化为合法标识符
///
/// 与 [`normalize_identifier`] 的字符规则一致，但不做目录/扩展名剥离:
/// `sales.2024` 规范化为 `sales_2024` 而不是被截成 `sales`。
pub fn normalize_name(input: &str) -> IngestResult<String> {
    if input.trim().is_empty() {
        return Err(IngestError::InvalidPath("输入为空".to_string()));
    }
    sanitize(input, input)
}

/// 字符级规范化（小写、压缩非法字符、去首尾下划线、数字前缀）
fn sanitize(original: &str, stem: &str) -> IngestResult<String> {
    let mut out = String::with_capacity(stem.len());
    let mut last_was_underscore = false;
    for ch in stem.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            out.push(ch);
            last_was_underscore = ch == '_';
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        return Err(IngestError::InvalidPath(original.to_string()));
    }

    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        Ok(format!("_{trimmed}"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// 表头列标签去重
///
/// - 顺序保留
/// - 空标签按列序号命名为 `column_N`
/// - 重复标签追加 `_2`/`_3`... 直到唯一
pub fn disambiguate_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for (idx, label) in labels.into_iter().enumerate() {
        let raw = label.as_ref().trim();
        let base = if raw.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            raw.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.push(candidate);
    }
    seen
}

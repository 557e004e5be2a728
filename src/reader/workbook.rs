// ==========================================
// 表格数据入库工具 - Excel 工作簿读取器
// ==========================================
// 每个工作表一张逻辑表，按工作簿原生顺序返回
// 表名 = 规范化后的工作表名（冲突按表序追加数字后缀）
// ==========================================

use crate::domain::{NamedTable, Record};
use crate::error::{IngestError, IngestResult};
use crate::identifier::{disambiguate_labels, normalize_identifier};
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// 读取一个 .xlsx 工作簿为一组逻辑表（同步，CPU 密集）
///
/// 每个工作表的首行为表头；空工作表产出零行表而非错误。
pub fn read_workbook(path: &Path) -> IngestResult<Vec<NamedTable>> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.display().to_string()));
    }

    tracing::debug!("按 Excel 工作簿读取: {}", path.display());
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let table_names = unique_table_names(&sheet_names);

    let mut tables = Vec::with_capacity(sheet_names.len());
    for (sheet_name, table_name) in sheet_names.iter().zip(table_names) {
        let range = workbook.worksheet_range(sheet_name)?;

        let mut row_iter = range.rows();
        let (columns, rows) = match row_iter.next() {
            Some(header_row) => {
                let labels = disambiguate_labels(header_row.iter().map(|c| c.to_string()));
                let rows = table_rows(&labels, row_iter);
                (labels, rows)
            }
            // 空工作表: 零行表，不报错
            None => (Vec::new(), Vec::new()),
        };

        tables.push(NamedTable::new(table_name, columns, rows));
    }

    Ok(tables)
}

/// 工作表名 → 唯一表名（保持工作表顺序）
///
/// 规范化后冲突的名称按顺序追加 `_2`/`_3`...；
/// 无法规范化的名称回退为 `sheet_N`。
fn unique_table_names(sheet_names: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(sheet_names.len());
    for (idx, sheet_name) in sheet_names.iter().enumerate() {
        let base = normalize_identifier(sheet_name)
            .unwrap_or_else(|_| format!("sheet_{}", idx + 1));

        let mut candidate = base.clone();
        let mut suffix = 2;
        while used.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        used.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// 数据行转换: 按表头标签对齐，短行补 NULL，跳过全空行
fn table_rows<'a, I>(labels: &[String], data_rows: I) -> Vec<Record>
where
    I: Iterator<Item = &'a [Data]>,
{
    let mut rows = Vec::new();
    for data_row in data_rows {
        let row: Record = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let value = data_row.get(idx).map(cell_to_value).unwrap_or(Value::Null);
                (label.clone(), value)
            })
            .collect();

        if row.iter().all(|(_, v)| v.is_null()) {
            continue;
        }
        rows.push(row);
    }
    rows
}

/// 单元格 → 原始标量值
///
/// 整数值的浮点单元格还原为整数（Excel 数值统一按浮点存储）；
/// 日期/时长以文本形式保留；错误单元格视为空。
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64
            {
                Value::from(*f as i64)
            } else {
                serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(_) => Value::Null,
        other => {
            let s = other.to_string();
            if s.trim().is_empty() {
                Value::Null
            } else {
                Value::String(s.trim().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unique_table_names_collision_in_sheet_order() {
        let names = vec![
            "Sheet 1".to_string(),
            "Sheet-1".to_string(),
            "Totals".to_string(),
        ];
        assert_eq!(unique_table_names(&names), vec!["sheet_1", "sheet_1_2", "totals"]);
    }

    #[test]
    fn test_unique_table_names_fallback_for_unnormalizable() {
        let names = vec!["数据".to_string(), "ok".to_string()];
        assert_eq!(unique_table_names(&names), vec!["sheet_1", "ok"]);
    }

    #[test]
    fn test_table_rows_pad_and_skip_empty() {
        let labels = vec!["x".to_string(), "y".to_string()];
        let data = vec![
            vec![Data::Int(1), Data::String("a".to_string())],
            vec![Data::Empty, Data::Empty],
            vec![Data::Int(2)],
        ];
        let rows = table_rows(&labels, data.iter().map(|r| r.as_slice()));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].1, Value::from(1));
        assert_eq!(rows[1][1].1, Value::Null);
    }

    #[test]
    fn test_cell_to_value_integral_float() {
        assert_eq!(cell_to_value(&Data::Float(3.0)), Value::from(3));
        assert_eq!(cell_to_value(&Data::Float(3.5)), Value::from(3.5));
    }

    #[test]
    fn test_cell_to_value_trims_and_nulls() {
        assert_eq!(cell_to_value(&Data::String("  hi ".to_string())), Value::from("hi"));
        assert_eq!(cell_to_value(&Data::String("   ".to_string())), Value::Null);
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn test_read_workbook_missing_file() {
        let result = read_workbook(Path::new("no_such_workbook.xlsx"));
        assert!(matches!(result, Err(IngestError::FileNotFound(_))));
    }

    #[test]
    fn test_read_workbook_invalid_container() {
        // 非 zip 容器的 .xlsx 文件应报读取错误
        let mut f = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        f.write_all(b"this is not a workbook").unwrap();

        let result = read_workbook(f.path());
        assert!(matches!(result, Err(IngestError::ReadError(_))));
    }
}

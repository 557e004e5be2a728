// ==========================================
// 表格数据入库工具 - 列结构推断
// ==========================================
// 规则:
// - 列集合 = 所有行标签的并集，按首次出现顺序
// - 列类型 = 所有观测值的最小公共类型（integer < real < boolean < text）
// - 出现空值或无法归类的值即拓宽为 text；全空列为 text
// ==========================================

use crate::domain::{ColumnType, NamedTable};
use crate::error::{IngestError, IngestResult};
use serde_json::Value;
use std::collections::HashMap;

/// 对一张逻辑表做单遍类型推断，返回 (列标签, 列类型)，保持首次出现顺序
///
/// 表头标签先行入列，因此仅有表头而无数据行的表仍产出全 text 列结构。
pub fn infer_schema(table: &NamedTable) -> IngestResult<Vec<(String, ColumnType)>> {
    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut observed: Vec<Option<ColumnType>> = Vec::new();

    for label in &table.columns {
        let label = label.trim();
        if label.is_empty() {
            return Err(IngestError::SchemaError {
                table: table.name.clone(),
                message: "存在空列标签".to_string(),
            });
        }
        if !index.contains_key(label) {
            index.insert(label.to_string(), order.len());
            order.push(label.to_string());
            observed.push(None);
        }
    }

    for row in &table.rows {
        for (label, value) in row {
            let label = label.trim();
            if label.is_empty() {
                return Err(IngestError::SchemaError {
                    table: table.name.clone(),
                    message: "存在空列标签".to_string(),
                });
            }

            let idx = match index.get(label) {
                Some(&idx) => idx,
                None => {
                    let idx = order.len();
                    order.push(label.to_string());
                    index.insert(label.to_string(), idx);
                    observed.push(None);
                    idx
                }
            };

            let vt = value_type(value);
            observed[idx] = Some(match observed[idx] {
                Some(current) => current.widen(vt),
                None => vt,
            });
        }
    }

    Ok(order
        .into_iter()
        .zip(observed)
        .map(|(label, ty)| (label, ty.unwrap_or(ColumnType::Text)))
        .collect())
}

/// 单个原始值的观测类型
///
/// 文本值按内容嗅探: 整数字面量 → integer，有限浮点字面量 → real，
/// true/false → boolean，其余为 text。空值按规则归为 text。
pub fn value_type(value: &Value) -> ColumnType {
    match value {
        Value::Bool(_) => ColumnType::Boolean,
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                ColumnType::Integer
            } else {
                ColumnType::Real
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.parse::<i64>().is_ok() {
                ColumnType::Integer
            } else if s.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false) {
                ColumnType::Real
            } else if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
                ColumnType::Boolean
            } else {
                ColumnType::Text
            }
        }
        _ => ColumnType::Text,
    }
}

/// 将原始值转换为推断出的列类型对应的 SQL 值
///
/// 无法转换的值以其文本形式写入，而不是中止整张表。空值写入 SQL NULL。
pub fn to_sql_value(value: &Value, ty: ColumnType) -> rusqlite::types::Value {
    use rusqlite::types::Value as SqlValue;

    if value.is_null() {
        return SqlValue::Null;
    }

    match ty {
        ColumnType::Integer => match value {
            Value::Number(n) if n.is_i64() => SqlValue::Integer(n.as_i64().unwrap_or_default()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| SqlValue::Text(value_to_text(value))),
            _ => SqlValue::Text(value_to_text(value)),
        },
        ColumnType::Real => match value {
            Value::Number(n) => n
                .as_f64()
                .map(SqlValue::Real)
                .unwrap_or_else(|| SqlValue::Text(value_to_text(value))),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(SqlValue::Real)
                .unwrap_or_else(|_| SqlValue::Text(value_to_text(value))),
            _ => SqlValue::Text(value_to_text(value)),
        },
        ColumnType::Boolean => match value {
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(SqlValue::Integer)
                .unwrap_or_else(|| SqlValue::Text(value_to_text(value))),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => SqlValue::Integer(1),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => SqlValue::Integer(0),
            _ => SqlValue::Text(value_to_text(value)),
        },
        ColumnType::Text => SqlValue::Text(value_to_text(value)),
    }
}

/// 值的文本形式（字符串不带引号）
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: Vec<Vec<(&str, Value)>>) -> NamedTable {
        let rows: Vec<crate::domain::Record> = rows
            .into_iter()
            .map(|r| r.into_iter().map(|(l, v)| (l.to_string(), v)).collect())
            .collect();
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for (label, _) in row {
                if !columns.contains(label) {
                    columns.push(label.clone());
                }
            }
        }
        NamedTable::new("t".to_string(), columns, rows)
    }

    #[test]
    fn test_integer_columns_from_text_values() {
        let t = table(vec![vec![
            ("a", json!("1")),
            ("b", json!("2")),
            ("c", json!("3")),
        ]]);
        let schema = infer_schema(&t).unwrap();
        assert_eq!(
            schema,
            vec![
                ("a".to_string(), ColumnType::Integer),
                ("b".to_string(), ColumnType::Integer),
                ("c".to_string(), ColumnType::Integer),
            ]
        );
    }

    #[test]
    fn test_widening_to_text() {
        let t = table(vec![
            vec![("a", json!(1))],
            vec![("a", json!(2))],
            vec![("a", json!("x"))],
        ]);
        let schema = infer_schema(&t).unwrap();
        assert_eq!(schema[0].1, ColumnType::Text);
    }

    #[test]
    fn test_integer_widens_to_real() {
        let t = table(vec![vec![("a", json!("1"))], vec![("a", json!("2.5"))]]);
        let schema = infer_schema(&t).unwrap();
        assert_eq!(schema[0].1, ColumnType::Real);
    }

    #[test]
    fn test_null_widens_to_text() {
        let t = table(vec![vec![("a", json!(1))], vec![("a", Value::Null)]]);
        let schema = infer_schema(&t).unwrap();
        assert_eq!(schema[0].1, ColumnType::Text);
    }

    #[test]
    fn test_all_null_column_is_text() {
        let t = table(vec![vec![("a", Value::Null), ("b", json!(1))]]);
        let schema = infer_schema(&t).unwrap();
        assert_eq!(schema[0], ("a".to_string(), ColumnType::Text));
        assert_eq!(schema[1], ("b".to_string(), ColumnType::Integer));
    }

    #[test]
    fn test_boolean_column() {
        let t = table(vec![vec![("a", json!("true"))], vec![("a", json!("FALSE"))]]);
        let schema = infer_schema(&t).unwrap();
        assert_eq!(schema[0].1, ColumnType::Boolean);
    }

    #[test]
    fn test_union_preserves_first_seen_order() {
        let t = table(vec![
            vec![("a", json!(1)), ("b", json!(2))],
            vec![("a", json!(3)), ("c", json!(4)), ("b", json!(5))],
        ]);
        let schema = infer_schema(&t).unwrap();
        let labels: Vec<&str> = schema.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_header_only_table_keeps_columns_as_text() {
        // 仅有表头无数据行: 列结构保留，类型全部为 text
        let t = NamedTable::new(
            "t".to_string(),
            vec!["a".to_string(), "b".to_string()],
            Vec::new(),
        );
        let schema = infer_schema(&t).unwrap();
        assert_eq!(
            schema,
            vec![
                ("a".to_string(), ColumnType::Text),
                ("b".to_string(), ColumnType::Text),
            ]
        );
    }

    #[test]
    fn test_empty_label_is_schema_error() {
        let t = table(vec![vec![("", json!(1))]]);
        assert!(matches!(
            infer_schema(&t),
            Err(IngestError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_to_sql_value_conversion() {
        use rusqlite::types::Value as SqlValue;

        assert_eq!(
            to_sql_value(&json!("42"), ColumnType::Integer),
            SqlValue::Integer(42)
        );
        assert_eq!(
            to_sql_value(&json!("2.5"), ColumnType::Real),
            SqlValue::Real(2.5)
        );
        assert_eq!(
            to_sql_value(&json!("true"), ColumnType::Boolean),
            SqlValue::Integer(1)
        );
        assert_eq!(
            to_sql_value(&json!(7), ColumnType::Text),
            SqlValue::Text("7".to_string())
        );
        assert_eq!(to_sql_value(&Value::Null, ColumnType::Integer), SqlValue::Null);
    }

    #[test]
    fn test_to_sql_value_fallback_to_text() {
        use rusqlite::types::Value as SqlValue;

        // 推断边界情形: 数值列中出现文本，按文本写入而非中止
        assert_eq!(
            to_sql_value(&json!("oops"), ColumnType::Integer),
            SqlValue::Text("oops".to_string())
        );
    }

    #[test]
    fn test_value_type_sniffing() {
        assert_eq!(value_type(&json!("10")), ColumnType::Integer);
        assert_eq!(value_type(&json!("-3.5")), ColumnType::Real);
        assert_eq!(value_type(&json!("1e3")), ColumnType::Real);
        assert_eq!(value_type(&json!("inf")), ColumnType::Text);
        assert_eq!(value_type(&json!("True")), ColumnType::Boolean);
        assert_eq!(value_type(&json!("hello")), ColumnType::Text);
        assert_eq!(value_type(&Value::Null), ColumnType::Text);
    }
}

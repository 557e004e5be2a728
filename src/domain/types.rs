// ==========================================
// 表格数据入库工具 - 核心数据模型
// ==========================================
// NamedTable: 读取器产出、物化器消费的逻辑表
// ColumnType: 列类型推断的拓宽格
// ==========================================

use serde_json::Value;
use std::fmt;

/// 一行数据: 列标签 → 原始标量值（字符串/数值/布尔/空），保持列顺序
pub type Record = Vec<(String, Value)>;

/// 一张逻辑表: 由一次读取产出，交由一次物化消费
///
/// 表头标签单独携带，仅有表头而无数据行的来源仍可建出带列的空表。
#[derive(Debug, Clone)]
pub struct NamedTable {
    /// 规范化后的表名
    pub name: String,
    /// 表头列标签（去重后，保持顺序）
    pub columns: Vec<String>,
    /// 数据行（不含表头）
    pub rows: Vec<Record>,
}

impl NamedTable {
    pub fn new(name: String, columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            name,
            columns,
            rows,
        }
    }
}

/// 输入文件分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// 工作簿容器（.xlsx），每个工作表一张逻辑表
    Workbook,
    /// 分隔文本文件，整个文件一张逻辑表
    Delimited,
}

/// 列类型，按拓宽优先级排列: integer < real < boolean < text
///
/// 某列只要出现无法归类的值或空值，即拓宽为 text；全空列为 text。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnType {
    Integer,
    Real,
    Boolean,
    Text,
}

impl ColumnType {
    /// 两个观测类型的最小公共类型
    pub fn widen(self, other: ColumnType) -> ColumnType {
        self.max(other)
    }

    /// 建表 DDL 使用的 SQL 类型名
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

// ==========================================
// 表格数据入库工具 - 领域类型
// ==========================================

pub mod types;

pub use types::{ColumnType, NamedTable, Record, SourceKind};

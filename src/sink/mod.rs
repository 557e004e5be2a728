// ==========================================
// 表格数据入库工具 - 数据落库层
// ==========================================
// schema: 列结构推断（纯逻辑）
// sqlite: TableSink 的 SQLite 实现
// ==========================================

pub mod schema;
pub mod sqlite;

use crate::domain::NamedTable;
use crate::error::IngestResult;
use async_trait::async_trait;

pub use sqlite::SqliteSink;

/// 落库接口: 任何实现这两个操作的关系型存储都可作为目标
///
/// 约束: `ensure_database` 必须在对该库的任何 `create_table` 之前完成。
#[async_trait]
pub trait TableSink: Send + Sync {
    /// 确保目标数据库存在（幂等）
    async fn ensure_database(&self, name: &str) -> IngestResult<()>;

    /// 推断列结构并建表写入（本工具唯一的写路径）
    async fn create_table(&self, database: &str, table: &NamedTable) -> IngestResult<()>;
}

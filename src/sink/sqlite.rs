// ==========================================
// 表格数据入库工具 - SQLite 落库实现
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，避免双管道并发写入时的偶发 busy 错误
// - 建表策略: 先删后建（一次性转换工具，重复运行覆盖）
// ==========================================

use crate::domain::NamedTable;
use crate::error::{IngestError, IngestResult};
use crate::sink::schema::{infer_schema, to_sql_value};
use crate::sink::TableSink;
use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys 与 busy_timeout 均需每个连接单独设置
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 以 SQLite 文件库为目标的落库实现
///
/// 数据库名 `name` 映射为 `<root>/<name>.db`；
/// 每次写入单独开连接，两条管道并发写入互不共享连接。
pub struct SqliteSink {
    root: PathBuf,
}

impl SqliteSink {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// 数据库名对应的文件路径
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.db"))
    }

    fn open(&self, database: &str) -> rusqlite::Result<Connection> {
        let conn = Connection::open(self.database_path(database))?;
        configure_connection(&conn)?;
        Ok(conn)
    }
}

#[async_trait]
impl TableSink for SqliteSink {
    async fn ensure_database(&self, name: &str) -> IngestResult<()> {
        let path = self.database_path(name);
        self.open(name)
            .map_err(|e| IngestError::ProvisionError(format!("{}: {e}", path.display())))?;
        tracing::info!("数据库就绪: {}", path.display());
        Ok(())
    }

    async fn create_table(&self, database: &str, table: &NamedTable) -> IngestResult<()> {
        let schema = infer_schema(table)?;
        if schema.is_empty() {
            // 仅当来源连表头都没有（如空工作表）时才无列可建，跳过；
            // 仅有表头的来源仍建出带列的空表
            tracing::warn!("表 {} 无列可建，跳过", table.name);
            return Ok(());
        }

        let mut conn = self.open(database)?;

        let columns_ddl = schema
            .iter()
            .map(|(label, ty)| format!("{} {}", quote_ident(label), ty.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");

        // 先删后建，重复运行覆盖旧表
        conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({columns_ddl});",
            name = quote_ident(&table.name),
        ))?;

        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&table.name),
            schema
                .iter()
                .map(|(label, _)| quote_ident(label))
                .collect::<Vec<_>>()
                .join(", "),
            (1..=schema.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", "),
        );

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in &table.rows {
                let by_label: HashMap<&str, &Value> =
                    row.iter().map(|(l, v)| (l.trim(), v)).collect();
                let params: Vec<rusqlite::types::Value> = schema
                    .iter()
                    .map(|(label, ty)| {
                        by_label
                            .get(label.as_str())
                            .map(|v| to_sql_value(v, *ty))
                            .unwrap_or(rusqlite::types::Value::Null)
                    })
                    .collect();
                stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }
        tx.commit()?;

        tracing::info!(
            "已建表 {}.{} ({} 列, {} 行)",
            database,
            table.name,
            schema.len(),
            table.rows.len()
        );
        Ok(())
    }
}

/// SQL 标识符加引号（内嵌双引号转义）
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// 打开已存在的数据库文件（供校验/测试场景复用统一 PRAGMA）
pub fn open_database(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    Ok(conn)
}
